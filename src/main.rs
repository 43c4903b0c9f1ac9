use anyhow::{Context, Result};
use crossterm::{
    event::{self as crossterm_event, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    Terminal,
};
use std::{io, time::Duration};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

mod app;
mod config;
mod constants;
mod error;
mod inventory;
mod logging;
mod preferences;
mod ui;
mod utils;
mod wallet;

use app::{App, InputMode, View};
use config::AppConfig;
use constants::TICK_MILLIS;
use preferences::Preferences;

#[tokio::main]
async fn main() -> Result<()> {
    let log_path = logging::init();
    info!(log = ?log_path, "starting invenchain");

    let config = AppConfig::load().context("Failed to load configuration")?;
    let preferences = match preferences::default_path() {
        Some(path) => Preferences::load(&path).unwrap_or_else(|e| {
            warn!(error = %e, "ignoring unreadable preferences");
            Preferences::in_memory()
        }),
        None => Preferences::in_memory(),
    };

    // application state, including the startup wallet check
    let mut app = App::new(config, preferences);
    app.start().await;
    let app = Arc::new(Mutex::new(app));

    // terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, Arc::clone(&app)).await;

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!(error = %err, "application error");
        println!("{:?}", err);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: Arc<Mutex<App>>,
) -> Result<()> {
    loop {
        App::pump_wallet_events(Arc::clone(&app)).await;
        {
            let mut app_guard = app.lock().await;
            terminal.draw(|f| ui::draw(f, &mut app_guard))?;
        }

        if crossterm_event::poll(Duration::from_millis(TICK_MILLIS))? {
            if let Event::Key(key) = crossterm_event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if !handle_key(Arc::clone(&app), key).await {
                    return Ok(());
                }
            }
        }
    }
}

/// Returns false when the user asked to quit.
async fn handle_key(app: Arc<Mutex<App>>, key: KeyEvent) -> bool {
    let mut app_guard = app.lock().await;

    // text prompts on the inventory view take every key
    if app_guard.input_mode != InputMode::Normal {
        match key.code {
            KeyCode::Esc => app_guard.cancel_input(),
            KeyCode::Enter => app_guard.submit_input(),
            KeyCode::Backspace => {
                app_guard.input_buffer.pop();
            }
            KeyCode::Char(c) => {
                if app_guard.input_buffer.chars().count() < constants::TEXT_INPUT_MAX_LEN {
                    app_guard.input_buffer.push(c);
                }
            }
            _ => {}
        }
        return true;
    }

    // the add-stock form captures typing
    if app_guard.view == View::AddItem {
        match key.code {
            KeyCode::Esc => app_guard.set_view(View::Inventory),
            KeyCode::Enter => app_guard.submit_form(),
            KeyCode::Tab | KeyCode::Down => app_guard.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => app_guard.form.previous_field(),
            KeyCode::Left | KeyCode::Right => {
                if app_guard.form.focused == app::form::FIELD_CATEGORY {
                    app_guard.form.cycle_category();
                }
            }
            KeyCode::Backspace => app_guard.form.backspace(),
            KeyCode::Char(c) => app_guard.form.input(c),
            _ => {}
        }
        return true;
    }

    if app_guard.is_confirming {
        match key.code {
            KeyCode::Char('y') => app_guard.confirm_remove(),
            KeyCode::Char('n') | KeyCode::Esc => app_guard.cancel_remove(),
            _ => {}
        }
        return true;
    }

    if app_guard.is_switching_network {
        match key.code {
            KeyCode::Char(c @ '1'..='3') => {
                let index = c as usize - '1' as usize;
                drop(app_guard);
                App::handle_network_switch(Arc::clone(&app), index).await;
            }
            KeyCode::Char('n') | KeyCode::Esc => app_guard.cancel_network_switch(),
            _ => {}
        }
        return true;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return false,
        // wallet
        KeyCode::Char('c') => {
            drop(app_guard);
            App::handle_connect(Arc::clone(&app)).await;
        }
        KeyCode::Char('d') => app_guard.handle_disconnect(),
        KeyCode::Char('n') => app_guard.start_network_switch(),
        KeyCode::Char('w') => app_guard.simulate_account_switch(),
        KeyCode::Char('l') => app_guard.simulate_wallet_lock(),
        // views
        KeyCode::Tab => app_guard.next_view(),
        KeyCode::Char(c @ '1'..='5') => {
            let view = View::ALL[c as usize - '1' as usize];
            app_guard.set_view(view);
        }
        KeyCode::Up => app_guard.previous_item(),
        KeyCode::Down => app_guard.next_item(),
        _ => match app_guard.view {
            View::Inventory => match key.code {
                KeyCode::Char('/') => app_guard.start_search(),
                KeyCode::Char('s') => app_guard.cycle_sort_field(),
                KeyCode::Char('r') => app_guard.toggle_sort_direction(),
                KeyCode::Char('+') | KeyCode::Char('=') => app_guard.adjust_selected_quantity(true),
                KeyCode::Char('-') => app_guard.adjust_selected_quantity(false),
                KeyCode::Char('x') => app_guard.start_remove_confirm(),
                KeyCode::Char('m') => app_guard.start_transfer(),
                KeyCode::Char('h') | KeyCode::Enter => app_guard.show_item_history(),
                KeyCode::Char('a') => app_guard.set_view(View::AddItem),
                _ => app_guard.clear_error(),
            },
            View::History => match key.code {
                KeyCode::Char('a') => {
                    app_guard.history_item = None;
                    app_guard.history_state.select(Some(0));
                }
                _ => app_guard.clear_error(),
            },
            View::Settings => match key.code {
                KeyCode::Char(' ') | KeyCode::Enter => app_guard.toggle_selected_preference(),
                _ => app_guard.clear_error(),
            },
            View::Overview | View::AddItem => {
                // clear any messages
                app_guard.clear_error();
            }
        },
    }
    true
}
