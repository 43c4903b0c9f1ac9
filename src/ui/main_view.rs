use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Tabs},
    Frame,
};
use crate::app::{App, InputMode, MessageType, View};
use crate::constants::MESSAGE_AREA_MARGIN;
use crate::utils::shorten_id;
use crate::wallet::ConnectionStatus;
use super::utils::Theme;
use textwrap;

/// Renders the shared frame (header, tabs, message area, key help) and
/// returns the area left for the active view.
pub fn draw_main(f: &mut Frame, app: &App) -> Rect {
    let theme = Theme::for_app(app);

    // Full screen border
    let main_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(theme.base));
    f.render_widget(main_block, f.size());

    // Main layout structure
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),   // Title and status line
            Constraint::Length(3),   // View tabs
            Constraint::Min(8),      // Active view
            Constraint::Length(4),   // Message area
            Constraint::Length(3),   // Control information
        ])
        .split(f.size());

    render_status_line(f, app, main_layout[0], &theme);
    render_tabs(f, app, main_layout[1], &theme);
    render_message_area(f, app, main_layout[3], &theme);
    render_help_controls(f, app, main_layout[4], &theme);

    main_layout[2]
}

fn render_status_line(f: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let status_indicators = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(34),
            Constraint::Percentage(33),
        ])
        .split(area);

    let title = Paragraph::new("◆ INVENCHAIN VAULT")
        .style(Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    f.render_widget(title, status_indicators[0]);

    let network = if app.session.is_changing_network() {
        "NETWORK: SWITCHING...".to_string()
    } else {
        format!("NETWORK: {}", app.network_label().to_uppercase())
    };
    f.render_widget(
        Paragraph::new(network)
            .style(Style::default().fg(theme.base))
            .alignment(Alignment::Center),
        status_indicators[1],
    );

    let (wallet, color) = match app.session.status() {
        ConnectionStatus::Connected { account, .. } => {
            (format!("● WALLET: {}", shorten_id(account)), Color::Green)
        }
        ConnectionStatus::Connecting => ("◌ WALLET: CONNECTING...".to_string(), Color::Yellow),
        ConnectionStatus::Disconnected => ("○ WALLET: NOT CONNECTED".to_string(), theme.dim),
        ConnectionStatus::Error(_) => ("✕ WALLET: ERROR".to_string(), Color::Red),
    };
    f.render_widget(
        Paragraph::new(wallet)
            .style(Style::default().fg(color))
            .alignment(Alignment::Center),
        status_indicators[2],
    );
}

fn render_tabs(f: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!("{} {}", i + 1, view.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .block(theme.block(""))
        .select(app.view.index())
        .style(Style::default().fg(theme.dim))
        .highlight_style(Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD))
        .divider("│");
    f.render_widget(tabs, area);
}

fn render_message_area(f: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let message_block = theme.block(" MESSAGE ");

    let (message, color) = if let Some(success) = &app.success_message {
        (success, Color::Green)
    } else if let Some(error) = &app.error_message {
        let color = match app.message_type {
            MessageType::Error => Color::Red,
            _ => Color::Yellow,
        };
        (error, color)
    } else {
        // Just show the border when no message
        f.render_widget(message_block, area);
        return;
    };

    // Calculate available width (minus borders and margins)
    let available_width = area.width.saturating_sub(MESSAGE_AREA_MARGIN);
    let wrapped_text = textwrap::wrap(message, available_width.max(1) as usize).join("\n");

    let message_text = Paragraph::new(wrapped_text)
        .style(Style::default().fg(color))
        .alignment(Alignment::Left)
        .block(message_block);
    f.render_widget(message_text, area);
}

fn hint(theme: &Theme, key: &'static str, label: &'static str) -> Vec<Span<'static>> {
    vec![theme.key(key), Span::raw(label), Span::raw("   ")]
}

fn render_help_controls(f: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let help_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.dim));

    let pairs: Vec<(&'static str, &'static str)> = if app.input_mode != InputMode::Normal {
        vec![("ENTER", " Apply"), ("ESC", " Cancel")]
    } else if app.is_confirming {
        vec![("Y", " Confirm"), ("N", " Cancel")]
    } else if app.is_switching_network {
        vec![("1-3", " Select network"), ("N", " Cancel")]
    } else {
        match app.view {
            View::AddItem => vec![
                ("TAB", " Next field"),
                ("←/→", " Category"),
                ("ENTER", " Add to inventory"),
                ("ESC", " Back"),
            ],
            View::Inventory => vec![
                ("/", " Search"),
                ("S", " Sort"),
                ("R", " Reverse"),
                ("+/-", " Quantity"),
                ("M", " Move"),
                ("X", " Remove"),
                ("H", " History"),
                ("A", " Add"),
                ("Q", " Quit"),
            ],
            View::History => vec![("↑/↓", " Scroll"), ("A", " All items"), ("Q", " Quit")],
            View::Settings => vec![
                ("SPACE", " Toggle"),
                ("N", " Network"),
                ("W", " Switch account"),
                ("L", " Lock wallet"),
                ("Q", " Quit"),
            ],
            View::Overview => vec![
                ("C", " Connect"),
                ("D", " Disconnect"),
                ("N", " Network"),
                ("TAB", " Next view"),
                ("Q", " Quit"),
            ],
        }
    };

    let spans: Vec<Span> = pairs
        .into_iter()
        .flat_map(|(key, label)| hint(theme, key, label))
        .collect();

    let help = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(theme.dim))
        .alignment(Alignment::Center)
        .block(help_block);

    f.render_widget(help, area);
}
