use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph, Wrap},
    Frame,
};
use crate::app::App;
use crate::preferences::TOGGLES;
use crate::wallet::ConnectionStatus;
use super::utils::Theme;

pub fn draw_settings(f: &mut Frame, app: &mut App, area: Rect) {
    let theme = Theme::for_app(app);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let toggles: Vec<ListItem> = TOGGLES
        .iter()
        .map(|(key, label, _)| {
            let on = app.preferences.flag(key);
            ListItem::new(Line::from(vec![
                Span::styled(
                    if on { "[x] " } else { "[ ] " },
                    Style::default().fg(if on { Color::Green } else { theme.dim }),
                ),
                Span::styled(*label, Style::default().fg(theme.text)),
            ]))
        })
        .collect();
    let list = List::new(toggles)
        .block(theme.block(" PREFERENCES "))
        .highlight_style(Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, columns[0], &mut app.settings_state);

    render_wallet_panel(f, app, columns[1], &theme);
}

fn render_wallet_panel(f: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let label = |text: &'static str| Span::styled(text, Style::default().fg(theme.dim));

    let (status, color) = match app.session.status() {
        _ if !app.session.is_web3_enabled() => ("No wallet installed".to_string(), Color::Red),
        ConnectionStatus::Connected { .. } => ("Connected".to_string(), Color::Green),
        ConnectionStatus::Connecting => ("Connecting...".to_string(), Color::Yellow),
        ConnectionStatus::Disconnected => ("Not connected".to_string(), theme.dim),
        ConnectionStatus::Error(message) => (message.clone(), Color::Red),
    };

    let mut lines = vec![
        Line::from(vec![label("Status:  "), Span::styled(status, Style::default().fg(color))]),
        Line::from(vec![
            label("Account: "),
            Span::raw(app.session.account().unwrap_or("-").to_string()),
        ]),
        Line::from(vec![label("Network: "), Span::raw(app.network_label())]),
        Line::from(""),
    ];

    if app.is_switching_network {
        lines.push(Line::from(Span::styled(
            "SELECT NETWORK (1-3)",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            app.get_network_options(),
            Style::default().fg(Color::Yellow),
        )));
    } else if app.session.is_changing_network() {
        lines.push(Line::from(Span::styled(
            "Waiting for the wallet to switch network...",
            Style::default().fg(Color::Yellow),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "[Press N to switch network]",
            Style::default().fg(theme.dim),
        )));
    }

    lines.push(Line::from(""));
    let prefs_path = app
        .preferences
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "not saved (no config directory)".to_string());
    lines.push(Line::from(vec![label("Preferences: "), Span::raw(prefs_path)]));

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(theme.block(" WALLET "));
    f.render_widget(panel, area);
}
