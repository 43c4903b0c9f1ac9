use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use crate::app::form::{CATEGORIES, FIELD_CATEGORY, FIELD_LABELS};
use crate::app::App;
use super::utils::Theme;

/// Renders the add-stock form: two columns of four fields.
pub fn draw_add_item(f: &mut Frame, app: &App, area: Rect) {
    let theme = Theme::for_app(app);

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(12)])
        .split(area);

    let status = if app.session.is_connected() {
        Line::from(vec![
            Span::styled(">> ", Style::default().fg(theme.highlight)),
            Span::raw("Add new items to your blockchain-secured inventory"),
        ])
    } else {
        Line::from(vec![
            Span::styled(">> ", Style::default().fg(Color::Yellow)),
            Span::styled(
                "Connect your wallet (C on the dashboard) before adding stock",
                Style::default().fg(Color::Yellow),
            ),
        ])
    };
    f.render_widget(
        Paragraph::new(status).block(theme.block(" NEW INVENTORY ITEM ")),
        outer[0],
    );

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(outer[1]);

    for (column, fields) in columns.iter().zip([0..4usize, 4..8usize]) {
        let slots = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3); 4])
            .split(*column);
        for (slot, field) in slots.iter().zip(fields) {
            render_field(f, app, *slot, field, &theme);
        }
    }
}

fn render_field(f: &mut Frame, app: &App, area: Rect, field: usize, theme: &Theme) {
    let focused = app.form.focused == field;
    let error = app.form.error_for(field);

    let title = match error {
        Some(message) => format!(" {} - {} ", FIELD_LABELS[field], message),
        None => format!(" {} ", FIELD_LABELS[field]),
    };
    let border_color = match (error, focused) {
        (Some(_), _) => Color::Red,
        (None, true) => Color::Yellow,
        (None, false) => theme.base,
    };

    let value = &app.form.values[field];
    let mut spans = vec![Span::styled(value.clone(), Style::default().fg(theme.text))];
    if focused {
        spans.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
    }
    if field == FIELD_CATEGORY && value.is_empty() {
        let suggestions = CATEGORIES[..3].join(", ");
        spans.push(Span::styled(
            format!(" e.g. {}...", suggestions),
            Style::default().fg(theme.dim).add_modifier(Modifier::ITALIC),
        ));
    }

    let block = theme
        .block(&title)
        .border_style(Style::default().fg(border_color));
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
