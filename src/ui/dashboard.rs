use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};
use crate::app::App;
use crate::utils::{format_currency, format_timestamp, shorten_id};
use super::utils::{transaction_color, Theme};

pub fn draw_dashboard(f: &mut Frame, app: &App, area: Rect) {
    let theme = Theme::for_app(app);
    let threshold = app.low_stock_threshold();
    let summary = app.store.summary(threshold);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(4)])
        .split(area);

    let stat_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(rows[0]);

    let low_stock_color = if summary.low_stock.is_empty() { theme.text } else { Color::Yellow };
    let stats = [
        (" TOTAL ITEMS ", summary.total_items.to_string(), theme.text),
        (" TOTAL QUANTITY ", summary.total_quantity.to_string(), theme.text),
        (" INVENTORY VALUE ", format_currency(summary.total_value), Color::Green),
        (" LOW STOCK ", summary.low_stock.len().to_string(), low_stock_color),
    ];
    for ((title, value, color), stat_area) in stats.into_iter().zip(stat_areas.iter()) {
        let stat = Paragraph::new(value)
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(theme.block(title));
        f.render_widget(stat, *stat_area);
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[1]);

    // Low stock alerts
    let low_stock: Vec<ListItem> = if summary.low_stock.is_empty() {
        vec![ListItem::new("All items are sufficiently stocked")
            .style(Style::default().fg(theme.dim))]
    } else {
        summary
            .low_stock
            .iter()
            .map(|item| {
                ListItem::new(Line::from(vec![
                    Span::styled("▲ ", Style::default().fg(Color::Yellow)),
                    Span::styled(item.name.clone(), Style::default().fg(theme.text)),
                    Span::styled(
                        format!("  {} left", item.quantity),
                        Style::default().fg(Color::Yellow),
                    ),
                ]))
            })
            .collect()
    };
    let low_stock_title = format!(" LOW STOCK (< {}) ", threshold);
    f.render_widget(
        List::new(low_stock).block(theme.block(&low_stock_title)),
        columns[0],
    );

    // Recent transactions
    let recent: Vec<ListItem> = summary
        .recent
        .iter()
        .map(|record| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        format!("{:<8} ", record.kind),
                        Style::default().fg(transaction_color(record.kind)).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(record.item_name.clone(), Style::default().fg(theme.text)),
                    Span::styled(format!("  x{}", record.quantity), Style::default().fg(theme.highlight)),
                ]),
                Line::from(Span::styled(
                    format!(
                        "         {}  by {}  tx {}",
                        format_timestamp(&record.timestamp),
                        shorten_id(&record.user),
                        shorten_id(&record.transaction_hash)
                    ),
                    Style::default().fg(theme.dim),
                )),
            ])
        })
        .collect();
    f.render_widget(
        List::new(recent).block(theme.block(" RECENT TRANSACTIONS ")),
        columns[1],
    );
}
