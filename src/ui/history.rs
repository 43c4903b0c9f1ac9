use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};
use crate::app::App;
use crate::inventory::TransactionRecord;
use crate::utils::{format_timestamp, shorten_id};
use super::utils::{transaction_color, Theme};

/// Journal entries, newest first, optionally for a single item.
pub fn draw_history(f: &mut Frame, app: &mut App, area: Rect) {
    let theme = Theme::for_app(app);

    let records: Vec<&TransactionRecord> = match &app.history_item {
        Some(id) => {
            let mut records = app.store.transactions_for_item(id);
            records.reverse();
            records
        }
        None => app.store.journal().newest_first().collect(),
    };

    let title = match (&app.history_item, records.first()) {
        (Some(_), Some(record)) => format!(" HISTORY: {} ", record.item_name),
        (Some(id), None) => format!(" HISTORY: item {} ", id),
        (None, _) => format!(" TRANSACTION HISTORY ({}) ", records.len()),
    };

    let items: Vec<ListItem> = records
        .iter()
        .map(|record| {
            let block = record
                .block_number
                .map(|b| format!("#{}", b))
                .unwrap_or_else(|| "pending".to_string());
            let mut lines = vec![
                Line::from(vec![
                    Span::styled(
                        format!("{:<8} ", record.kind),
                        Style::default()
                            .fg(transaction_color(record.kind))
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(record.item_name.clone(), Style::default().fg(theme.text)),
                    Span::styled(format!("  x{}", record.quantity), Style::default().fg(theme.highlight)),
                    Span::styled(
                        format!("  {}  {}", record.id, format_timestamp(&record.timestamp)),
                        Style::default().fg(theme.dim),
                    ),
                ]),
                Line::from(Span::styled(
                    format!(
                        "         by {}  block {}  tx {}",
                        shorten_id(&record.user),
                        block,
                        shorten_id(&record.transaction_hash)
                    ),
                    Style::default().fg(theme.dim),
                )),
            ];
            if let Some(details) = &record.details {
                lines.push(Line::from(Span::styled(
                    format!("         {}", details),
                    Style::default().fg(theme.dim).add_modifier(Modifier::ITALIC),
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(theme.block(&title))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, &mut app.history_state);
}
