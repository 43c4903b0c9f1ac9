use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, Wrap},
    Frame,
};
use crate::app::{App, InputMode};
use crate::inventory::SortDirection;
use crate::utils::{format_currency, format_timestamp, shorten_id};
use super::utils::Theme;

pub fn draw_inventory(f: &mut Frame, app: &mut App, area: Rect) {
    let theme = Theme::for_app(app);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Search / prompt line
            Constraint::Min(5),     // Item table
            Constraint::Length(6),  // Selected item details
        ])
        .split(area);

    render_prompt(f, app, chunks[0], &theme);
    render_table(f, app, chunks[1], &theme);
    render_details(f, app, chunks[2], &theme);
}

fn render_prompt(f: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let (title, text, color) = match app.input_mode {
        InputMode::Search => (" SEARCH ", format!("{}▏", app.input_buffer), Color::Yellow),
        InputMode::Transfer => (" MOVE TO LOCATION ", format!("{}▏", app.input_buffer), Color::Yellow),
        InputMode::Normal if app.is_confirming => {
            let name = app.selected_item().map(|item| item.name.clone()).unwrap_or_default();
            (" CONFIRM ", format!("Remove {} from inventory? (Y/N)", name), Color::Yellow)
        }
        InputMode::Normal => {
            let arrow = match app.sort_direction {
                SortDirection::Ascending => "↑",
                SortDirection::Descending => "↓",
            };
            let filter = if app.search_term.is_empty() {
                "all items".to_string()
            } else {
                format!("\"{}\"", app.search_term)
            };
            (
                " FILTER ",
                format!("Showing {}  |  sorted by {} {}", filter, app.sort_field.label(), arrow),
                theme.text,
            )
        }
    };

    let prompt = Paragraph::new(text)
        .style(Style::default().fg(color))
        .block(theme.block(title));
    f.render_widget(prompt, area);
}

fn render_table(f: &mut Frame, app: &mut App, area: Rect, theme: &Theme) {
    let threshold = app.low_stock_threshold();
    let rows: Vec<Row> = app
        .visible_items()
        .into_iter()
        .map(|item| {
            let quantity_style = if item.quantity < threshold {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(theme.text)
            };
            Row::new(vec![
                Cell::from(item.name.clone()),
                Cell::from(item.sku.clone()),
                Cell::from(item.category.clone()),
                Cell::from(item.quantity.to_string()).style(quantity_style),
                Cell::from(format_currency(item.price)),
                Cell::from(item.location.clone()),
                Cell::from(format_timestamp(&item.last_updated)),
            ])
            .style(Style::default().fg(theme.text))
        })
        .collect();
    let count = rows.len();

    let header = Row::new(vec!["NAME", "SKU", "CATEGORY", "QTY", "PRICE", "LOCATION", "UPDATED"])
        .style(Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD));
    let widths = [
        Constraint::Percentage(22),
        Constraint::Percentage(14),
        Constraint::Percentage(14),
        Constraint::Percentage(7),
        Constraint::Percentage(11),
        Constraint::Percentage(14),
        Constraint::Percentage(18),
    ];

    let title = format!(" INVENTORY ({} items) ", count);
    let table = Table::new(rows, widths)
        .header(header)
        .block(theme.block(&title))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).fg(theme.highlight))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.inventory_state);
}

fn render_details(f: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let block = theme.block(" ITEM DETAILS ");
    let Some(item) = app.selected_item() else {
        f.render_widget(
            Paragraph::new("No items match").style(Style::default().fg(theme.dim)).block(block),
            area,
        );
        return;
    };

    let label = |text: &'static str| Span::styled(text, Style::default().fg(theme.dim));
    let lines = vec![
        Line::from(vec![
            label("Description: "),
            Span::styled(item.description.clone(), Style::default().fg(theme.text)),
        ]),
        Line::from(vec![
            label("Supplier: "),
            Span::styled(item.supplier.clone(), Style::default().fg(theme.text)),
            label("   Value: "),
            Span::styled(format_currency(item.value()), Style::default().fg(Color::Green)),
        ]),
        Line::from(vec![
            label("Ledger: "),
            Span::raw(item.blockchain_id.as_deref().map(shorten_id).unwrap_or_else(|| "-".to_string())),
            label("   Last tx: "),
            Span::raw(item.transaction_hash.as_deref().map(shorten_id).unwrap_or_else(|| "-".to_string())),
        ]),
    ];

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(block), area);
}
