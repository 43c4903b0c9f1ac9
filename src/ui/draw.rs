use ratatui::Frame;
use crate::app::{App, View};
use super::{add_item, dashboard, history, inventory, main_view, settings};

/// Main entry point for UI rendering: the shared frame, then the active view
pub fn draw(f: &mut Frame, app: &mut App) {
    let content = main_view::draw_main(f, app);
    match app.view {
        View::Overview => dashboard::draw_dashboard(f, app, content),
        View::Inventory => inventory::draw_inventory(f, app, content),
        View::AddItem => add_item::draw_add_item(f, app, content),
        View::History => history::draw_history(f, app, content),
        View::Settings => settings::draw_settings(f, app, content),
    }
}
