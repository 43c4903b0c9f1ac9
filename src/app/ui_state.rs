use crate::app::core::{App, View};
use crate::preferences::TOGGLES;
use crate::app::MessageType;

fn step(selected: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let i = match selected {
        Some(i) if forward => (i + 1).min(len - 1),
        Some(i) => i.saturating_sub(1),
        None => 0,
    };
    Some(i)
}

impl App {
    pub fn history_len(&self) -> usize {
        match &self.history_item {
            Some(id) => self.store.journal().for_item(id).count(),
            None => self.store.journal().len(),
        }
    }

    fn move_selection(&mut self, forward: bool) {
        match self.view {
            View::Inventory => {
                let len = self.visible_items().len();
                let next = step(self.inventory_state.selected(), len, forward);
                self.inventory_state.select(next);
            }
            View::History => {
                let next = step(self.history_state.selected(), self.history_len(), forward);
                self.history_state.select(next);
            }
            View::Settings => {
                let next = step(self.settings_state.selected(), TOGGLES.len(), forward);
                self.settings_state.select(next);
            }
            View::Overview | View::AddItem => {}
        }
    }

    pub fn next_item(&mut self) {
        self.move_selection(true);
    }

    pub fn previous_item(&mut self) {
        self.move_selection(false);
    }

    pub fn set_view(&mut self, view: View) {
        if view != View::History {
            self.history_item = None;
        }
        self.is_confirming = false;
        self.view = view;
    }

    pub fn next_view(&mut self) {
        let next = View::ALL[(self.view.index() + 1) % View::ALL.len()];
        self.set_view(next);
    }

    /// Flips the highlighted settings toggle and saves it.
    pub fn toggle_selected_preference(&mut self) {
        let Some(&(key, label, _)) = self
            .settings_state
            .selected()
            .and_then(|i| TOGGLES.get(i))
        else {
            return;
        };
        match self.preferences.toggle(key) {
            Ok(value) => self.set_message(
                MessageType::Info,
                format!("{} {}", label, if value { "enabled" } else { "disabled" }),
            ),
            Err(e) => self.set_message(MessageType::Error, format!("Failed to save settings: {:#}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::core::tests::test_config;
    use crate::constants::PREF_AUTO_CONNECT;
    use crate::preferences::Preferences;

    #[test]
    fn selection_stops_at_list_edges() {
        let mut app = App::new(test_config(), Preferences::in_memory());
        app.set_view(View::Inventory);
        for _ in 0..10 {
            app.next_item();
        }
        assert_eq!(app.inventory_state.selected(), Some(3));
        for _ in 0..10 {
            app.previous_item();
        }
        assert_eq!(app.inventory_state.selected(), Some(0));
    }

    #[test]
    fn views_cycle_and_history_filter_resets() {
        let mut app = App::new(test_config(), Preferences::in_memory());
        app.set_view(View::Inventory);
        app.show_item_history();
        assert_eq!(app.view, View::History);
        assert!(app.history_item.is_some());
        assert_eq!(app.history_len(), 1);

        app.next_view();
        assert_eq!(app.view, View::Settings);
        assert!(app.history_item.is_none());
        app.next_view();
        assert_eq!(app.view, View::Overview);
    }

    #[test]
    fn settings_toggle_flips_preference() {
        let mut app = App::new(test_config(), Preferences::in_memory());
        app.set_view(View::Settings);
        assert_eq!(TOGGLES[0].0, PREF_AUTO_CONNECT);
        app.toggle_selected_preference();
        assert!(app.preferences.auto_connect());
        app.toggle_selected_preference();
        assert!(!app.preferences.auto_connect());
    }
}
