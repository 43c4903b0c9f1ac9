use tracing::warn;

use crate::app::core::{App, InputMode, View};
use crate::app::MessageType;
use crate::constants::PREF_NOTIFICATIONS;
use crate::error::InventoryError;
use crate::inventory::ItemUpdate;

impl App {
    /// Success messages for inventory changes respect the notifications
    /// preference; failures are always shown.
    fn report_mutation(&mut self, outcome: Result<String, InventoryError>) {
        match outcome {
            Ok(message) => {
                if self.preferences.flag(PREF_NOTIFICATIONS) {
                    self.set_message(MessageType::Success, message);
                }
            }
            Err(e) => {
                warn!(error = %e, "inventory operation failed");
                self.set_message(MessageType::Error, e.to_string());
            }
        }
    }

    pub fn submit_form(&mut self) {
        let Some(fields) = self.form.validate() else {
            self.set_message(MessageType::Error, "Please fix the highlighted fields".to_string());
            return;
        };
        if !self.session.is_connected() {
            self.set_message(
                MessageType::Error,
                "Wallet Not Connected: Please connect your wallet to add inventory items".to_string(),
            );
            return;
        }

        let outcome = self.store.add_item(fields, &self.session).map(|item| {
            format!("Stock Added: {} {} has been added to inventory", item.quantity, item.name)
        });
        if outcome.is_ok() {
            self.form.reset();
            self.view = View::Inventory;
        }
        self.report_mutation(outcome);
    }

    /// Raises or lowers the selected item's quantity by one.
    pub fn adjust_selected_quantity(&mut self, increase: bool) {
        let Some(item) = self.selected_item() else {
            return;
        };
        let (id, quantity) = (item.id.clone(), item.quantity);
        let next = if increase {
            quantity.checked_add(1)
        } else {
            quantity.checked_sub(1)
        };
        let Some(next) = next else {
            self.set_message(MessageType::Error, "Quantity cannot go below 0".to_string());
            return;
        };

        let outcome = self
            .store
            .update_item(&id, ItemUpdate::quantity(next), &self.session)
            .map(|item| format!("{} quantity is now {}", item.name, item.quantity));
        self.report_mutation(outcome);
    }

    pub fn start_remove_confirm(&mut self) {
        if self.selected_item().is_some() {
            self.is_confirming = true;
        }
    }

    pub fn cancel_remove(&mut self) {
        self.is_confirming = false;
    }

    pub fn confirm_remove(&mut self) {
        self.is_confirming = false;
        let Some(id) = self.selected_item().map(|item| item.id.clone()) else {
            return;
        };
        let outcome = self
            .store
            .remove_item(&id, &self.session)
            .map(|item| format!("Item Removed: {} has been removed from inventory", item.name));
        self.report_mutation(outcome);
        self.clamp_inventory_selection();
    }

    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Search;
        self.input_buffer = self.search_term.clone();
    }

    pub fn start_transfer(&mut self) {
        if let Some(item) = self.selected_item() {
            let location = item.location.clone();
            self.input_mode = InputMode::Transfer;
            self.input_buffer = location;
        }
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    /// Enter pressed while a prompt is open.
    pub fn submit_input(&mut self) {
        let value = std::mem::take(&mut self.input_buffer);
        match self.input_mode {
            InputMode::Search => {
                self.search_term = value.trim().to_string();
                self.inventory_state.select(Some(0));
            }
            InputMode::Transfer => {
                if let Some(id) = self.selected_item().map(|item| item.id.clone()) {
                    let outcome = self
                        .store
                        .transfer_item(&id, &value, &self.session)
                        .map(|item| format!("{} transferred to {}", item.name, item.location));
                    self.report_mutation(outcome);
                }
            }
            InputMode::Normal => {}
        }
        self.input_mode = InputMode::Normal;
    }

    pub fn cycle_sort_field(&mut self) {
        self.sort_field = self.sort_field.next();
    }

    pub fn toggle_sort_direction(&mut self) {
        self.sort_direction = self.sort_direction.toggle();
    }

    /// Opens the history view filtered to the selected item.
    pub fn show_item_history(&mut self) {
        if let Some(id) = self.selected_item().map(|item| item.id.clone()) {
            self.history_item = Some(id);
            self.history_state.select(Some(0));
            self.view = View::History;
        }
    }

    fn clamp_inventory_selection(&mut self) {
        let len = self.visible_items().len();
        let selected = self.inventory_state.selected().unwrap_or(0);
        self.inventory_state
            .select(if len == 0 { None } else { Some(selected.min(len - 1)) });
    }
}
