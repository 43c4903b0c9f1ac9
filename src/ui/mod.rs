// UI module for the InvenChain terminal dashboard
// This module handles all the terminal UI rendering logic

mod add_item;
mod dashboard;
mod draw;
mod history;
mod inventory;
mod main_view;
mod settings;
mod utils;

// Re-export the public functions
pub use draw::draw;
