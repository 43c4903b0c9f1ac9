// module declaration
pub mod core;
pub mod connection;
pub mod form;
pub mod inventory;
pub mod network;
pub mod ui_state;

// export App and related types
pub use core::App;
pub use core::{InputMode, MessageType, View};
