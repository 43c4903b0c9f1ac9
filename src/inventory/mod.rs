mod types;
mod synth;
mod journal;
mod seed;
mod store;

pub use types::{
    InventoryItem, ItemUpdate, NewItem, SortDirection, SortField, TransactionRecord,
    TransactionType,
};
pub use store::{AccountSource, InventoryStore};
