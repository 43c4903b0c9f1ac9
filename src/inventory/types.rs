use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub quantity: u32,
    pub price: f64,
    pub sku: String,
    pub location: String,
    pub last_updated: DateTime<Utc>,
    pub supplier: String,
    /// Synthesized ledger address (0x + 40 hex)
    pub blockchain_id: Option<String>,
    /// Synthesized hash of the last mutation (0x + 64 hex)
    pub transaction_hash: Option<String>,
}

impl InventoryItem {
    pub fn value(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// Fields supplied when adding an item; the store fills in the rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub category: String,
    pub quantity: u32,
    pub price: f64,
    pub sku: String,
    pub location: String,
    pub supplier: String,
}

/// Partial update; `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<u32>,
    pub price: Option<f64>,
    pub sku: Option<String>,
    pub location: Option<String>,
    pub supplier: Option<String>,
}

impl ItemUpdate {
    pub fn quantity(quantity: u32) -> Self {
        ItemUpdate { quantity: Some(quantity), ..Default::default() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Add,
    Remove,
    Update,
    Transfer,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionType::Add => "ADD",
            TransactionType::Remove => "REMOVE",
            TransactionType::Update => "UPDATE",
            TransactionType::Transfer => "TRANSFER",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub item_id: String,
    /// Item name when the entry was recorded
    pub item_name: String,
    pub quantity: u32,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub transaction_hash: String,
    pub block_number: Option<u64>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Category,
    Quantity,
    Price,
    Location,
    LastUpdated,
}

impl SortField {
    pub fn next(self) -> Self {
        match self {
            SortField::Name => SortField::Category,
            SortField::Category => SortField::Quantity,
            SortField::Quantity => SortField::Price,
            SortField::Price => SortField::Location,
            SortField::Location => SortField::LastUpdated,
            SortField::LastUpdated => SortField::Name,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Category => "category",
            SortField::Quantity => "quantity",
            SortField::Price => "price",
            SortField::Location => "location",
            SortField::LastUpdated => "last updated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}
