use chrono::{DateTime, Duration, Utc};

use super::types::{InventoryItem, TransactionRecord, TransactionType};

// (name, description, category, quantity, price, sku, location, supplier, ledger address, tx hash)
const DEMO_ITEMS: [(&str, &str, &str, u32, f64, &str, &str, &str, &str, &str); 4] = [
    (
        "Premium Laptop",
        "High-performance laptop with 16GB RAM and 512GB SSD",
        "Electronics",
        15,
        1299.99,
        "ELEC-LAP-001",
        "Warehouse A",
        "TechSupplies Inc.",
        "0x1234567890123456789012345678901234567890",
        "0xabcdef1234567890abcdef1234567890abcdef1234567890abcdef1234567890",
    ),
    (
        "Office Chair",
        "Ergonomic office chair with adjustable height",
        "Furniture",
        30,
        159.99,
        "FURN-CHR-002",
        "Warehouse B",
        "OfficeFurnish Ltd.",
        "0x2345678901234567890123456789012345678901",
        "0xbcdef1234567890abcdef1234567890abcdef1234567890abcdef1234567890a",
    ),
    (
        "Wireless Headphones",
        "Noise-cancelling Bluetooth headphones",
        "Electronics",
        50,
        89.99,
        "ELEC-AUD-003",
        "Warehouse A",
        "AudioTech Co.",
        "0x3456789012345678901234567890123456789012",
        "0xcdef1234567890abcdef1234567890abcdef1234567890abcdef1234567890ab",
    ),
    (
        "LED Monitor",
        "27-inch 4K Ultra HD Monitor",
        "Electronics",
        20,
        349.99,
        "ELEC-MON-004",
        "Warehouse C",
        "DisplayTech Inc.",
        "0x4567890123456789012345678901234567890123",
        "0xdef1234567890abcdef1234567890abcdef1234567890abcdef1234567890abc",
    ),
];

// (type, item id, item name, quantity, days ago, user, tx hash, block, details)
const DEMO_HISTORY: [(TransactionType, &str, &str, u32, i64, &str, &str, u64, &str); 5] = [
    (
        TransactionType::Add,
        "1",
        "Premium Laptop",
        20,
        10,
        "0xuser1",
        "0xabcdef1234567890abcdef1234567890abcdef1234567890abcdef1234567890",
        14356789,
        "Initial inventory addition",
    ),
    (
        TransactionType::Remove,
        "1",
        "Premium Laptop",
        5,
        5,
        "0xuser1",
        "0xbcdef1234567890abcdef1234567890abcdef1234567890abcdef1234567890a",
        14356901,
        "Sent to customer order #10293",
    ),
    (
        TransactionType::Add,
        "2",
        "Office Chair",
        30,
        4,
        "0xuser2",
        "0xcdef1234567890abcdef1234567890abcdef1234567890abcdef1234567890ab",
        14357012,
        "Restocking from supplier",
    ),
    (
        TransactionType::Add,
        "3",
        "Wireless Headphones",
        50,
        2,
        "0xuser1",
        "0xdef1234567890abcdef1234567890abcdef1234567890abcdef1234567890abc",
        14357256,
        "New inventory arrival",
    ),
    (
        TransactionType::Add,
        "4",
        "LED Monitor",
        20,
        1,
        "0xuser2",
        "0xef1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcd",
        14357890,
        "Initial stock",
    ),
];

/// Demo catalogue, all stamped with `now`.
pub fn demo_items(now: DateTime<Utc>) -> Vec<InventoryItem> {
    DEMO_ITEMS
        .iter()
        .enumerate()
        .map(
            |(index, &(name, description, category, quantity, price, sku, location, supplier, address, hash))| {
                InventoryItem {
                    id: (index + 1).to_string(),
                    name: name.to_string(),
                    description: description.to_string(),
                    category: category.to_string(),
                    quantity,
                    price,
                    sku: sku.to_string(),
                    location: location.to_string(),
                    last_updated: now,
                    supplier: supplier.to_string(),
                    blockchain_id: Some(address.to_string()),
                    transaction_hash: Some(hash.to_string()),
                }
            },
        )
        .collect()
}

/// History leading up to the demo catalogue, oldest first.
pub fn demo_history(now: DateTime<Utc>) -> Vec<TransactionRecord> {
    DEMO_HISTORY
        .iter()
        .enumerate()
        .map(
            |(index, &(kind, item_id, item_name, quantity, days_ago, user, hash, block, details))| {
                TransactionRecord {
                    id: format!("tx{}", index + 1),
                    kind,
                    item_id: item_id.to_string(),
                    item_name: item_name.to_string(),
                    quantity,
                    timestamp: now - Duration::days(days_ago),
                    user: user.to_string(),
                    transaction_hash: hash.to_string(),
                    block_number: Some(block),
                    details: Some(details.to_string()),
                }
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_chronological_with_rising_blocks() {
        let history = demo_history(Utc::now());
        for pair in history.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
            assert!(pair[0].block_number < pair[1].block_number);
        }
    }
}
