use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use tracing::{debug, info};

use crate::constants::{RECENT_TRANSACTIONS, UNKNOWN_USER};
use crate::error::InventoryError;
use super::journal::Journal;
use super::seed;
use super::synth::IdSynthesizer;
use super::types::{
    InventoryItem, ItemUpdate, NewItem, SortDirection, SortField, TransactionRecord,
    TransactionType,
};

/// Whoever is acting on the store; journal entries are attributed to it.
pub trait AccountSource {
    fn current_account(&self) -> Option<&str>;
}

impl AccountSource for str {
    fn current_account(&self) -> Option<&str> {
        Some(self)
    }
}

impl AccountSource for Option<String> {
    fn current_account(&self) -> Option<&str> {
        self.as_deref()
    }
}

/// Dashboard figures.
#[derive(Debug)]
pub struct InventorySummary<'a> {
    pub total_items: usize,
    pub total_quantity: u64,
    pub total_value: f64,
    pub low_stock: Vec<&'a InventoryItem>,
    pub recent: Vec<&'a TransactionRecord>,
}

/// Items keyed by id plus their journal. Every successful mutation changes
/// the items and appends exactly one journal entry; a failed one changes
/// neither.
#[derive(Debug)]
pub struct InventoryStore {
    items: Vec<InventoryItem>,
    journal: Journal,
    synth: IdSynthesizer,
    next_id: u64,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Default for InventoryStore {
    fn default() -> Self {
        InventoryStore {
            items: Vec::new(),
            journal: Journal::new(),
            synth: IdSynthesizer::new(),
            next_id: 1,
            last_timestamp: None,
        }
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), InventoryError> {
    if value.trim().is_empty() {
        Err(InventoryError::invalid(field, "must not be empty"))
    } else {
        Ok(())
    }
}

fn require_price(price: f64) -> Result<(), InventoryError> {
    if price.is_finite() && price > 0.0 {
        Ok(())
    } else {
        Err(InventoryError::invalid("price", "must be greater than 0"))
    }
}

fn validate_new(fields: &NewItem) -> Result<(), InventoryError> {
    require_text("name", &fields.name)?;
    require_text("description", &fields.description)?;
    require_text("category", &fields.category)?;
    if fields.quantity == 0 {
        return Err(InventoryError::invalid("quantity", "must be at least 1"));
    }
    require_price(fields.price)?;
    require_text("sku", &fields.sku)?;
    require_text("location", &fields.location)?;
    require_text("supplier", &fields.supplier)?;
    Ok(())
}

fn validate_update(update: &ItemUpdate) -> Result<(), InventoryError> {
    let text_fields = [
        ("name", &update.name),
        ("description", &update.description),
        ("category", &update.category),
        ("sku", &update.sku),
        ("location", &update.location),
        ("supplier", &update.supplier),
    ];
    for (field, value) in text_fields {
        if let Some(value) = value {
            require_text(field, value)?;
        }
    }
    if let Some(price) = update.price {
        require_price(price)?;
    }
    Ok(())
}

fn apply_text(target: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *target = value.trim().to_string();
    }
}

struct Draft<'a> {
    kind: TransactionType,
    item: &'a InventoryItem,
    quantity: u32,
    user: String,
    details: String,
}

fn record(journal: &Journal, draft: Draft<'_>, tx_hash: String) -> TransactionRecord {
    TransactionRecord {
        id: journal.next_record_id(),
        kind: draft.kind,
        item_id: draft.item.id.clone(),
        item_name: draft.item.name.clone(),
        quantity: draft.quantity,
        timestamp: draft.item.last_updated,
        user: draft.user,
        transaction_hash: tx_hash,
        block_number: Some(journal.next_block_number()),
        details: Some(draft.details),
    }
}

fn user_of<A: AccountSource + ?Sized>(actor: &A) -> String {
    actor.current_account().unwrap_or(UNKNOWN_USER).to_string()
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with the demo catalogue and its history.
    pub fn with_demo_data() -> Self {
        let now = Utc::now();
        Self::from_history(seed::demo_items(now), seed::demo_history(now))
    }

    /// Builds a store from existing items and journal entries, reserving
    /// their ids and hashes so fresh ones never collide.
    pub fn from_history(items: Vec<InventoryItem>, history: Vec<TransactionRecord>) -> Self {
        let mut store = Self::new();

        let mut max_id = 0;
        let mut latest: Option<DateTime<Utc>> = None;
        for item in &items {
            max_id = max_id.max(item.id.parse::<u64>().unwrap_or(0));
            latest = latest.max(Some(item.last_updated));
            if let Some(hash) = &item.transaction_hash {
                store.synth.reserve(hash);
            }
            if let Some(address) = &item.blockchain_id {
                store.synth.reserve(address);
            }
        }
        for entry in history {
            max_id = max_id.max(entry.item_id.parse::<u64>().unwrap_or(0));
            latest = latest.max(Some(entry.timestamp));
            store.synth.reserve(&entry.transaction_hash);
            store.journal.append(entry);
        }

        store.items = items;
        store.next_id = max_id + 1;
        store.last_timestamp = latest;
        store
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn get_item(&self, id: &str) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Journal entries for an item in chronological order, including
    /// entries recorded after the item was removed.
    pub fn transactions_for_item(&self, item_id: &str) -> Vec<&TransactionRecord> {
        self.journal.for_item(item_id).collect()
    }

    fn position(&self, id: &str) -> Result<usize, InventoryError> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| InventoryError::NotFound(id.to_string()))
    }

    // ids are never reused, not even those of removed items
    fn allocate_id(&mut self) -> String {
        loop {
            let id = self.next_id.to_string();
            self.next_id += 1;
            let taken = self.get_item(&id).is_some() || self.journal.for_item(&id).next().is_some();
            if !taken {
                return id;
            }
        }
    }

    /// Operation time, strictly after the previous one.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }

    pub fn add_item<A: AccountSource + ?Sized>(
        &mut self,
        fields: NewItem,
        actor: &A,
    ) -> Result<&InventoryItem, InventoryError> {
        validate_new(&fields)?;

        let id = self.allocate_id();
        let last_updated = self.next_timestamp();
        let tx_hash = self.synth.tx_hash();
        let item = InventoryItem {
            id,
            name: fields.name.trim().to_string(),
            description: fields.description.trim().to_string(),
            category: fields.category.trim().to_string(),
            quantity: fields.quantity,
            price: fields.price,
            sku: fields.sku.trim().to_string(),
            location: fields.location.trim().to_string(),
            last_updated,
            supplier: fields.supplier.trim().to_string(),
            blockchain_id: Some(self.synth.ledger_address()),
            transaction_hash: Some(tx_hash.clone()),
        };

        let entry = record(
            &self.journal,
            Draft {
                kind: TransactionType::Add,
                item: &item,
                quantity: item.quantity,
                user: user_of(actor),
                details: "Added new inventory item".to_string(),
            },
            tx_hash,
        );
        info!(id = %item.id, name = %item.name, quantity = item.quantity, tx = %entry.id, "item added");

        self.items.push(item);
        self.journal.append(entry);
        Ok(&self.items[self.items.len() - 1])
    }

    pub fn update_item<A: AccountSource + ?Sized>(
        &mut self,
        id: &str,
        update: ItemUpdate,
        actor: &A,
    ) -> Result<&InventoryItem, InventoryError> {
        let index = self.position(id)?;
        validate_update(&update)?;

        let user = user_of(actor);
        let last_updated = self.next_timestamp();
        let tx_hash = self.synth.tx_hash();

        let item = &mut self.items[index];
        apply_text(&mut item.name, update.name);
        apply_text(&mut item.description, update.description);
        apply_text(&mut item.category, update.category);
        apply_text(&mut item.sku, update.sku);
        apply_text(&mut item.location, update.location);
        apply_text(&mut item.supplier, update.supplier);
        if let Some(quantity) = update.quantity {
            item.quantity = quantity;
        }
        if let Some(price) = update.price {
            item.price = price;
        }
        item.last_updated = last_updated;
        item.transaction_hash = Some(tx_hash.clone());

        let item = &self.items[index];
        let entry = record(
            &self.journal,
            Draft {
                kind: TransactionType::Update,
                item,
                quantity: item.quantity,
                user,
                details: "Updated inventory item details".to_string(),
            },
            tx_hash,
        );
        info!(id, quantity = item.quantity, tx = %entry.id, "item updated");

        self.journal.append(entry);
        Ok(&self.items[index])
    }

    /// Moves an item to another location, recorded as a TRANSFER.
    pub fn transfer_item<A: AccountSource + ?Sized>(
        &mut self,
        id: &str,
        location: &str,
        actor: &A,
    ) -> Result<&InventoryItem, InventoryError> {
        let index = self.position(id)?;
        require_text("location", location)?;
        let location = location.trim();
        if self.items[index].location == location {
            return Err(InventoryError::invalid("location", "item is already there"));
        }

        let user = user_of(actor);
        let last_updated = self.next_timestamp();
        let tx_hash = self.synth.tx_hash();

        let item = &mut self.items[index];
        let from = std::mem::replace(&mut item.location, location.to_string());
        item.last_updated = last_updated;
        item.transaction_hash = Some(tx_hash.clone());

        let item = &self.items[index];
        let entry = record(
            &self.journal,
            Draft {
                kind: TransactionType::Transfer,
                item,
                quantity: item.quantity,
                user,
                details: format!("Transferred from {} to {}", from, location),
            },
            tx_hash,
        );
        info!(id, from = %from, to = %location, tx = %entry.id, "item transferred");

        self.journal.append(entry);
        Ok(&self.items[index])
    }

    pub fn remove_item<A: AccountSource + ?Sized>(
        &mut self,
        id: &str,
        actor: &A,
    ) -> Result<InventoryItem, InventoryError> {
        let index = self.position(id)?;

        let user = user_of(actor);
        let removed_at = self.next_timestamp();
        let tx_hash = self.synth.tx_hash();
        let mut item = self.items.remove(index);
        item.last_updated = removed_at;

        let entry = record(
            &self.journal,
            Draft {
                kind: TransactionType::Remove,
                item: &item,
                quantity: item.quantity,
                user,
                details: "Removed item from inventory".to_string(),
            },
            tx_hash,
        );
        info!(id, name = %item.name, tx = %entry.id, "item removed");

        self.journal.append(entry);
        Ok(item)
    }

    pub fn summary(&self, low_stock_threshold: u32) -> InventorySummary<'_> {
        InventorySummary {
            total_items: self.items.len(),
            total_quantity: self.items.iter().map(|item| item.quantity as u64).sum(),
            total_value: self.items.iter().map(InventoryItem::value).sum(),
            low_stock: self
                .items
                .iter()
                .filter(|item| item.quantity < low_stock_threshold)
                .collect(),
            recent: self.journal.newest_first().take(RECENT_TRANSACTIONS).collect(),
        }
    }

    /// Case-insensitive match on name, SKU, category or supplier, sorted.
    pub fn search(
        &self,
        term: &str,
        field: SortField,
        direction: SortDirection,
    ) -> Vec<&InventoryItem> {
        let needle = term.trim().to_lowercase();
        let mut matches: Vec<&InventoryItem> = self
            .items
            .iter()
            .filter(|item| {
                needle.is_empty()
                    || [&item.name, &item.sku, &item.category, &item.supplier]
                        .iter()
                        .any(|text| text.to_lowercase().contains(&needle))
            })
            .collect();

        matches.sort_by(|a, b| {
            let ordering = compare_by(a, b, field);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
        debug!(term, results = matches.len(), "inventory search");
        matches
    }
}

fn compare_by(a: &InventoryItem, b: &InventoryItem, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortField::Category => a.category.to_lowercase().cmp(&b.category.to_lowercase()),
        SortField::Quantity => a.quantity.cmp(&b.quantity),
        SortField::Price => a.price.total_cmp(&b.price),
        SortField::Location => a.location.to_lowercase().cmp(&b.location.to_lowercase()),
        SortField::LastUpdated => a.last_updated.cmp(&b.last_updated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::WalletSession;
    use std::collections::HashSet;

    const ACCOUNT: &str = "0x71c7656ec7ab88b098defb751b7401b5f6d8976f";

    fn widget() -> NewItem {
        NewItem {
            name: "Widget".to_string(),
            description: "desc".to_string(),
            category: "Tools".to_string(),
            quantity: 5,
            price: 2.50,
            sku: "TL-001".to_string(),
            location: "Warehouse A".to_string(),
            supplier: "Acme".to_string(),
        }
    }

    #[test]
    fn add_update_remove_scenario() {
        let mut store = InventoryStore::new();

        let added = store.add_item(widget(), ACCOUNT).unwrap();
        let id = added.id.clone();
        let added_at = added.last_updated;
        assert_eq!(store.items().len(), 1);
        assert_eq!(store.journal().len(), 1);
        let first = &store.journal().entries()[0];
        assert_eq!(first.kind, TransactionType::Add);
        assert_eq!(first.quantity, 5);
        assert_eq!(first.user, ACCOUNT);

        let updated = store.update_item(&id, ItemUpdate::quantity(3), ACCOUNT).unwrap();
        assert_eq!(updated.quantity, 3);
        assert!(updated.last_updated > added_at);
        assert_eq!(store.journal().len(), 2);
        assert_eq!(store.journal().entries()[1].kind, TransactionType::Update);
        assert_eq!(store.journal().entries()[1].quantity, 3);

        store.remove_item(&id, ACCOUNT).unwrap();
        assert!(store.items().is_empty());
        assert!(store.get_item(&id).is_none());

        let history: Vec<TransactionType> =
            store.transactions_for_item(&id).iter().map(|r| r.kind).collect();
        assert_eq!(
            history,
            vec![TransactionType::Add, TransactionType::Update, TransactionType::Remove]
        );
        assert_eq!(store.journal().len(), 3);
    }

    #[test]
    fn zero_quantity_or_price_is_rejected_before_mutation() {
        let mut store = InventoryStore::new();

        let err = store.add_item(NewItem { quantity: 0, ..widget() }, ACCOUNT).unwrap_err();
        assert!(matches!(err, InventoryError::InvalidField { field: "quantity", .. }));

        let err = store.add_item(NewItem { price: 0.0, ..widget() }, ACCOUNT).unwrap_err();
        assert!(matches!(err, InventoryError::InvalidField { field: "price", .. }));

        let err = store.add_item(NewItem { supplier: "  ".into(), ..widget() }, ACCOUNT).unwrap_err();
        assert!(matches!(err, InventoryError::InvalidField { field: "supplier", .. }));

        assert!(store.items().is_empty());
        assert!(store.journal().is_empty());
    }

    #[test]
    fn removing_unknown_or_removed_item_is_not_found() {
        let mut store = InventoryStore::new();
        assert_eq!(
            store.remove_item("42", ACCOUNT).unwrap_err(),
            InventoryError::NotFound("42".to_string())
        );

        let id = store.add_item(widget(), ACCOUNT).unwrap().id.clone();
        store.remove_item(&id, ACCOUNT).unwrap();
        let journal_len = store.journal().len();

        assert!(matches!(store.remove_item(&id, ACCOUNT), Err(InventoryError::NotFound(_))));
        assert!(matches!(
            store.update_item(&id, ItemUpdate::quantity(1), ACCOUNT),
            Err(InventoryError::NotFound(_))
        ));
        assert_eq!(store.journal().len(), journal_len);
    }

    #[test]
    fn journal_grows_by_one_per_successful_mutation() {
        let mut store = InventoryStore::new();
        let mut expected = 0;
        let mut ids = Vec::new();

        for round in 0..10u32 {
            let id = store
                .add_item(NewItem { quantity: round + 1, ..widget() }, ACCOUNT)
                .unwrap()
                .id
                .clone();
            expected += 1;
            assert_eq!(store.journal().len(), expected);

            // failing calls leave the count alone
            let _ = store.add_item(NewItem { price: -1.0, ..widget() }, ACCOUNT);
            let _ = store.update_item("missing", ItemUpdate::quantity(1), ACCOUNT);
            let _ = store.update_item(&id, ItemUpdate { name: Some(String::new()), ..Default::default() }, ACCOUNT);
            assert_eq!(store.journal().len(), expected);

            if round % 2 == 0 {
                store.update_item(&id, ItemUpdate::quantity(round), ACCOUNT).unwrap();
                expected += 1;
            }
            ids.push(id);
        }
        for id in ids.iter().step_by(3) {
            store.remove_item(id, ACCOUNT).unwrap();
            expected += 1;
        }
        assert_eq!(store.journal().len(), expected);
    }

    #[test]
    fn ids_and_synthesized_values_are_never_reused() {
        let mut store = InventoryStore::new();
        let first = store.add_item(widget(), ACCOUNT).unwrap().id.clone();
        store.remove_item(&first, ACCOUNT).unwrap();
        let second = store.add_item(widget(), ACCOUNT).unwrap().id.clone();
        assert_ne!(first, second);

        store.update_item(&second, ItemUpdate::quantity(9), ACCOUNT).unwrap();
        let hashes: HashSet<&str> = store
            .journal()
            .entries()
            .iter()
            .map(|r| r.transaction_hash.as_str())
            .collect();
        assert_eq!(hashes.len(), store.journal().len());
        assert!(hashes.iter().all(|h| h.len() == 66));
        assert_eq!(store.get_item(&second).unwrap().blockchain_id.as_ref().unwrap().len(), 42);
    }

    #[test]
    fn disconnected_actor_is_recorded_as_unknown_user() {
        let session = WalletSession::new(None);
        let mut store = InventoryStore::new();
        store.add_item(widget(), &session).unwrap();
        assert_eq!(store.journal().entries()[0].user, UNKNOWN_USER);
    }

    #[test]
    fn update_keeps_quantity_when_not_given() {
        let mut store = InventoryStore::new();
        let id = store.add_item(widget(), ACCOUNT).unwrap().id.clone();
        let update = ItemUpdate { name: Some("Gadget".into()), price: Some(3.0), ..Default::default() };
        let item = store.update_item(&id, update, ACCOUNT).unwrap().clone();
        assert_eq!(item.name, "Gadget");
        assert_eq!(item.quantity, 5);

        let last = store.journal().entries().last().unwrap();
        assert_eq!(last.quantity, 5);
        assert_eq!(last.item_name, "Gadget");
        assert_eq!(Some(&last.transaction_hash), item.transaction_hash.as_ref());
    }

    #[test]
    fn invalid_price_update_changes_nothing() {
        let mut store = InventoryStore::new();
        let id = store.add_item(widget(), ACCOUNT).unwrap().id.clone();
        let before = store.get_item(&id).unwrap().clone();

        let err = store
            .update_item(&id, ItemUpdate { price: Some(f64::NAN), quantity: Some(1), ..Default::default() }, ACCOUNT)
            .unwrap_err();
        assert!(matches!(err, InventoryError::InvalidField { field: "price", .. }));
        assert_eq!(store.get_item(&id).unwrap(), &before);
        assert_eq!(store.journal().len(), 1);
    }

    #[test]
    fn transfer_moves_item_and_records_it() {
        let mut store = InventoryStore::new();
        let id = store.add_item(widget(), ACCOUNT).unwrap().id.clone();

        let moved = store.transfer_item(&id, "Warehouse B", ACCOUNT).unwrap();
        assert_eq!(moved.location, "Warehouse B");

        let last = store.journal().entries().last().unwrap();
        assert_eq!(last.kind, TransactionType::Transfer);
        assert_eq!(last.quantity, 5);
        assert_eq!(last.details.as_deref(), Some("Transferred from Warehouse A to Warehouse B"));

        assert!(store.transfer_item(&id, "Warehouse B", ACCOUNT).is_err());
        assert!(matches!(
            store.transfer_item("nope", "Warehouse C", ACCOUNT),
            Err(InventoryError::NotFound(_))
        ));
        assert_eq!(store.journal().len(), 2);
    }

    #[test]
    fn summary_totals_and_low_stock() {
        let mut store = InventoryStore::new();
        store.add_item(widget(), ACCOUNT).unwrap();
        store.add_item(NewItem { name: "Crate".into(), quantity: 20, price: 10.0, ..widget() }, ACCOUNT).unwrap();

        let summary = store.summary(10);
        assert_eq!(summary.total_items, 2);
        assert_eq!(summary.total_quantity, 25);
        assert!((summary.total_value - 212.5).abs() < 1e-9);
        assert_eq!(summary.low_stock.len(), 1);
        assert_eq!(summary.low_stock[0].name, "Widget");
        assert_eq!(summary.recent[0].item_name, "Crate");
    }

    #[test]
    fn search_filters_and_sorts() {
        let mut store = InventoryStore::new();
        store.add_item(widget(), ACCOUNT).unwrap();
        store.add_item(NewItem { name: "anvil".into(), sku: "TL-002".into(), price: 90.0, ..widget() }, ACCOUNT).unwrap();
        store.add_item(NewItem { name: "Chair".into(), category: "Furniture".into(), sku: "FN-001".into(), supplier: "Seats Co".into(), ..widget() }, ACCOUNT).unwrap();

        let tools: Vec<&str> = store
            .search("tl-", SortField::Name, SortDirection::Ascending)
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(tools, vec!["anvil", "Widget"]);

        let by_price: Vec<&str> = store
            .search("", SortField::Price, SortDirection::Descending)
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(by_price[0], "anvil");

        assert_eq!(store.search("seats", SortField::Name, SortDirection::Ascending).len(), 1);
    }

    #[test]
    fn demo_store_allocates_fresh_ids_after_seed() {
        let mut store = InventoryStore::with_demo_data();
        assert_eq!(store.items().len(), 4);
        assert_eq!(store.journal().len(), 5);

        let id = store.add_item(widget(), ACCOUNT).unwrap().id.clone();
        assert_eq!(id, "5");
        let entry = store.journal().entries().last().unwrap();
        assert_eq!(entry.id, "tx6");
        let previous_block = store.journal().entries()[4].block_number.unwrap();
        assert!(entry.block_number.unwrap() > previous_block);
        assert!(entry.timestamp >= store.journal().entries()[4].timestamp);
    }

    #[test]
    fn item_history_outlives_the_lookup_key() {
        let mut store = InventoryStore::new();
        let id = store.add_item(widget(), ACCOUNT).unwrap().id.clone();
        store.update_item(&id, ItemUpdate::quantity(9), ACCOUNT).unwrap();

        let history = {
            let key = format!("{}", id);
            store.transactions_for_item(&key)
        };
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].quantity, 9);
    }
}
