use rand::Rng;

use crate::constants::{BLOCK_NUMBER_BASE, BLOCK_NUMBER_MAX_STEP};
use super::types::TransactionRecord;

/// Append-only transaction history. Entries are never edited or removed;
/// order is insertion order.
#[derive(Debug)]
pub struct Journal {
    entries: Vec<TransactionRecord>,
    last_block: u64,
}

impl Default for Journal {
    fn default() -> Self {
        Journal {
            entries: Vec::new(),
            last_block: BLOCK_NUMBER_BASE,
        }
    }
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next appended record should carry: tx1, tx2, ...
    pub fn next_record_id(&self) -> String {
        format!("tx{}", self.entries.len() + 1)
    }

    /// Synthesized block number, strictly above every block recorded so far.
    pub fn next_block_number(&self) -> u64 {
        self.last_block + rand::thread_rng().gen_range(1..=BLOCK_NUMBER_MAX_STEP)
    }

    pub fn append(&mut self, record: TransactionRecord) {
        if let Some(block) = record.block_number {
            self.last_block = self.last_block.max(block);
        }
        self.entries.push(record);
    }

    pub fn entries(&self) -> &[TransactionRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn for_item<'a, 'b>(&'a self, item_id: &'b str) -> impl Iterator<Item = &'a TransactionRecord> + 'b
    where
        'a: 'b,
    {
        self.entries.iter().filter(move |record| record.item_id == item_id)
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.entries.iter().rev()
    }
}
