use rand::Rng;
use std::collections::HashSet;

use crate::constants::{LEDGER_ADDRESS_BYTES, TX_HASH_BYTES};

/// Issues placeholder transaction hashes and ledger addresses. Values only
/// need to be distinct, so every issued value is remembered.
#[derive(Debug, Default)]
pub struct IdSynthesizer {
    issued: HashSet<String>,
}

fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill(&mut buf[..]);
    format!("0x{}", hex::encode(buf))
}

impl IdSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an externally created value as taken.
    pub fn reserve(&mut self, value: &str) {
        self.issued.insert(value.to_ascii_lowercase());
    }

    fn fresh(&mut self, bytes: usize) -> String {
        loop {
            let candidate = random_hex(bytes);
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// 0x followed by 64 hex characters
    pub fn tx_hash(&mut self) -> String {
        self.fresh(TX_HASH_BYTES)
    }

    /// 0x followed by 40 hex characters
    pub fn ledger_address(&mut self) -> String {
        self.fresh(LEDGER_ADDRESS_BYTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_hex_with_len(value: &str, len: usize) -> bool {
        value.len() == len + 2
            && value.starts_with("0x")
            && value[2..].chars().all(|c| c.is_ascii_hexdigit())
    }

    #[test]
    fn formats_match_hash_and_address_shapes() {
        let mut synth = IdSynthesizer::new();
        assert!(is_hex_with_len(&synth.tx_hash(), 64));
        assert!(is_hex_with_len(&synth.ledger_address(), 40));
    }

    #[test]
    fn never_repeats_a_value() {
        let mut synth = IdSynthesizer::new();
        let hashes: HashSet<String> = (0..500).map(|_| synth.tx_hash()).collect();
        assert_eq!(hashes.len(), 500);
    }
}
