use thiserror::Error;

use crate::constants::{PROVIDER_UNRECOGNIZED_CHAIN, PROVIDER_USER_REJECTED};

/// Failure reported by a wallet provider call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("user rejected the request")]
    UserRejected,
    #[error("unrecognized chain id {0}")]
    UnrecognizedChain(String),
    #[error("provider error {code}: {message}")]
    Rpc { code: i64, message: String },
}

impl ProviderError {
    pub fn code(&self) -> i64 {
        match self {
            ProviderError::UserRejected => PROVIDER_USER_REJECTED,
            ProviderError::UnrecognizedChain(_) => PROVIDER_UNRECOGNIZED_CHAIN,
            ProviderError::Rpc { code, .. } => *code,
        }
    }
}

/// Wallet session failures. These never escape the session as faults; they
/// end up in the session status or in a notice for the message area.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WalletError {
    #[error("no wallet provider detected")]
    ProviderUnavailable,
    #[error("wallet connection rejected: {0}")]
    ConnectionRejected(ProviderError),
    #[error("network {0} is not available in the wallet")]
    ChainUnregistered(u64),
    #[error("failed to switch network: {0}")]
    ChainSwitchFailed(ProviderError),
}

impl WalletError {
    /// Classifies a failed `switch_chain` call by the provider error code.
    pub fn from_switch(target_chain_id: u64, err: ProviderError) -> Self {
        if err.code() == PROVIDER_UNRECOGNIZED_CHAIN {
            WalletError::ChainUnregistered(target_chain_id)
        } else {
            WalletError::ChainSwitchFailed(err)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InventoryError {
    #[error("inventory item {0} not found")]
    NotFound(String),
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl InventoryError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        InventoryError::InvalidField { field, reason: reason.into() }
    }
}
