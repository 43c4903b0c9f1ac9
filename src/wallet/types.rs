// Basic type definitions for the wallet module

/// Wallet connection state. Account and chain only exist while connected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected { account: String, chain_id: u64 },
    Error(String),
}

/// Notifications pushed by the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    AccountsChanged(Vec<String>),
    /// Carries the new chain id in provider hex form
    ChainChanged(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInfo {
    pub chain_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// Transient user-facing notification produced by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub text: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, title: impl Into<String>, text: impl Into<String>) -> Self {
        Notice { kind, title: title.into(), text: text.into() }
    }
}

/// What handling a wallet event did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Ignored,
    Disconnected,
    AccountChanged(String),
    /// The chain changed; application state must be rebuilt from scratch
    ReloadRequired,
}
