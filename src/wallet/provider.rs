use async_trait::async_trait;
use futures::channel::mpsc::{TryRecvError, UnboundedReceiver};
use std::sync::Arc;
use tracing::debug;

use crate::error::ProviderError;
use super::types::{NetworkInfo, WalletEvent};

pub type SubscriptionId = u64;

/// Capabilities of an injected wallet (browser extension or stand-in).
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Prompts the user to authorize accounts for this app.
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError>;

    /// Accounts already authorized; empty when the app was never approved.
    async fn list_accounts(&self) -> Result<Vec<String>, ProviderError>;

    async fn get_network(&self) -> Result<NetworkInfo, ProviderError>;

    async fn switch_chain(&self, chain_id_hex: &str) -> Result<(), ProviderError>;

    fn subscribe(&self) -> (SubscriptionId, UnboundedReceiver<WalletEvent>);

    fn unsubscribe(&self, id: SubscriptionId);
}

/// Registration for `accountsChanged` / `chainChanged`. Dropping it
/// deregisters from the provider.
pub struct Subscription {
    id: SubscriptionId,
    provider: Arc<dyn WalletProvider>,
    events: UnboundedReceiver<WalletEvent>,
}

impl Subscription {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        let (id, events) = provider.subscribe();
        debug!(id, "subscribed to wallet events");
        Subscription { id, provider, events }
    }

    /// Next queued event without waiting.
    pub fn try_next(&mut self) -> Option<WalletEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            // the provider hung up; nothing more will arrive
            Err(TryRecvError::Closed) => None,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.provider.unsubscribe(self.id);
        debug!(id = self.id, "unsubscribed from wallet events");
    }
}
