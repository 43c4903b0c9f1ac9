use async_trait::async_trait;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::WalletConfig;
use crate::error::ProviderError;
use crate::utils::{chain_id_hex, network_name, parse_chain_id_hex};
use super::provider::{SubscriptionId, WalletProvider};
use super::types::{NetworkInfo, WalletEvent};

struct MockState {
    accounts: Vec<String>,
    authorized: bool,
    chain_id: u64,
    available_chains: Vec<u64>,
    reject_connections: bool,
    request_count: usize,
    next_subscription: SubscriptionId,
    subscribers: HashMap<SubscriptionId, UnboundedSender<WalletEvent>>,
}

impl MockState {
    fn emit(&mut self, event: WalletEvent) {
        // drop subscribers whose receiver is gone
        self.subscribers
            .retain(|_, tx| tx.unbounded_send(event.clone()).is_ok());
    }
}

/// In-process wallet that behaves like a browser extension: accounts need
/// authorizing, chains outside its list are unknown (4902), and state
/// changes are announced to subscribers.
pub struct MockWalletProvider {
    state: Mutex<MockState>,
    latency: Duration,
}

impl MockWalletProvider {
    pub fn new(accounts: Vec<String>, chain_id: u64, available_chains: Vec<u64>) -> Self {
        MockWalletProvider {
            state: Mutex::new(MockState {
                accounts,
                authorized: false,
                chain_id,
                available_chains,
                reject_connections: false,
                request_count: 0,
                next_subscription: 1,
                subscribers: HashMap::new(),
            }),
            latency: Duration::ZERO,
        }
    }

    pub fn from_config(config: &WalletConfig) -> Self {
        let provider = Self::new(
            config.accounts.clone(),
            config.chain_id,
            config.available_chains.clone(),
        )
        .with_latency(Duration::from_millis(config.latency_ms));
        {
            let mut state = provider.lock();
            state.authorized = config.preauthorized;
            state.reject_connections = config.reject_connections;
        }
        provider
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // the state stays consistent even if a holder panicked
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
    }

    #[cfg(test)]
    pub fn set_reject_connections(&self, reject: bool) {
        self.lock().reject_connections = reject;
    }

    /// Approves this app as if the user had connected in an earlier run.
    #[cfg(test)]
    pub fn authorize(&self) {
        self.lock().authorized = true;
    }

    /// Moves the first account to the back, as picking another account in
    /// the extension would. Returns the new active account.
    pub fn rotate_accounts(&self) -> Option<String> {
        let mut state = self.lock();
        if state.accounts.len() > 1 {
            state.accounts.rotate_left(1);
        }
        let active = state.accounts.first().cloned();
        if state.authorized {
            let accounts = state.accounts.clone();
            state.emit(WalletEvent::AccountsChanged(accounts));
        }
        active
    }

    /// The user locked the wallet or revoked this app.
    pub fn revoke(&self) {
        let mut state = self.lock();
        state.authorized = false;
        state.emit(WalletEvent::AccountsChanged(Vec::new()));
    }

    #[cfg(test)]
    pub fn chain_id(&self) -> u64 {
        self.lock().chain_id
    }

    #[cfg(test)]
    pub fn request_count(&self) -> usize {
        self.lock().request_count
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }
}

#[async_trait]
impl WalletProvider for MockWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        self.simulate_latency().await;
        let mut state = self.lock();
        state.request_count += 1;

        if state.reject_connections {
            info!("mock wallet rejected account request");
            return Err(ProviderError::UserRejected);
        }
        if state.accounts.is_empty() {
            return Err(ProviderError::Rpc {
                code: -32603,
                message: "wallet has no accounts".to_string(),
            });
        }
        state.authorized = true;
        Ok(state.accounts.clone())
    }

    async fn list_accounts(&self) -> Result<Vec<String>, ProviderError> {
        let state = self.lock();
        if state.authorized {
            Ok(state.accounts.clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn get_network(&self) -> Result<NetworkInfo, ProviderError> {
        let chain_id = self.lock().chain_id;
        debug!(chain_id, network = network_name(chain_id), "mock wallet network lookup");
        Ok(NetworkInfo { chain_id })
    }

    async fn switch_chain(&self, chain_id_hex_str: &str) -> Result<(), ProviderError> {
        self.simulate_latency().await;
        let target = parse_chain_id_hex(chain_id_hex_str).ok_or_else(|| ProviderError::Rpc {
            code: -32602,
            message: format!("invalid chain id {}", chain_id_hex_str),
        })?;

        let mut state = self.lock();
        if !state.available_chains.contains(&target) {
            return Err(ProviderError::UnrecognizedChain(chain_id_hex_str.to_string()));
        }
        if state.chain_id != target {
            state.chain_id = target;
            debug!(chain_id = target, "mock wallet switched chain");
            state.emit(WalletEvent::ChainChanged(chain_id_hex(target)));
        }
        Ok(())
    }

    fn subscribe(&self) -> (SubscriptionId, UnboundedReceiver<WalletEvent>) {
        let (tx, rx) = mpsc::unbounded();
        let mut state = self.lock();
        let id = state.next_subscription;
        state.next_subscription += 1;
        state.subscribers.insert(id, tx);
        (id, rx)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().subscribers.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc::TryRecvError;

    fn wallet() -> MockWalletProvider {
        MockWalletProvider::new(vec!["0xaaa".into(), "0xbbb".into()], 1, vec![1, 5])
    }

    #[tokio::test]
    async fn accounts_hidden_until_authorized() {
        let wallet = wallet();
        assert!(wallet.list_accounts().await.unwrap().is_empty());

        let granted = wallet.request_accounts().await.unwrap();
        assert_eq!(granted, vec!["0xaaa".to_string(), "0xbbb".to_string()]);
        assert_eq!(wallet.list_accounts().await.unwrap().len(), 2);
        assert_eq!(wallet.request_count(), 1);
    }

    #[tokio::test]
    async fn rejection_reports_user_rejected() {
        let wallet = wallet();
        wallet.set_reject_connections(true);
        let err = wallet.request_accounts().await.unwrap_err();
        assert_eq!(err.code(), 4001);
        assert!(wallet.list_accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_chain_is_4902_and_known_chain_emits_event() {
        let wallet = wallet();
        let (_id, mut events) = wallet.subscribe();

        let err = wallet.switch_chain("0xaa36a7").await.unwrap_err();
        assert_eq!(err.code(), 4902);
        assert_eq!(wallet.chain_id(), 1);

        wallet.switch_chain("0x5").await.unwrap();
        assert_eq!(wallet.chain_id(), 5);
        assert_eq!(
            events.try_recv().unwrap(),
            WalletEvent::ChainChanged("0x5".to_string())
        );

        // switching to the active chain is silent
        wallet.switch_chain("0x5").await.unwrap();
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn unsubscribed_receivers_get_nothing() {
        let wallet = wallet();
        let (id, mut events) = wallet.subscribe();
        assert_eq!(wallet.subscriber_count(), 1);
        wallet.unsubscribe(id);
        assert_eq!(wallet.subscriber_count(), 0);

        wallet.revoke();
        // sender dropped on unsubscribe, so the stream is closed
        assert!(matches!(events.try_recv(), Err(TryRecvError::Closed)));
    }
}
