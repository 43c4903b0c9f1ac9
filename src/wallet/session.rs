use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::constants::{PREF_WALLET_CONNECTED, WALLET_CONNECT_FAILED, WALLET_NOT_INSTALLED};
use crate::error::{ProviderError, WalletError};
use crate::inventory::AccountSource;
use crate::preferences::Preferences;
use crate::utils::{chain_id_hex, network_name, shorten_id};
use super::provider::{Subscription, WalletProvider};
use super::types::{ConnectionStatus, EventOutcome, Notice, NoticeKind, WalletEvent};

/// Wallet connection state machine.
///
/// Provider calls are split into `begin_*` / `finish_*` halves so the caller
/// can await the provider without holding the application lock; the plain
/// async methods run both halves back to back.
pub struct WalletSession {
    status: ConnectionStatus,
    provider: Option<Arc<dyn WalletProvider>>,
    subscription: Option<Subscription>,
    connect_in_flight: bool,
    is_changing_network: bool,
    auto_connect_attempted: bool,
    notices: Vec<Notice>,
}

/// Account request followed by a network lookup.
pub async fn request_connection(
    provider: Arc<dyn WalletProvider>,
) -> Result<(String, u64), ProviderError> {
    let accounts = provider.request_accounts().await?;
    let account = accounts.into_iter().next().ok_or_else(|| ProviderError::Rpc {
        code: -32603,
        message: "no accounts returned".to_string(),
    })?;
    let network = provider.get_network().await?;
    Ok((account, network.chain_id))
}

/// Accounts the wallet already authorized, with the active chain.
pub async fn fetch_authorized(
    provider: Arc<dyn WalletProvider>,
) -> Result<Option<(String, u64)>, ProviderError> {
    let accounts = provider.list_accounts().await?;
    match accounts.into_iter().next() {
        Some(account) => {
            let network = provider.get_network().await?;
            Ok(Some((account, network.chain_id)))
        }
        None => Ok(None),
    }
}

/// Chain lookup for an event that needs one; see `WalletSession::refresh_provider_for`.
pub async fn refresh_chain(
    provider: Option<Arc<dyn WalletProvider>>,
) -> Option<Result<u64, ProviderError>> {
    let provider = provider?;
    Some(provider.get_network().await.map(|network| network.chain_id))
}

impl WalletSession {
    /// Starts disconnected and, when a provider exists, registers for its
    /// events for as long as the session lives.
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        let subscription = provider.as_ref().map(|p| Subscription::new(Arc::clone(p)));
        WalletSession {
            status: ConnectionStatus::Disconnected,
            provider,
            subscription,
            connect_in_flight: false,
            is_changing_network: false,
            auto_connect_attempted: false,
            notices: Vec::new(),
        }
    }

    /// Fresh session for an application reload. An account request or a
    /// network switch still pending on the old session keeps its guard.
    pub fn reloaded_from(previous: &WalletSession) -> Self {
        let mut session = WalletSession::new(previous.provider.clone());
        session.connect_in_flight = previous.connect_in_flight;
        session.is_changing_network = previous.is_changing_network;
        session.auto_connect_attempted = previous.auto_connect_attempted;
        if session.connect_in_flight {
            session.status = ConnectionStatus::Connecting;
        }
        session
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn is_web3_enabled(&self) -> bool {
        self.provider.is_some()
    }

    pub fn provider(&self) -> Option<Arc<dyn WalletProvider>> {
        self.provider.clone()
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.status, ConnectionStatus::Connected { .. })
    }

    pub fn is_connecting(&self) -> bool {
        self.connect_in_flight
    }

    pub fn is_changing_network(&self) -> bool {
        self.is_changing_network
    }

    pub fn account(&self) -> Option<&str> {
        match &self.status {
            ConnectionStatus::Connected { account, .. } => Some(account),
            _ => None,
        }
    }

    pub fn chain_id(&self) -> Option<u64> {
        match &self.status {
            ConnectionStatus::Connected { chain_id, .. } => Some(*chain_id),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            ConnectionStatus::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, kind: NoticeKind, title: &str, text: String) {
        self.notices.push(Notice::new(kind, title, text));
    }

    fn fail(&mut self, err: &WalletError, message: &str) {
        warn!(error = %err, "wallet connection failed");
        self.status = ConnectionStatus::Error(message.to_string());
    }

    /// Startup check for a connection the wallet already authorized.
    pub async fn restore(&mut self) {
        if let Some(provider) = self.begin_restore() {
            let restored = fetch_authorized(provider).await;
            self.finish_restore(restored);
        }
    }

    /// First half of `restore`: the provider to query, if one is installed.
    pub fn begin_restore(&mut self) -> Option<Arc<dyn WalletProvider>> {
        let provider = self.provider.clone();
        if provider.is_none() {
            self.fail(&WalletError::ProviderUnavailable, WALLET_NOT_INSTALLED);
        }
        provider
    }

    pub fn finish_restore(&mut self, restored: Result<Option<(String, u64)>, ProviderError>) {
        match restored {
            Ok(Some((account, chain_id))) => {
                info!(account = %account, chain_id, "restored wallet connection");
                self.status = ConnectionStatus::Connected { account, chain_id };
            }
            Ok(None) => debug!("no authorized wallet accounts"),
            Err(e) => {
                warn!(error = %e, "failed to check wallet connection");
                self.status = ConnectionStatus::Error("Failed to connect to wallet.".to_string());
            }
        }
    }

    /// Connects once per session when the user opted in and nothing is
    /// connected yet. Returns whether an attempt was made.
    pub async fn auto_connect(&mut self, prefs: &mut Preferences) -> bool {
        if self.auto_connect_attempted || self.is_connected() || !prefs.auto_connect() {
            return false;
        }
        self.auto_connect_attempted = true;
        info!("auto-connecting wallet");
        self.connect(prefs).await;
        true
    }

    /// First half of `connect`. Returns the provider to call, or None when
    /// an attempt is already running or no wallet is installed.
    pub fn begin_connect(&mut self) -> Option<Arc<dyn WalletProvider>> {
        if self.connect_in_flight {
            debug!("connect already in flight");
            return None;
        }
        let Some(provider) = self.provider.clone() else {
            self.fail(&WalletError::ProviderUnavailable, WALLET_NOT_INSTALLED);
            return None;
        };
        self.connect_in_flight = true;
        self.status = ConnectionStatus::Connecting;
        Some(provider)
    }

    pub fn finish_connect(
        &mut self,
        result: Result<(String, u64), ProviderError>,
        prefs: &mut Preferences,
    ) {
        self.connect_in_flight = false;
        match result {
            Ok((account, chain_id)) => {
                info!(account = %account, chain_id, "wallet connected");
                self.notify(
                    NoticeKind::Success,
                    "Wallet connected",
                    format!("{} on {}", shorten_id(&account), network_name(chain_id)),
                );
                self.status = ConnectionStatus::Connected { account, chain_id };
                prefs.set_bool_lossy(PREF_WALLET_CONNECTED, true);
            }
            Err(e) => {
                self.fail(&WalletError::ConnectionRejected(e), WALLET_CONNECT_FAILED);
            }
        }
    }

    pub async fn connect(&mut self, prefs: &mut Preferences) {
        if let Some(provider) = self.begin_connect() {
            let result = request_connection(provider).await;
            self.finish_connect(result, prefs);
        }
    }

    pub fn disconnect(&mut self, prefs: &mut Preferences) {
        if self.status != ConnectionStatus::Disconnected {
            info!("wallet disconnected");
        }
        self.status = ConnectionStatus::Disconnected;
        prefs.set_bool_lossy(PREF_WALLET_CONNECTED, false);
    }

    /// First half of a network switch: the provider and the hex chain id to
    /// request, or None if no switch can start.
    pub fn begin_switch_network(
        &mut self,
        target_chain_id: u64,
    ) -> Option<(Arc<dyn WalletProvider>, String)> {
        if self.is_changing_network {
            return None;
        }
        let provider = self.provider.clone()?;
        if !self.is_connected() {
            self.notify(
                NoticeKind::Info,
                "Wallet not connected",
                "Connect your wallet before changing network".to_string(),
            );
            return None;
        }
        self.is_changing_network = true;
        Some((provider, chain_id_hex(target_chain_id)))
    }

    /// Success changes nothing here: the wallet's chain-change event does.
    pub fn finish_switch_network(
        &mut self,
        target_chain_id: u64,
        result: Result<(), ProviderError>,
    ) {
        self.is_changing_network = false;
        let Err(e) = result else {
            debug!(chain_id = target_chain_id, "network switch requested");
            return;
        };

        let err = WalletError::from_switch(target_chain_id, e);
        warn!(error = %err, "network switch failed");
        match err {
            WalletError::ChainUnregistered(chain_id) => self.notify(
                NoticeKind::Error,
                "Network not available",
                format!("{} is not available in your wallet", network_name(chain_id)),
            ),
            _ => self.notify(
                NoticeKind::Error,
                "Network switch failed",
                "Failed to switch network".to_string(),
            ),
        }
    }

    pub fn next_event(&mut self) -> Option<WalletEvent> {
        self.subscription.as_mut()?.try_next()
    }

    /// Provider to ask for the current chain before `apply_event`, when the
    /// event switches the connected account.
    pub fn refresh_provider_for(&self, event: &WalletEvent) -> Option<Arc<dyn WalletProvider>> {
        let WalletEvent::AccountsChanged(accounts) = event else {
            return None;
        };
        let first = accounts.first()?;
        match &self.status {
            ConnectionStatus::Connected { account, .. } if account != first => self.provider.clone(),
            _ => None,
        }
    }

    pub fn apply_event(
        &mut self,
        event: WalletEvent,
        refreshed_chain: Option<Result<u64, ProviderError>>,
        prefs: &mut Preferences,
    ) -> EventOutcome {
        match event {
            WalletEvent::AccountsChanged(accounts) => {
                let Some(first) = accounts.into_iter().next() else {
                    self.disconnect(prefs);
                    return EventOutcome::Disconnected;
                };

                let ConnectionStatus::Connected { account, chain_id } = &self.status else {
                    // only a user action may start a connection
                    return EventOutcome::Ignored;
                };
                if *account == first {
                    return EventOutcome::Ignored;
                }

                let previous_chain = *chain_id;
                let chain_id = match refreshed_chain {
                    Some(Ok(chain_id)) => chain_id,
                    Some(Err(e)) => {
                        warn!(error = %e, "failed to refresh network after account change");
                        previous_chain
                    }
                    None => previous_chain,
                };
                info!(account = %first, chain_id, "wallet account changed");
                self.status = ConnectionStatus::Connected { account: first.clone(), chain_id };
                EventOutcome::AccountChanged(first)
            }
            WalletEvent::ChainChanged(chain) => {
                info!(chain = %chain, "wallet chain changed, reloading");
                EventOutcome::ReloadRequired
            }
        }
    }
}

impl AccountSource for WalletSession {
    fn current_account(&self) -> Option<&str> {
        self.account()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PREF_AUTO_CONNECT;
    use crate::wallet::MockWalletProvider;

    const ALICE: &str = "0xaaaa000000000000000000000000000000000001";
    const BOB: &str = "0xbbbb000000000000000000000000000000000002";

    fn mock() -> Arc<MockWalletProvider> {
        Arc::new(MockWalletProvider::new(
            vec![ALICE.to_string(), BOB.to_string()],
            1,
            vec![1, 5],
        ))
    }

    fn session_for(mock: &Arc<MockWalletProvider>) -> WalletSession {
        let provider: Arc<dyn WalletProvider> = mock.clone();
        WalletSession::new(Some(provider))
    }

    async fn handle(
        session: &mut WalletSession,
        event: WalletEvent,
        prefs: &mut Preferences,
    ) -> EventOutcome {
        let refreshed = refresh_chain(session.refresh_provider_for(&event)).await;
        session.apply_event(event, refreshed, prefs)
    }

    async fn switch(session: &mut WalletSession, chain_id: u64) {
        if let Some((provider, chain_hex)) = session.begin_switch_network(chain_id) {
            let result = provider.switch_chain(&chain_hex).await;
            session.finish_switch_network(chain_id, result);
        }
    }

    #[tokio::test]
    async fn connect_without_provider_is_an_error_without_side_effects() {
        let mut prefs = Preferences::in_memory();
        let mut session = WalletSession::new(None);
        assert!(!session.is_web3_enabled());

        session.connect(&mut prefs).await;
        assert_eq!(session.error(), Some(WALLET_NOT_INSTALLED));
        assert!(!session.is_connecting());
        assert_eq!(prefs.get_raw(PREF_WALLET_CONNECTED), None);
    }

    #[tokio::test]
    async fn connect_captures_account_and_chain_and_persists_flag() {
        let wallet = mock();
        let mut prefs = Preferences::in_memory();
        let mut session = session_for(&wallet);

        session.connect(&mut prefs).await;
        assert_eq!(
            session.status(),
            &ConnectionStatus::Connected { account: ALICE.to_string(), chain_id: 1 }
        );
        assert!(prefs.wallet_connected());
        assert_eq!(session.take_notices()[0].kind, NoticeKind::Success);
    }

    #[tokio::test]
    async fn rejected_connect_clears_account_and_chain() {
        let wallet = mock();
        wallet.set_reject_connections(true);
        let mut prefs = Preferences::in_memory();
        let mut session = session_for(&wallet);

        session.connect(&mut prefs).await;
        assert_eq!(session.error(), Some(WALLET_CONNECT_FAILED));
        assert_eq!(session.account(), None);
        assert_eq!(session.chain_id(), None);
        assert!(!prefs.wallet_connected());
    }

    #[tokio::test]
    async fn overlapping_connect_is_refused() {
        let wallet = mock();
        let mut prefs = Preferences::in_memory();
        let mut session = session_for(&wallet);

        let provider = session.begin_connect().expect("first attempt starts");
        assert_eq!(session.status(), &ConnectionStatus::Connecting);
        assert!(session.begin_connect().is_none());

        let result = request_connection(provider).await;
        session.finish_connect(result, &mut prefs);
        assert!(session.is_connected());
        assert!(!session.is_connecting());
        assert_eq!(wallet.request_count(), 1);
    }

    #[tokio::test]
    async fn disconnect_resets_and_clears_flag() {
        let wallet = mock();
        let mut prefs = Preferences::in_memory();
        let mut session = session_for(&wallet);
        session.connect(&mut prefs).await;

        session.disconnect(&mut prefs);
        assert_eq!(session.status(), &ConnectionStatus::Disconnected);
        assert_eq!(prefs.get_raw(PREF_WALLET_CONNECTED), Some("false"));
    }

    #[tokio::test]
    async fn empty_accounts_event_returns_to_initial_state() {
        let wallet = mock();
        let mut prefs = Preferences::in_memory();
        let mut session = session_for(&wallet);
        session.connect(&mut prefs).await;

        wallet.revoke();
        let event = session.next_event().expect("revocation is announced");
        let outcome = handle(&mut session, event, &mut prefs).await;

        assert_eq!(outcome, EventOutcome::Disconnected);
        assert!(!session.is_connected());
        assert_eq!(session.account(), None);
        assert_eq!(session.chain_id(), None);
        assert_eq!(session.error(), None);
    }

    #[tokio::test]
    async fn account_switch_refreshes_and_repeats_are_ignored() {
        let wallet = mock();
        let mut prefs = Preferences::in_memory();
        let mut session = session_for(&wallet);
        session.connect(&mut prefs).await;

        wallet.rotate_accounts();
        let event = session.next_event().unwrap();
        let outcome = handle(&mut session, event.clone(), &mut prefs).await;
        assert_eq!(outcome, EventOutcome::AccountChanged(BOB.to_string()));
        assert_eq!(session.account(), Some(BOB));
        assert_eq!(session.chain_id(), Some(1));

        let again = handle(&mut session, event, &mut prefs).await;
        assert_eq!(again, EventOutcome::Ignored);
        assert_eq!(session.account(), Some(BOB));
    }

    #[tokio::test]
    async fn accounts_event_while_disconnected_does_not_connect() {
        let wallet = mock();
        let mut prefs = Preferences::in_memory();
        let mut session = session_for(&wallet);

        let event = WalletEvent::AccountsChanged(vec![ALICE.to_string()]);
        assert!(session.refresh_provider_for(&event).is_none());
        let outcome = handle(&mut session, event, &mut prefs).await;
        assert_eq!(outcome, EventOutcome::Ignored);
        assert_eq!(session.status(), &ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn chain_change_requests_reload_after_switch() {
        let wallet = mock();
        let mut prefs = Preferences::in_memory();
        let mut session = session_for(&wallet);
        session.connect(&mut prefs).await;

        switch(&mut session, 5).await;
        // state is left to the event
        assert_eq!(session.chain_id(), Some(1));
        assert!(!session.is_changing_network());

        let event = session.next_event().unwrap();
        assert_eq!(event, WalletEvent::ChainChanged("0x5".to_string()));
        assert_eq!(handle(&mut session, event, &mut prefs).await, EventOutcome::ReloadRequired);
    }

    #[tokio::test]
    async fn unknown_chain_gets_its_own_notice() {
        let wallet = mock();
        let mut prefs = Preferences::in_memory();
        let mut session = session_for(&wallet);
        session.connect(&mut prefs).await;
        session.take_notices();

        switch(&mut session, 11_155_111).await;
        let notices = session.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Network not available");
        assert!(session.is_connected());
        assert!(session.next_event().is_none());
    }

    #[tokio::test]
    async fn overlapping_switch_is_refused() {
        let wallet = mock();
        let mut prefs = Preferences::in_memory();
        let mut session = session_for(&wallet);
        session.connect(&mut prefs).await;

        assert!(session.begin_switch_network(5).is_some());
        assert!(session.is_changing_network());
        assert!(session.begin_switch_network(5).is_none());
        session.finish_switch_network(5, Err(ProviderError::UserRejected));
        assert!(!session.is_changing_network());
        assert_eq!(session.take_notices().last().unwrap().title, "Network switch failed");
    }

    #[tokio::test]
    async fn auto_connect_runs_exactly_once() {
        let wallet = mock();
        let mut prefs = Preferences::in_memory();
        prefs.set_bool(PREF_AUTO_CONNECT, true).unwrap();
        let mut session = session_for(&wallet);

        session.restore().await;
        assert!(!session.is_connected());
        assert!(session.auto_connect(&mut prefs).await);
        assert!(session.is_connected());

        session.disconnect(&mut prefs);
        assert!(!session.auto_connect(&mut prefs).await);
        assert_eq!(wallet.request_count(), 1);
    }

    #[tokio::test]
    async fn auto_connect_respects_preference() {
        let wallet = mock();
        let mut prefs = Preferences::in_memory();
        let mut session = session_for(&wallet);

        assert!(!session.auto_connect(&mut prefs).await);
        assert_eq!(wallet.request_count(), 0);
    }

    #[tokio::test]
    async fn restore_picks_up_existing_authorization() {
        let wallet = mock();
        wallet.authorize();
        let mut session = session_for(&wallet);

        session.restore().await;
        assert_eq!(session.account(), Some(ALICE));
        assert_eq!(wallet.request_count(), 0);
    }

    #[test]
    fn dropping_the_session_releases_the_subscription() {
        let wallet = mock();
        let session = session_for(&wallet);
        assert_eq!(wallet.subscriber_count(), 1);
        drop(session);
        assert_eq!(wallet.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn reloaded_session_keeps_pending_guards() {
        let wallet = mock();
        let mut prefs = Preferences::in_memory();
        let mut session = session_for(&wallet);
        let provider = session.begin_connect().expect("first attempt starts");

        let mut reloaded = WalletSession::reloaded_from(&session);
        drop(session);
        assert_eq!(wallet.subscriber_count(), 1);
        assert!(reloaded.is_connecting());
        assert!(reloaded.begin_connect().is_none());

        let result = request_connection(provider).await;
        reloaded.finish_connect(result, &mut prefs);
        assert!(reloaded.is_connected());
        assert!(reloaded.begin_connect().is_some());
        assert_eq!(wallet.request_count(), 1);
    }

    #[tokio::test]
    async fn account_refresh_failure_keeps_previous_chain() {
        let wallet = mock();
        let mut prefs = Preferences::in_memory();
        let mut session = session_for(&wallet);
        session.connect(&mut prefs).await;

        let event = WalletEvent::AccountsChanged(vec![BOB.to_string()]);
        assert!(session.refresh_provider_for(&event).is_some());
        let outcome = session.apply_event(
            event,
            Some(Err(ProviderError::Rpc { code: -32603, message: "offline".to_string() })),
            &mut prefs,
        );
        assert_eq!(outcome, EventOutcome::AccountChanged(BOB.to_string()));
        assert_eq!(session.chain_id(), Some(1));
    }
}
