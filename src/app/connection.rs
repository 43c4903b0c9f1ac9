use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::app::core::App;
use crate::app::MessageType;
use crate::error::ProviderError;
use crate::utils::shorten_id;
use crate::wallet::{refresh_chain, request_connection, EventOutcome, WalletEvent};

impl App {
    /// Starts a wallet connection. The account request runs on its own task
    /// so the UI keeps drawing while the wallet prompt is open.
    pub async fn handle_connect(app: Arc<Mutex<App>>) {
        let provider = {
            let mut app_guard = app.lock().await;
            if app_guard.session.is_connected() {
                app_guard.set_message(MessageType::Info, "Wallet already connected".to_string());
                return;
            }
            let provider = app_guard.session.begin_connect();
            if provider.is_none() {
                app_guard.report_session_error();
            }
            provider
        };
        let Some(provider) = provider else {
            return;
        };

        let app_clone = Arc::clone(&app);
        tokio::spawn(async move {
            let result = request_connection(provider).await;
            let mut app_guard = app_clone.lock().await;
            app_guard.finish_connect(result);
        });
    }

    pub fn finish_connect(&mut self, result: Result<(String, u64), ProviderError>) {
        self.session.finish_connect(result, &mut self.preferences);
        self.report_session_error();
        self.drain_notices();
    }

    pub fn handle_disconnect(&mut self) {
        self.session.disconnect(&mut self.preferences);
        self.set_message(MessageType::Info, "Wallet disconnected".to_string());
    }

    /// Applies queued wallet events. Called every UI tick; any network
    /// lookup an event needs runs with the lock released.
    pub async fn pump_wallet_events(app: Arc<Mutex<App>>) {
        loop {
            let (event, refresh) = {
                let mut app_guard = app.lock().await;
                // older notices go first so the event's own message wins
                app_guard.drain_notices();
                let Some(event) = app_guard.session.next_event() else {
                    return;
                };
                let refresh = app_guard.session.refresh_provider_for(&event);
                (event, refresh)
            };
            debug!(?event, "wallet event");
            let refreshed = refresh_chain(refresh).await;

            let outcome = app.lock().await.apply_wallet_event(event, refreshed);
            if outcome == EventOutcome::ReloadRequired {
                App::reload(Arc::clone(&app)).await;
                // the old subscription went away with the old session
                return;
            }
        }
    }

    fn apply_wallet_event(
        &mut self,
        event: WalletEvent,
        refreshed: Option<Result<u64, ProviderError>>,
    ) -> EventOutcome {
        let outcome = self.session.apply_event(event, refreshed, &mut self.preferences);
        self.drain_notices();
        match &outcome {
            EventOutcome::Ignored | EventOutcome::ReloadRequired => {}
            EventOutcome::Disconnected => {
                self.set_message(MessageType::Info, "Wallet disconnected".to_string());
            }
            EventOutcome::AccountChanged(account) => {
                self.set_message(
                    MessageType::Info,
                    format!("Account changed to {}", shorten_id(account)),
                );
            }
        }
        outcome
    }

    /// Simulates picking another account in the wallet extension.
    pub fn simulate_account_switch(&mut self) {
        let Some(wallet) = &self.wallet_sim else {
            self.set_message(MessageType::Error, "No wallet installed".to_string());
            return;
        };
        if let Some(account) = wallet.rotate_accounts() {
            debug!(account = %account, "simulated account switch");
        }
    }

    /// Simulates locking the wallet extension.
    pub fn simulate_wallet_lock(&mut self) {
        match &self.wallet_sim {
            Some(wallet) => wallet.revoke(),
            None => self.set_message(MessageType::Error, "No wallet installed".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::core::tests::test_config;
    use crate::constants::WALLET_CONNECT_FAILED;
    use crate::preferences::Preferences;
    use crate::wallet::ConnectionStatus;
    use std::time::Duration;

    async fn wait_until<F: Fn(&App) -> bool>(app: &Arc<Mutex<App>>, done: F) {
        for _ in 0..100 {
            if done(&*app.lock().await) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached");
    }

    #[tokio::test]
    async fn connect_runs_outside_the_lock_and_persists_flag() {
        let app = Arc::new(Mutex::new(App::new(test_config(), Preferences::in_memory())));

        App::handle_connect(Arc::clone(&app)).await;
        wait_until(&app, |a| a.session.is_connected()).await;

        let app_guard = app.lock().await;
        assert!(app_guard.preferences.wallet_connected());
        assert_eq!(app_guard.message_type, MessageType::Success);
    }

    #[tokio::test]
    async fn rejected_connect_shows_failure() {
        let mut config = test_config();
        config.wallet.reject_connections = true;
        let app = Arc::new(Mutex::new(App::new(config, Preferences::in_memory())));

        App::handle_connect(Arc::clone(&app)).await;
        wait_until(&app, |a| !a.session.is_connecting()).await;

        let app_guard = app.lock().await;
        assert_eq!(
            app_guard.session.status(),
            &ConnectionStatus::Error(WALLET_CONNECT_FAILED.to_string())
        );
        assert_eq!(app_guard.error_message.as_deref(), Some(WALLET_CONNECT_FAILED));
    }

    async fn connected_app(config: crate::config::AppConfig) -> Arc<Mutex<App>> {
        let mut app = App::new(config, Preferences::in_memory());
        app.session.connect(&mut app.preferences).await;
        Arc::new(Mutex::new(app))
    }

    #[tokio::test]
    async fn locking_the_wallet_disconnects() {
        let app = connected_app(test_config()).await;

        app.lock().await.simulate_wallet_lock();
        App::pump_wallet_events(Arc::clone(&app)).await;

        let app_guard = app.lock().await;
        assert_eq!(app_guard.session.status(), &ConnectionStatus::Disconnected);
        assert!(!app_guard.preferences.wallet_connected());
        assert_eq!(app_guard.error_message.as_deref(), Some("Wallet disconnected"));
    }

    #[tokio::test]
    async fn account_switch_message_replaces_pending_connect_notice() {
        // connecting directly leaves the "Wallet connected" notice queued
        let app = connected_app(test_config()).await;
        let before = app.lock().await.session.account().map(str::to_string);

        app.lock().await.simulate_account_switch();
        App::pump_wallet_events(Arc::clone(&app)).await;

        let app_guard = app.lock().await;
        assert!(app_guard.session.is_connected());
        assert_ne!(app_guard.session.account().map(str::to_string), before);
        assert_eq!(app_guard.message_type, MessageType::Info);
        assert!(app_guard.success_message.is_none());
        assert!(app_guard
            .error_message
            .as_deref()
            .unwrap_or("")
            .starts_with("Account changed"));
    }

    #[tokio::test]
    async fn reload_keeps_pending_connect_guard() {
        let mut config = test_config();
        config.wallet.latency_ms = 200;
        let app = Arc::new(Mutex::new(App::new(config, Preferences::in_memory())));

        App::handle_connect(Arc::clone(&app)).await;
        assert!(app.lock().await.session.is_connecting());

        App::reload(Arc::clone(&app)).await;
        assert!(app.lock().await.session.is_connecting());
        App::handle_connect(Arc::clone(&app)).await;

        wait_until(&app, |a| !a.session.is_connecting()).await;
        let app_guard = app.lock().await;
        assert!(app_guard.session.is_connected());
        assert_eq!(app_guard.wallet_sim.as_ref().unwrap().request_count(), 1);
    }
}
