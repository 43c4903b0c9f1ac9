use std::sync::Arc;
use tokio::sync::Mutex;

use crate::app::core::App;
use crate::app::MessageType;
use crate::constants::NETWORKS;
use crate::utils::network_name;

impl App {
    pub fn start_network_switch(&mut self) {
        if !self.session.is_connected() {
            self.set_message(
                MessageType::Info,
                "Connect your wallet before changing network".to_string(),
            );
            return;
        }
        self.is_switching_network = true;
    }

    pub fn cancel_network_switch(&mut self) {
        self.is_switching_network = false;
    }

    pub fn get_network_options(&self) -> String {
        NETWORKS
            .iter()
            .enumerate()
            .map(|(i, (_, name))| format!("{}) {}", i + 1, name.to_uppercase()))
            .collect::<Vec<_>>()
            .join("  ")
    }

    pub fn network_label(&self) -> &'static str {
        match self.session.chain_id() {
            Some(chain_id) => network_name(chain_id),
            None => "Not connected",
        }
    }

    /// Asks the wallet to switch to `NETWORKS[network_index]`. Success is
    /// picked up later from the wallet's chain-change event.
    pub async fn handle_network_switch(app: Arc<Mutex<App>>, network_index: usize) {
        let Some(&(chain_id, _)) = NETWORKS.get(network_index) else {
            return;
        };

        let request = {
            let mut app_guard = app.lock().await;
            app_guard.is_switching_network = false;
            let request = app_guard.session.begin_switch_network(chain_id);
            app_guard.drain_notices();
            request
        };
        let Some((provider, chain_hex)) = request else {
            return;
        };

        let app_clone = Arc::clone(&app);
        tokio::spawn(async move {
            let result = provider.switch_chain(&chain_hex).await;
            let mut app_guard = app_clone.lock().await;
            app_guard.session.finish_switch_network(chain_id, result);
            app_guard.drain_notices();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::core::tests::test_config;
    use crate::preferences::Preferences;
    use std::time::Duration;

    async fn settle(app: &Arc<Mutex<App>>) {
        for _ in 0..100 {
            if !app.lock().await.session.is_changing_network() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("network switch never finished");
    }

    #[test]
    fn options_list_known_networks() {
        let app = App::new(test_config(), Preferences::in_memory());
        assert_eq!(
            app.get_network_options(),
            "1) ETHEREUM MAINNET  2) GOERLI TESTNET  3) SEPOLIA TESTNET"
        );
    }

    #[test]
    fn switching_requires_connection() {
        let mut app = App::new(test_config(), Preferences::in_memory());
        app.start_network_switch();
        assert!(!app.is_switching_network);
        assert!(app.error_message.is_some());
    }

    #[tokio::test]
    async fn unknown_network_reports_not_available() {
        let mut app = App::new(test_config(), Preferences::in_memory());
        app.session.connect(&mut app.preferences).await;
        let app = Arc::new(Mutex::new(app));

        // Goerli is not in the default wallet's chain list
        App::handle_network_switch(Arc::clone(&app), 1).await;
        settle(&app).await;

        let app_guard = app.lock().await;
        assert_eq!(app_guard.message_type, MessageType::Error);
        assert!(app_guard
            .error_message
            .as_deref()
            .unwrap_or("")
            .starts_with("Network not available"));
        assert_eq!(app_guard.session.chain_id(), Some(11_155_111));
    }

    #[tokio::test]
    async fn chain_change_event_reloads_the_app() {
        let mut app = App::new(test_config(), Preferences::in_memory());
        app.session.connect(&mut app.preferences).await;
        app.store.remove_item("2", &app.session).unwrap();
        let app = Arc::new(Mutex::new(app));

        App::handle_network_switch(Arc::clone(&app), 0).await;
        settle(&app).await;

        App::pump_wallet_events(Arc::clone(&app)).await;
        let app_guard = app.lock().await;
        assert!(app_guard
            .error_message
            .as_deref()
            .unwrap_or("")
            .starts_with("Network changed to Ethereum Mainnet"));
        assert_eq!(app_guard.session.chain_id(), Some(1));
        assert_eq!(app_guard.network_label(), "Ethereum Mainnet");
        assert_eq!(app_guard.store.items().len(), 4);
    }
}
