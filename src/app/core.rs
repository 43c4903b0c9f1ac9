use ratatui::widgets::{ListState, TableState};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::config::AppConfig;
use crate::inventory::{InventoryItem, InventoryStore, SortDirection, SortField};
use crate::preferences::Preferences;
use crate::wallet::{fetch_authorized, MockWalletProvider, NoticeKind, WalletProvider, WalletSession};
use super::form::ItemForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Overview,
    Inventory,
    AddItem,
    History,
    Settings,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Overview,
        View::Inventory,
        View::AddItem,
        View::History,
        View::Settings,
    ];

    pub fn title(self) -> &'static str {
        match self {
            View::Overview => "Dashboard",
            View::Inventory => "Inventory",
            View::AddItem => "Add Stock",
            View::History => "Transactions",
            View::Settings => "Settings",
        }
    }

    pub fn index(self) -> usize {
        View::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageType {
    Error,
    Info,
    Success,
}

/// Single-line text prompts on the inventory view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Transfer,
}

pub struct App {
    pub config: AppConfig,
    pub preferences: Preferences,
    pub session: WalletSession,
    pub store: InventoryStore,
    /// Handle on the stand-in wallet, used to simulate extension-side actions
    pub wallet_sim: Option<Arc<MockWalletProvider>>,
    pub view: View,
    pub inventory_state: TableState,
    pub history_state: ListState,
    pub settings_state: ListState,
    pub form: ItemForm,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub search_term: String,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    /// Restricts the history view to one item
    pub history_item: Option<String>,
    pub is_confirming: bool,
    pub is_switching_network: bool,
    pub error_message: Option<String>,
    pub success_message: Option<String>,
    pub message_type: MessageType,
}

impl App {
    pub fn new(config: AppConfig, preferences: Preferences) -> App {
        let wallet_sim = config
            .wallet
            .installed
            .then(|| Arc::new(MockWalletProvider::from_config(&config.wallet)));
        let provider = wallet_sim
            .clone()
            .map(|sim| sim as Arc<dyn WalletProvider>);

        let mut app = App {
            session: WalletSession::new(provider),
            store: Self::build_store(&config),
            config,
            preferences,
            wallet_sim,
            view: View::Overview,
            inventory_state: TableState::default(),
            history_state: ListState::default(),
            settings_state: ListState::default(),
            form: ItemForm::default(),
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            search_term: String::new(),
            sort_field: SortField::Name,
            sort_direction: SortDirection::Ascending,
            history_item: None,
            is_confirming: false,
            is_switching_network: false,
            error_message: None,
            success_message: None,
            message_type: MessageType::Info,
        };

        // Set initial selection
        app.inventory_state.select(Some(0));
        app.history_state.select(Some(0));
        app.settings_state.select(Some(0));
        app
    }

    fn build_store(config: &AppConfig) -> InventoryStore {
        if config.seed_demo_data {
            InventoryStore::with_demo_data()
        } else {
            InventoryStore::new()
        }
    }

    /// Startup: pick up an existing authorization, then honour autoConnect.
    pub async fn start(&mut self) {
        self.session.restore().await;
        self.session.auto_connect(&mut self.preferences).await;
        self.report_session_error();
        self.drain_notices();
    }

    /// Rebuilds session and store from scratch, as a page reload would.
    /// Only the startup restore runs again; auto-connect stays once per run.
    /// The wallet is queried with the lock released.
    pub async fn reload(app: Arc<Mutex<App>>) {
        let provider = {
            let mut app_guard = app.lock().await;
            app_guard.reset_for_reload()
        };
        let restored = match provider {
            Some(provider) => Some(fetch_authorized(provider).await),
            None => None,
        };

        let mut app_guard = app.lock().await;
        if let Some(restored) = restored {
            app_guard.session.finish_restore(restored);
        }
        app_guard.report_session_error();
        if app_guard.error_message.is_none() {
            let network = app_guard.network_label();
            app_guard.set_message(
                MessageType::Info,
                format!("Network changed to {}. Application reloaded.", network),
            );
        }
    }

    fn reset_for_reload(&mut self) -> Option<Arc<dyn WalletProvider>> {
        info!("reloading application state");
        self.session = WalletSession::reloaded_from(&self.session);
        self.store = Self::build_store(&self.config);

        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.history_item = None;
        self.is_confirming = false;
        self.is_switching_network = false;
        self.inventory_state.select(Some(0));
        self.history_state.select(Some(0));
        self.clear_error();
        self.session.begin_restore()
    }

    // clear error and success message
    pub fn clear_error(&mut self) {
        self.error_message = None;
        self.success_message = None;
    }

    // set message method
    pub fn set_message(&mut self, message_type: MessageType, message: String) {
        self.message_type = message_type.clone();
        match message_type {
            MessageType::Success => {
                self.success_message = Some(message);
                self.error_message = None;
            }
            MessageType::Error | MessageType::Info => {
                self.error_message = Some(message);
                self.success_message = None;
            }
        }
    }

    /// Moves queued session notices into the message area.
    pub fn drain_notices(&mut self) {
        for notice in self.session.take_notices() {
            let message_type = match notice.kind {
                NoticeKind::Info => MessageType::Info,
                NoticeKind::Success => MessageType::Success,
                NoticeKind::Error => MessageType::Error,
            };
            self.set_message(message_type, format!("{}: {}", notice.title, notice.text));
        }
    }

    pub fn report_session_error(&mut self) {
        if let Some(err) = self.session.error() {
            let err = err.to_string();
            self.set_message(MessageType::Error, err);
        }
    }

    /// Items shown in the inventory table, filtered and sorted.
    pub fn visible_items(&self) -> Vec<&InventoryItem> {
        self.store
            .search(&self.search_term, self.sort_field, self.sort_direction)
    }

    pub fn selected_item(&self) -> Option<&InventoryItem> {
        let index = self.inventory_state.selected()?;
        self.visible_items().get(index).copied()
    }

    pub fn dark_mode(&self) -> bool {
        self.preferences.flag(crate::constants::PREF_DARK_MODE)
    }

    pub fn low_stock_threshold(&self) -> u32 {
        self.config.low_stock_threshold
    }
}
