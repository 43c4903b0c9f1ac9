/// Networks the settings view offers for switching: (chain id, display name)
pub const NETWORKS: [(u64, &str); 3] = [
    (1, "Ethereum Mainnet"),
    (5, "Goerli Testnet"),
    (11_155_111, "Sepolia Testnet"),
];

// Journal attribution when no wallet account is connected
pub const UNKNOWN_USER: &str = "0xUnknownUser";

pub const BLOCK_NUMBER_BASE: u64 = 14_358_000;
pub const BLOCK_NUMBER_MAX_STEP: u64 = 300;

pub const TX_HASH_BYTES: usize = 32;
pub const LEDGER_ADDRESS_BYTES: usize = 20;

pub const LOW_STOCK_THRESHOLD: u32 = 10;
pub const RECENT_TRANSACTIONS: usize = 5;

// Provider error codes (EIP-1193 / wallet_switchEthereumChain)
pub const PROVIDER_USER_REJECTED: i64 = 4001;
pub const PROVIDER_UNRECOGNIZED_CHAIN: i64 = 4902;

pub const WALLET_NOT_INSTALLED: &str = "MetaMask is not installed. Please install it to use this app.";
pub const WALLET_CONNECT_FAILED: &str = "Failed to connect wallet.";

// Persisted preference keys
pub const PREF_AUTO_CONNECT: &str = "autoConnect";
pub const PREF_DARK_MODE: &str = "darkMode";
pub const PREF_NOTIFICATIONS: &str = "notifications";
pub const PREF_ANALYTICS: &str = "analytics";
pub const PREF_WALLET_CONNECTED: &str = "walletConnected";

pub const APP_DIR_NAME: &str = "invenchain";
pub const PREFERENCES_FILE: &str = "preferences.json";
pub const CONFIG_FILE: &str = "config.json";
pub const LOG_FILE: &str = "invenchain.log";
pub const CONFIG_PATH_ENV: &str = "INVENCHAIN_CONFIG";

pub const TICK_MILLIS: u64 = 50;
pub const TEXT_INPUT_MAX_LEN: usize = 64;
pub const MESSAGE_AREA_MARGIN: u16 = 4;
