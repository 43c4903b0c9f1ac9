mod types;
mod provider;
mod mock;
mod session;

pub use types::{ConnectionStatus, EventOutcome, NoticeKind, WalletEvent};
pub use provider::WalletProvider;
pub use mock::MockWalletProvider;
pub use session::{fetch_authorized, refresh_chain, request_connection, WalletSession};
