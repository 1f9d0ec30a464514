use std::sync::Arc;

use crate::auth::TokenSigner;
use crate::config::AppConfig;
use crate::database::AccountStore;

/// Shared application state available to handlers and guards via `State<AppState>`.
///
/// Everything is constructed once at startup and injected; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub signer: Arc<TokenSigner>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(accounts: Arc<dyn AccountStore>, signer: TokenSigner, config: AppConfig) -> Self {
        Self {
            accounts,
            signer: Arc::new(signer),
            config: Arc::new(config),
        }
    }
}
