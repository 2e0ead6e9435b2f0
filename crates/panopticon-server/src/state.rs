use std::sync::Arc;

use panopticon_core::{config::Config, store::StatsStore};

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
///
/// Holds no per-request data: the store is the only resource requests share.
pub struct AppState {
    /// Where reports are persisted. In production a `DuckDbBackend`; tests
    /// can swap in any [`StatsStore`].
    pub store: Arc<dyn StatsStore>,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn StatsStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
