use std::sync::Arc;

use crate::config::ServerConfig;
use crate::metrics::LedgerMetrics;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone; everything inside is a pool handle or behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: classroll_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Per-process ledger counters.
    pub metrics: Arc<LedgerMetrics>,
}

impl AppState {
    pub fn new(pool: classroll_db::DbPool, config: ServerConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            metrics: Arc::new(LedgerMetrics::default()),
        }
    }
}
