//! Shared handler state.

use std::sync::Arc;

use oaxaca_db::{Database, TableAllocator};

use crate::config::ServerConfig;

/// Cloned into every handler. Holds the database handle, never a global.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        AppState {
            db,
            config: Arc::new(config),
        }
    }

    /// Allocator carrying the configured waiter mode and retry budget.
    pub fn allocator(&self) -> TableAllocator {
        self.db
            .allocator()
            .with_mode(self.config.allocation.waiter_mode)
            .with_max_claim_attempts(self.config.allocation.max_claim_attempts)
    }
}
