//! Application state shared by all handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DbPool;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared database (profiles, sessions, assessments, attempts)
    pub db: DbPool,

    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: DbPool, config: AppConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}
