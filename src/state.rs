use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Database;

/// Shared handler state: the database gateway and read-only settings.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}
