pub mod api;
pub mod config;
pub mod db;

pub use db::DbPool;

use config::Config;

/// Process-wide handles shared by every request. Built once at startup and
/// handed to the router as `Arc<AppState>`.
pub struct AppState {
    pub config: Config,
    pub db: DbPool,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Self {
        Self { config, db }
    }
}
