pub mod client;
pub mod config;
pub mod rest;
pub mod storage;

use std::sync::Arc;

use config::ServerConfig;
use storage::Storage;

/// Shared application state passed to every route handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub storage: Arc<Storage>,
    pub started_at: std::time::Instant,
}
