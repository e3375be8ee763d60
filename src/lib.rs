pub mod api;
pub mod config;
pub mod error;
pub mod expiry;
pub mod models;
pub mod schema;
pub mod store;

pub use config::Config;
pub use error::StoreError;

use std::sync::Arc;

/// Shared application state passed to all API handlers.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn store::TokenRepository>,
}

pub type SharedState = Arc<AppState>;
