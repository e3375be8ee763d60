use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use token_store::store::{MemoryTokenStore, PgTokenStore, TokenRepository};
use token_store::{api, AppState, Config, SharedState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "token_store=info".into()),
        )
        .init();

    // Load config
    let config = Config::from_env()?;
    info!("token-store v{}", env!("CARGO_PKG_VERSION"));
    info!("Listening on {}:{}", config.host, config.port);

    let store: Arc<dyn TokenRepository> = match &config.database_url {
        Some(url) => {
            let store = PgTokenStore::new(url, config.database_max_connections).await?;
            store.migrate().await?;
            info!("Database connected and migrated ✓");
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set, tokens are kept in memory and lost on restart");
            Arc::new(MemoryTokenStore::new())
        }
    };

    // Build shared state
    let state: SharedState = Arc::new(AppState {
        config: config.clone(),
        store,
    });

    // Build router
    let app = api::router(state);
    info!("Token routes mounted at {}", config.mount_prefix);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server ready ✓");
    axum::serve(listener, app).await?;

    Ok(())
}
