//! PhoneSwap Marketplace Server
//!
//! Backend for a peer-to-peer used-phone marketplace: listings,
//! purchase-offer negotiation with arbiter panels, payment-proof
//! intake, and notification dispatch.

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use phoneswap_server::{
    routes, AppState, Config, ConsoleNotifier, InMemoryStore, Notifier, SmtpNotifier, SqliteStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phoneswap_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!(port = config.port, dev_mode = config.dev_mode, "Loaded configuration");

    // Select the notification channel
    let notifier: Box<dyn Notifier> = match config.smtp.clone() {
        Some(smtp) => {
            tracing::info!(host = %smtp.host, "Using SMTP notifier");
            Box::new(SmtpNotifier::new(smtp))
        }
        None => {
            tracing::info!("Using console notifier");
            Box::new(ConsoleNotifier::new())
        }
    };

    let addr = format!("0.0.0.0:{}", config.port);

    // Select the store and start serving
    if config.db_path.is_empty() {
        tracing::warn!("No PHONESWAP_DB set; state will not survive restarts");
        let state = Arc::new(AppState::new(
            InMemoryStore::new(),
            notifier,
            &config.credential_secret,
            config.credential_ttl_minutes,
            config.dev_mode,
        ));
        serve(routes::create_router(state), &addr).await
    } else {
        let store = SqliteStore::open(&config.db_path)
            .map_err(|e| anyhow::anyhow!("failed to open database: {}", e))?;
        tracing::info!(path = %config.db_path, "Opened SQLite store");
        let state = Arc::new(AppState::new(
            store,
            notifier,
            &config.credential_secret,
            config.credential_ttl_minutes,
            config.dev_mode,
        ));
        serve(routes::create_router(state), &addr).await
    }
}

async fn serve(app: axum::Router, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Marketplace listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
