//! # SpinoAid API Server
//!
//! Backend for medical image annotation: accounts, patient records,
//! annotations drawn on patient images, and image analysis.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - Registration, login and bearer-token authentication
//! - Owner-scoped patient and annotation CRUD
//! - Image upload and analysis behind a pluggable analyzer
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p spinoaid-api
//! ```

use anyhow::Context;
use spinoaid_api::{
    app::{build_router, AppState},
    config::{Config, StorageBackend},
};
use spinoaid_shared::{
    auth::middleware::IdentityResolution,
    models,
    store::{DocumentStore, MemoryStore, MockStore},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the log format is read
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!(
        "SpinoAid API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("failed to load configuration")?;

    if config.jwt.uses_default_secret() {
        tracing::warn!("JWT_SECRET is not set; signing tokens with the development default");
    }
    if config.auth.identity == IdentityResolution::Placeholder {
        tracing::warn!(
            "Identity resolution is 'placeholder': /auth/me reports a fixed name and email"
        );
    }

    let store: Arc<dyn DocumentStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Mock => {
            tracing::warn!("Mock storage backend selected; nothing will be persisted");
            Arc::new(MockStore::new())
        }
    };
    models::ensure_indexes(&*store)
        .await
        .context("failed to create storage indexes")?;

    let address = config.bind_address();
    let state = AppState::new(store, config);
    let app = build_router(state);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;

    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");

    Ok(())
}

/// Installs the global subscriber
///
/// `LOG_FORMAT=json` switches to one JSON object per line.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "spinoaid_api=debug,spinoaid_shared=debug,tower_http=debug".into()
    });

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(|| fmt::layer()))
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, exiting...");
}
