//! Guestbook API Server
//!
//! Run with: cargo run --bin guestbook
//!
//! Reads `config.toml` from the usual locations (see `guestbook-cli config`)
//! with `GUESTBOOK_*` environment overrides. `RUST_LOG` takes precedence over
//! the configured log level.

use guestbook::api::{serve, AppState};
use guestbook::config::{Config, LoggingConfig};
use guestbook::identity::AnonymousIssuer;
use guestbook::store::EntryStore;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_default();
    init_logging(&config.logging)?;

    tracing::info!("Starting Guestbook API server v{}", env!("CARGO_PKG_VERSION"));

    let store_config = config.store.to_store_config();
    match &store_config.data_dir {
        Some(dir) => tracing::info!("Data directory: {:?}", dir),
        None => tracing::warn!("Running in memory, entries are lost on restart"),
    }

    let store = Arc::new(EntryStore::open(store_config)?);
    let stats = store.stats().await;
    tracing::info!(entries = stats.entries, "Entry store ready");

    let issuer = Arc::new(AnonymousIssuer::new(config.identity.to_issuer_config()));

    let api_config = config.api.to_api_config();
    let state = AppState::new(store.clone(), issuer, api_config.clone())?
        .with_invitation(config.invitation.clone(), &config.qr)?;

    tracing::info!(
        couple = %config.invitation.couple_display(),
        wedding_at = %config.invitation.wedding_at,
        "Serving invitation"
    );

    serve(state, &api_config).await?;

    tracing::info!("Syncing journal...");
    store.sync().await?;
    tracing::info!("Guestbook API server stopped");

    Ok(())
}

/// Console output (pretty or JSON) plus an optional plain-text log file
fn init_logging(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("guestbook={},tower_http=debug", logging.level).into());

    let file = match &logging.file {
        Some(path) => Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?,
        ),
        None => None,
    };

    let json = logging.is_json();
    tracing_subscriber::registry()
        .with(filter)
        .with((!json).then(|| fmt::layer()))
        .with(json.then(|| fmt::layer().json()))
        .with(file.map(|f| fmt::layer().with_ansi(false).with_writer(Mutex::new(f))))
        .init();

    Ok(())
}
