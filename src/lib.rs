pub mod api;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod core_state;
pub mod dashboard;
pub mod db;
pub mod lifecycle;
pub mod models;
pub mod notifier;
pub mod outbox;
pub mod review;
pub mod roles;
pub mod store;
pub mod visibility;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, ConfigError};
use crate::core_state::CoreState;
use crate::lifecycle::SystemClock;
use crate::notifier::{AnyNotifier, EmailFunctionNotifier, LogNotifier, NotificationError};
use crate::outbox::NotificationOutbox;
use crate::store::{SqliteStore, StoreError};

/// Startup failures. Anything after the server is up is logged instead.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Notifier setup failed: {0}")]
    Notifier(#[from] NotificationError),
    #[error(transparent)]
    Server(#[from] api::ServerError),
}

pub async fn run() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let cfg = AppConfig::from_env()?;
    let store = Arc::new(SqliteStore::open(&cfg.db_path)?);

    let notifier = match &cfg.email_function_url {
        Some(url) => AnyNotifier::EmailFunction(EmailFunctionNotifier::new(
            url,
            cfg.email_function_key.clone(),
            cfg.notify_timeout,
        )?),
        None => AnyNotifier::Log(LogNotifier),
    };

    let (outbox, rx) = NotificationOutbox::new();
    let dispatcher = tokio::spawn(outbox::run_dispatcher(
        rx,
        Arc::clone(&store),
        Arc::new(notifier),
    ));

    let core = Arc::new(CoreState::new(store, Arc::new(SystemClock), outbox));
    let server = api::start_api_server(core, cfg.bind_addr).await?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {e}");
    }
    server.stop().await?;

    // The server held the last outbox sender; the dispatcher drains and exits.
    match dispatcher.await {
        Ok(stats) => tracing::info!(
            sent = stats.sent,
            skipped = stats.skipped,
            failed = stats.failed,
            "Notification dispatcher finished"
        ),
        Err(e) => tracing::error!("Notification dispatcher failed: {e}"),
    }

    Ok(())
}
