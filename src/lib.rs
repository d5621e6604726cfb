pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use std::sync::Arc;
use tokio::signal;

use anyhow::Context;
pub use config::Config;
use state::SharedState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber from the configured log level;
/// `RUST_LOG` wins when set.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    config.validate()?;

    let shared = Arc::new(SharedState::new(config).await?);

    if let Some(created) = shared.ensure_bootstrap_admin().await? {
        info!(handle = %created.account.handle, "Seeded default administrator account");
        println!("Default administrator account created:");
        println!("  Handle: {}", created.account.handle);
        println!("  Temporary password: {}", created.temporary_password);
        println!("  A new password must be chosen on first login.");
    }

    let port = shared.config.read().await.server.port;
    let api_state = api::create_app_state(shared);
    let app = api::router(api_state).await;

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    let server_handle = tokio::spawn(async move {
        info!("Web server running at http://{addr}");
        if let Err(e) = axum::serve(listener, app).await {
            error!("Web server error: {}", e);
        }
    });

    info!("Service running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    server_handle.abort();
    info!("Service stopped");

    Ok(())
}
