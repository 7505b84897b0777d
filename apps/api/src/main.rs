//! Pickadrive API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod request_context;
mod state;

use std::net::SocketAddr;

use pickadrive_core::AppError;
use tracing::{info, warn};

use crate::api_config::{ApiConfig, init_tracing};
use crate::api_router::build_router;
use crate::api_services::{build_app_state, spawn_admission_purge};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let address = config.socket_address()?;
    let app_state = build_app_state(&config).await?;
    let admission_gate = app_state.admission_gate.clone();

    let purge_task = config
        .admission_purge_interval
        .map(|every| spawn_admission_purge(admission_gate.clone(), every));

    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(
        %address,
        max_attempts = config.admission_policy.max_attempts_per_window(),
        window_ms = config.admission_policy.window_ms(),
        fail_open = config.admission_policy.fail_open(),
        "pickadrive-api listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|error| AppError::Internal(format!("api server error: {error}")))?;

    if let Some(purge_task) = purge_task {
        purge_task.abort();
    }

    admission_gate.flush().await?;
    info!("admission log flushed, shutting down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
