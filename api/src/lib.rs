//! Ingress process entry point: wires the webhook HTTP server (C11) to
//! the job queue (C12) and spawns the worker loop that drives the
//! review orchestrator (C10) for every dequeued job.

pub mod config;
pub mod core;
pub mod error_handler;
pub mod routes;
mod telemetry;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use job_queue::JobQueue;
use review_orchestrator::Orchestrator;
use tokio::net::TcpListener;
use tracing::info;

use config::AppConfig;
use core::app_state::AppState;
use error_handler::{AppError, AppResult};

/// Raw webhook bodies are bounded to 2 MiB (spec §4.10(a): "read raw
/// body to a bounded buffer") — GitHub PR webhook payloads carry no
/// diff content, so this comfortably covers real traffic while still
/// bounding worst-case memory per request.
const MAX_WEBHOOK_BODY_BYTES: usize = 2 * 1024 * 1024;

pub async fn start() -> AppResult<()> {
    let app_config = AppConfig::from_env()?;
    telemetry::init(&app_config.log_level, app_config.log_json);

    let AppConfig {
        host,
        port,
        webhook_secret,
        forge,
        llm,
        osv_client,
        queue,
        orchestrator,
        ..
    } = app_config;

    let queue = Arc::new(JobQueue::from_config(queue).await.map_err(config::ConfigError::from)?);
    let state = Arc::new(AppState {
        forge: forge.clone(),
        queue: Arc::clone(&queue),
        webhook_secret: webhook_secret.into(),
    });

    let orchestrator = Arc::new(Orchestrator::new(forge, llm, osv_client, orchestrator));
    Arc::clone(&queue).spawn_workers(move |job| {
        let orchestrator = Arc::clone(&orchestrator);
        async move {
            let job_id = job.id.clone();
            let result = orchestrator.process(job).await;
            if result.success {
                Ok(())
            } else {
                Err(anyhow::anyhow!(
                    "job {job_id} failed: {}",
                    result.error.unwrap_or_else(|| "unknown error".into())
                ))
            }
        }
    });

    let router = Router::new()
        .route("/webhook", post(routes::webhook::webhook))
        .layer(DefaultBodyLimit::max(MAX_WEBHOOK_BODY_BYTES))
        .route("/health", get(routes::health::health))
        .with_state(state);

    let addr = format!("{host}:{port}");
    info!(%addr, "revguard ingress listening");
    let listener = TcpListener::bind(&addr).await.map_err(AppError::Bind)?;
    axum::serve(listener, router).await.map_err(AppError::Server)?;

    queue.close();
    Ok(())
}
