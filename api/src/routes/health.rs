//! `GET /health` (spec §6, bypasses signature verification). Reports
//! queue depth and installation-token cache size as a liveness signal
//! for the worker-side shared state (SPEC_FULL.md's supplemented
//! health-reporting feature — the distilled spec only asked for
//! `200 {status:"ok",...}`).

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::core::app_state::AppState;

#[derive(Serialize)]
pub struct HealthBody {
    status: &'static str,
    queue_depth: u64,
    installation_token_cache_size: usize,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        queue_depth: state.queue.depth().await,
        installation_token_cache_size: state.forge.token_cache_size(),
    })
}
