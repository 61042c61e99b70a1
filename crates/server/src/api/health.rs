//! Health endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub strategies: usize,
    pub allocated_cases: usize,
    pub enabled_schedulers: usize,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let strategies = state.strategies.list(None).await.len();
    let allocated_cases = state.cases.all_allocated().await.len();
    let enabled_schedulers = state
        .schedules
        .all()
        .await
        .iter()
        .filter(|j| j.enabled)
        .count();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        strategies,
        allocated_cases,
        enabled_schedulers,
    })
}
