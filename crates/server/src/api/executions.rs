//! Execution trigger, simulation, and query endpoints.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dunner_core::{Execution, ExecutionType};
use dunner_rules::compile;

use crate::state::AppState;

use super::{bad_request, engine_error, not_found, ApiError};

#[derive(Serialize)]
pub struct TriggerResponse {
    pub execution_id: Uuid,
}

/// Start a manual execution. Returns immediately with the execution id;
/// processing continues on a background task and is visible via
/// `GET /executions/{id}`.
pub async fn strategy_execute(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<TriggerResponse>), ApiError> {
    let execution_id = state
        .orchestrator
        .trigger(id, ExecutionType::Manual)
        .await
        .map_err(engine_error)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(TriggerResponse { execution_id }),
    ))
}

#[derive(Serialize)]
pub struct SimulateResponse {
    /// Cases the strategy would target right now.
    pub matched: usize,
    /// Up to 10 matching case numbers for sanity-checking the rules.
    pub sample_case_numbers: Vec<String>,
}

/// Compile the strategy's rules and count matches without executing any
/// action.
pub async fn strategy_simulate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SimulateResponse>, ApiError> {
    let strategy = state
        .strategies
        .get(id)
        .await
        .ok_or_else(|| not_found(format!("strategy {id} not found")))?;

    let rules = strategy.active_rules();
    let predicate = compile(&rules).map_err(|e| bad_request(e.to_string()))?;

    let matched = state.query.matching(&predicate).await;
    let sample_case_numbers = matched
        .iter()
        .take(10)
        .map(|c| c.case_number.clone())
        .collect();

    Ok(Json(SimulateResponse {
        matched: matched.len(),
        sample_case_numbers,
    }))
}

pub async fn executions_get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Execution>, ApiError> {
    state
        .executions
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(format!("execution {id} not found")))
}

#[derive(Debug, Deserialize)]
pub struct ExecutionListParams {
    pub strategy_id: Option<Uuid>,
    pub limit: Option<usize>,
}

pub async fn executions_list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExecutionListParams>,
) -> Json<Vec<Execution>> {
    let limit = params.limit.unwrap_or(50).min(500);
    Json(state.executions.list(params.strategy_id, limit).await)
}
