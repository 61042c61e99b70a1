//! Dashboard aggregate for the admin landing view.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use dunner_core::{ExecutionStatus, ExecutionType, StrategyStatus};

use crate::state::AppState;

#[derive(Serialize)]
pub struct StrategyOverview {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub status: StrategyStatus,
    pub success_count: u64,
    pub failure_count: u64,
    /// Lifetime share of successful actions; null until the strategy has
    /// dispatched anything.
    pub success_rate: Option<f64>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub next_run_at: Option<DateTime<Utc>>,
    pub scheduler_enabled: bool,
}

#[derive(Serialize)]
pub struct ExecutionOverview {
    pub id: Uuid,
    pub strategy_name: String,
    pub status: ExecutionStatus,
    pub execution_type: ExecutionType,
    pub total_cases_processed: u64,
    pub successful_actions: u64,
    pub failed_actions: u64,
    pub started_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub total_strategies: usize,
    pub strategies_by_status: HashMap<&'static str, usize>,
    pub overall_success_rate: Option<f64>,
    pub enabled_schedulers: usize,
    pub strategies: Vec<StrategyOverview>,
    pub recent_executions: Vec<ExecutionOverview>,
}

fn status_key(status: StrategyStatus) -> &'static str {
    match status {
        StrategyStatus::Draft => "DRAFT",
        StrategyStatus::Active => "ACTIVE",
        StrategyStatus::Inactive => "INACTIVE",
    }
}

fn rate(successes: u64, failures: u64) -> Option<f64> {
    let total = successes + failures;
    if total == 0 {
        None
    } else {
        Some(successes as f64 / total as f64)
    }
}

pub async fn dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardResponse> {
    let strategies = state.strategies.list(None).await;
    let jobs: HashMap<Uuid, _> = state
        .schedules
        .all()
        .await
        .into_iter()
        .map(|j| (j.strategy_id, j))
        .collect();

    let mut by_status: HashMap<&'static str, usize> = HashMap::new();
    let mut total_successes = 0u64;
    let mut total_failures = 0u64;

    let overviews: Vec<StrategyOverview> = strategies
        .iter()
        .map(|s| {
            *by_status.entry(status_key(s.status)).or_insert(0) += 1;
            total_successes += s.success_count;
            total_failures += s.failure_count;
            let job = jobs.get(&s.id);
            StrategyOverview {
                id: s.id,
                code: s.code.clone(),
                name: s.name.clone(),
                status: s.status,
                success_count: s.success_count,
                failure_count: s.failure_count,
                success_rate: rate(s.success_count, s.failure_count),
                last_run_at: s.last_run_at,
                next_run_at: job.and_then(|j| j.next_run_at),
                scheduler_enabled: job.map(|j| j.enabled).unwrap_or(false),
            }
        })
        .collect();

    let recent_executions = state
        .executions
        .list(None, 10)
        .await
        .into_iter()
        .map(|e| ExecutionOverview {
            id: e.id,
            strategy_name: e.strategy_name,
            status: e.status,
            execution_type: e.execution_type,
            total_cases_processed: e.total_cases_processed,
            successful_actions: e.successful_actions,
            failed_actions: e.failed_actions,
            started_at: e.started_at,
        })
        .collect();

    Json(DashboardResponse {
        total_strategies: strategies.len(),
        strategies_by_status: by_status,
        overall_success_rate: rate(total_successes, total_failures),
        enabled_schedulers: jobs.values().filter(|j| j.enabled).count(),
        strategies: overviews,
        recent_executions,
    })
}
