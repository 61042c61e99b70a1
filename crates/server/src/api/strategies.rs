//! Strategy CRUD endpoints.
//!
//! A strategy, its rules, its actions, and (optionally) its schedule are
//! written as one unit. Rule sets are compiled at save time, so a
//! configuration error rejects the write instead of surfacing later as a
//! silent false-match.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use dunner_core::{
    Action, ActionType, LogicalOp, Operator, Rule, ScheduleType, ScheduledJob, Strategy,
    StrategyStatus,
};
use dunner_engine::recurrence;
use dunner_rules::validate_rules;

use crate::state::AppState;

use super::scheduler::{apply_schedule_input, ScheduleInput};
use super::{bad_request, not_found, ApiError};

// ── Request shapes ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RuleInput {
    pub field: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub logical_op: LogicalOp,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Deserialize)]
pub struct ActionInput {
    pub action_type: ActionType,
    pub channel: String,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct StrategyRequest {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub priority: i32,
    pub status: Option<StrategyStatus>,
    #[serde(default)]
    pub rules: Vec<RuleInput>,
    #[serde(default)]
    pub actions: Vec<ActionInput>,
    pub schedule: Option<ScheduleInput>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<StrategyStatus>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: StrategyStatus,
}

// ── Builders ──────────────────────────────────────────────────────

fn build_rules(inputs: &[RuleInput]) -> Vec<Rule> {
    inputs
        .iter()
        .map(|r| Rule {
            id: Uuid::new_v4(),
            field: r.field.clone(),
            operator: r.operator,
            value: r.value.clone(),
            logical_op: r.logical_op,
            active: r.active,
            sort_order: r.sort_order,
        })
        .collect()
}

fn build_actions(inputs: &[ActionInput]) -> Vec<Action> {
    inputs
        .iter()
        .map(|a| Action {
            id: Uuid::new_v4(),
            action_type: a.action_type,
            channel: a.channel.clone(),
            template: a.template.clone(),
            priority: a.priority,
            active: a.active,
        })
        .collect()
}

/// Display form of a job's day set: weekly day names or the monthly day.
fn display_days(job: &ScheduledJob) -> Option<String> {
    match job.schedule_type {
        ScheduleType::Weekly => Some(
            job.days_of_week
                .iter()
                .map(|d| format!("{d:?}").to_uppercase())
                .collect::<Vec<_>>()
                .join(","),
        ),
        ScheduleType::Monthly => job.day_of_month.map(|d| d.to_string()),
        _ => None,
    }
}

/// Copy the schedule's trigger descriptor onto the strategy for display.
fn sync_trigger_display(strategy: &mut Strategy, job: Option<&ScheduledJob>) {
    match job {
        Some(job) => {
            strategy.trigger_frequency = Some(job.schedule_type);
            strategy.trigger_time = Some(job.time_of_day);
            strategy.trigger_days = display_days(job);
        }
        None => {
            strategy.trigger_frequency = None;
            strategy.trigger_time = None;
            strategy.trigger_days = None;
        }
    }
}

/// Build and validate the schedule record for a strategy write.
fn build_schedule(
    state: &AppState,
    strategy_id: Uuid,
    existing: Option<ScheduledJob>,
    input: &ScheduleInput,
) -> Result<ScheduledJob, ApiError> {
    let mut job = existing
        .unwrap_or_else(|| ScheduledJob::disabled(strategy_id, &state.config.scheduler.default_timezone));
    apply_schedule_input(&mut job, input);
    recurrence::validate_config(&job).map_err(super::engine_error)?;
    job.next_run_at = recurrence::next_run(&job, state.clock.now());
    Ok(job)
}

// ── Handlers ──────────────────────────────────────────────────────

pub async fn strategies_create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StrategyRequest>,
) -> Result<(StatusCode, Json<Strategy>), ApiError> {
    let rules = build_rules(&req.rules);
    validate_rules(&rules).map_err(|e| bad_request(e.to_string()))?;

    let now = state.clock.now();
    let mut strategy = Strategy {
        id: Uuid::new_v4(),
        code: req.code,
        name: req.name,
        status: req.status.unwrap_or(StrategyStatus::Draft),
        priority: req.priority,
        trigger_frequency: None,
        trigger_time: None,
        trigger_days: None,
        success_count: 0,
        failure_count: 0,
        last_run_at: None,
        created_at: now,
        updated_at: now,
        rules,
        actions: build_actions(&req.actions),
    };

    let job = match &req.schedule {
        Some(input) => Some(build_schedule(&state, strategy.id, None, input)?),
        None => None,
    };
    sync_trigger_display(&mut strategy, job.as_ref());

    state.strategies.insert(strategy.clone()).await;
    if let Some(job) = job {
        state.schedules.upsert(job).await;
    }

    info!(strategy = %strategy.id, code = %strategy.code, "strategy created");
    Ok((StatusCode::CREATED, Json(strategy)))
}

pub async fn strategies_list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Json<Vec<Strategy>> {
    Json(state.strategies.list(params.status).await)
}

pub async fn strategies_get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Strategy>, ApiError> {
    state
        .strategies
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(format!("strategy {id} not found")))
}

pub async fn strategies_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<StrategyRequest>,
) -> Result<Json<Strategy>, ApiError> {
    let existing = state
        .strategies
        .get(id)
        .await
        .ok_or_else(|| not_found(format!("strategy {id} not found")))?;

    let rules = build_rules(&req.rules);
    validate_rules(&rules).map_err(|e| bad_request(e.to_string()))?;

    let mut strategy = Strategy {
        id,
        code: req.code,
        name: req.name,
        status: req.status.unwrap_or(existing.status),
        priority: req.priority,
        trigger_frequency: existing.trigger_frequency,
        trigger_time: existing.trigger_time,
        trigger_days: existing.trigger_days.clone(),
        success_count: existing.success_count,
        failure_count: existing.failure_count,
        last_run_at: existing.last_run_at,
        created_at: existing.created_at,
        updated_at: state.clock.now(),
        rules,
        actions: build_actions(&req.actions),
    };

    // A schedule in the request merges onto the stored job; its absence
    // leaves the existing schedule untouched.
    let job = match &req.schedule {
        Some(input) => {
            let existing_job = state.schedules.get(id).await;
            Some(build_schedule(&state, id, existing_job, input)?)
        }
        None => state.schedules.get(id).await,
    };
    sync_trigger_display(&mut strategy, job.as_ref());

    state
        .strategies
        .update(strategy.clone())
        .await
        .map_err(super::engine_error)?;
    if let (Some(job), Some(_)) = (&job, &req.schedule) {
        state.schedules.upsert(job.clone()).await;
    }

    info!(strategy = %id, "strategy updated");
    Ok(Json(strategy))
}

pub async fn strategies_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.strategies.delete(id).await {
        return Err(not_found(format!("strategy {id} not found")));
    }
    // Cascade: the schedule goes with the strategy. Execution history
    // stays — it snapshots the strategy name for exactly this reason.
    state.schedules.delete(id).await;
    info!(strategy = %id, "strategy deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn strategies_set_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Strategy>, ApiError> {
    let mut strategy = state
        .strategies
        .get(id)
        .await
        .ok_or_else(|| not_found(format!("strategy {id} not found")))?;
    strategy.status = req.status;
    strategy.updated_at = state.clock.now();
    state
        .strategies
        .update(strategy.clone())
        .await
        .map_err(super::engine_error)?;
    info!(strategy = %id, status = ?req.status, "strategy status changed");
    Ok(Json(strategy))
}
