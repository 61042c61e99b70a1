//! Scheduler enable/disable and configuration endpoints.
//!
//! One POST covers enable, disable, and config updates: every field is
//! optional and merges onto the stored job. `next_run_at` is recomputed on
//! every write (null once disabled), so schedule changes take effect on
//! the next tick.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::NaiveTime;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use dunner_core::{DayOfWeek, ScheduleType, ScheduledJob};
use dunner_engine::recurrence;

use crate::state::AppState;

use super::{engine_error, not_found, ApiError};

#[derive(Debug, Deserialize)]
pub struct ScheduleInput {
    pub enabled: Option<bool>,
    pub schedule_type: Option<ScheduleType>,
    pub time_of_day: Option<NaiveTime>,
    pub days_of_week: Option<Vec<DayOfWeek>>,
    pub day_of_month: Option<u32>,
    pub timezone: Option<String>,
    pub cron_expression: Option<String>,
}

/// Merge a partial schedule update onto a job. An empty cron string
/// clears the expression.
pub(crate) fn apply_schedule_input(job: &mut ScheduledJob, input: &ScheduleInput) {
    if let Some(enabled) = input.enabled {
        job.enabled = enabled;
    }
    if let Some(schedule_type) = input.schedule_type {
        job.schedule_type = schedule_type;
    }
    if let Some(time_of_day) = input.time_of_day {
        job.time_of_day = time_of_day;
    }
    if let Some(days) = &input.days_of_week {
        job.days_of_week = days.clone();
    }
    if let Some(day) = input.day_of_month {
        job.day_of_month = Some(day);
    }
    if let Some(timezone) = &input.timezone {
        job.timezone = timezone.clone();
    }
    if let Some(cron) = &input.cron_expression {
        job.cron_expression = Some(cron.clone()).filter(|c| !c.trim().is_empty());
    }
}

pub async fn scheduler_configure(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(input): Json<ScheduleInput>,
) -> Result<Json<ScheduledJob>, ApiError> {
    if state.strategies.get(id).await.is_none() {
        return Err(not_found(format!("strategy {id} not found")));
    }

    // The job is created lazily on first configuration.
    let mut job = match state.schedules.get(id).await {
        Some(job) => job,
        None => ScheduledJob::disabled(id, &state.config.scheduler.default_timezone),
    };
    apply_schedule_input(&mut job, &input);
    recurrence::validate_config(&job).map_err(engine_error)?;
    job.next_run_at = recurrence::next_run(&job, state.clock.now());

    state.schedules.upsert(job.clone()).await;
    info!(
        strategy = %id,
        enabled = job.enabled,
        next_run = ?job.next_run_at,
        "schedule updated"
    );
    Ok(Json(job))
}

pub async fn scheduler_get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScheduledJob>, ApiError> {
    state
        .schedules
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(format!("no schedule for strategy {id}")))
}
