//! Scheduler tick loop.
//!
//! A single periodic task selects due jobs and dispatches each on its own
//! spawned task, so one slow strategy never delays detection of the others
//! on the next tick. Job outcomes fold into the schedule's run statistics
//! and the next run is recomputed in both outcomes, so a failed run never
//! stalls future scheduling.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use dunner_core::{ExecutionStatus, ExecutionType, RunStatus, ScheduledJob};

use crate::clock::Clock;
use crate::orchestrator::Orchestrator;
use crate::recurrence;
use crate::store::ScheduleStore;

pub struct SchedulerLoop {
    schedules: Arc<dyn ScheduleStore>,
    orchestrator: Arc<Orchestrator>,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
}

impl SchedulerLoop {
    pub fn new(
        schedules: Arc<dyn ScheduleStore>,
        orchestrator: Arc<Orchestrator>,
        clock: Arc<dyn Clock>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            schedules,
            orchestrator,
            clock,
            tick_interval,
        }
    }

    /// Run the tick loop forever. Spawn this on its own task.
    pub async fn run(self: Arc<Self>) {
        info!(interval_secs = self.tick_interval.as_secs(), "scheduler loop started");
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            self.tick().await;
        }
    }

    /// One scheduling pass. Returns the handles of the dispatched job
    /// tasks; the loop detaches them, tests await them.
    pub async fn tick(&self) -> Vec<JoinHandle<()>> {
        let now = self.clock.now();
        let due = self.schedules.due(now).await;
        if due.is_empty() {
            debug!("no due schedules");
            return Vec::new();
        }
        info!(count = due.len(), "dispatching due schedules");

        let mut handles = Vec::with_capacity(due.len());
        for mut job in due {
            job.last_run_status = Some(RunStatus::Running);
            job.last_run_at = Some(now);
            self.schedules.upsert(job.clone()).await;

            let orchestrator = self.orchestrator.clone();
            let schedules = self.schedules.clone();
            let clock = self.clock.clone();
            handles.push(tokio::spawn(async move {
                run_due_job(orchestrator, schedules, clock, job).await;
            }));
        }
        handles
    }
}

/// Execute one due job and write its outcome back to the schedule record.
/// Never panics outward: any failure becomes run statistics.
async fn run_due_job(
    orchestrator: Arc<Orchestrator>,
    schedules: Arc<dyn ScheduleStore>,
    clock: Arc<dyn Clock>,
    job: ScheduledJob,
) {
    let strategy_id = job.strategy_id;
    let started = std::time::Instant::now();
    let outcome = orchestrator
        .execute(strategy_id, ExecutionType::Scheduled)
        .await;
    let duration_ms = started.elapsed().as_millis() as u64;

    // Re-read: enable/disable or a config update may have landed while
    // the run was in progress.
    let mut job = match schedules.get(strategy_id).await {
        Some(job) => job,
        None => {
            warn!(strategy = %strategy_id, "schedule removed mid-run, dropping outcome");
            return;
        }
    };

    match outcome {
        Ok(execution) if execution.status != ExecutionStatus::Failed => {
            job.record_success(duration_ms);
            info!(
                strategy = %strategy_id,
                duration_ms,
                runs = job.run_count,
                "scheduled run succeeded"
            );
        }
        Ok(execution) => {
            let message = execution
                .error_message
                .unwrap_or_else(|| "execution failed".to_string());
            warn!(strategy = %strategy_id, error = %message, "scheduled run failed");
            job.record_failure(message);
        }
        Err(e) => {
            warn!(strategy = %strategy_id, error = %e, "scheduled run could not start");
            job.record_failure(e.to_string());
        }
    }

    job.next_run_at = recurrence::next_run(&job, clock.now());
    schedules.upsert(job).await;
}
