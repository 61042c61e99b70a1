//! Execution records: one concrete run of a strategy's match-then-act
//! pipeline. Immutable once a terminal status is written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::strategy::ActionType;

/// How the execution was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionType {
    Manual,
    Scheduled,
}

/// Execution status. Monotonic: PROCESSING is the only non-terminal state
/// and terminal states are never revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Processing,
    Completed,
    Failed,
}

/// One entry of an execution's failure log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionFailure {
    pub case_id: Uuid,
    pub case_number: String,
    pub action_type: ActionType,
    pub error: String,
    pub at: DateTime<Utc>,
}

/// Failure-log entries retained per execution; beyond this the log drops
/// entries (counted in `dropped_failures`) while counters stay exact.
pub const FAILURE_LOG_CAP: usize = 1_000;

/// One run of a strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    pub id: Uuid,
    pub strategy_id: Uuid,
    /// Strategy name snapshot captured at trigger time, not live-joined.
    pub strategy_name: String,
    pub execution_type: ExecutionType,
    pub status: ExecutionStatus,
    pub total_records_evaluated: u64,
    pub records_matched: u64,
    pub total_cases_processed: u64,
    pub successful_actions: u64,
    pub failed_actions: u64,
    pub failures: Vec<ActionFailure>,
    /// Failure-log entries discarded past [`FAILURE_LOG_CAP`].
    #[serde(default)]
    pub dropped_failures: u64,
    /// Set only on fatal (non-per-case) aborts.
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Execution {
    /// A fresh PROCESSING record snapshotting the strategy identity.
    pub fn begin(
        strategy_id: Uuid,
        strategy_name: &str,
        execution_type: ExecutionType,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            strategy_id,
            strategy_name: strategy_name.to_string(),
            execution_type,
            status: ExecutionStatus::Processing,
            total_records_evaluated: 0,
            records_matched: 0,
            total_cases_processed: 0,
            successful_actions: 0,
            failed_actions: 0,
            failures: Vec::new(),
            dropped_failures: 0,
            error_message: None,
            started_at: now,
            completed_at: None,
        }
    }

    /// Append a failure-log entry, respecting the retention cap.
    /// `failed_actions` is the caller's to increment; the cap never skews it.
    pub fn log_failure(&mut self, failure: ActionFailure) {
        if self.failures.len() < FAILURE_LOG_CAP {
            self.failures.push(failure);
        } else {
            self.dropped_failures += 1;
        }
    }
}
