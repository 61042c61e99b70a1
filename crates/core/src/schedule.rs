//! Recurrence configuration and run-history record for a strategy.

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recurrence type of a scheduled job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleType {
    Daily,
    Weekly,
    Monthly,
    /// Fired by an external event, never by the scheduler loop.
    EventBased,
}

/// Day-of-week for weekly schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub fn to_weekday(self) -> Weekday {
        match self {
            DayOfWeek::Monday => Weekday::Mon,
            DayOfWeek::Tuesday => Weekday::Tue,
            DayOfWeek::Wednesday => Weekday::Wed,
            DayOfWeek::Thursday => Weekday::Thu,
            DayOfWeek::Friday => Weekday::Fri,
            DayOfWeek::Saturday => Weekday::Sat,
            DayOfWeek::Sunday => Weekday::Sun,
        }
    }
}

/// Outcome of the most recent scheduler-driven run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Running,
    Success,
    Failed,
}

/// Scheduling state for a single strategy (at most one per strategy,
/// created lazily on first enable).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub strategy_id: Uuid,
    pub enabled: bool,
    pub schedule_type: ScheduleType,
    /// Local time-of-day in the job's timezone.
    pub time_of_day: NaiveTime,
    /// Weekly only; validated non-empty for weekly schedules.
    #[serde(default)]
    pub days_of_week: Vec<DayOfWeek>,
    /// Monthly only; 1..=31.
    pub day_of_month: Option<u32>,
    /// IANA timezone name (e.g., "Asia/Kolkata", "UTC").
    pub timezone: String,
    /// Raw cron expression; takes precedence over the structured fields
    /// when set. 5-field expressions are accepted and normalized.
    pub cron_expression: Option<String>,
    /// Null iff disabled or EVENT_BASED.
    pub next_run_at: Option<DateTime<Utc>>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_run_status: Option<RunStatus>,
    pub last_run_message: Option<String>,
    pub run_count: u64,
    pub failure_count: u64,
    /// Rolling average wall-clock duration of successful runs.
    pub avg_execution_ms: f64,
}

impl ScheduledJob {
    /// A disabled job with sane defaults for the given strategy.
    pub fn disabled(strategy_id: Uuid, timezone: &str) -> Self {
        Self {
            strategy_id,
            enabled: false,
            schedule_type: ScheduleType::Daily,
            time_of_day: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            days_of_week: Vec::new(),
            day_of_month: None,
            timezone: timezone.to_string(),
            cron_expression: None,
            next_run_at: None,
            last_run_at: None,
            last_run_status: None,
            last_run_message: None,
            run_count: 0,
            failure_count: 0,
            avg_execution_ms: 0.0,
        }
    }

    /// Fold one successful run of `duration_ms` into the rolling average.
    pub fn record_success(&mut self, duration_ms: u64) {
        let old_count = self.run_count as f64;
        self.avg_execution_ms =
            (self.avg_execution_ms * old_count + duration_ms as f64) / (old_count + 1.0);
        self.run_count += 1;
        self.last_run_status = Some(RunStatus::Success);
        self.last_run_message = None;
    }

    /// Record one failed run with its message.
    pub fn record_failure(&mut self, message: String) {
        self.failure_count += 1;
        self.last_run_status = Some(RunStatus::Failed);
        self.last_run_message = Some(message);
    }
}
