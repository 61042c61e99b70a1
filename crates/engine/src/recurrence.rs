//! Next-run computation for scheduled jobs.
//!
//! Pure: `next_run(job, now)` never touches the wall clock. Times are
//! computed in the job's IANA timezone and returned in UTC. A raw cron
//! expression on the job takes precedence over the structured fields.

use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use cron::Schedule;
use tracing::warn;

use dunner_core::{ScheduleType, ScheduledJob};

use crate::error::EngineError;

/// Days scanned forward for a weekly schedule before the defensive
/// fallback kicks in. Two full weeks covers any non-empty day set.
const WEEKLY_SCAN_DAYS: u64 = 14;

/// Compute the next firing time of a job, strictly after `now`.
///
/// Returns `None` when the job is disabled or event-based.
pub fn next_run(job: &ScheduledJob, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if !job.enabled || job.schedule_type == ScheduleType::EventBased {
        return None;
    }

    let tz = resolve_timezone(&job.timezone);

    if let Some(expr) = job.cron_expression.as_deref() {
        match Schedule::from_str(&normalize_cron(expr)) {
            Ok(schedule) => {
                return schedule
                    .after(&now.with_timezone(&tz))
                    .next()
                    .map(|dt| dt.with_timezone(&Utc));
            }
            Err(e) => {
                // The API validates cron at config time; records mutated
                // out-of-band degrade to the structured fields.
                warn!(cron = expr, error = %e, "invalid cron expression, using structured schedule");
            }
        }
    }

    let local_now = now.with_timezone(&tz);
    let today = local_now.date_naive();

    match job.schedule_type {
        ScheduleType::Daily => {
            // Today at the schedule time, or tomorrow once that has passed.
            for offset in 0..=2u64 {
                let date = today.checked_add_days(Days::new(offset))?;
                if let Some(candidate) = resolve_local(&tz, date, job.time_of_day) {
                    if candidate > now {
                        return Some(candidate);
                    }
                }
            }
            None
        }
        ScheduleType::Weekly => {
            let wanted: Vec<Weekday> =
                job.days_of_week.iter().map(|d| d.to_weekday()).collect();
            for offset in 0..WEEKLY_SCAN_DAYS {
                let date = today.checked_add_days(Days::new(offset))?;
                if !wanted.contains(&date.weekday()) {
                    continue;
                }
                if let Some(candidate) = resolve_local(&tz, date, job.time_of_day) {
                    if candidate > now {
                        return Some(candidate);
                    }
                }
            }
            // Unreachable with a non-empty day set; kept so a corrupted
            // record degrades to "a week from now" instead of stalling.
            Some(now + Duration::days(7))
        }
        ScheduleType::Monthly => {
            let day = job.day_of_month.unwrap_or(1);
            let mut year = today.year();
            let mut month = today.month();
            // 13 months covers every day-of-month that exists at all.
            for _ in 0..13 {
                if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                    if let Some(candidate) = resolve_local(&tz, date, job.time_of_day) {
                        if candidate > now {
                            return Some(candidate);
                        }
                    }
                }
                month += 1;
                if month > 12 {
                    month = 1;
                    year += 1;
                }
            }
            None
        }
        ScheduleType::EventBased => None,
    }
}

/// Validate a job's schedule configuration at save time.
///
/// Rejects the configurations `next_run` would otherwise paper over:
/// weekly with an empty day set, monthly without a real day-of-month, an
/// unknown timezone, or an unparseable cron expression.
pub fn validate_config(job: &ScheduledJob) -> Result<(), EngineError> {
    if job.timezone.parse::<Tz>().is_err() {
        return Err(EngineError::Schedule(format!(
            "unknown timezone '{}'",
            job.timezone
        )));
    }

    if let Some(expr) = job.cron_expression.as_deref() {
        if Schedule::from_str(&normalize_cron(expr)).is_err() {
            return Err(EngineError::Schedule(format!(
                "invalid cron expression '{expr}'"
            )));
        }
    }

    match job.schedule_type {
        ScheduleType::Weekly if job.days_of_week.is_empty() => Err(EngineError::Schedule(
            "weekly schedule requires at least one day of week".to_string(),
        )),
        ScheduleType::Monthly => match job.day_of_month {
            Some(1..=31) => Ok(()),
            Some(other) => Err(EngineError::Schedule(format!(
                "day of month {other} out of range 1..=31"
            ))),
            None => Err(EngineError::Schedule(
                "monthly schedule requires a day of month".to_string(),
            )),
        },
        _ => Ok(()),
    }
}

fn resolve_timezone(name: &str) -> Tz {
    match name.parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            warn!(timezone = name, "unknown timezone, falling back to UTC");
            Tz::UTC
        }
    }
}

/// Anchor a local date+time in the timezone, mapped back to UTC.
/// `None` on nonexistent local times (DST gap); callers skip forward.
fn resolve_local(tz: &Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Normalize a 5-field cron expression to the 6-field form the `cron`
/// crate expects by prepending a seconds field.
fn normalize_cron(expr: &str) -> String {
    let trimmed = expr.trim();
    if trimmed.split_whitespace().count() == 5 {
        format!("0 {trimmed}")
    } else {
        trimmed.to_string()
    }
}
