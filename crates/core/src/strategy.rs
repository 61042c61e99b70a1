//! Strategy records: typed filter rules plus an ordered action list.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schedule::ScheduleType;

/// Lifecycle status of a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyStatus {
    Draft,
    Active,
    Inactive,
}

/// Filter operator applied by a single rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    In,
    NotIn,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Between,
    IsNull,
    IsNotNull,
}

/// Logical operator combining *all* rules of one strategy.
///
/// Not per-rule: the operator on the first rule governs the whole set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogicalOp {
    #[default]
    And,
    Or,
}

/// One typed filter condition belonging to a strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: Uuid,
    /// Dot-path into the case entity graph (e.g., "loan.dpd").
    pub field: String,
    pub operator: Operator,
    /// Value as text; comma-separated for IN / NOT_IN / BETWEEN.
    pub value: String,
    /// Combiner for the owning strategy's rule set, read from the first
    /// rule only.
    #[serde(default)]
    pub logical_op: LogicalOp,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

/// Channel operation applied to each matched case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    SendSms,
    SendEmail,
    SendWhatsapp,
    CreateNotice,
    ScheduleCall,
}

/// One ordered action of a strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub id: Uuid,
    pub action_type: ActionType,
    /// Channel identifier (vendor route, sender id, notice kind).
    pub channel: String,
    /// Optional message template reference.
    pub template: Option<String>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// A named, schedulable unit combining filter rules and an action list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    pub id: Uuid,
    /// Short human code (e.g., "EARLY-DPD-SMS").
    pub code: String,
    pub name: String,
    pub status: StrategyStatus,
    #[serde(default)]
    pub priority: i32,
    /// Trigger descriptor duplicated here for display; the authoritative
    /// schedule lives on the strategy's [`ScheduledJob`](crate::ScheduledJob).
    pub trigger_frequency: Option<ScheduleType>,
    pub trigger_time: Option<NaiveTime>,
    /// Display-formatted day set ("MONDAY,THURSDAY") or day-of-month ("15").
    pub trigger_days: Option<String>,
    /// Lifetime successful action count. Monotonic, never reset.
    pub success_count: u64,
    /// Lifetime failed action count. Monotonic, never reset.
    pub failure_count: u64,
    pub last_run_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub rules: Vec<Rule>,
    pub actions: Vec<Action>,
}

impl Strategy {
    /// Active rules in configured order.
    pub fn active_rules(&self) -> Vec<&Rule> {
        let mut rules: Vec<&Rule> = self.rules.iter().filter(|r| r.active).collect();
        rules.sort_by_key(|r| r.sort_order);
        rules
    }

    /// Active actions ordered by priority.
    pub fn active_actions(&self) -> Vec<&Action> {
        let mut actions: Vec<&Action> = self.actions.iter().filter(|a| a.active).collect();
        actions.sort_by_key(|a| a.priority);
        actions
    }
}
