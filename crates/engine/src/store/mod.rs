//! Store traits at the engine's persistence boundary.
//!
//! The case store is an external collaborator (the engine never writes
//! cases); the strategy, execution, and schedule stores hold the engine's
//! own records. In-memory implementations live in [`memory`].

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use dunner_core::{Case, Execution, ScheduledJob, Strategy, StrategyStatus};
use dunner_rules::CompiledPredicate;

use crate::error::EngineError;

/// The case population, queried but never mutated by the engine.
///
/// Every query is implicitly constrained to cases in the allocated
/// lifecycle state.
#[async_trait]
pub trait CaseStore: Send + Sync {
    async fn query_allocated(&self, predicate: &CompiledPredicate) -> Vec<Case>;
    async fn count_allocated(&self, predicate: &CompiledPredicate) -> usize;
    async fn all_allocated(&self) -> Vec<Case>;
}

#[async_trait]
pub trait StrategyStore: Send + Sync {
    async fn insert(&self, strategy: Strategy);
    async fn get(&self, id: Uuid) -> Option<Strategy>;
    async fn list(&self, status: Option<StrategyStatus>) -> Vec<Strategy>;
    async fn update(&self, strategy: Strategy) -> Result<(), EngineError>;
    async fn delete(&self, id: Uuid) -> bool;

    /// Atomically fold one finalized execution's action deltas into the
    /// strategy's lifetime counters and stamp `last_run_at`.
    async fn record_run(
        &self,
        id: Uuid,
        successful_actions: u64,
        failed_actions: u64,
        at: DateTime<Utc>,
    ) -> Result<(), EngineError>;
}

#[async_trait]
pub trait ExecutionStore: Send + Sync {
    /// Insert or replace by execution id.
    async fn save(&self, execution: Execution);
    async fn get(&self, id: Uuid) -> Option<Execution>;
    /// Newest first, optionally filtered by strategy.
    async fn list(&self, strategy_id: Option<Uuid>, limit: usize) -> Vec<Execution>;
}

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn upsert(&self, job: ScheduledJob);
    async fn get(&self, strategy_id: Uuid) -> Option<ScheduledJob>;
    async fn delete(&self, strategy_id: Uuid) -> bool;
    async fn all(&self) -> Vec<ScheduledJob>;
    /// Enabled jobs whose `next_run_at` has passed.
    async fn due(&self, now: DateTime<Utc>) -> Vec<ScheduledJob>;
}
