//! In-memory store implementations behind `tokio::sync::RwLock`.
//!
//! These back the server's default deployment and the engine's tests.
//! `record_run` performs its read-modify-write under the map's write lock,
//! which is the atomicity the counter contract requires.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use dunner_core::{Case, Execution, ScheduledJob, Strategy, StrategyStatus};
use dunner_rules::CompiledPredicate;

use crate::error::EngineError;

use super::{CaseStore, ExecutionStore, ScheduleStore, StrategyStore};

// ── Cases ───────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryCaseStore {
    cases: RwLock<Vec<Case>>,
}

impl InMemoryCaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, case: Case) {
        self.cases.write().await.push(case);
    }

    pub async fn extend(&self, cases: Vec<Case>) {
        self.cases.write().await.extend(cases);
    }

    pub async fn len(&self) -> usize {
        self.cases.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cases.read().await.is_empty()
    }
}

#[async_trait]
impl CaseStore for InMemoryCaseStore {
    async fn query_allocated(&self, predicate: &CompiledPredicate) -> Vec<Case> {
        self.cases
            .read()
            .await
            .iter()
            .filter(|c| c.is_allocated() && predicate.matches(c))
            .cloned()
            .collect()
    }

    async fn count_allocated(&self, predicate: &CompiledPredicate) -> usize {
        self.cases
            .read()
            .await
            .iter()
            .filter(|c| c.is_allocated() && predicate.matches(c))
            .count()
    }

    async fn all_allocated(&self) -> Vec<Case> {
        self.cases
            .read()
            .await
            .iter()
            .filter(|c| c.is_allocated())
            .cloned()
            .collect()
    }
}

// ── Strategies ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryStrategyStore {
    strategies: RwLock<HashMap<Uuid, Strategy>>,
}

impl InMemoryStrategyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StrategyStore for InMemoryStrategyStore {
    async fn insert(&self, strategy: Strategy) {
        self.strategies.write().await.insert(strategy.id, strategy);
    }

    async fn get(&self, id: Uuid) -> Option<Strategy> {
        self.strategies.read().await.get(&id).cloned()
    }

    async fn list(&self, status: Option<StrategyStatus>) -> Vec<Strategy> {
        let mut strategies: Vec<Strategy> = self
            .strategies
            .read()
            .await
            .values()
            .filter(|s| status.map(|wanted| s.status == wanted).unwrap_or(true))
            .cloned()
            .collect();
        strategies.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        strategies
    }

    async fn update(&self, strategy: Strategy) -> Result<(), EngineError> {
        let mut strategies = self.strategies.write().await;
        match strategies.get_mut(&strategy.id) {
            Some(slot) => {
                *slot = strategy;
                Ok(())
            }
            None => Err(EngineError::StrategyNotFound(strategy.id)),
        }
    }

    async fn delete(&self, id: Uuid) -> bool {
        self.strategies.write().await.remove(&id).is_some()
    }

    async fn record_run(
        &self,
        id: Uuid,
        successful_actions: u64,
        failed_actions: u64,
        at: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        let mut strategies = self.strategies.write().await;
        let strategy = strategies
            .get_mut(&id)
            .ok_or(EngineError::StrategyNotFound(id))?;
        strategy.success_count += successful_actions;
        strategy.failure_count += failed_actions;
        strategy.last_run_at = Some(at);
        strategy.updated_at = at;
        Ok(())
    }
}

// ── Executions ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryExecutionStore {
    executions: RwLock<HashMap<Uuid, Execution>>,
}

impl InMemoryExecutionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExecutionStore for InMemoryExecutionStore {
    async fn save(&self, execution: Execution) {
        self.executions
            .write()
            .await
            .insert(execution.id, execution);
    }

    async fn get(&self, id: Uuid) -> Option<Execution> {
        self.executions.read().await.get(&id).cloned()
    }

    async fn list(&self, strategy_id: Option<Uuid>, limit: usize) -> Vec<Execution> {
        let mut executions: Vec<Execution> = self
            .executions
            .read()
            .await
            .values()
            .filter(|e| strategy_id.map(|id| e.strategy_id == id).unwrap_or(true))
            .cloned()
            .collect();
        executions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        executions.truncate(limit);
        executions
    }
}

// ── Schedules ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryScheduleStore {
    jobs: RwLock<HashMap<Uuid, ScheduledJob>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn upsert(&self, job: ScheduledJob) {
        self.jobs.write().await.insert(job.strategy_id, job);
    }

    async fn get(&self, strategy_id: Uuid) -> Option<ScheduledJob> {
        self.jobs.read().await.get(&strategy_id).cloned()
    }

    async fn delete(&self, strategy_id: Uuid) -> bool {
        self.jobs.write().await.remove(&strategy_id).is_some()
    }

    async fn all(&self) -> Vec<ScheduledJob> {
        self.jobs.read().await.values().cloned().collect()
    }

    async fn due(&self, now: DateTime<Utc>) -> Vec<ScheduledJob> {
        self.jobs
            .read()
            .await
            .values()
            .filter(|j| j.enabled && j.next_run_at.map(|at| at <= now).unwrap_or(false))
            .cloned()
            .collect()
    }
}
