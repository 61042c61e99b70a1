//! Execution orchestrator: match cases, apply actions, finalize exactly once.
//!
//! A trigger creates the PROCESSING record and hands the work to a spawned
//! task, so callers get the execution id back immediately. Per-(case,
//! action) failures are logged and counted, never propagated; only
//! configuration errors and fatal orchestration errors finalize the
//! execution as FAILED.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};
use uuid::Uuid;

use dunner_channels::ActionDispatcher;
use dunner_core::{
    ActionFailure, Execution, ExecutionStatus, ExecutionType, Strategy,
};
use dunner_rules::compile;

use crate::clock::Clock;
use crate::error::EngineError;
use crate::query::CaseQuery;
use crate::store::{CaseStore, ExecutionStore, StrategyStore};

pub struct Orchestrator {
    strategies: Arc<dyn StrategyStore>,
    executions: Arc<dyn ExecutionStore>,
    query: CaseQuery,
    dispatcher: Arc<ActionDispatcher>,
    clock: Arc<dyn Clock>,
    /// Strategies with a run in flight. Concurrent runs of one strategy
    /// are rejected: a duplicate send is the worst failure mode here.
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
}

/// Releases the in-flight claim when the run ends, on every path.
struct InFlightClaim {
    set: Arc<Mutex<HashSet<Uuid>>>,
    strategy_id: Uuid,
}

impl Drop for InFlightClaim {
    fn drop(&mut self) {
        self.set.lock().unwrap().remove(&self.strategy_id);
    }
}

impl Orchestrator {
    pub fn new(
        strategies: Arc<dyn StrategyStore>,
        executions: Arc<dyn ExecutionStore>,
        cases: Arc<dyn CaseStore>,
        dispatcher: Arc<ActionDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            strategies,
            executions,
            query: CaseQuery::new(cases),
            dispatcher,
            clock,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    fn claim(&self, strategy_id: Uuid) -> Result<InFlightClaim, EngineError> {
        let mut set = self.in_flight.lock().unwrap();
        if !set.insert(strategy_id) {
            return Err(EngineError::AlreadyRunning(strategy_id));
        }
        Ok(InFlightClaim {
            set: self.in_flight.clone(),
            strategy_id,
        })
    }

    /// Start an execution and return its id; processing continues on a
    /// spawned task.
    pub async fn trigger(
        self: &Arc<Self>,
        strategy_id: Uuid,
        execution_type: ExecutionType,
    ) -> Result<Uuid, EngineError> {
        let strategy = self
            .strategies
            .get(strategy_id)
            .await
            .ok_or(EngineError::StrategyNotFound(strategy_id))?;
        let claim = self.claim(strategy_id)?;

        let execution = Execution::begin(strategy_id, &strategy.name, execution_type, self.clock.now());
        let execution_id = execution.id;
        self.executions.save(execution.clone()).await;

        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            let _claim = claim;
            orchestrator.run(execution, &strategy).await;
        });

        Ok(execution_id)
    }

    /// Run an execution to completion before returning. Used by the
    /// scheduler, which already runs each job on its own task.
    pub async fn execute(
        &self,
        strategy_id: Uuid,
        execution_type: ExecutionType,
    ) -> Result<Execution, EngineError> {
        let strategy = self
            .strategies
            .get(strategy_id)
            .await
            .ok_or(EngineError::StrategyNotFound(strategy_id))?;
        let _claim = self.claim(strategy_id)?;

        let execution = Execution::begin(strategy_id, &strategy.name, execution_type, self.clock.now());
        self.executions.save(execution.clone()).await;
        Ok(self.run(execution, &strategy).await)
    }

    async fn run(&self, mut execution: Execution, strategy: &Strategy) -> Execution {
        let actions = strategy.active_actions();
        if actions.is_empty() {
            return self
                .finalize_failed(execution, "strategy has no active actions".to_string())
                .await;
        }

        let rules = strategy.active_rules();
        let predicate = match compile(&rules) {
            Ok(predicate) => predicate,
            Err(e) => {
                return self
                    .finalize_failed(execution, format!("rule configuration error: {e}"))
                    .await;
            }
        };

        let cases = self.query.matching(&predicate).await;
        execution.total_records_evaluated = cases.len() as u64;
        execution.records_matched = cases.len() as u64;

        if cases.is_empty() {
            // Valid terminal outcome: nobody matched, nothing to do.
            return self.finalize(execution).await;
        }

        // Make the matched count visible while actions are still running.
        self.executions.save(execution.clone()).await;

        for case in &cases {
            for action in &actions {
                match self.dispatcher.apply(case, action).await {
                    Ok(()) => execution.successful_actions += 1,
                    Err(e) => {
                        execution.failed_actions += 1;
                        execution.log_failure(ActionFailure {
                            case_id: case.id,
                            case_number: case.case_number.clone(),
                            action_type: action.action_type,
                            error: e.to_string(),
                            at: self.clock.now(),
                        });
                    }
                }
            }
        }

        execution.total_cases_processed = cases.len() as u64;
        self.finalize(execution).await
    }

    /// Terminal write for the non-fatal path. The strategy's lifetime
    /// counters receive this run's deltas exactly once; a strategy that
    /// vanished mid-run turns the execution into a fatal failure instead.
    async fn finalize(&self, mut execution: Execution) -> Execution {
        let now = self.clock.now();
        execution.status = ExecutionStatus::Completed;
        execution.completed_at = Some(now);

        let recorded = self
            .strategies
            .record_run(
                execution.strategy_id,
                execution.successful_actions,
                execution.failed_actions,
                now,
            )
            .await;
        if recorded.is_err() {
            execution.status = ExecutionStatus::Failed;
            execution.error_message =
                Some("strategy was deleted while the execution was running".to_string());
        }

        self.executions.save(execution.clone()).await;
        info!(
            execution = %execution.id,
            strategy = %execution.strategy_name,
            status = ?execution.status,
            cases = execution.total_cases_processed,
            ok = execution.successful_actions,
            failed = execution.failed_actions,
            "execution finalized"
        );
        execution
    }

    /// Terminal write for configuration and fatal errors. No case was (or
    /// will be) touched beyond work already done; counters get a
    /// zero-or-partial delta and `last_run_at` is stamped.
    async fn finalize_failed(&self, mut execution: Execution, message: String) -> Execution {
        let now = self.clock.now();
        execution.status = ExecutionStatus::Failed;
        execution.error_message = Some(message);
        execution.completed_at = Some(now);

        // Best-effort: the strategy may itself be the thing that vanished.
        let _ = self
            .strategies
            .record_run(
                execution.strategy_id,
                execution.successful_actions,
                execution.failed_actions,
                now,
            )
            .await;

        self.executions.save(execution.clone()).await;
        warn!(
            execution = %execution.id,
            strategy = %execution.strategy_name,
            error = execution.error_message.as_deref().unwrap_or(""),
            "execution failed"
        );
        execution
    }
}
