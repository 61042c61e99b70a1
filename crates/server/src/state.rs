use std::sync::Arc;

use dunner_channels::ActionDispatcher;
use dunner_core::Config;
use dunner_engine::{
    CaseQuery, CaseStore, Clock, ExecutionStore, Orchestrator, ScheduleStore, StrategyStore,
};

pub struct AppState {
    pub config: Config,
    pub strategies: Arc<dyn StrategyStore>,
    pub executions: Arc<dyn ExecutionStore>,
    pub schedules: Arc<dyn ScheduleStore>,
    pub cases: Arc<dyn CaseStore>,
    pub query: CaseQuery,
    pub orchestrator: Arc<Orchestrator>,
    pub dispatcher: Arc<ActionDispatcher>,
    pub clock: Arc<dyn Clock>,
}
