use thiserror::Error;
use uuid::Uuid;

use dunner_rules::RuleError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("strategy {0} not found")]
    StrategyNotFound(Uuid),

    #[error("strategy {0} already has a run in flight")]
    AlreadyRunning(Uuid),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error("invalid schedule: {0}")]
    Schedule(String),
}
