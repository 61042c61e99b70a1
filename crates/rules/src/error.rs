//! Rule configuration errors.
//!
//! Every variant rejects the strategy at save time, or aborts an
//! execution before any case is touched. Rules never fail silently into
//! a false match.

use dunner_core::{FieldType, Operator};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("unknown field path '{0}'")]
    UnknownField(String),

    #[error("cannot coerce '{value}' to {expected:?} for field '{field}'")]
    Coercion {
        field: String,
        value: String,
        expected: FieldType,
    },

    #[error("operator {operator:?} is not applicable to {field_type:?} field '{field}'")]
    OperatorType {
        field: String,
        operator: Operator,
        field_type: FieldType,
    },

    #[error("BETWEEN on '{field}' requires exactly 2 values, got {got}")]
    BetweenArity { field: String, got: usize },

    #[error("{operator:?} on '{field}' requires at least one value")]
    EmptyValueList { field: String, operator: Operator },
}
