//! Predicate compiler for strategy filter rules.
//!
//! This crate provides:
//! - Pure text→typed-value coercion per the field registry's declared types
//! - A closed [`Operator`](dunner_core::Operator) evaluation with one arm
//!   per variant
//! - Compilation of a strategy's rule set into a single composite
//!   predicate, combined with the rule set's shared AND/OR operator
//! - Save-time validation: configuration errors surface when a strategy is
//!   written, never as a silent false-match at query time

pub mod coerce;
pub mod error;
pub mod predicate;

pub use error::RuleError;
pub use predicate::{compile, validate_rules, CompiledPredicate};
