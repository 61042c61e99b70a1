//! Domain-focused API endpoint modules.
//!
//! Each sub-module owns a single responsibility area. Shared error
//! helpers live here in mod.rs.

mod channels;
mod dashboard;
mod executions;
mod health;
mod scheduler;
mod strategies;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use dunner_engine::EngineError;

// ── Shared types ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub(crate) fn bad_request(message: impl Into<String>) -> ApiError {
    error(StatusCode::UNPROCESSABLE_ENTITY, message)
}

pub(crate) fn not_found(message: impl Into<String>) -> ApiError {
    error(StatusCode::NOT_FOUND, message)
}

/// Map engine errors onto HTTP statuses.
pub(crate) fn engine_error(e: EngineError) -> ApiError {
    match &e {
        EngineError::StrategyNotFound(_) => error(StatusCode::NOT_FOUND, e.to_string()),
        EngineError::AlreadyRunning(_) => error(StatusCode::CONFLICT, e.to_string()),
        EngineError::Rule(_) | EngineError::Schedule(_) => {
            error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
    }
}

// ── Re-exports ───────────────────────────────────────────────────
// Preserves flat `api::foo` import paths used by main.rs route registration.

pub use channels::channel_test;
pub use dashboard::dashboard;
pub use executions::{executions_get, executions_list, strategy_execute, strategy_simulate};
pub use health::health;
pub use scheduler::{scheduler_configure, scheduler_get};
pub use strategies::{
    strategies_create, strategies_delete, strategies_get, strategies_list, strategies_set_status,
    strategies_update,
};
