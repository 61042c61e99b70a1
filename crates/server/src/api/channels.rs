//! Channel connectivity test endpoint.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::state::AppState;

use super::{bad_request, ApiError};

#[derive(Debug, Deserialize)]
pub struct ChannelTestRequest {
    /// Delivery target: a mobile number, email address, notice kind, or
    /// call queue, depending on the channel.
    pub target: String,
}

/// Send a synthetic message through one configured gateway.
pub async fn channel_test(
    State(state): State<Arc<AppState>>,
    Path(channel): Path<String>,
    Json(req): Json<ChannelTestRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .dispatcher
        .test_channel(&channel, &req.target)
        .await
        .map_err(|e| bad_request(e.to_string()))?;
    Ok(Json(serde_json::json!({
        "status": "sent",
        "channel": channel,
    })))
}
