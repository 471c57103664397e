//! Landing-page engagement handlers.
//!
//! Endpoints:
//! - POST /engagement/feedback   - Store a feedback form submission
//! - POST /engagement/analytics  - Record an analytics event
//!
//! Storage is best-effort: a failed write is logged and the client still
//! gets an acknowledgement.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use shurahub_core::repository::engagement::EngagementRepository;
use shurahub_types::engagement::{AnalyticsEvent, Feedback};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub email: Option<String>,
    pub message: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsEventRequest {
    pub event_name: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// POST /engagement/feedback
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(body): Json<FeedbackRequest>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let feedback = Feedback::new(body.email, &body.message, body.category, body.user_id)
        .map_err(AppError::Validation)?;

    if let Err(e) = state.engagement.save_feedback(&feedback).await {
        tracing::warn!(error = %e, "failed to save feedback, skipping");
    }

    Ok(ApiResponse::success(
        serde_json::json!({ "status": "received" }),
        Uuid::new_v4().to_string(),
        start.elapsed().as_millis() as u64,
    ))
}

/// POST /engagement/analytics
pub async fn capture_analytics(
    State(state): State<AppState>,
    Json(body): Json<AnalyticsEventRequest>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let event = AnalyticsEvent::new(&body.event_name, body.metadata, body.user_id)
        .map_err(AppError::Validation)?;

    if let Err(e) = state.engagement.record_event(&event).await {
        tracing::warn!(event = %event.event_name, error = %e, "failed to record analytics event, skipping");
    }

    Ok(ApiResponse::success(
        serde_json::json!({ "status": "ok" }),
        Uuid::new_v4().to_string(),
        start.elapsed().as_millis() as u64,
    ))
}
