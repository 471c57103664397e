//! Debate history and rating handlers.
//!
//! Endpoints:
//! - GET  /api/debates              - List logged debates, newest first
//! - GET  /api/debates/{id}         - Get one debate
//! - POST /api/debates/{id}/rating  - Rate the opener or the final verdict

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use shurahub_core::repository::debate::DebateRepository;
use shurahub_types::debate::{DebateRecord, Rater};
use shurahub_types::error::RepositoryError;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

const MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct DebateListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Restrict to one user or visitor id.
    #[serde(default)]
    pub user_id: Option<String>,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub rater: Rater,
    pub rating: i64,
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// GET /api/debates
pub async fn list_debates(
    State(state): State<AppState>,
    Query(query): Query<DebateListQuery>,
) -> Result<ApiResponse<Vec<DebateRecord>>, AppError> {
    let start = Instant::now();
    if !(1..=MAX_LIMIT).contains(&query.limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    let debates = state
        .debates
        .list_debates(query.user_id.as_deref(), query.limit)
        .await?;

    Ok(ApiResponse::success(
        debates,
        Uuid::new_v4().to_string(),
        elapsed_ms(start),
    ))
}

/// GET /api/debates/{id}
pub async fn get_debate(
    State(state): State<AppState>,
    Path(debate_id): Path<String>,
) -> Result<ApiResponse<DebateRecord>, AppError> {
    let start = Instant::now();
    let debate = state
        .debates
        .get_debate(&debate_id)
        .await?
        .ok_or(RepositoryError::NotFound)?;

    Ok(ApiResponse::success(
        debate,
        Uuid::new_v4().to_string(),
        elapsed_ms(start),
    ))
}

/// POST /api/debates/{id}/rating
pub async fn rate_debate(
    State(state): State<AppState>,
    Path(debate_id): Path<String>,
    Json(body): Json<RatingRequest>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    state
        .debates
        .update_rating(&debate_id, body.rater, body.rating)
        .await?;

    tracing::info!(%debate_id, rater = body.rater.column(), rating = body.rating, "debate rated");
    Ok(ApiResponse::success(
        serde_json::json!({
            "debate_id": debate_id,
            "rater": body.rater,
            "rating": body.rating,
        }),
        Uuid::new_v4().to_string(),
        elapsed_ms(start),
    ))
}
