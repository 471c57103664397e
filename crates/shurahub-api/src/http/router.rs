//! Axum router configuration with middleware.
//!
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/debates", get(handlers::debates::list_debates))
        .route("/debates/{id}", get(handlers::debates::get_debate))
        .route("/debates/{id}/rating", post(handlers::debates::rate_debate));

    let engagement_routes = Router::new()
        .route("/feedback", post(handlers::engagement::submit_feedback))
        .route("/analytics", post(handlers::engagement::capture_analytics));

    Router::new()
        .nest("/api", api_routes)
        .nest("/engagement", engagement_routes)
        .route("/ws", get(handlers::ws::ws_handler))
        .route("/health", get(handlers::health::health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use serde_json::Value;
    use tower::ServiceExt;

    use shurahub_core::repository::debate::DebateRepository;
    use shurahub_infra::sqlite::debate::SqliteDebateRepository;
    use shurahub_infra::sqlite::engagement::SqliteEngagementRepository;
    use shurahub_infra::sqlite::pool::DatabasePool;
    use shurahub_types::config::ShurahubConfig;
    use shurahub_types::debate::{DebateRecord, StageEntry};

    use crate::testing::echo_orchestrator;

    async fn test_state() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let pool = DatabasePool::new(&url).await.unwrap();
        let debates = Arc::new(SqliteDebateRepository::new(pool.clone()));
        let state = AppState {
            orchestrator: Arc::new(echo_orchestrator(debates.clone())),
            debates,
            engagement: Arc::new(SqliteEngagementRepository::new(pool)),
            resolver: None,
            config: Arc::new(ShurahubConfig::default()),
            data_dir: dir.path().to_path_buf(),
        };
        (dir, state)
    }

    fn record(id: &str, user: &str) -> DebateRecord {
        let entry = |model: &str| StageEntry {
            model: model.to_string(),
            response: format!("{model} says hi"),
        };
        DebateRecord {
            debate_id: id.to_string(),
            user_id: Some(user.to_string()),
            timestamp: Utc::now(),
            user_prompt: "Is a 4-day work week good?".to_string(),
            opener: entry("m1"),
            critiquer: entry("m2"),
            synthesizer: entry("m3"),
            opener_rating: None,
            final_rating: None,
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, state) = test_state().await;
        let response = build_router(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["models"], 3);
    }

    #[tokio::test]
    async fn test_list_debates_envelope() {
        let (_dir, state) = test_state().await;
        state.debates.save_debate(&record("d-1", "visitor-1")).await.unwrap();

        let response = build_router(state)
            .oneshot(Request::get("/api/debates?limit=10").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"][0]["debate_id"], "d-1");
        assert_eq!(body["data"][0]["opener"]["model"], "m1");
        assert!(body["errors"].as_array().unwrap().is_empty());
        assert!(body["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_list_debates_rejects_bad_limit() {
        let (_dir, state) = test_state().await;
        let response = build_router(state)
            .oneshot(Request::get("/api/debates?limit=0").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_rate_debate() {
        let (_dir, state) = test_state().await;
        state.debates.save_debate(&record("d-2", "visitor-1")).await.unwrap();
        let debates = state.debates.clone();

        let response = build_router(state)
            .oneshot(
                Request::post("/api/debates/d-2/rating")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"rater":"opener","rating":4}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let stored = debates.get_debate("d-2").await.unwrap().unwrap();
        assert_eq!(stored.opener_rating, Some(4));
        assert!(stored.final_rating.is_none());
    }

    #[tokio::test]
    async fn test_rate_missing_debate_is_404() {
        let (_dir, state) = test_state().await;
        let response = build_router(state)
            .oneshot(
                Request::post("/api/debates/nope/rating")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"rater":"final","rating":2}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_submit_feedback() {
        let (_dir, state) = test_state().await;
        let response = build_router(state)
            .oneshot(post_json(
                "/engagement/feedback",
                r#"{"email":"ana@example.com","message":"More models please","category":"landing"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["status"], "received");
    }

    #[tokio::test]
    async fn test_feedback_too_short_is_400() {
        let (_dir, state) = test_state().await;
        let response = build_router(state)
            .oneshot(post_json("/engagement/feedback", r#"{"message":"ok"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_capture_analytics() {
        let (_dir, state) = test_state().await;
        let response = build_router(state)
            .oneshot(post_json(
                "/engagement/analytics",
                r#"{"event_name":"cta_click","metadata":{"button":"hero"}}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["status"], "ok");
    }
}
