//! HTTP route handlers for logbook generation API.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::{get, post},
    Router,
};

use crate::error::{AppError, Result};
use crate::AppState;

use super::models::{GenerateLogbookRequest, LogbookResponse};
use super::service::{generate_logbook, sha256_hex};

/// Create the logbook router with all endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/generate_logbook", post(generate))
        .route("/generate_logbook/", post(generate))
}

/// Health check for the logbook engine.
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "logbook-generator",
        "version": env!("CARGO_PKG_VERSION"),
        "rules": &*state.rules,
    }))
}

/// Generate a multi-day logbook for one trip.
async fn generate(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GenerateLogbookRequest>, JsonRejection>,
) -> Result<Json<LogbookResponse>> {
    let Json(request) = payload.map_err(|e| AppError::MalformedRequest(e.body_text()))?;

    // Serialize request for input hash
    let input_json = serde_json::to_string(&request).unwrap_or_default();
    let input_hash = sha256_hex(&input_json);

    if let Some(cached) = state.cache.get_logbook(&input_hash).await {
        tracing::debug!("Serving cached logbook {}", input_hash);
        return Ok(Json(LogbookResponse::clone(&cached)));
    }

    let response = Arc::new(generate_logbook(&request, &state.rules, input_hash)?);
    state.cache.insert_logbook(Arc::clone(&response)).await;
    Ok(Json(LogbookResponse::clone(&response)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::AppCache;
    use crate::logbook::HosRules;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState {
            cache: AppCache::new(100, Duration::from_secs(60)),
            rules: Arc::new(HosRules::default()),
        }
    }

    fn app(state: AppState) -> Router {
        Router::new().nest("/api/logs", router()).with_state(state)
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_generate_logbook() {
        let (status, body) = post_json(
            app(test_state()),
            "/api/logs/generate_logbook/",
            r#"{"current_cycle_hour": 10, "total_driving_time": 700,
                "pickup_time": 60, "total_distance_miles": 700,
                "start_date": "2025-03-01"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let logbooks = body["logbooks"].as_array().unwrap();
        assert_eq!(logbooks.len(), 2);
        assert_eq!(logbooks[0]["date"], "2025-03-01");
        assert_eq!(logbooks[0]["segments"][0]["status"], "off_duty");
        assert_eq!(logbooks[0]["segments"][1]["label"], "Pre-trip/TIV");
        assert_eq!(logbooks[1]["segments"][0]["status"], "sleeper_berth");
        assert_eq!(body["summary"]["days"], 2);
        assert!(body["input_hash"].as_str().unwrap().starts_with("sha256:"));
    }

    #[tokio::test]
    async fn test_repeat_request_served_from_cache() {
        let state = test_state();
        let body = r#"{"total_driving_time": 300, "pickup_time": 30, "total_distance_miles": 250}"#;

        let (_, first) = post_json(app(state.clone()), "/api/logs/generate_logbook", body).await;
        let (_, second) = post_json(app(state.clone()), "/api/logs/generate_logbook", body).await;

        assert_eq!(first, second);
        let stats = state.cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_non_positive_values_rejected() {
        let (status, body) = post_json(
            app(test_state()),
            "/api/logs/generate_logbook",
            r#"{"total_driving_time": 0, "pickup_time": 30, "total_distance_miles": 250}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid input values."));
        assert_eq!(body["logbooks"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_zero_pickup_time_rejected() {
        let (status, body) = post_json(
            app(test_state()),
            "/api/logs/generate_logbook",
            r#"{"total_driving_time": 300, "pickup_time": 0, "total_distance_miles": 250}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid input values."));
        assert_eq!(body["logbooks"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_exhausted_cycle_rejected() {
        let (status, body) = post_json(
            app(test_state()),
            "/api/logs/generate_logbook",
            r#"{"current_cycle_hour": 69, "total_driving_time": 300,
                "pickup_time": 30, "total_distance_miles": 250}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("You do not have enough cycle hours"));
    }

    #[tokio::test]
    async fn test_malformed_body_rejected() {
        let (status, body) = post_json(
            app(test_state()),
            "/api/logs/generate_logbook",
            r#"{"total_driving_time": "a while", "pickup_time": 30}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid input format. Expected numeric values.");
    }

    #[tokio::test]
    async fn test_health_reports_rules() {
        let response = app(test_state())
            .oneshot(Request::builder().uri("/api/logs/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["rules"]["refuel_miles"], 1000.0);
    }
}
