//! HOS Logbook - Rust/Axum service
//!
//! Generates multi-day hours-of-service logbooks for the trip planner.
//! Django keeps trip entry and the frontend; this service owns the duty-cycle
//! simulation.

use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cache;
mod config;
mod error;
pub mod logbook;

use cache::AppCache;
use config::Config;
use logbook::HosRules;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub cache: AppCache,
    pub rules: Arc<HosRules>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hos_logbook=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        refuel_miles = config.rules.refuel_miles,
        cycle_limit_hours = config.rules.cycle_limit_hours,
        "Loaded configuration"
    );

    let state = AppState {
        cache: AppCache::new(config.cache_capacity, config.cache_ttl),
        rules: Arc::new(config.rules),
    };

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}

/// Build the router with all routes and middleware.
fn app(state: AppState) -> Router {
    Router::new()
        // Health check and cache stats
        .route("/health", get(health_check))
        .route("/health/cache", get(cache_stats))
        // Logbook API (called by the trip planner)
        .nest("/api/logs", logbook::router())
        // State and middleware
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "hos-logbook",
        "cache": state.cache.stats(),
    }))
}

/// Cache statistics endpoint
async fn cache_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.cache.stats())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{Request, StatusCode}};
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_app() -> Router {
        app(AppState {
            cache: AppCache::new(10, Duration::from_secs(60)),
            rules: Arc::new(HosRules::default()),
        })
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["cache"]["entries"], 0);
    }

    #[tokio::test]
    async fn test_logbook_routes_mounted() {
        let response = test_app()
            .oneshot(Request::builder().uri("/api/logs/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
