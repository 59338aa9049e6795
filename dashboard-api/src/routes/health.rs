//! Health check endpoints

use axum::{extract::State, response::Json, routing::get, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

/// Which upstream providers are configured
#[derive(Debug, Serialize)]
struct Providers {
    defillama: bool,
    dune: bool,
    artemis: bool,
}

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    providers: Providers,
    /// "live" when the volume engine calls Artemis, "estimated" otherwise
    volume_engine: &'static str,
    cache_entries: usize,
    cache_ttl_secs: u64,
    timestamp: DateTime<Utc>,
}

/// Health check handler
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        providers: Providers {
            defillama: true,
            dune: state.analytics_service.has_client(),
            artemis: state.user_metrics_service.is_live(),
        },
        volume_engine: if state.volume_engine.is_live() {
            "live"
        } else {
            "estimated"
        },
        cache_entries: state.cache.len(),
        cache_ttl_secs: state.config.cache_ttl.as_secs(),
        timestamp: Utc::now(),
    })
}

/// Simple liveness check (always returns OK if server is running)
async fn liveness() -> &'static str {
    "OK"
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{get_json, get_raw};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health_reports_providers() {
        let (status, body) = get_json("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["providers"]["defillama"], true);
        assert_eq!(body["providers"]["dune"], false);
        assert_eq!(body["providers"]["artemis"], false);
        assert_eq!(body["volumeEngine"], "estimated");
        assert_eq!(body["cacheEntries"], 0);
        assert_eq!(body["cacheTtlSecs"], 300);
    }

    #[tokio::test]
    async fn test_liveness() {
        let (status, body) = get_raw("/api/health/live").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");
    }
}
