//! API route definitions

mod artemis;
mod bridges;
mod dune;
mod health;
mod stablecoins;
mod volume;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use dashboard_core::DashboardError;
use serde::Serialize;
use tracing::error;

use crate::AppState;

/// Largest look-back window accepted by the `days` query parameter
pub const MAX_DAYS: u32 = 365;

/// Create all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(volume::routes())
        .merge(stablecoins::routes())
        .merge(bridges::routes())
        .merge(dune::routes())
        .merge(artemis::routes())
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// 400 with a JSON error body
pub fn bad_request(message: impl Into<String>) -> Response {
    error_response(StatusCode::BAD_REQUEST, message)
}

/// Map an upstream failure to a response, logging it first
pub fn upstream_error(context: &str, e: DashboardError) -> Response {
    let status = match &e {
        DashboardError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        DashboardError::NotFound(_) | DashboardError::Api { status: 404, .. } => {
            StatusCode::NOT_FOUND
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error!("Failed to fetch {}: {}", context, e);
    error_response(status, format!("Failed to fetch {}", context))
}

/// JSON body on success, mapped error otherwise
pub fn json_or_error<T: Serialize>(context: &str, result: Result<T, DashboardError>) -> Response {
    match result {
        Ok(value) => Json(value).into_response(),
        Err(e) => upstream_error(context, e),
    }
}

/// Numeric identifier from a path segment
pub fn parse_id(raw: &str) -> Result<u64, Response> {
    raw.parse()
        .map_err(|_| bad_request(format!("Invalid id: {}", raw)))
}

/// Optional `days` parameter, defaulting when absent and capped at [`MAX_DAYS`]
pub fn parse_days(raw: Option<&str>, default: u32) -> Result<u32, Response> {
    match raw {
        None => Ok(default),
        Some(raw) => match raw.parse::<u32>() {
            Ok(0) | Err(_) => Err(bad_request("days must be a positive integer")),
            Ok(days) => Ok(days.min(MAX_DAYS)),
        },
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::AppConfig;
    use crate::{app, AppState};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    /// Router with no provider keys configured
    pub fn test_app() -> Router {
        app(AppState::new(&AppConfig::default()).unwrap())
    }

    pub async fn get_raw(uri: &str) -> (StatusCode, Vec<u8>) {
        get_raw_from(test_app(), uri).await
    }

    pub async fn get_raw_from(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    pub async fn get_json(uri: &str) -> (StatusCode, Value) {
        get_json_from(test_app(), uri).await
    }

    pub async fn get_json_from(app: Router, uri: &str) -> (StatusCode, Value) {
        let (status, body) = get_raw_from(app, uri).await;
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::get_raw;
    use super::*;

    #[test]
    fn test_upstream_error_status() {
        assert_eq!(
            upstream_error("bridges", DashboardError::timeout("bridges.llama.fi")).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            upstream_error("stablecoin 9999", DashboardError::api(404, "missing")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            upstream_error("stablecoins", DashboardError::parse("bad json")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_parse_days() {
        assert_eq!(parse_days(None, 30).unwrap(), 30);
        assert_eq!(parse_days(Some("7"), 30).unwrap(), 7);
        assert_eq!(parse_days(Some("10000"), 30).unwrap(), MAX_DAYS);
        assert!(parse_days(Some("0"), 30).is_err());
        assert!(parse_days(Some("-3"), 30).is_err());
        assert!(parse_days(Some("week"), 30).is_err());
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("1").unwrap(), 1);
        assert_eq!(parse_id("abc").unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let (status, _) = get_raw("/api/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
