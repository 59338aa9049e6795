//! User activity endpoints (Artemis)

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use super::{bad_request, parse_days};
use crate::AppState;

const DEFAULT_DAYS: u32 = 30;

/// Query parameters for the daily series endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesQuery {
    pub symbol: Option<String>,
    /// `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`
    pub end_date: Option<String>,
}

/// Query parameters for the user metrics summary
#[derive(Debug, Deserialize)]
pub struct UserMetricsQuery {
    pub symbol: Option<String>,
    pub days: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(name: &str, raw: &str) -> Result<NaiveDate, Response> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| bad_request(format!("{} must be a YYYY-MM-DD date", name)))
}

impl SeriesQuery {
    /// Symbol and inclusive date range, all required
    fn parse(&self) -> Result<(&str, NaiveDate, NaiveDate), Response> {
        match (
            non_empty(&self.symbol),
            non_empty(&self.start_date),
            non_empty(&self.end_date),
        ) {
            (Some(symbol), Some(start), Some(end)) => Ok((
                symbol,
                parse_date("startDate", start)?,
                parse_date("endDate", end)?,
            )),
            _ => Err(bad_request(
                "symbol, startDate, and endDate parameters are required",
            )),
        }
    }
}

async fn dau(State(state): State<AppState>, Query(query): Query<SeriesQuery>) -> Response {
    let (symbol, start, end) = match query.parse() {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };
    Json(state.user_metrics_service.dau(symbol, start, end).await).into_response()
}

async fn daily_txns(State(state): State<AppState>, Query(query): Query<SeriesQuery>) -> Response {
    let (symbol, start, end) = match query.parse() {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };
    Json(state.user_metrics_service.daily_txns(symbol, start, end).await).into_response()
}

async fn user_metrics(State(state): State<AppState>, Query(query): Query<UserMetricsQuery>) -> Response {
    let Some(symbol) = non_empty(&query.symbol) else {
        return bad_request("symbol parameter is required");
    };
    let days = match parse_days(query.days.as_deref(), DEFAULT_DAYS) {
        Ok(days) => days,
        Err(response) => return response,
    };
    Json(state.user_metrics_service.user_metrics(symbol, days).await).into_response()
}

/// Create user activity routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/artemis/dau", get(dau))
        .route("/artemis/daily-txns", get(daily_txns))
        .route("/artemis/user-metrics", get(user_metrics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::get_json;
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};

    #[test]
    fn test_series_query_parse() {
        let query = SeriesQuery {
            symbol: Some("USDC".to_string()),
            start_date: Some("2026-03-01".to_string()),
            end_date: Some("2026-03-07".to_string()),
        };
        let (symbol, start, end) = query.parse().unwrap();
        assert_eq!(symbol, "USDC");
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 3, 7).unwrap());

        let missing = SeriesQuery {
            symbol: Some("USDC".to_string()),
            ..SeriesQuery::default()
        };
        assert_eq!(missing.parse().unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_dau_requires_all_params() {
        let (status, body) = get_json("/api/artemis/dau?symbol=USDC&startDate=2026-03-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "symbol, startDate, and endDate parameters are required");
    }

    #[tokio::test]
    async fn test_daily_txns_rejects_bad_date() {
        let (status, body) =
            get_json("/api/artemis/daily-txns?symbol=USDC&startDate=03/01/2026&endDate=2026-03-07").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "startDate must be a YYYY-MM-DD date");
    }

    #[tokio::test]
    async fn test_dau_mock_series() {
        let end = Utc::now().date_naive();
        let start = end - Duration::days(4);
        let uri = format!(
            "/api/artemis/dau?symbol=USDT&startDate={}&endDate={}",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        );

        let (status, body) = get_json(&uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_series_window_is_bounded() {
        let end = Utc::now().date_naive().format("%Y-%m-%d");
        let (status, body) =
            get_json(&format!("/api/artemis/dau?symbol=USDT&startDate=0100-01-01&endDate={}", end)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 365);

        let (status, body) =
            get_json("/api/artemis/dau?symbol=USDT&startDate=0100-01-01&endDate=0100-01-02").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_series_before_common_era() {
        let (status, body) =
            get_json("/api/artemis/daily-txns?symbol=USDT&startDate=-0001-12-30&endDate=-0001-12-31").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_metrics() {
        let (status, _) = get_json("/api/artemis/user-metrics").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = get_json("/api/artemis/user-metrics?symbol=usdc&days=7").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["symbol"], "USDC");
        assert_eq!(body["days"], 7);
        assert_eq!(body["dau"].as_array().unwrap().len(), 7);
    }
}
