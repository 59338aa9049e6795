//! On-chain analytics endpoints (Dune)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use dashboard_dune::analytics::DEFAULT_WHALE_MIN_AMOUNT;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::info;

use super::{bad_request, error_response, json_or_error, parse_days, parse_id};
use crate::AppState;

const DEFAULT_DAYS: u32 = 30;
const DEFAULT_WHALE_DAYS: u32 = 7;
const DEFAULT_HOLDER_LIMIT: usize = 100;

/// Query parameters shared by the analytics datasets
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuneQuery {
    /// Stablecoin symbol; every tracked stablecoin when absent
    pub stablecoin: Option<String>,
    pub days: Option<String>,
    /// Lower bound for whale transfers, in USD
    pub min_amount: Option<String>,
    /// Maximum number of top holders
    pub limit: Option<String>,
}

impl DuneQuery {
    fn stablecoin(&self) -> Option<&str> {
        self.stablecoin.as_deref().filter(|s| !s.is_empty())
    }

    fn days(&self, default: u32) -> Result<u32, Response> {
        parse_days(self.days.as_deref(), default)
    }

    fn min_amount(&self) -> Result<f64, Response> {
        match self.min_amount.as_deref() {
            None => Ok(DEFAULT_WHALE_MIN_AMOUNT),
            Some(raw) => match raw.parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
                _ => Err(bad_request("minAmount must be a non-negative number")),
            },
        }
    }

    fn limit(&self) -> Result<usize, Response> {
        match self.limit.as_deref() {
            None => Ok(DEFAULT_HOLDER_LIMIT),
            Some(raw) => match raw.parse::<usize>() {
                Ok(0) | Err(_) => Err(bad_request("limit must be a positive integer")),
                Ok(limit) => Ok(limit),
            },
        }
    }
}

/// Serve one analytics dataset by name
fn dataset(state: &AppState, endpoint: &str, query: &DuneQuery) -> Result<Response, Response> {
    let analytics = &state.analytics_service;

    let response = match endpoint {
        "mint-burn" => Json(analytics.mint_burn_events(query.stablecoin(), query.days(DEFAULT_DAYS)?))
            .into_response(),
        "whale-transfers" => Json(analytics.whale_transfers(
            query.min_amount()?,
            query.days(DEFAULT_WHALE_DAYS)?,
        ))
        .into_response(),
        "active-addresses" => Json(analytics.active_addresses(query.stablecoin(), query.days(DEFAULT_DAYS)?))
            .into_response(),
        "transfer-volume" => Json(analytics.transfer_volume(query.stablecoin(), query.days(DEFAULT_DAYS)?))
            .into_response(),
        "peg-stability" => Json(analytics.peg_stability(query.stablecoin(), query.days(DEFAULT_DAYS)?))
            .into_response(),
        "top-holders" => {
            let stablecoin = query
                .stablecoin()
                .ok_or_else(|| bad_request("stablecoin parameter required"))?;
            Json(analytics.top_holders(stablecoin, query.limit()?)).into_response()
        }
        "summary" => Json(analytics.summary()).into_response(),
        _ => return Err(error_response(StatusCode::NOT_FOUND, "Unknown endpoint")),
    };

    Ok(response)
}

async fn get_dataset(
    State(state): State<AppState>,
    Path(endpoint): Path<String>,
    Query(query): Query<DuneQuery>,
) -> Response {
    dataset(&state, &endpoint, &query).unwrap_or_else(|response| response)
}

/// Run a saved Dune query, passing query-string values as its parameters
async fn run_saved_query(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    if !state.analytics_service.has_client() {
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "DUNE_API_KEY not configured");
    }

    let params: Option<Value> = (!params.is_empty()).then(|| {
        Value::Object(
            params
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect::<Map<String, Value>>(),
        )
    });

    info!("Running saved Dune query {}", id);
    json_or_error(
        &format!("Dune query {}", id),
        state.analytics_service.run_saved_query(id, params.as_ref()).await,
    )
}

/// Create analytics routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dune/{endpoint}", get(get_dataset))
        .route("/dune/query/{id}", get(run_saved_query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::get_json;

    #[test]
    fn test_query_defaults() {
        let query = DuneQuery::default();
        assert_eq!(query.stablecoin(), None);
        assert_eq!(query.days(DEFAULT_WHALE_DAYS).unwrap(), 7);
        assert_eq!(query.min_amount().unwrap(), 1_000_000.0);
        assert_eq!(query.limit().unwrap(), 100);
    }

    #[test]
    fn test_query_rejects_bad_values() {
        let query = DuneQuery {
            min_amount: Some("-1".to_string()),
            limit: Some("0".to_string()),
            ..DuneQuery::default()
        };
        assert_eq!(query.min_amount().unwrap_err().status(), StatusCode::BAD_REQUEST);
        assert_eq!(query.limit().unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_mint_burn_filters_stablecoin() {
        let (status, body) = get_json("/api/dune/mint-burn?stablecoin=USDC&days=30").await;
        assert_eq!(status, StatusCode::OK);

        let events = body.as_array().unwrap();
        assert!(!events.is_empty());
        assert!(events.iter().all(|e| e["stablecoin"] == "USDC"));
    }

    #[tokio::test]
    async fn test_whale_transfers_respect_min_amount() {
        let (status, body) = get_json("/api/dune/whale-transfers?minAmount=5000000").await;
        assert_eq!(status, StatusCode::OK);

        let transfers = body.as_array().unwrap();
        assert_eq!(transfers.len(), 50);
        assert!(transfers
            .iter()
            .all(|t| t["amountUsd"].as_f64().unwrap() >= 5_000_000.0));
    }

    #[tokio::test]
    async fn test_top_holders_requires_stablecoin() {
        let (status, body) = get_json("/api/dune/top-holders").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "stablecoin parameter required");

        let (status, body) = get_json("/api/dune/top-holders?stablecoin=USDT&limit=5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_summary() {
        let (status, body) = get_json("/api/dune/summary").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["totalDailyVolume"].as_f64().unwrap() > 0.0);
        assert_eq!(body["largeTransfers24h"], 50);
    }

    #[tokio::test]
    async fn test_unknown_dataset_is_404() {
        let (status, body) = get_json("/api/dune/unicorns").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Unknown endpoint");
    }

    #[tokio::test]
    async fn test_saved_query_without_key_is_503() {
        let (status, body) = get_json("/api/dune/query/3500000?chain=ethereum").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "DUNE_API_KEY not configured");
    }
}
