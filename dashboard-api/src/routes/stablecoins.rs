//! Stablecoin, chain and chart endpoints (DefiLlama)

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;

use super::{json_or_error, parse_id};
use crate::AppState;

/// Query parameters for historical charts
#[derive(Debug, Deserialize)]
pub struct ChartsQuery {
    /// Restrict to one chain; all chains when absent
    pub chain: Option<String>,
}

async fn list_stablecoins(State(state): State<AppState>) -> Response {
    json_or_error("stablecoins", state.stablecoin_service.all_stablecoins().await)
}

async fn total_metrics(State(state): State<AppState>) -> Response {
    json_or_error("stablecoin metrics", state.stablecoin_service.total_metrics().await)
}

async fn stablecoin_chains(State(state): State<AppState>) -> Response {
    json_or_error("stablecoin chains", state.stablecoin_service.stablecoin_chains().await)
}

async fn stablecoin_prices(State(state): State<AppState>) -> Response {
    json_or_error("stablecoin prices", state.stablecoin_service.stablecoin_prices().await)
}

async fn get_stablecoin(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    json_or_error(
        &format!("stablecoin {}", id),
        state.stablecoin_service.stablecoin_detail(id).await,
    )
}

async fn get_stablecoin_history(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    json_or_error(
        &format!("stablecoin {} history", id),
        state.stablecoin_service.stablecoin_history(id).await,
    )
}

async fn list_chains(State(state): State<AppState>) -> Response {
    json_or_error("chain data", state.stablecoin_service.chain_data().await)
}

async fn historical_charts(State(state): State<AppState>, Query(query): Query<ChartsQuery>) -> Response {
    let chain = query.chain.as_deref().filter(|c| !c.is_empty());
    json_or_error(
        "historical charts",
        state.stablecoin_service.historical_charts(chain).await,
    )
}

/// Create stablecoin routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stablecoins", get(list_stablecoins))
        .route("/stablecoins/metrics", get(total_metrics))
        .route("/stablecoins/chains", get(stablecoin_chains))
        .route("/stablecoins/prices", get(stablecoin_prices))
        .route("/stablecoins/{id}", get(get_stablecoin))
        .route("/stablecoins/{id}/history", get(get_stablecoin_history))
        .route("/chains", get(list_chains))
        .route("/charts", get(historical_charts))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::get_json;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_non_numeric_id_is_400() {
        let (status, body) = get_json("/api/stablecoins/tether").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid id: tether");

        let (status, _) = get_json("/api/stablecoins/tether/history").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
