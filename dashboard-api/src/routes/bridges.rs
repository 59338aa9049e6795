//! Bridge endpoints (DefiLlama bridges API)

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;

use super::{bad_request, json_or_error, parse_id};
use crate::AppState;

/// Query parameters for a bridge's transactions
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsQuery {
    /// Unix seconds
    pub start_timestamp: Option<String>,
    /// Unix seconds
    pub end_timestamp: Option<String>,
}

fn parse_timestamp(name: &str, raw: Option<&str>) -> Result<Option<i64>, Response> {
    raw.filter(|r| !r.is_empty())
        .map(|r| {
            r.parse::<i64>()
                .map_err(|_| bad_request(format!("{} must be a unix timestamp", name)))
        })
        .transpose()
}

async fn list_bridges(State(state): State<AppState>) -> Response {
    json_or_error("bridges", state.bridge_service.all_bridges().await)
}

async fn bridge_metrics(State(state): State<AppState>) -> Response {
    json_or_error("bridge metrics", state.bridge_service.bridge_metrics().await)
}

async fn flow_data(State(state): State<AppState>) -> Response {
    json_or_error("bridge flows", state.bridge_service.flow_data().await)
}

async fn network_graph(State(state): State<AppState>) -> Response {
    json_or_error("bridge network", state.bridge_service.network_graph().await)
}

async fn get_bridge(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    json_or_error(
        &format!("bridge {}", id),
        state.bridge_service.bridge_details(id).await,
    )
}

async fn bridge_transactions(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<TransactionsQuery>,
) -> Response {
    let parsed = parse_id(&id).and_then(|id| {
        let start = parse_timestamp("startTimestamp", query.start_timestamp.as_deref())?;
        let end = parse_timestamp("endTimestamp", query.end_timestamp.as_deref())?;
        Ok((id, start, end))
    });
    let (id, start, end) = match parsed {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };

    json_or_error(
        &format!("bridge {} transactions", id),
        state.bridge_service.bridge_transactions(id, start, end).await,
    )
}

async fn volume_history(State(state): State<AppState>, Path(chain): Path<String>) -> Response {
    json_or_error(
        &format!("bridge volume for {}", chain),
        state.bridge_service.volume_history(&chain).await,
    )
}

async fn large_transactions(State(state): State<AppState>, Path(chain): Path<String>) -> Response {
    json_or_error(
        &format!("large transactions for {}", chain),
        state.bridge_service.large_transactions(&chain).await,
    )
}

async fn day_stats(
    State(state): State<AppState>,
    Path((timestamp, chain)): Path<(String, String)>,
) -> Response {
    let timestamp = match parse_timestamp("timestamp", Some(&timestamp)) {
        Ok(Some(ts)) => ts,
        Ok(None) => return bad_request("timestamp must be a unix timestamp"),
        Err(response) => return response,
    };
    json_or_error(
        &format!("bridge day stats for {}", chain),
        state.bridge_service.day_stats(timestamp, &chain).await,
    )
}

/// Create bridge routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bridges", get(list_bridges))
        .route("/bridges/metrics", get(bridge_metrics))
        .route("/bridges/flows", get(flow_data))
        .route("/bridges/network", get(network_graph))
        .route("/bridges/{id}", get(get_bridge))
        .route("/bridges/{id}/transactions", get(bridge_transactions))
        .route("/bridges/volume/{chain}", get(volume_history))
        .route("/bridges/large-transactions/{chain}", get(large_transactions))
        .route("/bridges/day-stats/{timestamp}/{chain}", get(day_stats))
}
