//! Adjusted transfer volume endpoint

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use super::bad_request;
use crate::AppState;

/// Query parameters for the adjusted-volume breakdown
#[derive(Debug, Deserialize)]
pub struct AdjustedVolumeQuery {
    /// Raw transfer volume in USD
    #[serde(rename = "rawVolume")]
    pub raw_volume: Option<String>,
}

/// Positive, finite raw volume from the query string
fn parse_raw_volume(raw: Option<&str>) -> Result<f64, Response> {
    let raw = raw.ok_or_else(|| bad_request("rawVolume query parameter is required"))?;
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(bad_request(format!(
            "rawVolume must be a positive number, got {:?}",
            raw
        ))),
    }
}

/// Adjusted-volume breakdown for a raw transfer volume
async fn adjusted_volume(
    State(state): State<AppState>,
    Query(query): Query<AdjustedVolumeQuery>,
) -> Response {
    let raw_volume = match parse_raw_volume(query.raw_volume.as_deref()) {
        Ok(v) => v,
        Err(response) => return response,
    };

    let metrics = state.volume_engine.calculate_adjusted_volume(raw_volume).await;
    info!(
        "Adjusted volume for {}: {} ({})",
        raw_volume, metrics.adjusted_volume, metrics.source
    );
    Json(metrics).into_response()
}

/// Create adjusted-volume routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/adjusted-volume", get(adjusted_volume))
}
