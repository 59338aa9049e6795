//! Errors from the Artemis integration
//!
//! None of these reach an HTTP caller through the volume engine: every
//! variant selects the estimated breakdown instead.

use dashboard_core::DashboardError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArtemisError {
    #[error("ARTEMIS_API_KEY not configured")]
    MissingApiKey,

    #[error("Artemis request failed: {0}")]
    Upstream(#[from] DashboardError),

    #[error("Artemis did not answer within {0:?}")]
    Timeout(Duration),

    /// The provider reported a raw volume that cannot be scaled against
    #[error("Degenerate Artemis breakdown: raw volume {0}")]
    DegenerateBreakdown(f64),

    #[error("Invalid Artemis URL: {0}")]
    InvalidUrl(String),
}

pub type ArtemisResult<T> = Result<T, ArtemisError>;
