//! Error types for the dashboard

use thiserror::Error;

/// Dashboard-wide error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DashboardError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        DashboardError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn network(msg: impl Into<String>) -> Self {
        DashboardError::Network(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        DashboardError::Timeout(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        DashboardError::Auth(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        DashboardError::Parse(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        DashboardError::NotFound(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        DashboardError::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        DashboardError::Internal(msg.into())
    }

    /// Whether this error came from the upstream call exceeding its deadline
    pub fn is_timeout(&self) -> bool {
        matches!(self, DashboardError::Timeout(_))
    }
}

/// Result type alias for dashboard operations
pub type DashboardResult<T> = Result<T, DashboardError>;
