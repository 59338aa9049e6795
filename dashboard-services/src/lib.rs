//! Business logic services for the Stablecoin Dashboard
//!
//! This crate reshapes upstream payloads from DefiLlama, Dune and Artemis
//! into the views the dashboard renders, caching upstream results briefly.

pub mod analytics_service;
pub mod bridge_service;
pub mod response_cache;
pub mod stablecoin_service;
pub mod user_metrics_service;

pub use analytics_service::AnalyticsService;
pub use bridge_service::BridgeService;
pub use response_cache::ResponseCache;
pub use stablecoin_service::StablecoinService;
pub use user_metrics_service::UserMetricsService;
