//! Core types for the Stablecoin Dashboard
//!
//! This crate defines the shared data structures used across the dashboard,
//! including stablecoin and bridge views, on-chain analytics rows, and the
//! adjusted-volume record produced by the Artemis integration.

pub mod analytics;
pub mod bridge;
pub mod cache;
pub mod colors;
pub mod error;
pub mod stablecoin;
pub mod volume;

pub use analytics::{
    ActiveAddressMetrics, AnalyticsSummary, DatedValue, MintBurnEvent, MintBurnKind,
    PegStabilityMetrics, TopHolder, TransferVolumeMetrics, UserMetrics, WhaleTransfer,
};
pub use bridge::{
    BridgeMetrics, BridgeWithMetrics, FlowData, FlowLink, FlowNode, NetworkData, NetworkLink,
    NetworkNode,
};
pub use cache::TtlCache;
pub use colors::chain_color;
pub use error::{DashboardError, DashboardResult};
pub use stablecoin::{
    ChainCirculation, ChainWithMetrics, ChartPoint, StablecoinWithMetrics, TopStablecoin,
    TotalMetrics,
};
pub use volume::{AdjustedVolumeMetrics, BreakdownEntry, VolumeSource};
