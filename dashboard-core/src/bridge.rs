//! Cross-chain bridge views

use serde::{Deserialize, Serialize};

/// A bridge with normalized volumes and derived changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeWithMetrics {
    pub id: u64,
    pub name: String,
    pub display_name: String,
    pub icon: Option<String>,
    pub volume_prev_day: f64,
    pub volume_prev2_day: f64,
    pub last_hourly_volume: f64,
    pub current_day_volume: f64,
    pub last_daily_volume: f64,
    pub day_before_last_volume: f64,
    pub weekly_volume: f64,
    pub monthly_volume: f64,
    pub chains: Vec<String>,
    pub destination_chain: Option<String>,
    /// Last day vs. the day before, in percent
    pub change_24h: f64,
    /// Last day annualized to a week vs. the trailing week, in percent
    pub change_7d: f64,
}

/// Headline bridge numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeMetrics {
    pub total_daily_volume: f64,
    pub total_weekly_volume: f64,
    pub total_monthly_volume: f64,
    pub change_24h: f64,
    pub bridge_count: usize,
    pub active_chains: usize,
}

/// Sankey node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// Sankey link between two node ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowLink {
    pub source: String,
    pub target: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Directional L1 -> L2 flow diagram
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowData {
    pub nodes: Vec<FlowNode>,
    pub links: Vec<FlowLink>,
}

/// Network graph node (one per chain)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub id: String,
    pub name: String,
    pub value: f64,
    pub color: String,
}

/// Undirected link between two chains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkLink {
    pub source: String,
    pub target: String,
    pub value: f64,
}

/// Non-directional chain connectivity graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkData {
    pub nodes: Vec<NetworkNode>,
    pub links: Vec<NetworkLink>,
}
