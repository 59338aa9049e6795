//! Stablecoin supply views

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Circulating supply of one stablecoin on one chain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainCirculation {
    pub current: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circulating_prev_day: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circulating_prev_week: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circulating_prev_month: Option<f64>,
}

/// A stablecoin with supply changes and market dominance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StablecoinWithMetrics {
    /// DefiLlama pegged-asset id
    pub id: u64,
    pub name: String,
    pub symbol: String,
    #[serde(rename = "gecko_id")]
    pub gecko_id: Option<String>,
    /// e.g. "peggedUSD"
    pub peg_type: String,
    /// e.g. "fiat-backed", "crypto-backed", "algorithmic"
    pub peg_mechanism: String,
    /// Per-chain circulating supply, keyed by chain name
    pub circulating: BTreeMap<String, ChainCirculation>,
    pub price: Option<f64>,
    pub price_source: Option<String>,
    pub chains: Vec<String>,
    pub total_circulating: f64,
    /// Percentage change vs. the previous day
    pub change_24h: f64,
    pub change_7d: f64,
    pub change_30d: f64,
    /// Share of total stablecoin market cap, in percent
    pub dominance: f64,
}

/// A stablecoin's amount on a specific chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopStablecoin {
    pub name: String,
    pub symbol: String,
    pub amount: f64,
}

/// Stablecoin supply aggregated per chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainWithMetrics {
    pub name: String,
    #[serde(rename = "totalStablecoinUSD")]
    pub total_stablecoin_usd: f64,
    pub stablecoin_count: usize,
    pub change_24h: f64,
    pub change_7d: f64,
    /// Largest five stablecoins on the chain
    pub top_stablecoins: Vec<TopStablecoin>,
}

/// A point on a time-series chart (`date` in milliseconds since epoch)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: i64,
    pub value: f64,
}

/// Headline stablecoin market numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalMetrics {
    pub total_market_cap: f64,
    pub change_24h: f64,
    pub change_7d: f64,
    pub stablecoin_count: usize,
    pub chain_count: usize,
}

/// Percentage change from `previous` to `current`, 0 when there is no baseline
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(110.0, 100.0), 10.0);
        assert_eq!(percent_change(90.0, 100.0), -10.0);
        assert_eq!(percent_change(50.0, 0.0), 0.0);
    }

    #[test]
    fn test_chain_serializes_usd_field() {
        let chain = ChainWithMetrics {
            name: "Ethereum".to_string(),
            total_stablecoin_usd: 1.0,
            stablecoin_count: 1,
            change_24h: 0.0,
            change_7d: 0.0,
            top_stablecoins: vec![],
        };
        let json = serde_json::to_value(&chain).unwrap();
        assert_eq!(json["totalStablecoinUSD"], 1.0);
        assert_eq!(json["stablecoinCount"], 1);
    }
}
