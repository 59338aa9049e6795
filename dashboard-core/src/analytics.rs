//! On-chain analytics rows
//!
//! Shapes returned by the Dune-backed datasets (supply events, whale
//! transfers, activity, peg stability, holders) and the Artemis user
//! activity series.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Whether a supply event created or destroyed tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MintBurnKind {
    Mint,
    Burn,
}

/// A stablecoin supply change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintBurnEvent {
    pub timestamp: DateTime<Utc>,
    pub stablecoin: String,
    #[serde(rename = "type")]
    pub kind: MintBurnKind,
    pub amount: f64,
    pub amount_usd: f64,
    pub chain: String,
    pub tx_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

/// A large transfer between two (possibly labeled) addresses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhaleTransfer {
    pub timestamp: DateTime<Utc>,
    pub stablecoin: String,
    pub from_address: String,
    pub to_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_label: Option<String>,
    pub amount: f64,
    pub amount_usd: f64,
    pub chain: String,
    pub tx_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveAddressMetrics {
    pub date: NaiveDate,
    pub stablecoin: String,
    pub daily_active: u64,
    pub weekly_active: u64,
    pub monthly_active: u64,
    pub new_addresses: u64,
    pub chain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferVolumeMetrics {
    pub date: NaiveDate,
    pub stablecoin: String,
    pub volume: f64,
    pub tx_count: u64,
    pub avg_tx_size: f64,
    pub median_tx_size: f64,
    pub chain: String,
}

/// A price observation and its deviation from $1.00
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PegStabilityMetrics {
    pub timestamp: DateTime<Utc>,
    pub stablecoin: String,
    pub price: f64,
    /// Percent away from $1.00 (signed)
    pub deviation: f64,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopHolder {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub balance: f64,
    pub balance_usd: f64,
    pub percent_of_supply: f64,
    pub stablecoin: String,
    pub chain: String,
    pub last_activity: DateTime<Utc>,
}

/// One-day roll-up of the analytics datasets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_daily_volume: f64,
    pub daily_active_addresses: u64,
    pub daily_mints: f64,
    pub daily_burns: f64,
    pub net_supply_change: f64,
    #[serde(rename = "largeTransfers24h")]
    pub large_transfers_24h: usize,
    pub avg_peg_deviation: f64,
}

/// A single dated observation (DAU, daily transactions, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedValue {
    pub date: NaiveDate,
    pub value: f64,
}

/// User activity summary for one stablecoin over a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMetrics {
    pub symbol: String,
    pub days: u32,
    /// Mean daily active users over the window
    pub avg_dau: f64,
    pub latest_dau: f64,
    pub total_txns: f64,
    /// Share of transfer volume that was EOA-to-EOA, in percent
    pub p2p_volume_share: f64,
    pub dau: Vec<DatedValue>,
    pub daily_txns: Vec<DatedValue>,
}
