//! Artemis API types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Share of non-P2P adjusted volume counted as B2B payments
pub const B2B_SHARE_OF_NON_P2P: f64 = 0.8;

/// Response envelope from GET /data/stablecoin/metrics
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsResponse {
    #[serde(default)]
    pub data: Vec<StablecoinMetrics>,
}

/// Daily labeled-wallet metrics for one stablecoin on one chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StablecoinMetrics {
    pub date: NaiveDate,
    pub chain: String,
    pub symbol: String,
    /// Raw, unfiltered transfer volume
    #[serde(default)]
    pub transfer_volume: f64,
    /// Transfer volume with CEX-internal and MEV activity removed
    #[serde(default)]
    pub artemis_transfer_volume: f64,
    /// EOA-to-EOA transfer volume
    #[serde(default)]
    pub p2p_transfer_volume: f64,
    #[serde(default)]
    pub daily_txns: f64,
    #[serde(default)]
    pub artemis_daily_txns: f64,
    #[serde(default)]
    pub p2p_daily_txns: f64,
    #[serde(default)]
    pub supply: f64,
    #[serde(default)]
    pub dau: f64,
}

/// Provider volume totals across every stablecoin and chain for a window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProviderVolumeBreakdown {
    pub raw_volume: f64,
    pub adjusted_volume: f64,
    pub p2p_volume: f64,
}

impl ProviderVolumeBreakdown {
    pub fn new(raw_volume: f64, adjusted_volume: f64, p2p_volume: f64) -> Self {
        Self {
            raw_volume,
            adjusted_volume,
            p2p_volume,
        }
    }

    /// Sum the three volume kinds over a set of metric rows
    pub fn from_metrics(rows: &[StablecoinMetrics]) -> Self {
        rows.iter().fold(Self::new(0.0, 0.0, 0.0), |acc, row| Self {
            raw_volume: acc.raw_volume + row.transfer_volume,
            adjusted_volume: acc.adjusted_volume + row.artemis_transfer_volume,
            p2p_volume: acc.p2p_volume + row.p2p_transfer_volume,
        })
    }

    /// Volume filtered out as exchange activity
    pub fn cex_volume(&self) -> f64 {
        self.raw_volume - self.adjusted_volume
    }

    /// Adjusted volume that is not P2P
    pub fn defi_volume(&self) -> f64 {
        self.adjusted_volume - self.p2p_volume
    }

    /// P2P plus the estimated B2B share of the remaining adjusted volume
    pub fn payments_volume(&self) -> f64 {
        self.p2p_volume + self.defi_volume() * B2B_SHARE_OF_NON_P2P
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metrics_parse_camel_case() {
        let response: MetricsResponse = serde_json::from_value(json!({
            "data": [{
                "date": "2026-03-01",
                "chain": "ethereum",
                "symbol": "USDC",
                "transferVolume": 100.0,
                "artemisTransferVolume": 65.0,
                "p2pTransferVolume": 25.0,
                "dailyTxns": 2000,
                "dau": 12000
            }]
        }))
        .unwrap();

        let row = &response.data[0];
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(row.artemis_transfer_volume, 65.0);
        assert_eq!(row.supply, 0.0);
    }

    #[test]
    fn test_breakdown_derived_volumes() {
        let breakdown = ProviderVolumeBreakdown::new(1000.0, 650.0, 250.0);
        assert_eq!(breakdown.cex_volume(), 350.0);
        assert_eq!(breakdown.defi_volume(), 400.0);
        assert_eq!(breakdown.payments_volume(), 570.0);
    }
}
