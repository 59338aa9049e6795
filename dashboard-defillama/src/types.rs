//! DefiLlama API response types
//!
//! These types mirror the DefiLlama API responses. DefiLlama is loose with
//! its JSON: ids and dates arrive as either strings or numbers, volumes may
//! be null, and `destinationChain` is sometimes `false`. The lenient
//! deserializers below absorb that so a single odd row doesn't fail a page.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Response from GET /stablecoins
#[derive(Debug, Clone, Deserialize)]
pub struct StablecoinsResponse {
    #[serde(rename = "peggedAssets", default)]
    pub pegged_assets: Vec<PeggedAsset>,
}

/// Amount denominated in the peg currency (only USD is consumed)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeggedAmount {
    #[serde(rename = "peggedUSD", default, deserialize_with = "lenient_f64")]
    pub pegged_usd: Option<f64>,
}

impl PeggedAmount {
    pub fn usd(&self) -> Option<f64> {
        self.pegged_usd
    }
}

/// USD amount of an optional pegged amount
pub fn usd_of(amount: &Option<PeggedAmount>) -> Option<f64> {
    amount.as_ref().and_then(PeggedAmount::usd)
}

/// Per-chain circulating supply for a pegged asset
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainCirculatingEntry {
    #[serde(default)]
    pub current: PeggedAmount,
    #[serde(default)]
    pub circulating_prev_day: Option<PeggedAmount>,
    #[serde(default)]
    pub circulating_prev_week: Option<PeggedAmount>,
    #[serde(default)]
    pub circulating_prev_month: Option<PeggedAmount>,
}

/// A pegged asset from the stablecoins list
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeggedAsset {
    #[serde(deserialize_with = "lenient_u64")]
    pub id: u64,
    pub name: String,
    pub symbol: String,
    #[serde(rename = "gecko_id", default)]
    pub gecko_id: Option<String>,
    #[serde(default)]
    pub peg_type: String,
    #[serde(default)]
    pub peg_mechanism: String,
    #[serde(default)]
    pub circulating: PeggedAmount,
    #[serde(default)]
    pub circulating_prev_day: Option<PeggedAmount>,
    #[serde(default)]
    pub circulating_prev_week: Option<PeggedAmount>,
    #[serde(default)]
    pub circulating_prev_month: Option<PeggedAmount>,
    #[serde(default)]
    pub chain_circulating: BTreeMap<String, ChainCirculatingEntry>,
    #[serde(default)]
    pub chains: Vec<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
}

/// A row from GET /stablecoincharts/{chain}
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StablecoinChartRow {
    /// Unix seconds
    #[serde(deserialize_with = "lenient_i64")]
    pub date: i64,
    #[serde(rename = "totalCirculatingUSD", default)]
    pub total_circulating_usd: PeggedAmount,
}

/// Response from GET /bridges
#[derive(Debug, Clone, Deserialize)]
pub struct BridgesResponse {
    #[serde(default)]
    pub bridges: Vec<LlamaBridge>,
}

/// A bridge from the bridges list
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlamaBridge {
    #[serde(deserialize_with = "lenient_u64")]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub volume_prev_day: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub volume_prev2_day: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub last_hourly_volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub current_day_volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub last_daily_volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub day_before_last_volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weekly_volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub monthly_volume: Option<f64>,
    #[serde(default)]
    pub chains: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub destination_chain: Option<String>,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| serde::de::Error::custom("integer out of range")),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid integer: {}", s))),
        other => Err(serde::de::Error::custom(format!(
            "expected integer, got {}",
            other
        ))),
    }
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_i64(deserializer)?;
    u64::try_from(value).map_err(|_| serde::de::Error::custom("negative id"))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pegged_asset_accepts_string_id() {
        let asset: PeggedAsset = serde_json::from_value(json!({
            "id": "1",
            "name": "Tether",
            "symbol": "USDT",
            "gecko_id": "tether",
            "pegType": "peggedUSD",
            "pegMechanism": "fiat-backed",
            "circulating": { "peggedUSD": 100.0 },
            "circulatingPrevDay": { "peggedUSD": 90.0 },
            "chainCirculating": {
                "Ethereum": { "current": { "peggedUSD": 60.0 } }
            },
            "chains": ["Ethereum"],
            "price": "1.0003"
        }))
        .unwrap();

        assert_eq!(asset.id, 1);
        assert_eq!(asset.circulating.usd(), Some(100.0));
        assert!(asset.circulating_prev_week.is_none());
        assert_eq!(asset.chain_circulating["Ethereum"].current.usd(), Some(60.0));
        assert_eq!(asset.price, Some(1.0003));
    }

    #[test]
    fn test_bridge_tolerates_false_destination_and_null_volume() {
        let bridge: LlamaBridge = serde_json::from_value(json!({
            "id": 7,
            "name": "stargate",
            "displayName": "Stargate",
            "lastDailyVolume": null,
            "weeklyVolume": 1200.5,
            "chains": ["Ethereum", "Arbitrum"],
            "destinationChain": false
        }))
        .unwrap();

        assert_eq!(bridge.last_daily_volume, None);
        assert_eq!(bridge.weekly_volume, Some(1200.5));
        assert_eq!(bridge.destination_chain, None);
    }

    #[test]
    fn test_chart_row_string_date() {
        let row: StablecoinChartRow = serde_json::from_value(json!({
            "date": "1700000000",
            "totalCirculatingUSD": { "peggedUSD": 5.0 }
        }))
        .unwrap();
        assert_eq!(row.date, 1_700_000_000);
        assert_eq!(row.total_circulating_usd.usd(), Some(5.0));
    }
}
