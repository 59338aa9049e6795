//! Stablecoin supply views built from DefiLlama

use crate::response_cache::ResponseCache;
use dashboard_core::stablecoin::percent_change;
use dashboard_core::{
    ChainCirculation, ChainWithMetrics, ChartPoint, DashboardResult, StablecoinWithMetrics,
    TopStablecoin, TotalMetrics,
};
use dashboard_defillama::types::{usd_of, PeggedAsset, StablecoinChartRow};
use dashboard_defillama::DefiLlamaClient;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument};

/// Stablecoins kept per chain in the chain view
const TOP_STABLECOINS_PER_CHAIN: usize = 5;

/// Service for stablecoin supply, chain and chart views
pub struct StablecoinService {
    client: Arc<DefiLlamaClient>,
    cache: Arc<ResponseCache>,
}

impl StablecoinService {
    pub fn new(client: Arc<DefiLlamaClient>, cache: Arc<ResponseCache>) -> Self {
        Self { client, cache }
    }

    /// Every stablecoin with supply changes and dominance, largest first
    #[instrument(skip(self))]
    pub async fn all_stablecoins(&self) -> DashboardResult<Vec<StablecoinWithMetrics>> {
        self.cache
            .get_or_fetch("stablecoins:all", || async {
                let response = self.client.stablecoins(true).await?;
                let stablecoins = build_stablecoins(&response.pegged_assets);
                info!("Built metrics for {} stablecoins", stablecoins.len());
                Ok(stablecoins)
            })
            .await
    }

    /// Raw DefiLlama detail for one stablecoin
    #[instrument(skip(self))]
    pub async fn stablecoin_detail(&self, id: u64) -> DashboardResult<Value> {
        self.client.stablecoin(id).await
    }

    /// Per-token supply history for one stablecoin
    #[instrument(skip(self))]
    pub async fn stablecoin_history(&self, id: u64) -> DashboardResult<Value> {
        let key = format!("stablecoins:history:{}", id);
        self.cache
            .get_or_fetch(&key, || async {
                let detail = self.client.stablecoin(id).await?;
                Ok(extract_history(detail))
            })
            .await
    }

    /// Current supply per chain as reported by DefiLlama
    #[instrument(skip(self))]
    pub async fn stablecoin_chains(&self) -> DashboardResult<Value> {
        self.cache
            .get_or_fetch("stablecoins:chains", || self.client.stablecoin_chains())
            .await
    }

    /// Historical stablecoin prices
    #[instrument(skip(self))]
    pub async fn stablecoin_prices(&self) -> DashboardResult<Value> {
        self.cache
            .get_or_fetch("stablecoins:prices", || self.client.stablecoin_prices())
            .await
    }

    /// Stablecoin supply aggregated per chain, largest first
    #[instrument(skip(self))]
    pub async fn chain_data(&self) -> DashboardResult<Vec<ChainWithMetrics>> {
        let stablecoins = self.all_stablecoins().await?;
        Ok(build_chain_data(&stablecoins))
    }

    /// Total circulating supply over time, for one chain or all chains
    #[instrument(skip(self))]
    pub async fn historical_charts(&self, chain: Option<&str>) -> DashboardResult<Vec<ChartPoint>> {
        let key = format!("stablecoins:charts:{}", chain.unwrap_or("all"));
        self.cache
            .get_or_fetch(&key, || async {
                let rows = self.client.stablecoin_charts(chain).await?;
                Ok(build_chart_points(&rows))
            })
            .await
    }

    /// Headline market cap and supply changes
    #[instrument(skip(self))]
    pub async fn total_metrics(&self) -> DashboardResult<TotalMetrics> {
        let stablecoins = self.all_stablecoins().await?;
        Ok(build_total_metrics(&stablecoins))
    }
}

/// A previous-period amount, falling back to `current` when missing or zero
fn previous_or(previous: Option<f64>, current: f64) -> f64 {
    previous.filter(|v| *v != 0.0).unwrap_or(current)
}

pub fn build_stablecoins(assets: &[PeggedAsset]) -> Vec<StablecoinWithMetrics> {
    let total_market_cap: f64 = assets
        .iter()
        .map(|a| a.circulating.usd().unwrap_or(0.0))
        .sum();

    let mut stablecoins: Vec<StablecoinWithMetrics> = assets
        .iter()
        .map(|asset| {
            let total = asset.circulating.usd().unwrap_or(0.0);
            let prev_day = previous_or(usd_of(&asset.circulating_prev_day), total);
            let prev_week = previous_or(usd_of(&asset.circulating_prev_week), total);
            let prev_month = previous_or(usd_of(&asset.circulating_prev_month), total);

            let circulating = asset
                .chain_circulating
                .iter()
                .map(|(chain, entry)| {
                    let circulation = ChainCirculation {
                        current: entry.current.usd().unwrap_or(0.0),
                        circulating_prev_day: usd_of(&entry.circulating_prev_day),
                        circulating_prev_week: usd_of(&entry.circulating_prev_week),
                        circulating_prev_month: usd_of(&entry.circulating_prev_month),
                    };
                    (chain.clone(), circulation)
                })
                .collect();

            StablecoinWithMetrics {
                id: asset.id,
                name: asset.name.clone(),
                symbol: asset.symbol.clone(),
                gecko_id: asset.gecko_id.clone(),
                peg_type: asset.peg_type.clone(),
                peg_mechanism: asset.peg_mechanism.clone(),
                circulating,
                price: asset.price,
                price_source: None,
                chains: asset.chains.clone(),
                total_circulating: total,
                change_24h: percent_change(total, prev_day),
                change_7d: percent_change(total, prev_week),
                change_30d: percent_change(total, prev_month),
                dominance: if total_market_cap > 0.0 {
                    total / total_market_cap * 100.0
                } else {
                    0.0
                },
            }
        })
        .collect();

    stablecoins.sort_by(|a, b| b.total_circulating.total_cmp(&a.total_circulating));
    stablecoins
}

#[derive(Default)]
struct ChainAccumulator {
    total: f64,
    prev_day: f64,
    prev_week: f64,
    stablecoins: Vec<TopStablecoin>,
}

pub fn build_chain_data(stablecoins: &[StablecoinWithMetrics]) -> Vec<ChainWithMetrics> {
    let mut chains: BTreeMap<&str, ChainAccumulator> = BTreeMap::new();

    for coin in stablecoins {
        for (chain, circulation) in &coin.circulating {
            let current = circulation.current;
            if current <= 0.0 {
                continue;
            }

            let acc = chains.entry(chain.as_str()).or_default();
            acc.total += current;
            acc.prev_day += previous_or(circulation.circulating_prev_day, current);
            acc.prev_week += previous_or(circulation.circulating_prev_week, current);
            acc.stablecoins.push(TopStablecoin {
                name: coin.name.clone(),
                symbol: coin.symbol.clone(),
                amount: current,
            });
        }
    }

    let mut result: Vec<ChainWithMetrics> = chains
        .into_iter()
        .map(|(name, mut acc)| {
            acc.stablecoins.sort_by(|a, b| b.amount.total_cmp(&a.amount));
            let stablecoin_count = acc.stablecoins.len();
            acc.stablecoins.truncate(TOP_STABLECOINS_PER_CHAIN);

            ChainWithMetrics {
                name: name.to_string(),
                total_stablecoin_usd: acc.total,
                stablecoin_count,
                change_24h: percent_change(acc.total, acc.prev_day),
                change_7d: percent_change(acc.total, acc.prev_week),
                top_stablecoins: acc.stablecoins,
            }
        })
        .collect();

    result.sort_by(|a, b| b.total_stablecoin_usd.total_cmp(&a.total_stablecoin_usd));
    result
}

/// Chart rows with dates converted from seconds to milliseconds
pub fn build_chart_points(rows: &[StablecoinChartRow]) -> Vec<ChartPoint> {
    rows.iter()
        .map(|row| ChartPoint {
            date: row.date * 1000,
            value: row.total_circulating_usd.usd().unwrap_or(0.0),
        })
        .collect()
}

/// Totals, with previous-period totals back-derived from each coin's change
pub fn build_total_metrics(stablecoins: &[StablecoinWithMetrics]) -> TotalMetrics {
    let back_derive = |change: fn(&StablecoinWithMetrics) -> f64| -> f64 {
        stablecoins
            .iter()
            .map(|coin| {
                let factor = match change(coin) {
                    c if c != 0.0 => 100.0 / (100.0 + c),
                    _ => 1.0,
                };
                coin.total_circulating * factor
            })
            .sum()
    };

    let total_market_cap: f64 = stablecoins.iter().map(|c| c.total_circulating).sum();
    let prev_day = back_derive(|c| c.change_24h);
    let prev_week = back_derive(|c| c.change_7d);

    let chain_count = stablecoins
        .iter()
        .flat_map(|c| c.chains.iter())
        .collect::<HashSet<_>>()
        .len();

    TotalMetrics {
        total_market_cap,
        change_24h: percent_change(total_market_cap, prev_day),
        change_7d: percent_change(total_market_cap, prev_week),
        stablecoin_count: stablecoins.len(),
        chain_count,
    }
}

/// The `tokens` history array of a stablecoin detail payload
pub fn extract_history(mut detail: Value) -> Value {
    match detail.get_mut("tokens") {
        Some(tokens) if tokens.is_array() => tokens.take(),
        _ => Value::Array(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn assets() -> Vec<PeggedAsset> {
        serde_json::from_value(json!([
            {
                "id": "2",
                "name": "USD Coin",
                "symbol": "USDC",
                "gecko_id": "usd-coin",
                "pegType": "peggedUSD",
                "pegMechanism": "fiat-backed",
                "circulating": { "peggedUSD": 250.0 },
                "circulatingPrevDay": { "peggedUSD": 200.0 },
                "circulatingPrevWeek": {},
                "chainCirculating": {
                    "Ethereum": {
                        "current": { "peggedUSD": 200.0 },
                        "circulatingPrevDay": { "peggedUSD": 160.0 }
                    },
                    "Solana": { "current": { "peggedUSD": 50.0 } }
                },
                "chains": ["Ethereum", "Solana"],
                "price": 1.0
            },
            {
                "id": 1,
                "name": "Tether",
                "symbol": "USDT",
                "gecko_id": "tether",
                "pegType": "peggedUSD",
                "pegMechanism": "fiat-backed",
                "circulating": { "peggedUSD": 750.0 },
                "circulatingPrevDay": { "peggedUSD": 750.0 },
                "circulatingPrevMonth": { "peggedUSD": 500.0 },
                "chainCirculating": {
                    "Ethereum": { "current": { "peggedUSD": 300.0 } },
                    "Tron": {
                        "current": { "peggedUSD": 450.0 },
                        "circulatingPrevWeek": { "peggedUSD": 500.0 }
                    },
                    "Dead": { "current": { "peggedUSD": 0.0 } }
                },
                "chains": ["Ethereum", "Tron"],
                "price": null
            }
        ]))
        .unwrap()
    }

    #[test]
    fn test_build_stablecoins_changes_and_dominance() {
        let coins = build_stablecoins(&assets());

        assert_eq!(coins[0].symbol, "USDT");
        assert_eq!(coins[0].dominance, 75.0);
        assert_eq!(coins[0].change_24h, 0.0);
        assert_eq!(coins[0].change_30d, 50.0);

        let usdc = &coins[1];
        assert_eq!(usdc.dominance, 25.0);
        assert_eq!(usdc.change_24h, 25.0);
        // Missing previous week means no change
        assert_eq!(usdc.change_7d, 0.0);
        assert_eq!(usdc.circulating["Ethereum"].circulating_prev_day, Some(160.0));
        assert_eq!(usdc.circulating["Solana"].circulating_prev_day, None);
    }

    #[test]
    fn test_build_chain_data_union() {
        let chains = build_chain_data(&build_stablecoins(&assets()));

        let names: Vec<&str> = chains.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ethereum", "Tron", "Solana"]);

        let ethereum = &chains[0];
        assert_eq!(ethereum.total_stablecoin_usd, 500.0);
        assert_eq!(ethereum.stablecoin_count, 2);
        assert_eq!(ethereum.top_stablecoins[0].symbol, "USDT");
        // prev day: USDC 160 + USDT falls back to current 300
        assert_eq!(ethereum.change_24h, percent_change(500.0, 460.0));

        let tron = &chains[1];
        assert_eq!(tron.change_7d, -10.0);
    }

    #[test]
    fn test_build_chain_data_keeps_top_five() {
        let coins: Vec<StablecoinWithMetrics> = (0..7)
            .map(|i| {
                let mut coin = build_stablecoins(&assets()).remove(1);
                coin.symbol = format!("C{}", i);
                coin.circulating = BTreeMap::from([(
                    "Base".to_string(),
                    ChainCirculation {
                        current: 10.0 + i as f64,
                        ..Default::default()
                    },
                )]);
                coin
            })
            .collect();

        let chains = build_chain_data(&coins);
        assert_eq!(chains[0].stablecoin_count, 7);
        assert_eq!(chains[0].top_stablecoins.len(), 5);
        assert_eq!(chains[0].top_stablecoins[0].symbol, "C6");
    }

    #[test]
    fn test_build_chart_points_in_millis() {
        let rows: Vec<StablecoinChartRow> = serde_json::from_value(json!([
            { "date": "1700000000", "totalCirculatingUSD": { "peggedUSD": 10.0 } },
            { "date": 1700086400, "totalCirculatingUSD": {} }
        ]))
        .unwrap();

        assert_eq!(
            build_chart_points(&rows),
            vec![
                ChartPoint { date: 1_700_000_000_000, value: 10.0 },
                ChartPoint { date: 1_700_086_400_000, value: 0.0 },
            ]
        );
    }

    #[test]
    fn test_build_total_metrics() {
        let totals = build_total_metrics(&build_stablecoins(&assets()));

        assert_eq!(totals.total_market_cap, 1000.0);
        assert_eq!(totals.stablecoin_count, 2);
        assert_eq!(totals.chain_count, 3);
        // USDC back-derives to 200, USDT unchanged at 750
        assert!((totals.change_24h - percent_change(1000.0, 950.0)).abs() < 1e-9);
        assert_eq!(totals.change_7d, 0.0);
    }

    #[test]
    fn test_extract_history() {
        assert_eq!(
            extract_history(json!({ "tokens": [{ "date": 1 }] })),
            json!([{ "date": 1 }])
        );
        assert_eq!(extract_history(json!({ "name": "Tether" })), json!([]));
    }
}
