//! Cross-chain bridge views built from DefiLlama
//!
//! The flow and network views are derived from the cached bridge list, so a
//! page showing all three costs one upstream call.

use crate::response_cache::ResponseCache;
use dashboard_core::stablecoin::percent_change;
use dashboard_core::{
    chain_color, BridgeMetrics, BridgeWithMetrics, DashboardResult, FlowData, FlowLink, FlowNode,
    NetworkData, NetworkLink, NetworkNode,
};
use dashboard_defillama::{DefiLlamaClient, LlamaBridge};
use itertools::Itertools;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument};

/// Chains drawn as flow sources (left side of the Sankey)
const L1_CHAINS: &[&str] = &["Ethereum", "BSC", "Tron", "Solana", "Avalanche", "Polygon"];
/// Chains drawn as flow targets (right side of the Sankey)
const L2_CHAINS: &[&str] = &[
    "Arbitrum",
    "Optimism",
    "Base",
    "zkSync Era",
    "Linea",
    "Scroll",
    "Mantle",
    "Blast",
    "Mode",
    "Manta",
];

const FLOW_MAX_SOURCES: usize = 6;
const FLOW_MAX_TARGETS: usize = 10;
const FLOW_MIN_LINK_VALUE: f64 = 50_000.0;
const FLOW_MAX_LINKS: usize = 30;

const NETWORK_MAX_NODES: usize = 15;
const NETWORK_MIN_LINK_VALUE: f64 = 100_000.0;
const NETWORK_MAX_LINKS: usize = 40;

fn is_l1(chain: &str) -> bool {
    L1_CHAINS.contains(&chain)
}

fn is_l2(chain: &str) -> bool {
    L2_CHAINS.contains(&chain)
}

/// Service for bridge volume and flow views
pub struct BridgeService {
    client: Arc<DefiLlamaClient>,
    cache: Arc<ResponseCache>,
}

impl BridgeService {
    pub fn new(client: Arc<DefiLlamaClient>, cache: Arc<ResponseCache>) -> Self {
        Self { client, cache }
    }

    /// Every bridge with derived changes, by last daily volume
    #[instrument(skip(self))]
    pub async fn all_bridges(&self) -> DashboardResult<Vec<BridgeWithMetrics>> {
        self.cache
            .get_or_fetch("bridges:all", || async {
                let response = self.client.bridges(true).await?;
                let bridges = build_bridges(&response.bridges);
                info!("Built metrics for {} bridges", bridges.len());
                Ok(bridges)
            })
            .await
    }

    /// Raw DefiLlama detail for one bridge
    #[instrument(skip(self))]
    pub async fn bridge_details(&self, id: u64) -> DashboardResult<Value> {
        self.client.bridge(id).await
    }

    /// Daily bridge volume for a chain, dates in milliseconds
    #[instrument(skip(self))]
    pub async fn volume_history(&self, chain: &str) -> DashboardResult<Vec<Value>> {
        let key = format!("bridges:volume:{}", chain);
        self.cache
            .get_or_fetch(&key, || async {
                let payload = self.client.bridge_volume(chain).await?;
                Ok(build_volume_history(payload))
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn large_transactions(&self, chain: &str) -> DashboardResult<Value> {
        self.client.large_transactions(chain).await
    }

    #[instrument(skip(self))]
    pub async fn bridge_transactions(
        &self,
        id: u64,
        start_timestamp: Option<i64>,
        end_timestamp: Option<i64>,
    ) -> DashboardResult<Value> {
        self.client
            .bridge_transactions(id, start_timestamp, end_timestamp)
            .await
    }

    #[instrument(skip(self))]
    pub async fn day_stats(&self, timestamp: i64, chain: &str) -> DashboardResult<Value> {
        self.client.bridge_day_stats(timestamp, chain).await
    }

    /// L1 -> L2 Sankey flows
    #[instrument(skip(self))]
    pub async fn flow_data(&self) -> DashboardResult<FlowData> {
        let bridges = self.all_bridges().await?;
        Ok(build_flow_data(&bridges))
    }

    /// Undirected chain connectivity graph
    #[instrument(skip(self))]
    pub async fn network_graph(&self) -> DashboardResult<NetworkData> {
        let bridges = self.all_bridges().await?;
        Ok(build_network_graph(&bridges))
    }

    #[instrument(skip(self))]
    pub async fn bridge_metrics(&self) -> DashboardResult<BridgeMetrics> {
        let bridges = self.all_bridges().await?;
        Ok(build_bridge_metrics(&bridges))
    }
}

pub fn build_bridges(bridges: &[LlamaBridge]) -> Vec<BridgeWithMetrics> {
    let mut result: Vec<BridgeWithMetrics> = bridges
        .iter()
        .map(|bridge| {
            let last_daily = bridge.last_daily_volume.unwrap_or(0.0);
            let day_before = bridge.day_before_last_volume.unwrap_or(0.0);
            let weekly = bridge.weekly_volume.unwrap_or(0.0);

            let change_7d = if weekly > 0.0 && last_daily > 0.0 {
                (last_daily * 7.0 - weekly) / weekly * 100.0
            } else {
                0.0
            };

            BridgeWithMetrics {
                id: bridge.id,
                name: bridge.name.clone(),
                display_name: bridge
                    .display_name
                    .clone()
                    .unwrap_or_else(|| bridge.name.clone()),
                icon: bridge.icon.clone(),
                volume_prev_day: bridge.volume_prev_day.unwrap_or(0.0),
                volume_prev2_day: bridge.volume_prev2_day.unwrap_or(0.0),
                last_hourly_volume: bridge.last_hourly_volume.unwrap_or(0.0),
                current_day_volume: bridge.current_day_volume.unwrap_or(0.0),
                last_daily_volume: last_daily,
                day_before_last_volume: day_before,
                weekly_volume: weekly,
                monthly_volume: bridge.monthly_volume.unwrap_or(0.0),
                chains: bridge.chains.clone(),
                destination_chain: bridge.destination_chain.clone(),
                change_24h: percent_change(last_daily, day_before),
                change_7d,
            }
        })
        .collect();

    result.sort_by(|a, b| b.last_daily_volume.total_cmp(&a.last_daily_volume));
    result
}

/// Volume rows with `date` converted from seconds to milliseconds
///
/// Accepts either an array of rows carrying a `date` field or an object
/// keyed by date.
pub fn build_volume_history(payload: Value) -> Vec<Value> {
    fn with_millis(date: i64, values: Value) -> Value {
        let mut row = match values {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        row.insert("date".to_string(), Value::from(date * 1000));
        Value::Object(row)
    }

    fn seconds(value: &Value) -> Option<i64> {
        value
            .as_i64()
            .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
    }

    match payload {
        Value::Array(rows) => rows
            .into_iter()
            .filter_map(|row| {
                let date = row.get("date").and_then(seconds)?;
                Some(with_millis(date, row))
            })
            .collect(),
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(date, values)| Some(with_millis(date.parse().ok()?, values)))
            .collect(),
        _ => Vec::new(),
    }
}

/// Sum `value` into `key`
fn add(map: &mut BTreeMap<String, f64>, key: impl Into<String>, value: f64) {
    *map.entry(key.into()).or_insert(0.0) += value;
}

/// Chains ordered by volume, largest first
fn ranked(volumes: BTreeMap<String, f64>) -> Vec<(String, f64)> {
    volumes
        .into_iter()
        .sorted_by(|a, b| b.1.total_cmp(&a.1))
        .collect()
}

pub fn build_flow_data(bridges: &[BridgeWithMetrics]) -> FlowData {
    let mut chain_volumes = BTreeMap::new();
    let mut flows: BTreeMap<(String, String), f64> = BTreeMap::new();

    for bridge in bridges {
        let daily = bridge.last_daily_volume;
        if daily <= 0.0 {
            continue;
        }

        let per_chain = daily / bridge.chains.len().max(1) as f64;
        for chain in &bridge.chains {
            add(&mut chain_volumes, chain.as_str(), per_chain);
        }

        let sources: Vec<&String> = bridge.chains.iter().filter(|c| is_l1(c)).collect();
        let targets: Vec<&String> = bridge.chains.iter().filter(|c| is_l2(c)).collect();

        if !sources.is_empty() && !targets.is_empty() {
            let per_pair = daily / (sources.len() * targets.len()) as f64;
            for (source, target) in sources.iter().cartesian_product(targets.iter()) {
                *flows
                    .entry((source.to_string(), target.to_string()))
                    .or_insert(0.0) += per_pair;
            }
        } else if bridge.chains.iter().any(|c| c == "Ethereum") {
            let others: Vec<&String> = bridge.chains.iter().filter(|c| *c != "Ethereum").collect();
            let per_chain = daily / others.len().max(1) as f64;
            for target in others {
                *flows
                    .entry(("Ethereum".to_string(), target.clone()))
                    .or_insert(0.0) += per_chain;
            }
        }
    }

    let ranked_chains = ranked(chain_volumes);
    let node = |prefix: &str, chain: &str, value: f64| FlowNode {
        id: format!("{}-{}", prefix, chain),
        name: chain.to_string(),
        color: chain_color(chain),
        value: Some(value),
    };

    let source_nodes = ranked_chains
        .iter()
        .filter(|(chain, _)| is_l1(chain))
        .take(FLOW_MAX_SOURCES)
        .map(|(chain, value)| node("source", chain.as_str(), *value));
    let target_nodes = ranked_chains
        .iter()
        .filter(|(chain, _)| is_l2(chain) || !is_l1(chain))
        .take(FLOW_MAX_TARGETS)
        .map(|(chain, value)| node("target", chain.as_str(), *value));
    let nodes: Vec<FlowNode> = source_nodes.chain(target_nodes).collect();

    let node_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let links = flows
        .into_iter()
        .filter(|(_, value)| *value > FLOW_MIN_LINK_VALUE)
        .map(|((source, target), value)| FlowLink {
            source: format!("source-{}", source),
            target: format!("target-{}", target),
            value,
            color: Some(chain_color(&source)),
        })
        .filter(|link| node_ids.contains(link.source.as_str()) && node_ids.contains(link.target.as_str()))
        .sorted_by(|a, b| b.value.total_cmp(&a.value))
        .take(FLOW_MAX_LINKS)
        .collect();

    FlowData { nodes, links }
}

pub fn build_network_graph(bridges: &[BridgeWithMetrics]) -> NetworkData {
    let mut chain_volumes = BTreeMap::new();
    let mut flows: BTreeMap<(String, String), f64> = BTreeMap::new();

    for bridge in bridges {
        let daily = bridge.last_daily_volume;
        let n = bridge.chains.len();
        if daily <= 0.0 || n < 2 {
            continue;
        }

        for chain in &bridge.chains {
            add(&mut chain_volumes, chain.as_str(), daily / n as f64);
        }

        let per_pair = daily / (n * (n - 1) / 2) as f64;
        for (a, b) in bridge.chains.iter().tuple_combinations() {
            let key = if a <= b {
                (a.clone(), b.clone())
            } else {
                (b.clone(), a.clone())
            };
            *flows.entry(key).or_insert(0.0) += per_pair;
        }
    }

    let nodes: Vec<NetworkNode> = ranked(chain_volumes)
        .into_iter()
        .take(NETWORK_MAX_NODES)
        .map(|(chain, value)| NetworkNode {
            id: chain.clone(),
            color: chain_color(&chain),
            name: chain,
            value,
        })
        .collect();

    let node_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let links = flows
        .into_iter()
        .filter(|((source, target), value)| {
            *value > NETWORK_MIN_LINK_VALUE
                && node_ids.contains(source.as_str())
                && node_ids.contains(target.as_str())
        })
        .map(|((source, target), value)| NetworkLink {
            source,
            target,
            value,
        })
        .sorted_by(|a, b| b.value.total_cmp(&a.value))
        .take(NETWORK_MAX_LINKS)
        .collect();

    NetworkData { nodes, links }
}

pub fn build_bridge_metrics(bridges: &[BridgeWithMetrics]) -> BridgeMetrics {
    let total_daily_volume: f64 = bridges.iter().map(|b| b.last_daily_volume).sum();
    let prev_day_volume: f64 = bridges.iter().map(|b| b.day_before_last_volume).sum();

    BridgeMetrics {
        total_daily_volume,
        total_weekly_volume: bridges.iter().map(|b| b.weekly_volume).sum(),
        total_monthly_volume: bridges.iter().map(|b| b.monthly_volume).sum(),
        change_24h: percent_change(total_daily_volume, prev_day_volume),
        bridge_count: bridges.len(),
        active_chains: bridges
            .iter()
            .flat_map(|b| b.chains.iter())
            .collect::<HashSet<_>>()
            .len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn bridge(id: u64, daily: f64, chains: &[&str]) -> BridgeWithMetrics {
        BridgeWithMetrics {
            id,
            name: format!("bridge-{}", id),
            display_name: format!("Bridge {}", id),
            icon: None,
            volume_prev_day: 0.0,
            volume_prev2_day: 0.0,
            last_hourly_volume: 0.0,
            current_day_volume: 0.0,
            last_daily_volume: daily,
            day_before_last_volume: daily / 2.0,
            weekly_volume: daily * 7.0,
            monthly_volume: daily * 30.0,
            chains: chains.iter().map(|c| c.to_string()).collect(),
            destination_chain: None,
            change_24h: 0.0,
            change_7d: 0.0,
        }
    }

    #[test]
    fn test_build_bridges_changes_and_order() {
        let raw: Vec<LlamaBridge> = serde_json::from_value(json!([
            {
                "id": 1,
                "name": "hop",
                "lastDailyVolume": 100.0,
                "dayBeforeLastVolume": 80.0,
                "weeklyVolume": 560.0,
                "chains": ["Ethereum", "Arbitrum"]
            },
            {
                "id": "2",
                "name": "stargate",
                "displayName": "Stargate",
                "lastDailyVolume": 500.0,
                "dayBeforeLastVolume": 0,
                "weeklyVolume": null,
                "chains": ["Ethereum", "Base"]
            }
        ]))
        .unwrap();

        let bridges = build_bridges(&raw);
        assert_eq!(bridges[0].display_name, "Stargate");
        assert_eq!(bridges[0].change_24h, 0.0);
        assert_eq!(bridges[0].change_7d, 0.0);

        let hop = &bridges[1];
        assert_eq!(hop.display_name, "hop");
        assert_eq!(hop.change_24h, 25.0);
        assert_eq!(hop.change_7d, 25.0);
    }

    #[test]
    fn test_flow_data_l1_to_l2_pairs() {
        let bridges = vec![bridge(1, 1_000_000.0, &["Ethereum", "BSC", "Arbitrum", "Base"])];
        let flows = build_flow_data(&bridges);

        let sources: Vec<&str> = flows.nodes.iter().filter(|n| n.id.starts_with("source-")).map(|n| n.name.as_str()).collect();
        assert_eq!(sources.len(), 2);
        assert!(sources.contains(&"Ethereum") && sources.contains(&"BSC"));

        assert_eq!(flows.links.len(), 4);
        assert!(flows.links.iter().all(|l| l.value == 250_000.0));
        assert!(flows.links.iter().all(|l| l.source.starts_with("source-") && l.target.starts_with("target-")));
    }

    #[test]
    fn test_flow_data_ethereum_fallback_and_threshold() {
        let bridges = vec![
            // No L2 present: Ethereum -> Gnosis, Ethereum -> Tron
            bridge(1, 400_000.0, &["Ethereum", "Gnosis", "Tron"]),
            // Below the link threshold once split
            bridge(2, 90_000.0, &["Ethereum", "Optimism", "Polygon"]),
        ];
        let flows = build_flow_data(&bridges);

        let link_pairs: Vec<(&str, &str)> = flows
            .links
            .iter()
            .map(|l| (l.source.as_str(), l.target.as_str()))
            .collect();
        assert!(link_pairs.contains(&("source-Ethereum", "target-Gnosis")));
        // Tron is an L1, so it is never a target node
        assert!(!link_pairs.iter().any(|(_, t)| *t == "target-Tron"));
        assert!(flows.links.iter().all(|l| l.value > FLOW_MIN_LINK_VALUE));
        assert_eq!(flows.links[0].color.as_deref(), Some("#627EEA"));
    }

    #[test]
    fn test_flow_data_skips_idle_bridges() {
        let flows = build_flow_data(&[bridge(1, 0.0, &["Ethereum", "Base"])]);
        assert_eq!(flows, FlowData::default());
    }

    #[test]
    fn test_network_graph_undirected_pairs() {
        let bridges = vec![
            bridge(1, 3_000_000.0, &["Ethereum", "Arbitrum", "Base"]),
            bridge(2, 1_000_000.0, &["Base", "Ethereum"]),
            bridge(3, 5_000_000.0, &["Solana"]),
        ];
        let graph = build_network_graph(&bridges);

        // Single-chain bridges carry no links and add no nodes
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.nodes[0].value, 1_500_000.0);
        assert_eq!(graph.nodes[2].id, "Arbitrum");

        let base_eth = graph
            .links
            .iter()
            .find(|l| l.source == "Base" && l.target == "Ethereum")
            .unwrap();
        assert_eq!(base_eth.value, 2_000_000.0);
        assert_eq!(graph.links[0].value, 2_000_000.0);
        assert_eq!(graph.links.len(), 3);
    }

    #[test]
    fn test_bridge_metrics_totals() {
        let metrics = build_bridge_metrics(&[
            bridge(1, 100.0, &["Ethereum", "Base"]),
            bridge(2, 300.0, &["Ethereum", "Tron"]),
        ]);

        assert_eq!(metrics.total_daily_volume, 400.0);
        assert_eq!(metrics.total_weekly_volume, 2800.0);
        assert_eq!(metrics.change_24h, 100.0);
        assert_eq!(metrics.bridge_count, 2);
        assert_eq!(metrics.active_chains, 3);
    }

    #[test]
    fn test_volume_history_array_and_object() {
        let rows = build_volume_history(json!([
            { "date": "1700000000", "depositUSD": 5.0 },
            { "depositUSD": 1.0 }
        ]));
        assert_eq!(rows, vec![json!({ "date": 1_700_000_000_000i64, "depositUSD": 5.0 })]);

        let rows = build_volume_history(json!({ "1700000000": { "withdrawUSD": 2.0 } }));
        assert_eq!(rows, vec![json!({ "date": 1_700_000_000_000i64, "withdrawUSD": 2.0 })]);
    }
}
