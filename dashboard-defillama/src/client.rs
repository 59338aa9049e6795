//! DefiLlama API client
//!
//! Provides methods for the public stablecoins and bridges REST APIs.

use crate::types::{BridgesResponse, StablecoinChartRow, StablecoinsResponse};
use dashboard_core::{DashboardError, DashboardResult};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Base URL for the DefiLlama stablecoins API
const STABLECOINS_API_BASE: &str = "https://stablecoins.llama.fi";
/// Base URL for the DefiLlama bridges API
const BRIDGES_API_BASE: &str = "https://bridges.llama.fi";

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Connection settings for [`DefiLlamaClient`]
#[derive(Debug, Clone)]
pub struct DefiLlamaConfig {
    pub stablecoins_base_url: String,
    pub bridges_base_url: String,
    /// Per-request timeout; an elapsed request is reported as a timeout error
    pub timeout: Duration,
}

impl Default for DefiLlamaConfig {
    fn default() -> Self {
        Self {
            stablecoins_base_url: STABLECOINS_API_BASE.to_string(),
            bridges_base_url: BRIDGES_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// DefiLlama API client
#[derive(Clone)]
pub struct DefiLlamaClient {
    client: Client,
    config: DefiLlamaConfig,
}

impl DefiLlamaClient {
    /// Create a new client
    pub fn new(config: DefiLlamaConfig) -> DashboardResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent("StablecoinDashboard/1.0")
            .build()
            .map_err(|e| DashboardError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &DefiLlamaConfig {
        &self.config
    }

    // ========================================================================
    // Stablecoins API
    // ========================================================================

    /// List all pegged assets
    #[instrument(skip(self))]
    pub async fn stablecoins(&self, include_prices: bool) -> DashboardResult<StablecoinsResponse> {
        let url = self.stablecoins_url(include_prices);
        self.get_json(&url).await
    }

    /// Full detail for one pegged asset (passed through untouched)
    #[instrument(skip(self))]
    pub async fn stablecoin(&self, id: u64) -> DashboardResult<Value> {
        let url = format!("{}/stablecoin/{}", self.config.stablecoins_base_url, id);
        self.get_json(&url).await
    }

    /// Current stablecoin supply per chain
    #[instrument(skip(self))]
    pub async fn stablecoin_chains(&self) -> DashboardResult<Value> {
        let url = format!("{}/stablecoinchains", self.config.stablecoins_base_url);
        self.get_json(&url).await
    }

    /// Historical total circulating supply, for one chain or all chains
    #[instrument(skip(self))]
    pub async fn stablecoin_charts(
        &self,
        chain: Option<&str>,
    ) -> DashboardResult<Vec<StablecoinChartRow>> {
        let url = self.charts_url(chain);
        self.get_json(&url).await
    }

    /// Historical stablecoin prices
    #[instrument(skip(self))]
    pub async fn stablecoin_prices(&self) -> DashboardResult<Value> {
        let url = format!("{}/stablecoinprices", self.config.stablecoins_base_url);
        self.get_json(&url).await
    }

    // ========================================================================
    // Bridges API
    // ========================================================================

    /// List all bridges
    #[instrument(skip(self))]
    pub async fn bridges(&self, include_chains: bool) -> DashboardResult<BridgesResponse> {
        let url = format!(
            "{}/bridges{}",
            self.config.bridges_base_url,
            if include_chains { "?includeChains=true" } else { "" }
        );
        self.get_json(&url).await
    }

    /// Full detail for one bridge (passed through untouched)
    #[instrument(skip(self))]
    pub async fn bridge(&self, id: u64) -> DashboardResult<Value> {
        let url = format!("{}/bridge/{}", self.config.bridges_base_url, id);
        self.get_json(&url).await
    }

    /// Daily bridge volume for a chain
    #[instrument(skip(self))]
    pub async fn bridge_volume(&self, chain: &str) -> DashboardResult<Value> {
        let url = self.path_url(&self.config.bridges_base_url, &["bridgevolume", chain])?;
        self.get_json(url.as_str()).await
    }

    /// Per-token bridge stats for a chain on a given day
    #[instrument(skip(self))]
    pub async fn bridge_day_stats(&self, timestamp: i64, chain: &str) -> DashboardResult<Value> {
        let url = self.path_url(
            &self.config.bridges_base_url,
            &["bridgedaystats", &timestamp.to_string(), chain],
        )?;
        self.get_json(url.as_str()).await
    }

    /// Transactions for a bridge within an optional time window (unix seconds)
    #[instrument(skip(self))]
    pub async fn bridge_transactions(
        &self,
        id: u64,
        start_timestamp: Option<i64>,
        end_timestamp: Option<i64>,
    ) -> DashboardResult<Value> {
        let mut url =
            self.path_url(&self.config.bridges_base_url, &["transactions", &id.to_string()])?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(start) = start_timestamp {
                query.append_pair("starttimestamp", &start.to_string());
            }
            if let Some(end) = end_timestamp {
                query.append_pair("endtimestamp", &end.to_string());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        self.get_json(url.as_str()).await
    }

    /// Large bridge transactions on a chain
    #[instrument(skip(self))]
    pub async fn large_transactions(&self, chain: &str) -> DashboardResult<Value> {
        let url = self.path_url(&self.config.bridges_base_url, &["largetransactions", chain])?;
        self.get_json(url.as_str()).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn stablecoins_url(&self, include_prices: bool) -> String {
        format!(
            "{}/stablecoins{}",
            self.config.stablecoins_base_url,
            if include_prices { "?includePrices=true" } else { "" }
        )
    }

    fn charts_url(&self, chain: Option<&str>) -> String {
        format!(
            "{}/stablecoincharts/{}",
            self.config.stablecoins_base_url,
            chain.unwrap_or("all")
        )
    }

    /// Join percent-encoded path segments onto a base URL
    fn path_url(&self, base: &str, segments: &[&str]) -> DashboardResult<Url> {
        let mut url = Url::parse(base)
            .map_err(|e| DashboardError::config(format!("Invalid base URL {}: {}", base, e)))?;
        url.path_segments_mut()
            .map_err(|_| DashboardError::config(format!("Base URL cannot take a path: {}", base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> DashboardResult<T> {
        debug!("Fetching DefiLlama: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                DashboardError::timeout(format!("Request timeout: {}", url))
            } else {
                DashboardError::network(format!("Failed to fetch {}: {}", url, e))
            }
        })?;

        if response.status().as_u16() == 404 {
            return Err(DashboardError::not_found(url.to_string()));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::api(
                status.as_u16(),
                format!("DefiLlama API error: {}", body),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| DashboardError::parse(format!("Failed to parse DefiLlama response: {}", e)))
    }
}
