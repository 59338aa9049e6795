//! Artemis API client
//!
//! Artemis labels wallets (exchanges, MEV bots, contracts) and publishes
//! stablecoin transfer volume with and without that activity. The client
//! performs no fallback of its own; callers decide what to do on error.

use crate::error::{ArtemisError, ArtemisResult};
use crate::types::{MetricsResponse, ProviderVolumeBreakdown, StablecoinMetrics};
use crate::volume::VolumeBreakdownSource;
use async_trait::async_trait;
use dashboard_core::DashboardError;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

/// Base URL for the Artemis API
const ARTEMIS_API_BASE: &str = "https://api.artemisanalytics.com";

const METRICS_PATH: &str = "/data/stablecoin/metrics";

/// Connection settings for [`ArtemisClient`]
#[derive(Debug, Clone)]
pub struct ArtemisConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ArtemisConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: ARTEMIS_API_BASE.to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Artemis API client
#[derive(Clone)]
pub struct ArtemisClient {
    client: Client,
    config: ArtemisConfig,
}

impl ArtemisClient {
    /// Create a new authenticated client
    pub fn new(config: ArtemisConfig) -> ArtemisResult<Self> {
        if config.api_key.is_empty() {
            return Err(ArtemisError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                DashboardError::internal(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    /// Daily metrics, optionally narrowed to one stablecoin on one chain
    ///
    /// Artemis identifies an asset as `{symbol}-{chain}` in lower case, so the
    /// filter only applies when both are given.
    #[instrument(skip(self))]
    pub async fn fetch_stablecoin_metrics(
        &self,
        symbol: Option<&str>,
        chain: Option<&str>,
        days: u32,
    ) -> ArtemisResult<Vec<StablecoinMetrics>> {
        let url = self.metrics_url(symbol, chain, days)?;
        debug!("Fetching Artemis: {}", url);

        let response = self
            .client
            .get(url.as_str())
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DashboardError::timeout(format!("Artemis request timed out: {}", e))
                } else {
                    DashboardError::network(format!("Artemis request failed: {}", e))
                }
            })?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(DashboardError::auth(format!("Artemis rejected API key ({})", status)).into());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::api(status.as_u16(), format!("Artemis API error: {}", body)).into());
        }

        let parsed: MetricsResponse = response.json().await.map_err(|e| {
            DashboardError::parse(format!("Failed to parse Artemis response: {}", e))
        })?;

        info!("Fetched {} Artemis metric rows", parsed.data.len());
        Ok(parsed.data)
    }

    fn metrics_url(&self, symbol: Option<&str>, chain: Option<&str>, days: u32) -> ArtemisResult<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .and_then(|base| base.join(METRICS_PATH))
            .map_err(|e| ArtemisError::InvalidUrl(format!("{}: {}", self.config.base_url, e)))?;

        {
            let mut query = url.query_pairs_mut();
            if let (Some(symbol), Some(chain)) = (symbol, chain) {
                query.append_pair("asset", &asset_id(symbol, chain));
            }
            query.append_pair("days", &days.to_string());
        }

        Ok(url)
    }
}

/// Artemis asset identifier, e.g. `usdc-ethereum`
pub fn asset_id(symbol: &str, chain: &str) -> String {
    format!("{}-{}", symbol.to_lowercase(), chain.to_lowercase())
}

#[async_trait]
impl VolumeBreakdownSource for ArtemisClient {
    async fn fetch_volume_breakdown(&self, days: u32) -> ArtemisResult<ProviderVolumeBreakdown> {
        let rows = self.fetch_stablecoin_metrics(None, None, days).await?;
        Ok(ProviderVolumeBreakdown::from_metrics(&rows))
    }

    fn name(&self) -> &'static str {
        "artemis"
    }
}
