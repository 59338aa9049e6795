//! On-chain analytics backed by Dune

use dashboard_core::{
    ActiveAddressMetrics, AnalyticsSummary, DashboardError, DashboardResult, MintBurnEvent,
    PegStabilityMetrics, TopHolder, TransferVolumeMetrics, WhaleTransfer,
};
use dashboard_dune::{DuneAnalytics, DuneClient};
use serde_json::Value;
use tracing::{info, instrument};

/// Service for the on-chain analytics datasets and saved Dune queries
pub struct AnalyticsService {
    datasets: DuneAnalytics,
    client: Option<DuneClient>,
}

impl AnalyticsService {
    /// `client` is only needed to run saved queries directly
    pub fn new(client: Option<DuneClient>) -> Self {
        Self {
            datasets: DuneAnalytics::new(),
            client,
        }
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    pub fn mint_burn_events(&self, stablecoin: Option<&str>, days: u32) -> Vec<MintBurnEvent> {
        self.datasets.mint_burn_events(stablecoin, days)
    }

    pub fn whale_transfers(&self, min_amount: f64, days: u32) -> Vec<WhaleTransfer> {
        self.datasets.whale_transfers(min_amount, days)
    }

    pub fn active_addresses(&self, stablecoin: Option<&str>, days: u32) -> Vec<ActiveAddressMetrics> {
        self.datasets.active_addresses(stablecoin, days)
    }

    pub fn transfer_volume(&self, stablecoin: Option<&str>, days: u32) -> Vec<TransferVolumeMetrics> {
        self.datasets.transfer_volume(stablecoin, days)
    }

    pub fn peg_stability(&self, stablecoin: Option<&str>, days: u32) -> Vec<PegStabilityMetrics> {
        self.datasets.peg_stability(stablecoin, days)
    }

    pub fn top_holders(&self, stablecoin: &str, limit: usize) -> Vec<TopHolder> {
        self.datasets.top_holders(stablecoin, limit)
    }

    pub fn summary(&self) -> AnalyticsSummary {
        self.datasets.summary()
    }

    /// Execute a saved Dune query and return its rows
    #[instrument(skip(self, params))]
    pub async fn run_saved_query(&self, query_id: u64, params: Option<&Value>) -> DashboardResult<Vec<Value>> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| DashboardError::config("DUNE_API_KEY not configured"))?;

        let rows = client.run_query(query_id, params).await?;
        info!("Saved query {} returned {} rows", query_id, rows.len());
        Ok(rows)
    }
}
