//! Dune Analytics API client
//!
//! Saved queries run asynchronously on Dune: `execute` returns an execution
//! id, which is then polled until it completes or fails. Completed rows are
//! cached for a few minutes, keyed by query id and parameters.

use dashboard_core::{DashboardError, DashboardResult, TtlCache};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

/// Base URL for the Dune API
const DUNE_API_BASE: &str = "https://api.dune.com/api/v1";

/// Saved query ids on Dune
///
/// These are placeholders until the stablecoin queries are published.
pub struct QueryIds;

impl QueryIds {
    pub const STABLECOIN_MINTS: u64 = 3_500_000;
    pub const STABLECOIN_BURNS: u64 = 3_500_001;
    pub const WHALE_TRANSFERS: u64 = 3_500_002;
    pub const ACTIVE_ADDRESSES: u64 = 3_500_003;
    pub const TRANSFER_VOLUME: u64 = 3_500_004;
    pub const PEG_DEVIATIONS: u64 = 3_500_005;
    pub const TOP_HOLDERS: u64 = 3_500_006;
    pub const BLACKLISTED_ADDRESSES: u64 = 3_500_007;
}

/// Lifecycle state of a query execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionState {
    #[serde(rename = "QUERY_STATE_PENDING")]
    Pending,
    #[serde(rename = "QUERY_STATE_EXECUTING")]
    Executing,
    #[serde(rename = "QUERY_STATE_COMPLETED")]
    Completed,
    #[serde(rename = "QUERY_STATE_FAILED")]
    Failed,
    #[serde(other)]
    Unknown,
}

/// Response from POST /query/{id}/execute
#[derive(Debug, Clone, Deserialize)]
struct ExecuteResponse {
    execution_id: String,
}

/// Response from GET /execution/{id}/results
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionResults {
    pub execution_id: String,
    pub state: ExecutionState,
    #[serde(default)]
    pub result: Option<QueryResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub rows: Vec<Value>,
}

/// Connection settings for [`DuneClient`]
#[derive(Debug, Clone)]
pub struct DuneConfig {
    pub api_key: String,
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Delay between result polls
    pub poll_interval: Duration,
    /// Give up waiting for an execution after this long
    pub max_wait: Duration,
    /// How long completed rows stay cached
    pub cache_ttl: Duration,
}

impl DuneConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DUNE_API_BASE.to_string(),
            timeout: Duration::from_secs(15),
            poll_interval: Duration::from_secs(1),
            max_wait: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(300),
        }
    }
}

/// Dune Analytics API client
#[derive(Clone)]
pub struct DuneClient {
    client: Client,
    config: DuneConfig,
    cache: Arc<TtlCache<Vec<Value>>>,
}

impl DuneClient {
    /// Create a new authenticated client
    pub fn new(config: DuneConfig) -> DashboardResult<Self> {
        if config.api_key.is_empty() {
            return Err(DashboardError::config("DUNE_API_KEY not configured"));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DashboardError::internal(format!("Failed to create HTTP client: {}", e)))?;

        let cache = Arc::new(TtlCache::new(config.cache_ttl));

        Ok(Self {
            client,
            config,
            cache,
        })
    }

    /// Execute a saved query and return its execution id
    #[instrument(skip(self, params))]
    pub async fn execute_query(&self, query_id: u64, params: Option<&Value>) -> DashboardResult<String> {
        let url = format!("{}/query/{}/execute", self.config.base_url, query_id);
        debug!("Executing Dune query {}", query_id);

        let mut request = self.client.post(&url).header("X-Dune-API-Key", &self.config.api_key);
        if let Some(params) = params {
            request = request.json(&serde_json::json!({ "query_parameters": params }));
        }

        let response = request.send().await.map_err(map_send_error)?;
        let executed: ExecuteResponse = read_json(response).await?;

        debug!("Dune query {} started execution {}", query_id, executed.execution_id);
        Ok(executed.execution_id)
    }

    /// Fetch the current results of an execution without waiting
    #[instrument(skip(self))]
    pub async fn execution_status(&self, execution_id: &str) -> DashboardResult<ExecutionResults> {
        let url = format!("{}/execution/{}/results", self.config.base_url, execution_id);

        let response = self
            .client
            .get(&url)
            .header("X-Dune-API-Key", &self.config.api_key)
            .send()
            .await
            .map_err(map_send_error)?;

        read_json(response).await
    }

    /// Poll an execution until it completes, fails, or `max_wait` elapses
    #[instrument(skip(self))]
    pub async fn execution_results(&self, execution_id: &str) -> DashboardResult<ExecutionResults> {
        let started = Instant::now();

        while started.elapsed() < self.config.max_wait {
            let results = self.execution_status(execution_id).await?;

            if let Some(settled) = settled(execution_id, results) {
                return settled;
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }

        Err(DashboardError::timeout(format!(
            "Dune execution {} did not complete within {:?}",
            execution_id, self.config.max_wait
        )))
    }

    /// Execute a saved query, wait for it, and return its rows (cached)
    #[instrument(skip(self, params))]
    pub async fn run_query(&self, query_id: u64, params: Option<&Value>) -> DashboardResult<Vec<Value>> {
        let key = cache_key(query_id, params);
        if let Some(rows) = self.cache.get(&key) {
            debug!("Dune query {} served from cache", query_id);
            return Ok(rows);
        }

        let execution_id = self.execute_query(query_id, params).await?;
        let results = self.execution_results(&execution_id).await?;
        let rows = results.result.map(|r| r.rows).unwrap_or_default();

        info!("Dune query {} returned {} rows", query_id, rows.len());
        self.cache.insert(key, rows.clone());
        Ok(rows)
    }
}

/// Outcome of a finished execution, or `None` while it is still running
fn settled(execution_id: &str, results: ExecutionResults) -> Option<DashboardResult<ExecutionResults>> {
    match results.state {
        ExecutionState::Completed => Some(Ok(results)),
        ExecutionState::Failed => Some(Err(DashboardError::internal(format!(
            "Dune execution {} failed",
            execution_id
        )))),
        state => {
            debug!("Dune execution {} is {:?}, polling again", execution_id, state);
            None
        }
    }
}

fn cache_key(query_id: u64, params: Option<&Value>) -> String {
    let params = params.map(Value::to_string).unwrap_or_else(|| "{}".to_string());
    format!("query-{}-{}", query_id, params)
}

fn map_send_error(e: reqwest::Error) -> DashboardError {
    if e.is_timeout() {
        DashboardError::timeout(format!("Dune request timed out: {}", e))
    } else {
        DashboardError::network(format!("Dune request failed: {}", e))
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> DashboardResult<T> {
    let status = response.status();
    if status.as_u16() == 401 || status.as_u16() == 403 {
        return Err(DashboardError::auth(format!("Dune rejected API key ({})", status)));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DashboardError::api(
            status.as_u16(),
            format!("Dune API error: {}", body),
        ));
    }

    response
        .json()
        .await
        .map_err(|e| DashboardError::parse(format!("Failed to parse Dune response: {}", e)))
}
