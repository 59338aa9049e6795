//! Stablecoin Dashboard API Server
//!
//! HTTP API server that aggregates stablecoin data from DefiLlama, Dune and
//! Artemis, and serves the adjusted-volume breakdown.

mod config;
mod routes;

use anyhow::Context;
use axum::{
    http::{Method, StatusCode},
    Router,
};
use config::AppConfig;
use dashboard_artemis::{ArtemisClient, ArtemisConfig, VolumeAdjustmentEngine, VolumeBreakdownSource};
use dashboard_defillama::{DefiLlamaClient, DefiLlamaConfig};
use dashboard_dune::{DuneClient, DuneConfig};
use dashboard_services::{
    AnalyticsService, BridgeService, ResponseCache, StablecoinService, UserMetricsService,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Shortest interval between sweeps of expired cache entries
const MIN_PURGE_INTERVAL: Duration = Duration::from_secs(1);

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub cache: Arc<ResponseCache>,
    pub stablecoin_service: Arc<StablecoinService>,
    pub bridge_service: Arc<BridgeService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub user_metrics_service: Arc<UserMetricsService>,
    pub volume_engine: Arc<VolumeAdjustmentEngine>,
}

impl AppState {
    /// Build clients and services. Dune and Artemis are only wired in when
    /// their keys are configured.
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let cache = Arc::new(ResponseCache::new(config.cache_ttl));

        let llama = Arc::new(
            DefiLlamaClient::new(DefiLlamaConfig {
                timeout: config.upstream_timeout,
                ..DefiLlamaConfig::default()
            })
            .context("failed to create DefiLlama client")?,
        );

        let dune = match &config.dune_api_key {
            Some(key) => {
                let dune_config = DuneConfig {
                    timeout: config.upstream_timeout,
                    cache_ttl: config.cache_ttl,
                    ..DuneConfig::new(key.clone())
                };
                Some(DuneClient::new(dune_config).context("failed to create Dune client")?)
            }
            None => None,
        };

        let artemis = match &config.artemis_api_key {
            Some(key) => Some(Arc::new(
                ArtemisClient::new(ArtemisConfig::new(key.clone()))
                    .context("failed to create Artemis client")?,
            )),
            None => None,
        };

        let source = artemis
            .clone()
            .map(|client| client as Arc<dyn VolumeBreakdownSource>);
        let volume_engine = VolumeAdjustmentEngine::new(source).with_timeout(config.artemis_timeout);

        Ok(Self {
            config: Arc::new(config.clone()),
            stablecoin_service: Arc::new(StablecoinService::new(llama.clone(), cache.clone())),
            bridge_service: Arc::new(BridgeService::new(llama, cache.clone())),
            analytics_service: Arc::new(AnalyticsService::new(dune)),
            user_metrics_service: Arc::new(UserMetricsService::new(artemis)),
            volume_engine: Arc::new(volume_engine),
            cache,
        })
    }
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    // Configure CORS for frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .nest("/api", routes::api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(cors),
        )
        .with_state(state)
}

/// Turn a handler panic into a 500 with the usual JSON error body
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> axum::response::Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked: {}", detail);
    routes::error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,dashboard_api=debug")),
        )
        .init();

    info!("Starting Stablecoin Dashboard API");

    let config = AppConfig::from_env()?;

    if config.artemis_api_key.is_some() {
        info!("Artemis API key found - adjusted volume uses live data");
    } else {
        info!("No Artemis API key found - adjusted volume uses estimated breakdown");
    }
    if config.dune_api_key.is_none() {
        info!("No Dune API key found - saved query endpoint will be unavailable");
    }

    let state = AppState::new(&config)?;

    // Sweep expired cache entries in the background
    let cache = Arc::clone(&state.cache);
    let purge_every = config.cache_ttl.max(MIN_PURGE_INTERVAL);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(purge_every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let purged = cache.purge_expired();
            if purged > 0 {
                debug!("Purged {} expired cache entries", purged);
            }
        }
    });

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
