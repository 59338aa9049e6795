//! Volume adjustment engine
//!
//! Converts a raw stablecoin transfer volume into a payments-focused
//! breakdown. With a breakdown source configured, the provider's one-day
//! ratios are scaled onto the caller's raw figure. Without one, or whenever
//! the live path fails, fixed research-derived percentages are applied.
//!
//! The engine never fails: every error on the live path is logged and the
//! estimated breakdown is returned in its place.

use crate::error::{ArtemisError, ArtemisResult};
use crate::types::ProviderVolumeBreakdown;
use async_trait::async_trait;
use chrono::Utc;
use dashboard_core::{AdjustedVolumeMetrics, BreakdownEntry, VolumeSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default deadline for the live provider call
pub const DEFAULT_LIVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Window, in days, of the provider breakdown used for scaling
const LIVE_WINDOW_DAYS: u32 = 1;

/// Estimated share of raw volume per category, in percent (sums to 100)
pub const ESTIMATED_BREAKDOWN: &[(&str, f64)] = &[
    ("CEX Activity", 28.0),
    ("DeFi/DEX", 22.0),
    ("Bridges", 8.0),
    ("B2B Payments", 18.0),
    ("P2P Transfers", 10.0),
    ("P2B/B2P", 10.0),
    ("Other/Unknown", 4.0),
];

const ESTIMATED_ADJUSTED_RATIO: f64 = 0.42;
const ESTIMATED_PAYMENTS_RATIO: f64 = 0.38;
const ESTIMATED_P2P_RATIO: f64 = 0.10;

const LIVE_METHODOLOGY: &str = "Artemis labeled wallet data: ARTEMIS_STABLECOIN_TRANSFER_VOLUME excludes CEX internal transfers and MEV. P2P_STABLECOIN_TRANSFER_VOLUME tracks EOA-to-EOA transfers.";
const ESTIMATED_METHODOLOGY: &str = "Estimated based on Visa/Allium & Artemis 2025 research. Add ARTEMIS_API_KEY for real labeled data.";

/// Provider of aggregate raw/adjusted/P2P volume totals
#[async_trait]
pub trait VolumeBreakdownSource: Send + Sync {
    /// Totals across every stablecoin and chain over the last `days` days
    async fn fetch_volume_breakdown(&self, days: u32) -> ArtemisResult<ProviderVolumeBreakdown>;

    /// Short name used in logs
    fn name(&self) -> &'static str {
        "breakdown-source"
    }
}

/// Turns raw transfer volume into [`AdjustedVolumeMetrics`]
#[derive(Clone)]
pub struct VolumeAdjustmentEngine {
    source: Option<Arc<dyn VolumeBreakdownSource>>,
    timeout: Duration,
}

impl VolumeAdjustmentEngine {
    /// Create an engine; `None` always uses the estimated breakdown
    pub fn new(source: Option<Arc<dyn VolumeBreakdownSource>>) -> Self {
        Self {
            source,
            timeout: DEFAULT_LIVE_TIMEOUT,
        }
    }

    /// Engine that never calls a provider
    pub fn estimated_only() -> Self {
        Self::new(None)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether a live provider is configured
    pub fn is_live(&self) -> bool {
        self.source.is_some()
    }

    /// Adjusted-volume breakdown for `raw_volume`
    ///
    /// Callers validate that `raw_volume` is positive; the engine itself
    /// accepts any value and reports zero percentages for a zero raw volume.
    #[instrument(skip(self))]
    pub async fn calculate_adjusted_volume(&self, raw_volume: f64) -> AdjustedVolumeMetrics {
        if self.source.is_none() {
            return estimate(raw_volume);
        }

        self.try_live(raw_volume).await.unwrap_or_else(|e| {
            warn!("Live volume breakdown unavailable, using estimates: {}", e);
            estimate(raw_volume)
        })
    }

    /// Live path: fetch the provider breakdown under the deadline and scale it
    pub async fn try_live(&self, raw_volume: f64) -> ArtemisResult<AdjustedVolumeMetrics> {
        let source = self.source.as_ref().ok_or(ArtemisError::MissingApiKey)?;

        let provider = tokio::time::timeout(
            self.timeout,
            source.fetch_volume_breakdown(LIVE_WINDOW_DAYS),
        )
        .await
        .map_err(|_| ArtemisError::Timeout(self.timeout))??;

        debug!(
            "{} breakdown: raw={} adjusted={} p2p={}",
            source.name(),
            provider.raw_volume,
            provider.adjusted_volume,
            provider.p2p_volume
        );

        scale_breakdown(raw_volume, &provider)
    }
}

impl Default for VolumeAdjustmentEngine {
    fn default() -> Self {
        Self::estimated_only()
    }
}

/// Scale a provider breakdown onto `raw_volume`
///
/// The provider's raw total must be positive and finite. Payments are not
/// clamped to the adjusted volume.
pub fn scale_breakdown(
    raw_volume: f64,
    provider: &ProviderVolumeBreakdown,
) -> ArtemisResult<AdjustedVolumeMetrics> {
    if !(provider.raw_volume.is_finite() && provider.raw_volume > 0.0) {
        return Err(ArtemisError::DegenerateBreakdown(provider.raw_volume));
    }

    let scale = raw_volume / provider.raw_volume;
    let adjusted_volume = provider.adjusted_volume * scale;
    let p2p_volume = provider.p2p_volume * scale;
    let scaled = ProviderVolumeBreakdown::new(raw_volume, adjusted_volume, p2p_volume);
    let payments_volume = scaled.payments_volume();

    let breakdown = vec![
        BreakdownEntry::of_raw("CEX Activity", scaled.cex_volume(), raw_volume),
        BreakdownEntry::of_raw("DeFi/DEX", scaled.defi_volume(), raw_volume),
        BreakdownEntry::of_raw("P2P Transfers", p2p_volume, raw_volume),
        BreakdownEntry::of_raw("B2B Payments", payments_volume - p2p_volume, raw_volume),
    ];

    Ok(AdjustedVolumeMetrics {
        raw_volume,
        adjusted_volume,
        payments_volume,
        p2p_volume,
        breakdown,
        source: VolumeSource::Artemis,
        methodology: LIVE_METHODOLOGY.to_string(),
        last_updated: Utc::now(),
    })
}

/// Static path: fixed percentages of `raw_volume`
pub fn estimate(raw_volume: f64) -> AdjustedVolumeMetrics {
    let breakdown = ESTIMATED_BREAKDOWN
        .iter()
        .map(|(category, percentage)| BreakdownEntry {
            category: category.to_string(),
            volume: raw_volume * percentage / 100.0,
            percentage: if raw_volume == 0.0 { 0.0 } else { *percentage },
        })
        .collect();

    AdjustedVolumeMetrics {
        raw_volume,
        adjusted_volume: raw_volume * ESTIMATED_ADJUSTED_RATIO,
        payments_volume: raw_volume * ESTIMATED_PAYMENTS_RATIO,
        p2p_volume: raw_volume * ESTIMATED_P2P_RATIO,
        breakdown,
        source: VolumeSource::Estimated,
        methodology: ESTIMATED_METHODOLOGY.to_string(),
        last_updated: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::DashboardError;
    use pretty_assertions::assert_eq;

    const EPSILON: f64 = 1e-6;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    struct FixedSource(ProviderVolumeBreakdown);

    #[async_trait]
    impl VolumeBreakdownSource for FixedSource {
        async fn fetch_volume_breakdown(&self, _days: u32) -> ArtemisResult<ProviderVolumeBreakdown> {
            Ok(self.0)
        }
    }

    struct FailingSource;

    #[async_trait]
    impl VolumeBreakdownSource for FailingSource {
        async fn fetch_volume_breakdown(&self, _days: u32) -> ArtemisResult<ProviderVolumeBreakdown> {
            Err(DashboardError::api(500, "boom").into())
        }
    }

    struct SlowSource;

    #[async_trait]
    impl VolumeBreakdownSource for SlowSource {
        async fn fetch_volume_breakdown(&self, _days: u32) -> ArtemisResult<ProviderVolumeBreakdown> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ProviderVolumeBreakdown::new(1000.0, 650.0, 250.0))
        }
    }

    fn engine_with(source: impl VolumeBreakdownSource + 'static) -> VolumeAdjustmentEngine {
        VolumeAdjustmentEngine::new(Some(Arc::new(source)))
    }

    /// Everything but the generation timestamp
    fn without_timestamp(metrics: &AdjustedVolumeMetrics) -> AdjustedVolumeMetrics {
        AdjustedVolumeMetrics {
            last_updated: chrono::DateTime::<Utc>::MIN_UTC,
            ..metrics.clone()
        }
    }

    #[tokio::test]
    async fn test_estimated_breakdown_for_1000() {
        let metrics = VolumeAdjustmentEngine::estimated_only()
            .calculate_adjusted_volume(1000.0)
            .await;

        assert_eq!(metrics.source, VolumeSource::Estimated);
        assert_eq!(metrics.raw_volume, 1000.0);
        assert_close(metrics.adjusted_volume, 420.0);
        assert_close(metrics.payments_volume, 380.0);
        assert_close(metrics.p2p_volume, 100.0);

        let categories: Vec<&str> = metrics.breakdown.iter().map(|b| b.category.as_str()).collect();
        assert_eq!(
            categories,
            vec![
                "CEX Activity",
                "DeFi/DEX",
                "Bridges",
                "B2B Payments",
                "P2P Transfers",
                "P2B/B2P",
                "Other/Unknown"
            ]
        );
        assert_close(metrics.category("CEX Activity").unwrap().volume, 280.0);
        assert_close(metrics.category("Other/Unknown").unwrap().volume, 40.0);
    }

    #[tokio::test]
    async fn test_raw_volume_echoed_on_both_paths() {
        let live = engine_with(FixedSource(ProviderVolumeBreakdown::new(500.0, 325.0, 125.0)));
        let estimated = VolumeAdjustmentEngine::estimated_only();

        for raw in [0.01, 1.0, 1234.5678, 9.9e12] {
            assert_eq!(live.calculate_adjusted_volume(raw).await.raw_volume, raw);
            assert_eq!(estimated.calculate_adjusted_volume(raw).await.raw_volume, raw);
        }
    }

    #[test]
    fn test_estimated_percentages_sum_to_100() {
        assert_eq!(estimate(123_456.0).total_percentage(), 100.0);
        assert_eq!(ESTIMATED_BREAKDOWN.iter().map(|(_, p)| p).sum::<f64>(), 100.0);
    }

    #[test]
    fn test_estimated_volumes_match_percentages_exactly() {
        let raw = 7_919_191_919.37;
        for entry in &estimate(raw).breakdown {
            assert_eq!(entry.volume, raw * entry.percentage / 100.0);
        }
    }

    #[test]
    fn test_estimated_zero_raw_has_no_nan() {
        let metrics = estimate(0.0);
        assert!(metrics.breakdown.iter().all(|b| b.volume == 0.0 && b.percentage == 0.0));
        assert!(serde_json::to_string(&metrics).is_ok());
    }

    #[tokio::test]
    async fn test_live_breakdown_scaled_to_raw_volume() {
        let engine = engine_with(FixedSource(ProviderVolumeBreakdown::new(500.0, 325.0, 125.0)));
        let metrics = engine.calculate_adjusted_volume(1000.0).await;

        assert_eq!(metrics.source, VolumeSource::Artemis);
        assert_eq!(metrics.raw_volume, 1000.0);
        assert_close(metrics.adjusted_volume, 650.0);
        assert_close(metrics.p2p_volume, 250.0);
        assert_close(metrics.payments_volume, 570.0);

        let entries: Vec<(&str, f64)> = metrics
            .breakdown
            .iter()
            .map(|b| (b.category.as_str(), b.volume))
            .collect();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].0, "CEX Activity");
        assert_close(entries[0].1, 350.0);
        assert_eq!(entries[1].0, "DeFi/DEX");
        assert_close(entries[1].1, 400.0);
        assert_eq!(entries[2].0, "P2P Transfers");
        assert_close(entries[2].1, 250.0);
        assert_eq!(entries[3].0, "B2B Payments");
        assert_close(entries[3].1, 320.0);
        assert_close(metrics.category("CEX Activity").unwrap().percentage, 35.0);
    }

    #[tokio::test]
    async fn test_live_categories_partition_raw_volume() {
        let engine = engine_with(FixedSource(ProviderVolumeBreakdown::new(82e9, 53.3e9, 20.5e9)));
        let metrics = engine.calculate_adjusted_volume(10e9).await;

        let cex = metrics.category("CEX Activity").unwrap().volume;
        let defi = metrics.category("DeFi/DEX").unwrap().volume;
        let p2p = metrics.category("P2P Transfers").unwrap().volume;
        assert!((cex + defi + p2p - metrics.raw_volume).abs() / metrics.raw_volume < 1e-12);
    }

    #[tokio::test]
    async fn test_failing_source_falls_back_to_estimates() {
        let live = engine_with(FailingSource).calculate_adjusted_volume(1000.0).await;
        let estimated = estimate(1000.0);

        assert_eq!(live.source, VolumeSource::Estimated);
        assert_eq!(without_timestamp(&live), without_timestamp(&estimated));
    }

    #[tokio::test]
    async fn test_zero_provider_raw_falls_back() {
        let engine = engine_with(FixedSource(ProviderVolumeBreakdown::new(0.0, 0.0, 0.0)));

        assert_eq!(
            engine.try_live(1000.0).await.unwrap_err(),
            ArtemisError::DegenerateBreakdown(0.0)
        );
        let metrics = engine.calculate_adjusted_volume(1000.0).await;
        assert_eq!(metrics.source, VolumeSource::Estimated);
        assert!(metrics.adjusted_volume.is_finite());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_source_times_out() {
        let engine = engine_with(SlowSource).with_timeout(Duration::from_millis(50));

        assert_eq!(
            engine.try_live(1000.0).await.unwrap_err(),
            ArtemisError::Timeout(Duration::from_millis(50))
        );
        let metrics = engine.calculate_adjusted_volume(1000.0).await;
        assert_eq!(metrics.source, VolumeSource::Estimated);
    }

    #[tokio::test]
    async fn test_same_input_same_output() {
        let engine = engine_with(FixedSource(ProviderVolumeBreakdown::new(500.0, 325.0, 125.0)));
        let first = engine.calculate_adjusted_volume(2500.0).await;
        let second = engine.calculate_adjusted_volume(2500.0).await;
        assert_eq!(without_timestamp(&first), without_timestamp(&second));
    }

    #[test]
    fn test_payments_not_clamped_to_adjusted() {
        // Provider reports more P2P than adjusted volume
        let metrics =
            scale_breakdown(100.0, &ProviderVolumeBreakdown::new(100.0, 10.0, 40.0)).unwrap();
        assert!(metrics.payments_volume > metrics.adjusted_volume);
        assert!(metrics.category("DeFi/DEX").unwrap().volume < 0.0);
    }

    #[test]
    fn test_default_engine_is_estimated_only() {
        let engine = VolumeAdjustmentEngine::default();
        assert!(!engine.is_live());
        assert_eq!(engine.timeout(), DEFAULT_LIVE_TIMEOUT);
    }
}
