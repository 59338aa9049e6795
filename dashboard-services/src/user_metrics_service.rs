//! Stablecoin user activity from Artemis
//!
//! Without an Artemis key, or when a live call fails, the series come from
//! the deterministic mock metrics so the dashboard still renders.

use chrono::{NaiveDate, Utc};
use dashboard_artemis::mock::mock_stablecoin_metrics;
use dashboard_artemis::{ArtemisClient, StablecoinMetrics};
use dashboard_core::volume::percentage_of;
use dashboard_core::{DatedValue, UserMetrics};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Furthest back a date-range series reaches, counting today
pub const MAX_LOOKBACK_DAYS: u32 = 365;

/// Service for daily active users and transaction series
pub struct UserMetricsService {
    client: Option<Arc<ArtemisClient>>,
}

impl UserMetricsService {
    pub fn new(client: Option<Arc<ArtemisClient>>) -> Self {
        Self { client }
    }

    pub fn is_live(&self) -> bool {
        self.client.is_some()
    }

    /// Metric rows for `symbol` over the last `days` days
    async fn metrics(&self, symbol: &str, days: u32, today: NaiveDate) -> Vec<StablecoinMetrics> {
        if let Some(client) = &self.client {
            match client.fetch_stablecoin_metrics(None, None, days).await {
                Ok(rows) => {
                    return rows
                        .into_iter()
                        .filter(|row| row.symbol.eq_ignore_ascii_case(symbol))
                        .collect()
                }
                Err(e) => warn!("Artemis metrics unavailable for {}, using mock data: {}", symbol, e),
            }
        }

        mock_stablecoin_metrics(Some(&symbol.to_uppercase()), None, days, today)
    }

    /// Rows covering `start..=end`, fetched relative to today
    ///
    /// Only the last [`MAX_LOOKBACK_DAYS`] days are fetched; older dates in
    /// the range yield no rows.
    async fn metrics_between(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<StablecoinMetrics> {
        let today = Utc::now().date_naive();
        let days = lookback_days(start, end, today);
        if days == 0 {
            return Vec::new();
        }

        self.metrics(symbol, days, today)
            .await
            .into_iter()
            .filter(|row| row.date >= start && row.date <= end)
            .collect()
    }

    /// Daily active users between two dates, oldest first
    #[instrument(skip(self))]
    pub async fn dau(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<DatedValue> {
        let rows = self.metrics_between(symbol, start, end).await;
        daily_series(&rows, |row| row.dau)
    }

    /// Daily transaction counts between two dates, oldest first
    #[instrument(skip(self))]
    pub async fn daily_txns(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<DatedValue> {
        let rows = self.metrics_between(symbol, start, end).await;
        daily_series(&rows, |row| row.daily_txns)
    }

    /// Activity summary over the last `days` days
    #[instrument(skip(self))]
    pub async fn user_metrics(&self, symbol: &str, days: u32) -> UserMetrics {
        let rows = self.metrics(symbol, days, Utc::now().date_naive()).await;
        build_user_metrics(symbol, days, &rows)
    }
}

/// Days to fetch, ending today, so that `start..=end` is covered as far as
/// the lookback cap allows. Zero when nothing in range can be fetched.
pub fn lookback_days(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> u32 {
    if start > end || (today - end).num_days() >= i64::from(MAX_LOOKBACK_DAYS) {
        return 0;
    }
    let wanted = (today - start).num_days().max(0) + 1;
    u32::try_from(wanted).map_or(MAX_LOOKBACK_DAYS, |days| days.min(MAX_LOOKBACK_DAYS))
}

/// Sum a per-row value across chains for each date, oldest first
pub fn daily_series(rows: &[StablecoinMetrics], value: impl Fn(&StablecoinMetrics) -> f64) -> Vec<DatedValue> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in rows {
        *by_date.entry(row.date).or_insert(0.0) += value(row);
    }

    by_date
        .into_iter()
        .map(|(date, value)| DatedValue { date, value })
        .collect()
}

pub fn build_user_metrics(symbol: &str, days: u32, rows: &[StablecoinMetrics]) -> UserMetrics {
    let dau = daily_series(rows, |row| row.dau);
    let daily_txns = daily_series(rows, |row| row.daily_txns);

    let avg_dau = if dau.is_empty() {
        0.0
    } else {
        dau.iter().map(|d| d.value).sum::<f64>() / dau.len() as f64
    };

    let raw_volume: f64 = rows.iter().map(|r| r.transfer_volume).sum();
    let p2p_volume: f64 = rows.iter().map(|r| r.p2p_transfer_volume).sum();

    UserMetrics {
        symbol: symbol.to_uppercase(),
        days,
        avg_dau,
        latest_dau: dau.last().map(|d| d.value).unwrap_or(0.0),
        total_txns: daily_txns.iter().map(|d| d.value).sum(),
        p2p_volume_share: percentage_of(p2p_volume, raw_volume),
        dau,
        daily_txns,
    }
}
