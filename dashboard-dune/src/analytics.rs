//! On-chain analytics datasets
//!
//! The saved Dune queries behind these datasets are not published yet, so
//! every dataset is generated from plausible baselines with random jitter.
//! Shapes match what the queries will return. Generators take the RNG and
//! the reference time explicitly so they can be exercised deterministically.

use chrono::{DateTime, Duration, Utc};
use dashboard_core::{
    ActiveAddressMetrics, AnalyticsSummary, MintBurnEvent, MintBurnKind, PegStabilityMetrics,
    TopHolder, TransferVolumeMetrics, WhaleTransfer,
};
use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::debug;

const SUPPLY_STABLES: &[&str] = &["USDT", "USDC", "DAI", "USDS"];
const ACTIVITY_STABLES: &[&str] = &["USDT", "USDC", "DAI"];
const SUPPLY_CHAINS: &[&str] = &["Ethereum", "Tron", "BSC", "Solana"];
const WHALE_CHAINS: &[&str] = &["Ethereum", "Tron", "Arbitrum"];

const WHALE_LABELS: &[&str] = &[
    "Binance",
    "Coinbase",
    "Jump Trading",
    "Wintermute",
    "Cumberland",
    "Unknown Wallet",
    "DeFi Protocol",
];

const HOLDER_LABELS: &[&str] = &[
    "Binance",
    "Coinbase Custody",
    "Jump Trading",
    "Wintermute",
    "Cumberland DRW",
    "Tether Treasury",
    "Circle Reserve",
    "MakerDAO",
    "Aave",
    "Compound",
    "Unknown Whale",
    "OKX",
    "Kraken",
    "BitFinex",
];

const WHALE_TRANSFER_COUNT: usize = 50;
const MAX_TOP_HOLDERS: usize = 50;
/// Default lower bound for a whale transfer, in USD
pub const DEFAULT_WHALE_MIN_AMOUNT: f64 = 1_000_000.0;

/// Provider for the on-chain analytics datasets
#[derive(Debug, Clone, Copy, Default)]
pub struct DuneAnalytics;

impl DuneAnalytics {
    pub fn new() -> Self {
        Self
    }

    /// Supply changes (mints and burns), newest first
    pub fn mint_burn_events(&self, stablecoin: Option<&str>, days: u32) -> Vec<MintBurnEvent> {
        mint_burn_events(&mut rand::rng(), Utc::now(), stablecoin, days)
    }

    /// Large transfers of at least `min_amount`, newest first
    pub fn whale_transfers(&self, min_amount: f64, days: u32) -> Vec<WhaleTransfer> {
        whale_transfers(&mut rand::rng(), Utc::now(), min_amount, days)
    }

    /// Daily, weekly and monthly active addresses per stablecoin
    pub fn active_addresses(&self, stablecoin: Option<&str>, days: u32) -> Vec<ActiveAddressMetrics> {
        active_addresses(&mut rand::rng(), Utc::now(), stablecoin, days)
    }

    /// Daily transfer volume per stablecoin
    pub fn transfer_volume(&self, stablecoin: Option<&str>, days: u32) -> Vec<TransferVolumeMetrics> {
        transfer_volume(&mut rand::rng(), Utc::now(), stablecoin, days)
    }

    /// Price samples every 4 hours, newest first
    pub fn peg_stability(&self, stablecoin: Option<&str>, days: u32) -> Vec<PegStabilityMetrics> {
        peg_stability(&mut rand::rng(), Utc::now(), stablecoin, days)
    }

    /// Largest holders of a stablecoin by balance
    pub fn top_holders(&self, stablecoin: &str, limit: usize) -> Vec<TopHolder> {
        top_holders(&mut rand::rng(), Utc::now(), stablecoin, limit)
    }

    /// One-day roll-up across every dataset
    pub fn summary(&self) -> AnalyticsSummary {
        let summary = summarize(
            &self.mint_burn_events(None, 1),
            &self.whale_transfers(DEFAULT_WHALE_MIN_AMOUNT, 1),
            &self.active_addresses(None, 1),
            &self.transfer_volume(None, 1),
            &self.peg_stability(None, 1),
        );
        debug!(
            "Analytics summary: volume={} mints={} burns={}",
            summary.total_daily_volume, summary.daily_mints, summary.daily_burns
        );
        summary
    }
}

// ============================================================================
// Generators
// ============================================================================

fn selected<'a>(stablecoin: Option<&'a str>, defaults: &[&'a str]) -> Vec<&'a str> {
    match stablecoin {
        Some(symbol) => vec![symbol],
        None => defaults.to_vec(),
    }
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, options: &[&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}

fn tx_hash<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("0x{}", hex::encode(rng.random::<[u8; 32]>()))
}

/// Abbreviated address in the `0x1234abcd...` form
fn short_address<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("0x{}...", hex::encode(rng.random::<[u8; 4]>()))
}

/// Jitter `base` uniformly within `[base * low, base * (low + spread))`
fn jitter<R: Rng + ?Sized>(rng: &mut R, base: f64, low: f64, spread: f64) -> f64 {
    base * (low + rng.random::<f64>() * spread)
}

pub fn mint_burn_events<R: Rng + ?Sized>(
    rng: &mut R,
    now: DateTime<Utc>,
    stablecoin: Option<&str>,
    days: u32,
) -> Vec<MintBurnEvent> {
    let stables = selected(stablecoin, SUPPLY_STABLES);
    let mut events = Vec::new();

    for day in 0..days {
        let timestamp = now - Duration::days(i64::from(day));

        for stable in &stables {
            if rng.random::<f64>() <= 0.3 {
                continue;
            }

            let kind = if rng.random::<f64>() > 0.4 {
                MintBurnKind::Mint
            } else {
                MintBurnKind::Burn
            };
            let amount = rng.random_range(10_000_000..510_000_000u64) as f64;
            let issuer = match *stable {
                "USDT" => Some("Tether Treasury".to_string()),
                "USDC" => Some("Circle".to_string()),
                _ => None,
            };

            events.push(MintBurnEvent {
                timestamp,
                stablecoin: stable.to_string(),
                kind,
                amount,
                amount_usd: amount,
                chain: pick(rng, SUPPLY_CHAINS).to_string(),
                tx_hash: tx_hash(rng),
                issuer,
            });
        }
    }

    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    events
}

pub fn whale_transfers<R: Rng + ?Sized>(
    rng: &mut R,
    now: DateTime<Utc>,
    min_amount: f64,
    days: u32,
) -> Vec<WhaleTransfer> {
    let mut transfers: Vec<WhaleTransfer> = (0..WHALE_TRANSFER_COUNT)
        .map(|_| {
            let days_ago = rng.random_range(0..days.max(1));
            let amount = (rng.random::<f64>() * 50_000_000.0).floor() + min_amount;

            WhaleTransfer {
                timestamp: now - Duration::days(i64::from(days_ago)),
                stablecoin: pick(rng, ACTIVITY_STABLES).to_string(),
                from_address: short_address(rng),
                to_address: short_address(rng),
                from_label: Some(pick(rng, WHALE_LABELS).to_string()),
                to_label: Some(pick(rng, WHALE_LABELS).to_string()),
                amount,
                amount_usd: amount,
                chain: pick(rng, WHALE_CHAINS).to_string(),
                tx_hash: tx_hash(rng),
            }
        })
        .collect();

    transfers.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    transfers
}

pub fn active_addresses<R: Rng + ?Sized>(
    rng: &mut R,
    now: DateTime<Utc>,
    stablecoin: Option<&str>,
    days: u32,
) -> Vec<ActiveAddressMetrics> {
    let stables = selected(stablecoin, ACTIVITY_STABLES);
    let mut rows = Vec::with_capacity(days as usize * stables.len());

    for day in 0..days {
        let date = (now - Duration::days(i64::from(day))).date_naive();

        for stable in &stables {
            let base_daily = match *stable {
                "USDT" => 800_000.0,
                "USDC" => 400_000.0,
                _ => 50_000.0,
            };

            rows.push(ActiveAddressMetrics {
                date,
                stablecoin: stable.to_string(),
                daily_active: jitter(rng, base_daily, 0.9, 0.2) as u64,
                weekly_active: jitter(rng, base_daily * 3.0, 0.9, 0.2) as u64,
                monthly_active: jitter(rng, base_daily * 8.0, 0.9, 0.2) as u64,
                new_addresses: jitter(rng, base_daily * 0.05, 0.8, 0.4) as u64,
                chain: "all".to_string(),
            });
        }
    }

    rows
}

pub fn transfer_volume<R: Rng + ?Sized>(
    rng: &mut R,
    now: DateTime<Utc>,
    stablecoin: Option<&str>,
    days: u32,
) -> Vec<TransferVolumeMetrics> {
    let stables = selected(stablecoin, ACTIVITY_STABLES);
    let mut rows = Vec::with_capacity(days as usize * stables.len());

    for day in 0..days {
        let date = (now - Duration::days(i64::from(day))).date_naive();

        for stable in &stables {
            let base_volume = match *stable {
                "USDT" => 50_000_000_000.0,
                "USDC" => 30_000_000_000.0,
                _ => 2_000_000_000.0,
            };
            let volume = jitter(rng, base_volume, 0.7, 0.6).floor();
            let tx_count = ((volume / 50_000.0) as u64).max(1);
            let avg_tx_size = (volume / tx_count as f64).floor();

            rows.push(TransferVolumeMetrics {
                date,
                stablecoin: stable.to_string(),
                volume,
                tx_count,
                avg_tx_size,
                median_tx_size: (volume / tx_count as f64 * 0.3).floor(),
                chain: "all".to_string(),
            });
        }
    }

    rows
}

pub fn peg_stability<R: Rng + ?Sized>(
    rng: &mut R,
    now: DateTime<Utc>,
    stablecoin: Option<&str>,
    days: u32,
) -> Vec<PegStabilityMetrics> {
    let stables = selected(stablecoin, SUPPLY_STABLES);
    let mut rows = Vec::new();

    for hours_ago in (0..days * 24).step_by(4) {
        let timestamp = now - Duration::hours(i64::from(hours_ago));

        for stable in &stables {
            let base_deviation = if *stable == "DAI" { 0.002 } else { 0.0005 };
            let price = 1.0 + (rng.random::<f64>() - 0.5) * base_deviation * 2.0;

            rows.push(PegStabilityMetrics {
                timestamp,
                stablecoin: stable.to_string(),
                price,
                deviation: (price - 1.0) * 100.0,
                source: "CoinGecko".to_string(),
            });
        }
    }

    rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    rows
}

pub fn top_holders<R: Rng + ?Sized>(
    rng: &mut R,
    now: DateTime<Utc>,
    stablecoin: &str,
    limit: usize,
) -> Vec<TopHolder> {
    let total_supply = match stablecoin {
        "USDT" => 140_000_000_000.0,
        "USDC" => 50_000_000_000.0,
        _ => 5_000_000_000.0,
    };
    let mut remaining_percent = 100.0_f64;
    let mut holders = Vec::with_capacity(limit.min(MAX_TOP_HOLDERS));

    for rank in 0..limit.min(MAX_TOP_HOLDERS) {
        let drawn = if rank < 5 {
            rng.random::<f64>() * 5.0 + 2.0
        } else {
            rng.random::<f64>() * 2.0
        };
        let percent = drawn.min(remaining_percent);
        remaining_percent -= percent;

        let balance = (total_supply * percent / 100.0).floor();
        let idle_secs = rng.random_range(0..7 * 24 * 60 * 60);

        holders.push(TopHolder {
            address: format!(
                "0x{}...{}",
                hex::encode(rng.random::<[u8; 4]>()),
                hex::encode(rng.random::<[u8; 2]>())
            ),
            label: HOLDER_LABELS.get(rank).map(|label| label.to_string()),
            balance,
            balance_usd: balance,
            percent_of_supply: percent,
            stablecoin: stablecoin.to_string(),
            chain: "Ethereum".to_string(),
            last_activity: now - Duration::seconds(idle_secs),
        });
    }

    holders.sort_by(|a, b| b.balance.total_cmp(&a.balance));
    holders
}

/// Roll the one-day datasets up into an [`AnalyticsSummary`]
pub fn summarize(
    supply_events: &[MintBurnEvent],
    whales: &[WhaleTransfer],
    addresses: &[ActiveAddressMetrics],
    volume: &[TransferVolumeMetrics],
    peg: &[PegStabilityMetrics],
) -> AnalyticsSummary {
    let total_of = |kind: MintBurnKind| -> f64 {
        supply_events
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.amount_usd)
            .sum()
    };
    let daily_mints = total_of(MintBurnKind::Mint);
    let daily_burns = total_of(MintBurnKind::Burn);

    let avg_peg_deviation = if peg.is_empty() {
        0.0
    } else {
        peg.iter().map(|p| p.deviation.abs()).sum::<f64>() / peg.len() as f64
    };

    AnalyticsSummary {
        total_daily_volume: volume.iter().map(|v| v.volume).sum(),
        daily_active_addresses: addresses.iter().map(|a| a.daily_active).sum(),
        daily_mints,
        daily_burns,
        net_supply_change: daily_mints - daily_burns,
        large_transfers_24h: whales.len(),
        avg_peg_deviation,
    }
}
