//! Artemis integration for the Stablecoin Dashboard
//!
//! This crate provides:
//! - An Artemis API client for labeled-wallet stablecoin metrics
//! - Known exchange, DEX and bridge address tables
//! - The volume adjustment engine, which turns a raw transfer volume into a
//!   payments-focused breakdown using live Artemis data or fixed estimates
//! - Deterministic mock metrics for when no Artemis key is configured

pub mod addresses;
pub mod client;
pub mod error;
pub mod mock;
pub mod types;
pub mod volume;

pub use addresses::{classify_address, excluded_addresses, AddressCategory};
pub use client::{ArtemisClient, ArtemisConfig};
pub use error::{ArtemisError, ArtemisResult};
pub use types::{ProviderVolumeBreakdown, StablecoinMetrics};
pub use volume::{VolumeAdjustmentEngine, VolumeBreakdownSource};
