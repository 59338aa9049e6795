//! DefiLlama integration for the Stablecoin Dashboard
//!
//! This crate provides a client for the public DefiLlama stablecoins and
//! bridges APIs. Responses are decoded into the subset of fields the
//! dashboard reshapes; everything else is passed through as JSON.

pub mod client;
pub mod types;

pub use client::{DefiLlamaClient, DefiLlamaConfig};
pub use types::{
    BridgesResponse, ChainCirculatingEntry, LlamaBridge, PeggedAmount, PeggedAsset,
    StablecoinChartRow, StablecoinsResponse,
};
