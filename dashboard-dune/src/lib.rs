//! Dune Analytics integration for the Stablecoin Dashboard
//!
//! This crate provides:
//! - `DuneClient`: executes saved Dune queries and polls for their results
//! - `DuneAnalytics`: the stablecoin activity datasets served to the
//!   dashboard (supply events, whale transfers, activity, peg stability,
//!   holders). Until the saved queries in [`QueryIds`] exist on Dune these
//!   are generated locally.

pub mod analytics;
pub mod client;

pub use analytics::DuneAnalytics;
pub use client::{DuneClient, DuneConfig, ExecutionState, QueryIds};
