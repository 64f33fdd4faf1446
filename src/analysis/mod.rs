//! Aggregation modules.
//!
//! This module hosts the metric collector and the per-age averaging
//! routine shared by all four sub-charts.

pub mod aggregator;

pub use aggregator::*;
