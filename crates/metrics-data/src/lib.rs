//! Ingestion and aggregation layer for Copilot usage metrics.
//!
//! Reads JSONL exports into [`metrics_core::models::MetricRecord`]s and
//! reduces them in one pass into engagement, adoption, language, model/PRU
//! and impact report series.

pub mod aggregator;
pub mod calculators;
pub mod reader;

pub use metrics_core as core;
