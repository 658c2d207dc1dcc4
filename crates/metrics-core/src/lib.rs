//! Shared domain types for the Copilot metrics analyzer.
//!
//! Holds the input record model, the model classification catalog, date-range
//! filters, rounding helpers, CLI settings and the crate-wide error type.

pub mod calculations;
pub mod date_filter;
pub mod error;
pub mod formatting;
pub mod model_catalog;
pub mod models;
pub mod settings;
