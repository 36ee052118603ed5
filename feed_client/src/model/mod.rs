//! Data model produced by the sessions.
//!
//! - `quote` — typed quote built from accumulated field updates.
//! - `chart` — chart bars and the trading-day filter.
pub mod chart;
pub mod quote;
