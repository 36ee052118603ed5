//! Technical analysis enrichment.
//!
//! The analysis service is an external collaborator reached through the
//! [`TechnicalAnalysis`] trait. A failed lookup never fails the quote it
//! enriches.
use feed_common::Result;
use serde::{Deserialize, Serialize};

/// Screener region used for US listings.
pub const SCREENER: &str = "america";
/// Candle interval the analysis runs on: daily.
pub const INTERVAL: &str = "1d";

/// Summary of an analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalSummary {
    #[serde(rename = "RECOMMENDATION")]
    pub recommendation: String,
    #[serde(rename = "BUY")]
    pub buy: u32,
    #[serde(rename = "NEUTRAL")]
    pub neutral: u32,
    #[serde(rename = "SELL")]
    pub sell: u32,
}

/// Lookup of an analysis summary for a listing.
pub trait TechnicalAnalysis {
    /// Runs the analysis for `symbol` listed on `exchange`, using the
    /// `screener` region and the candle `interval` (e.g. [`INTERVAL`]).
    fn summary(
        &self,
        symbol: &str,
        screener: &str,
        exchange: &str,
        interval: &str,
    ) -> Result<TechnicalSummary>;
}
