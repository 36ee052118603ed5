//! One complete symbol lookup: quote, optional chart, close.
//!
//! This is the sequence callers run per symbol. The quote decides the outcome;
//! a chart that cannot be fetched or drawn is logged and left out.
use std::path::PathBuf;

use feed_common::Result;
use log::warn;

use crate::connection::Connection;
use crate::model::quote::Quote;
use crate::render::render_chart;
use crate::technicals::TechnicalAnalysis;
use crate::transport::{Transport, WsTransport};

/// Text shown to users instead of a failed or empty lookup.
pub const FALLBACK_TEXT: &str = "There was an error retrieving this symbol; try again later?";

/// What to fetch besides the quote.
#[derive(Default)]
pub struct LookupOptions<'a> {
    /// Directory for the chart image; no chart is fetched when unset.
    pub chart_dir: Option<PathBuf>,
    pub analysis: Option<&'a dyn TechnicalAnalysis>,
}

/// Result of one lookup.
#[derive(Debug, Clone)]
pub struct Lookup {
    pub symbol: String,
    pub quote: Quote,
    /// Filtered closes of the current trading day.
    pub series: Vec<f64>,
    /// Rendered chart, when one was requested and could be drawn.
    pub chart: Option<PathBuf>,
}

/// Opens a connection to the data service and runs a lookup on it.
pub fn lookup(symbol: &str, options: &LookupOptions<'_>) -> Result<Lookup> {
    run_lookup(Connection::<WsTransport>::open(symbol)?, options)
}

/// Runs a lookup on an open connection and closes it.
pub fn run_lookup<T: Transport>(
    mut conn: Connection<T>,
    options: &LookupOptions<'_>,
) -> Result<Lookup> {
    let quote = conn.fetch_quote(options.analysis)?;
    let mut result = Lookup {
        symbol: conn.symbol().to_string(),
        quote,
        series: Vec::new(),
        chart: None,
    };

    let chart_dir = options.chart_dir.as_deref().filter(|_| !result.quote.is_empty());
    if let Some(dir) = chart_dir {
        match conn.fetch_chart() {
            Ok(series) => {
                if !series.is_empty() {
                    let change = result.quote.change.unwrap_or(0.0);
                    match render_chart(dir, conn.chart_session(), &series, change) {
                        Ok(path) => result.chart = Some(path),
                        Err(e) => warn!("No chart image for {}: {}", result.symbol, e),
                    }
                }
                result.series = series;
            }
            Err(e) => warn!("No chart for {}: {}", result.symbol, e),
        }
    }

    if let Err(e) = conn.close() {
        warn!("Failed to close connection for {}: {}", result.symbol, e);
    }
    Ok(result)
}
