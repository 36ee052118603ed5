//! Feed Client — looks up quotes, and optionally intraday charts, for one or more
//! symbols on the quote distribution service and logs the results.
//!
//! Every symbol gets its own connection on its own thread; results are collected
//! over a channel and reported in the order the symbols were given.
//!
//! Usage example (CLI):
//! ```bash
//! feed_client AAPL '$TSLA' --chart-dir ./assets --json
//! ```
//!
//! A lookup that fails, or that finds nothing, is reported with a fixed
//! fallback text instead of the raw error.
#![warn(missing_docs)]
mod args;

use crate::args::Args;
use clap::Parser;
use crossbeam_channel::unbounded;
use feed_client::lookup::{FALLBACK_TEXT, Lookup, LookupOptions, lookup};
use feed_common::FeedError;
use feed_common::Result;
use log::{error, info, warn};
use std::thread;

fn main() -> Result<(), FeedError> {
    init_logger();
    let args = Args::parse();

    if let Some(dir) = &args.chart_dir {
        std::fs::create_dir_all(dir)?;
    }

    let (result_tx, result_rx) = unbounded::<(usize, String, Result<Lookup>)>();
    let mut handles = Vec::with_capacity(args.symbols.len());
    for (index, raw) in args.symbols.iter().enumerate() {
        let result_tx = result_tx.clone();
        let symbol = normalize_symbol(raw);
        let chart_dir = args.chart_dir.clone();

        handles.push(thread::spawn(move || {
            let options = LookupOptions {
                chart_dir,
                analysis: None,
            };
            let result = lookup(&symbol, &options);
            if let Err(e) = result_tx.send((index, symbol, result)) {
                error!("Failed to hand over lookup result: {}", e);
            }
        }));
    }
    drop(result_tx);

    let mut results: Vec<_> = result_rx.iter().collect();
    results.sort_by_key(|(index, _, _)| *index);
    for handle in handles {
        if handle.join().is_err() {
            error!("A lookup thread panicked");
        }
    }

    for (_, symbol, result) in results {
        report(&symbol, result, args.json)?;
    }
    Ok(())
}

fn report(symbol: &str, result: Result<Lookup>, json: bool) -> Result<()> {
    match result {
        Ok(found) if !found.quote.is_empty() => {
            let quote = &found.quote;
            info!(
                "QUOTE: {} ({}) Price={} Change={} ({}%) Session={}",
                quote.short_name.as_deref().unwrap_or(symbol),
                quote.description.as_deref().unwrap_or("-"),
                number(quote.price()),
                number(quote.session_change()),
                number(quote.change_percent),
                quote
                    .current_session
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
            );
            if let Some(path) = &found.chart {
                info!("CHART: {} -> {}", symbol, path.display());
            }
            if json {
                println!("{}", serde_json::to_string(quote)?);
            }
        }
        Ok(_) => warn!("{}: {}", symbol, FALLBACK_TEXT),
        Err(e) => {
            error!("Lookup for {} failed: {}", symbol, e);
            warn!("{}: {}", symbol, FALLBACK_TEXT);
        }
    }
    Ok(())
}

fn number(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "n/a".to_string())
}

/// Accepts chat-style `$aapl` as well as plain `AAPL`.
fn normalize_symbol(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_prefix('$').unwrap_or(trimmed).to_uppercase()
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
