//! Quote session: fetch point-in-time quote fields for the connection's symbol.
//!
//! The exchange is four calls followed by a receive loop. Field updates arrive
//! as `qsd` frames whose second parameter is `{"n": symbol, "s": status, "v":
//! {fields}}`. The loop ends on `quote_completed`, or once more than
//! [`MAX_QUOTE_UPDATES`] updates were merged, whichever comes first.
use feed_common::net::ANONYMOUS_TOKEN;
use feed_common::{FeedError, Frame, Method, Result};
use log::{debug, info, warn};
use serde_json::{Value, json};

use crate::connection::Connection;
use crate::model::quote::{Quote, QuoteFields};
use crate::technicals::{INTERVAL, SCREENER, TechnicalAnalysis};
use crate::transport::Transport;

/// Updates merged before the loop stops without a completion signal. The peer
/// may stream updates indefinitely; the loop stops once this count is exceeded.
pub const MAX_QUOTE_UPDATES: usize = 3;

const DATA_QUALITY: &str = "low";
const FORCE_PERMISSION: &str = "force_permission";
const ERROR_STATUS: &str = "error";

/// Merges quote updates until the exchange is over.
#[derive(Debug, Default)]
pub struct QuoteAccumulator {
    fields: QuoteFields,
    updates: usize,
    done: bool,
}

impl QuoteAccumulator {
    /// Applies one decoded record. An error status fails the whole fetch.
    pub fn apply(&mut self, frame: &Frame, symbol: &str) -> Result<()> {
        let Some(name) = frame.method.as_deref() else {
            return Ok(());
        };
        let method = frame.method();
        if method == Some(Method::QuoteCompleted) {
            self.done = true;
            return Ok(());
        }
        if method.is_some_and(|m| m.is_error()) {
            warn!("Server reported {} for {}: {:?}", name, symbol, frame.params);
            return Err(FeedError::Quote(symbol.to_string()));
        }

        let Some(payload) = frame.param(1) else {
            return Ok(());
        };
        if payload.get("s").and_then(Value::as_str) == Some(ERROR_STATUS) {
            warn!("Quote error status for {}: {}", symbol, payload);
            return Err(FeedError::Quote(symbol.to_string()));
        }
        if let Some(Value::Object(update)) = payload.get("v") {
            for (key, value) in update {
                self.fields.insert(key.clone(), value.clone());
            }
            self.updates += 1;
            if self.updates > MAX_QUOTE_UPDATES {
                debug!("Update cap reached for {}", symbol);
                self.done = true;
            }
        }
        Ok(())
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn updates(&self) -> usize {
        self.updates
    }

    pub fn into_fields(self) -> QuoteFields {
        self.fields
    }
}

impl<T: Transport> Connection<T> {
    /// Fetches the quote for this connection's symbol.
    ///
    /// With `analysis` set, the result is enriched with a technical summary;
    /// a failing enrichment leaves `technicals` empty. An empty quote means
    /// the service knew nothing about the symbol.
    pub fn fetch_quote(&mut self, analysis: Option<&dyn TechnicalAnalysis>) -> Result<Quote> {
        let session = self.quote_session().as_str().to_string();
        let symbol = self.symbol().to_string();

        self.send(Method::SetDataQuality, &[json!(DATA_QUALITY)])?;
        self.send(Method::SetAuthToken, &[json!(ANONYMOUS_TOKEN)])?;
        self.send(Method::QuoteCreateSession, &[json!(session)])?;
        self.send(
            Method::QuoteAddSymbols,
            &[json!(session), json!(symbol), json!({"flags": [FORCE_PERMISSION]})],
        )?;

        let mut accumulator = QuoteAccumulator::default();
        while !accumulator.is_done() {
            for frame in self.receive()? {
                accumulator.apply(&frame, &symbol)?;
                if accumulator.is_done() {
                    break;
                }
            }
        }
        info!("Quote for {} after {} updates", symbol, accumulator.updates());

        let mut quote = Quote::from_fields(accumulator.into_fields());
        if let Some(analysis) = analysis {
            enrich(&mut quote, &symbol, analysis);
        }
        Ok(quote)
    }
}

fn enrich(quote: &mut Quote, symbol: &str, analysis: &dyn TechnicalAnalysis) {
    let summary = quote
        .listed_exchange
        .as_deref()
        .ok_or_else(|| FeedError::Enrichment(format!("no listed exchange for {}", symbol)))
        .and_then(|exchange| analysis.summary(symbol, SCREENER, exchange, INTERVAL));
    match summary {
        Ok(summary) => quote.technicals = Some(summary),
        Err(e) => warn!("Skipping technicals for {}: {}", symbol, e),
    }
}
