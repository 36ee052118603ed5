//! Quote built from accumulated field updates.
//!
//! The service streams partial field dictionaries for a symbol. They are merged
//! into [`QuoteFields`] (last write wins per field) and turned into a [`Quote`]
//! once the exchange is over. Fields the client knows get typed slots; every
//! other field, and any known field carrying an unexpected JSON type, is kept
//! in `extra`.
use serde::Serialize;
use serde_json::{Map, Value};
use strum_macros::{Display, EnumString};

use crate::technicals::TechnicalSummary;

/// Raw accumulated field updates.
pub type QuoteFields = Map<String, Value>;

/// Trading session the quote was taken in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MarketSession {
    PreMarket,
    Market,
    PostMarket,
    Out,
}

/// Point-in-time quote for one symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Quote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    /// Listing exchange, used as the key for technical analysis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listed_exchange: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_session: Option<MarketSession>,
    /// Last regular-session price (`lp`).
    #[serde(rename = "lp", skip_serializing_if = "Option::is_none")]
    pub last_price: Option<f64>,
    /// Regular-session change (`ch`).
    #[serde(rename = "ch", skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    /// Regular-session change in percent (`chp`).
    #[serde(rename = "chp", skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,
    /// Extended-hours price (`rtc`).
    #[serde(rename = "rtc", skip_serializing_if = "Option::is_none")]
    pub extended_price: Option<f64>,
    /// Extended-hours change (`rch`).
    #[serde(rename = "rch", skip_serializing_if = "Option::is_none")]
    pub extended_change: Option<f64>,
    /// Extended-hours change in percent (`rchp`).
    #[serde(rename = "rchp", skip_serializing_if = "Option::is_none")]
    pub extended_change_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    /// Fields without a typed slot, as received.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technicals: Option<TechnicalSummary>,
}

impl Quote {
    /// Builds a quote from merged field updates.
    pub fn from_fields(mut fields: QuoteFields) -> Self {
        let string = |v: &Value| v.as_str().map(str::to_string);
        let number = |v: &Value| v.as_f64();
        let session = |v: &Value| v.as_str().and_then(|s| s.parse::<MarketSession>().ok());

        Quote {
            short_name: take(&mut fields, "short_name", string),
            description: take(&mut fields, "description", string),
            exchange: take(&mut fields, "exchange", string),
            listed_exchange: take(&mut fields, "listed_exchange", string),
            currency_code: take(&mut fields, "currency_code", string),
            current_session: take(&mut fields, "current_session", session),
            last_price: take(&mut fields, "lp", number),
            change: take(&mut fields, "ch", number),
            change_percent: take(&mut fields, "chp", number),
            extended_price: take(&mut fields, "rtc", number),
            extended_change: take(&mut fields, "rch", number),
            extended_change_percent: take(&mut fields, "rchp", number),
            volume: take(&mut fields, "volume", number),
            extra: fields,
            technicals: None,
        }
    }

    /// `true` when the service sent no fields at all, which callers treat as
    /// "symbol not found".
    pub fn is_empty(&self) -> bool {
        let no_text = [
            &self.short_name,
            &self.description,
            &self.exchange,
            &self.listed_exchange,
            &self.currency_code,
        ]
        .iter()
        .all(|field| field.is_none());
        let no_numbers = [
            self.last_price,
            self.change,
            self.change_percent,
            self.extended_price,
            self.extended_change,
            self.extended_change_percent,
            self.volume,
        ]
        .iter()
        .all(Option::is_none);
        no_text && no_numbers && self.current_session.is_none() && self.extra.is_empty()
    }

    /// Best available price: last regular price, then the extended-hours one.
    pub fn price(&self) -> Option<f64> {
        self.last_price.or(self.extended_price)
    }

    /// Change relevant to the current session.
    pub fn session_change(&self) -> Option<f64> {
        match self.current_session {
            Some(MarketSession::PreMarket | MarketSession::PostMarket) => {
                self.extended_change.or(self.change)
            }
            _ => self.change,
        }
    }
}

fn take<T>(
    fields: &mut QuoteFields,
    key: &str,
    convert: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    let value = convert(fields.get(key)?)?;
    fields.remove(key);
    Some(value)
}
