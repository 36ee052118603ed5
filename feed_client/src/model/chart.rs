//! Chart bars and the trading-day filter.
//!
//! A bar arrives as `{"i": <index>, "v": [time, open, high, low, close, volume]}`.
//! Only the UNIX time and the close are kept.
//!
//! The filter keeps the bars of the current exchange day. Before the regular
//! open it also keeps the previous calendar day, so a pre-market caller still
//! sees the last full session.
use chrono::{DateTime, Timelike};
use chrono_tz::Tz;
use feed_common::{FeedError, Result};
use serde::Deserialize;
use serde_json::Value;

/// Civil timezone of the exchange.
pub const EXCHANGE_TZ: Tz = chrono_tz::US::Eastern;
/// Regular session open, local (hour, minute).
pub const SESSION_OPEN: (u32, u32) = (9, 30);

const TIME_INDEX: usize = 0;
const CLOSE_INDEX: usize = 4;

/// One historical bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    /// Seconds since the UNIX epoch.
    pub timestamp: i64,
    pub close: f64,
}

#[derive(Deserialize)]
struct RawBar {
    v: Vec<Value>,
}

impl Bar {
    fn from_values(values: &[Value]) -> Option<Self> {
        Some(Bar {
            timestamp: values.get(TIME_INDEX)?.as_f64()? as i64,
            close: values.get(CLOSE_INDEX)?.as_f64()?,
        })
    }
}

/// Parses a bar array. Bars without a time or a close are skipped.
pub fn parse_bars(value: &Value) -> Result<Vec<Bar>> {
    let raw = Vec::<RawBar>::deserialize(value)
        .map_err(|e| FeedError::ChartExtraction(e.to_string()))?;
    Ok(raw.iter().filter_map(|bar| Bar::from_values(&bar.v)).collect())
}

/// Decides whether a bar belongs to the displayable window at `now`.
pub fn is_displayable(timestamp: i64, now: DateTime<Tz>) -> bool {
    let Some(bar_time) = DateTime::from_timestamp(timestamp, 0) else {
        return false;
    };
    let bar_date = bar_time.with_timezone(&EXCHANGE_TZ).date_naive();
    let now = now.with_timezone(&EXCHANGE_TZ);
    let today = now.date_naive();

    if (now.hour(), now.minute()) < SESSION_OPEN && today.pred_opt() == Some(bar_date) {
        return true;
    }
    bar_date >= today
}

/// Closes of the bars that pass the filter, in received order.
pub fn filter_trading_day(bars: &[Bar], now: DateTime<Tz>) -> Vec<f64> {
    bars.iter()
        .filter(|bar| is_displayable(bar.timestamp, now))
        .map(|bar| bar.close)
        .collect()
}
