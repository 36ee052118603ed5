//! Chart session: fetch the intraday price series for the connection's symbol.
//!
//! The series is requested in UTC at a 3 minute resolution with a 300 bar
//! lookback, then cut down to the current trading day by
//! [`filter_trading_day`].
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use feed_common::{FeedError, Frame, Method, Result};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::json;

use crate::connection::Connection;
use crate::model::chart::{Bar, EXCHANGE_TZ, filter_trading_day, parse_bars};
use crate::transport::Transport;

/// Label of the one series requested per chart session.
pub const SERIES_LABEL: &str = "s1";
/// Bar resolution in minutes.
pub const RESOLUTION: &str = "3";
/// Number of bars requested.
pub const BAR_COUNT: u32 = 300;

const SYMBOL_LABEL: &str = "symbol_1";
const SERIES_TIMEZONE: &str = "Etc/UTC";

#[derive(Serialize)]
struct SymbolSpec<'a> {
    symbol: &'a str,
    adjustment: &'a str,
    session: &'a str,
}

impl<T: Transport> Connection<T> {
    /// Fetches the filtered series using the wall clock as "now".
    pub fn fetch_chart(&mut self) -> Result<Vec<f64>> {
        self.fetch_chart_at(Utc::now().with_timezone(&EXCHANGE_TZ))
    }

    /// Fetches the series and keeps the closes displayable at `now`.
    ///
    /// An empty vector is a valid answer.
    pub fn fetch_chart_at(&mut self, now: DateTime<Tz>) -> Result<Vec<f64>> {
        let bars = self.fetch_bars()?;
        let closes = filter_trading_day(&bars, now);
        info!(
            "Chart for {}: {} of {} bars kept",
            self.symbol(),
            closes.len(),
            bars.len()
        );
        Ok(closes)
    }

    /// Runs the chart exchange and returns the last bar array received.
    pub fn fetch_bars(&mut self) -> Result<Vec<Bar>> {
        let session = self.chart_session().as_str().to_string();
        let spec = serde_json::to_string(&SymbolSpec {
            symbol: self.symbol(),
            adjustment: "splits",
            session: "extended",
        })?;

        self.send(Method::ChartCreateSession, &[json!(session)])?;
        self.send(Method::SwitchTimezone, &[json!(session), json!(SERIES_TIMEZONE)])?;
        self.send(
            Method::ResolveSymbol,
            &[json!(session), json!(SYMBOL_LABEL), json!(format!("={}", spec))],
        )?;
        self.send(
            Method::CreateSeries,
            &[
                json!(session),
                json!(SERIES_LABEL),
                json!(SERIES_LABEL),
                json!(SYMBOL_LABEL),
                json!(RESOLUTION),
                json!(BAR_COUNT),
            ],
        )?;

        let mut bars = Vec::new();
        let mut receiving = true;
        while receiving {
            for frame in self.receive()? {
                let Some(name) = frame.method.as_deref() else {
                    continue;
                };
                match frame.method() {
                    Some(Method::SeriesLoading | Method::SymbolResolved) => continue,
                    Some(Method::SeriesCompleted) => {
                        receiving = false;
                        break;
                    }
                    Some(method) if method.is_error() => {
                        warn!("Series for {} ended by {}: {:?}", self.symbol(), name, frame.params);
                        receiving = false;
                        break;
                    }
                    _ => {}
                }
                match extract_bars(&frame) {
                    Ok(extracted) => bars = extracted,
                    Err(e) => debug!("{} frame without bars: {}", name, e),
                }
            }
        }
        Ok(bars)
    }
}

fn extract_bars(frame: &Frame) -> Result<Vec<Bar>> {
    let series = frame
        .param(1)
        .and_then(|payload| payload.get(SERIES_LABEL))
        .and_then(|series| series.get("s"))
        .ok_or_else(|| FeedError::ChartExtraction(format!("no {}.s path", SERIES_LABEL)))?;
    parse_bars(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use chrono::TimeZone;
    use feed_common::codec::{encode, frame};
    use serde_json::Value;

    fn eastern(day: u32, hour: u32, minute: u32) -> DateTime<Tz> {
        EXCHANGE_TZ
            .with_ymd_and_hms(2024, 6, day, hour, minute, 0)
            .unwrap()
    }

    fn bar(at: DateTime<Tz>, close: f64) -> Value {
        json!({"i": 0, "v": [at.timestamp(), close - 1.0, close + 1.0, close - 2.0, close, 1000]})
    }

    fn series(method: Method, bars: Vec<Value>) -> String {
        encode(method, &[json!("cs_test"), json!({"s1": {"s": bars}})]).unwrap()
    }

    fn notice(method: Method) -> String {
        encode(method, &[json!("cs_test"), json!("s1")]).unwrap()
    }

    #[test]
    fn sends_setup_calls_in_order() {
        let (transport, probe) = ScriptedTransport::new(vec![notice(Method::SeriesCompleted)]);
        let mut conn = Connection::with_transport("AAPL", transport);
        conn.fetch_chart_at(eastern(12, 11, 0)).unwrap();

        assert_eq!(
            probe.sent_methods(),
            vec!["chart_create_session", "switch_timezone", "resolve_symbol", "create_series"]
        );
        let cs = conn.chart_session().to_string();
        let sent = probe.sent();
        assert_eq!(
            sent[2],
            frame(&format!(
                r#"{{"m":"resolve_symbol","p":["{cs}","symbol_1","={{\"symbol\":\"AAPL\",\"adjustment\":\"splits\",\"session\":\"extended\"}}"]}}"#
            ))
        );
        assert_eq!(
            sent[3],
            frame(&format!(
                r#"{{"m":"create_series","p":["{cs}","s1","s1","symbol_1","3",300]}}"#
            ))
        );
    }

    #[test]
    fn keeps_last_extracted_series_and_filters_it() {
        let now = eastern(12, 11, 0);
        let stale = series(Method::TimescaleUpdate, vec![bar(eastern(12, 9, 30), 50.0)]);
        let latest = series(
            Method::TimescaleUpdate,
            vec![
                bar(eastern(10, 15, 57), 99.0),
                bar(eastern(12, 9, 30), 100.0),
                bar(eastern(12, 9, 33), 101.5),
            ],
        );
        let (transport, _) = ScriptedTransport::new(vec![
            format!("{}{}", notice(Method::SymbolResolved), notice(Method::SeriesLoading)),
            stale,
            latest,
            format!("{}~m~5~m~{{oops", encode(Method::Du, &[json!("cs_test"), json!({})]).unwrap()),
            notice(Method::SeriesCompleted),
        ]);
        let mut conn = Connection::with_transport("AAPL", transport);

        assert_eq!(conn.fetch_chart_at(now).unwrap(), vec![100.0, 101.5]);
    }

    #[test]
    fn premarket_includes_yesterday() {
        let bars = vec![bar(eastern(11, 15, 0), 10.0), bar(eastern(12, 8, 0), 11.0)];
        let (transport, _) = ScriptedTransport::new(vec![
            series(Method::TimescaleUpdate, bars),
            notice(Method::SeriesCompleted),
        ]);
        let mut conn = Connection::with_transport("AAPL", transport);

        assert_eq!(conn.fetch_chart_at(eastern(12, 8, 30)).unwrap(), vec![10.0, 11.0]);
    }

    #[test]
    fn no_surviving_bars_is_empty_not_error() {
        let (transport, _) = ScriptedTransport::new(vec![
            series(Method::TimescaleUpdate, vec![bar(eastern(3, 12, 0), 5.0)]),
            notice(Method::SeriesCompleted),
        ]);
        let mut conn = Connection::with_transport("AAPL", transport);

        assert!(conn.fetch_chart_at(eastern(12, 12, 0)).unwrap().is_empty());
    }

    #[test]
    fn server_error_ends_series() {
        let (transport, _) = ScriptedTransport::new(vec![
            series(Method::TimescaleUpdate, vec![bar(eastern(12, 9, 30), 7.0)]),
            encode(
                Method::SymbolError,
                &[json!("cs_test"), json!("symbol_1"), json!("invalid symbol")],
            )
            .unwrap(),
        ]);
        let mut conn = Connection::with_transport("AAPL", transport);

        assert_eq!(conn.fetch_chart_at(eastern(12, 12, 0)).unwrap(), vec![7.0]);
    }

    #[test]
    fn dropped_socket_is_a_connection_error() {
        let (transport, _) = ScriptedTransport::new(vec![notice(Method::SeriesLoading)]);
        let mut conn = Connection::with_transport("AAPL", transport);
        assert!(matches!(
            conn.fetch_chart_at(eastern(12, 12, 0)),
            Err(FeedError::Connection(_))
        ));
    }
}
