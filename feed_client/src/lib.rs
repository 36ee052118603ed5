//! Streaming client for the quote distribution service.
//!
//! One [`Connection`] is opened per symbol lookup. It owns the socket and the
//! two session ids the service uses to route answers: the quote session
//! ([`Connection::fetch_quote`]) and the chart session
//! ([`Connection::fetch_chart`]). All I/O is blocking and driven by the
//! caller; there are no background threads.
//!
//! Modules:
//! - `transport` — WebSocket transport behind a small trait.
//! - `connection` — framing, receive, heartbeat echo, teardown.
//! - `quote_session` — quote field accumulation.
//! - `chart_session` — intraday series fetch.
//! - `model` — typed quote, chart bars and the trading-day filter.
//! - `render` — PNG chart output.
//! - `technicals` — technical analysis collaborator.
//! - `lookup` — the full per-symbol sequence.
pub mod chart_session;
pub mod connection;
pub mod lookup;
pub mod model;
pub mod quote_session;
pub mod render;
pub mod technicals;
pub mod transport;

#[cfg(test)]
mod testing;

pub use connection::Connection;
pub use model::quote::Quote;
pub use transport::{Transport, WsTransport};
