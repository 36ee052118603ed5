//! Connection manager.
//!
//! A [`Connection`] owns the transport for exactly one symbol lookup together
//! with the quote and chart session ids generated when it was opened. Nothing
//! is shared between connections; a caller that looks up several symbols opens
//! several connections.
//!
//! Responses are not routed by session id. The quote and chart exchanges run
//! one after the other on the connection, so every record received belongs to
//! the exchange currently driving `receive()`.
use feed_common::codec;
use feed_common::net::{ORIGIN, WS_URL};
use feed_common::{FeedError, Frame, Method, Result, SessionId, SessionKind};
use log::{debug, info, warn};
use serde_json::Value;

use crate::transport::{Transport, WsTransport};

/// Live connection to the data service for one symbol.
pub struct Connection<T: Transport = WsTransport> {
    transport: T,
    symbol: String,
    quote_session: SessionId,
    chart_session: SessionId,
    closed: bool,
}

impl Connection<WsTransport> {
    /// Connects to the data service and prepares sessions for `symbol`.
    pub fn open(symbol: &str) -> Result<Self> {
        let transport = WsTransport::connect(WS_URL, ORIGIN)?;
        Ok(Self::with_transport(symbol, transport))
    }
}

impl<T: Transport> Connection<T> {
    /// Wraps an already connected transport.
    pub fn with_transport(symbol: &str, transport: T) -> Self {
        let connection = Self {
            transport,
            symbol: symbol.to_string(),
            quote_session: SessionId::generate(SessionKind::Quote),
            chart_session: SessionId::generate(SessionKind::Chart),
            closed: false,
        };
        debug!(
            "Sessions for {}: quote={} chart={}",
            connection.symbol, connection.quote_session, connection.chart_session
        );
        connection
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn quote_session(&self) -> &SessionId {
        &self.quote_session
    }

    pub fn chart_session(&self) -> &SessionId {
        &self.chart_session
    }

    /// Frames and writes one call.
    pub fn send(&mut self, method: Method, params: &[Value]) -> Result<()> {
        if self.closed {
            return Err(FeedError::Connection("Connection already closed".to_string()));
        }
        let wire = codec::encode(method, params)?;
        self.transport.send_text(wire)
    }

    /// Blocks for the next buffer and decodes every frame in it.
    ///
    /// Heartbeats are echoed back before decoding and keep their position as
    /// empty records.
    pub fn receive(&mut self) -> Result<Vec<Frame>> {
        if self.closed {
            return Err(FeedError::Connection("Connection already closed".to_string()));
        }
        let buf = self.transport.recv_text()?;
        for payload in codec::split_payloads(&buf) {
            if codec::is_heartbeat(payload) {
                debug!("Heartbeat {}", payload);
                self.transport.send_text(codec::frame(payload))?;
            }
        }
        Ok(codec::decode(&buf))
    }

    /// Closes the transport. A second call does nothing.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        info!("Closing connection for {}", self.symbol);
        self.transport.close()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<T: Transport> Drop for Connection<T> {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.close() {
                warn!("Failed to close connection for {}: {}", self.symbol, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use feed_common::codec::frame;
    use serde_json::json;

    #[test]
    fn sessions_are_distinct_and_prefixed() {
        let (transport, _) = ScriptedTransport::new(Vec::new());
        let conn = Connection::with_transport("AAPL", transport);
        assert_eq!(conn.symbol(), "AAPL");
        assert!(conn.quote_session().as_str().starts_with("qs_"));
        assert!(conn.chart_session().as_str().starts_with("cs_"));
    }

    #[test]
    fn send_writes_framed_envelope() {
        let (transport, probe) = ScriptedTransport::new(Vec::new());
        let mut conn = Connection::with_transport("AAPL", transport);
        conn.send(Method::SetAuthToken, &[json!("unauthorized_user_token")])
            .unwrap();

        assert_eq!(
            probe.sent(),
            vec![r#"~m~54~m~{"m":"set_auth_token","p":["unauthorized_user_token"]}"#]
        );
    }

    #[test]
    fn receive_echoes_heartbeats() {
        let buf = format!("{}{}", frame("~h~3"), frame(r#"{"m":"qsd","p":[]}"#));
        let (transport, probe) = ScriptedTransport::new(vec![buf]);
        let mut conn = Connection::with_transport("AAPL", transport);

        let frames = conn.receive().unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames[0].is_empty());
        assert_eq!(frames[1].method(), Some(Method::Qsd));
        assert_eq!(probe.sent(), vec!["~m~4~m~~h~3".to_string()]);
    }

    #[test]
    fn exhausted_transport_is_a_connection_error() {
        let (transport, _) = ScriptedTransport::new(Vec::new());
        let mut conn = Connection::with_transport("AAPL", transport);
        assert!(matches!(conn.receive(), Err(FeedError::Connection(_))));
    }

    #[test]
    fn close_twice_is_harmless() {
        let (transport, probe) = ScriptedTransport::new(Vec::new());
        let mut conn = Connection::with_transport("AAPL", transport);
        conn.close().unwrap();
        conn.close().unwrap();
        assert!(conn.is_closed());
        assert!(conn.send(Method::SetDataQuality, &[]).is_err());
        drop(conn);
        assert_eq!(probe.closes(), 1);
    }

    #[test]
    fn drop_closes_transport() {
        let (transport, probe) = ScriptedTransport::new(Vec::new());
        {
            let _conn = Connection::with_transport("AAPL", transport);
        }
        assert_eq!(probe.closes(), 1);
    }
}
