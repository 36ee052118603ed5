//! Blocking text transport under the connection manager.
//!
//! The connection only needs to push and pull text buffers, so the socket sits
//! behind the small [`Transport`] trait. [`WsTransport`] is the production
//! WebSocket; tests plug in scripted transports.
use std::net::TcpStream;

use feed_common::FeedError;
use feed_common::Result;
use log::{debug, info};
use tungstenite::client::IntoClientRequest;
use tungstenite::http::HeaderValue;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

/// Text message pipe to the data service.
pub trait Transport {
    /// Writes one buffer.
    fn send_text(&mut self, text: String) -> Result<()>;
    /// Blocks until the peer delivers the next buffer.
    fn recv_text(&mut self) -> Result<String>;
    /// Starts closing the transport.
    fn close(&mut self) -> Result<()>;
}

/// WebSocket transport over TCP, TLS when the URL is `wss://`.
pub struct WsTransport {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
}

impl WsTransport {
    /// Opens a WebSocket to `url`, sending `origin` as the `Origin` header.
    pub fn connect(url: &str, origin: &str) -> Result<Self> {
        let mut request = url
            .into_client_request()
            .map_err(|e| FeedError::Connection(format!("Invalid endpoint {}: {}", url, e)))?;
        let origin = HeaderValue::from_str(origin)
            .map_err(|e| FeedError::Connection(format!("Invalid origin {}: {}", origin, e)))?;
        request.headers_mut().insert("Origin", origin);

        let (socket, response) = tungstenite::connect(request)
            .map_err(|e| FeedError::Connection(format!("Failed to connect to {}: {}", url, e)))?;
        info!("Connected to {} ({})", url, response.status());
        Ok(Self { socket })
    }
}

impl Transport for WsTransport {
    fn send_text(&mut self, text: String) -> Result<()> {
        debug!("-> {}", text);
        self.socket
            .send(Message::Text(text))
            .map_err(|e| FeedError::Connection(format!("Send failed: {}", e)))
    }

    fn recv_text(&mut self) -> Result<String> {
        loop {
            let msg = self
                .socket
                .read()
                .map_err(|e| FeedError::Connection(format!("Receive failed: {}", e)))?;
            match msg {
                Message::Text(text) => {
                    debug!("<- {}", text);
                    return Ok(text);
                }
                Message::Binary(bin) => return Ok(String::from_utf8_lossy(&bin).into_owned()),
                Message::Close(frame) => {
                    return Err(FeedError::Connection(format!(
                        "Connection closed by peer: {:?}",
                        frame
                    )));
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        match self.socket.close(None) {
            Ok(()) => {}
            Err(tungstenite::Error::AlreadyClosed | tungstenite::Error::ConnectionClosed) => {
                return Ok(());
            }
            Err(e) => return Err(FeedError::Connection(format!("Close failed: {}", e))),
        }
        match self.socket.flush() {
            Ok(())
            | Err(tungstenite::Error::AlreadyClosed | tungstenite::Error::ConnectionClosed) => {
                Ok(())
            }
            Err(e) => Err(FeedError::Connection(format!("Close failed: {}", e))),
        }
    }
}
