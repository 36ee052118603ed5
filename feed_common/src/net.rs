//! Endpoint constants for the quote distribution service.
//!
//! The endpoint is part of the deployment, not runtime configuration.

/// WebSocket endpoint of the data service.
pub const WS_URL: &str = "wss://data.tradingview.com/socket.io/websocket";
/// `Origin` header value the service requires on the upgrade request.
pub const ORIGIN: &str = "https://data.tradingview.com";
/// Auth token sent for anonymous access.
pub const ANONYMOUS_TOKEN: &str = "unauthorized_user_token";
