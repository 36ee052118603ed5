//! Method names spoken on the wire.
//!
//! Every frame carries its method under the `m` key. Outbound calls and the
//! inbound notifications the sessions react to share one enum so the names
//! live in a single place.
use strum_macros::{AsRefStr, Display, EnumString};

/// Protocol method understood by the client.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Method {
    // Outbound, connection-wide.
    SetDataQuality,
    SetAuthToken,

    // Outbound, quote session.
    QuoteCreateSession,
    QuoteAddSymbols,

    // Outbound, chart session.
    ChartCreateSession,
    SwitchTimezone,
    ResolveSymbol,
    CreateSeries,

    // Inbound.
    /// Quote field update.
    Qsd,
    QuoteCompleted,
    SeriesLoading,
    SymbolResolved,
    SeriesCompleted,
    TimescaleUpdate,
    /// Incremental data update.
    Du,
    SymbolError,
    SeriesError,
    CriticalError,
    ProtocolError,
}

impl Method {
    /// Looks up a wire name, returning `None` for methods this client does not know.
    pub fn parse(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    /// Returns `true` for notifications that report a server-side failure.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Method::SymbolError
                | Method::SeriesError
                | Method::CriticalError
                | Method::ProtocolError
        )
    }
}
