//! Error types shared by the codec and the streaming client.
//!
//! `FeedError` covers every failure a symbol lookup can run into. Only
//! `Connection` and `Quote` are allowed to end a lookup early; `Protocol`,
//! `Enrichment` and `ChartExtraction` are produced so they can be logged,
//! then absorbed where they happen.
use std::io;

use thiserror::Error;

/// Unified error type for the feed workspace.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The transport could not be established or broke while in use.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A single frame payload could not be decoded.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The service reported an error status for the requested symbol.
    #[error("Quote error for {0}")]
    Quote(String),

    /// The technical analysis lookup failed.
    #[error("Enrichment failed: {0}")]
    Enrichment(String),

    /// A chart frame did not carry bars at the expected path.
    #[error("Chart extraction failed: {0}")]
    ChartExtraction(String),

    /// The chart image could not be drawn or written.
    #[error("Render error: {0}")]
    Render(String),

    /// I/O error originating from the standard library or the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}
