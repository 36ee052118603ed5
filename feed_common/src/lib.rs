//!
//! Common types shared by the streaming client and its callers.
//!
//! This crate aggregates:
//! - `error` — unified error type `FeedError` used across the workspace.
//! - `result` — handy `Result<T, FeedError>` alias.
//! - `codec` — `~m~<len>~m~` framing of JSON envelopes.
//! - `method` — protocol method names.
//! - `session` — quote and chart session identifiers.
//! - `net` — endpoint constants.
#![warn(missing_docs)]
pub mod codec;
pub mod error;
pub mod method;
pub mod net;
pub mod result;
pub mod session;

pub use codec::Frame;
pub use error::FeedError;
pub use method::Method;
pub use result::Result;
pub use session::{SessionId, SessionKind};
