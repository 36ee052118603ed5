//! Result type alias shared across the workspace.
//!
//! Functions return `Result<T>` and get `FeedError` as the default error.
use crate::error::FeedError;

/// Workspace-wide `Result` alias with `FeedError` as the default error.
pub type Result<T, E = FeedError> = std::result::Result<T, E>;
