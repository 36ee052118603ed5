//! Session identifiers.
//!
//! The service routes responses on a shared connection by session id. An id is
//! a kind prefix (`qs_` or `cs_`) followed by 12 random lowercase letters.
//! Collisions are not guarded against.
use std::fmt;

use rand::Rng;

/// Number of random letters after the prefix.
pub const SUFFIX_LEN: usize = 12;

/// Logical stream a session id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// Point-in-time quote fields.
    Quote,
    /// Historical price series.
    Chart,
}

impl SessionKind {
    /// Wire prefix for ids of this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            SessionKind::Quote => "qs_",
            SessionKind::Chart => "cs_",
        }
    }
}

/// Opaque routing token for one logical request stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh id of the given kind.
    pub fn generate(kind: SessionKind) -> Self {
        let mut rng = rand::rng();
        let suffix: String = (0..SUFFIX_LEN).map(|_| rng.random_range('a'..='z')).collect();
        SessionId(format!("{}{}", kind.prefix(), suffix))
    }

    /// Returns the id as sent on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
