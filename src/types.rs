//! Core types shared by the map builder and the reconciler.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hex-encoded digest of a file's full contents.
///
/// This is the primary key of a [`ContentMap`](crate::map::ContentMap): two files
/// with the same `ContentHash` are treated as the same content identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Wrap an already hex-encoded digest.
    pub fn new(hex_digest: impl Into<String>) -> Self {
        Self(hex_digest.into())
    }

    /// Hex-encode raw digest bytes.
    pub fn from_digest(bytes: &[u8]) -> Self {
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for log lines.
    pub fn short(&self) -> &str {
        let end = self.0.char_indices().nth(12).map(|(i, _)| i).unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentHash {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ContentHash {
    fn from(value: String) -> Self {
        Self(value)
    }
}
