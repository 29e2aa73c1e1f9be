//! Identifier types
//!
//! - [`RunId`]: unique identifier for a queued run
//! - [`ContentId`]: reference into the content-addressable artifact store

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a run.
///
/// RunId identifies a single unit of queued work throughout the system:
/// registry documents, claim transitions, artifact staging directories,
/// and observer bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Create a new random RunId using UUID v4.
    pub fn new() -> Self {
        RunId(Uuid::new_v4())
    }

    /// Create RunId from raw bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        RunId(Uuid::from_bytes(bytes))
    }

    /// Get raw bytes representation.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference id into the content store.
///
/// A run's source entry may carry a ContentId instead of an inline hash;
/// the content store resolves it to a `(filename, hash)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(String);

impl ContentId {
    /// Wrap a raw reference id.
    pub fn new(id: impl Into<String>) -> Self {
        ContentId(id.into())
    }

    /// The raw reference id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContentId {
    fn from(s: &str) -> Self {
        ContentId::new(s)
    }
}
