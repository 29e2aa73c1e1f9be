//! Experiment metadata
//!
//! [`ExperimentInfo`] is recorded twice: once on the run document at enqueue
//! time, and once reported by the loaded code at claim time. Provenance
//! verification compares the two.

use crate::types::ContentId;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Identity of a source file: either an inline content hash, or a reference
/// into the content store that resolves to one.
///
/// The two representations are both strings on the wire, so serialization
/// keeps the variant tag; untagged JSON could not tell a hash from a
/// reference id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceIdentity {
    /// Inline content hash.
    Hash(String),
    /// Reference id into the content store.
    ContentRef(ContentId),
}

/// One source file of an experiment: its path plus its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Path as recorded (may be absolute on the enqueuing host).
    pub path: String,
    /// Content identity.
    pub identity: SourceIdentity,
}

impl SourceEntry {
    /// A source entry carrying an inline hash.
    pub fn hashed(path: impl Into<String>, hash: impl Into<String>) -> Self {
        SourceEntry {
            path: path.into(),
            identity: SourceIdentity::Hash(hash.into()),
        }
    }

    /// A source entry referencing the content store.
    pub fn stored(path: impl Into<String>, id: ContentId) -> Self {
        SourceEntry {
            path: path.into(),
            identity: SourceIdentity::ContentRef(id),
        }
    }

    /// The path's final component. Paths recorded by different hosts differ
    /// in their directory prefixes, so identity comparison uses basenames.
    pub fn basename(&self) -> &str {
        Path::new(&self.path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.path)
    }
}

/// A source resolved through the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSource {
    /// Stored filename.
    pub filename: String,
    /// Content hash.
    pub hash: String,
}

impl ResolvedSource {
    /// Final component of the stored filename.
    pub fn basename(&self) -> &str {
        Path::new(&self.filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.filename)
    }
}

/// Metadata describing an experiment: its name, source files, and pinned
/// dependencies (`"name==version"` entries, order preserved).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentInfo {
    /// Experiment name.
    pub name: String,
    /// Ordered source files.
    pub sources: Vec<SourceEntry>,
    /// Ordered `"name==version"` dependency pins.
    pub dependencies: Vec<String>,
}

impl ExperimentInfo {
    /// Metadata with no sources or dependencies.
    pub fn named(name: impl Into<String>) -> Self {
        ExperimentInfo {
            name: name.into(),
            sources: Vec::new(),
            dependencies: Vec::new(),
        }
    }
}
