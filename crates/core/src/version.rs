//! Dotted-numeric versions and dependency pins
//!
//! Dependency entries are recorded as `"name==version"` strings at enqueue
//! time. Version precedence is numeric per segment (`2.10 > 2.9`), never
//! lexicographic, and trailing zero segments are insignificant
//! (`1.0 == 1.0.0`).

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// A dotted-numeric version such as `2.10.1`.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    segments: Vec<u64>,
}

impl Version {
    /// Build a version from numeric segments.
    pub fn new(segments: Vec<u64>) -> Self {
        Version { segments }
    }

    /// The numeric segments.
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    fn segment_or_zero(&self, idx: usize) -> u64 {
        self.segments.get(idx).copied().unwrap_or(0)
    }

    /// Segments with trailing zeros stripped; the canonical form equality
    /// and hashing agree on.
    fn significant_segments(&self) -> &[u64] {
        let len = self
            .segments
            .iter()
            .rposition(|&seg| seg != 0)
            .map_or(0, |idx| idx + 1);
        &self.segments[..len]
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        if s.is_empty() {
            return Err(Error::InvalidVersion(s.to_string()));
        }
        let segments = s
            .split('.')
            .map(|seg| {
                seg.parse::<u64>()
                    .map_err(|_| Error::InvalidVersion(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Version { segments })
    }
}

impl TryFrom<String> for Version {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Error> {
        s.parse()
    }
}

impl From<Version> for String {
    fn from(v: Version) -> String {
        v.to_string()
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for seg in &self.segments {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", seg)?;
            first = false;
        }
        Ok(())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            match self.segment_or_zero(i).cmp(&other.segment_or_zero(i)) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// 1.0 == 1.0.0, so equality must go through cmp rather than derive.
impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

// Equal versions must hash equally, so hashing ignores trailing zeros too.
impl std::hash::Hash for Version {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.significant_segments().hash(state);
    }
}

/// A parsed `"name==version"` dependency pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Package name.
    pub name: String,
    /// Pinned version.
    pub version: Version,
}

impl Dependency {
    /// Parse a `"name==version"` entry.
    pub fn parse(entry: &str) -> Result<Self, Error> {
        let (name, version) = entry
            .split_once("==")
            .ok_or_else(|| Error::InvalidDependency(entry.to_string()))?;
        if name.is_empty() {
            return Err(Error::InvalidDependency(entry.to_string()));
        }
        Ok(Dependency {
            name: name.to_string(),
            version: version.parse()?,
        })
    }

    /// Parse a whole dependency list, preserving order.
    pub fn parse_list(entries: &[String]) -> Result<Vec<Self>, Error> {
        entries.iter().map(|e| Dependency::parse(e)).collect()
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}=={}", self.name, self.version)
    }
}
