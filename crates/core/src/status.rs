//! Run status labels
//!
//! Statuses are persisted as string labels. Most are fixed, but `QUEUED` is
//! a family: enqueuers may tag priority variants like `QUEUED_HIGH`, and any
//! label with the `QUEUED` prefix is claimable. Equality (and therefore the
//! registry's compare-and-set) is on the exact label, so a claim taken
//! against `QUEUED_HIGH` only succeeds while the document still carries that
//! exact label.
//!
//! ## Transitions
//!
//! - `QUEUED*` → `INITIALIZING` (claim, CAS)
//! - `INITIALIZING` → `RUNNING` (first heartbeat)
//! - `RUNNING` → `DIED` (reaper, stale heartbeat)
//! - `INITIALIZING`/`RUNNING` → `COMPLETED` | `FAILED` (coordinator finalize)
//!
//! Terminal states are never re-entered; the registry enforces this only via
//! conditional writes, not a schema constraint.

use crate::error::Error;
use serde::{Deserialize, Serialize};

/// Prefix shared by all claimable queue labels.
pub const QUEUED_PREFIX: &str = "QUEUED";

/// Status of a run in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RunStatus {
    /// Waiting to be claimed. Carries the exact stored label, which may be
    /// variant-tagged (`QUEUED`, `QUEUED_HIGH`, ...).
    Queued {
        /// The exact label as stored, always starting with `QUEUED`.
        label: String,
    },
    /// Claimed by a worker, execution not yet started.
    Initializing,
    /// Executing; heartbeat is meaningful only in this state.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
    /// Reaped: was `RUNNING` but the heartbeat went stale.
    Died,
}

impl RunStatus {
    /// Plain `QUEUED` with no variant tag.
    pub fn queued() -> Self {
        RunStatus::Queued {
            label: QUEUED_PREFIX.to_string(),
        }
    }

    /// `QUEUED_<TAG>`, e.g. `RunStatus::queued_tagged("HIGH")`.
    pub fn queued_tagged(tag: &str) -> Self {
        RunStatus::Queued {
            label: format!("{}_{}", QUEUED_PREFIX, tag),
        }
    }

    /// Parse a stored label. Any label starting with `QUEUED` maps to the
    /// queued family with the label preserved verbatim.
    pub fn from_label(label: &str) -> Result<Self, Error> {
        match label {
            "INITIALIZING" => Ok(RunStatus::Initializing),
            "RUNNING" => Ok(RunStatus::Running),
            "COMPLETED" => Ok(RunStatus::Completed),
            "FAILED" => Ok(RunStatus::Failed),
            "DIED" => Ok(RunStatus::Died),
            s if s.starts_with(QUEUED_PREFIX) => Ok(RunStatus::Queued {
                label: s.to_string(),
            }),
            other => Err(Error::InvalidStatus(other.to_string())),
        }
    }

    /// The stored label.
    pub fn label(&self) -> &str {
        match self {
            RunStatus::Queued { label } => label,
            RunStatus::Initializing => "INITIALIZING",
            RunStatus::Running => "RUNNING",
            RunStatus::Completed => "COMPLETED",
            RunStatus::Failed => "FAILED",
            RunStatus::Died => "DIED",
        }
    }

    /// Check if this status belongs to the claimable `QUEUED` family.
    pub fn is_queued(&self) -> bool {
        matches!(self, RunStatus::Queued { .. })
    }

    /// Check if the run is executing.
    pub fn is_running(&self) -> bool {
        matches!(self, RunStatus::Running)
    }

    /// Check if the run reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Died
        )
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for RunStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for RunStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        RunStatus::from_label(&label).map_err(serde::de::Error::custom)
    }
}
