//! Unified error taxonomy
//!
//! One canonical error type for claim, verification, and execution
//! failures. Claim errors (`NoRunAvailable`, `ClaimExhausted`) and
//! verification errors (`NameMismatch`, `SourceMismatch`,
//! `DependencyMismatch`) are recoverable at the worker-loop level: log and
//! keep polling. Collaborator failures carry their origin.

use crate::types::ContentId;
use crate::version::Version;
use thiserror::Error;

/// All run-queue errors.
#[derive(Debug, Error)]
pub enum Error {
    /// No candidate run matched the claim criterion.
    #[error("no run available matching criterion")]
    NoRunAvailable,

    /// Every claim attempt lost the compare-and-set race.
    #[error("failed to acquire a run after {attempts} attempts")]
    ClaimExhausted {
        /// Number of attempts made before giving up.
        attempts: usize,
    },

    /// Loaded code reports a different experiment name than the run records.
    #[error("experiment names did not match: {expected} (loaded) != {found} (run)")]
    NameMismatch {
        /// Name reported by the loaded code.
        expected: String,
        /// Name recorded on the run document.
        found: String,
    },

    /// A source file's identity differs between loaded code and run record.
    #[error(
        "source files did not match: {} [{}] (loaded) != {} [{}] (run)",
        expected.0, expected.1, found.0, found.1
    )]
    SourceMismatch {
        /// `(basename, identity)` reported by the loaded code.
        expected: (String, String),
        /// `(basename, identity)` recorded on the run (resolved if needed).
        found: (String, String),
    },

    /// A required dependency is missing or its version violates policy.
    #[error(
        "dependency {name} mismatch: available={}, required={required}",
        spec.as_ref().map(|v| v.to_string()).unwrap_or_else(|| "absent".to_string())
    )]
    DependencyMismatch {
        /// Dependency name.
        name: String,
        /// Version available to the loaded code, if any.
        spec: Option<Version>,
        /// Version the run requires.
        required: Version,
    },

    /// A version string was not dotted-numeric.
    #[error("invalid version: {0:?}")]
    InvalidVersion(String),

    /// A dependency entry was not of the form `name==version`.
    #[error("invalid dependency entry: {0:?}")]
    InvalidDependency(String),

    /// A status label was not recognized.
    #[error("invalid status label: {0:?}")]
    InvalidStatus(String),

    /// The content store could not resolve a reference id.
    #[error("content store could not resolve reference {0}")]
    ContentRefUnresolved(ContentId),

    /// The execution engine failed.
    #[error("execution failed: {0}")]
    Execution(String),

    /// The artifact fetcher failed to materialize sources.
    #[error("artifact error: {0}")]
    Artifact(String),

    /// The experiment loader failed.
    #[error("loader error: {0}")]
    Loader(String),

    /// Registry-level failure (persistence layer).
    #[error("registry error: {0}")]
    Registry(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for run-queue operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error may succeed on a later poll cycle.
    ///
    /// Only claim exhaustion is retryable: the queue still holds the run,
    /// this worker just lost every race.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::ClaimExhausted { .. })
    }

    /// Check if this is a provenance-verification failure.
    ///
    /// Verification failures abort the run attempt but must not crash the
    /// worker: they indicate a real inconsistency between enqueued metadata
    /// and loaded code.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Error::NameMismatch { .. }
                | Error::SourceMismatch { .. }
                | Error::DependencyMismatch { .. }
        )
    }

    /// Check if the queue simply had nothing for us.
    pub fn is_no_run(&self) -> bool {
        matches!(self, Error::NoRunAvailable)
    }
}
