//! The registry trait and status filters

use serde_json::Value;
use std::collections::BTreeMap;
use workq_core::{Result, RunDocument, RunId, RunStatus};

/// Criterion for selecting runs by status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    /// Match the exact status label.
    Exact(RunStatus),
    /// Match any label in the `QUEUED` family (`QUEUED`, `QUEUED_HIGH`, ...).
    QueuedFamily,
}

impl StatusFilter {
    /// Check whether a status satisfies this filter.
    pub fn matches(&self, status: &RunStatus) -> bool {
        match self {
            StatusFilter::Exact(expected) => status == expected,
            StatusFilter::QueuedFamily => status.is_queued(),
        }
    }
}

/// Thin abstraction over the persisted run collection.
///
/// `transition` is the single concurrency primitive the rest of the system
/// builds on. It must be atomic from the caller's perspective: the status
/// comparison and the write happen as one operation, never read-then-write.
/// All other methods are plain reads or field-scoped writes.
pub trait RunRegistry: Send + Sync {
    /// Insert a newly enqueued run. Fails on a duplicate id.
    fn insert(&self, run: RunDocument) -> Result<()>;

    /// Fetch a run by id.
    fn get(&self, id: &RunId) -> Result<Option<RunDocument>>;

    /// All runs whose status satisfies the filter. Read-only.
    fn list_by_status(&self, filter: &StatusFilter) -> Result<Vec<RunDocument>>;

    /// One run whose status satisfies the filter, if any. Read-only; the
    /// claim loop follows up with `transition` to actually take it.
    fn find_one(&self, filter: &StatusFilter) -> Result<Option<RunDocument>>;

    /// Count runs per status label, reaping dead runs first.
    ///
    /// Before counting, every run with `status = RUNNING` whose heartbeat
    /// is older than the staleness threshold is conditionally marked
    /// `DIED`. The update is conditioned on the stored status still being
    /// `RUNNING`, so any number of concurrent reapers is safe: the second
    /// writer's condition fails harmlessly.
    fn count_by_status(&self) -> Result<BTreeMap<String, u64>>;

    /// Atomic compare-and-set on the status field.
    ///
    /// Succeeds and returns `true` only if, at write time, the stored
    /// status still equals `from`; otherwise returns `false` and leaves the
    /// document untouched. Scoped to the status field only, so a concurrent
    /// heartbeat or result write is never clobbered.
    fn transition(&self, id: &RunId, from: &RunStatus, to: RunStatus) -> Result<bool>;

    /// Refresh the run's heartbeat to now.
    ///
    /// The first heartbeat of a claimed run also moves it
    /// `INITIALIZING → RUNNING`; later beats only refresh the timestamp.
    fn record_heartbeat(&self, id: &RunId) -> Result<()>;

    /// Store the run's result payload. Field-scoped; does not touch status.
    fn record_result(&self, id: &RunId, result: Value) -> Result<()>;
}
