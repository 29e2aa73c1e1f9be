//! In-process registry backed by a sharded map
//!
//! DashMap gives sharded locking: a CAS only contends with writers touching
//! the same document's shard, and reads across different runs never block
//! each other. Each mutating method takes the document's exclusive entry
//! for the duration of the check-and-write, which is what makes
//! `transition` atomic from the caller's perspective.

use crate::registry::{RunRegistry, StatusFilter};
use crate::HEARTBEAT_TIMEOUT_SECS;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use serde_json::Value;
use std::collections::BTreeMap;
use workq_core::{Error, Result, RunDocument, RunId, RunStatus};

/// In-process run collection.
///
/// The reference implementation of [`RunRegistry`]: used directly by
/// single-process deployments and as the model for persisted backends.
pub struct MemoryRegistry {
    runs: DashMap<RunId, RunDocument>,
    heartbeat_timeout: Duration,
}

impl MemoryRegistry {
    /// Create an empty registry with the default 60s heartbeat timeout.
    pub fn new() -> Self {
        Self::with_heartbeat_timeout(Duration::seconds(HEARTBEAT_TIMEOUT_SECS))
    }

    /// Create an empty registry with a custom staleness threshold.
    pub fn with_heartbeat_timeout(timeout: Duration) -> Self {
        MemoryRegistry {
            runs: DashMap::new(),
            heartbeat_timeout: timeout,
        }
    }

    /// Number of runs in the registry.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Check if the registry holds no runs.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Mark every `RUNNING` run with a stale heartbeat as `DIED`.
    ///
    /// Only a recorded heartbeat can go stale: a `RUNNING` run with no
    /// heartbeat at all is left alone.
    ///
    /// Idempotent under concurrency: the write happens under the document's
    /// exclusive entry and re-checks the status, so a racing reaper (or a
    /// racing finalizer) simply finds the condition already false.
    fn reap_dead_runs(&self) {
        let cutoff = Utc::now() - self.heartbeat_timeout;
        for mut entry in self.runs.iter_mut() {
            let doc = entry.value_mut();
            let stale = doc.status.is_running()
                && doc.heartbeat.is_some_and(|hb| hb < cutoff);
            if stale {
                doc.status = RunStatus::Died;
                tracing::info!(run = %doc.id, "reaped dead run (stale heartbeat)");
            }
        }
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RunRegistry for MemoryRegistry {
    fn insert(&self, run: RunDocument) -> Result<()> {
        match self.runs.entry(run.id) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(Error::Registry(format!(
                "duplicate run id: {}",
                run.id
            ))),
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(run);
                Ok(())
            }
        }
    }

    fn get(&self, id: &RunId) -> Result<Option<RunDocument>> {
        Ok(self.runs.get(id).map(|r| r.clone()))
    }

    fn list_by_status(&self, filter: &StatusFilter) -> Result<Vec<RunDocument>> {
        Ok(self
            .runs
            .iter()
            .filter(|r| filter.matches(&r.status))
            .map(|r| r.clone())
            .collect())
    }

    fn find_one(&self, filter: &StatusFilter) -> Result<Option<RunDocument>> {
        Ok(self
            .runs
            .iter()
            .find(|r| filter.matches(&r.status))
            .map(|r| r.clone()))
    }

    fn count_by_status(&self) -> Result<BTreeMap<String, u64>> {
        self.reap_dead_runs();
        let mut counts = BTreeMap::new();
        for entry in self.runs.iter() {
            *counts.entry(entry.status.label().to_string()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    fn transition(&self, id: &RunId, from: &RunStatus, to: RunStatus) -> Result<bool> {
        let Some(mut entry) = self.runs.get_mut(id) else {
            return Ok(false);
        };
        if entry.status != *from {
            tracing::debug!(
                run = %id,
                expected = %from,
                actual = %entry.status,
                "status CAS lost"
            );
            return Ok(false);
        }
        tracing::debug!(run = %id, from = %from, to = %to, "status CAS applied");
        entry.status = to;
        Ok(true)
    }

    fn record_heartbeat(&self, id: &RunId) -> Result<()> {
        let Some(mut entry) = self.runs.get_mut(id) else {
            return Err(Error::Registry(format!("no such run: {id}")));
        };
        entry.heartbeat = Some(Utc::now());
        if entry.status == RunStatus::Initializing {
            entry.status = RunStatus::Running;
        }
        Ok(())
    }

    fn record_result(&self, id: &RunId, result: Value) -> Result<()> {
        let Some(mut entry) = self.runs.get_mut(id) else {
            return Err(Error::Registry(format!("no such run: {id}")));
        };
        entry.result = Some(result);
        Ok(())
    }
}
