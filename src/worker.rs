//! Worker entry point
//!
//! [`Worker`] wires a registry to a claim coordinator and exposes the
//! polling surface a worker process runs: claim-and-execute one run, or
//! drain the queue until nothing claimable remains.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use workq_core::Result;
use workq_coordinator::{
    ArtifactFetcher, ClaimConfig, ClaimCoordinator, ExperimentLoader,
};
use workq_registry::{MemoryRegistry, RunRegistry, StatusFilter};
use workq_verify::{ContentStore, VersionPolicy};

/// A queue worker: claims runs, verifies provenance, executes.
///
/// Create via [`Worker::builder`].
pub struct Worker {
    registry: Arc<dyn RunRegistry>,
    coordinator: ClaimCoordinator,
}

impl Worker {
    /// Start building a worker.
    pub fn builder() -> WorkerBuilder {
        WorkerBuilder::new()
    }

    /// The underlying registry (enqueue-side access, status queries).
    pub fn registry(&self) -> &Arc<dyn RunRegistry> {
        &self.registry
    }

    /// Counts per status label, reaping dead runs first.
    pub fn queue_counts(&self) -> Result<BTreeMap<String, u64>> {
        self.registry.count_by_status()
    }

    /// Check whether any claimable (`QUEUED*`) work remains.
    pub fn has_queued(&self) -> Result<bool> {
        let counts = self.queue_counts()?;
        Ok(counts
            .iter()
            .any(|(label, &count)| label.starts_with(workq_core::status::QUEUED_PREFIX) && count > 0))
    }

    /// Claim and execute one queued run.
    ///
    /// Returns `Ok(None)` when the queue has nothing claimable. All other
    /// errors propagate, including verification failures — the caller
    /// decides whether to keep polling (see [`Worker::drain`]).
    pub fn poll_once(&self) -> Result<Option<serde_json::Value>> {
        match self.coordinator.claim_and_execute(&StatusFilter::QueuedFamily) {
            Ok(result) => Ok(Some(result)),
            Err(e) if e.is_no_run() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Execute queued runs until none remain claimable.
    ///
    /// Claim and verification failures are recoverable at this level: they
    /// are logged and polling continues (a run that fails verification was
    /// finalized as `FAILED` and will not be offered again). Claim
    /// exhaustion ends the cycle — the queue is hot and this worker keeps
    /// losing, so let the caller decide when to come back. Returns the
    /// number of runs this worker executed successfully.
    pub fn drain(&self) -> Result<usize> {
        let mut executed = 0;
        loop {
            match self.poll_once() {
                Ok(Some(_)) => executed += 1,
                Ok(None) => return Ok(executed),
                Err(e) if e.is_retryable() => {
                    tracing::info!(executed, "claim contention, ending poll cycle");
                    return Ok(executed);
                }
                Err(e) if e.is_verification_failure() => {
                    tracing::warn!(error = %e, "run failed provenance verification");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Builder for [`Worker`].
///
/// ```ignore
/// let worker = Worker::builder()
///     .version_policy(VersionPolicy::Equal)
///     .max_claim_attempts(5)
///     .heartbeat_timeout(Duration::from_secs(30))
///     .build(fetcher, loader, content_store);
/// ```
pub struct WorkerBuilder {
    registry: Option<Arc<dyn RunRegistry>>,
    policy: VersionPolicy,
    claim: ClaimConfig,
    heartbeat_timeout: Duration,
}

impl WorkerBuilder {
    /// New builder with default settings.
    pub fn new() -> Self {
        WorkerBuilder {
            registry: None,
            policy: VersionPolicy::default(),
            claim: ClaimConfig::default(),
            heartbeat_timeout: Duration::from_secs(60),
        }
    }

    /// Use a shared registry instead of a fresh in-process one.
    pub fn registry(mut self, registry: Arc<dyn RunRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the dependency version policy (default: `Newer`).
    pub fn version_policy(mut self, policy: VersionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Maximum claim attempts per poll (default: 10).
    pub fn max_claim_attempts(mut self, attempts: usize) -> Self {
        self.claim.max_attempts = attempts;
        self
    }

    /// Backoff tuning for lost claim races.
    pub fn claim_backoff(mut self, base: Duration, cap: Duration) -> Self {
        self.claim.backoff_base = base;
        self.claim.backoff_cap = cap;
        self
    }

    /// Heartbeat staleness threshold for the default in-process registry
    /// (ignored when a registry is supplied via [`WorkerBuilder::registry`]).
    pub fn heartbeat_timeout(mut self, timeout: Duration) -> Self {
        self.heartbeat_timeout = timeout;
        self
    }

    /// Build the worker with its collaborator seams.
    pub fn build(
        self,
        fetcher: Box<dyn ArtifactFetcher>,
        loader: Box<dyn ExperimentLoader>,
        content_store: Box<dyn ContentStore>,
    ) -> Worker {
        let registry = self.registry.unwrap_or_else(|| {
            Arc::new(MemoryRegistry::with_heartbeat_timeout(
                chrono::Duration::from_std(self.heartbeat_timeout)
                    .unwrap_or_else(|_| chrono::Duration::seconds(60)),
            ))
        });
        let coordinator =
            ClaimCoordinator::new(registry.clone(), fetcher, loader, content_store)
                .with_policy(self.policy)
                .with_config(self.claim);
        Worker {
            registry,
            coordinator,
        }
    }
}

impl Default for WorkerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
