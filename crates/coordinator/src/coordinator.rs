//! The claim loop and execution lifecycle

use crate::observer::RegistryObserver;
use crate::traits::{ArtifactFetcher, ExperimentLoader};
use rand::Rng;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use workq_core::{Error, Result, RunDocument, RunStatus};
use workq_registry::{RunRegistry, StatusFilter};
use workq_verify::{verify, ContentStore, VersionPolicy};

/// Tuning for the claim retry loop.
#[derive(Debug, Clone)]
pub struct ClaimConfig {
    /// Maximum compare-and-set attempts before giving up.
    pub max_attempts: usize,
    /// First backoff delay after a lost race.
    pub backoff_base: Duration,
    /// Upper bound on the (doubling) backoff delay.
    pub backoff_cap: Duration,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        ClaimConfig {
            max_attempts: 10,
            backoff_base: Duration::from_millis(10),
            backoff_cap: Duration::from_secs(1),
        }
    }
}

/// Sleep for `delay` scaled by a random factor in [0.5, 1.5).
///
/// The jitter spreads workers that lost the same race, so a hot queue does
/// not see synchronized retry storms.
fn backoff_with_jitter(delay: Duration) {
    if delay.is_zero() {
        return;
    }
    let factor = rand::thread_rng().gen_range(0.5..1.5);
    std::thread::sleep(delay.mul_f64(factor));
}

/// Orchestrates claiming, verification, and execution for one worker.
pub struct ClaimCoordinator {
    registry: Arc<dyn RunRegistry>,
    fetcher: Box<dyn ArtifactFetcher>,
    loader: Box<dyn ExperimentLoader>,
    content_store: Box<dyn ContentStore>,
    policy: VersionPolicy,
    config: ClaimConfig,
}

impl ClaimCoordinator {
    /// Build a coordinator over the given registry and collaborator seams.
    pub fn new(
        registry: Arc<dyn RunRegistry>,
        fetcher: Box<dyn ArtifactFetcher>,
        loader: Box<dyn ExperimentLoader>,
        content_store: Box<dyn ContentStore>,
    ) -> Self {
        ClaimCoordinator {
            registry,
            fetcher,
            loader,
            content_store,
            policy: VersionPolicy::default(),
            config: ClaimConfig::default(),
        }
    }

    /// Set the dependency version policy.
    pub fn with_policy(mut self, policy: VersionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the claim retry tuning.
    pub fn with_config(mut self, config: ClaimConfig) -> Self {
        self.config = config;
        self
    }

    /// The registry this coordinator operates against.
    pub fn registry(&self) -> &Arc<dyn RunRegistry> {
        &self.registry
    }

    /// Atomically claim one run matching `filter`.
    ///
    /// Each attempt fetches a fresh candidate, remembers its exact current
    /// status, and tries the `status → INITIALIZING` compare-and-set. A
    /// lost race backs off (exponential, jittered) and refetches. Finding
    /// no candidate at all is terminal: the queue is empty for this filter,
    /// so retrying cannot help.
    ///
    /// # Errors
    ///
    /// - [`Error::NoRunAvailable`] if no candidate matched the filter.
    /// - [`Error::ClaimExhausted`] after `max_attempts` lost races.
    pub fn claim(&self, filter: &StatusFilter) -> Result<RunDocument> {
        let mut delay = self.config.backoff_base;
        for attempt in 1..=self.config.max_attempts {
            let candidate = self
                .registry
                .find_one(filter)?
                .ok_or(Error::NoRunAvailable)?;
            let old_status = candidate.status.clone();

            if self
                .registry
                .transition(&candidate.id, &old_status, RunStatus::Initializing)?
            {
                tracing::info!(run = %candidate.id, attempt, "claimed run");
                // Re-read so the caller sees the post-claim document
                return Ok(self
                    .registry
                    .get(&candidate.id)?
                    .unwrap_or_else(|| candidate.with_status(RunStatus::Initializing)));
            }

            tracing::debug!(run = %candidate.id, attempt, "lost claim race");
            if attempt < self.config.max_attempts {
                backoff_with_jitter(delay);
                delay = (delay * 2).min(self.config.backoff_cap);
            }
        }
        Err(Error::ClaimExhausted {
            attempts: self.config.max_attempts,
        })
    }

    /// Claim a run, verify its provenance, execute it, and finalize.
    ///
    /// Lifecycle on success: fetch sources into a scratch directory, load,
    /// verify (name, sources, dependencies), execute with a scoped
    /// registry observer, record the result, and CAS the run to
    /// `COMPLETED`. Verification and execution failures finalize the run
    /// as `FAILED` and propagate the error. The scratch directory is
    /// removed on every exit path.
    pub fn claim_and_execute(&self, filter: &StatusFilter) -> Result<Value> {
        let run = self.claim(filter)?;

        // Removed on drop, including the early-return error paths below
        let scratch = tempfile::tempdir()?;

        match self.execute_claimed(&run, scratch.path()) {
            Ok(result) => {
                self.registry.record_result(&run.id, result.clone())?;
                self.finalize(&run.id, RunStatus::Completed);
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(run = %run.id, error = %e, "claimed run aborted");
                self.finalize(&run.id, RunStatus::Failed);
                Err(e)
            }
        }
    }

    fn execute_claimed(&self, run: &RunDocument, scratch: &std::path::Path) -> Result<Value> {
        let source_path = self.fetcher.fetch(run, scratch)?;
        let handle = self.loader.load(&source_path)?;
        let loaded = handle.info();

        verify(&loaded, &run.experiment, &*self.content_store, self.policy)?;

        let mut observer = RegistryObserver::new(self.registry.clone(), run.id);
        handle.run(&run.command, &run.config, &mut observer)
    }

    /// Move a claimed run to its terminal status.
    ///
    /// The run may be `INITIALIZING` (engine never heartbeat) or `RUNNING`
    /// by now, so the CAS starts from whatever status is currently stored.
    /// Losing the race is harmless: it means a concurrent writer (e.g. the
    /// reaper) already moved the run, and terminal states are never
    /// overwritten.
    fn finalize(&self, id: &workq_core::RunId, to: RunStatus) {
        let current = match self.registry.get(id) {
            Ok(Some(doc)) => doc.status,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(run = %id, error = %e, "finalize read failed");
                return;
            }
        };
        if current.is_terminal() {
            return;
        }
        match self.registry.transition(id, &current, to.clone()) {
            Ok(true) => tracing::info!(run = %id, status = %to, "run finalized"),
            Ok(false) => tracing::debug!(run = %id, "finalize CAS lost"),
            Err(e) => tracing::warn!(run = %id, error = %e, "finalize write failed"),
        }
    }
}
