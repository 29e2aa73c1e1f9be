//! External collaborator seams
//!
//! The coordinator never inspects how code is fetched, loaded, or
//! executed; those concerns live behind these traits. The loader returns a
//! capability object ([`ExperimentHandle`]) that reports its own metadata
//! and runs commands; the observer is an explicit per-call parameter, never
//! a mutable list on shared state.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use workq_core::{ExperimentInfo, Result, RunDocument};

/// Retrieves a run's source bytes from the content store and materializes
/// them on local disk.
pub trait ArtifactFetcher: Send + Sync {
    /// Write the run's source files under `dest` and return the path of the
    /// entry-point file.
    fn fetch(&self, run: &RunDocument, dest: &Path) -> Result<PathBuf>;
}

/// Loads experiment code from a materialized source path.
pub trait ExperimentLoader: Send + Sync {
    /// Load the file at `path` and return a handle to the experiment it
    /// defines.
    fn load(&self, path: &Path) -> Result<Box<dyn ExperimentHandle>>;
}

/// A loaded experiment: reports its own metadata and executes commands.
pub trait ExperimentHandle {
    /// Metadata the loaded code reports about itself. Compared against the
    /// run's enqueue-time record by provenance verification.
    fn info(&self) -> ExperimentInfo;

    /// Execute `command` with `config`, reporting liveness and results
    /// through `observer`. The observer is bound to the calling scope; the
    /// handle must not retain it.
    fn run(
        &self,
        command: &str,
        config: &Map<String, Value>,
        observer: &mut dyn RunObserver,
    ) -> Result<Value>;
}

/// Receives liveness and result signals during execution.
pub trait RunObserver {
    /// The experiment is alive. The first beat of a claimed run marks it
    /// `RUNNING`; later beats refresh the timestamp the reaper checks.
    fn on_heartbeat(&mut self);

    /// A (possibly partial) result is available.
    fn on_result(&mut self, result: &Value);
}
