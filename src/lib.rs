//! # workq
//!
//! Queue coordination for experiment runs: atomic claiming, provenance
//! verification, and dead-run reaping.
//!
//! Independent worker processes pull pending runs from a shared registry.
//! Exactly one worker claims each run (optimistic compare-and-set on the
//! status field), proves that the code it loaded matches the code the run
//! was enqueued against (name, source identity, dependency versions), and
//! executes it. Workers that die mid-run are detected by heartbeat
//! staleness and their runs marked `DIED`.
//!
//! ## Quick start
//!
//! ```ignore
//! use workq::prelude::*;
//!
//! let worker = Worker::builder()
//!     .version_policy(VersionPolicy::Newer)
//!     .build(fetcher, loader, content_store);
//!
//! // Enqueue-side (normally a separate producer process)
//! worker.registry().insert(RunDocument::queued(experiment, "main"))?;
//!
//! // Worker loop: claim, verify, execute until the queue drains
//! let executed = worker.drain()?;
//! ```
//!
//! ## Crates
//!
//! - `workq-core` — shared types and the error taxonomy
//! - `workq-registry` — the run collection and its status CAS
//! - `workq-verify` — pure provenance checks
//! - `workq-coordinator` — the claim loop and execution lifecycle

#![warn(missing_docs)]

mod worker;

pub mod prelude;

pub use worker::{Worker, WorkerBuilder};

// Re-export the shared vocabulary at the crate root
pub use workq_core::{
    ContentId, Dependency, Error, ExperimentInfo, ResolvedSource, Result, RunDocument, RunId,
    RunStatus, SourceEntry, SourceIdentity, Version,
};

pub use workq_coordinator::{
    ArtifactFetcher, ClaimConfig, ClaimCoordinator, ExperimentHandle, ExperimentLoader,
    RegistryObserver, RunObserver,
};
pub use workq_registry::{MemoryRegistry, RunRegistry, StatusFilter};
pub use workq_verify::{verify, ContentStore, VersionPolicy};
