//! Claim coordination
//!
//! The coordinator orchestrates one worker's interaction with the queue:
//! poll the registry for a claimable run, take it with a bounded
//! compare-and-set retry loop, materialize and load its code, gate
//! execution behind provenance verification, execute with a scoped
//! result observer, and finalize the run's status.
//!
//! Coordination is lock-free optimistic concurrency: there is no lock
//! service and no single point of failure. A worker that crashes mid-claim
//! leaves the run `QUEUED` (if it lost or never attempted the CAS) or
//! `INITIALIZING` without a heartbeat; it is never double-executed.

mod coordinator;
mod observer;
mod traits;

pub use coordinator::{ClaimConfig, ClaimCoordinator};
pub use observer::RegistryObserver;
pub use traits::{ArtifactFetcher, ExperimentHandle, ExperimentLoader, RunObserver};
