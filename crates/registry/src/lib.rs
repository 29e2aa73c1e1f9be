//! Run registry: the persisted run collection
//!
//! This crate provides the only synchronization mechanism in the system:
//! the [`RunRegistry::transition`] compare-and-set. Workers are independent
//! processes with no shared memory; every coordination decision (claiming,
//! reaping, finalizing) is a conditional write against the registry.
//!
//! [`MemoryRegistry`] is the in-process reference implementation, sharded
//! for concurrent access. A persisted backend implements the same trait.

mod memory;
mod registry;

pub use memory::MemoryRegistry;
pub use registry::{RunRegistry, StatusFilter};

/// Heartbeat staleness threshold: a `RUNNING` run whose heartbeat is older
/// than this is considered dead.
pub const HEARTBEAT_TIMEOUT_SECS: i64 = 60;
