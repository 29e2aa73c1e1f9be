//! Convenience re-exports for typical use.
//!
//! ```ignore
//! use workq::prelude::*;
//! ```

pub use crate::{
    ArtifactFetcher, ContentStore, Error, ExperimentHandle, ExperimentInfo, ExperimentLoader,
    MemoryRegistry, Result, RunDocument, RunId, RunObserver, RunRegistry, RunStatus, SourceEntry,
    SourceIdentity, StatusFilter, VersionPolicy, Worker, WorkerBuilder,
};
