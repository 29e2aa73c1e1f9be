//! Core types for the run queue
//!
//! This crate defines the fundamental types shared across the system:
//! - [`types::RunId`] / [`types::ContentId`]: stable identifiers
//! - [`status::RunStatus`]: the status state machine labels
//! - [`version::Version`]: dotted-numeric versions with numeric ordering
//! - [`experiment::ExperimentInfo`]: enqueued experiment metadata
//! - [`run::RunDocument`]: the persisted unit of work
//! - [`error::Error`]: the unified error taxonomy

pub mod error;
pub mod experiment;
pub mod run;
pub mod status;
pub mod types;
pub mod version;

pub use error::{Error, Result};
pub use experiment::{ExperimentInfo, ResolvedSource, SourceEntry, SourceIdentity};
pub use run::RunDocument;
pub use status::RunStatus;
pub use types::{ContentId, RunId};
pub use version::{Dependency, Version};
