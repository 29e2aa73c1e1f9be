//! The persisted run document
//!
//! A run is created externally at enqueue time with a `QUEUED*` status and
//! is never physically deleted by this subsystem. The claim coordinator,
//! the execution observer, and the reaper mutate its status; the document's
//! `command` and `config` are passed through to the execution engine
//! untouched.

use crate::experiment::ExperimentInfo;
use crate::status::RunStatus;
use crate::types::RunId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The unit of work in the shared queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDocument {
    /// Stable identity.
    pub id: RunId,
    /// Current status label.
    pub status: RunStatus,
    /// Liveness timestamp; trustworthy only while `status = RUNNING`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heartbeat: Option<DateTime<Utc>>,
    /// Experiment metadata captured at enqueue time.
    pub experiment: ExperimentInfo,
    /// Command for the execution engine, passed through untouched.
    pub command: String,
    /// Configuration for the execution engine, passed through untouched.
    #[serde(default)]
    pub config: Map<String, Value>,
    /// Result payload, populated post-execution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl RunDocument {
    /// Create a freshly enqueued run with a plain `QUEUED` status.
    pub fn queued(experiment: ExperimentInfo, command: impl Into<String>) -> Self {
        RunDocument {
            id: RunId::new(),
            status: RunStatus::queued(),
            heartbeat: None,
            experiment,
            command: command.into(),
            config: Map::new(),
            result: None,
        }
    }

    /// Set a variant-tagged queue label (builder style).
    pub fn with_status(mut self, status: RunStatus) -> Self {
        self.status = status;
        self
    }

    /// Attach execution configuration (builder style).
    pub fn with_config(mut self, config: Map<String, Value>) -> Self {
        self.config = config;
        self
    }
}
