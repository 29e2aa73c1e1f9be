//! Registry-backed result observer

use crate::traits::RunObserver;
use serde_json::Value;
use std::sync::Arc;
use workq_core::RunId;
use workq_registry::RunRegistry;

/// Observer bound to one claimed run, recording liveness and results into
/// the registry.
///
/// Constructed per execution and passed as an explicit `&mut` parameter, so
/// it is detached by scope end on every exit path; nothing shared retains
/// it. Registry write failures are logged, not propagated: a lost heartbeat
/// must not abort a healthy execution.
pub struct RegistryObserver {
    registry: Arc<dyn RunRegistry>,
    run_id: RunId,
}

impl RegistryObserver {
    /// Bind an observer to `run_id`.
    pub fn new(registry: Arc<dyn RunRegistry>, run_id: RunId) -> Self {
        RegistryObserver { registry, run_id }
    }

    /// The run this observer records into.
    pub fn run_id(&self) -> RunId {
        self.run_id
    }
}

impl RunObserver for RegistryObserver {
    fn on_heartbeat(&mut self) {
        if let Err(e) = self.registry.record_heartbeat(&self.run_id) {
            tracing::warn!(run = %self.run_id, error = %e, "heartbeat write failed");
        }
    }

    fn on_result(&mut self, result: &Value) {
        if let Err(e) = self.registry.record_result(&self.run_id, result.clone()) {
            tracing::warn!(run = %self.run_id, error = %e, "result write failed");
        }
    }
}
