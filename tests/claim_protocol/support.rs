//! Stub collaborators and helpers shared by the protocol tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use workq::prelude::*;
use workq::{ClaimConfig, ClaimCoordinator, ContentId, ResolvedSource};

/// Route `tracing` output to the test harness when RUST_LOG is set.
pub fn trace_init() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .try_init();
}

/// Writes the run's first source under the scratch directory.
pub struct StubFetcher;

impl ArtifactFetcher for StubFetcher {
    fn fetch(&self, run: &RunDocument, dest: &Path) -> Result<PathBuf> {
        let name = run
            .experiment
            .sources
            .first()
            .map(|s| s.basename().to_string())
            .unwrap_or_else(|| "main.py".to_string());
        let path = dest.join(name);
        std::fs::write(&path, b"# staged experiment source")?;
        Ok(path)
    }
}

/// Loader returning a handle with a fixed self-report and outcome.
pub struct StubLoader {
    pub info: ExperimentInfo,
    pub outcome: std::result::Result<serde_json::Value, String>,
    pub heartbeats: u32,
}

impl StubLoader {
    pub fn succeeding(info: ExperimentInfo, result: serde_json::Value) -> Box<Self> {
        Box::new(StubLoader {
            info,
            outcome: Ok(result),
            heartbeats: 1,
        })
    }

    pub fn failing(info: ExperimentInfo, message: &str) -> Box<Self> {
        Box::new(StubLoader {
            info,
            outcome: Err(message.to_string()),
            heartbeats: 1,
        })
    }
}

impl ExperimentLoader for StubLoader {
    fn load(&self, path: &Path) -> Result<Box<dyn ExperimentHandle>> {
        assert!(path.exists(), "loader must see the staged source file");
        Ok(Box::new(StubHandle {
            info: self.info.clone(),
            outcome: self.outcome.clone(),
            heartbeats: self.heartbeats,
        }))
    }
}

pub struct StubHandle {
    info: ExperimentInfo,
    outcome: std::result::Result<serde_json::Value, String>,
    heartbeats: u32,
}

impl ExperimentHandle for StubHandle {
    fn info(&self) -> ExperimentInfo {
        self.info.clone()
    }

    fn run(
        &self,
        _command: &str,
        _config: &serde_json::Map<String, serde_json::Value>,
        observer: &mut dyn RunObserver,
    ) -> Result<serde_json::Value> {
        for _ in 0..self.heartbeats {
            observer.on_heartbeat();
        }
        match &self.outcome {
            Ok(v) => {
                observer.on_result(v);
                Ok(v.clone())
            }
            Err(msg) => Err(Error::Execution(msg.clone())),
        }
    }
}

/// Content store over a fixed reference map.
pub struct MapStore(pub HashMap<String, ResolvedSource>);

impl MapStore {
    pub fn empty() -> Box<Self> {
        Box::new(MapStore(HashMap::new()))
    }

    pub fn with(entries: &[(&str, &str, &str)]) -> Box<Self> {
        Box::new(MapStore(
            entries
                .iter()
                .map(|(id, filename, hash)| {
                    (
                        id.to_string(),
                        ResolvedSource {
                            filename: filename.to_string(),
                            hash: hash.to_string(),
                        },
                    )
                })
                .collect(),
        ))
    }
}

impl ContentStore for MapStore {
    fn resolve(&self, id: &ContentId) -> Result<ResolvedSource> {
        self.0
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| Error::ContentRefUnresolved(id.clone()))
    }
}

/// Experiment metadata with one hashed source.
pub fn experiment(name: &str, hash: &str) -> ExperimentInfo {
    let mut info = ExperimentInfo::named(name);
    info.sources.push(SourceEntry::hashed("train.py", hash));
    info
}

/// Enqueue a plain `QUEUED` run for `info` on the shared registry.
pub fn enqueue(registry: &Arc<dyn RunRegistry>, info: ExperimentInfo) -> RunId {
    let run = RunDocument::queued(info, "main");
    let id = run.id;
    registry.insert(run).unwrap();
    id
}

/// Claim tuning with no sleeping, for fast contention tests.
pub fn fast_claims() -> ClaimConfig {
    ClaimConfig {
        max_attempts: 10,
        backoff_base: Duration::ZERO,
        backoff_cap: Duration::ZERO,
    }
}

/// A coordinator over `registry` that loads experiments reporting `info`
/// and succeeding with `result`.
pub fn coordinator(
    registry: Arc<dyn RunRegistry>,
    info: ExperimentInfo,
    result: serde_json::Value,
) -> ClaimCoordinator {
    ClaimCoordinator::new(
        registry,
        Box::new(StubFetcher),
        StubLoader::succeeding(info, result),
        MapStore::empty(),
    )
    .with_config(fast_claims())
}
