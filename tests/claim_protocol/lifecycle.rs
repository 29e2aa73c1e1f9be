//! Full execution lifecycle through the worker surface

use crate::support::*;
use std::sync::Arc;
use workq::prelude::*;

fn worker_over(registry: Arc<dyn RunRegistry>, loader: Box<StubLoader>) -> Worker {
    Worker::builder()
        .registry(registry)
        .claim_backoff(std::time::Duration::ZERO, std::time::Duration::ZERO)
        .build(Box::new(StubFetcher), loader, MapStore::empty())
}

#[test]
fn drain_executes_every_queued_run() {
    let registry: Arc<dyn RunRegistry> = Arc::new(MemoryRegistry::new());
    let info = experiment("exp", "h1");

    let ids: Vec<RunId> = (0..3).map(|_| enqueue(&registry, info.clone())).collect();
    // Priority-tagged variants are claimable too
    let tagged = RunDocument::queued(info.clone(), "main")
        .with_status(RunStatus::queued_tagged("HIGH"));
    let tagged_id = tagged.id;
    registry.insert(tagged).unwrap();

    let worker = worker_over(
        registry.clone(),
        StubLoader::succeeding(info, serde_json::json!({"loss": 0.1})),
    );

    assert!(worker.has_queued().unwrap());
    assert_eq!(worker.drain().unwrap(), 4);
    assert!(!worker.has_queued().unwrap());

    for id in ids.iter().chain([&tagged_id]) {
        let doc = registry.get(id).unwrap().unwrap();
        assert_eq!(doc.status, RunStatus::Completed);
        assert_eq!(doc.result, Some(serde_json::json!({"loss": 0.1})));
        assert!(doc.heartbeat.is_some());
    }

    let counts = registry.count_by_status().unwrap();
    assert_eq!(counts.get("COMPLETED"), Some(&4));
}

#[test]
fn execution_failure_finalizes_failed_and_propagates() {
    let registry: Arc<dyn RunRegistry> = Arc::new(MemoryRegistry::new());
    let info = experiment("exp", "h1");
    let id = enqueue(&registry, info.clone());

    let worker = worker_over(registry.clone(), StubLoader::failing(info, "exit code 137"));

    let err = worker.poll_once().unwrap_err();
    assert!(matches!(err, Error::Execution(msg) if msg.contains("137")));
    assert_eq!(
        registry.get(&id).unwrap().unwrap().status,
        RunStatus::Failed
    );
}

#[test]
fn poll_once_on_empty_queue_returns_none() {
    let registry: Arc<dyn RunRegistry> = Arc::new(MemoryRegistry::new());
    let worker = worker_over(
        registry,
        StubLoader::succeeding(experiment("exp", "h1"), serde_json::Value::Null),
    );
    assert_eq!(worker.poll_once().unwrap(), None);
    assert_eq!(worker.drain().unwrap(), 0);
}

#[test]
fn config_and_command_pass_through_untouched() {
    struct CapturingHandle;
    struct CapturingLoader;

    impl ExperimentHandle for CapturingHandle {
        fn info(&self) -> ExperimentInfo {
            experiment("exp", "h1")
        }
        fn run(
            &self,
            command: &str,
            config: &serde_json::Map<String, serde_json::Value>,
            _observer: &mut dyn RunObserver,
        ) -> Result<serde_json::Value> {
            assert_eq!(command, "train --fold 3");
            assert_eq!(config["lr"], serde_json::json!(0.01));
            Ok(serde_json::Value::Null)
        }
    }

    impl ExperimentLoader for CapturingLoader {
        fn load(&self, _path: &std::path::Path) -> Result<Box<dyn ExperimentHandle>> {
            Ok(Box::new(CapturingHandle))
        }
    }

    let registry: Arc<dyn RunRegistry> = Arc::new(MemoryRegistry::new());
    let mut config = serde_json::Map::new();
    config.insert("lr".to_string(), serde_json::json!(0.01));
    let run = RunDocument::queued(experiment("exp", "h1"), "train --fold 3").with_config(config);
    registry.insert(run).unwrap();

    let worker = Worker::builder()
        .registry(registry)
        .build(Box::new(StubFetcher), Box::new(CapturingLoader), MapStore::empty());

    worker.poll_once().unwrap();
}

#[test]
fn workers_share_a_queue_without_double_execution() {
    trace_init();
    let registry: Arc<dyn RunRegistry> = Arc::new(MemoryRegistry::new());
    let info = experiment("exp", "h1");
    for _ in 0..6 {
        enqueue(&registry, info.clone());
    }

    let mut handles = Vec::new();
    for _ in 0..3 {
        let registry = registry.clone();
        let info = info.clone();
        handles.push(std::thread::spawn(move || {
            let worker = Worker::builder()
                .registry(registry)
                .claim_backoff(std::time::Duration::ZERO, std::time::Duration::from_millis(5))
                .build(
                    Box::new(StubFetcher),
                    StubLoader::succeeding(info, serde_json::Value::Null),
                    MapStore::empty(),
                );
            worker.drain().unwrap()
        }));
    }

    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert!(total <= 6, "a run is never executed twice");

    // A worker that exhausted its claim attempts ends its cycle early;
    // a follow-up cycle with no contention picks up whatever is left.
    let cleanup = Worker::builder()
        .registry(registry.clone())
        .build(
            Box::new(StubFetcher),
            StubLoader::succeeding(info, serde_json::Value::Null),
            MapStore::empty(),
        );
    let remainder = cleanup.drain().unwrap();
    assert_eq!(total + remainder, 6, "every run executed exactly once");

    let counts = registry.count_by_status().unwrap();
    assert_eq!(counts.get("COMPLETED"), Some(&6));
    assert_eq!(counts.get("QUEUED"), None);
}
