//! Heartbeat-based dead-run reaping

use crate::support::*;
use chrono::{Duration, Utc};
use std::sync::Arc;
use workq::prelude::*;

fn running_with_heartbeat_age(info: ExperimentInfo, secs: i64) -> RunDocument {
    let mut run = RunDocument::queued(info, "main").with_status(RunStatus::Running);
    run.heartbeat = Some(Utc::now() - Duration::seconds(secs));
    run
}

#[test]
fn stale_running_run_is_marked_died_by_count() {
    let registry: Arc<dyn RunRegistry> = Arc::new(MemoryRegistry::new());
    let info = experiment("exp", "h1");
    let stale = running_with_heartbeat_age(info.clone(), 90);
    let stale_id = stale.id;
    registry.insert(stale).unwrap();
    registry
        .insert(running_with_heartbeat_age(info, 10))
        .unwrap();

    let counts = registry.count_by_status().unwrap();
    assert_eq!(counts.get("DIED"), Some(&1));
    assert_eq!(counts.get("RUNNING"), Some(&1));
    assert_eq!(
        registry.get(&stale_id).unwrap().unwrap().status,
        RunStatus::Died
    );
}

#[test]
fn running_run_without_heartbeat_is_left_alone() {
    // Only a recorded heartbeat can go stale; a run that has not beat yet
    // carries no liveness signal to judge.
    let registry: Arc<dyn RunRegistry> = Arc::new(MemoryRegistry::new());
    let run = RunDocument::queued(experiment("exp", "h1"), "main")
        .with_status(RunStatus::Running);
    let id = run.id;
    registry.insert(run).unwrap();

    let counts = registry.count_by_status().unwrap();
    assert_eq!(counts.get("RUNNING"), Some(&1));
    assert_eq!(counts.get("DIED"), None);
    assert_eq!(
        registry.get(&id).unwrap().unwrap().status,
        RunStatus::Running
    );
}

#[test]
fn concurrent_reaping_never_double_applies() {
    let registry = Arc::new(MemoryRegistry::new());
    let info = experiment("exp", "h1");
    registry
        .insert(running_with_heartbeat_age(info, 90))
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let registry = registry.clone();
        handles.push(std::thread::spawn(move || {
            registry.count_by_status().unwrap()
        }));
    }
    for handle in handles {
        let counts = handle.join().unwrap();
        assert_eq!(counts.get("DIED"), Some(&1));
        assert_eq!(counts.get("RUNNING"), None);
        assert_eq!(counts.values().sum::<u64>(), 1, "one run, counted once");
    }
}

#[test]
fn reaped_status_is_visible_through_worker_counts() {
    let registry: Arc<dyn RunRegistry> = Arc::new(MemoryRegistry::new());
    let info = experiment("exp", "h1");
    registry
        .insert(running_with_heartbeat_age(info.clone(), 120))
        .unwrap();
    enqueue(&registry, info.clone());

    let worker = Worker::builder()
        .registry(registry)
        .build(
            Box::new(StubFetcher),
            StubLoader::succeeding(info, serde_json::Value::Null),
            MapStore::empty(),
        );

    let counts = worker.queue_counts().unwrap();
    assert_eq!(counts.get("DIED"), Some(&1));
    assert_eq!(counts.get("QUEUED"), Some(&1));
    assert!(worker.has_queued().unwrap());
}

#[test]
fn marking_died_frees_nothing_else() {
    // Reaping is advisory bookkeeping: it only rewrites the status of the
    // stale run, never touching other documents' fields.
    let registry: Arc<dyn RunRegistry> = Arc::new(MemoryRegistry::new());
    let info = experiment("exp", "h1");
    let healthy = running_with_heartbeat_age(info.clone(), 1);
    let healthy_id = healthy.id;
    let healthy_beat = healthy.heartbeat;
    registry.insert(healthy).unwrap();
    registry
        .insert(running_with_heartbeat_age(info, 300))
        .unwrap();

    registry.count_by_status().unwrap();

    let doc = registry.get(&healthy_id).unwrap().unwrap();
    assert_eq!(doc.status, RunStatus::Running);
    assert_eq!(doc.heartbeat, healthy_beat);
}
