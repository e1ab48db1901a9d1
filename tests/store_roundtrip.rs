//! Persistence round-trip through a real sequencer run.
//!
//! The unit tests in `store` cover hand-built runs; here a simulated group
//! is executed end to end and the persisted shape is checked against it.

#![forbid(unsafe_code)]
#![allow(clippy::float_cmp)]

use std::sync::Arc;

use chartbench::adapter::{LibraryInfo, NullMemoryProbe};
use chartbench::catalog::{TestCaseConfig, TestGroup};
use chartbench::clock::ManualClock;
use chartbench::policy::RunPolicy;
use chartbench::record::{CaseStatus, Run};
use chartbench::sequencer::{run_group, BenchHost};
use chartbench::sim::{SimAdapterFactory, SimBehavior, SimFrameSync};
use chartbench::store::ResultStore;
use futures::executor::block_on;

fn library() -> LibraryInfo {
    LibraryInfo::new("SimChart", "1.0.0")
}

fn executed_run(group_name: &str, factory: &SimAdapterFactory, clock: &Arc<ManualClock>) -> Run {
    let test_group = TestGroup {
        name: group_name.to_string(),
        cases: vec![
            TestCaseConfig::new(1, 1000).with_duration_ms(200.0),
            TestCaseConfig::new(5, 1000).with_duration_ms(200.0),
        ],
    };
    let frame_sync = SimFrameSync::new(Arc::clone(clock), 10.0);
    let host = BenchHost {
        clock: clock.as_ref(),
        frame_sync: &frame_sync,
        memory: &NullMemoryProbe,
    };
    block_on(run_group(
        &test_group,
        factory,
        &host,
        &RunPolicy::default(),
    ))
    .expect("checkpoints driven in order")
}

#[test]
fn executed_run_roundtrips_without_frame_timings() {
    let dir = tempfile::tempdir().unwrap();
    let store = ResultStore::open(dir.path()).unwrap();

    let clock = Arc::new(ManualClock::new());
    let factory = SimAdapterFactory::new(library(), Arc::clone(&clock));
    let run = executed_run("Line Chart Performance Test", &factory, &clock);
    assert!(run.records().iter().all(|r| !r.frame_timings.is_empty()));

    let saved = store.save(&library(), &run).unwrap();
    assert_eq!(saved.id, "SimChart 1.0.0_Line Chart Performance Test");

    let fetched = store.get(&saved.id).unwrap().expect("record present");
    assert_eq!(fetched.library, "SimChart 1.0.0");
    assert_eq!(fetched.test_group, "Line Chart Performance Test");
    assert_eq!(fetched.results.len(), run.records().len());

    for (fetched, original) in fetched.results.iter().zip(run.records()) {
        assert!(fetched.frame_timings.is_empty());
        assert_eq!(
            serde_json::to_value(fetched).unwrap(),
            serde_json::to_value(original.without_frame_timings()).unwrap()
        );
    }
}

#[test]
fn failed_cases_persist_with_their_statuses() {
    let dir = tempfile::tempdir().unwrap();
    let store = ResultStore::open(dir.path()).unwrap();

    let clock = Arc::new(ManualClock::new());
    let factory = SimAdapterFactory::new(library(), Arc::clone(&clock)).with_case_behavior(
        0,
        SimBehavior {
            append_error: true,
            ..SimBehavior::default()
        },
    );
    let run = executed_run("Append Failure Group", &factory, &clock);

    let saved = store.save(&library(), &run).unwrap();
    let fetched = store.get(&saved.id).unwrap().expect("record present");

    assert_eq!(fetched.results[0].status, CaseStatus::ErrorAppendData);
    assert!(fetched.results[0].is_errored);
    assert_eq!(fetched.results[1].status, CaseStatus::Skipped);
}

#[test]
fn rerun_replaces_the_record_for_the_same_key() {
    let dir = tempfile::tempdir().unwrap();
    let store = ResultStore::open(dir.path()).unwrap();

    let first_clock = Arc::new(ManualClock::new());
    let first_factory = SimAdapterFactory::new(library(), Arc::clone(&first_clock));
    store
        .save(&library(), &executed_run("Rerun Group", &first_factory, &first_clock))
        .unwrap();

    let second_clock = Arc::new(ManualClock::new());
    let second_factory = SimAdapterFactory::new(library(), Arc::clone(&second_clock))
        .with_default_behavior(SimBehavior {
            update_cost_ms: 5.0,
            ..SimBehavior::default()
        });
    let second = executed_run("Rerun Group", &second_factory, &second_clock);
    let saved = store.save(&library(), &second).unwrap();

    let all = store.fetch_all().unwrap();
    assert_eq!(all.len(), 1);
    let fetched = store.get(&saved.id).unwrap().expect("record present");
    assert_eq!(
        fetched.results[0].frame_count,
        second.records()[0].frame_count
    );
}
