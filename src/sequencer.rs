//! Run sequencer - the top-level benchmark driver.
//!
//! Drives one test group's cases strictly one at a time:
//! 1. Stamp the record, construct the adapter, create the chart
//! 2. Generate data, append it, anchor the update phase
//! 3. Warm-up paints, first-frame checkpoint, hang check
//! 4. Frame loop, teardown, finalize, low-FPS circuit breaker
//!
//! Three policies are group-fatal (append failure, hang, low-FPS breaker);
//! each stamps config and library metadata on every remaining case before
//! marking it SKIPPED, preserving catalog index alignment.

use tracing::{error, info, warn};

use crate::adapter::{AdapterFactory, CreateOutcome, FrameSync, LibraryInfo, MemoryProbe};
use crate::catalog::TestGroup;
use crate::clock::Clock;
use crate::error::Result;
use crate::frame_loop::{run_frame_loop, LoopEnd};
use crate::policy::RunPolicy;
use crate::record::{CaseStatus, Run};

/// The host collaborators a run executes against.
pub struct BenchHost<'a> {
    pub clock: &'a dyn Clock,
    pub frame_sync: &'a dyn FrameSync,
    pub memory: &'a dyn MemoryProbe,
}

/// Execute every case of `group` against adapters from `factory`.
///
/// Always returns the run, including partially-executed groups; per-case
/// failures are encoded in the records' statuses. An error here means a
/// checkpoint was driven out of order, which is a bug, not a measurement.
pub async fn run_group(
    group: &TestGroup,
    factory: &dyn AdapterFactory,
    host: &BenchHost<'_>,
    policy: &RunPolicy,
) -> Result<Run> {
    let library = factory.library();
    let mut run = Run::new(&group.name);
    let cap = policy.max_realistic_fps;

    info!(group = %group.name, library = %library, cases = group.cases.len(), "starting test group");

    for (index, config) in group.cases.iter().enumerate() {
        let now = host.clock.now_ms();
        let record = run.record_mut(index);
        record.started(config.clone(), now)?;
        record.set_library(&library.name, &library.version);

        // Adapter construction failure skips this single case without
        // finalizing its record or affecting later cases.
        let mut adapter = match factory.create(&group.name, config) {
            Ok(adapter) => adapter,
            Err(err) => {
                error!(case = index, error = %err, "adapter construction failed, skipping case");
                continue;
            }
        };

        match adapter.create_chart().await {
            Ok(CreateOutcome::Proceed) => {}
            Ok(CreateOutcome::Unsupported) => {
                info!(case = index, "test unsupported by adapter");
                run.record_mut(index).finish(
                    host.clock.now_ms(),
                    0,
                    0.0,
                    Vec::new(),
                    true,
                    CaseStatus::Unsupported,
                    cap,
                )?;
                continue;
            }
            Ok(CreateOutcome::Declined) => {
                warn!(case = index, "adapter declined the test, halting group");
                run.record_mut(index).finish(
                    host.clock.now_ms(),
                    0,
                    0.0,
                    Vec::new(),
                    true,
                    CaseStatus::Skipped,
                    cap,
                )?;
                break;
            }
            Err(err) => {
                error!(case = index, error = %err, "create_chart failed, skipping case");
                adapter.delete_chart();
                continue;
            }
        }
        run.record_mut(index).lib_loaded(host.clock.now_ms())?;

        adapter.generate_data();
        run.record_mut(index).data_generated(host.clock.now_ms())?;

        if let Err(err) = adapter.append_data() {
            error!(case = index, error = %err, "append_data failed, halting group");
            adapter.delete_chart();
            run.record_mut(index).finish(
                host.clock.now_ms(),
                0,
                0.0,
                Vec::new(),
                true,
                CaseStatus::ErrorAppendData,
                cap,
            )?;
            skip_remaining(&mut run, group, &library, index + 1, host.clock, cap)?;
            break;
        }
        let start_ms = run.record_mut(index).data_appended(host.clock.now_ms())?;

        // Wait for several paints so the first frame with data is actually
        // rendered before it is sampled.
        for _ in 0..policy.warmup_frames {
            host.frame_sync.next_frame().await;
        }
        run.record_mut(index).first_frame_rendered(host.clock.now_ms())?;

        let setup_elapsed = run
            .record_mut(index)
            .elapsed_since_start(host.clock.now_ms());
        let hang_budget = policy.hang_budget_for(config.duration_ms);
        if setup_elapsed > hang_budget {
            error!(
                case = index,
                setup_ms = setup_elapsed,
                budget_ms = hang_budget,
                "setup time exceeded budget, marking case HANGING and halting group"
            );
            adapter.delete_chart();
            run.record_mut(index).finish(
                host.clock.now_ms(),
                0,
                0.0,
                Vec::new(),
                true,
                CaseStatus::Hanging,
                cap,
            )?;
            skip_remaining(&mut run, group, &library, index + 1, host.clock, cap)?;
            break;
        }

        let loop_result = run_frame_loop(
            adapter.as_mut(),
            start_ms,
            config.duration_ms,
            policy,
            host.clock,
            host.frame_sync,
            host.memory,
        )
        .await;

        adapter.delete_chart();
        drop(adapter);

        // An update-loop error finalizes only this case, with the frames
        // captured before the failure; later cases still execute.
        let errored = loop_result.end == LoopEnd::Errored;
        run.record_mut(index).finish(
            host.clock.now_ms(),
            loop_result.frame_count,
            loop_result.memory_mb,
            loop_result.frame_timings,
            errored,
            CaseStatus::Ok,
            cap,
        )?;

        let average_fps = run.records()[index].average_fps;
        if average_fps < policy.low_fps_threshold {
            warn!(
                case = index,
                average_fps,
                threshold = policy.low_fps_threshold,
                "average FPS below threshold, skipping remaining cases"
            );
            skip_remaining(&mut run, group, &library, index + 1, host.clock, cap)?;
            break;
        }
    }

    info!(group = %group.name, finished = run.records().iter().filter(|r| r.is_finished()).count(), "test group done");
    Ok(run)
}

/// Stamp and finalize every case from `from` onward as SKIPPED, keeping the
/// result set index-aligned with the catalog.
fn skip_remaining(
    run: &mut Run,
    group: &TestGroup,
    library: &LibraryInfo,
    from: usize,
    clock: &dyn Clock,
    max_realistic_fps: f64,
) -> Result<()> {
    for (offset, config) in group.cases.iter().enumerate().skip(from) {
        let now = clock.now_ms();
        let record = run.record_mut(offset);
        record.started(config.clone(), now)?;
        record.set_library(&library.name, &library.version);
        record.finish(
            now,
            0,
            0.0,
            Vec::new(),
            true,
            CaseStatus::Skipped,
            max_realistic_fps,
        )?;
    }
    Ok(())
}
