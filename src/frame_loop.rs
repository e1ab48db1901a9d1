//! Frame-synchronized update loop for one test case.
//!
//! Drives repeated `update_chart` calls, awaiting exactly one host paint
//! signal per frame (the sole suspension point, so frames never overlap).
//! Strictly cooperative; the loop only ends between iterations.

use tracing::{error, info, warn};

use crate::adapter::{FrameSync, MemoryProbe, RenderAdapter};
use crate::clock::Clock;
use crate::policy::RunPolicy;

/// How the update phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEnd {
    /// The duration budget elapsed.
    Completed,
    /// `update_chart` raised; the loop stopped immediately.
    Errored,
}

/// Measurements captured by one update phase.
#[derive(Debug, Clone)]
pub struct FrameLoopResult {
    pub end: LoopEnd,
    /// Frames whose update call succeeded.
    pub frame_count: u64,
    /// One clamped duration per completed frame, in milliseconds.
    pub frame_timings: Vec<f64>,
    /// Last memory sample, in megabytes.
    pub memory_mb: f64,
}

/// Run the update phase of one case.
///
/// `start_ms` is the initial-data-appended timestamp; the loop stops once
/// elapsed time since it reaches the config's duration budget. Per-frame
/// durations are clamped to a floor of `1000 / max_realistic_fps` ms so
/// cached or empty frames cannot skew the statistics.
pub async fn run_frame_loop(
    adapter: &mut dyn RenderAdapter,
    start_ms: f64,
    duration_ms: f64,
    policy: &RunPolicy,
    clock: &dyn Clock,
    frame_sync: &dyn FrameSync,
    memory: &dyn MemoryProbe,
) -> FrameLoopResult {
    let min_frame_time = policy.min_frame_time_ms();
    let mut frame: u64 = 0;
    let mut frame_timings: Vec<f64> = Vec::new();
    let mut memory_mb = 0.0;

    let end = loop {
        let elapsed = clock.now_ms() - start_ms;
        memory_mb = memory.sample_mb();

        if elapsed >= duration_ms {
            info!(
                frames = frame,
                elapsed_ms = elapsed,
                memory_mb = memory_mb,
                "update phase completed"
            );
            break LoopEnd::Completed;
        }

        let before = clock.now_ms();
        let datapoint_count = match adapter.update_chart(frame) {
            Ok(count) => count,
            Err(err) => {
                error!(frame, error = %err, "update_chart failed, ending case");
                break LoopEnd::Errored;
            }
        };
        frame += 1;

        frame_sync.next_frame().await;

        let frame_time = (clock.now_ms() - before).max(min_frame_time);
        frame_timings.push(frame_time);

        let instantaneous_fps = 1000.0 / frame_time;
        if instantaneous_fps < 1.0 {
            error!(frame, fps = instantaneous_fps, memory_mb, "frame rate critically low");
        } else if instantaneous_fps < 5.0 {
            warn!(frame, fps = instantaneous_fps, memory_mb, "frame rate low");
        } else if frame % 60 == 0 {
            info!(frame, fps = instantaneous_fps, memory_mb, datapoint_count, "update phase progress");
        }
    };

    FrameLoopResult {
        end,
        frame_count: frame,
        frame_timings,
        memory_mb,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::executor::block_on;

    use super::*;
    use crate::adapter::NullMemoryProbe;
    use crate::catalog::TestCaseConfig;
    use crate::clock::ManualClock;
    use crate::sim::{SimAdapter, SimBehavior, SimFrameSync};

    fn sim(behavior: SimBehavior, clock: &Arc<ManualClock>) -> SimAdapter {
        SimAdapter::new(TestCaseConfig::new(1, 1000), behavior, Arc::clone(clock))
    }

    #[test]
    fn loop_runs_until_duration_budget_elapses() {
        let clock = Arc::new(ManualClock::new());
        let sync = SimFrameSync::new(Arc::clone(&clock), 10.0);
        let behavior = SimBehavior::default();
        let mut adapter = sim(behavior, &clock);

        let result = block_on(run_frame_loop(
            &mut adapter,
            clock.now_ms(),
            100.0,
            &RunPolicy::default(),
            clock.as_ref(),
            &sync,
            &NullMemoryProbe,
        ));

        assert_eq!(result.end, LoopEnd::Completed);
        assert_eq!(result.frame_count, 10);
        assert_eq!(result.frame_timings.len(), 10);
        assert!(result.frame_timings.iter().all(|&t| (t - 10.0).abs() < 1e-6));
    }

    #[test]
    fn sub_frame_readings_are_clamped_to_floor() {
        let clock = Arc::new(ManualClock::new());
        // 1ms per paint is far below the 240fps floor of ~4.17ms.
        let sync = SimFrameSync::new(Arc::clone(&clock), 1.0);
        let mut adapter = sim(SimBehavior::default(), &clock);
        let policy = RunPolicy::default();

        let result = block_on(run_frame_loop(
            &mut adapter,
            clock.now_ms(),
            20.0,
            &policy,
            clock.as_ref(),
            &sync,
            &NullMemoryProbe,
        ));

        assert_eq!(result.end, LoopEnd::Completed);
        let floor = policy.min_frame_time_ms();
        assert!(!result.frame_timings.is_empty());
        assert!(result.frame_timings.iter().all(|&t| t >= floor));
    }

    #[test]
    fn update_error_ends_loop_with_error_outcome() {
        let clock = Arc::new(ManualClock::new());
        let sync = SimFrameSync::new(Arc::clone(&clock), 10.0);
        let behavior = SimBehavior {
            update_error_at_frame: Some(3),
            ..SimBehavior::default()
        };
        let mut adapter = sim(behavior, &clock);

        let result = block_on(run_frame_loop(
            &mut adapter,
            clock.now_ms(),
            1000.0,
            &RunPolicy::default(),
            clock.as_ref(),
            &sync,
            &NullMemoryProbe,
        ));

        assert_eq!(result.end, LoopEnd::Errored);
        // The failing frame's update never completed, so it is not counted
        // and its timing was never recorded.
        assert_eq!(result.frame_count, 3);
        assert_eq!(result.frame_timings.len(), 3);
    }

    #[test]
    fn zero_duration_budget_completes_without_frames() {
        let clock = Arc::new(ManualClock::new());
        let sync = SimFrameSync::new(Arc::clone(&clock), 10.0);
        let mut adapter = sim(SimBehavior::default(), &clock);

        let result = block_on(run_frame_loop(
            &mut adapter,
            clock.now_ms(),
            0.0,
            &RunPolicy::default(),
            clock.as_ref(),
            &sync,
            &NullMemoryProbe,
        ));

        assert_eq!(result.end, LoopEnd::Completed);
        assert_eq!(result.frame_count, 0);
        assert!(result.frame_timings.is_empty());
    }
}
