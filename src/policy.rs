//! Run policy: the engine's numeric heuristics as named, overridable values.
//!
//! The cap/warm-up/breaker numbers are policy constants, not derived values.
//! Test suites override them to exercise edge behavior deterministically.

use serde::{Deserialize, Serialize};

/// Cap applied to per-frame FPS readings (realistic monitor refresh rate).
pub const DEFAULT_MAX_REALISTIC_FPS: f64 = 240.0;

/// Paint callbacks awaited between initial append and the first-frame
/// checkpoint, so an unpainted frame is never sampled.
pub const DEFAULT_WARMUP_FRAMES: u32 = 3;

/// Average-FPS floor below which the rest of the group is skipped.
pub const DEFAULT_LOW_FPS_THRESHOLD: f64 = 2.0;

/// Tunable thresholds governing a benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RunPolicy {
    /// Per-frame FPS values are capped here; also sets the frame-time floor
    /// (`1000 / max_realistic_fps`) that clamps sub-frame readings.
    pub max_realistic_fps: f64,

    /// Number of paint waits before the first-frame checkpoint.
    pub warmup_frames: u32,

    /// Circuit breaker: a finished case with average FPS below this skips
    /// every remaining case in the group.
    pub low_fps_threshold: f64,

    /// Setup-time budget for the hang detector. `None` uses the case's own
    /// duration budget.
    pub hang_budget_ms: Option<f64>,
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self {
            max_realistic_fps: DEFAULT_MAX_REALISTIC_FPS,
            warmup_frames: DEFAULT_WARMUP_FRAMES,
            low_fps_threshold: DEFAULT_LOW_FPS_THRESHOLD,
            hang_budget_ms: None,
        }
    }
}

impl RunPolicy {
    /// Floor for a single frame's measured duration, in milliseconds.
    #[must_use]
    pub fn min_frame_time_ms(&self) -> f64 {
        1000.0 / self.max_realistic_fps
    }

    /// Hang budget for a case with the given duration budget.
    #[must_use]
    pub fn hang_budget_for(&self, duration_ms: f64) -> f64 {
        self.hang_budget_ms.unwrap_or(duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_named_constants() {
        let policy = RunPolicy::default();
        assert_eq!(policy.max_realistic_fps, 240.0);
        assert_eq!(policy.warmup_frames, 3);
        assert_eq!(policy.low_fps_threshold, 2.0);
        assert_eq!(policy.hang_budget_ms, None);
    }

    #[test]
    fn min_frame_time_is_one_240th_of_a_second() {
        let policy = RunPolicy::default();
        assert!((policy.min_frame_time_ms() - 4.1666).abs() < 0.001);
    }

    #[test]
    fn hang_budget_defaults_to_case_duration() {
        let policy = RunPolicy::default();
        assert_eq!(policy.hang_budget_for(5000.0), 5000.0);

        let tight = RunPolicy {
            hang_budget_ms: Some(100.0),
            ..RunPolicy::default()
        };
        assert_eq!(tight.hang_budget_for(5000.0), 100.0);
    }

    #[test]
    fn policy_deserializes_with_partial_fields() {
        let policy: RunPolicy = serde_json::from_str(r#"{"lowFpsThreshold": 10.0}"#).unwrap();
        assert_eq!(policy.low_fps_threshold, 10.0);
        assert_eq!(policy.warmup_frames, DEFAULT_WARMUP_FRAMES);
    }
}
