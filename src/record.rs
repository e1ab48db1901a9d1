//! Per-case result records and the run's result set.
//!
//! Each test case owns one [`ResultRecord`], mutated strictly in checkpoint
//! order by the sequencer. The checkpoints form an explicit state machine
//! (Started → LibLoaded → DataGenerated → DataAppended → FirstFrameRendered
//! → Finished); a transition invoked out of order fails loudly instead of
//! silently tolerating any order.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::TestCaseConfig;
use crate::error::{Error, Result};

/// Terminal status of a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    Ok,
    /// Setup (lib load through first frame) exceeded the hang budget.
    Hanging,
    /// Initial data append raised.
    ErrorAppendData,
    /// The adapter does not implement this test.
    Unsupported,
    /// Not executed because an earlier case tripped a group-fatal policy.
    Skipped,
}

impl CaseStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Hanging => "HANGING",
            Self::ErrorAppendData => "ERROR_APPEND_DATA",
            Self::Unsupported => "UNSUPPORTED",
            Self::Skipped => "SKIPPED",
        }
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle phase of a result record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CasePhase {
    Created,
    Started,
    LibLoaded,
    DataGenerated,
    DataAppended,
    FirstFrameRendered,
    Finished,
}

impl CasePhase {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Started => "started",
            Self::LibLoaded => "lib_loaded",
            Self::DataGenerated => "data_generated",
            Self::DataAppended => "data_appended",
            Self::FirstFrameRendered => "first_frame_rendered",
            Self::Finished => "finished",
        }
    }
}

/// One test case's measurements. Frozen once [`ResultRecord::finish`] runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub phase: CasePhase,
    pub status: CaseStatus,
    /// Set when the update loop raised mid-case; the case keeps status OK
    /// with the frames captured before the error.
    pub is_errored: bool,

    pub library_name: Option<String>,
    pub library_version: Option<String>,
    pub config: Option<TestCaseConfig>,

    // Checkpoint timestamps, milliseconds on the run's monotonic clock.
    pub timestamp_test_start: Option<f64>,
    pub timestamp_lib_loaded: Option<f64>,
    pub timestamp_data_generated: Option<f64>,
    pub timestamp_initial_data_appended: Option<f64>,
    pub timestamp_first_frame_rendered: Option<f64>,
    pub timestamp_test_finish: Option<f64>,

    // Derived metrics.
    pub lib_load_ms: Option<f64>,
    pub first_frame_ms: Option<f64>,
    pub data_append_ms: Option<f64>,
    pub update_frames_ms: Option<f64>,
    pub frame_count: u64,
    pub min_fps: f64,
    pub max_fps: f64,
    pub average_fps: f64,
    pub memory_mb: f64,

    /// Raw per-frame durations; stripped before persistence.
    pub frame_timings: Vec<f64>,
}

impl Default for ResultRecord {
    fn default() -> Self {
        Self {
            phase: CasePhase::Created,
            status: CaseStatus::Ok,
            is_errored: false,
            library_name: None,
            library_version: None,
            config: None,
            timestamp_test_start: None,
            timestamp_lib_loaded: None,
            timestamp_data_generated: None,
            timestamp_initial_data_appended: None,
            timestamp_first_frame_rendered: None,
            timestamp_test_finish: None,
            lib_load_ms: None,
            first_frame_ms: None,
            data_append_ms: None,
            update_frames_ms: None,
            frame_count: 0,
            min_fps: 0.0,
            max_fps: 0.0,
            average_fps: 0.0,
            memory_mb: 0.0,
            frame_timings: Vec::new(),
        }
    }
}

impl ResultRecord {
    fn expect_phase(&self, expected: CasePhase, checkpoint: &'static str) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(Error::CheckpointOrder {
                checkpoint,
                phase: self.phase.name(),
            })
        }
    }

    /// First checkpoint: the case begins. Captures the config.
    pub fn started(&mut self, config: TestCaseConfig, now_ms: f64) -> Result<()> {
        self.expect_phase(CasePhase::Created, "started")?;
        self.config = Some(config);
        self.timestamp_test_start = Some(now_ms);
        self.phase = CasePhase::Started;
        Ok(())
    }

    /// Stamp library identity. Valid any time after `started`.
    pub fn set_library(&mut self, name: impl Into<String>, version: impl Into<String>) {
        self.library_name = Some(name.into());
        self.library_version = Some(version.into());
    }

    /// The adapter finished creating its chart surface.
    pub fn lib_loaded(&mut self, now_ms: f64) -> Result<()> {
        self.expect_phase(CasePhase::Started, "lib_loaded")?;
        self.timestamp_lib_loaded = Some(now_ms);
        self.lib_load_ms = self
            .timestamp_test_start
            .map(|start| now_ms - start);
        self.phase = CasePhase::LibLoaded;
        Ok(())
    }

    /// Synthetic data generation completed.
    pub fn data_generated(&mut self, now_ms: f64) -> Result<()> {
        self.expect_phase(CasePhase::LibLoaded, "data_generated")?;
        self.timestamp_data_generated = Some(now_ms);
        self.phase = CasePhase::DataGenerated;
        Ok(())
    }

    /// Initial data was appended to the chart. Returns the timestamp, which
    /// anchors the update phase.
    pub fn data_appended(&mut self, now_ms: f64) -> Result<f64> {
        self.expect_phase(CasePhase::DataGenerated, "data_appended")?;
        self.timestamp_initial_data_appended = Some(now_ms);
        self.data_append_ms = self
            .timestamp_data_generated
            .map(|generated| now_ms - generated);
        self.phase = CasePhase::DataAppended;
        Ok(now_ms)
    }

    /// First frame with data is on screen (after the warm-up paints).
    pub fn first_frame_rendered(&mut self, now_ms: f64) -> Result<()> {
        self.expect_phase(CasePhase::DataAppended, "first_frame_rendered")?;
        self.timestamp_first_frame_rendered = Some(now_ms);
        self.first_frame_ms = self
            .timestamp_test_start
            .map(|start| now_ms - start);
        self.phase = CasePhase::FirstFrameRendered;
        Ok(())
    }

    /// Elapsed time since the test-start checkpoint. Used by the hang check.
    #[must_use]
    pub fn elapsed_since_start(&self, now_ms: f64) -> f64 {
        self.timestamp_test_start
            .map_or(0.0, |start| now_ms - start)
    }

    /// Final checkpoint: freeze the record and derive the FPS metrics.
    ///
    /// Valid from any phase past `Created`: failure paths (UNSUPPORTED,
    /// SKIPPED, ERROR_APPEND_DATA, HANGING) finish early, the normal path
    /// finishes from `FirstFrameRendered`.
    #[allow(clippy::cast_precision_loss)]
    pub fn finish(
        &mut self,
        now_ms: f64,
        frame_count: u64,
        memory_mb: f64,
        frame_timings: Vec<f64>,
        is_errored: bool,
        status: CaseStatus,
        max_realistic_fps: f64,
    ) -> Result<()> {
        if self.phase == CasePhase::Created || self.phase == CasePhase::Finished {
            return Err(Error::CheckpointOrder {
                checkpoint: "finish",
                phase: self.phase.name(),
            });
        }

        self.timestamp_test_finish = Some(now_ms);
        self.update_frames_ms = self
            .timestamp_initial_data_appended
            .map(|appended| now_ms - appended);
        self.frame_count = frame_count;
        self.memory_mb = memory_mb;
        self.is_errored = is_errored;
        self.status = status;

        // Average uses actual elapsed wall time of the update phase, not the
        // nominal duration budget.
        self.average_fps = match self.update_frames_ms {
            Some(elapsed) if elapsed > 0.0 => 1000.0 * frame_count as f64 / elapsed,
            Some(elapsed) => {
                warn!(elapsed_ms = elapsed, frame_count, "update phase elapsed time is degenerate, reporting averageFPS = 0");
                0.0
            }
            None => 0.0,
        };

        if frame_timings.is_empty() {
            self.min_fps = self.average_fps;
            self.max_fps = self.average_fps;
        } else {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for &timing in &frame_timings {
                let fps = (1000.0 / timing).min(max_realistic_fps);
                min = min.min(fps);
                max = max.max(fps);
            }
            self.min_fps = min;
            self.max_fps = max;
        }

        self.frame_timings = frame_timings;
        self.phase = CasePhase::Finished;
        Ok(())
    }

    /// Whether the record reached its final checkpoint.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == CasePhase::Finished
    }

    /// Copy with the bulky per-frame timing array removed, for persistence.
    #[must_use]
    pub fn without_frame_timings(&self) -> Self {
        let mut stripped = self.clone();
        stripped.frame_timings = Vec::new();
        stripped
    }
}

/// One benchmark run: an append-only sequence of result records,
/// index-aligned with the executed group's catalog order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub group_name: String,
    records: Vec<ResultRecord>,
}

impl Run {
    pub fn new(group_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            records: Vec::new(),
        }
    }

    /// Fetch the record for a case index, creating empty records up to and
    /// including it on first access.
    pub fn record_mut(&mut self, index: usize) -> &mut ResultRecord {
        while self.records.len() <= index {
            self.records.push(ResultRecord::default());
        }
        &mut self.records[index]
    }

    #[must_use]
    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }
}
