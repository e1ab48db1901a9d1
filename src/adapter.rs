//! Rendering adapter abstraction layer.
//!
//! The orchestration core depends only on these traits, injected at the
//! sequencer boundary; one implementation exists per charting library.

use async_trait::async_trait;

use crate::catalog::TestCaseConfig;
use crate::error::Result;

/// Identity of the charting library an adapter wraps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryInfo {
    pub name: String,
    pub version: String,
}

impl LibraryInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// `"name version"`, the identity used in persistence keys.
    #[must_use]
    pub fn identity(&self) -> String {
        format!("{} {}", self.name, self.version)
    }
}

impl std::fmt::Display for LibraryInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// Outcome of chart creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Chart surface is ready; proceed with the case.
    Proceed,
    /// The adapter declined to run; the case and the rest of its group are
    /// abandoned.
    Declined,
    /// The adapter does not implement this test; the case is marked
    /// UNSUPPORTED and the group continues.
    Unsupported,
}

/// Five-operation lifecycle for one test case against one charting library.
///
/// An adapter instance is exclusively owned by the currently-running case;
/// after `delete_chart` it must never be used again.
#[async_trait]
pub trait RenderAdapter: Send {
    /// Create the chart surface. Asynchronous; may signal that the test is
    /// declined or unsupported instead of proceeding.
    async fn create_chart(&mut self) -> Result<CreateOutcome>;

    /// Generate the synthetic dataset for the configured case.
    fn generate_data(&mut self);

    /// Append the initial dataset to the chart. May raise.
    fn append_data(&mut self) -> Result<()>;

    /// Apply one frame's worth of updates. Returns the cumulative data-point
    /// count. May raise.
    fn update_chart(&mut self, frame: u64) -> Result<u64>;

    /// Tear down the chart surface. Idempotent.
    fn delete_chart(&mut self);
}

/// Creates one adapter per test case for a given library.
pub trait AdapterFactory: Send + Sync {
    /// The library this factory builds adapters for.
    fn library(&self) -> LibraryInfo;

    /// Construct the adapter for one case. A failure here skips only the
    /// single case.
    fn create(&self, group_name: &str, config: &TestCaseConfig) -> Result<Box<dyn RenderAdapter>>;
}

/// The host paint/vsync signal: the engine's sole suspension point.
#[async_trait]
pub trait FrameSync: Send + Sync {
    /// Resolve when the host has painted the next frame.
    async fn next_frame(&self);
}

/// Samples the process's current memory footprint.
pub trait MemoryProbe: Send + Sync {
    /// Current memory usage in megabytes.
    fn sample_mb(&self) -> f64;
}

/// Probe that always reads zero, for hosts without memory introspection
/// and for deterministic tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMemoryProbe;

impl MemoryProbe for NullMemoryProbe {
    fn sample_mb(&self) -> f64 {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_identity_joins_name_and_version() {
        let lib = LibraryInfo::new("SimChart", "2.1.0");
        assert_eq!(lib.identity(), "SimChart 2.1.0");
        assert_eq!(lib.to_string(), "SimChart 2.1.0");
    }
}
