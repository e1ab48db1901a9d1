//! Test catalog: named groups of test-case configurations.
//!
//! The built-in catalog carries the standard benchmark ladders (line,
//! scatter, FIFO/ECG, multi-chart, heatmap, 3D, ...) with their exact
//! series/point/increment parameter steps.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default per-case duration budget, in milliseconds (5 seconds).
pub const DEFAULT_TEST_DURATION_MS: f64 = 5000.0;

/// One test-case configuration. Immutable once sourced from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseConfig {
    /// Number of series the adapter should create.
    pub series_count: u64,
    /// Number of data points per series.
    pub point_count: u64,
    /// Update-phase duration budget in milliseconds.
    pub duration_ms: f64,
    /// Points appended per frame for FIFO/streaming style tests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub increment_points: Option<u64>,
    /// Number of chart surfaces for multi-chart tests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_count: Option<u64>,
}

impl TestCaseConfig {
    pub fn new(series_count: u64, point_count: u64) -> Self {
        Self {
            series_count,
            point_count,
            duration_ms: DEFAULT_TEST_DURATION_MS,
            increment_points: None,
            chart_count: None,
        }
    }

    #[must_use]
    pub fn with_increment(mut self, increment_points: u64) -> Self {
        self.increment_points = Some(increment_points);
        self
    }

    #[must_use]
    pub fn with_charts(mut self, chart_count: u64) -> Self {
        self.chart_count = Some(chart_count);
        self
    }

    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// An ordered list of test cases sharing a theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestGroup {
    pub name: String,
    pub cases: Vec<TestCaseConfig>,
}

/// Ordered mapping of group id to test group.
#[derive(Debug, Clone)]
pub struct Catalog {
    groups: Vec<(u32, TestGroup)>,
}

impl Catalog {
    /// Build a catalog from explicit `(id, group)` pairs.
    pub fn from_groups(groups: Vec<(u32, TestGroup)>) -> Self {
        Self { groups }
    }

    /// Look up a group by its id.
    pub fn group(&self, id: u32) -> Result<&TestGroup> {
        self.groups
            .iter()
            .find(|(gid, _)| *gid == id)
            .map(|(_, group)| group)
            .ok_or_else(|| Error::catalog(format!("unknown test group id {id}")))
    }

    /// All `(id, group)` pairs in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &TestGroup)> {
        self.groups.iter().map(|(id, group)| (*id, group))
    }

    /// The standard built-in benchmark catalog.
    pub fn builtin() -> Self {
        fn group(name: &str, cases: Vec<TestCaseConfig>) -> TestGroup {
            TestGroup {
                name: name.to_string(),
                cases,
            }
        }
        let c = TestCaseConfig::new;

        let point_ladder = |series: u64| -> Vec<TestCaseConfig> {
            [
                1_000, 10_000, 50_000, 100_000, 200_000, 500_000, 1_000_000, 5_000_000, 10_000_000,
            ]
            .into_iter()
            .map(|points| c(series, points))
            .collect()
        };

        let groups = vec![
            (
                1,
                group(
                    "N line series M points",
                    [100, 200, 500, 1000, 2000, 4000, 8000]
                        .into_iter()
                        .map(|n| c(n, n))
                        .collect(),
                ),
            ),
            (2, group("Brownian Motion Scatter Series", point_ladder(1))),
            (
                3,
                group("Line series which is unsorted in x", point_ladder(1)),
            ),
            (
                4,
                group("Point series, sorted, updating y-values", point_ladder(1)),
            ),
            (
                5,
                group("Column chart with data ascending in X", point_ladder(1)),
            ),
            (6, group("Candlestick series test", point_ladder(1))),
            (
                7,
                group(
                    "FIFO / ECG Chart Performance Test",
                    vec![
                        c(5, 100).with_increment(100),
                        c(5, 10_000).with_increment(1_000),
                        c(5, 100_000).with_increment(10_000),
                        c(5, 1_000_000).with_increment(100_000),
                        c(5, 5_000_000).with_increment(250_000),
                        c(5, 10_000_000).with_increment(250_000),
                    ],
                ),
            ),
            (8, group("Mountain Chart Performance Test", point_ladder(1))),
            (
                9,
                group(
                    "Series Compression Test",
                    vec![
                        c(1, 1_000).with_increment(100),
                        c(1, 10_000).with_increment(1_000),
                        c(1, 100_000).with_increment(10_000),
                        c(1, 1_000_000).with_increment(100_000),
                        c(1, 10_000_000).with_increment(1_000_000),
                    ],
                ),
            ),
            (
                10,
                group(
                    "Multi Chart Performance Test",
                    [1u64, 2, 4, 8, 16, 32, 64, 128]
                        .into_iter()
                        .map(|charts| c(1, 10_000).with_increment(1_000).with_charts(charts))
                        .collect(),
                ),
            ),
            (
                11,
                group(
                    "Uniform Heatmap Performance Test",
                    [100, 200, 500, 1_000, 2_000, 4_000, 8_000, 16_000]
                        .into_iter()
                        .map(|points| c(1, points))
                        .collect(),
                ),
            ),
            (
                12,
                group(
                    "3D Point Cloud Performance Test",
                    [100, 1_000, 10_000, 100_000, 1_000_000, 2_000_000, 4_000_000]
                        .into_iter()
                        .map(|points| c(1, points))
                        .collect(),
                ),
            ),
            (
                13,
                group(
                    "3D Surface Performance Test",
                    [100, 200, 500, 1_000, 2_000, 4_000, 8_000]
                        .into_iter()
                        .map(|points| c(1, points))
                        .collect(),
                ),
            ),
        ];

        Self::from_groups(groups)
    }
}
