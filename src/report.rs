//! Tabular export of a run's results.
//!
//! One row per case with the benchmark columns: lib load, first frame, data
//! append, memory, min/max/average FPS, frame count, status. Rendered as a
//! plain text table for the terminal and as JSON rows for machine use.

use serde_json::{json, Value};

use crate::record::{CaseStatus, ResultRecord, Run};

const HEADERS: [&str; 13] = [
    "Lib",
    "Points",
    "Series",
    "Charts",
    "Lib Load (ms)",
    "First Frame (ms)",
    "Data Append (ms)",
    "Memory (MB)",
    "Min FPS",
    "Max FPS",
    "Avg FPS",
    "Frames",
    "Status",
];

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn fmt_u64(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Status text for one record: the status label, `ERRORED` for a case whose
/// update loop raised, `-` for a record that never reached its final
/// checkpoint.
#[must_use]
pub fn status_text(record: &ResultRecord) -> &'static str {
    if !record.is_finished() {
        return "-";
    }
    if record.is_errored && record.status == CaseStatus::Ok {
        return "ERRORED";
    }
    record.status.label()
}

fn row_cells(record: &ResultRecord) -> Vec<String> {
    let lib = match (&record.library_name, &record.library_version) {
        (Some(name), Some(version)) => format!("{name} {version}"),
        _ => "-".to_string(),
    };
    let config = record.config.as_ref();
    vec![
        lib,
        fmt_u64(config.map(|c| c.point_count)),
        fmt_u64(config.map(|c| c.series_count)),
        fmt_u64(config.and_then(|c| c.chart_count)),
        fmt_opt(record.lib_load_ms),
        fmt_opt(record.first_frame_ms),
        fmt_opt(record.data_append_ms),
        format!("{:.0}", record.memory_mb),
        format!("{:.2}", record.min_fps),
        format!("{:.2}", record.max_fps),
        format!("{:.2}", record.average_fps),
        record.frame_count.to_string(),
        status_text(record).to_string(),
    ]
}

/// Render the run as an aligned plain-text table.
#[must_use]
pub fn render_table(run: &Run) -> String {
    let rows: Vec<Vec<String>> = run.records().iter().map(row_cells).collect();

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut out = String::new();
    out.push_str(&format!("{}\n", run.group_name));
    let header_line: Vec<String> = HEADERS
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{h:>width$}", width = widths[i]))
        .collect();
    out.push_str(&header_line.join("  "));
    out.push('\n');
    out.push_str(&"-".repeat(header_line.join("  ").len()));
    out.push('\n');
    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{cell:>width$}", width = widths[i]))
            .collect();
        out.push_str(&line.join("  "));
        out.push('\n');
    }
    out
}

/// Machine-readable rows, one JSON object per case.
#[must_use]
pub fn json_rows(run: &Run) -> Vec<Value> {
    run.records()
        .iter()
        .map(|record| {
            json!({
                "library": record.library_name,
                "libraryVersion": record.library_version,
                "config": record.config,
                "libLoadMs": record.lib_load_ms,
                "firstFrameMs": record.first_frame_ms,
                "dataAppendMs": record.data_append_ms,
                "memoryMb": record.memory_mb,
                "minFps": record.min_fps,
                "maxFps": record.max_fps,
                "averageFps": record.average_fps,
                "frameCount": record.frame_count,
                "isErrored": record.is_errored,
                "status": status_text(record),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TestCaseConfig;

    fn run_with_one_case() -> Run {
        let mut run = Run::new("Line Test");
        let record = run.record_mut(0);
        record
            .started(TestCaseConfig::new(2, 500).with_charts(4), 0.0)
            .unwrap();
        record.set_library("SimChart", "1.0.0");
        record.lib_loaded(10.0).unwrap();
        record.data_generated(12.0).unwrap();
        record.data_appended(20.0).unwrap();
        record.first_frame_rendered(70.0).unwrap();
        record
            .finish(1020.0, 60, 32.0, vec![16.0; 60], false, CaseStatus::Ok, 240.0)
            .unwrap();
        run
    }

    #[test]
    fn table_contains_header_and_metrics() {
        let run = run_with_one_case();
        let table = render_table(&run);
        assert!(table.contains("Avg FPS"));
        assert!(table.contains("SimChart 1.0.0"));
        assert!(table.contains("OK"));
        assert!(table.contains("60"));
    }

    #[test]
    fn json_rows_expose_the_export_columns() {
        let run = run_with_one_case();
        let rows = json_rows(&run);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row["libLoadMs"], 10.0);
        assert_eq!(row["frameCount"], 60);
        assert_eq!(row["status"], "OK");
        assert_eq!(row["config"]["chartCount"], 4);
    }

    #[test]
    fn errored_update_case_renders_as_errored() {
        let mut run = Run::new("Line Test");
        let record = run.record_mut(0);
        record.started(TestCaseConfig::new(1, 100), 0.0).unwrap();
        record.lib_loaded(1.0).unwrap();
        record.data_generated(2.0).unwrap();
        record.data_appended(3.0).unwrap();
        record.first_frame_rendered(4.0).unwrap();
        record
            .finish(500.0, 7, 0.0, vec![16.0; 7], true, CaseStatus::Ok, 240.0)
            .unwrap();
        assert_eq!(status_text(&run.records()[0]), "ERRORED");
    }

    #[test]
    fn unfinished_record_renders_placeholder_status() {
        let mut run = Run::new("Line Test");
        run.record_mut(0)
            .started(TestCaseConfig::new(1, 100), 0.0)
            .unwrap();
        assert_eq!(status_text(&run.records()[0]), "-");
    }
}
