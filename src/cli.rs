//! CLI argument parsing using Clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// chartbench - charting-library rendering benchmark driver
#[derive(Parser, Debug)]
#[command(name = "chartbench")]
#[command(version, about, long_about = None)]
#[command(after_help = "Examples:
  chartbench list                          Show the built-in test groups
  chartbench run --group 1                 Run a group against the simulated adapter
  chartbench run --group 7 --realtime      Pace the run on the wall clock at 60fps
  chartbench results                       Dump persisted results
  chartbench results --library 'SimChart 1.0.0'
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one test group and persist its results
    Run {
        /// Test group id (see `chartbench list`)
        #[arg(long)]
        group: u32,

        /// Override the per-case duration budget, in milliseconds
        #[arg(long)]
        duration_ms: Option<f64>,

        /// Directory holding persisted results
        #[arg(long, default_value = ".chartbench", env = "CHARTBENCH_STORE")]
        store_dir: PathBuf,

        /// Simulated paint interval, in milliseconds (~60fps by default)
        #[arg(long, default_value_t = 16.67)]
        frame_interval_ms: f64,

        /// Simulated per-frame update cost, in milliseconds
        #[arg(long, default_value_t = 0.0)]
        update_cost_ms: f64,

        /// Pace frames on the wall clock instead of simulated time
        #[arg(long)]
        realtime: bool,

        /// Write the full-fidelity run (frame timings included) to this path
        #[arg(long)]
        export: Option<PathBuf>,

        /// Library name reported by the simulated adapter
        #[arg(long, default_value = "SimChart")]
        lib_name: String,

        /// Library version reported by the simulated adapter
        #[arg(long, default_value = "1.0.0")]
        lib_version: String,
    },

    /// List the built-in test groups
    List,

    /// Show persisted results
    Results {
        /// Directory holding persisted results
        #[arg(long, default_value = ".chartbench", env = "CHARTBENCH_STORE")]
        store_dir: PathBuf,

        /// Only records for this library identity (e.g. "SimChart 1.0.0")
        #[arg(long)]
        library: Option<String>,

        /// Only records for this test group name
        #[arg(long)]
        group: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_command_parses_with_defaults() {
        let cli = Cli::try_parse_from(["chartbench", "run", "--group", "1"]).unwrap();
        match cli.command {
            Command::Run {
                group,
                frame_interval_ms,
                realtime,
                ..
            } => {
                assert_eq!(group, 1);
                assert!((frame_interval_ms - 16.67).abs() < 1e-9);
                assert!(!realtime);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn results_filters_are_optional() {
        let cli = Cli::try_parse_from(["chartbench", "results"]).unwrap();
        match cli.command {
            Command::Results { library, group, .. } => {
                assert!(library.is_none());
                assert!(group.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
