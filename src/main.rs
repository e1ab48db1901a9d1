//! chartbench - charting-library rendering benchmark driver.

#![forbid(unsafe_code)]

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use chartbench::adapter::LibraryInfo;
use chartbench::catalog::{Catalog, TestGroup};
use chartbench::cli::{Cli, Command};
use chartbench::clock::{Clock, ManualClock, WallClock};
use chartbench::policy::RunPolicy;
use chartbench::record::Run;
use chartbench::report;
use chartbench::sequencer::{run_group, BenchHost};
use chartbench::sim::{IntervalFrameSync, SimAdapterFactory, SimBehavior, SimFrameSync};
use chartbench::store::ResultStore;
use chartbench::system::{ProcessMemoryProbe, SystemInfo};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            group,
            duration_ms,
            store_dir,
            frame_interval_ms,
            update_cost_ms,
            realtime,
            export,
            lib_name,
            lib_version,
        } => {
            let catalog = Catalog::builtin();
            let mut test_group = catalog.group(group)?.clone();
            if let Some(duration_ms) = duration_ms {
                for case in &mut test_group.cases {
                    case.duration_ms = duration_ms;
                }
            }

            println!("{}\n", SystemInfo::capture());

            let library = LibraryInfo::new(lib_name, lib_version);
            let run = execute(
                &test_group,
                library.clone(),
                frame_interval_ms,
                update_cost_ms,
                realtime,
            )?;

            print!("{}", report::render_table(&run));

            let store = ResultStore::open(&store_dir)?;
            let persisted = store.save(&library, &run)?;
            println!("\nsaved results under key: {}", persisted.id);

            if let Some(path) = export {
                let json = serde_json::to_vec_pretty(&run)?;
                fs::write(&path, json)
                    .with_context(|| format!("writing export to {}", path.display()))?;
                println!("exported full run to {}", path.display());
            }
        }
        Command::List => {
            let catalog = Catalog::builtin();
            for (id, group) in catalog.iter() {
                println!("{id:>3}  {} ({} cases)", group.name, group.cases.len());
            }
        }
        Command::Results {
            store_dir,
            library,
            group,
        } => {
            let store = ResultStore::open(&store_dir)?;
            let records = match (library, group) {
                (Some(library), None) => store.find_by_library(&library)?,
                (None, Some(group)) => store.find_by_test_group(&group)?,
                (Some(library), Some(group)) => store
                    .find_by_library(&library)?
                    .into_iter()
                    .filter(|record| record.test_group == group)
                    .collect(),
                (None, None) => store.fetch_all()?,
            };
            if records.is_empty() {
                println!("no stored results");
            }
            for record in records {
                println!(
                    "{}  ({} cases, saved {})",
                    record.id,
                    record.results.len(),
                    record.saved_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
        }
    }
    Ok(())
}

/// Run one group on a current-thread runtime, with either simulated or
/// wall-clock frame pacing.
fn execute(
    group: &TestGroup,
    library: LibraryInfo,
    frame_interval_ms: f64,
    update_cost_ms: f64,
    realtime: bool,
) -> Result<Run> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("building runtime")?;
    let policy = RunPolicy::default();
    let behavior = SimBehavior {
        update_cost_ms,
        ..SimBehavior::default()
    };

    let run = if realtime {
        let clock = WallClock::new();
        let frame_sync = IntervalFrameSync::new(1000.0 / frame_interval_ms.max(0.001));
        let memory = ProcessMemoryProbe::new();
        let factory = SimAdapterFactory::realtime(library).with_default_behavior(behavior);
        let host = BenchHost {
            clock: &clock,
            frame_sync: &frame_sync,
            memory: &memory,
        };
        runtime.block_on(run_group(group, &factory, &host, &policy))?
    } else {
        let clock = Arc::new(ManualClock::new());
        let frame_sync = SimFrameSync::new(Arc::clone(&clock), frame_interval_ms);
        let memory = ProcessMemoryProbe::new();
        let factory =
            SimAdapterFactory::new(library, Arc::clone(&clock)).with_default_behavior(behavior);
        let host = BenchHost {
            clock: clock.as_ref() as &dyn Clock,
            frame_sync: &frame_sync,
            memory: &memory,
        };
        runtime.block_on(run_group(group, &factory, &host, &policy))?
    };
    Ok(run)
}
