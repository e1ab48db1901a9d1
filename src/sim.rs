//! Simulated rendering adapter and frame sync.
//!
//! Stands in for a real charting library in the CLI demo run and the test
//! suite: rendering work is modeled by advancing a [`ManualClock`], and every
//! lifecycle failure the sequencer must handle can be injected per case.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::adapter::{
    AdapterFactory, CreateOutcome, FrameSync, LibraryInfo, MemoryProbe, RenderAdapter,
};
use crate::catalog::TestCaseConfig;
use crate::clock::ManualClock;
use crate::error::{Error, Result};

/// Scripted behavior for one simulated case.
#[derive(Debug, Clone)]
pub struct SimBehavior {
    /// What `create_chart` reports.
    pub create_outcome: CreateOutcome,
    /// Clock time consumed by `create_chart` (library load).
    pub create_cost_ms: f64,
    /// Make `create_chart` raise after spending its cost.
    pub create_error: bool,
    /// Clock time consumed by `generate_data`.
    pub generate_cost_ms: f64,
    /// Clock time consumed by `append_data`.
    pub append_cost_ms: f64,
    /// Make `append_data` raise.
    pub append_error: bool,
    /// Clock time consumed inside each `update_chart` call.
    pub update_cost_ms: f64,
    /// Make `update_chart` raise when asked for this frame index.
    pub update_error_at_frame: Option<u64>,
}

impl Default for SimBehavior {
    fn default() -> Self {
        Self {
            create_outcome: CreateOutcome::Proceed,
            create_cost_ms: 0.0,
            create_error: false,
            generate_cost_ms: 0.0,
            append_cost_ms: 0.0,
            append_error: false,
            update_cost_ms: 0.0,
            update_error_at_frame: None,
        }
    }
}

/// Simulated chart adapter for one test case.
pub struct SimAdapter {
    config: TestCaseConfig,
    behavior: SimBehavior,
    /// Present for simulated-time runs; `None` leaves pacing to the host.
    clock: Option<Arc<ManualClock>>,
    points: u64,
    deleted: Arc<AtomicBool>,
}

impl SimAdapter {
    pub fn new(config: TestCaseConfig, behavior: SimBehavior, clock: Arc<ManualClock>) -> Self {
        Self {
            config,
            behavior,
            clock: Some(clock),
            points: 0,
            deleted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Adapter whose costs are ignored; pacing comes from the frame sync.
    pub fn realtime(config: TestCaseConfig, behavior: SimBehavior) -> Self {
        Self {
            config,
            behavior,
            clock: None,
            points: 0,
            deleted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle that observes whether `delete_chart` ran, usable after the
    /// sequencer has consumed the adapter.
    #[must_use]
    pub fn deleted_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.deleted)
    }

    fn spend(&self, cost_ms: f64) {
        if cost_ms <= 0.0 {
            return;
        }
        if let Some(clock) = &self.clock {
            clock.advance_ms(cost_ms);
        }
    }
}

#[async_trait]
impl RenderAdapter for SimAdapter {
    async fn create_chart(&mut self) -> Result<CreateOutcome> {
        self.spend(self.behavior.create_cost_ms);
        if self.behavior.create_error {
            return Err(Error::adapter(
                "SimChart",
                "simulated chart creation failure",
            ));
        }
        Ok(self.behavior.create_outcome)
    }

    fn generate_data(&mut self) {
        self.spend(self.behavior.generate_cost_ms);
    }

    fn append_data(&mut self) -> Result<()> {
        self.spend(self.behavior.append_cost_ms);
        if self.behavior.append_error {
            return Err(Error::append_data("simulated append failure"));
        }
        self.points = self.config.series_count * self.config.point_count;
        Ok(())
    }

    fn update_chart(&mut self, frame: u64) -> Result<u64> {
        if self.behavior.update_error_at_frame == Some(frame) {
            return Err(Error::update_chart(frame, "simulated update failure"));
        }
        self.spend(self.behavior.update_cost_ms);
        if let Some(increment) = self.config.increment_points {
            self.points += increment;
        }
        Ok(self.points)
    }

    fn delete_chart(&mut self) {
        self.deleted.store(true, Ordering::SeqCst);
    }
}

/// Factory handing out scripted [`SimAdapter`]s in case order.
pub struct SimAdapterFactory {
    library: LibraryInfo,
    clock: Option<Arc<ManualClock>>,
    default_behavior: SimBehavior,
    scripts: Mutex<Vec<Option<SimBehavior>>>,
    factory_error_at: Mutex<Vec<usize>>,
    next_case: AtomicUsize,
    deleted_flags: Mutex<Vec<Arc<AtomicBool>>>,
}

impl SimAdapterFactory {
    pub fn new(library: LibraryInfo, clock: Arc<ManualClock>) -> Self {
        Self {
            library,
            clock: Some(clock),
            default_behavior: SimBehavior::default(),
            scripts: Mutex::new(Vec::new()),
            factory_error_at: Mutex::new(Vec::new()),
            next_case: AtomicUsize::new(0),
            deleted_flags: Mutex::new(Vec::new()),
        }
    }

    /// Factory for wall-clock runs; simulated costs are ignored.
    pub fn realtime(library: LibraryInfo) -> Self {
        Self {
            library,
            clock: None,
            default_behavior: SimBehavior::default(),
            scripts: Mutex::new(Vec::new()),
            factory_error_at: Mutex::new(Vec::new()),
            next_case: AtomicUsize::new(0),
            deleted_flags: Mutex::new(Vec::new()),
        }
    }

    /// Behavior applied to every case without a per-case script.
    #[must_use]
    pub fn with_default_behavior(mut self, behavior: SimBehavior) -> Self {
        self.default_behavior = behavior;
        self
    }

    /// Script a specific case index (creation order).
    #[must_use]
    pub fn with_case_behavior(self, index: usize, behavior: SimBehavior) -> Self {
        {
            let mut scripts = self.scripts.lock().expect("scripts lock");
            if scripts.len() <= index {
                scripts.resize(index + 1, None);
            }
            scripts[index] = Some(behavior);
        }
        self
    }

    /// Make `create` itself fail for the given case index.
    #[must_use]
    pub fn with_factory_error_at(self, index: usize) -> Self {
        self.factory_error_at
            .lock()
            .expect("factory_error_at lock")
            .push(index);
        self
    }

    /// Number of adapters handed out so far.
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.next_case.load(Ordering::SeqCst)
    }

    /// Whether the adapter in creation-order slot `slot` was torn down.
    /// Slots count only successfully constructed adapters.
    #[must_use]
    pub fn adapter_deleted(&self, slot: usize) -> bool {
        self.deleted_flags
            .lock()
            .expect("deleted_flags lock")
            .get(slot)
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

impl AdapterFactory for SimAdapterFactory {
    fn library(&self) -> LibraryInfo {
        self.library.clone()
    }

    fn create(&self, _group_name: &str, config: &TestCaseConfig) -> Result<Box<dyn RenderAdapter>> {
        let index = self.next_case.fetch_add(1, Ordering::SeqCst);

        if self
            .factory_error_at
            .lock()
            .expect("factory_error_at lock")
            .contains(&index)
        {
            return Err(Error::adapter(
                self.library.identity(),
                format!("simulated construction failure for case {index}"),
            ));
        }

        let behavior = self
            .scripts
            .lock()
            .expect("scripts lock")
            .get(index)
            .and_then(Clone::clone)
            .unwrap_or_else(|| self.default_behavior.clone());

        let adapter = match &self.clock {
            Some(clock) => SimAdapter::new(config.clone(), behavior, Arc::clone(clock)),
            None => SimAdapter::realtime(config.clone(), behavior),
        };
        self.deleted_flags
            .lock()
            .expect("deleted_flags lock")
            .push(adapter.deleted_flag());
        Ok(Box::new(adapter))
    }
}

/// Frame sync that advances a [`ManualClock`] by a fixed interval per paint.
pub struct SimFrameSync {
    clock: Arc<ManualClock>,
    frame_interval_ms: f64,
}

impl SimFrameSync {
    pub fn new(clock: Arc<ManualClock>, frame_interval_ms: f64) -> Self {
        Self {
            clock,
            frame_interval_ms,
        }
    }
}

#[async_trait]
impl FrameSync for SimFrameSync {
    async fn next_frame(&self) {
        self.clock.advance_ms(self.frame_interval_ms);
    }
}

/// Wall-clock frame sync pacing paints at a fixed rate.
pub struct IntervalFrameSync {
    interval: Duration,
}

impl IntervalFrameSync {
    pub fn new(target_fps: f64) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / target_fps.max(1.0)),
        }
    }
}

#[async_trait]
impl FrameSync for IntervalFrameSync {
    async fn next_frame(&self) {
        tokio::time::sleep(self.interval).await;
    }
}

/// Memory probe returning a fixed value, for tests asserting memory fields.
#[derive(Debug, Clone, Copy)]
pub struct ConstMemoryProbe(pub f64);

impl MemoryProbe for ConstMemoryProbe {
    fn sample_mb(&self) -> f64 {
        self.0
    }
}
