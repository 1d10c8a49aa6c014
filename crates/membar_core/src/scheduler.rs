//! Background recalculation of the published segment list
//!
//! The render path only ever touches two things: the stale flag and the
//! published `Arc<SegmentList>`. Everything else happens on a rayon worker.
//!
//! Each [`RecalculationScheduler::request_refresh`] bumps a generation
//! counter. At most one worker runs at a time; requests that arrive while it
//! is busy are coalesced, and the worker re-runs until its result matches the
//! newest generation. Only that result is published.

use crate::aggregate::{aggregate, AggregateOptions, SegmentList};
use crate::error::{SchedulerError, SnapshotError};
use crate::usage::{UsageSnapshot, UsageSnapshotSource};
use membar_metrics::{Counter, StageProfiler};
use parking_lot::{Mutex, RwLock};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Samples kept per pipeline stage.
const PROFILE_SAMPLES: usize = 16;

/// Owns the stale flag and the published segment list for one widget.
#[derive(Clone)]
pub struct RecalculationScheduler {
    inner: Arc<Inner>,
}

struct Inner {
    source: Arc<dyn UsageSnapshotSource>,
    options: AggregateOptions,
    pool: Option<rayon::ThreadPool>,
    control: Mutex<Control>,
    stale: AtomicBool,
    published: RwLock<Option<Arc<SegmentList>>>,
    counters: Counter,
    profiler: StageProfiler,
}

#[derive(Debug, Default)]
struct Control {
    requested: u64,
    in_flight: bool,
    last_error: Option<SnapshotError>,
}

impl RecalculationScheduler {
    /// Schedules work on rayon's global pool.
    pub fn new(source: Arc<dyn UsageSnapshotSource>, options: AggregateOptions) -> Self {
        Self::build(source, options, None)
    }

    /// Schedules work on a dedicated pool of `threads` workers.
    pub fn with_worker_threads(
        source: Arc<dyn UsageSnapshotSource>,
        options: AggregateOptions,
        threads: usize,
    ) -> Result<Self, SchedulerError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("membar-recalc-{i}"))
            .build()?;
        Ok(Self::build(source, options, Some(pool)))
    }

    fn build(
        source: Arc<dyn UsageSnapshotSource>,
        options: AggregateOptions,
        pool: Option<rayon::ThreadPool>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                options,
                pool,
                control: Mutex::new(Control::default()),
                stale: AtomicBool::new(true),
                published: RwLock::new(None),
                counters: Counter::new(),
                profiler: StageProfiler::new(PROFILE_SAMPLES),
            }),
        }
    }

    /// Marks the list stale and makes sure a worker will produce a fresh one.
    /// Never blocks on the recomputation. Returns the new generation.
    pub fn request_refresh(&self) -> u64 {
        let mut control = self.inner.control.lock();
        control.requested += 1;
        let generation = control.requested;
        self.inner.stale.store(true, Ordering::Release);
        self.inner.counters.increment("refresh.requested", 1);

        if control.in_flight {
            self.inner.counters.increment("refresh.coalesced", 1);
            tracing::debug!(generation, "recalculation already running; coalescing request");
            return generation;
        }
        control.in_flight = true;
        drop(control);

        tracing::debug!(generation, "dispatching recalculation");
        let inner = Arc::clone(&self.inner);
        let job = move || inner.run_worker();
        match &self.inner.pool {
            Some(pool) => pool.spawn(job),
            None => rayon::spawn(job),
        }
        generation
    }

    /// The published list, or `None` while stale.
    pub fn current(&self) -> Option<Arc<SegmentList>> {
        if self.inner.stale.load(Ordering::Acquire) {
            return None;
        }
        self.inner.published.read().clone()
    }

    pub fn is_stale(&self) -> bool {
        self.inner.stale.load(Ordering::Acquire)
    }

    /// True while a worker is recomputing.
    pub fn is_busy(&self) -> bool {
        self.inner.control.lock().in_flight
    }

    /// Latest generation requested.
    pub fn generation(&self) -> u64 {
        self.inner.control.lock().requested
    }

    /// Generation of the published list, if any.
    pub fn published_generation(&self) -> Option<u64> {
        self.inner.published.read().as_ref().map(|list| list.generation())
    }

    /// Error from the most recent recomputation, cleared by a successful one.
    pub fn last_error(&self) -> Option<SnapshotError> {
        self.inner.control.lock().last_error.clone()
    }

    pub fn options(&self) -> &AggregateOptions {
        &self.inner.options
    }

    pub fn counters(&self) -> &Counter {
        &self.inner.counters
    }

    pub fn profiler(&self) -> &StageProfiler {
        &self.inner.profiler
    }
}

impl std::fmt::Debug for RecalculationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecalculationScheduler")
            .field("stale", &self.is_stale())
            .field("generation", &self.generation())
            .field("published_generation", &self.published_generation())
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn run_worker(&self) {
        loop {
            let generation = self.control.lock().requested;
            let outcome = self.recompute(generation);

            let mut control = self.control.lock();
            if control.requested != generation {
                self.counters.increment("refresh.discarded", 1);
                tracing::debug!(
                    generation,
                    latest = control.requested,
                    "discarding superseded recalculation"
                );
                continue;
            }

            match outcome {
                Ok(list) => {
                    let segments = list.len();
                    *self.published.write() = Some(Arc::new(list));
                    control.last_error = None;
                    self.stale.store(false, Ordering::Release);
                    self.counters.increment("refresh.published", 1);
                    tracing::info!(generation, segments, "published memory segments");
                }
                Err(err) => {
                    self.counters.increment("refresh.failed", 1);
                    // A prior list stays on screen; with none there is nothing to show.
                    let has_prior = self.published.read().is_some();
                    if has_prior {
                        self.stale.store(false, Ordering::Release);
                    }
                    tracing::warn!(
                        generation,
                        error = %err,
                        has_prior,
                        "memory recalculation failed"
                    );
                    control.last_error = Some(err);
                }
            }
            control.in_flight = false;
            return;
        }
    }

    fn recompute(&self, generation: u64) -> Result<SegmentList, SnapshotError> {
        let snapshot = self.profiler.time_stage("capture", || self.capture())?;
        let list = self
            .profiler
            .time_stage("aggregate", || aggregate(&snapshot, &self.options));
        Ok(list.with_generation(generation))
    }

    fn capture(&self) -> Result<UsageSnapshot, SnapshotError> {
        catch_unwind(AssertUnwindSafe(|| self.source.capture()))
            .unwrap_or_else(|_| Err(SnapshotError::Source("snapshot source panicked".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticUsageSource;
    use crate::usage::{PlatformMemory, UsageBreakdown};
    use std::time::{Duration, Instant};

    fn snapshot() -> UsageSnapshot {
        UsageSnapshot::new(
            [("a", UsageBreakdown::new(100))],
            400,
            PlatformMemory { ceiling: 1000, available: 1000 },
        )
    }

    fn wait_until_idle(scheduler: &RecalculationScheduler) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while scheduler.is_busy() {
            assert!(Instant::now() < deadline, "recalculation did not finish");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_starts_stale() {
        let scheduler = RecalculationScheduler::new(
            Arc::new(StaticUsageSource::new(snapshot())),
            AggregateOptions::default(),
        );
        assert!(scheduler.is_stale());
        assert!(scheduler.current().is_none());
        assert_eq!(scheduler.generation(), 0);
    }

    #[test]
    fn test_refresh_publishes() {
        let scheduler = RecalculationScheduler::new(
            Arc::new(StaticUsageSource::new(snapshot())),
            AggregateOptions::default(),
        );
        let generation = scheduler.request_refresh();
        wait_until_idle(&scheduler);

        let list = scheduler.current().expect("fresh after refresh");
        assert_eq!(list.generation(), generation);
        assert_eq!(list.len(), 3);
        assert_eq!(scheduler.published_generation(), Some(generation));
        assert!(scheduler.last_error().is_none());
    }

    #[test]
    fn test_failure_without_prior_list_stays_stale() {
        let source = || -> Result<UsageSnapshot, SnapshotError> {
            Err(SnapshotError::Unavailable { figure: "process resident memory" })
        };
        let scheduler = RecalculationScheduler::new(Arc::new(source), AggregateOptions::default());
        scheduler.request_refresh();
        wait_until_idle(&scheduler);

        assert!(scheduler.is_stale());
        assert!(scheduler.current().is_none());
        assert_eq!(
            scheduler.last_error(),
            Some(SnapshotError::Unavailable { figure: "process resident memory" })
        );
    }

    #[test]
    fn test_panicking_source_is_contained() {
        let source = || -> Result<UsageSnapshot, SnapshotError> { panic!("capture exploded") };
        let scheduler = RecalculationScheduler::new(Arc::new(source), AggregateOptions::default());
        scheduler.request_refresh();
        wait_until_idle(&scheduler);

        assert!(scheduler.is_stale());
        assert!(matches!(scheduler.last_error(), Some(SnapshotError::Source(_))));
    }
}
