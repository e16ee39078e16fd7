//! The repeating tick — one process-wide scheduler with explicit start/stop.
//!
//! RULES:
//!   - One logical thread: start() runs the loop on the calling thread.
//!   - The first tick fires immediately, then one per period.
//!   - No queuing, no skipping: an overrunning pass is followed at once by
//!     the next one, and deadlines are kept on the fixed grid otherwise.
//!   - stop() may be called from the tick callback or any other thread via
//!     a StopHandle; the loop exits before its next tick.
//!   - stop() is final. A stop issued before start() makes start() return
//!     without ticking.

use crate::{
    clock::TimeSource,
    engine::DashboardEngine,
    event::DashEvent,
    render::RenderSurface,
    types::Tick,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

/// Cloneable handle that stops a scheduler. The request latches: nothing
/// clears it once set.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) { self.0.store(true, Ordering::SeqCst); }

    pub fn is_stopped(&self) -> bool { self.0.load(Ordering::SeqCst) }
}

#[derive(Debug)]
pub struct Scheduler {
    period: Duration,
    stop:   StopHandle,
    active: AtomicBool,
}

impl Default for Scheduler {
    fn default() -> Self { Self::new(DEFAULT_PERIOD) }
}

impl Scheduler {
    pub fn new(period: Duration) -> Self {
        Self { period, stop: StopHandle::default(), active: AtomicBool::new(false) }
    }

    /// Scheduler using the engine's configured tick period.
    pub fn for_engine(engine: &DashboardEngine) -> Self {
        Self::new(engine.tick_period())
    }

    pub fn period(&self) -> Duration { self.period }

    pub fn stop_handle(&self) -> StopHandle { self.stop.clone() }

    pub fn stop(&self) { self.stop.stop(); }

    /// True while `start` is looping and no stop has been requested.
    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst) && !self.stop.is_stopped()
    }

    /// Tick until stopped. `on_tick` sees the engine, the surface and the
    /// tick's events after every pass. Returns the number of ticks run.
    pub fn start<S, T, F>(
        &self,
        engine: &mut DashboardEngine,
        surface: &mut S,
        time: &T,
        mut on_tick: F,
    ) -> Tick
    where
        S: RenderSurface + ?Sized,
        T: TimeSource + ?Sized,
        F: FnMut(&DashboardEngine, &S, &[DashEvent]),
    {
        if self.stop.is_stopped() {
            log::info!("scheduler stopped before start; not ticking");
            return 0;
        }
        self.active.store(true, Ordering::SeqCst);
        log::info!("scheduler started, period {:?}", self.period);

        let mut ticks: Tick = 0;
        let mut deadline = Instant::now();

        while !self.stop.is_stopped() {
            let events = engine.tick(time.now(), &mut *surface);
            ticks += 1;
            on_tick(engine, &*surface, &events);

            if self.stop.is_stopped() {
                break;
            }

            deadline += self.period;
            let now = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
            } else {
                deadline = now;
            }
        }

        self.active.store(false, Ordering::SeqCst);
        log::info!("scheduler stopped after {ticks} ticks");
        ticks
    }
}
