//! Simulation clock - the single cooperative writer
//!
//! Drives the shared engine's tick function on a worker thread at a fixed
//! wall-clock period. The loop holds the write lock only for the duration
//! of one tick; the sleep between ticks happens outside the lock, so
//! readers are never blocked for longer than one fleet update.
//!
//! Lifecycle is `stopped -> running -> stopped`:
//! - `start` is a no-op while a loop is live and reaps a terminated
//!   predecessor before spawning, so there is never more than one loop.
//! - `stop` raises a flag the loop polls between sleep slices; the loop
//!   terminates within one tick interval. The call waits for thread exit
//!   with a bounded timeout and reports whether the loop exited in time.
//!
//! Ticks are strictly sequential for a given clock; the update order of
//! buses within a tick is unspecified.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::orchestrator::engine::FleetEngine;

/// Granularity at which the loop's sleep re-checks the stop flag.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How long `stop` waits for the loop thread before giving up.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Fixed-cadence driver for a shared [`FleetEngine`].
///
/// # Example
/// ```no_run
/// use std::sync::{Arc, RwLock};
/// use std::time::Duration;
/// use fleet_simulator_core_rs::{
///     FleetEngine, RouteCatalog, SimulationClock, SimulationConfig,
/// };
///
/// let engine = FleetEngine::new(RouteCatalog::load(None), SimulationConfig::default()).unwrap();
/// let engine = Arc::new(RwLock::new(engine));
///
/// let mut clock = SimulationClock::new(Arc::clone(&engine), Duration::from_secs(1));
/// clock.start();
/// std::thread::sleep(Duration::from_secs(3));
/// assert!(clock.stop(), "loop should exit within the shutdown timeout");
/// ```
pub struct SimulationClock {
    engine: Arc<RwLock<FleetEngine>>,
    tick_interval: Duration,
    shutdown_timeout: Duration,
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SimulationClock {
    pub fn new(engine: Arc<RwLock<FleetEngine>>, tick_interval: Duration) -> Self {
        Self {
            engine,
            tick_interval,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            stop_flag: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Override the bounded shutdown wait.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Whether a loop thread is currently live.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start the tick loop.
    ///
    /// No-op while a loop is live; a double start never spawns a second
    /// loop. If a previous loop has terminated, it is joined before the
    /// new one spawns, so at most one loop ever runs.
    pub fn start(&mut self) {
        if let Some(handle) = &self.handle {
            if !handle.is_finished() {
                return;
            }
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }

        self.stop_flag.store(false, Ordering::SeqCst);

        let engine = Arc::clone(&self.engine);
        let stop = Arc::clone(&self.stop_flag);
        let interval = self.tick_interval;

        self.handle = Some(thread::spawn(move || run_loop(engine, stop, interval)));
    }

    /// Request loop termination and wait for it, bounded.
    ///
    /// Idempotent and safe before `start`. Returns `true` when no loop was
    /// running or the loop exited within the shutdown timeout; `false`
    /// when the wait timed out (the handle is kept so a later call can
    /// finish reaping it).
    pub fn stop(&mut self) -> bool {
        self.stop_flag.store(true, Ordering::SeqCst);

        let Some(handle) = self.handle.take() else {
            return true;
        };

        let deadline = Instant::now() + self.shutdown_timeout;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                self.handle = Some(handle);
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }

        let _ = handle.join();
        true
    }

    /// The configured tick period.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }
}

impl Drop for SimulationClock {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The loop body: tick, then sleep in slices until the next boundary.
///
/// `elapsed_seconds` handed to the engine is the nominal interval; jitter
/// from scheduling is absorbed by realigning the next deadline rather than
/// bursting catch-up ticks.
fn run_loop(engine: Arc<RwLock<FleetEngine>>, stop: Arc<AtomicBool>, interval: Duration) {
    let elapsed_seconds = interval.as_secs_f64();
    let mut next_deadline = Instant::now() + interval;

    while !stop.load(Ordering::SeqCst) {
        {
            let mut engine = engine.write().unwrap_or_else(PoisonError::into_inner);
            engine.tick(elapsed_seconds);
        }

        loop {
            if stop.load(Ordering::SeqCst) {
                return;
            }
            let now = Instant::now();
            if now >= next_deadline {
                break;
            }
            thread::sleep((next_deadline - now).min(STOP_POLL_INTERVAL));
        }

        let now = Instant::now();
        next_deadline += interval;
        if next_deadline < now {
            next_deadline = now + interval;
        }
    }
}
