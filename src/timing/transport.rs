//! Transport clock: session-scoped elapsed time with drift-free pause accounting.
//!
//! Paused intervals are accumulated rather than reset, so elapsed time stays
//! continuous across any number of pause/resume cycles and notes never
//! "catch up" after a suspension.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

/// Source of monotonic wall time in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven clock for tests and headless simulation.
///
/// Clones share the same time value, so one handle can be given to the
/// transport while the caller keeps another to advance it.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Transport state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Idle,
    Running,
    Paused,
    Stopped,
}

/// Elapsed time was requested before the transport was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    NotStarted,
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockError::NotStarted => write!(f, "transport queried before start"),
        }
    }
}

impl std::error::Error for ClockError {}

/// Elapsed play time for one session.
pub struct Transport {
    clock: Box<dyn Clock>,
    state: TransportState,
    start_epoch: f64,
    total_paused_ms: f64,
    pause_start: f64,
    /// Last valid elapsed value, reported after stop.
    frozen_ms: f64,
}

impl Transport {
    /// Create an idle transport reading time from `clock`.
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            state: TransportState::Idle,
            start_epoch: 0.0,
            total_paused_ms: 0.0,
            pause_start: 0.0,
            frozen_ms: 0.0,
        }
    }

    /// Start (or restart) from zero.
    pub fn start(&mut self) {
        self.start_epoch = self.clock.now_ms();
        self.total_paused_ms = 0.0;
        self.pause_start = 0.0;
        self.frozen_ms = 0.0;
        self.state = TransportState::Running;
    }

    /// Pause. No-op unless running.
    pub fn pause(&mut self) {
        if self.state != TransportState::Running {
            return;
        }
        self.pause_start = self.clock.now_ms();
        self.state = TransportState::Paused;
    }

    /// Resume. No-op unless paused.
    pub fn resume(&mut self) {
        if self.state != TransportState::Paused {
            return;
        }
        self.total_paused_ms += self.clock.now_ms() - self.pause_start;
        self.state = TransportState::Running;
    }

    /// Stop, freezing the elapsed value. No-op while idle.
    pub fn stop(&mut self) {
        match self.state {
            TransportState::Running | TransportState::Paused => {
                self.frozen_ms = self.live_elapsed();
                self.state = TransportState::Stopped;
            }
            TransportState::Idle | TransportState::Stopped => {}
        }
    }

    /// Milliseconds since start, excluding paused intervals.
    ///
    /// While paused this is the value at the moment of pausing; after
    /// [`stop`](Self::stop) it is the value at the moment of stopping.
    pub fn elapsed(&self) -> Result<f64, ClockError> {
        match self.state {
            TransportState::Idle => {
                log::error!("transport elapsed() called before start()");
                Err(ClockError::NotStarted)
            }
            TransportState::Running | TransportState::Paused => Ok(self.live_elapsed()),
            TransportState::Stopped => Ok(self.frozen_ms),
        }
    }

    fn live_elapsed(&self) -> f64 {
        let now = match self.state {
            TransportState::Paused => self.pause_start,
            _ => self.clock.now_ms(),
        };
        now - self.start_epoch - self.total_paused_ms
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TransportState::Running
    }

    /// Total time spent paused since the last start.
    pub fn total_paused_ms(&self) -> f64 {
        self.total_paused_ms
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("state", &self.state)
            .field("start_epoch", &self.start_epoch)
            .field("total_paused_ms", &self.total_paused_ms)
            .finish_non_exhaustive()
    }
}
