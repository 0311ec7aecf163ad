//! Timing engine: beat-to-time conversion, transport clock and note scheduler.
//!
//! The scheduler does not spawn anything itself. It emits [`SchedulerEvent`]s
//! and the session decides what a spawn means for the scene, which keeps all
//! scheduling logic testable without a renderer.

pub mod beat;
pub mod scheduler;
pub mod transport;

pub use beat::{beat_duration_ms, fire_time_ms};
pub use scheduler::{NoteScheduler, ScheduledNote, SchedulerEvent};
pub use transport::{Clock, ClockError, ManualClock, SystemClock, Transport, TransportState};
