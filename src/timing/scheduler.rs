//! Note scheduler: walks each instrument's remaining-note queue against the
//! transport and emits spawn events in beat order.
//!
//! The scheduled-note table is computed once from the beat map and never
//! mutated. Every [`arm`](NoteScheduler::arm) re-derives the remaining queues
//! from it, so a session can be restarted any number of times.

use std::collections::{BTreeMap, VecDeque};

use crate::track::{BeatMap, InstrumentId};

use super::beat::{beat_duration_ms, fire_time_ms};
use super::transport::{ClockError, Transport};

/// A beat-map entry converted to an absolute fire time.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledNote {
    pub instrument: InstrumentId,
    pub beat: u32,
    pub fire_time_ms: f64,
}

/// Output of one scheduler poll.
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerEvent {
    /// A note reached its fire time and should be spawned.
    Spawn(ScheduledNote),
    /// Every queue is empty. Emitted once per arming.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Not armed yet, or halted.
    Idle,
    Polling,
    Completed,
}

/// Per-instrument FIFO scheduler.
#[derive(Debug, Clone)]
pub struct NoteScheduler {
    table: BTreeMap<InstrumentId, Vec<ScheduledNote>>,
    remaining: BTreeMap<InstrumentId, VecDeque<ScheduledNote>>,
    phase: Phase,
}

impl NoteScheduler {
    /// Convert a beat map into the scheduled-note table. The scheduler is idle
    /// until [`arm`](Self::arm) is called.
    pub fn from_beat_map(map: &BeatMap) -> Self {
        let duration = beat_duration_ms(map.bpm(), map.signature().beat_type);
        let table = map
            .notes()
            .iter()
            .map(|(instrument, beats)| {
                let notes = beats
                    .iter()
                    .map(|&beat| ScheduledNote {
                        instrument: instrument.clone(),
                        beat,
                        fire_time_ms: fire_time_ms(beat, duration),
                    })
                    .collect();
                (instrument.clone(), notes)
            })
            .collect();
        Self {
            table,
            remaining: BTreeMap::new(),
            phase: Phase::Idle,
        }
    }

    /// Reload queues from the immutable table and start polling.
    pub fn arm(&mut self) {
        self.remaining = self
            .table
            .iter()
            .map(|(instrument, notes)| (instrument.clone(), notes.iter().cloned().collect()))
            .collect();
        self.phase = Phase::Polling;
    }

    /// Stop polling without signalling completion.
    pub fn halt(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Emit every note whose fire time is at or before `elapsed_ms`.
    ///
    /// Multiple notes per instrument may fire in one poll (e.g. after a frame
    /// hitch). Spawns are ordered by fire time; ties keep instrument order.
    pub fn poll(&mut self, elapsed_ms: f64) -> Vec<SchedulerEvent> {
        if self.phase != Phase::Polling {
            return Vec::new();
        }

        let mut due = Vec::new();
        for queue in self.remaining.values_mut() {
            while let Some(head) = queue.front() {
                if elapsed_ms - head.fire_time_ms < 0.0 {
                    break;
                }
                if let Some(note) = queue.pop_front() {
                    due.push(note);
                }
            }
        }
        due.sort_by(|a, b| a.fire_time_ms.total_cmp(&b.fire_time_ms));

        let mut events: Vec<SchedulerEvent> = due.into_iter().map(SchedulerEvent::Spawn).collect();
        if self.remaining.values().all(VecDeque::is_empty) {
            self.phase = Phase::Completed;
            events.push(SchedulerEvent::Completed);
        }
        events
    }

    /// Poll using the transport's elapsed time. Nothing fires unless the
    /// transport is running.
    pub fn tick(&mut self, transport: &Transport) -> Result<Vec<SchedulerEvent>, ClockError> {
        let elapsed = transport.elapsed()?;
        if !transport.is_running() {
            return Ok(Vec::new());
        }
        Ok(self.poll(elapsed))
    }

    /// The immutable scheduled-note table.
    pub fn table(&self) -> &BTreeMap<InstrumentId, Vec<ScheduledNote>> {
        &self.table
    }

    /// Notes not yet emitted since the last arming.
    pub fn remaining(&self) -> usize {
        self.remaining.values().map(VecDeque::len).sum()
    }

    pub fn total_notes(&self) -> usize {
        self.table.values().map(Vec::len).sum()
    }

    pub fn is_polling(&self) -> bool {
        self.phase == Phase::Polling
    }

    pub fn is_completed(&self) -> bool {
        self.phase == Phase::Completed
    }

    /// Fire time of the last note in the table.
    pub fn last_fire_time_ms(&self) -> Option<f64> {
        self.table
            .values()
            .filter_map(|notes| notes.last().map(|n| n.fire_time_ms))
            .max_by(f64::total_cmp)
    }
}
