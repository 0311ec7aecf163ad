//! Host-side collaborators: the scene graph and audio playback.
//!
//! The session only talks to these through the traits below. The logging
//! implementations back the headless CLI.

use crate::judge::{ActiveNote, Judgment, NoteId};
use crate::track::InstrumentId;

/// Visual representation of notes and drum feedback.
pub trait Scene {
    /// A note entered play at its spawn position.
    fn spawn_note(&mut self, note: &ActiveNote);

    /// A note moved this tick.
    fn move_note(&mut self, _note: &ActiveNote) {}

    /// Remove a note's visual. Called exactly once per spawned note.
    fn dispose_note(&mut self, id: NoteId);

    /// Hit splash on the drum for `instrument`.
    fn show_judgment(&mut self, _instrument: &InstrumentId, _judgment: Judgment) {}
}

/// Fire-and-forget sample playback.
pub trait AudioSink {
    fn play_sample(&mut self, instrument: &InstrumentId);
}

impl<T: Scene + ?Sized> Scene for &mut T {
    fn spawn_note(&mut self, note: &ActiveNote) {
        (**self).spawn_note(note);
    }

    fn move_note(&mut self, note: &ActiveNote) {
        (**self).move_note(note);
    }

    fn dispose_note(&mut self, id: NoteId) {
        (**self).dispose_note(id);
    }

    fn show_judgment(&mut self, instrument: &InstrumentId, judgment: Judgment) {
        (**self).show_judgment(instrument, judgment);
    }
}

impl<T: AudioSink + ?Sized> AudioSink for &mut T {
    fn play_sample(&mut self, instrument: &InstrumentId) {
        (**self).play_sample(instrument);
    }
}

/// Scene that only logs. Counts live visuals so leaks are visible.
#[derive(Debug, Default)]
pub struct LogScene {
    live: usize,
}

impl LogScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visuals spawned and not yet disposed.
    pub fn live(&self) -> usize {
        self.live
    }
}

impl Scene for LogScene {
    fn spawn_note(&mut self, note: &ActiveNote) {
        self.live += 1;
        log::debug!("spawn {} note at {:.0}ms", note.instrument, note.fire_time_ms);
    }

    fn dispose_note(&mut self, _id: NoteId) {
        self.live = self.live.saturating_sub(1);
    }

    fn show_judgment(&mut self, instrument: &InstrumentId, judgment: Judgment) {
        log::info!("{instrument}: {judgment}");
    }
}

/// Audio sink that logs each triggered sample.
#[derive(Debug, Default)]
pub struct LogAudio {
    played: usize,
}

impl LogAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> usize {
        self.played
    }
}

impl AudioSink for LogAudio {
    fn play_sample(&mut self, instrument: &InstrumentId) {
        self.played += 1;
        log::trace!("play {instrument}");
    }
}
