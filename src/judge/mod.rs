//! Hit judge: classifies strikes on falling notes and retires them.
//!
//! A note is judged when a hand overlaps its drum while the note's detection
//! box also overlaps that drum. The vertical offset between note and drum
//! decides early / good / late. A note that leaves the drum volume without
//! being struck is a miss. Every note is retired exactly once.

pub mod arena;
pub mod difficulty;

pub use arena::{ActiveNote, NoteArena, NoteId, NoteSpawn};
pub use difficulty::{Difficulty, DifficultyLevel};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::collision::EntityId;
use crate::score::ScoreAggregator;
use crate::track::InstrumentId;

/// Timing classification of one note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Judgment {
    Early,
    Good,
    Late,
    Miss,
}

impl Judgment {
    pub fn label(self) -> &'static str {
        match self {
            Judgment::Early => "early",
            Judgment::Good => "good",
            Judgment::Late => "late",
            Judgment::Miss => "miss",
        }
    }

    /// Whether the note was struck at all.
    pub fn is_hit(self) -> bool {
        self != Judgment::Miss
    }
}

impl fmt::Display for Judgment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of retiring one note.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub note: NoteId,
    pub instrument: InstrumentId,
    pub drum: EntityId,
    pub judgment: Judgment,
    /// `note.y - drum.y` at judgment time.
    pub position_delta: f64,
}

/// Judges notes and forwards verdicts to the score.
#[derive(Debug, Clone)]
pub struct HitJudge {
    hit_leniency: f64,
    judged: usize,
}

impl HitJudge {
    pub fn new(hit_leniency: f64) -> Self {
        Self {
            hit_leniency,
            judged: 0,
        }
    }

    pub fn hit_leniency(&self) -> f64 {
        self.hit_leniency
    }

    /// Classify a struck note by its vertical offset from the drum.
    ///
    /// Positive offsets mean the note is still above the drum.
    pub fn classify(&self, position_delta: f64) -> Judgment {
        if position_delta.abs() < self.hit_leniency {
            Judgment::Good
        } else if position_delta > 0.0 {
            Judgment::Early
        } else if position_delta < 0.0 {
            Judgment::Late
        } else {
            // Dead centre with a zero window.
            Judgment::Good
        }
    }

    /// Judge every candidate note for a hand striking the drum at `drum_y`.
    ///
    /// Callers pass the notes whose detection box currently overlaps the
    /// drum. Stale ids are skipped.
    pub fn strike<I>(
        &mut self,
        drum_y: f32,
        candidates: I,
        arena: &mut NoteArena,
        score: &mut ScoreAggregator,
    ) -> Vec<Verdict>
    where
        I: IntoIterator<Item = NoteId>,
    {
        let mut verdicts = Vec::new();
        for id in candidates {
            let Some(note) = arena.get(id) else {
                continue;
            };
            let delta = f64::from(note.position.y - drum_y);
            let judgment = self.classify(delta);
            if let Some(verdict) = self.retire(id, judgment, delta, arena, score) {
                verdicts.push(verdict);
            }
        }
        verdicts
    }

    /// Retire a note that passed through its drum unstruck.
    pub fn miss(
        &mut self,
        id: NoteId,
        drum_y: f32,
        arena: &mut NoteArena,
        score: &mut ScoreAggregator,
    ) -> Option<Verdict> {
        let delta = f64::from(arena.get(id)?.position.y - drum_y);
        self.retire(id, Judgment::Miss, delta, arena, score)
    }

    fn retire(
        &mut self,
        id: NoteId,
        judgment: Judgment,
        position_delta: f64,
        arena: &mut NoteArena,
        score: &mut ScoreAggregator,
    ) -> Option<Verdict> {
        let note = arena.remove(id)?;
        score.process_hit(judgment);
        self.judged += 1;
        log::debug!("{note} judged {judgment} (delta {position_delta:.3})");
        Some(Verdict {
            note: id,
            instrument: note.instrument,
            drum: note.drum,
            judgment,
            position_delta,
        })
    }

    /// Notes retired since construction or the last reset.
    pub fn judged(&self) -> usize {
        self.judged
    }

    pub fn reset(&mut self) {
        self.judged = 0;
    }
}
