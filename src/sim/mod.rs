//! Seeded virtual player for headless sessions.
//!
//! The player looks at live notes, decides once per note whether to strike
//! it and when, and moves a hand onto the target drum for a short window
//! around that time. Uses a seeded `ChaCha8Rng` for determinism.

use std::collections::BTreeMap;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::collision::{EntityId, Handedness};
use crate::judge::{NoteArena, NoteId};
use crate::session::rig::HAND_REST_HEIGHT;
use crate::session::{AudioSink, DrumRig, GameSession, HandPoses, Scene};
use crate::timing::ClockError;

/// How long a hand stays on a drum once it strikes.
pub const STRIKE_HOLD_MS: f64 = 80.0;

/// Auto-player tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoPlayerConfig {
    pub seed: u64,
    /// Probability of attempting each note, 0.0 to 1.0.
    pub skill: f64,
    /// Strikes land uniformly within ±jitter_ms of the ideal time.
    pub jitter_ms: f64,
}

impl Default for AutoPlayerConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            skill: 0.9,
            jitter_ms: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StrikePlan {
    /// `None` when the player decided to let the note pass.
    strike_at_ms: Option<f64>,
    drum: EntityId,
}

/// Produces hand poses for a session.
#[derive(Debug, Clone)]
pub struct AutoPlayer {
    config: AutoPlayerConfig,
    rng: ChaCha8Rng,
    plans: BTreeMap<NoteId, StrikePlan>,
}

impl AutoPlayer {
    pub fn new(config: AutoPlayerConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            plans: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &AutoPlayerConfig {
        &self.config
    }

    /// Poses for the session's current elapsed time.
    pub fn observe<S: Scene, A: AudioSink>(
        &mut self,
        session: &GameSession<S, A>,
    ) -> Result<HandPoses, ClockError> {
        let elapsed = session.elapsed()?;
        Ok(self.poses(
            elapsed,
            session.active_notes(),
            session.rig(),
            session.config().fall_time_ms(),
        ))
    }

    /// Plan any new notes and return where the hands should be at `elapsed_ms`.
    pub fn poses(
        &mut self,
        elapsed_ms: f64,
        notes: &NoteArena,
        rig: &DrumRig,
        fall_time_ms: f64,
    ) -> HandPoses {
        self.plans.retain(|id, _| notes.contains(*id));
        for note in notes.iter() {
            if self.plans.contains_key(&note.id) {
                continue;
            }
            let plan = self.plan(note.fire_time_ms + fall_time_ms, note.drum);
            self.plans.insert(note.id, plan);
        }

        let mut due: Vec<(f64, Vec3, Handedness)> = self
            .plans
            .values()
            .filter_map(|plan| {
                let at = plan.strike_at_ms?;
                if elapsed_ms < at || elapsed_ms > at + STRIKE_HOLD_MS {
                    return None;
                }
                let drum = rig.by_id(plan.drum)?;
                Some((at, drum.position, side_for(drum.position)))
            })
            .collect();
        due.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut poses = HandPoses {
            left: Some(park_position(Handedness::Left)),
            right: Some(park_position(Handedness::Right)),
        };
        let mut busy = [false; 2];
        for (_, target, preferred) in due {
            let side = [preferred, other_side(preferred)]
                .into_iter()
                .find(|side| !busy[hand_index(*side)]);
            if let Some(side) = side {
                busy[hand_index(side)] = true;
                poses.set(side, Some(target));
            }
        }
        poses
    }

    fn plan(&mut self, ideal_ms: f64, drum: EntityId) -> StrikePlan {
        // NaN skill never strikes; non-finite jitter is ignored.
        let skill = if self.config.skill.is_nan() {
            0.0
        } else {
            self.config.skill.clamp(0.0, 1.0)
        };
        let attempt = self.rng.gen_bool(skill);
        let jitter = if self.config.jitter_ms.is_finite() && self.config.jitter_ms > 0.0 {
            self.rng
                .gen_range(-self.config.jitter_ms..=self.config.jitter_ms)
        } else {
            0.0
        };
        StrikePlan {
            strike_at_ms: attempt.then_some(ideal_ms + jitter),
            drum,
        }
    }

    /// Notes planned and still live.
    pub fn planned(&self) -> usize {
        self.plans.len()
    }
}

/// Left hand serves drums left of centre.
fn side_for(position: Vec3) -> Handedness {
    if position.x < 0.0 {
        Handedness::Left
    } else {
        Handedness::Right
    }
}

fn other_side(side: Handedness) -> Handedness {
    match side {
        Handedness::Left => Handedness::Right,
        Handedness::Right => Handedness::Left,
    }
}

fn hand_index(side: Handedness) -> usize {
    match side {
        Handedness::Left => 0,
        Handedness::Right => 1,
    }
}

/// Resting spot below the pads.
fn park_position(side: Handedness) -> Vec3 {
    let x = match side {
        Handedness::Left => -0.3,
        Handedness::Right => 0.3,
    };
    Vec3::new(x, HAND_REST_HEIGHT, -0.5)
}
