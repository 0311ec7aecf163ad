//! Score aggregation: combo multiplier, judgment counters and accuracy.
//!
//! Combo acts as a multiplier on every hit's point value. The first hit after
//! a reset or a miss scores at base value. Accuracy starts at
//! [`ACCURACY_BASELINE`] and is recomputed after every judgment.

use serde::{Deserialize, Serialize};

use crate::judge::Judgment;

/// Accuracy reported before anything has been judged.
pub const ACCURACY_BASELINE: f64 = 100.0;

/// Accuracy weight of early and late hits (good hits weigh 100).
const OFF_BEAT_WEIGHT: f64 = 33.0;

/// Base points awarded per judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointValues {
    pub early: u64,
    pub good: u64,
    pub late: u64,
}

impl PointValues {
    pub fn value(&self, judgment: Judgment) -> u64 {
        match judgment {
            Judgment::Early => self.early,
            Judgment::Good => self.good,
            Judgment::Late => self.late,
            Judgment::Miss => 0,
        }
    }
}

impl Default for PointValues {
    fn default() -> Self {
        Self {
            early: 100,
            good: 300,
            late: 100,
        }
    }
}

/// Immutable view of the score for HUD and end screens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub points: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub accuracy_percent: f64,
    pub early: u32,
    pub good: u32,
    pub late: u32,
    pub miss: u32,
}

impl ScoreSnapshot {
    /// Number of judgments recorded, misses included.
    pub fn total_judged(&self) -> u32 {
        self.early + self.good + self.late + self.miss
    }
}

/// Running score for one session.
#[derive(Debug, Clone)]
pub struct ScoreAggregator {
    values: PointValues,
    points: u64,
    combo: u32,
    max_combo: u32,
    early: u32,
    good: u32,
    late: u32,
    miss: u32,
    accuracy_percent: f64,
}

impl ScoreAggregator {
    pub fn new(values: PointValues) -> Self {
        Self {
            values,
            points: 0,
            combo: 0,
            max_combo: 0,
            early: 0,
            good: 0,
            late: 0,
            miss: 0,
            accuracy_percent: ACCURACY_BASELINE,
        }
    }

    /// Apply one judgment.
    pub fn process_hit(&mut self, judgment: Judgment) {
        match judgment {
            Judgment::Early => self.early += 1,
            Judgment::Good => self.good += 1,
            Judgment::Late => self.late += 1,
            Judgment::Miss => self.miss += 1,
        }

        if judgment.is_hit() {
            self.combo += 1;
            self.max_combo = self.max_combo.max(self.combo);
            let multiplier = u64::from(self.combo.max(1));
            self.points += self.values.value(judgment) * multiplier;
        } else {
            self.max_combo = self.max_combo.max(self.combo);
            self.combo = 0;
        }

        self.accuracy_percent = self.compute_accuracy();
    }

    fn compute_accuracy(&self) -> f64 {
        let total = self.early + self.good + self.late + self.miss;
        if total == 0 {
            return ACCURACY_BASELINE;
        }
        let weighted = 100.0 * f64::from(self.good)
            + OFF_BEAT_WEIGHT * f64::from(self.early)
            + OFF_BEAT_WEIGHT * f64::from(self.late);
        round_hundredths(weighted / f64::from(total))
    }

    pub fn points(&self) -> u64 {
        self.points
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn accuracy_percent(&self) -> f64 {
        self.accuracy_percent
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            points: self.points,
            combo: self.combo,
            max_combo: self.max_combo,
            accuracy_percent: self.accuracy_percent,
            early: self.early,
            good: self.good,
            late: self.late,
            miss: self.miss,
        }
    }

    /// Back to a fresh session, keeping the point values.
    pub fn reset(&mut self) {
        *self = Self::new(self.values);
    }
}

impl Default for ScoreAggregator {
    fn default() -> Self {
        Self::new(PointValues::default())
    }
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
