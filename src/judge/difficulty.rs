//! Difficulty presets: note fall speed and hit leniency.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fall speed and timing window for one difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// World units per millisecond.
    pub fall_speed: f64,
    /// Max vertical offset (world units) still judged as good.
    pub hit_leniency: f64,
}

impl Difficulty {
    pub fn new(fall_speed: f64, hit_leniency: f64) -> Self {
        Self {
            fall_speed,
            hit_leniency,
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        DifficultyLevel::Easy.preset()
    }
}

/// Named difficulty preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    #[default]
    Easy,
    Medium,
    Hard,
    Insane,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 4] = [
        DifficultyLevel::Easy,
        DifficultyLevel::Medium,
        DifficultyLevel::Hard,
        DifficultyLevel::Insane,
    ];

    pub fn preset(self) -> Difficulty {
        match self {
            DifficultyLevel::Easy => Difficulty::new(0.002, 0.5),
            DifficultyLevel::Medium => Difficulty::new(0.003, 0.4),
            DifficultyLevel::Hard => Difficulty::new(0.004, 0.3),
            DifficultyLevel::Insane => Difficulty::new(0.005, 0.2),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "easy",
            DifficultyLevel::Medium => "medium",
            DifficultyLevel::Hard => "hard",
            DifficultyLevel::Insane => "insane",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DifficultyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DifficultyLevel::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown difficulty '{s}' (expected easy, medium, hard or insane)"))
    }
}
