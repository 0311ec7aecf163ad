//! Game configuration loaded from ~/.drumfall/config.yaml.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::judge::{Difficulty, DifficultyLevel};
use crate::session::rig::default_specs;
use crate::session::{DrumRig, DrumSpec, SessionConfig};
use crate::track::{resolve_track, BeatMap, TrackError};

/// Track played when neither the config nor the command line names one.
pub const DEFAULT_TRACK: &str = "track1";

/// Errors from loading or applying a config file.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Track(TrackError),
    /// Custom difficulty with a non-positive fall speed or negative leniency.
    InvalidDifficulty(Difficulty),
    /// Session or drum values out of range.
    InvalidSession(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(msg) => write!(f, "config parse error: {msg}"),
            ConfigError::Track(e) => write!(f, "config track error: {e}"),
            ConfigError::InvalidDifficulty(d) => write!(
                f,
                "invalid difficulty: fall_speed {} / hit_leniency {}",
                d.fall_speed, d.hit_leniency
            ),
            ConfigError::InvalidSession(msg) => write!(f, "invalid session settings: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Track(e) => Some(e),
            ConfigError::Parse(_)
            | ConfigError::InvalidDifficulty(_)
            | ConfigError::InvalidSession(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

impl From<TrackError> for ConfigError {
    fn from(e: TrackError) -> Self {
        ConfigError::Track(e)
    }
}

/// Top-level game configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Built-in track name or beat-map path.
    pub track: Option<String>,
    pub difficulty: DifficultyLevel,
    /// Overrides the preset named by `difficulty` when set.
    pub custom_difficulty: Option<Difficulty>,
    /// Session tunables. The difficulty inside is replaced by the resolved one.
    pub session: SessionConfig,
    pub drums: Vec<DrumSpec>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            track: None,
            difficulty: DifficultyLevel::default(),
            custom_difficulty: None,
            session: SessionConfig::default(),
            drums: default_specs(),
        }
    }
}

impl GameConfig {
    /// Standard config path (~/.drumfall/config.yaml).
    pub fn path() -> Option<PathBuf> {
        Some(dirs::home_dir()?.join(".drumfall").join("config.yaml"))
    }

    /// Load from the standard path.
    /// Returns None if the file doesn't exist or can't be parsed.
    pub fn load() -> Option<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return None;
        }
        match Self::load_from(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("ignoring {}: {e}", path.display());
                None
            }
        }
    }

    /// Load and validate a config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(d) = self.custom_difficulty {
            if !(d.fall_speed.is_finite() && d.fall_speed > 0.0)
                || !(d.hit_leniency.is_finite() && d.hit_leniency >= 0.0)
            {
                return Err(ConfigError::InvalidDifficulty(d));
            }
        }
        self.session.validate().map_err(ConfigError::InvalidSession)?;
        for drum in &self.drums {
            if !(drum.position.is_finite()
                && drum.half_extents.is_finite()
                && drum.half_extents.min_element() >= 0.0)
            {
                return Err(ConfigError::InvalidSession(format!(
                    "drum {} has a non-finite position or negative extents",
                    drum.instrument
                )));
            }
        }
        Ok(())
    }

    /// The difficulty actually played.
    pub fn effective_difficulty(&self) -> Difficulty {
        self.custom_difficulty
            .unwrap_or_else(|| self.difficulty.preset())
    }

    /// Session tunables with the resolved difficulty applied.
    pub fn session_config(&self) -> SessionConfig {
        self.session.clone().with_difficulty(self.effective_difficulty())
    }

    pub fn rig(&self) -> DrumRig {
        DrumRig::from_specs(&self.drums)
    }

    /// Resolve `override_track`, else the configured track, else the default.
    pub fn beat_map(&self, override_track: Option<&str>) -> Result<BeatMap, ConfigError> {
        let name = override_track
            .or(self.track.as_deref())
            .unwrap_or(DEFAULT_TRACK);
        Ok(resolve_track(name)?)
    }
}
