//! Errors raised while building or loading beat maps.

use std::fmt;
use std::io;
use std::path::PathBuf;

use super::{InstrumentId, Signature};

/// A beat map could not be loaded or failed validation.
#[derive(Debug)]
pub enum TrackError {
    /// Tempo was zero, negative or not finite.
    InvalidTempo(f64),
    /// A signature component was zero.
    InvalidSignature(Signature),
    /// Beat indices of one instrument were not strictly ascending.
    UnorderedBeats {
        instrument: InstrumentId,
        position: usize,
        previous: u32,
        beat: u32,
    },
    /// No built-in track or file matched the requested name.
    UnknownTrack(String),
    /// File extension is not one of yaml/yml/json.
    UnsupportedFormat(PathBuf),
    Io(io::Error),
    Parse(String),
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackError::InvalidTempo(bpm) => write!(f, "invalid tempo: {bpm} bpm"),
            TrackError::InvalidSignature(sig) => write!(
                f,
                "invalid time signature {}/{}",
                sig.beats_per_measure, sig.beat_type
            ),
            TrackError::UnorderedBeats {
                instrument,
                position,
                previous,
                beat,
            } => write!(
                f,
                "instrument '{instrument}': beat {beat} at index {position} does not follow {previous}"
            ),
            TrackError::UnknownTrack(name) => write!(f, "unknown track '{name}'"),
            TrackError::UnsupportedFormat(path) => {
                write!(f, "unsupported beat map format: {}", path.display())
            }
            TrackError::Io(e) => write!(f, "i/o error: {e}"),
            TrackError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for TrackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TrackError {
    fn from(e: io::Error) -> Self {
        TrackError::Io(e)
    }
}

impl From<serde_yaml::Error> for TrackError {
    fn from(e: serde_yaml::Error) -> Self {
        TrackError::Parse(e.to_string())
    }
}

impl From<serde_json::Error> for TrackError {
    fn from(e: serde_json::Error) -> Self {
        TrackError::Parse(e.to_string())
    }
}
