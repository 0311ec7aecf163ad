//! Beat map model: tempo, time signature and per-instrument beat lists.
//!
//! A [`BeatMap`] is validated once at construction (or deserialization) and is
//! immutable afterwards. Sessions share it read-only behind an `Arc`.

pub mod builtin;
pub mod error;
pub mod loader;

pub use error::TrackError;
pub use loader::{load_beat_map, resolve_track};

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Names an instrument lane, e.g. `"kick"` or `"snare"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(String);

impl InstrumentId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstrumentId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Time signature. Only `beat_type` affects timing: an eighth-note
/// denominated signature halves the beat duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(alias = "beatsPerMeasure")]
    pub beats_per_measure: u32,
    #[serde(alias = "beatType")]
    pub beat_type: u32,
}

impl Default for Signature {
    fn default() -> Self {
        Self {
            beats_per_measure: 4,
            beat_type: 4,
        }
    }
}

/// Optional descriptive metadata shown on track selection and end screens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
}

/// A validated, immutable beat map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBeatMap", into = "RawBeatMap")]
pub struct BeatMap {
    info: TrackInfo,
    bpm: f64,
    signature: Signature,
    notes: BTreeMap<InstrumentId, Vec<u32>>,
}

impl BeatMap {
    /// Build a beat map, rejecting non-positive tempo, empty signature parts
    /// and beat lists that are not strictly ascending.
    pub fn new(
        bpm: f64,
        signature: Signature,
        notes: BTreeMap<InstrumentId, Vec<u32>>,
    ) -> Result<Self, TrackError> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(TrackError::InvalidTempo(bpm));
        }
        if signature.beats_per_measure == 0 || signature.beat_type == 0 {
            return Err(TrackError::InvalidSignature(signature));
        }
        for (instrument, beats) in &notes {
            for (position, pair) in beats.windows(2).enumerate() {
                if pair[1] <= pair[0] {
                    return Err(TrackError::UnorderedBeats {
                        instrument: instrument.clone(),
                        position: position + 1,
                        previous: pair[0],
                        beat: pair[1],
                    });
                }
            }
        }
        Ok(Self {
            info: TrackInfo::default(),
            bpm,
            signature,
            notes,
        })
    }

    /// Attach title/artist metadata.
    pub fn with_info(mut self, info: TrackInfo) -> Self {
        self.info = info;
        self
    }

    pub fn info(&self) -> &TrackInfo {
        &self.info
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn signature(&self) -> Signature {
        self.signature
    }

    /// Beat lists keyed by instrument, in instrument name order.
    pub fn notes(&self) -> &BTreeMap<InstrumentId, Vec<u32>> {
        &self.notes
    }

    pub fn instruments(&self) -> impl Iterator<Item = &InstrumentId> {
        self.notes.keys()
    }

    /// Total number of notes across all instruments.
    pub fn note_count(&self) -> usize {
        self.notes.values().map(Vec::len).sum()
    }

    /// Last beat index used by any instrument, if any note exists.
    pub fn last_beat(&self) -> Option<u32> {
        self.notes.values().filter_map(|b| b.last().copied()).max()
    }
}

/// Unvalidated on-disk shape of a beat map.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawBeatMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    artist: Option<String>,
    bpm: f64,
    #[serde(default)]
    signature: Signature,
    #[serde(default)]
    notes: BTreeMap<InstrumentId, Vec<u32>>,
}

impl TryFrom<RawBeatMap> for BeatMap {
    type Error = TrackError;

    fn try_from(raw: RawBeatMap) -> Result<Self, Self::Error> {
        let info = TrackInfo {
            title: raw.title,
            artist: raw.artist,
        };
        Ok(BeatMap::new(raw.bpm, raw.signature, raw.notes)?.with_info(info))
    }
}

impl From<BeatMap> for RawBeatMap {
    fn from(map: BeatMap) -> Self {
        Self {
            title: map.info.title,
            artist: map.info.artist,
            bpm: map.bpm,
            signature: map.signature,
            notes: map.notes,
        }
    }
}
