//! Demo tracks bundled with the game.

use std::collections::BTreeMap;

use super::{BeatMap, InstrumentId, Signature, TrackError, TrackInfo};

/// Names accepted by [`by_name`].
pub const BUILTIN_TRACKS: &[&str] = &["track1", "track2"];

fn build(title: &str, bpm: f64, lanes: &[(&str, &[u32])]) -> BeatMap {
    let notes: BTreeMap<InstrumentId, Vec<u32>> = lanes
        .iter()
        .map(|(name, beats)| (InstrumentId::from(*name), beats.to_vec()))
        .collect();
    let info = TrackInfo {
        title: Some(title.to_string()),
        artist: Some("datenlauch".to_string()),
    };
    match BeatMap::new(bpm, Signature::default(), notes) {
        Ok(map) => map.with_info(info),
        // Bundled data is checked by the tests below.
        Err(e) => unreachable!("built-in track '{title}' is invalid: {e}"),
    }
}

/// Long demo: 30 beats at 60 BPM across four pads.
pub fn track1() -> BeatMap {
    build(
        "long-demo-track1",
        60.0,
        &[
            (
                "kick",
                &[
                    1, 2, 4, 5, 7, 8, 10, 11, 13, 14, 16, 17, 19, 20, 22, 23, 25, 26, 28, 29,
                ],
            ),
            ("snare", &[3, 6, 9, 12, 15, 18, 21, 24, 27, 30]),
            ("crash", &[15, 30]),
            ("hihat", &[10, 12, 18, 20, 26, 28]),
        ],
    )
}

/// Short demo: six beats at 60 BPM.
pub fn track2() -> BeatMap {
    build(
        "short demo track2",
        60.0,
        &[
            ("kick", &[1, 3, 5]),
            ("snare", &[2, 4, 6]),
            ("crash", &[6]),
            ("hihat", &[3]),
        ],
    )
}

/// Look up a bundled track by name.
pub fn by_name(name: &str) -> Result<BeatMap, TrackError> {
    match name {
        "track1" => Ok(track1()),
        "track2" => Ok(track2()),
        other => Err(TrackError::UnknownTrack(other.to_string())),
    }
}
