//! Beat map file loading. The format is picked from the file extension.

use std::path::Path;

use super::{builtin, BeatMap, TrackError};

/// Load and validate a beat map from a `.yaml`, `.yml` or `.json` file.
pub fn load_beat_map(path: &Path) -> Result<BeatMap, TrackError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let content = match ext.as_deref() {
        Some("yaml" | "yml" | "json") => std::fs::read_to_string(path)?,
        _ => return Err(TrackError::UnsupportedFormat(path.to_path_buf())),
    };
    let map: BeatMap = if ext.as_deref() == Some("json") {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    log::debug!(
        "loaded beat map {} ({} notes at {} bpm)",
        path.display(),
        map.note_count(),
        map.bpm()
    );
    Ok(map)
}

/// Resolve a track argument: a built-in name first, otherwise a file path.
pub fn resolve_track(name_or_path: &str) -> Result<BeatMap, TrackError> {
    if builtin::BUILTIN_TRACKS.contains(&name_or_path) {
        return builtin::by_name(name_or_path);
    }
    let path = Path::new(name_or_path);
    if path.exists() {
        load_beat_map(path)
    } else {
        Err(TrackError::UnknownTrack(name_or_path.to_string()))
    }
}
