//! Integration tests for beat-map files and game config on disk.

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use drumfall::config::{ConfigError, GameConfig};
use drumfall::judge::DifficultyLevel;
use drumfall::session::{GameSession, HandPoses, LogAudio, LogScene, SessionPhase};
use drumfall::timing::{ManualClock, NoteScheduler};
use drumfall::track::{builtin, load_beat_map, resolve_track, InstrumentId, TrackError};

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

// =============================================================================
// Test 1: camelCase signature keys load from JSON
// =============================================================================

#[test]
fn json_map_with_camel_case_signature() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "track.json",
        r#"{
            "artist": "datenlauch",
            "title": "eighths",
            "bpm": 120,
            "signature": { "beatsPerMeasure": 6, "beatType": 8 },
            "notes": { "hihat": [1, 2, 3, 4] }
        }"#,
    );
    let map = load_beat_map(&path).unwrap();
    assert_eq!(map.signature().beat_type, 8);

    let scheduler = NoteScheduler::from_beat_map(&map);
    let times: Vec<f64> = scheduler.table()[&InstrumentId::from("hihat")]
        .iter()
        .map(|n| n.fire_time_ms)
        .collect();
    assert_eq!(times, vec![250.0, 500.0, 750.0, 1000.0]);
}

// =============================================================================
// Test 2: Validation errors surface at load time
// =============================================================================

#[test]
fn unordered_beats_rejected_at_load() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bad.yaml", "bpm: 90\nnotes:\n  snare: [1, 4, 3]\n");
    let err = load_beat_map(&path).unwrap_err();
    assert!(matches!(err, TrackError::Parse(_)));
    assert!(err.to_string().contains("snare"));
}

#[test]
fn negative_tempo_rejected_at_load() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bad.yml", "bpm: -60\n");
    assert!(load_beat_map(&path).is_err());
}

// =============================================================================
// Test 3: A saved built-in track round-trips through a file
// =============================================================================

#[test]
fn builtin_saved_and_reloaded() {
    let dir = TempDir::new().unwrap();
    let saved = builtin::track1();
    let path = write(&dir, "track1.yaml", &serde_yaml::to_string(&saved).unwrap());
    let reloaded = resolve_track(path.to_str().unwrap()).unwrap();
    assert_eq!(reloaded, saved);
}

// =============================================================================
// Test 4: A file track plays through a session
// =============================================================================

#[test]
fn file_track_plays_to_completion() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "short.yaml", "bpm: 120\nnotes:\n  kick: [1, 2]\n  crash: [2]\n");
    let map = Arc::new(load_beat_map(&path).unwrap());

    let clock = ManualClock::new();
    let mut session = GameSession::new(
        map,
        drumfall::session::DrumRig::default_kit(),
        Default::default(),
        Box::new(clock.clone()),
        LogScene::new(),
        LogAudio::new(),
    );
    session.start();
    for _ in 0..1000 {
        clock.advance(10.0);
        session.tick(&HandPoses::untracked()).unwrap();
        if session.phase() == SessionPhase::Finished {
            break;
        }
    }
    assert_eq!(session.phase(), SessionPhase::Finished);
    assert_eq!(session.snapshot().miss, 3);
}

// =============================================================================
// Test 5: Game config on disk
// =============================================================================

#[test]
fn config_file_drives_session_setup() {
    let dir = TempDir::new().unwrap();
    let track = write(&dir, "mine.yaml", "bpm: 60\nnotes:\n  kick: [1]\n");
    let config_path = write(
        &dir,
        "config.yaml",
        &format!(
            "track: {}\ndifficulty: medium\nsession:\n  end_delay_ms: 1000\n",
            track.display()
        ),
    );
    let config = GameConfig::load_from(&config_path).unwrap();
    assert_eq!(config.difficulty, DifficultyLevel::Medium);

    let session = config.session_config();
    assert!((session.difficulty.fall_speed - 0.003).abs() < f64::EPSILON);
    assert!((session.end_delay_ms - 1000.0).abs() < f64::EPSILON);
    assert_eq!(config.beat_map(None).unwrap().note_count(), 1);
}

#[test]
fn missing_config_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = GameConfig::load_from(&dir.path().join("absent.yaml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}
