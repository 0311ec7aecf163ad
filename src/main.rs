//! Drumfall: headless driver for the drum game core.
//!
//! Plays a track with the seeded auto-player, either on a simulated clock
//! (as fast as possible) or in real time until Ctrl-C.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use drumfall::config::GameConfig;
use drumfall::judge::{Difficulty, DifficultyLevel};
use drumfall::score::ScoreSnapshot;
use drumfall::session::{GameSession, LogAudio, LogScene, SessionEvent};
use drumfall::sim::{AutoPlayer, AutoPlayerConfig};
use drumfall::timing::{ManualClock, NoteScheduler, SystemClock};
use drumfall::track::{builtin, load_beat_map};

#[derive(Parser, Debug)]
#[command(name = "drumfall", version, about = "XR drum rhythm game core")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a track with the auto-player.
    Play(PlayArgs),
    /// List built-in tracks.
    Tracks,
    /// Validate a beat-map file.
    Check {
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// Built-in track name or beat-map path.
    #[arg(long)]
    track: Option<String>,
    /// easy, medium, hard or insane.
    #[arg(long)]
    difficulty: Option<DifficultyLevel>,
    /// Config file (default: ~/.drumfall/config.yaml).
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value_t = 60)]
    fps: u32,
    /// Probability the auto-player attempts a note.
    #[arg(long, default_value_t = 0.9)]
    skill: f64,
    #[arg(long, default_value_t = 30.0)]
    jitter_ms: f64,
    /// Run against the wall clock instead of a simulated one.
    #[arg(long)]
    realtime: bool,
    /// Write the final score here (.json or .yaml).
    #[arg(long)]
    results: Option<PathBuf>,
}

/// Results export.
#[derive(Debug, Serialize)]
struct PlayResults {
    title: Option<String>,
    bpm: f64,
    difficulty: Difficulty,
    seed: u64,
    score: ScoreSnapshot,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Play(args) => play(args),
        Command::Tracks => {
            list_tracks();
            Ok(())
        }
        Command::Check { path } => check(&path),
    };
    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn play(args: PlayArgs) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load_from(path)?,
        None => GameConfig::load().unwrap_or_default(),
    };
    if let Some(level) = args.difficulty {
        config.difficulty = level;
        config.custom_difficulty = None;
    }

    let mut player = AutoPlayer::new(player_config(&args)?);
    let map = Arc::new(config.beat_map(args.track.as_deref())?);
    let session_config = config.session_config();
    let difficulty = session_config.difficulty;
    let frame_ms = 1000.0 / f64::from(args.fps.max(1));

    println!(
        "drumfall v{} — {} ({} notes, {} bpm, {})",
        env!("CARGO_PKG_VERSION"),
        map.info().title.as_deref().unwrap_or("untitled"),
        map.note_count(),
        map.bpm(),
        difficulty_label(&config)
    );

    let running = Arc::new(AtomicBool::new(true));
    let snapshot = if args.realtime {
        let flag = Arc::clone(&running);
        ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))?;
        let mut session = GameSession::new(
            Arc::clone(&map),
            config.rig(),
            session_config,
            Box::new(SystemClock::new()),
            LogScene::new(),
            LogAudio::new(),
        );
        let frame = Duration::from_secs_f64(frame_ms / 1000.0);
        drive(&mut session, &mut player, &running, || thread::sleep(frame))?
    } else {
        let clock = ManualClock::new();
        let mut session = GameSession::new(
            Arc::clone(&map),
            config.rig(),
            session_config,
            Box::new(clock.clone()),
            LogScene::new(),
            LogAudio::new(),
        );
        drive(&mut session, &mut player, &running, || clock.advance(frame_ms))?
    };

    println!(
        "score: {} points | accuracy {:.2}% | max combo {}",
        snapshot.points, snapshot.accuracy_percent, snapshot.max_combo
    );
    println!(
        "good {} | early {} | late {} | miss {}",
        snapshot.good, snapshot.early, snapshot.late, snapshot.miss
    );

    if let Some(path) = &args.results {
        let results = PlayResults {
            title: map.info().title.clone(),
            bpm: map.bpm(),
            difficulty,
            seed: args.seed,
            score: snapshot,
        };
        write_results(path, &results)?;
        println!("results written to {}", path.display());
    }
    Ok(())
}

/// Tick until the session finishes, aborts, or `running` is cleared.
fn drive(
    session: &mut GameSession<LogScene, LogAudio>,
    player: &mut AutoPlayer,
    running: &AtomicBool,
    mut wait_frame: impl FnMut(),
) -> Result<ScoreSnapshot, Box<dyn Error>> {
    session.start();
    loop {
        if !running.load(Ordering::SeqCst) {
            log::info!("interrupted");
            session.stop();
            return Ok(session.snapshot());
        }
        wait_frame();
        let poses = player.observe(&*session)?;
        for event in session.tick(&poses)? {
            match event {
                SessionEvent::Finished(snapshot) => return Ok(snapshot),
                SessionEvent::Aborted(e) => return Err(e.into()),
                _ => {}
            }
        }
    }
}

fn write_results(path: &Path, results: &PlayResults) -> Result<(), Box<dyn Error>> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let content = if is_json {
        serde_json::to_string_pretty(results)?
    } else {
        serde_yaml::to_string(results)?
    };
    std::fs::write(path, content)?;
    Ok(())
}

fn player_config(args: &PlayArgs) -> Result<AutoPlayerConfig, String> {
    if !args.skill.is_finite() {
        return Err(format!("--skill must be a finite number, got {}", args.skill));
    }
    if !(args.jitter_ms.is_finite() && args.jitter_ms >= 0.0) {
        return Err(format!(
            "--jitter-ms must be finite and non-negative, got {}",
            args.jitter_ms
        ));
    }
    Ok(AutoPlayerConfig {
        seed: args.seed,
        skill: args.skill,
        jitter_ms: args.jitter_ms,
    })
}

/// Preset name, or "custom" with its numbers when the config overrides it.
fn difficulty_label(config: &GameConfig) -> String {
    match config.custom_difficulty {
        Some(d) => format!(
            "custom: fall {}/ms, leniency {}",
            d.fall_speed, d.hit_leniency
        ),
        None => config.difficulty.to_string(),
    }
}

fn list_tracks() {
    for name in builtin::BUILTIN_TRACKS {
        let Ok(map) = builtin::by_name(name) else {
            continue;
        };
        let length_ms = NoteScheduler::from_beat_map(&map)
            .last_fire_time_ms()
            .unwrap_or(0.0);
        println!(
            "{name:<8} {:<20} {:>3} notes  {:>5.1}s  {} bpm",
            map.info().title.as_deref().unwrap_or("-"),
            map.note_count(),
            length_ms / 1000.0,
            map.bpm()
        );
    }
}

fn check(path: &Path) -> Result<(), Box<dyn Error>> {
    let map = load_beat_map(path)?;
    let scheduler = NoteScheduler::from_beat_map(&map);
    let length_ms = scheduler.last_fire_time_ms().unwrap_or(0.0);
    println!(
        "{}: ok, {} notes on {} instruments, {} bpm {}/{}, last note at {:.0}ms",
        path.display(),
        map.note_count(),
        map.instruments().count(),
        map.bpm(),
        map.signature().beats_per_measure,
        map.signature().beat_type,
        length_ms
    );
    Ok(())
}
