//! Game session: owns one play-through and runs the per-tick pipeline.
//!
//! Every [`tick`](GameSession::tick) runs, in order:
//!
//! 1. hand pose update
//! 2. note fall (analytic, so a paused transport freezes it)
//! 3. overlap pass: hands against drums, each note against its own drum
//! 4. transition dispatch: hand enters play samples, note exits are misses
//! 5. hit judging for every hand currently on a drum
//! 6. below-drum miss guard
//! 7. scheduler spawns
//! 8. completion check
//!
//! The session is single-threaded. Host lifecycle calls (`start`, `suspend`,
//! `resume`, `stop`) take effect on the next tick boundary.

pub mod collaborators;
pub mod error;
pub mod rig;

pub use collaborators::{AudioSink, LogAudio, LogScene, Scene};
pub use error::SessionError;
pub use rig::{Drum, DrumRig, DrumSpec, Hand, HandPoses, StrikeZone};

use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::{CollisionListener, EntityId, Handedness, OverlapDetector};
use crate::judge::{Difficulty, HitJudge, NoteArena, NoteId, NoteSpawn, Verdict};
use crate::score::{PointValues, ScoreAggregator, ScoreSnapshot};
use crate::timing::{
    Clock, ClockError, NoteScheduler, ScheduledNote, SchedulerEvent, Transport, TransportState,
};
use crate::track::{BeatMap, InstrumentId};

/// Tunables for one session.
///
/// Notes are judged only while their detection box overlaps the drum's
/// strike zone, which spans `strike_reach` above and below the pad centre.
/// For early and late strikes to be reachable, `hit_leniency` must be
/// smaller than both ends of [`strike_band`](Self::strike_band); the default
/// reach covers every built-in preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub difficulty: Difficulty,
    /// Height above its drum at which a note appears.
    pub spawn_height: f32,
    /// How long to wait for live notes after the last spawn.
    pub end_delay_ms: f64,
    /// Half-height of the strike zone around each drum.
    pub strike_reach: f32,
    /// Notes that skip the strike zone are retired as misses once this far
    /// below its bottom.
    pub miss_depth: f32,
    pub note_half_extents: Vec3,
    pub hand_half_extents: Vec3,
    pub points: PointValues,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            spawn_height: 1.0,
            end_delay_ms: 5000.0,
            strike_reach: 0.6,
            miss_depth: 0.5,
            note_half_extents: Vec3::splat(0.05),
            hand_half_extents: Vec3::splat(0.05),
            points: PointValues::default(),
        }
    }
}

impl SessionConfig {
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Range of `note.y - drum.y` over which a note overlaps its strike zone,
    /// as `(lowest, highest)`.
    ///
    /// A note's detection box reaches one full height below its centre and
    /// half a height above it.
    pub fn strike_band(&self) -> (f64, f64) {
        let reach = f64::from(self.strike_reach);
        let half = f64::from(self.note_half_extents.y);
        (-(reach + half), reach + 2.0 * half)
    }

    /// Whether the difficulty window fits inside the strike band, so strikes
    /// can come out early or late rather than only good.
    pub fn judges_early_and_late(&self) -> bool {
        let (low, high) = self.strike_band();
        let leniency = self.difficulty.hit_leniency;
        leniency < -low && leniency < high
    }

    /// Reject values that would break note flow or end-of-track handling.
    pub fn validate(&self) -> Result<(), String> {
        let non_negative = [
            ("spawn_height", f64::from(self.spawn_height)),
            ("end_delay_ms", self.end_delay_ms),
            ("strike_reach", f64::from(self.strike_reach)),
            ("miss_depth", f64::from(self.miss_depth)),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(format!("{name} must be finite and non-negative, got {value}"));
            }
        }
        let extents = [
            ("note_half_extents", self.note_half_extents),
            ("hand_half_extents", self.hand_half_extents),
        ];
        for (name, value) in extents {
            if !(value.is_finite() && value.min_element() >= 0.0) {
                return Err(format!("{name} must be finite and non-negative, got {value}"));
            }
        }
        Ok(())
    }

    /// Time for a freshly spawned note to fall onto its drum.
    pub fn fall_time_ms(&self) -> f64 {
        if self.difficulty.fall_speed > 0.0 {
            f64::from(self.spawn_height) / self.difficulty.fall_speed
        } else {
            0.0
        }
    }
}

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionPhase {
    /// Constructed, not started.
    Ready,
    Playing,
    /// Host suspended play; transport paused.
    Suspended,
    /// Every note spawned; waiting for live notes to resolve.
    Draining { since_ms: f64 },
    Finished,
    /// Torn down by the host before finishing.
    Stopped,
    Aborted,
}

impl SessionPhase {
    /// Whether ticking can still produce events.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            SessionPhase::Playing | SessionPhase::Suspended | SessionPhase::Draining { .. }
        )
    }
}

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Spawned { note: NoteId, instrument: InstrumentId },
    /// No drum plays this instrument; the note was dropped.
    SpawnSkipped { instrument: InstrumentId },
    Judged(Verdict),
    /// The scheduler emitted its last note.
    TrackCompleted,
    Finished(ScoreSnapshot),
    Aborted(SessionError),
}

/// Routes overlap transitions to audio and collects pass-through notes.
struct TransitionRouter<'a, A: AudioSink> {
    rig: &'a DrumRig,
    audio: &'a mut A,
    passed_through: Vec<(NoteId, EntityId)>,
}

impl<A: AudioSink> CollisionListener for TransitionRouter<'_, A> {
    fn on_enter(&mut self, subject: EntityId, other: EntityId) {
        if let (EntityId::Hand(_), EntityId::Drum(_)) = (subject, other) {
            if let Some(drum) = self.rig.by_id(other) {
                self.audio.play_sample(&drum.instrument);
            }
        }
    }

    fn on_exit(&mut self, subject: EntityId, other: EntityId) {
        if let (EntityId::Note(note), EntityId::Drum(_)) = (subject, other) {
            self.passed_through.push((note, other));
        }
    }
}

/// One play-through of a beat map.
pub struct GameSession<S: Scene, A: AudioSink> {
    beat_map: Arc<BeatMap>,
    rig: DrumRig,
    config: SessionConfig,
    transport: Transport,
    scheduler: NoteScheduler,
    detector: OverlapDetector,
    arena: NoteArena,
    judge: HitJudge,
    score: ScoreAggregator,
    hands: [Hand; 2],
    phase: SessionPhase,
    resume_phase: SessionPhase,
    scene: S,
    audio: A,
}

impl<S: Scene, A: AudioSink> GameSession<S, A> {
    pub fn new(
        beat_map: Arc<BeatMap>,
        rig: DrumRig,
        config: SessionConfig,
        clock: Box<dyn Clock>,
        scene: S,
        audio: A,
    ) -> Self {
        if !config.judges_early_and_late() {
            let (low, high) = config.strike_band();
            log::warn!(
                "hit leniency {} reaches past the strike band ({low:.2}..{high:.2}); \
                 early or late strikes cannot occur",
                config.difficulty.hit_leniency
            );
        }
        let scheduler = NoteScheduler::from_beat_map(&beat_map);
        let judge = HitJudge::new(config.difficulty.hit_leniency);
        let score = ScoreAggregator::new(config.points);
        let hands = [
            Hand::new(Handedness::Left, config.hand_half_extents),
            Hand::new(Handedness::Right, config.hand_half_extents),
        ];
        Self {
            beat_map,
            rig,
            config,
            transport: Transport::new(clock),
            scheduler,
            detector: OverlapDetector::new(),
            arena: NoteArena::new(),
            judge,
            score,
            hands,
            phase: SessionPhase::Ready,
            resume_phase: SessionPhase::Playing,
            scene,
            audio,
        }
    }

    /// Start or restart play from the beginning of the track.
    pub fn start(&mut self) {
        self.dispose_all();
        self.detector.clear();
        self.score.reset();
        self.judge.reset();
        for hand in &mut self.hands {
            hand.position = None;
        }
        self.scheduler.arm();
        self.transport.start();
        self.phase = SessionPhase::Playing;
        log::info!(
            "session started: {} notes, {} drums",
            self.scheduler.total_notes(),
            self.rig.len()
        );
    }

    /// Freeze play. No-op unless playing or draining.
    pub fn suspend(&mut self) {
        if !matches!(self.phase, SessionPhase::Playing | SessionPhase::Draining { .. }) {
            return;
        }
        self.transport.pause();
        self.resume_phase = self.phase;
        self.phase = SessionPhase::Suspended;
        log::info!("session suspended");
    }

    /// Continue after [`suspend`](Self::suspend). No-op otherwise.
    pub fn resume(&mut self) {
        if self.phase != SessionPhase::Suspended {
            return;
        }
        self.transport.resume();
        self.phase = self.resume_phase;
        log::info!("session resumed");
    }

    /// Tear down without judging live notes.
    pub fn stop(&mut self) {
        if !self.phase.is_active() {
            return;
        }
        self.transport.stop();
        self.scheduler.halt();
        self.dispose_all();
        self.detector.clear();
        self.phase = SessionPhase::Stopped;
        log::info!("session stopped");
    }

    /// Advance one frame with the current hand poses.
    pub fn tick(&mut self, poses: &HandPoses) -> Result<Vec<SessionEvent>, SessionError> {
        let elapsed = self.transport.elapsed()?;
        let mut events = Vec::new();
        if !matches!(self.phase, SessionPhase::Playing | SessionPhase::Draining { .. }) {
            return Ok(events);
        }

        self.update_hands(poses);
        self.fall(elapsed);
        self.overlap_pass();
        self.dispatch_transitions(&mut events);
        self.judge_strikes(&mut events);
        self.retire_sunken(&mut events);

        if self.phase == SessionPhase::Playing {
            for event in self.scheduler.poll(elapsed) {
                match event {
                    SchedulerEvent::Spawn(note) => {
                        if let Err(e) = self.spawn(note, elapsed, &mut events) {
                            self.abort(e, &mut events);
                            return Ok(events);
                        }
                    }
                    SchedulerEvent::Completed => {
                        log::info!("track completed at {elapsed:.0}ms");
                        events.push(SessionEvent::TrackCompleted);
                        self.phase = SessionPhase::Draining { since_ms: elapsed };
                    }
                }
            }
        }

        if let SessionPhase::Draining { since_ms } = self.phase {
            if self.arena.is_empty() || elapsed - since_ms >= self.config.end_delay_ms {
                self.finish(&mut events);
            }
        }
        Ok(events)
    }

    fn update_hands(&mut self, poses: &HandPoses) {
        for hand in &mut self.hands {
            hand.position = poses.get(hand.side);
        }
    }

    fn fall(&mut self, elapsed: f64) {
        let speed = self.config.difficulty.fall_speed;
        for note in self.arena.iter_mut() {
            let fallen = (speed * (elapsed - note.fire_time_ms).max(0.0)) as f32;
            note.position.y = note.spawn_position.y - fallen;
            self.scene.move_note(note);
        }
    }

    fn overlap_pass(&mut self) {
        for hand in &self.hands {
            for drum in self.rig.iter() {
                self.detector.check(hand, drum);
            }
        }
        for note in self.arena.iter_mut() {
            let Some(drum) = self.rig.by_id(note.drum) else {
                continue;
            };
            let zone = drum.strike_zone(self.config.strike_reach);
            if self.detector.check(&*note, &zone) {
                note.entered_drum = true;
            }
        }
    }

    fn dispatch_transitions(&mut self, events: &mut Vec<SessionEvent>) {
        let mut router = TransitionRouter {
            rig: &self.rig,
            audio: &mut self.audio,
            passed_through: Vec::new(),
        };
        self.detector.dispatch(&mut router);
        let passed_through = router.passed_through;

        for (note, drum) in passed_through {
            let Some(drum_y) = self.rig.by_id(drum).map(|d| d.position.y) else {
                continue;
            };
            if let Some(verdict) = self.judge.miss(note, drum_y, &mut self.arena, &mut self.score) {
                self.settle(verdict, events);
            }
        }
    }

    fn judge_strikes(&mut self, events: &mut Vec<SessionEvent>) {
        let mut verdicts = Vec::new();
        for hand in &self.hands {
            let hand_id = EntityId::Hand(hand.side);
            for drum in self.rig.iter() {
                if !self.detector.is_overlapping(hand_id, drum.id) {
                    continue;
                }
                let candidates: Vec<NoteId> = self
                    .arena
                    .ids_for_drum(drum.id)
                    .into_iter()
                    .filter(|&id| self.detector.is_overlapping(EntityId::Note(id), drum.id))
                    .collect();
                if candidates.is_empty() {
                    continue;
                }
                verdicts.extend(self.judge.strike(
                    drum.position.y,
                    candidates,
                    &mut self.arena,
                    &mut self.score,
                ));
            }
        }
        for verdict in verdicts {
            self.settle(verdict, events);
        }
    }

    /// Miss notes that fell past their strike zone without ever touching it.
    /// Notes that did touch it are missed on exit instead.
    fn retire_sunken(&mut self, events: &mut Vec<SessionEvent>) {
        let floor = self.config.strike_reach + self.config.miss_depth;
        let sunken: Vec<(NoteId, f32)> = self
            .arena
            .iter()
            .filter(|note| !note.entered_drum)
            .filter_map(|note| {
                let drum_y = self.rig.by_id(note.drum)?.position.y;
                (note.position.y < drum_y - floor).then_some((note.id, drum_y))
            })
            .collect();
        for (id, drum_y) in sunken {
            log::debug!("note {}:{} skipped its strike zone", id.index(), id.generation());
            if let Some(verdict) = self.judge.miss(id, drum_y, &mut self.arena, &mut self.score) {
                self.settle(verdict, events);
            }
        }
    }

    fn spawn(
        &mut self,
        note: ScheduledNote,
        elapsed: f64,
        events: &mut Vec<SessionEvent>,
    ) -> Result<(), SessionError> {
        if self.rig.is_empty() {
            return Err(SessionError::SceneUnavailable);
        }
        let Some(drum) = self.rig.get(&note.instrument) else {
            log::warn!("no drum for {}, skipping note at beat {}", note.instrument, note.beat);
            events.push(SessionEvent::SpawnSkipped {
                instrument: note.instrument,
            });
            return Ok(());
        };

        let id = self.arena.insert(NoteSpawn {
            instrument: note.instrument.clone(),
            drum: drum.id,
            fire_time_ms: note.fire_time_ms,
            spawn_position: drum.position + Vec3::Y * self.config.spawn_height,
            half_extents: self.config.note_half_extents,
        });
        let speed = self.config.difficulty.fall_speed;
        if let Some(active) = self.arena.get_mut(id) {
            let fallen = (speed * (elapsed - active.fire_time_ms).max(0.0)) as f32;
            active.position.y = active.spawn_position.y - fallen;
            self.scene.spawn_note(active);
        }
        log::debug!(
            "spawned {} beat {} ({:.0}ms) at {elapsed:.0}ms",
            note.instrument,
            note.beat,
            note.fire_time_ms
        );
        events.push(SessionEvent::Spawned {
            note: id,
            instrument: note.instrument,
        });
        Ok(())
    }

    fn settle(&mut self, verdict: Verdict, events: &mut Vec<SessionEvent>) {
        self.scene.dispose_note(verdict.note);
        self.scene.show_judgment(&verdict.instrument, verdict.judgment);
        self.detector.forget(EntityId::Note(verdict.note));
        events.push(SessionEvent::Judged(verdict));
    }

    fn abort(&mut self, error: SessionError, events: &mut Vec<SessionEvent>) {
        log::error!("session aborted: {error}");
        self.scheduler.halt();
        self.transport.stop();
        self.dispose_all();
        self.detector.clear();
        self.phase = SessionPhase::Aborted;
        events.push(SessionEvent::Aborted(error));
    }

    fn finish(&mut self, events: &mut Vec<SessionEvent>) {
        self.dispose_all();
        self.detector.clear();
        self.transport.stop();
        self.phase = SessionPhase::Finished;
        let snapshot = self.score.snapshot();
        log::info!(
            "session finished: {} points, {:.2}% accuracy, max combo {}",
            snapshot.points,
            snapshot.accuracy_percent,
            snapshot.max_combo
        );
        events.push(SessionEvent::Finished(snapshot));
    }

    fn dispose_all(&mut self) {
        for note in self.arena.drain() {
            self.scene.dispose_note(note.id);
        }
    }

    /// Current score for the HUD.
    pub fn snapshot(&self) -> ScoreSnapshot {
        self.score.snapshot()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn elapsed(&self) -> Result<f64, ClockError> {
        self.transport.elapsed()
    }

    pub fn transport_state(&self) -> TransportState {
        self.transport.state()
    }

    pub fn active_notes(&self) -> &NoteArena {
        &self.arena
    }

    pub fn rig(&self) -> &DrumRig {
        &self.rig
    }

    pub fn hands(&self) -> &[Hand; 2] {
        &self.hands
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn beat_map(&self) -> &Arc<BeatMap> {
        &self.beat_map
    }

    /// Notes still queued in the scheduler.
    pub fn pending_notes(&self) -> usize {
        self.scheduler.remaining()
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::{DifficultyLevel, Judgment};
    use crate::timing::ManualClock;
    use crate::track::Signature;
    use std::collections::BTreeMap;

    fn kick_map(beats: &[u32]) -> Arc<BeatMap> {
        let mut notes = BTreeMap::new();
        notes.insert(InstrumentId::from("kick"), beats.to_vec());
        Arc::new(BeatMap::new(60.0, Signature::default(), notes).unwrap())
    }

    fn session(
        map: Arc<BeatMap>,
        rig: DrumRig,
    ) -> (GameSession<LogScene, LogAudio>, ManualClock) {
        let clock = ManualClock::new();
        let s = GameSession::new(
            map,
            rig,
            SessionConfig::default(),
            Box::new(clock.clone()),
            LogScene::new(),
            LogAudio::new(),
        );
        (s, clock)
    }

    #[test]
    fn tick_before_start_is_clock_error() {
        let (mut s, _clock) = session(kick_map(&[1]), DrumRig::default_kit());
        assert_eq!(
            s.tick(&HandPoses::untracked()),
            Err(SessionError::Clock(ClockError::NotStarted))
        );
        assert_eq!(s.phase(), SessionPhase::Ready);
    }

    #[test]
    fn spawns_at_height_above_drum() {
        let (mut s, clock) = session(kick_map(&[1, 2]), DrumRig::default_kit());
        s.start();
        clock.set(1000.0);
        let events = s.tick(&HandPoses::untracked()).unwrap();
        assert!(matches!(events[0], SessionEvent::Spawned { .. }));
        let note = s.active_notes().iter().next().unwrap();
        assert!((note.position.y - 2.2).abs() < 1e-5);
        assert_eq!(s.scene().live(), 1);
    }

    #[test]
    fn notes_fall_with_elapsed_time() {
        let (mut s, clock) = session(kick_map(&[1, 5]), DrumRig::default_kit());
        s.start();
        clock.set(1000.0);
        s.tick(&HandPoses::untracked()).unwrap();
        clock.set(1100.0);
        s.tick(&HandPoses::untracked()).unwrap();
        let note = s.active_notes().iter().next().unwrap();
        // easy: 0.002 units/ms
        assert!((note.position.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn suspend_freezes_fall_and_spawns() {
        let (mut s, clock) = session(kick_map(&[1, 2]), DrumRig::default_kit());
        s.start();
        clock.set(1000.0);
        s.tick(&HandPoses::untracked()).unwrap();
        s.suspend();
        assert_eq!(s.phase(), SessionPhase::Suspended);
        clock.advance(10_000.0);
        assert!(s.tick(&HandPoses::untracked()).unwrap().is_empty());
        let y = s.active_notes().iter().next().unwrap().position.y;
        assert!((y - 2.2).abs() < 1e-5);

        s.resume();
        assert_eq!(s.phase(), SessionPhase::Playing);
        clock.advance(50.0);
        s.tick(&HandPoses::untracked()).unwrap();
        let y = s.active_notes().iter().next().unwrap().position.y;
        assert!((y - 2.1).abs() < 1e-5);
        assert_eq!(s.pending_notes(), 1);
    }

    #[test]
    fn missing_drum_skips_note() {
        let mut notes = BTreeMap::new();
        notes.insert(InstrumentId::from("cowbell"), vec![1]);
        let map = Arc::new(BeatMap::new(60.0, Signature::default(), notes).unwrap());
        let (mut s, clock) = session(map, DrumRig::default_kit());
        s.start();
        clock.set(1000.0);
        let events = s.tick(&HandPoses::untracked()).unwrap();
        assert_eq!(
            events[0],
            SessionEvent::SpawnSkipped {
                instrument: InstrumentId::from("cowbell")
            }
        );
        assert!(s.active_notes().is_empty());
    }

    #[test]
    fn empty_rig_aborts() {
        let (mut s, clock) = session(kick_map(&[1]), DrumRig::default());
        s.start();
        clock.set(1000.0);
        let events = s.tick(&HandPoses::untracked()).unwrap();
        assert_eq!(
            events,
            vec![SessionEvent::Aborted(SessionError::SceneUnavailable)]
        );
        assert_eq!(s.phase(), SessionPhase::Aborted);
        assert_eq!(s.transport_state(), TransportState::Stopped);
        assert!(s.tick(&HandPoses::untracked()).unwrap().is_empty());
    }

    #[test]
    fn hand_entering_drum_plays_sample_once() {
        let (mut s, clock) = session(kick_map(&[10]), DrumRig::default_kit());
        let kick = s.rig().get(&InstrumentId::from("kick")).unwrap().position;
        let on = HandPoses {
            left: None,
            right: Some(kick),
        };
        let off = HandPoses {
            left: None,
            right: Some(kick + Vec3::Y),
        };
        s.start();
        for pose in [on, on, on, off, on] {
            clock.advance(16.0);
            s.tick(&pose).unwrap();
        }
        assert_eq!(s.audio().played(), 2);
    }

    #[test]
    fn sunken_note_is_missed() {
        let (mut s, clock) = session(kick_map(&[1]), DrumRig::default_kit());
        s.start();
        clock.set(1000.0);
        s.tick(&HandPoses::untracked()).unwrap();
        // One long frame carries the note past the strike zone without
        // overlapping it: y = 2.2 - 0.002 * 1200 is below 1.2 - 0.6 - 0.5.
        clock.set(2200.0);
        let events = s.tick(&HandPoses::untracked()).unwrap();
        let judged: Vec<Judgment> = events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Judged(v) => Some(v.judgment),
                _ => None,
            })
            .collect();
        assert_eq!(judged, vec![Judgment::Miss]);
        assert!(matches!(events.last(), Some(SessionEvent::Finished(_))));
    }

    #[test]
    fn stop_disposes_without_judging() {
        let (mut s, clock) = session(kick_map(&[1, 2]), DrumRig::default_kit());
        s.start();
        clock.set(1000.0);
        s.tick(&HandPoses::untracked()).unwrap();
        s.stop();
        assert_eq!(s.phase(), SessionPhase::Stopped);
        assert!(s.active_notes().is_empty());
        assert_eq!(s.scene().live(), 0);
        assert_eq!(s.snapshot().total_judged(), 0);
    }

    #[test]
    fn restart_resets_score_and_queues() {
        let (mut s, clock) = session(kick_map(&[1]), DrumRig::default_kit());
        s.start();
        clock.set(1000.0);
        s.tick(&HandPoses::untracked()).unwrap();
        clock.set(3000.0);
        s.tick(&HandPoses::untracked()).unwrap();
        assert_eq!(s.snapshot().miss, 1);

        s.start();
        assert_eq!(s.phase(), SessionPhase::Playing);
        assert_eq!(s.snapshot().total_judged(), 0);
        assert_eq!(s.pending_notes(), 1);
    }

    #[test]
    fn config_defaults_from_partial_yaml() {
        let config: SessionConfig = serde_yaml::from_str("spawn_height: 2.0\n").unwrap();
        assert!((config.spawn_height - 2.0).abs() < f32::EPSILON);
        assert!((config.end_delay_ms - 5000.0).abs() < f64::EPSILON);
        assert!((config.fall_time_ms() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn default_band_leaves_room_for_early_and_late() {
        let (low, high) = SessionConfig::default().strike_band();
        assert!((low + 0.65).abs() < 1e-6);
        assert!((high - 0.7).abs() < 1e-6);
        for level in DifficultyLevel::ALL {
            let config = SessionConfig::default().with_difficulty(level.preset());
            assert!(config.judges_early_and_late(), "{level}");
        }
        let wide = SessionConfig::default().with_difficulty(Difficulty::new(0.002, 0.9));
        assert!(!wide.judges_early_and_late());
    }

    #[test]
    fn validate_rejects_negative_and_non_finite() {
        assert!(SessionConfig::default().validate().is_ok());
        let bad = [
            SessionConfig {
                miss_depth: -1.0,
                ..SessionConfig::default()
            },
            SessionConfig {
                end_delay_ms: -5.0,
                ..SessionConfig::default()
            },
            SessionConfig {
                strike_reach: f32::NAN,
                ..SessionConfig::default()
            },
            SessionConfig {
                note_half_extents: Vec3::new(0.05, -0.05, 0.05),
                ..SessionConfig::default()
            },
            SessionConfig {
                hand_half_extents: Vec3::splat(f32::INFINITY),
                ..SessionConfig::default()
            },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{config:?}");
        }
        let err = SessionConfig {
            miss_depth: -1.0,
            ..SessionConfig::default()
        }
        .validate()
        .unwrap_err();
        assert!(err.contains("miss_depth"));
    }

    #[test]
    fn note_marked_once_inside_strike_zone() {
        let (mut s, clock) = session(kick_map(&[1, 9]), DrumRig::default_kit());
        s.start();
        clock.set(1000.0);
        s.tick(&HandPoses::untracked()).unwrap();
        assert!(!s.active_notes().iter().next().unwrap().entered_drum);
        // y = 2.2 - 0.002 * 400 = 1.4, inside the zone around 1.2.
        clock.set(1400.0);
        s.tick(&HandPoses::untracked()).unwrap();
        assert!(s.active_notes().iter().next().unwrap().entered_drum);
    }
}
