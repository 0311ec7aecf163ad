//! Edge-triggered overlap detector.
//!
//! Pairs are keyed by a canonical, order-independent [`PairKey`], so checking
//! `(a, b)` one frame and `(b, a)` the next is the same pair. A continuing
//! overlap fires nothing, which prevents duplicate hit judgments while a note
//! lingers inside a drum.

use std::collections::HashSet;

use super::{Collider, CollisionListener, EntityId};

/// Unordered pair of entity ids, stored lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey(EntityId, EntityId);

impl PairKey {
    pub fn new(a: EntityId, b: EntityId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.0 == id || self.1 == id
    }

    pub fn ids(&self) -> (EntityId, EntityId) {
        (self.0, self.1)
    }
}

/// Direction of an overlap transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Enter,
    Exit,
}

/// A queued transition, addressed to `subject`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapEvent {
    pub transition: Transition,
    pub subject: EntityId,
    pub other: EntityId,
}

/// Tracks intersecting pairs and queues enter/exit transitions.
///
/// Not safe for concurrent mutation; all checks for a frame must happen on
/// the tick that owns the detector.
#[derive(Debug, Default)]
pub struct OverlapDetector {
    active: HashSet<PairKey>,
    pending: Vec<OverlapEvent>,
}

impl OverlapDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test one pair and queue a transition if its overlap state changed.
    ///
    /// Returns whether the pair currently intersects.
    pub fn check<A, B>(&mut self, a: &A, b: &B) -> bool
    where
        A: Collider + ?Sized,
        B: Collider + ?Sized,
    {
        let collides = a.detection_bounds().intersects(&b.detection_bounds());
        self.record(a.id(), b.id(), collides);
        collides
    }

    /// Feed an externally computed overlap state for a pair.
    pub fn record(&mut self, a: EntityId, b: EntityId, collides: bool) {
        let key = PairKey::new(a, b);
        let transition = if collides {
            self.active.insert(key).then_some(Transition::Enter)
        } else {
            self.active.remove(&key).then_some(Transition::Exit)
        };
        if let Some(transition) = transition {
            self.pending.push(OverlapEvent {
                transition,
                subject: a,
                other: b,
            });
            self.pending.push(OverlapEvent {
                transition,
                subject: b,
                other: a,
            });
        }
    }

    /// Whether the pair was intersecting at its last check.
    pub fn is_overlapping(&self, a: EntityId, b: EntityId) -> bool {
        self.active.contains(&PairKey::new(a, b))
    }

    /// Drop every pair involving `id` without emitting exit transitions.
    /// Queued events addressed to or from `id` are discarded too.
    pub fn forget(&mut self, id: EntityId) {
        self.active.retain(|key| !key.contains(id));
        self.pending.retain(|e| e.subject != id && e.other != id);
    }

    /// Take all queued transitions in the order they occurred.
    pub fn drain_events(&mut self) -> Vec<OverlapEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Deliver all queued transitions to `listener`.
    pub fn dispatch<L>(&mut self, listener: &mut L)
    where
        L: CollisionListener + ?Sized,
    {
        for event in self.drain_events() {
            match event.transition {
                Transition::Enter => listener.on_enter(event.subject, event.other),
                Transition::Exit => listener.on_exit(event.subject, event.other),
            }
        }
    }

    /// Number of pairs currently intersecting.
    pub fn active_pairs(&self) -> usize {
        self.active.len()
    }

    /// Forget all pairs and queued transitions.
    pub fn clear(&mut self) {
        self.active.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{Aabb, Handedness};
    use crate::judge::NoteId;
    use glam::Vec3;

    struct Body {
        id: EntityId,
        center: Vec3,
    }

    impl Collider for Body {
        fn id(&self) -> EntityId {
            self.id
        }
        fn bounds(&self) -> Aabb {
            Aabb::from_center_half_extents(self.center, Vec3::splat(0.1))
        }
    }

    fn hand(x: f32) -> Body {
        Body {
            id: EntityId::Hand(Handedness::Left),
            center: Vec3::new(x, 0.0, 0.0),
        }
    }

    fn drum() -> Body {
        Body {
            id: EntityId::Drum(0),
            center: Vec3::ZERO,
        }
    }

    #[derive(Default)]
    struct Recorder {
        enters: Vec<(EntityId, EntityId)>,
        exits: Vec<(EntityId, EntityId)>,
    }

    impl CollisionListener for Recorder {
        fn on_enter(&mut self, subject: EntityId, other: EntityId) {
            self.enters.push((subject, other));
        }
        fn on_exit(&mut self, subject: EntityId, other: EntityId) {
            self.exits.push((subject, other));
        }
    }

    #[test]
    fn pair_key_is_order_independent() {
        let a = EntityId::Drum(1);
        let b = EntityId::Hand(Handedness::Right);
        assert_eq!(PairKey::new(a, b), PairKey::new(b, a));
    }

    #[test]
    fn enter_fires_both_directions_once() {
        let mut d = OverlapDetector::new();
        let mut rec = Recorder::default();
        assert!(d.check(&hand(0.05), &drum()));
        d.dispatch(&mut rec);
        assert_eq!(
            rec.enters,
            vec![
                (EntityId::Hand(Handedness::Left), EntityId::Drum(0)),
                (EntityId::Drum(0), EntityId::Hand(Handedness::Left)),
            ]
        );
        assert!(rec.exits.is_empty());
    }

    #[test]
    fn continuing_overlap_fires_nothing() {
        let mut d = OverlapDetector::new();
        d.check(&hand(0.0), &drum());
        d.drain_events();
        for _ in 0..10 {
            assert!(d.check(&hand(0.01), &drum()));
        }
        assert!(d.drain_events().is_empty());
    }

    #[test]
    fn reversed_argument_order_is_same_pair() {
        let mut d = OverlapDetector::new();
        d.check(&hand(0.0), &drum());
        d.drain_events();
        d.check(&drum(), &hand(0.0));
        assert!(d.drain_events().is_empty());
        assert_eq!(d.active_pairs(), 1);
    }

    #[test]
    fn exit_fires_after_separation() {
        let mut d = OverlapDetector::new();
        let mut rec = Recorder::default();
        d.check(&hand(0.0), &drum());
        assert!(!d.check(&hand(1.0), &drum()));
        d.dispatch(&mut rec);
        assert_eq!(rec.enters.len(), 2);
        assert_eq!(rec.exits.len(), 2);
        assert_eq!(d.active_pairs(), 0);
    }

    #[test]
    fn never_overlapping_fires_nothing() {
        let mut d = OverlapDetector::new();
        for _ in 0..5 {
            d.check(&hand(2.0), &drum());
        }
        assert!(d.drain_events().is_empty());
    }

    #[test]
    fn forget_drops_pair_silently() {
        let mut d = OverlapDetector::new();
        let note = Body {
            id: EntityId::Note(NoteId::new(0, 0)),
            center: Vec3::ZERO,
        };
        d.check(&note, &drum());
        d.forget(note.id);
        assert!(d.drain_events().is_empty());
        assert!(!d.is_overlapping(note.id, EntityId::Drum(0)));
        assert_eq!(d.active_pairs(), 0);
    }

    #[test]
    fn forget_keeps_unrelated_pairs() {
        let mut d = OverlapDetector::new();
        d.check(&hand(0.0), &drum());
        d.forget(EntityId::Note(NoteId::new(7, 0)));
        assert!(d.is_overlapping(EntityId::Drum(0), EntityId::Hand(Handedness::Left)));
    }

    #[test]
    fn clear_resets_state() {
        let mut d = OverlapDetector::new();
        d.check(&hand(0.0), &drum());
        d.clear();
        assert_eq!(d.active_pairs(), 0);
        assert!(d.drain_events().is_empty());
    }
}
