//! Spatial overlap detection between hands, drums and falling notes.
//!
//! Entities expose their bounds through the [`Collider`] capability trait.
//! The [`OverlapDetector`] keeps the set of currently intersecting pairs and
//! reports only transitions, which are delivered to a [`CollisionListener`]
//! that resolves the entities by id.

pub mod aabb;
pub mod detector;

pub use aabb::Aabb;
pub use detector::{OverlapDetector, OverlapEvent, PairKey, Transition};

use serde::{Deserialize, Serialize};

use crate::judge::NoteId;

/// Which tracked hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

/// Logical kind of a trackable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Hand,
    Drum,
    Note,
}

/// Identity of a trackable entity. The kind is part of the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityId {
    Hand(Handedness),
    Drum(u16),
    Note(NoteId),
}

impl EntityId {
    pub fn kind(self) -> EntityKind {
        match self {
            EntityId::Hand(_) => EntityKind::Hand,
            EntityId::Drum(_) => EntityKind::Drum,
            EntityId::Note(_) => EntityKind::Note,
        }
    }
}

/// Anything the overlap detector can test.
pub trait Collider {
    fn id(&self) -> EntityId;

    /// World-space geometric bounds.
    fn bounds(&self) -> Aabb;

    /// Bounds used for overlap tests.
    ///
    /// Notes extend below their geometry by half their height so a falling
    /// note reaches a flush drum surface slightly early.
    fn detection_bounds(&self) -> Aabb {
        let bounds = self.bounds();
        match self.id().kind() {
            EntityKind::Note => bounds.extend_down(bounds.height() / 2.0),
            EntityKind::Hand | EntityKind::Drum => bounds,
        }
    }
}

/// Receives overlap transitions. Each transition is delivered twice, once
/// with each entity of the pair as `subject`.
pub trait CollisionListener {
    fn on_enter(&mut self, subject: EntityId, other: EntityId);
    fn on_exit(&mut self, subject: EntityId, other: EntityId);
}
