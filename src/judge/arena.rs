//! Generational arena of live notes.
//!
//! Destroying a note frees its slot and bumps the slot generation, so any
//! [`NoteId`] still held elsewhere goes stale and further removals through it
//! are no-ops.

use std::fmt;

use glam::Vec3;

use crate::collision::{Aabb, Collider, EntityId};
use crate::track::InstrumentId;

/// Handle to a note slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteId {
    index: u32,
    generation: u32,
}

impl NoteId {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// A falling note.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveNote {
    pub id: NoteId,
    pub instrument: InstrumentId,
    /// Drum this note falls onto.
    pub drum: EntityId,
    pub fire_time_ms: f64,
    pub spawn_position: Vec3,
    pub position: Vec3,
    pub half_extents: Vec3,
    /// Set once the note's detection box has touched its drum.
    pub entered_drum: bool,
}

impl Collider for ActiveNote {
    fn id(&self) -> EntityId {
        EntityId::Note(self.id)
    }

    fn bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(self.position, self.half_extents)
    }
}

/// `kick note at 1000ms`, naming the note by instrument and fire time.
impl fmt::Display for ActiveNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} note at {:.0}ms", self.instrument, self.fire_time_ms)
    }
}

/// Fields needed to create a note; the arena assigns the id.
#[derive(Debug, Clone)]
pub struct NoteSpawn {
    pub instrument: InstrumentId,
    pub drum: EntityId,
    pub fire_time_ms: f64,
    pub spawn_position: Vec3,
    pub half_extents: Vec3,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    note: Option<ActiveNote>,
}

#[derive(Debug, Clone, Default)]
pub struct NoteArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl NoteArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new note in a free slot.
    pub fn insert(&mut self, spawn: NoteSpawn) -> NoteId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    note: None,
                });
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        let id = NoteId::new(index, slot.generation);
        slot.note = Some(ActiveNote {
            id,
            instrument: spawn.instrument,
            drum: spawn.drum,
            fire_time_ms: spawn.fire_time_ms,
            spawn_position: spawn.spawn_position,
            position: spawn.spawn_position,
            half_extents: spawn.half_extents,
            entered_drum: false,
        });
        self.len += 1;
        id
    }

    pub fn get(&self, id: NoteId) -> Option<&ActiveNote> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.note.as_ref())
    }

    pub fn get_mut(&mut self, id: NoteId) -> Option<&mut ActiveNote> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.note.as_mut())
    }

    /// Destroy a note. Returns `None` for stale or already-removed ids.
    pub fn remove(&mut self, id: NoteId) -> Option<ActiveNote> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let note = slot.note.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(note)
    }

    pub fn contains(&self, id: NoteId) -> bool {
        self.get(id).is_some()
    }

    /// Live notes targeting `drum`, oldest slot first.
    pub fn ids_for_drum(&self, drum: EntityId) -> Vec<NoteId> {
        self.iter()
            .filter(|note| note.drum == drum)
            .map(|note| note.id)
            .collect()
    }

    pub fn ids(&self) -> Vec<NoteId> {
        self.iter().map(|note| note.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveNote> {
        self.slots.iter().filter_map(|slot| slot.note.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ActiveNote> {
        self.slots.iter_mut().filter_map(|slot| slot.note.as_mut())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove every note, returning them for disposal.
    pub fn drain(&mut self) -> Vec<ActiveNote> {
        self.ids()
            .into_iter()
            .filter_map(|id| self.remove(id))
            .collect()
    }
}
