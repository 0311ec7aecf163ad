//! Drum rig and tracked hands.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::{Aabb, Collider, EntityId, Handedness};
use crate::track::InstrumentId;

/// Drum pad half extents: a 0.3-radius, 0.2-high pad scaled by 0.3.
pub const DEFAULT_DRUM_HALF_EXTENTS: Vec3 = Vec3::new(0.09, 0.03, 0.09);

/// Where hands rest while not striking.
pub const HAND_REST_HEIGHT: f32 = 0.8;

/// Config-file description of one drum pad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrumSpec {
    pub instrument: InstrumentId,
    pub position: Vec3,
    #[serde(default = "default_drum_half_extents")]
    pub half_extents: Vec3,
}

fn default_drum_half_extents() -> Vec3 {
    DEFAULT_DRUM_HALF_EXTENTS
}

/// A drum pad in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Drum {
    pub id: EntityId,
    pub instrument: InstrumentId,
    pub position: Vec3,
    pub half_extents: Vec3,
}

impl Collider for Drum {
    fn id(&self) -> EntityId {
        self.id
    }

    fn bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(self.position, self.half_extents)
    }
}

impl Drum {
    /// Volume in which falling notes can be struck: the pad footprint,
    /// stretched to `reach` above and below the pad centre.
    pub fn strike_zone(&self, reach: f32) -> StrikeZone<'_> {
        StrikeZone { drum: self, reach }
    }
}

/// A drum seen by falling notes. Shares the drum's id, so note↔drum
/// transitions stay keyed on the drum itself.
#[derive(Debug, Clone, Copy)]
pub struct StrikeZone<'a> {
    drum: &'a Drum,
    reach: f32,
}

impl Collider for StrikeZone<'_> {
    fn id(&self) -> EntityId {
        self.drum.id
    }

    fn bounds(&self) -> Aabb {
        let half = Vec3::new(
            self.drum.half_extents.x,
            self.reach.max(self.drum.half_extents.y),
            self.drum.half_extents.z,
        );
        Aabb::from_center_half_extents(self.drum.position, half)
    }
}

/// Drum pads keyed by the instrument they play.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrumRig {
    drums: BTreeMap<InstrumentId, Drum>,
}

impl DrumRig {
    /// Build a rig from specs. Later specs for the same instrument replace
    /// earlier ones.
    pub fn from_specs(specs: &[DrumSpec]) -> Self {
        let mut drums = BTreeMap::new();
        for (index, spec) in specs.iter().enumerate() {
            drums.insert(
                spec.instrument.clone(),
                Drum {
                    id: EntityId::Drum(index as u16),
                    instrument: spec.instrument.clone(),
                    position: spec.position,
                    half_extents: spec.half_extents,
                },
            );
        }
        Self { drums }
    }

    /// The four-pad layout: snare and kick in front, crash and hihat to the sides.
    pub fn default_kit() -> Self {
        Self::from_specs(&default_specs())
    }

    pub fn get(&self, instrument: &InstrumentId) -> Option<&Drum> {
        self.drums.get(instrument)
    }

    pub fn by_id(&self, id: EntityId) -> Option<&Drum> {
        self.drums.values().find(|drum| drum.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Drum> {
        self.drums.values()
    }

    pub fn len(&self) -> usize {
        self.drums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drums.is_empty()
    }
}

/// Specs for [`DrumRig::default_kit`].
pub fn default_specs() -> Vec<DrumSpec> {
    [
        ("snare", Vec3::new(-0.15, 1.2, -0.7)),
        ("kick", Vec3::new(0.15, 1.2, -0.7)),
        ("crash", Vec3::new(-0.425, 1.2, -0.6)),
        ("hihat", Vec3::new(0.425, 1.2, -0.6)),
    ]
    .into_iter()
    .map(|(name, position)| DrumSpec {
        instrument: InstrumentId::from(name),
        position,
        half_extents: DEFAULT_DRUM_HALF_EXTENTS,
    })
    .collect()
}

/// Hand positions for one tick. `None` when the hand is not tracked.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HandPoses {
    pub left: Option<Vec3>,
    pub right: Option<Vec3>,
}

impl HandPoses {
    /// No XR session, no hands.
    pub fn untracked() -> Self {
        Self::default()
    }

    pub fn get(&self, side: Handedness) -> Option<Vec3> {
        match side {
            Handedness::Left => self.left,
            Handedness::Right => self.right,
        }
    }

    pub fn set(&mut self, side: Handedness, position: Option<Vec3>) {
        match side {
            Handedness::Left => self.left = position,
            Handedness::Right => self.right = position,
        }
    }
}

/// A tracked hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hand {
    pub side: Handedness,
    pub position: Option<Vec3>,
    pub half_extents: Vec3,
}

impl Hand {
    pub fn new(side: Handedness, half_extents: Vec3) -> Self {
        Self {
            side,
            position: None,
            half_extents,
        }
    }

    pub fn is_tracked(&self) -> bool {
        self.position.is_some()
    }
}

impl Collider for Hand {
    fn id(&self) -> EntityId {
        EntityId::Hand(self.side)
    }

    /// Untracked hands collapse to an empty box far below the floor.
    fn bounds(&self) -> Aabb {
        let center = self.position.unwrap_or(Vec3::new(0.0, -1000.0, 0.0));
        Aabb::from_center_half_extents(center, self.half_extents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_kit_has_four_pads_at_same_height() {
        let rig = DrumRig::default_kit();
        assert_eq!(rig.len(), 4);
        assert!(rig.iter().all(|d| (d.position.y - 1.2).abs() < f32::EPSILON));
    }

    #[test]
    fn drum_ids_are_unique() {
        let rig = DrumRig::default_kit();
        let mut ids: Vec<EntityId> = rig.iter().map(|d| d.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn lookup_by_instrument_and_id() {
        let rig = DrumRig::default_kit();
        let kick = rig.get(&InstrumentId::from("kick")).unwrap();
        assert_eq!(rig.by_id(kick.id), Some(kick));
        assert!(rig.get(&InstrumentId::from("cowbell")).is_none());
    }

    #[test]
    fn default_pads_do_not_overlap() {
        let rig = DrumRig::default_kit();
        let drums: Vec<&Drum> = rig.iter().collect();
        for (i, a) in drums.iter().enumerate() {
            for b in &drums[i + 1..] {
                assert!(!a.bounds().intersects(&b.bounds()));
            }
        }
    }

    #[test]
    fn strike_zone_stretches_only_vertically() {
        let rig = DrumRig::default_kit();
        let snare = rig.get(&InstrumentId::from("snare")).unwrap();
        let zone = snare.strike_zone(0.6);
        assert_eq!(zone.id(), snare.id);
        let b = zone.bounds();
        assert!((b.max.y - 1.8).abs() < 1e-6);
        assert!((b.min.y - 0.6).abs() < 1e-6);
        assert_eq!(b.min.x, snare.bounds().min.x);
        assert_eq!(b.max.z, snare.bounds().max.z);

        // Never thinner than the pad itself.
        assert_eq!(snare.strike_zone(0.0).bounds(), snare.bounds());
    }

    #[test]
    fn untracked_hand_touches_nothing() {
        let hand = Hand::new(Handedness::Left, Vec3::splat(0.05));
        let rig = DrumRig::default_kit();
        assert!(!hand.is_tracked());
        assert!(rig.iter().all(|d| !hand.bounds().intersects(&d.bounds())));
    }

    #[test]
    fn hand_poses_get_set() {
        let mut poses = HandPoses::untracked();
        poses.set(Handedness::Right, Some(Vec3::ONE));
        assert_eq!(poses.get(Handedness::Right), Some(Vec3::ONE));
        assert_eq!(poses.get(Handedness::Left), None);
    }

    #[test]
    fn drum_spec_yaml_defaults_half_extents() {
        let yaml = "instrument: kick\nposition: [0.0, 1.0, -0.5]\n";
        let spec: DrumSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.half_extents, DEFAULT_DRUM_HALF_EXTENTS);
        assert_eq!(spec.position, Vec3::new(0.0, 1.0, -0.5));
    }
}
