//! Axis-aligned bounding boxes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create a box from two corners in any order.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Box centred on `center` extending `half_extents` along each axis.
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Inclusive per-axis overlap test. Touching faces count as overlap.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Lower the bottom face by `amount`, leaving the top untouched.
    pub fn extend_down(&self, amount: f32) -> Self {
        Self {
            min: Vec3::new(self.min.x, self.min.y - amount, self.min.z),
            max: self.max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_at(x: f32, y: f32, z: f32) -> Aabb {
        Aabb::from_center_half_extents(Vec3::new(x, y, z), Vec3::splat(0.5))
    }

    #[test]
    fn new_orders_corners() {
        let b = Aabb::new(Vec3::new(1.0, -1.0, 2.0), Vec3::new(-1.0, 1.0, 0.0));
        assert_eq!(b.min, Vec3::new(-1.0, -1.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, 1.0, 2.0));
    }

    #[test]
    fn overlapping_boxes_intersect() {
        assert!(unit_at(0.0, 0.0, 0.0).intersects(&unit_at(0.5, 0.5, 0.5)));
    }

    #[test]
    fn separated_on_one_axis_do_not_intersect() {
        assert!(!unit_at(0.0, 0.0, 0.0).intersects(&unit_at(0.0, 0.0, 1.5)));
        assert!(!unit_at(0.0, 0.0, 0.0).intersects(&unit_at(0.0, -1.01, 0.0)));
    }

    #[test]
    fn touching_faces_intersect() {
        assert!(unit_at(0.0, 0.0, 0.0).intersects(&unit_at(1.0, 0.0, 0.0)));
    }

    #[test]
    fn intersection_is_symmetric() {
        let a = unit_at(0.0, 0.0, 0.0);
        let b = unit_at(0.9, 0.2, -0.4);
        assert_eq!(a.intersects(&b), b.intersects(&a));
    }

    #[test]
    fn extend_down_keeps_top() {
        let b = unit_at(0.0, 2.0, 0.0);
        let ext = b.extend_down(b.height() / 2.0);
        assert!((ext.min.y - 1.0).abs() < f32::EPSILON);
        assert!((ext.max.y - 2.5).abs() < f32::EPSILON);
        assert!((ext.height() - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn contains_point() {
        let b = unit_at(0.0, 0.0, 0.0);
        assert!(b.contains(Vec3::new(0.5, 0.0, -0.5)));
        assert!(!b.contains(Vec3::new(0.6, 0.0, 0.0)));
    }

    #[test]
    fn center_and_size() {
        let b = Aabb::new(Vec3::ZERO, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(b.center(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(b.size(), Vec3::new(2.0, 4.0, 6.0));
    }
}
