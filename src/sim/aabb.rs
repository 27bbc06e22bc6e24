//! Axis-aligned boxes for obstacle volumes and the player
//!
//! Every collision test in the crate reduces to box overlap. Touching faces
//! do not count as overlap, so a player resting exactly on a surface is free.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box centred on a point
    #[inline]
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Strict overlap on all three axes
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Strict overlap ignoring height
    #[inline]
    pub fn overlaps_xz(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Overlap depth on each axis (only meaningful when overlapping)
    pub fn penetration(&self, other: &Aabb) -> Vec3 {
        self.max.min(other.max) - self.min.max(other.min)
    }

    /// Bounding box of this box after rotating it about its vertical axis
    pub fn rotated_y(&self, angle: f32) -> Aabb {
        let half = self.half_extents();
        let (sin, cos) = angle.sin_cos();
        let (sin, cos) = (sin.abs(), cos.abs());
        let rotated = Vec3::new(
            cos * half.x + sin * half.z,
            half.y,
            sin * half.x + cos * half.z,
        );
        Aabb::from_center(self.center(), rotated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_is_not_overlap() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        assert!(!a.overlaps(&b));
        let c = Aabb::new(Vec3::new(0.9, 0.0, 0.0), Vec3::new(1.9, 1.0, 1.0));
        assert!(a.overlaps(&c));
        assert!((a.penetration(&c).x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_rotated_quarter_turn_swaps_extents() {
        let slab = Aabb::from_center(Vec3::ZERO, Vec3::new(3.0, 0.5, 1.0));
        let turned = slab.rotated_y(std::f32::consts::FRAC_PI_2);
        let half = turned.half_extents();
        assert!((half.x - 1.0).abs() < 1e-5);
        assert!((half.z - 3.0).abs() < 1e-5);
        assert!((half.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_new_orders_corners() {
        let b = Aabb::new(Vec3::ONE, Vec3::ZERO);
        assert_eq!(b.min, Vec3::ZERO);
        assert_eq!(b.max, Vec3::ONE);
    }
}
