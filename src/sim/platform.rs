//! Live platform poses
//!
//! A `LivePlatform` is the collision-side copy of a `PlatformDesc`. Its pose
//! is a pure function of the session clock, evaluated at the start of each
//! tick before any collision test.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::course::{PlatformBehavior, PlatformDesc, PlatformShape};
use crate::normalize_angle;

/// How far a platform moved during the last `advance`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformMotion {
    pub translation: Vec3,
    /// Yaw change (radians)
    pub rotation: f32,
}

/// A platform at its current pose
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivePlatform {
    pub id: u32,
    pub shape: PlatformShape,
    pub behavior: PlatformBehavior,
    pub origin: Vec3,
    pub phase: f32,
    pub is_goal: bool,
    /// Current centre
    pub position: Vec3,
    /// Current yaw
    pub rotation: f32,
    /// False while a disappearing platform is gone
    pub solid: bool,
    pub last_motion: PlatformMotion,
}

impl LivePlatform {
    pub fn new(desc: &PlatformDesc, is_goal: bool) -> Self {
        Self {
            id: desc.id,
            shape: desc.shape,
            behavior: desc.behavior,
            origin: desc.origin,
            phase: desc.phase,
            is_goal,
            position: desc.origin,
            rotation: 0.0,
            solid: true,
            last_motion: PlatformMotion::default(),
        }
    }

    /// Move to the pose for absolute session time `time` (seconds)
    pub fn advance(&mut self, time: f32) -> PlatformMotion {
        let t = time + self.phase;
        let prev_position = self.position;
        let prev_rotation = self.rotation;

        match self.behavior {
            PlatformBehavior::Static => {}
            PlatformBehavior::Moving { speed, range, axis } => {
                self.position = self.origin + axis * ((t * speed).sin() * range);
            }
            PlatformBehavior::Bouncing { speed, height } => {
                self.position = self.origin + Vec3::Y * ((t * speed).sin().abs() * height);
            }
            PlatformBehavior::Disappearing { on_ms, off_ms } => {
                let period = u64::from(on_ms) + u64::from(off_ms);
                self.solid = if period == 0 {
                    true
                } else {
                    let ms = (t.max(0.0) * 1000.0) as u64;
                    ms % period < u64::from(on_ms)
                };
            }
            PlatformBehavior::Rotating { speed } => {
                self.rotation = normalize_angle(t * speed);
            }
        }

        self.last_motion = PlatformMotion {
            translation: self.position - prev_position,
            rotation: normalize_angle(self.rotation - prev_rotation),
        };
        self.last_motion
    }

    /// Collision box at the current pose
    pub fn bounds(&self) -> Aabb {
        let unrotated = Aabb::from_center(self.position, self.shape.half_extents());
        if self.rotation == 0.0 {
            unrotated
        } else {
            unrotated.rotated_y(self.rotation)
        }
    }

    pub fn top(&self) -> f32 {
        self.position.y + self.shape.half_extents().y
    }

    /// Where a rider standing at `point` ends up after the last motion
    pub fn carry(&self, point: Vec3) -> Vec3 {
        let motion = self.last_motion;
        let previous_center = self.position - motion.translation;
        let offset = point - previous_center;
        let offset = if motion.rotation == 0.0 {
            offset
        } else {
            Quat::from_rotation_y(motion.rotation) * offset
        };
        self.position + offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(behavior: PlatformBehavior) -> PlatformDesc {
        PlatformDesc {
            id: 1,
            shape: PlatformShape::Block,
            behavior,
            origin: Vec3::new(0.0, 5.0, 0.0),
            phase: 0.0,
        }
    }

    #[test]
    fn test_disappearing_duty_cycle() {
        let mut p = LivePlatform::new(
            &desc(PlatformBehavior::Disappearing {
                on_ms: 1000,
                off_ms: 500,
            }),
            false,
        );
        p.advance(0.2);
        assert!(p.solid);
        p.advance(1.2);
        assert!(!p.solid);
        p.advance(1.6);
        assert!(p.solid);
        p.advance(2.9);
        assert!(!p.solid);
    }

    #[test]
    fn test_moving_stays_within_range() {
        let mut p = LivePlatform::new(
            &desc(PlatformBehavior::Moving {
                speed: 2.0,
                range: 1.5,
                axis: Vec3::X,
            }),
            false,
        );
        for i in 0..200 {
            p.advance(i as f32 * 0.05);
            assert!((p.position - p.origin).length() <= 1.5 + 1e-5);
            assert_eq!(p.position.y, p.origin.y);
        }
    }

    #[test]
    fn test_bouncing_never_below_origin() {
        let mut p = LivePlatform::new(
            &desc(PlatformBehavior::Bouncing {
                speed: 3.0,
                height: 1.2,
            }),
            false,
        );
        for i in 0..200 {
            p.advance(i as f32 * 0.03);
            assert!(p.position.y >= p.origin.y - 1e-6);
            assert!(p.position.y <= p.origin.y + 1.2 + 1e-5);
        }
    }

    #[test]
    fn test_carry_follows_translation() {
        let mut p = LivePlatform::new(
            &desc(PlatformBehavior::Moving {
                speed: 1.0,
                range: 2.0,
                axis: Vec3::X,
            }),
            false,
        );
        p.advance(0.0);
        let rider = Vec3::new(0.5, 6.4, 0.0);
        let motion = p.advance(0.3);
        let carried = p.carry(rider);
        assert!((carried - (rider + motion.translation)).length() < 1e-5);
    }

    #[test]
    fn test_carry_follows_rotation() {
        let mut p = LivePlatform::new(&desc(PlatformBehavior::Rotating { speed: 1.0 }), false);
        p.advance(0.0);
        let rider = Vec3::new(1.0, 6.4, 0.0);
        p.advance(0.5);
        let carried = p.carry(rider);
        // Distance to the spin axis is preserved
        let radial = |v: Vec3| Vec3::new(v.x - p.position.x, 0.0, v.z - p.position.z).length();
        assert!((radial(carried) - radial(rider)).abs() < 1e-5);
        assert!((carried - rider).length() > 0.1);
        assert_eq!(carried.y, rider.y);
    }

    #[test]
    fn test_rotated_bounds_cover_footprint() {
        let mut slab = LivePlatform::new(&desc(PlatformBehavior::Rotating { speed: 1.0 }), false);
        slab.shape = PlatformShape::Slab;
        slab.advance(std::f32::consts::FRAC_PI_2);
        let half = slab.bounds().half_extents();
        assert!((half.x - 0.9).abs() < 1e-4);
        assert!((half.z - 1.6).abs() < 1e-4);
    }
}
