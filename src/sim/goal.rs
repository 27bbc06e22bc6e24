//! Goal region and one-shot completion detection

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Cylinder-shaped region the player has to reach
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalRegion {
    /// Player centre position that counts as dead on target
    pub center: Vec3,
    /// Maximum planar (XZ) distance from the centre
    pub radius: f32,
    /// Maximum vertical offset from the centre
    pub height_tolerance: f32,
}

impl GoalRegion {
    pub fn contains(&self, position: Vec3) -> bool {
        let planar = Vec3::new(position.x - self.center.x, 0.0, position.z - self.center.z);
        planar.length() < self.radius && (position.y - self.center.y).abs() < self.height_tolerance
    }
}

/// Fires once per reset when the player enters the region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalDetector {
    region: GoalRegion,
    triggered: bool,
}

impl GoalDetector {
    pub fn new(region: GoalRegion) -> Self {
        Self {
            region,
            triggered: false,
        }
    }

    /// True only on the first call that finds the player inside
    pub fn check(&mut self, position: Vec3) -> bool {
        if self.triggered || !self.region.contains(position) {
            return false;
        }
        self.triggered = true;
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    pub fn region(&self) -> &GoalRegion {
        &self.region
    }

    pub fn reset(&mut self) {
        self.triggered = false;
    }
}
