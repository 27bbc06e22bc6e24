//! Arena Runner - procedural arenas with first-person movement
//!
//! Core modules:
//! - `sim`: Deterministic simulation (arena generation, collision, player, goal)
//! - `input`: Intent buffer filled by key/pointer adapters
//! - `snapshot`: Read-only state handed to an external renderer
//! - `tuning`: Data-driven movement and arena balance
//! - `error`: Construction and configuration errors

pub mod error;
pub mod input;
pub mod sim;
pub mod snapshot;
pub mod tuning;

pub use error::{ArenaError, TuningError};
pub use input::{InputBuffer, InputIntent, KeyBinding, MoveFlag};
pub use snapshot::{ObstacleInstance, RenderSnapshot};
pub use tuning::{CoursePath, CourseTuning, LookTuning, MazeTuning, Tuning};

use glam::Vec3;

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Smallest maze the generator accepts (room for entry, exit and one corridor)
    pub const MIN_MAZE_SIZE: usize = 5;
    /// Entry cell of every maze on the west border, `(x, z)`; the player spawns here
    pub const MAZE_ENTRY: (usize, usize) = (0, 1);
    /// Interior lattice cell the backtracking walk starts from
    pub const MAZE_CARVE_START: (usize, usize) = (1, 1);
    /// Tiles force-opened along the exit row
    pub const EXIT_PATH_LEN: usize = 3;

    /// Separation kept between the player and a surface after depenetration
    pub const CONTACT_EPSILON: f32 = 1e-4;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid may round up to exactly TAU for tiny negative inputs
    if wrapped >= PI { wrapped - TAU } else { wrapped }
}

/// Horizontal forward direction for a yaw (yaw 0 looks down -Z)
#[inline]
pub fn forward_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
}

/// Horizontal right direction for a yaw
#[inline]
pub fn right_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(yaw.cos(), 0.0, -yaw.sin())
}

/// Yaw whose forward direction points along `dir` on the XZ plane
#[inline]
pub fn yaw_towards(dir: Vec3) -> f32 {
    if dir.x == 0.0 && dir.z == 0.0 {
        return 0.0;
    }
    (-dir.x).atan2(-dir.z)
}
