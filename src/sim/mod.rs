//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Host-supplied timestep only
//! - Seeded RNG only
//! - Stable iteration order (tiles row-major, platforms by id)
//! - No rendering or platform dependencies

pub mod aabb;
pub mod collision;
pub mod course;
pub mod goal;
pub mod maze;
pub mod platform;
pub mod player;
pub mod state;
pub mod tick;

pub use aabb::Aabb;
pub use collision::{CourseCollision, LANDING_TOLERANCE, MazeCollision, ResolvedMove};
pub use course::{PlatformBehavior, PlatformCourse, PlatformDesc, PlatformShape};
pub use goal::{GoalDetector, GoalRegion};
pub use maze::{GenerationStats, MazeGrid, Tile};
pub use platform::{LivePlatform, PlatformMotion};
pub use player::{JumpKind, PlayerPhase, PlayerState, planar_displacement};
pub use state::{GameEvent, GameSession, Level, Variant};
pub use tick::{FixedStep, tick};
