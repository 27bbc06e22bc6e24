//! Data-driven balance for both arena variants
//!
//! Every field has a default, so a tuning file only needs the values it
//! changes. Loaded once per session; never touched by the tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::MIN_MAZE_SIZE;
use crate::error::TuningError;

/// Curve the platform course follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CoursePath {
    /// Widening spiral around the origin
    #[default]
    Spiral,
    /// Randomly turning walk
    Wander,
}

impl CoursePath {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoursePath::Spiral => "Spiral",
            CoursePath::Wander => "Wander",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "spiral" => Some(CoursePath::Spiral),
            "wander" | "random" => Some(CoursePath::Wander),
            _ => None,
        }
    }
}

/// Mouse/touch look settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookTuning {
    /// Radians per mouse pixel
    pub sensitivity: f32,
    /// Radians per touch-drag pixel
    pub touch_sensitivity: f32,
    /// Yaw change per tick while a turn button is held (radians)
    pub turn_rate: f32,
    /// Maximum absolute pitch (radians), must stay below π/2
    pub pitch_limit: f32,
}

impl Default for LookTuning {
    fn default() -> Self {
        Self {
            sensitivity: 0.002,
            touch_sensitivity: 0.01,
            turn_rate: 0.05,
            pitch_limit: std::f32::consts::FRAC_PI_2 - 0.01,
        }
    }
}

/// Maze walker balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeTuning {
    /// Side length in tiles
    pub size: usize,
    /// World units per tile
    pub cell_size: f32,
    pub wall_height: f32,
    /// Half width of the player's square footprint
    pub player_radius: f32,
    /// Height of the player's centre above the floor
    pub eye_height: f32,
    /// Displacement per tick when walking
    pub walk_speed: f32,
    /// Walk speed multiplier while sprinting
    pub sprint_multiplier: f32,
    pub goal_radius: f32,
    pub goal_height: f32,
}

impl Default for MazeTuning {
    fn default() -> Self {
        Self {
            size: 15,
            cell_size: 2.0,
            wall_height: 3.0,
            player_radius: 0.3,
            eye_height: 1.6,
            walk_speed: 0.1,
            sprint_multiplier: 2.0,
            goal_radius: 1.0,
            goal_height: 2.0,
        }
    }
}

/// Parkour course balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseTuning {
    /// Regular platforms before the goal
    pub platform_count: usize,
    pub path: CoursePath,
    /// Horizontal distance between consecutive platform centres
    pub spacing: f32,
    /// Height gained per platform
    pub rise: f32,
    /// Starting radius of the spiral
    pub spiral_radius: f32,
    /// Radius added per platform on the spiral
    pub spiral_growth: f32,
    /// Maximum heading change per platform on a wandering path (radians)
    pub max_turn: f32,
    /// Half extents of the player's bounding box
    pub player_half_extents: Vec3,
    /// Horizontal speed (units/second)
    pub walk_speed: f32,
    pub sprint_multiplier: f32,
    /// Walk speed multiplier while boost is switched on
    pub boost_multiplier: f32,
    /// Vertical speed while flying and holding ascend or descend (units/second)
    pub fly_speed: f32,
    /// Downward acceleration (units/second²)
    pub gravity: f32,
    /// Maximum fall speed
    pub terminal_velocity: f32,
    pub jump_velocity: f32,
    pub double_jump_velocity: f32,
    /// Horizontal speed given by a wall jump
    pub wall_jump_push: f32,
    /// Exponential decay rate of horizontal impulse velocity (1/second)
    pub air_drag: f32,
    /// Distance below the lowest platform that counts as falling out
    pub fall_margin: f32,
    pub goal_radius: f32,
    pub goal_height: f32,
}

impl Default for CourseTuning {
    fn default() -> Self {
        Self {
            platform_count: 24,
            path: CoursePath::Spiral,
            spacing: 4.0,
            rise: 0.6,
            spiral_radius: 10.0,
            spiral_growth: 0.4,
            max_turn: 0.6,
            player_half_extents: Vec3::new(0.3, 0.9, 0.3),
            walk_speed: 6.0,
            sprint_multiplier: 1.6,
            boost_multiplier: 2.0,
            fly_speed: 12.0,
            gravity: 25.0,
            terminal_velocity: 40.0,
            jump_velocity: 10.0,
            double_jump_velocity: 9.0,
            wall_jump_push: 7.0,
            air_drag: 4.0,
            fall_margin: 20.0,
            goal_radius: 2.0,
            goal_height: 1.5,
        }
    }
}

/// Complete tuning set for a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub maze: MazeTuning,
    pub course: CourseTuning,
    pub look: LookTuning,
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!(
            "Loaded tuning: maze {}x{}, course {} platforms ({})",
            tuning.maze.size,
            tuning.maze.size,
            tuning.course.platform_count,
            tuning.course.path.as_str()
        );
        Ok(tuning)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot work with
    pub fn validate(&self) -> Result<(), TuningError> {
        fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(TuningError::Invalid {
                    field,
                    reason: "must be a positive finite number",
                })
            }
        }

        if self.maze.size < MIN_MAZE_SIZE {
            return Err(TuningError::Invalid {
                field: "maze.size",
                reason: "below minimum maze size",
            });
        }
        positive("maze.cell_size", self.maze.cell_size)?;
        positive("maze.wall_height", self.maze.wall_height)?;
        positive("maze.walk_speed", self.maze.walk_speed)?;
        positive("maze.sprint_multiplier", self.maze.sprint_multiplier)?;
        positive("maze.goal_radius", self.maze.goal_radius)?;
        positive("maze.goal_height", self.maze.goal_height)?;
        if !(self.maze.player_radius > 0.0 && self.maze.player_radius < self.maze.cell_size / 2.0)
        {
            return Err(TuningError::Invalid {
                field: "maze.player_radius",
                reason: "must fit inside one corridor",
            });
        }

        if self.course.platform_count == 0 {
            return Err(TuningError::Invalid {
                field: "course.platform_count",
                reason: "must be at least 1",
            });
        }
        positive("course.spacing", self.course.spacing)?;
        positive("course.walk_speed", self.course.walk_speed)?;
        positive("course.sprint_multiplier", self.course.sprint_multiplier)?;
        positive("course.boost_multiplier", self.course.boost_multiplier)?;
        positive("course.fly_speed", self.course.fly_speed)?;
        positive("course.gravity", self.course.gravity)?;
        positive("course.terminal_velocity", self.course.terminal_velocity)?;
        positive("course.jump_velocity", self.course.jump_velocity)?;
        positive("course.fall_margin", self.course.fall_margin)?;
        positive("course.goal_radius", self.course.goal_radius)?;
        positive("course.goal_height", self.course.goal_height)?;
        let half = self.course.player_half_extents;
        if !(half.is_finite() && half.min_element() > 0.0) {
            return Err(TuningError::Invalid {
                field: "course.player_half_extents",
                reason: "must be positive on every axis",
            });
        }

        positive("look.sensitivity", self.look.sensitivity)?;
        positive("look.touch_sensitivity", self.look.touch_sensitivity)?;
        positive("look.turn_rate", self.look.turn_rate)?;
        if !(self.look.pitch_limit > 0.0 && self.look.pitch_limit < std::f32::consts::FRAC_PI_2) {
            return Err(TuningError::Invalid {
                field: "look.pitch_limit",
                reason: "must lie strictly inside (0, π/2)",
            });
        }
        Ok(())
    }
}
