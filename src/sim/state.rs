//! Session state and level construction
//!
//! Everything a running level owns lives in `GameSession`. A reset builds a
//! complete new `Level` first and only then swaps it in, so a failed build
//! leaves the previous level untouched.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::{CourseCollision, MazeCollision};
use super::course::PlatformCourse;
use super::goal::{GoalDetector, GoalRegion};
use super::maze::MazeGrid;
use super::player::{JumpKind, PlayerPhase, PlayerState};
use crate::error::ArenaError;
use crate::input::{InputBuffer, MoveFlag};
use crate::snapshot::RenderSnapshot;
use crate::tuning::{MazeTuning, Tuning};
use crate::yaw_towards;

/// Which kind of arena a session plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    /// Flat maze walked at a fixed per-tick speed
    Maze,
    /// Platform course with gravity and jumps
    Course,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Maze => "maze",
            Variant::Course => "course",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "maze" => Some(Variant::Maze),
            "course" | "parkour" => Some(Variant::Course),
            _ => None,
        }
    }
}

/// Something the host may want to react to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Goal reached; pushed once per reset
    LevelComplete { ticks: u64 },
    /// Fell out of the course and was put back at the spawn
    Respawned,
    /// Touched down on a platform
    Landed { platform: Option<u32> },
    Jumped(JumpKind),
}

/// An arena together with the collision world derived from it
#[derive(Debug, Clone)]
pub enum Level {
    Maze {
        grid: MazeGrid,
        world: MazeCollision,
    },
    Course {
        course: PlatformCourse,
        world: CourseCollision,
        /// Player centre height below which the player respawns
        fall_threshold: f32,
    },
}

impl Level {
    /// Validate the tuning, generate an arena and place the player and goal in it
    pub fn build(
        variant: Variant,
        seed: Option<u64>,
        tuning: &Tuning,
    ) -> Result<(Level, PlayerState, GoalDetector), ArenaError> {
        tuning.validate()?;
        match variant {
            Variant::Maze => {
                let t = &tuning.maze;
                let grid = MazeGrid::generate(t.size, seed)?;
                let world = MazeCollision::build(&grid, t.cell_size, t.wall_height);

                let (sx, sz) = grid.spawn();
                let spawn = world.tile_center(sx, sz) + Vec3::Y * t.eye_height;
                // The entry opens east into the first corridor
                let player = PlayerState::new(spawn, yaw_towards(Vec3::X));

                let (ex, ez) = grid.exit();
                let goal = GoalDetector::new(GoalRegion {
                    center: world.tile_center(ex, ez) + Vec3::Y * t.eye_height,
                    radius: t.goal_radius,
                    height_tolerance: t.goal_height,
                });

                Ok((Level::Maze { grid, world }, player, goal))
            }
            Variant::Course => {
                let t = &tuning.course;
                let course = PlatformCourse::generate(t.platform_count, seed, t)?;
                let world = CourseCollision::build(&course);

                let spawn = course.spawn_point(t.player_half_extents);
                let first = course.platforms()[0].origin;
                let heading = course
                    .all()
                    .nth(1)
                    .map_or(Vec3::NEG_Z, |next| next.origin - first);
                let player = PlayerState::new(spawn, yaw_towards(heading));

                let goal_desc = course.goal();
                let goal = GoalDetector::new(GoalRegion {
                    center: Vec3::new(
                        goal_desc.origin.x,
                        goal_desc.top() + t.player_half_extents.y,
                        goal_desc.origin.z,
                    ),
                    radius: t.goal_radius,
                    height_tolerance: t.goal_height,
                });

                let fall_threshold = course.lowest_point() - t.fall_margin;
                Ok((
                    Level::Course {
                        course,
                        world,
                        fall_threshold,
                    },
                    player,
                    goal,
                ))
            }
        }
    }

    pub fn variant(&self) -> Variant {
        match self {
            Level::Maze { .. } => Variant::Maze,
            Level::Course { .. } => Variant::Course,
        }
    }

    pub fn seed(&self) -> u64 {
        match self {
            Level::Maze { grid, .. } => grid.seed(),
            Level::Course { course, .. } => course.seed(),
        }
    }
}

/// Player box used in the maze: square footprint, centred at eye height
pub fn maze_half_extents(tuning: &MazeTuning) -> Vec3 {
    Vec3::new(
        tuning.player_radius,
        tuning.eye_height / 2.0,
        tuning.player_radius,
    )
}

/// One playable level and everything that changes while playing it
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Seed the current level was generated from
    pub seed: u64,
    pub tuning: Tuning,
    pub level: Level,
    pub player: PlayerState,
    pub goal: GoalDetector,
    /// Written by event handlers, drained by the tick
    pub input: InputBuffer,
    /// Simulation tick counter since the last reset
    pub time_ticks: u64,
    /// Simulated seconds since the last reset (drives platform poses)
    pub clock: f32,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Build a session; `None` picks a random seed
    pub fn new(variant: Variant, seed: Option<u64>, tuning: Tuning) -> Result<Self, ArenaError> {
        let (level, player, goal) = Level::build(variant, seed, &tuning)?;
        log::info!(
            "Starting {} session (seed {})",
            variant.as_str(),
            level.seed()
        );
        Ok(Self {
            seed: level.seed(),
            tuning,
            level,
            player,
            goal,
            input: InputBuffer::new(),
            time_ticks: 0,
            clock: 0.0,
            events: Vec::new(),
        })
    }

    /// Regenerate the arena and start over
    pub fn reset(&mut self, seed: Option<u64>) -> Result<(), ArenaError> {
        let (level, player, goal) = Level::build(self.variant(), seed, &self.tuning)?;
        self.seed = level.seed();
        self.level = level;
        self.player = player;
        self.goal = goal;
        self.input.clear();
        self.time_ticks = 0;
        self.clock = 0.0;
        self.events.clear();
        log::info!(
            "Reset {} session (seed {})",
            self.variant().as_str(),
            self.seed
        );
        Ok(())
    }

    /// Replay the current arena from the spawn without regenerating it
    pub fn restart(&mut self) {
        self.player.respawn();
        self.goal.reset();
        self.input.clear();
        self.time_ticks = 0;
        self.clock = 0.0;
        self.events.clear();
        if let Level::Course { world, .. } = &mut self.level {
            world.advance(0.0);
        }
        log::info!(
            "Restarted {} session (seed {})",
            self.variant().as_str(),
            self.seed
        );
    }

    pub fn variant(&self) -> Variant {
        self.level.variant()
    }

    /// Take all events pushed since the previous call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn set_intent(&mut self, flag: MoveFlag, active: bool) {
        self.input.set_intent(flag, active);
    }

    pub fn add_look_delta(&mut self, dx: f32, dy: f32) {
        self.input.add_look_delta(dx, dy);
    }

    pub fn add_touch_delta(&mut self, dx: f32, dy: f32) {
        self.input.add_touch_delta(dx, dy);
    }

    pub fn is_complete(&self) -> bool {
        self.player.phase == PlayerPhase::Completed
    }

    pub fn player_half_extents(&self) -> Vec3 {
        match self.level {
            Level::Maze { .. } => maze_half_extents(&self.tuning.maze),
            Level::Course { .. } => self.tuning.course.player_half_extents,
        }
    }

    /// Read-only view for a renderer
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(self)
    }
}
