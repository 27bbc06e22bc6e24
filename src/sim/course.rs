//! Platform course generation
//!
//! Platforms are laid along a curve (spiral or wandering walk), each one
//! `rise` higher than the last, ending in a wide goal platform. Shapes and
//! behaviours come from index cycles rather than the RNG, so a course always
//! ramps up the same way; the seed only bends a wandering path.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::ArenaError;
use crate::tuning::{CoursePath, CourseTuning};

/// Platforms at the start of every course that never move
pub const STATIC_LEAD_IN: usize = 3;

/// Goal platform distance past the last platform, in multiples of spacing
const GOAL_STEP: f32 = 1.5;

/// Platform footprint classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformShape {
    /// Square box
    Block,
    /// Round pillar, collides as its bounding box
    Column,
    /// Long thin plank
    Slab,
    /// Wide landing pad at the end
    Goal,
}

impl PlatformShape {
    pub fn half_extents(&self) -> Vec3 {
        match self {
            PlatformShape::Block => Vec3::new(1.5, 0.5, 1.5),
            PlatformShape::Column => Vec3::new(1.0, 1.0, 1.0),
            PlatformShape::Slab => Vec3::new(1.6, 0.25, 0.9),
            PlatformShape::Goal => Vec3::new(3.0, 0.5, 3.0),
        }
    }
}

const SHAPE_CYCLE: [PlatformShape; 3] = [
    PlatformShape::Block,
    PlatformShape::Column,
    PlatformShape::Slab,
];

/// How a platform moves over time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlatformBehavior {
    Static,
    /// Oscillates along `axis` by ±`range`
    Moving { speed: f32, range: f32, axis: Vec3 },
    /// Bounces between its origin and `height` above it
    Bouncing { speed: f32, height: f32 },
    /// Solid for `on_ms`, then gone for `off_ms`, repeating
    Disappearing { on_ms: u32, off_ms: u32 },
    /// Spins about its vertical axis (radians/second)
    Rotating { speed: f32 },
}

impl PlatformBehavior {
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, PlatformBehavior::Static)
    }

    /// Behaviour for the platform at `index`; `tangent` is the course
    /// direction at that platform
    pub fn for_index(index: usize, tangent: Vec3) -> Self {
        if index < STATIC_LEAD_IN {
            return PlatformBehavior::Static;
        }
        let step = index - STATIC_LEAD_IN;
        let tier = (step / 8) as f32;
        match step % 8 {
            1 => PlatformBehavior::Moving {
                speed: 1.0 + 0.2 * tier,
                range: 1.5,
                // Sideways to the direction of travel
                axis: Vec3::new(-tangent.z, 0.0, tangent.x).normalize_or_zero(),
            },
            3 => PlatformBehavior::Bouncing {
                speed: 1.5 + 0.2 * tier,
                height: 1.2,
            },
            5 => PlatformBehavior::Disappearing {
                on_ms: 2000u32.saturating_sub(200 * (step / 8) as u32).max(1200),
                off_ms: 1200,
            },
            7 => PlatformBehavior::Rotating {
                speed: 0.8 + 0.1 * tier,
            },
            _ => PlatformBehavior::Static,
        }
    }
}

/// Immutable description of one platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformDesc {
    pub id: u32,
    pub shape: PlatformShape,
    pub behavior: PlatformBehavior,
    /// Rest position of the platform's centre
    pub origin: Vec3,
    /// Time offset so neighbouring platforms do not move in lockstep
    pub phase: f32,
}

impl PlatformDesc {
    /// Height of the top face at rest
    pub fn top(&self) -> f32 {
        self.origin.y + self.shape.half_extents().y
    }
}

/// A generated parkour course
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformCourse {
    seed: u64,
    path: CoursePath,
    platforms: Vec<PlatformDesc>,
    goal: PlatformDesc,
}

impl PlatformCourse {
    /// Lay out `count` platforms plus the goal
    pub fn generate(
        count: usize,
        seed: Option<u64>,
        tuning: &CourseTuning,
    ) -> Result<Self, ArenaError> {
        if count == 0 {
            return Err(ArenaError::EmptyCourse);
        }
        let seed = seed.unwrap_or_else(rand::random);
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut walker = CurveWalker::new(tuning);

        let mut platforms = Vec::with_capacity(count);
        for i in 0..count {
            let (pos, tangent) = walker.step(&mut rng, 1.0);
            let shape = SHAPE_CYCLE[i % SHAPE_CYCLE.len()];
            platforms.push(PlatformDesc {
                id: i as u32,
                shape,
                behavior: PlatformBehavior::for_index(i, tangent),
                origin: pos + Vec3::Y * (i as f32 * tuning.rise),
                phase: i as f32 * 0.7,
            });
        }

        let (goal_pos, _) = walker.step(&mut rng, GOAL_STEP);
        let goal = PlatformDesc {
            id: count as u32,
            shape: PlatformShape::Goal,
            behavior: PlatformBehavior::Static,
            origin: goal_pos + Vec3::Y * (count as f32 * tuning.rise),
            phase: 0.0,
        };

        log::info!(
            "Generated {} course (seed {}): {} platforms, {} dynamic, goal at {:?}",
            tuning.path.as_str(),
            seed,
            count,
            platforms.iter().filter(|p| p.behavior.is_dynamic()).count(),
            goal.origin
        );

        Ok(Self {
            seed,
            path: tuning.path,
            platforms,
            goal,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn path(&self) -> CoursePath {
        self.path
    }

    /// Regular platforms in traversal order
    pub fn platforms(&self) -> &[PlatformDesc] {
        &self.platforms
    }

    pub fn goal(&self) -> &PlatformDesc {
        &self.goal
    }

    /// Regular platforms followed by the goal
    pub fn all(&self) -> impl Iterator<Item = &PlatformDesc> {
        self.platforms.iter().chain(std::iter::once(&self.goal))
    }

    /// Player centre when standing on the first platform
    pub fn spawn_point(&self, player_half_extents: Vec3) -> Vec3 {
        let first = &self.platforms[0];
        Vec3::new(
            first.origin.x,
            first.top() + player_half_extents.y,
            first.origin.z,
        )
    }

    /// Lowest bottom face of any platform at rest
    pub fn lowest_point(&self) -> f32 {
        self.all()
            .map(|p| p.origin.y - p.shape.half_extents().y)
            .fold(f32::INFINITY, f32::min)
    }
}

/// Walks the horizontal course curve one platform at a time
struct CurveWalker<'a> {
    tuning: &'a CourseTuning,
    index: usize,
    angle: f32,
    heading: f32,
    pos: Vec3,
}

impl<'a> CurveWalker<'a> {
    fn new(tuning: &'a CourseTuning) -> Self {
        Self {
            tuning,
            index: 0,
            angle: 0.0,
            heading: 0.0,
            pos: Vec3::ZERO,
        }
    }

    /// Next horizontal position and the direction of travel into it.
    /// `stride` scales the spacing for this step.
    fn step(&mut self, rng: &mut Pcg32, stride: f32) -> (Vec3, Vec3) {
        let t = self.tuning;
        let distance = t.spacing * stride;
        let result = match t.path {
            CoursePath::Spiral => {
                let radius = t.spiral_radius + t.spiral_growth * self.index as f32;
                if self.index > 0 {
                    // Advance by arc length
                    self.angle += distance / radius.max(1.0);
                }
                let (sin, cos) = self.angle.sin_cos();
                let pos = Vec3::new(radius * cos, 0.0, radius * sin);
                let tangent = Vec3::new(-sin, 0.0, cos);
                (pos, tangent)
            }
            CoursePath::Wander => {
                if self.index > 0 {
                    let turn = t.max_turn.abs();
                    if turn > 0.0 {
                        self.heading += rng.random_range(-turn..=turn);
                    }
                    let dir = Vec3::new(self.heading.cos(), 0.0, self.heading.sin());
                    self.pos += dir * distance;
                }
                let tangent = Vec3::new(self.heading.cos(), 0.0, self.heading.sin());
                (self.pos, tangent)
            }
        };
        self.index += 1;
        result
    }
}
