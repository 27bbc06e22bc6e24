//! Collision worlds and move resolution
//!
//! Two flavours share one result type:
//! - `MazeCollision`: flat corridors, resolved per axis so the player slides
//!   along walls instead of stopping dead.
//! - `CourseCollision`: 3D platforms; landing, head bumps and wall slides.

use glam::Vec3;

use super::aabb::Aabb;
use super::course::PlatformCourse;
use super::maze::MazeGrid;
use super::platform::LivePlatform;
use crate::consts::CONTACT_EPSILON;

/// How far below a platform top the player's previous feet may be and still
/// count as landing on it (covers platforms rising into the player)
pub const LANDING_TOLERANCE: f32 = 0.1;

/// Outcome of resolving one proposed move
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMove {
    /// Any obstacle or bound interfered
    pub collided: bool,
    /// Allowed position
    pub position: Vec3,
    /// Velocity after contact response
    pub velocity: Vec3,
    /// Standing on something after the move
    pub grounded: bool,
    /// Platform carrying the player, if any
    pub support: Option<u32>,
    /// Head hit the underside of a platform
    pub hit_ceiling: bool,
    /// Outward normal of a wall being slid along
    pub wall_normal: Option<Vec3>,
}

impl ResolvedMove {
    pub fn free(position: Vec3, velocity: Vec3) -> Self {
        Self {
            collided: false,
            position,
            velocity,
            grounded: false,
            support: None,
            hit_ceiling: false,
            wall_normal: None,
        }
    }

    /// Move refused outright
    pub fn rejected(current: Vec3) -> Self {
        Self {
            collided: true,
            position: current,
            velocity: Vec3::ZERO,
            ..Self::free(current, Vec3::ZERO)
        }
    }
}

/// Static wall volumes of a maze
#[derive(Debug, Clone)]
pub struct MazeCollision {
    size: usize,
    cell_size: f32,
    walls: Vec<bool>,
    obstacles: Vec<Aabb>,
}

impl MazeCollision {
    /// Derive one box per Wall tile
    pub fn build(grid: &MazeGrid, cell_size: f32, wall_height: f32) -> Self {
        let size = grid.size();
        let mut walls = vec![false; size * size];
        let mut obstacles = Vec::new();
        let half = cell_size / 2.0;

        for (x, z) in grid.walls() {
            walls[z * size + x] = true;
            let center = Vec3::new(x as f32 * cell_size, wall_height / 2.0, z as f32 * cell_size);
            obstacles.push(Aabb::from_center(center, Vec3::new(half, wall_height / 2.0, half)));
        }

        Self {
            size,
            cell_size,
            walls,
            obstacles,
        }
    }

    pub fn obstacles(&self) -> &[Aabb] {
        &self.obstacles
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World-space centre of a tile on the floor
    pub fn tile_center(&self, x: usize, z: usize) -> Vec3 {
        Vec3::new(x as f32 * self.cell_size, 0.0, z as f32 * self.cell_size)
    }

    /// Tile containing a world position, if inside the grid
    pub fn tile_at(&self, pos: Vec3) -> Option<(usize, usize)> {
        let x = self.tile_coord(pos.x)?;
        let z = self.tile_coord(pos.z)?;
        (x < self.size as isize && z < self.size as isize).then_some((x as usize, z as usize))
    }

    fn tile_coord(&self, v: f32) -> Option<isize> {
        let t = ((v + self.cell_size / 2.0) / self.cell_size).floor();
        (t.is_finite() && t >= 0.0).then_some(t as isize)
    }

    /// Allowed range for the player's centre on X and Z
    pub fn bounds(&self) -> (f32, f32) {
        (-self.cell_size / 2.0, self.size as f32 * self.cell_size)
    }

    /// Inside the outer bound (false for NaN)
    pub fn in_bounds(&self, pos: Vec3) -> bool {
        let (lo, hi) = self.bounds();
        (lo..=hi).contains(&pos.x) && (lo..=hi).contains(&pos.z)
    }

    /// Does a player box centred at `center` overlap any wall?
    pub fn blocked(&self, center: Vec3, half_extents: Vec3) -> bool {
        let player = Aabb::from_center(center, half_extents);
        let half = self.cell_size / 2.0;
        let last = self.size as isize - 1;

        let span = |lo: f32, hi: f32| {
            let a = ((lo + half) / self.cell_size).floor() as isize;
            let b = ((hi + half) / self.cell_size).floor() as isize;
            (a.max(0), b.min(last))
        };
        let (x0, x1) = span(player.min.x, player.max.x);
        let (z0, z1) = span(player.min.z, player.max.z);

        for z in z0..=z1 {
            for x in x0..=x1 {
                if !self.walls[z as usize * self.size + x as usize] {
                    continue;
                }
                let tile = Aabb::from_center(
                    self.tile_center(x as usize, z as usize),
                    Vec3::new(half, 0.0, half),
                );
                if player.overlaps_xz(&tile) {
                    return true;
                }
            }
        }
        false
    }

    /// Resolve a planar move with per-axis wall sliding
    pub fn resolve(&self, current: Vec3, proposed: Vec3, half_extents: Vec3) -> ResolvedMove {
        if !self.in_bounds(proposed) {
            return ResolvedMove {
                grounded: true,
                ..ResolvedMove::rejected(current)
            };
        }
        if !self.blocked(proposed, half_extents) {
            return ResolvedMove {
                grounded: true,
                ..ResolvedMove::free(proposed, Vec3::ZERO)
            };
        }

        let delta = proposed - current;
        let x_only = Vec3::new(proposed.x, proposed.y, current.z);
        let z_only = Vec3::new(current.x, proposed.y, proposed.z);
        let x_free = !self.blocked(x_only, half_extents);
        let z_free = !self.blocked(z_only, half_extents);

        let x_normal = Vec3::new(-delta.x.signum(), 0.0, 0.0);
        let z_normal = Vec3::new(0.0, 0.0, -delta.z.signum());

        let (position, wall_normal) = match (x_free, z_free) {
            // Diagonal into a corner: keep the dominant axis only
            (true, true) if delta.x.abs() >= delta.z.abs() => (x_only, z_normal),
            (true, true) => (z_only, x_normal),
            (true, false) => (x_only, z_normal),
            (false, true) => (z_only, x_normal),
            (false, false) => (Vec3::new(current.x, proposed.y, current.z), -delta.normalize_or_zero()),
        };

        ResolvedMove {
            collided: true,
            position,
            velocity: Vec3::ZERO,
            grounded: true,
            support: None,
            hit_ceiling: false,
            wall_normal: Some(wall_normal),
        }
    }
}

/// Live platforms of a parkour course
#[derive(Debug, Clone)]
pub struct CourseCollision {
    platforms: Vec<LivePlatform>,
}

impl CourseCollision {
    /// Collide against an explicit platform list, kept in the given order
    pub fn new(platforms: Vec<LivePlatform>) -> Self {
        Self { platforms }
    }

    /// One live platform per descriptor, goal last
    pub fn build(course: &PlatformCourse) -> Self {
        let goal_id = course.goal().id;
        Self::new(
            course
                .all()
                .map(|desc| LivePlatform::new(desc, desc.id == goal_id))
                .collect(),
        )
    }

    /// Pose every dynamic platform for session time `time`
    pub fn advance(&mut self, time: f32) {
        for platform in &mut self.platforms {
            platform.advance(time);
        }
    }

    pub fn platforms(&self) -> &[LivePlatform] {
        &self.platforms
    }

    pub fn platform(&self, id: u32) -> Option<&LivePlatform> {
        self.platforms.iter().find(|p| p.id == id)
    }

    /// Boxes of the platforms that are currently solid
    pub fn obstacles(&self) -> impl Iterator<Item = Aabb> + '_ {
        self.platforms.iter().filter(|p| p.solid).map(LivePlatform::bounds)
    }

    /// Apply the last motion of platform `id` to a rider at `point`
    pub fn carry(&self, id: u32, point: Vec3) -> Vec3 {
        match self.platform(id) {
            Some(platform) if platform.solid => platform.carry(point),
            _ => point,
        }
    }

    /// Resolve a 3D move against all solid platforms
    pub fn resolve(
        &self,
        current: Vec3,
        proposed: Vec3,
        half_extents: Vec3,
        velocity: Vec3,
    ) -> ResolvedMove {
        if !proposed.is_finite() || !velocity.is_finite() {
            return ResolvedMove::rejected(current);
        }

        let previous = Aabb::from_center(current, half_extents);
        let mut result = ResolvedMove::free(proposed, velocity);
        let mut pos = proposed;
        let mut vel = velocity;

        for platform in self.platforms.iter().filter(|p| p.solid) {
            let bounds = platform.bounds();
            let player = Aabb::from_center(pos, half_extents);
            if !player.overlaps(&bounds) {
                continue;
            }
            result.collided = true;

            if vel.y <= 0.0 && previous.min.y >= bounds.max.y - LANDING_TOLERANCE {
                // Landing on top
                pos.y = bounds.max.y + half_extents.y;
                vel.y = 0.0;
                result.grounded = true;
                result.support = Some(platform.id);
            } else if vel.y > 0.0 && previous.max.y <= bounds.min.y + LANDING_TOLERANCE {
                // Head bump
                pos.y = bounds.min.y - half_extents.y - CONTACT_EPSILON;
                vel.y = 0.0;
                result.hit_ceiling = true;
            } else {
                let normal = side_normal(&player, &bounds);

                // Drop the part of the move that goes into the wall
                let into = (pos - current).dot(normal);
                if into < 0.0 {
                    pos -= normal * into;
                }
                // Then make sure the box ends up outside the face
                if normal.x > 0.0 {
                    pos.x = pos.x.max(bounds.max.x + half_extents.x + CONTACT_EPSILON);
                } else if normal.x < 0.0 {
                    pos.x = pos.x.min(bounds.min.x - half_extents.x - CONTACT_EPSILON);
                } else if normal.z > 0.0 {
                    pos.z = pos.z.max(bounds.max.z + half_extents.z + CONTACT_EPSILON);
                } else {
                    pos.z = pos.z.min(bounds.min.z - half_extents.z - CONTACT_EPSILON);
                }

                let v_into = vel.dot(normal);
                if v_into < 0.0 {
                    vel -= normal * v_into;
                }
                result.wall_normal = Some(normal);
            }
        }

        result.position = pos;
        result.velocity = vel;
        result
    }
}

/// Horizontal face normal of least penetration, pointing at the player
fn side_normal(player: &Aabb, obstacle: &Aabb) -> Vec3 {
    let pen = player.penetration(obstacle);
    let offset = player.center() - obstacle.center();
    let sign = |v: f32| if v >= 0.0 { 1.0 } else { -1.0 };
    if pen.x <= pen.z {
        Vec3::new(sign(offset.x), 0.0, 0.0)
    } else {
        Vec3::new(0.0, 0.0, sign(offset.z))
    }
}
