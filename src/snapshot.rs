//! Read-only render hand-off
//!
//! A renderer never touches the session directly. It takes a
//! `RenderSnapshot` after each frame's ticks and uploads the obstacle
//! records as an instance buffer.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::sim::player::PlayerPhase;
use crate::sim::state::{GameSession, Level, Variant};

/// Obstacle kinds as stored in `ObstacleInstance::kind`
pub mod kinds {
    pub const WALL: u32 = 0;
    pub const STATIC: u32 = 1;
    pub const DYNAMIC: u32 = 2;
    pub const GOAL: u32 = 3;
}

/// Default colors per obstacle kind
pub mod colors {
    pub const WALL: [f32; 4] = [0.35, 0.35, 0.45, 1.0];
    pub const STATIC: [f32; 4] = [0.55, 0.6, 0.65, 1.0];
    pub const DYNAMIC: [f32; 4] = [0.95, 0.55, 0.2, 1.0];
    pub const GOAL: [f32; 4] = [0.3, 0.9, 0.4, 1.0];
}

/// One box to draw, laid out for GPU instancing
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ObstacleInstance {
    pub center: [f32; 3],
    /// Rotation about +Y (radians)
    pub yaw: f32,
    pub half_extents: [f32; 3],
    pub kind: u32,
    pub color: [f32; 4],
}

impl ObstacleInstance {
    pub fn new(center: Vec3, yaw: f32, half_extents: Vec3, kind: u32) -> Self {
        let color = match kind {
            kinds::WALL => colors::WALL,
            kinds::DYNAMIC => colors::DYNAMIC,
            kinds::GOAL => colors::GOAL,
            _ => colors::STATIC,
        };
        Self {
            center: center.to_array(),
            yaw,
            half_extents: half_extents.to_array(),
            kind,
            color,
        }
    }

    /// Raw bytes of a slice of instances
    pub fn as_bytes(instances: &[ObstacleInstance]) -> &[u8] {
        bytemuck::cast_slice(instances)
    }
}

/// Everything a frame needs to draw the current session state
#[derive(Debug, Clone)]
pub struct RenderSnapshot {
    pub tick: u64,
    pub variant: Variant,
    /// Player box centre
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub view_direction: Vec3,
    pub phase: PlayerPhase,
    pub grounded: bool,
    /// Visible obstacles; vanished platforms are left out
    pub obstacles: Vec<ObstacleInstance>,
    pub goal_center: Vec3,
}

impl RenderSnapshot {
    pub fn capture(session: &GameSession) -> Self {
        let obstacles = match &session.level {
            Level::Maze { world, .. } => world
                .obstacles()
                .iter()
                .map(|b| ObstacleInstance::new(b.center(), 0.0, b.half_extents(), kinds::WALL))
                .collect(),
            Level::Course { world, .. } => world
                .platforms()
                .iter()
                .filter(|p| p.solid)
                .map(|p| {
                    let kind = if p.is_goal {
                        kinds::GOAL
                    } else if p.behavior.is_dynamic() {
                        kinds::DYNAMIC
                    } else {
                        kinds::STATIC
                    };
                    ObstacleInstance::new(p.position, p.rotation, p.shape.half_extents(), kind)
                })
                .collect(),
        };

        let player = &session.player;
        Self {
            tick: session.time_ticks,
            variant: session.variant(),
            position: player.position,
            yaw: player.yaw,
            pitch: player.pitch,
            view_direction: player.view_direction(),
            phase: player.phase,
            grounded: player.grounded,
            obstacles,
            goal_center: session.goal.region().center,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::course::PlatformBehavior;
    use crate::tuning::Tuning;

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<ObstacleInstance>(), 48);
        let instances = [ObstacleInstance::new(Vec3::ONE, 0.5, Vec3::splat(2.0), kinds::GOAL); 3];
        assert_eq!(ObstacleInstance::as_bytes(&instances).len(), 144);
        assert_eq!(instances[0].color, colors::GOAL);
    }

    #[test]
    fn test_maze_snapshot_has_every_wall() {
        let session = GameSession::new(Variant::Maze, Some(11), Tuning::default()).unwrap();
        let snap = session.snapshot();
        let Level::Maze { grid, .. } = &session.level else {
            panic!("expected maze level");
        };
        assert_eq!(snap.obstacles.len(), grid.walls().count());
        assert!(snap.obstacles.iter().all(|o| o.kind == kinds::WALL));
        assert_eq!(snap.phase, PlayerPhase::Spawned);
    }

    #[test]
    fn test_course_snapshot_skips_vanished_platforms() {
        let mut session = GameSession::new(Variant::Course, Some(11), Tuning::default()).unwrap();
        let total = {
            let Level::Course { world, .. } = &session.level else {
                panic!("expected course level");
            };
            world.platforms().len()
        };
        assert_eq!(session.snapshot().obstacles.len(), total);
        assert_eq!(
            session
                .snapshot()
                .obstacles
                .iter()
                .filter(|o| o.kind == kinds::GOAL)
                .count(),
            1
        );

        // Find a moment where some disappearing platform is gone
        let Level::Course { world, .. } = &mut session.level else {
            panic!("expected course level");
        };
        let has_disappearing = world
            .platforms()
            .iter()
            .any(|p| matches!(p.behavior, PlatformBehavior::Disappearing { .. }));
        assert!(has_disappearing);
        let mut t = 0.0;
        while world.platforms().iter().all(|p| p.solid) {
            t += 0.05;
            world.advance(t);
            assert!(t < 60.0, "no platform ever vanished");
        }
        let hidden = world.platforms().iter().filter(|p| !p.solid).count();
        assert_eq!(session.snapshot().obstacles.len(), total - hidden);
    }
}
