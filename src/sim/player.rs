//! Player kinematic state and first-person controls
//!
//! Movement is always planar: the basis comes from yaw alone, so looking up
//! or down never changes ground speed.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::input::InputIntent;
use crate::tuning::{CourseTuning, LookTuning};
use crate::{forward_from_yaw, normalize_angle, right_from_yaw};

/// Lifecycle of the player within one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerPhase {
    /// Just placed at the spawn, no input yet
    Spawned,
    /// On the ground
    Moving,
    /// In the air
    Airborne,
    /// Reached the goal; frozen until reset
    Completed,
}

/// Which jump an input produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpKind {
    Ground,
    Double,
    Wall,
}

/// Player state, mutated once per tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    /// Centre of the player's box
    pub position: Vec3,
    pub velocity: Vec3,
    pub grounded: bool,
    /// Heading (radians, wrapped to [-π, π))
    pub yaw: f32,
    /// Vertical look (radians, clamped inside ±π/2)
    pub pitch: f32,
    /// Airborne jump still available
    pub can_double_jump: bool,
    pub phase: PlayerPhase,
    /// Wall being slid along during the last tick
    pub wall_normal: Option<Vec3>,
    /// Platform standing on
    pub support: Option<u32>,
    /// Free flight: no gravity, no collision
    pub flying: bool,
    /// Walk speed boost switched on
    pub boosted: bool,
    spawn: Vec3,
    spawn_yaw: f32,
}

impl PlayerState {
    pub fn new(spawn: Vec3, yaw: f32) -> Self {
        Self {
            position: spawn,
            velocity: Vec3::ZERO,
            grounded: true,
            yaw: normalize_angle(yaw),
            pitch: 0.0,
            can_double_jump: false,
            phase: PlayerPhase::Spawned,
            wall_normal: None,
            support: None,
            flying: false,
            boosted: false,
            spawn,
            spawn_yaw: yaw,
        }
    }

    /// Back to the spawn point of the current level; the boost switch stays
    pub fn respawn(&mut self) {
        let boosted = self.boosted;
        *self = Self::new(self.spawn, self.spawn_yaw);
        self.boosted = boosted;
    }

    pub fn spawn_point(&self) -> Vec3 {
        self.spawn
    }

    /// Apply a pointer delta (pixels); moving right turns right, moving
    /// down looks down
    pub fn look(&mut self, dx: f32, dy: f32, tuning: &LookTuning) {
        self.rotate_view(dx, dy, tuning.sensitivity, tuning.pitch_limit);
    }

    /// Same as `look` for a touch drag, at touch sensitivity
    pub fn touch_look(&mut self, dx: f32, dy: f32, tuning: &LookTuning) {
        self.rotate_view(dx, dy, tuning.touch_sensitivity, tuning.pitch_limit);
    }

    /// Held turn buttons: `axis` +1 turns left, -1 turns right, by `turn_rate`
    pub fn turn(&mut self, axis: f32, tuning: &LookTuning) {
        if axis.is_finite() && axis != 0.0 {
            self.yaw = normalize_angle(self.yaw + axis * tuning.turn_rate);
        }
    }

    fn rotate_view(&mut self, dx: f32, dy: f32, sensitivity: f32, pitch_limit: f32) {
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }
        self.yaw = normalize_angle(self.yaw - dx * sensitivity);
        self.pitch = (self.pitch - dy * sensitivity).clamp(-pitch_limit, pitch_limit);
    }

    /// Switch free flight on or off; vertical speed starts from rest either way
    pub fn toggle_flight(&mut self) {
        self.flying = !self.flying;
        self.velocity.y = 0.0;
        self.grounded = false;
        self.support = None;
        self.wall_normal = None;
        if self.phase != PlayerPhase::Completed {
            self.phase = PlayerPhase::Airborne;
        }
    }

    pub fn forward(&self) -> Vec3 {
        forward_from_yaw(self.yaw)
    }

    pub fn right(&self) -> Vec3 {
        right_from_yaw(self.yaw)
    }

    /// Full view direction including pitch
    pub fn view_direction(&self) -> Vec3 {
        let (sin_p, cos_p) = self.pitch.sin_cos();
        self.forward() * cos_p + Vec3::Y * sin_p
    }

    pub fn is_completed(&self) -> bool {
        self.phase == PlayerPhase::Completed
    }

    /// Try to jump with the current contact state
    pub fn try_jump(&mut self, tuning: &CourseTuning) -> Option<JumpKind> {
        if self.grounded {
            self.velocity.y = tuning.jump_velocity;
            self.grounded = false;
            self.support = None;
            self.can_double_jump = true;
            return Some(JumpKind::Ground);
        }
        if let Some(normal) = self.wall_normal.take() {
            self.velocity = normal * tuning.wall_jump_push + Vec3::Y * tuning.jump_velocity;
            return Some(JumpKind::Wall);
        }
        if self.can_double_jump {
            self.velocity.y = tuning.double_jump_velocity;
            self.can_double_jump = false;
            return Some(JumpKind::Double);
        }
        None
    }
}

/// Planar displacement for this tick's directional intents.
///
/// Intents are summed in the yaw basis and normalised, so diagonals are no
/// faster than straight lines. Sprint replaces walk speed with
/// `speed * sprint_multiplier`.
pub fn planar_displacement(
    yaw: f32,
    intent: &InputIntent,
    speed: f32,
    sprint_multiplier: f32,
) -> Vec3 {
    let axes = intent.move_axes();
    let wish = forward_from_yaw(yaw) * axes.y + right_from_yaw(yaw) * axes.x;
    let dir = wish.normalize_or_zero();
    let speed = if intent.sprint {
        speed * sprint_multiplier
    } else {
        speed
    };
    dir * speed
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn intent(forward: bool, back: bool, left: bool, right: bool) -> InputIntent {
        InputIntent {
            forward,
            back,
            left,
            right,
            ..Default::default()
        }
    }

    #[test]
    fn test_diagonal_not_faster() {
        let d = planar_displacement(0.0, &intent(true, false, false, true), 0.1, 2.0);
        assert!((d.length() - 0.1).abs() < 1e-6);
        assert!(d.x > 0.0 && d.z < 0.0);
    }

    #[test]
    fn test_sprint_multiplies_not_adds() {
        let sprinting = InputIntent {
            sprint: true,
            ..intent(true, false, false, false)
        };
        let d = planar_displacement(1.0, &sprinting, 0.1, 2.0);
        assert!((d.length() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_no_intent_no_motion() {
        let d = planar_displacement(0.3, &intent(true, true, true, true), 0.1, 2.0);
        assert_eq!(d, Vec3::ZERO);
        assert!(!d.is_nan());
    }

    #[test]
    fn test_pitch_clamped_yaw_wraps() {
        let tuning = LookTuning::default();
        let mut p = PlayerState::new(Vec3::ZERO, 0.0);
        p.look(0.0, -1.0e6, &tuning);
        assert_eq!(p.pitch, tuning.pitch_limit);
        p.look(0.0, 1.0e6, &tuning);
        assert_eq!(p.pitch, -tuning.pitch_limit);

        for _ in 0..10_000 {
            p.look(500.0, 0.0, &tuning);
        }
        assert!(p.yaw >= -std::f32::consts::PI && p.yaw < std::f32::consts::PI);
    }

    #[test]
    fn test_huge_look_delta_wraps_yaw() {
        let tuning = LookTuning::default();
        let mut p = PlayerState::new(Vec3::ZERO, 0.0);
        p.look(1.0e12, 0.0, &tuning);
        assert!(p.yaw >= -std::f32::consts::PI && p.yaw < std::f32::consts::PI);
        p.look(-1.0e12, 0.0, &tuning);
        assert!(p.yaw >= -std::f32::consts::PI && p.yaw < std::f32::consts::PI);
    }

    #[test]
    fn test_touch_look_uses_touch_sensitivity() {
        let tuning = LookTuning::default();
        let mut mouse = PlayerState::new(Vec3::ZERO, 0.0);
        let mut touch = PlayerState::new(Vec3::ZERO, 0.0);
        mouse.look(10.0, 0.0, &tuning);
        touch.touch_look(10.0, 0.0, &tuning);
        assert!((mouse.yaw + 10.0 * tuning.sensitivity).abs() < 1e-6);
        assert!((touch.yaw + 10.0 * tuning.touch_sensitivity).abs() < 1e-6);

        touch.touch_look(0.0, 1.0e6, &tuning);
        assert_eq!(touch.pitch, -tuning.pitch_limit);
    }

    #[test]
    fn test_turn_buttons_step_yaw() {
        let tuning = LookTuning::default();
        let mut p = PlayerState::new(Vec3::ZERO, 0.0);
        p.turn(1.0, &tuning);
        assert!((p.yaw - tuning.turn_rate).abs() < 1e-6);
        p.turn(-1.0, &tuning);
        p.turn(-1.0, &tuning);
        assert!((p.yaw + tuning.turn_rate).abs() < 1e-6);
        p.turn(0.0, &tuning);
        assert!((p.yaw + tuning.turn_rate).abs() < 1e-6);
    }

    #[test]
    fn test_toggle_flight_stops_vertical_motion() {
        let mut p = PlayerState::new(Vec3::ZERO, 0.0);
        p.velocity = Vec3::new(1.0, -7.0, 0.0);
        p.support = Some(3);
        p.toggle_flight();
        assert!(p.flying && !p.grounded);
        assert_eq!(p.velocity, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(p.support, None);
        assert_eq!(p.phase, PlayerPhase::Airborne);
        p.toggle_flight();
        assert!(!p.flying);
    }

    #[test]
    fn test_pitch_does_not_change_ground_speed() {
        let tuning = LookTuning::default();
        let mut p = PlayerState::new(Vec3::ZERO, 0.4);
        let flat = planar_displacement(p.yaw, &intent(true, false, false, false), 0.1, 2.0);
        p.look(0.0, -600.0, &tuning);
        let tilted = planar_displacement(p.yaw, &intent(true, false, false, false), 0.1, 2.0);
        assert_eq!(flat, tilted);
        assert!(p.view_direction().y > 0.5);
    }

    #[test]
    fn test_jump_sequence() {
        let tuning = CourseTuning::default();
        let mut p = PlayerState::new(Vec3::ZERO, 0.0);

        assert_eq!(p.try_jump(&tuning), Some(JumpKind::Ground));
        assert!(p.can_double_jump);
        assert_eq!(p.velocity.y, tuning.jump_velocity);

        p.velocity.y = 1.0;
        assert_eq!(p.try_jump(&tuning), Some(JumpKind::Double));
        assert!(!p.can_double_jump);
        assert_eq!(p.velocity.y, tuning.double_jump_velocity);

        p.velocity.y = -2.0;
        assert_eq!(p.try_jump(&tuning), None);
        assert_eq!(p.velocity.y, -2.0);
    }

    #[test]
    fn test_wall_jump_pushes_off() {
        let tuning = CourseTuning::default();
        let mut p = PlayerState::new(Vec3::ZERO, 0.0);
        p.grounded = false;
        p.wall_normal = Some(Vec3::X);
        assert_eq!(p.try_jump(&tuning), Some(JumpKind::Wall));
        assert_eq!(p.velocity.x, tuning.wall_jump_push);
        assert_eq!(p.velocity.y, tuning.jump_velocity);
        assert!(p.wall_normal.is_none());
    }

    #[test]
    fn test_respawn_restores_spawn() {
        let mut p = PlayerState::new(Vec3::new(1.0, 2.0, 3.0), 0.5);
        p.position = Vec3::new(9.0, -50.0, 9.0);
        p.velocity = Vec3::splat(4.0);
        p.phase = PlayerPhase::Airborne;
        p.flying = true;
        p.boosted = true;
        p.respawn();
        assert!(!p.flying);
        assert!(p.boosted);
        assert_eq!(p.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(p.velocity, Vec3::ZERO);
        assert_eq!(p.phase, PlayerPhase::Spawned);
        assert_eq!(p.yaw, 0.5);
    }

    proptest! {
        #[test]
        fn prop_displacement_magnitude_is_speed(
            yaw in -10.0f32..10.0,
            forward in any::<bool>(),
            back in any::<bool>(),
            left in any::<bool>(),
            right in any::<bool>(),
            speed in 0.01f32..5.0,
        ) {
            let i = intent(forward, back, left, right);
            let d = planar_displacement(yaw, &i, speed, 2.0);
            if i.wants_move() {
                prop_assert!((d.length() - speed).abs() < speed * 1e-4);
            } else {
                prop_assert_eq!(d, Vec3::ZERO);
            }
            prop_assert_eq!(d.y, 0.0);
        }
    }
}
