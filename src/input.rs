//! Input intent buffer
//!
//! Key, pointer and touch handlers write here at any time. The tick takes one
//! snapshot at its start with [`InputBuffer::take_intent`], so a tick never
//! sees a half-applied event.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Discrete movement intents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveFlag {
    Forward,
    Back,
    Left,
    Right,
    Jump,
    Sprint,
    /// Switch flight on or off (course only)
    ToggleFly,
    BoostOn,
    BoostOff,
    /// On-screen turn buttons
    TurnLeft,
    TurnRight,
}

/// Input for a single tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputIntent {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    /// Jump was pressed since the previous tick
    pub jump: bool,
    /// Jump key currently down; ascends while flying
    pub jump_held: bool,
    /// Sprint key currently down; descends while flying
    pub sprint: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    /// Flight toggle was pressed since the previous tick
    pub toggle_fly: bool,
    /// Latest boost switch since the previous tick, if any
    pub boost: Option<bool>,
    /// Accumulated mouse movement in pixels
    pub look_delta: Vec2,
    /// Accumulated touch-drag movement in pixels
    pub touch_delta: Vec2,
}

impl InputIntent {
    /// Movement axes in the player's frame: x = right, y = forward
    pub fn move_axes(&self) -> Vec2 {
        let mut axes = Vec2::ZERO;
        if self.forward {
            axes.y += 1.0;
        }
        if self.back {
            axes.y -= 1.0;
        }
        if self.right {
            axes.x += 1.0;
        }
        if self.left {
            axes.x -= 1.0;
        }
        axes
    }

    /// Any directional key held
    pub fn wants_move(&self) -> bool {
        self.move_axes() != Vec2::ZERO
    }

    /// Turn button direction: +1 left, -1 right, 0 for none or both
    pub fn turn_axis(&self) -> f32 {
        match (self.turn_left, self.turn_right) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }
}

/// Mutable intent state shared between event handlers and the tick
#[derive(Debug, Clone, Default)]
pub struct InputBuffer {
    held: InputIntent,
    jump_pending: bool,
    fly_held: bool,
    fly_pending: bool,
    boost_request: Option<bool>,
    look_delta: Vec2,
    touch_delta: Vec2,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key going down or up
    pub fn set_intent(&mut self, flag: MoveFlag, active: bool) {
        match flag {
            MoveFlag::Forward => self.held.forward = active,
            MoveFlag::Back => self.held.back = active,
            MoveFlag::Left => self.held.left = active,
            MoveFlag::Right => self.held.right = active,
            MoveFlag::Sprint => self.held.sprint = active,
            MoveFlag::TurnLeft => self.held.turn_left = active,
            MoveFlag::TurnRight => self.held.turn_right = active,
            MoveFlag::Jump => {
                // Edge-triggered: key repeat while held does not re-jump
                if active && !self.held.jump_held {
                    self.jump_pending = true;
                }
                self.held.jump_held = active;
            }
            MoveFlag::ToggleFly => {
                if active && !self.fly_held {
                    self.fly_pending = !self.fly_pending;
                }
                self.fly_held = active;
            }
            MoveFlag::BoostOn if active => self.boost_request = Some(true),
            MoveFlag::BoostOff if active => self.boost_request = Some(false),
            MoveFlag::BoostOn | MoveFlag::BoostOff => {}
        }
    }

    /// Press and release in one call (tap/click)
    pub fn press(&mut self, flag: MoveFlag) {
        self.set_intent(flag, true);
        self.set_intent(flag, false);
    }

    /// Accumulate mouse movement until the next tick
    pub fn add_look_delta(&mut self, dx: f32, dy: f32) {
        if dx.is_finite() && dy.is_finite() {
            self.look_delta += Vec2::new(dx, dy);
        }
    }

    /// Accumulate touch-drag movement until the next tick
    pub fn add_touch_delta(&mut self, dx: f32, dy: f32) {
        if dx.is_finite() && dy.is_finite() {
            self.touch_delta += Vec2::new(dx, dy);
        }
    }

    /// Release everything (focus loss, reset)
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Snapshot for one tick; one-shot inputs are consumed
    pub fn take_intent(&mut self) -> InputIntent {
        let intent = InputIntent {
            jump: self.jump_pending,
            toggle_fly: self.fly_pending,
            boost: self.boost_request,
            look_delta: self.look_delta,
            touch_delta: self.touch_delta,
            ..self.held.clone()
        };
        self.jump_pending = false;
        self.fly_pending = false;
        self.boost_request = None;
        self.look_delta = Vec2::ZERO;
        self.touch_delta = Vec2::ZERO;
        intent
    }

    /// Feed a DOM `KeyboardEvent.code`; returns whether the key is bound
    pub fn handle_key(&mut self, code: &str, down: bool) -> bool {
        match KeyBinding::default().lookup(code) {
            Some(flag) => {
                self.set_intent(flag, down);
                true
            }
            None => false,
        }
    }
}

/// Key code to intent mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBinding {
    pub bindings: Vec<(String, MoveFlag)>,
}

impl Default for KeyBinding {
    fn default() -> Self {
        let pairs = [
            ("KeyW", MoveFlag::Forward),
            ("ArrowUp", MoveFlag::Forward),
            ("KeyS", MoveFlag::Back),
            ("ArrowDown", MoveFlag::Back),
            ("KeyA", MoveFlag::Left),
            ("ArrowLeft", MoveFlag::Left),
            ("KeyD", MoveFlag::Right),
            ("ArrowRight", MoveFlag::Right),
            ("Space", MoveFlag::Jump),
            ("ShiftLeft", MoveFlag::Sprint),
            ("ShiftRight", MoveFlag::Sprint),
            ("KeyR", MoveFlag::ToggleFly),
            ("KeyE", MoveFlag::BoostOn),
            ("KeyF", MoveFlag::BoostOff),
        ];
        Self {
            bindings: pairs
                .iter()
                .map(|(code, flag)| (code.to_string(), *flag))
                .collect(),
        }
    }
}

impl KeyBinding {
    pub fn lookup(&self, code: &str) -> Option<MoveFlag> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == code)
            .map(|(_, flag)| *flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_is_edge_triggered() {
        let mut input = InputBuffer::new();
        input.set_intent(MoveFlag::Jump, true);
        assert!(input.take_intent().jump);

        // Still held, key repeat
        input.set_intent(MoveFlag::Jump, true);
        assert!(!input.take_intent().jump);

        input.set_intent(MoveFlag::Jump, false);
        input.set_intent(MoveFlag::Jump, true);
        assert!(input.take_intent().jump);
    }

    #[test]
    fn test_held_flags_persist_and_look_is_consumed() {
        let mut input = InputBuffer::new();
        input.set_intent(MoveFlag::Forward, true);
        input.add_look_delta(3.0, -1.0);
        input.add_look_delta(2.0, 0.5);

        let first = input.take_intent();
        assert!(first.forward);
        assert_eq!(first.look_delta, Vec2::new(5.0, -0.5));

        let second = input.take_intent();
        assert!(second.forward);
        assert_eq!(second.look_delta, Vec2::ZERO);
    }

    #[test]
    fn test_non_finite_look_ignored() {
        let mut input = InputBuffer::new();
        input.add_look_delta(f32::NAN, 1.0);
        assert_eq!(input.take_intent().look_delta, Vec2::ZERO);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let intent = InputIntent {
            forward: true,
            back: true,
            ..Default::default()
        };
        assert!(!intent.wants_move());
    }

    #[test]
    fn test_key_codes() {
        let mut input = InputBuffer::new();
        assert!(input.handle_key("KeyW", true));
        assert!(input.handle_key("ShiftLeft", true));
        assert!(!input.handle_key("KeyQ", true));
        let intent = input.take_intent();
        assert!(intent.forward && intent.sprint);

        assert!(input.handle_key("KeyR", true));
        assert!(input.handle_key("KeyE", true));
        let intent = input.take_intent();
        assert!(intent.toggle_fly);
        assert_eq!(intent.boost, Some(true));
    }

    #[test]
    fn test_fly_toggle_and_boost_are_one_shot() {
        let mut input = InputBuffer::new();
        input.set_intent(MoveFlag::ToggleFly, true);
        input.set_intent(MoveFlag::ToggleFly, true);
        assert!(input.take_intent().toggle_fly);
        assert!(!input.take_intent().toggle_fly);

        // Two presses inside one tick cancel out
        input.set_intent(MoveFlag::ToggleFly, false);
        input.press(MoveFlag::ToggleFly);
        input.press(MoveFlag::ToggleFly);
        assert!(!input.take_intent().toggle_fly);

        input.press(MoveFlag::BoostOn);
        input.press(MoveFlag::BoostOff);
        assert_eq!(input.take_intent().boost, Some(false));
        assert_eq!(input.take_intent().boost, None);
    }

    #[test]
    fn test_jump_held_tracks_key_state() {
        let mut input = InputBuffer::new();
        input.set_intent(MoveFlag::Jump, true);
        let first = input.take_intent();
        assert!(first.jump && first.jump_held);
        let second = input.take_intent();
        assert!(!second.jump && second.jump_held);
        input.set_intent(MoveFlag::Jump, false);
        assert!(!input.take_intent().jump_held);
    }

    #[test]
    fn test_touch_and_turn_inputs() {
        let mut input = InputBuffer::new();
        input.add_touch_delta(4.0, -2.0);
        input.add_touch_delta(f32::INFINITY, 0.0);
        input.add_look_delta(1.0, 1.0);
        input.set_intent(MoveFlag::TurnLeft, true);

        let intent = input.take_intent();
        assert_eq!(intent.touch_delta, Vec2::new(4.0, -2.0));
        assert_eq!(intent.look_delta, Vec2::new(1.0, 1.0));
        assert_eq!(intent.turn_axis(), 1.0);

        input.set_intent(MoveFlag::TurnRight, true);
        let intent = input.take_intent();
        assert_eq!(intent.touch_delta, Vec2::ZERO);
        assert_eq!(intent.turn_axis(), 0.0);
    }
}
