//! Fixed timestep simulation tick
//!
//! Advances one `GameSession` deterministically. The host calls `tick`
//! directly or lets `FixedStep` slice frame time into `SIM_DT` steps.

use glam::Vec3;

use super::collision::{CourseCollision, MazeCollision};
use super::goal::GoalDetector;
use super::player::{PlayerPhase, PlayerState, planar_displacement};
use super::state::{GameEvent, GameSession, Level, maze_half_extents};
use crate::consts::*;
use crate::input::InputIntent;
use crate::normalize_angle;
use crate::tuning::{CourseTuning, MazeTuning};

/// Advance the session by one step of `dt` seconds
pub fn tick(session: &mut GameSession, dt: f32) {
    let intent = session.input.take_intent();

    // Completed levels stay frozen until reset or restart
    if session.player.phase == PlayerPhase::Completed {
        return;
    }

    session.time_ticks += 1;
    session.clock += dt;

    let look = intent.look_delta;
    let touch = intent.touch_delta;
    let look_tuning = &session.tuning.look;
    session.player.look(look.x, look.y, look_tuning);
    session.player.touch_look(touch.x, touch.y, look_tuning);
    session.player.turn(intent.turn_axis(), look_tuning);
    if let Some(on) = intent.boost {
        session.player.boosted = on;
    }

    let ticks = session.time_ticks;
    let clock = session.clock;
    let mut events = Vec::new();
    let GameSession {
        level,
        player,
        goal,
        tuning,
        ..
    } = &mut *session;

    match level {
        Level::Maze { world, .. } => {
            step_maze(world, player, goal, &tuning.maze, &intent, ticks, &mut events);
        }
        Level::Course {
            world,
            fall_threshold,
            ..
        } => {
            world.advance(clock);
            step_course(
                world,
                *fall_threshold,
                player,
                goal,
                &tuning.course,
                &intent,
                dt,
                ticks,
                &mut events,
            );
        }
    }

    for event in events {
        session.push_event(event);
    }
}

/// Walk the maze floor: fixed displacement per tick, walls slide
fn step_maze(
    world: &MazeCollision,
    player: &mut PlayerState,
    goal: &mut GoalDetector,
    tuning: &MazeTuning,
    intent: &InputIntent,
    ticks: u64,
    events: &mut Vec<GameEvent>,
) {
    let delta = planar_displacement(
        player.yaw,
        intent,
        tuning.walk_speed,
        tuning.sprint_multiplier,
    );
    let result = world.resolve(
        player.position,
        player.position + delta,
        maze_half_extents(tuning),
    );
    player.position = result.position;
    player.grounded = result.grounded;
    player.wall_normal = result.wall_normal;

    if player.phase == PlayerPhase::Spawned && intent.wants_move() {
        player.phase = PlayerPhase::Moving;
    }

    if player.grounded && goal.check(player.position) {
        complete(player, ticks, events);
    }
}

/// Walk speed on the course with the boost switch applied
fn course_walk_speed(player: &PlayerState, tuning: &CourseTuning) -> f32 {
    if player.boosted {
        tuning.walk_speed * tuning.boost_multiplier
    } else {
        tuning.walk_speed
    }
}

/// Free flight: jump held climbs, sprint held sinks, nothing collides
fn step_flight(player: &mut PlayerState, tuning: &CourseTuning, intent: &InputIntent, dt: f32) {
    player.velocity.y = match (intent.jump_held, intent.sprint) {
        (true, false) => tuning.fly_speed,
        (false, true) => -tuning.fly_speed,
        _ => 0.0,
    };
    let decay = (-tuning.air_drag * dt).exp();
    player.velocity.x *= decay;
    player.velocity.z *= decay;

    let walk = planar_displacement(
        player.yaw,
        intent,
        course_walk_speed(player, tuning),
        tuning.sprint_multiplier,
    );
    let next = player.position + (walk + player.velocity) * dt;
    if next.is_finite() {
        player.position = next;
    }
    player.phase = PlayerPhase::Airborne;
}

/// Platform physics: carry, jump, gravity, walk, resolve, fall-out
#[allow(clippy::too_many_arguments)]
fn step_course(
    world: &CourseCollision,
    fall_threshold: f32,
    player: &mut PlayerState,
    goal: &mut GoalDetector,
    tuning: &CourseTuning,
    intent: &InputIntent,
    dt: f32,
    ticks: u64,
    events: &mut Vec<GameEvent>,
) {
    let half = tuning.player_half_extents;

    if intent.toggle_fly {
        player.toggle_flight();
        log::debug!("Flight {}", if player.flying { "on" } else { "off" });
    }
    if player.flying {
        step_flight(player, tuning, intent, dt);
        return;
    }

    // Ride the supporting platform
    if player.grounded {
        match player.support.and_then(|id| world.platform(id)) {
            Some(platform) if platform.solid => {
                player.position = platform.carry(player.position);
                player.yaw = normalize_angle(player.yaw + platform.last_motion.rotation);
            }
            Some(_) => {
                // Vanished underfoot
                player.grounded = false;
                player.support = None;
            }
            None => {}
        }
    }

    if intent.jump {
        if let Some(kind) = player.try_jump(tuning) {
            log::debug!("{:?} jump at {:?}", kind, player.position);
            events.push(GameEvent::Jumped(kind));
        }
    }
    let was_grounded = player.grounded;

    // Gravity applies on the ground too so walking off an edge is noticed
    player.velocity.y = (player.velocity.y - tuning.gravity * dt).max(-tuning.terminal_velocity);

    // Horizontal velocity only carries wall-jump impulses; it bleeds off in
    // the air and is cancelled by the ground
    let decay = (-tuning.air_drag * dt).exp();
    player.velocity.x *= decay;
    player.velocity.z *= decay;

    let walk = planar_displacement(
        player.yaw,
        intent,
        course_walk_speed(player, tuning),
        tuning.sprint_multiplier,
    );
    let proposed = player.position + (walk + player.velocity) * dt;
    let result = world.resolve(player.position, proposed, half, player.velocity);

    player.position = result.position;
    player.velocity = result.velocity;
    player.grounded = result.grounded;
    player.support = result.support;
    player.wall_normal = if result.grounded {
        None
    } else {
        result.wall_normal
    };

    if player.grounded {
        player.velocity.x = 0.0;
        player.velocity.z = 0.0;
        if !was_grounded {
            player.can_double_jump = false;
            events.push(GameEvent::Landed {
                platform: player.support,
            });
        }
    }

    player.phase = match (player.phase, player.grounded) {
        (_, false) => PlayerPhase::Airborne,
        (PlayerPhase::Spawned, true) if !intent.wants_move() => PlayerPhase::Spawned,
        (_, true) => PlayerPhase::Moving,
    };

    if player.position.y < fall_threshold || !player.position.is_finite() {
        log::debug!("Fell out at {:?}, respawning", player.position);
        player.respawn();
        events.push(GameEvent::Respawned);
        return;
    }

    if player.grounded && goal.check(player.position) {
        complete(player, ticks, events);
    }
}

fn complete(player: &mut PlayerState, ticks: u64, events: &mut Vec<GameEvent>) {
    player.phase = PlayerPhase::Completed;
    player.velocity = Vec3::ZERO;
    log::info!("Level complete after {} ticks", ticks);
    events.push(GameEvent::LevelComplete { ticks });
}

/// Accumulates frame time and runs whole `SIM_DT` ticks
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the ticks covered by `frame_dt`; returns how many ran
    pub fn advance(&mut self, session: &mut GameSession, frame_dt: f32) -> u32 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }
        self.accumulator += frame_dt.min(0.1);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(session, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Drop the backlog instead of spiralling
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    /// Fraction of a tick left over, for render interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / SIM_DT
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
