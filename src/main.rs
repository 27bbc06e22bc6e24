//! Arena Runner entry point
//!
//! Runs a headless session with a simple autopilot and logs the outcome.
//!
//! Usage: `arena-runner [maze|course] [seed]`
//! Set `ARENA_TUNING=path/to/tuning.json` to override balance values.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::error::Error;

    use arena_runner::consts::SIM_DT;
    use arena_runner::normalize_angle;
    use arena_runner::sim::{FixedStep, GameEvent, GameSession, Level, Variant};
    use arena_runner::{MoveFlag, Tuning, yaw_towards};
    use glam::Vec3;

    /// Simulated host frame rate
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Give up after this many simulated seconds
    const TIME_LIMIT_SECS: f32 = 180.0;

    pub fn run() -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args().skip(1);
        let variant = match args.next() {
            Some(name) => Variant::from_str(&name).ok_or(format!("unknown variant '{name}'"))?,
            None => Variant::Maze,
        };
        let seed = args.next().map(|s| s.parse::<u64>()).transpose()?;

        let tuning = match std::env::var("ARENA_TUNING") {
            Ok(path) => Tuning::from_json(&std::fs::read_to_string(&path)?)?,
            Err(_) => Tuning::default(),
        };

        let mut session = GameSession::new(variant, seed, tuning)?;
        if let Level::Maze { grid, .. } = &session.level {
            println!("{}", grid.to_ascii());
        }

        let mut step = FixedStep::new();
        let mut pilot = Pilot::new(&session);
        let mut respawns = 0;
        let frames = (TIME_LIMIT_SECS / FRAME_DT) as u32;

        for _ in 0..frames {
            pilot.steer(&mut session);
            step.advance(&mut session, FRAME_DT);

            for event in session.drain_events() {
                match event {
                    GameEvent::LevelComplete { ticks } => {
                        log::info!(
                            "Completed {} (seed {}) in {:.2}s",
                            variant.as_str(),
                            session.seed,
                            ticks as f32 * SIM_DT
                        );
                        return Ok(());
                    }
                    GameEvent::Respawned => {
                        respawns += 1;
                        pilot = Pilot::new(&session);
                    }
                    GameEvent::Landed { platform } => pilot.landed(platform),
                    GameEvent::Jumped(_) => {}
                }
            }
        }

        let snap = session.snapshot();
        log::warn!(
            "Gave up after {}s: player at {:?} ({:?}), {} respawns",
            TIME_LIMIT_SECS,
            snap.position,
            snap.phase,
            respawns
        );
        Ok(())
    }

    /// Steers by feeding the same intents a keyboard and mouse would
    struct Pilot {
        waypoints: Vec<Vec3>,
        next: usize,
    }

    impl Pilot {
        fn new(session: &GameSession) -> Self {
            let waypoints = match &session.level {
                Level::Maze { grid, world } => grid
                    .shortest_path(grid.spawn(), grid.exit())
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(x, z)| world.tile_center(x, z))
                    .collect(),
                Level::Course { course, .. } => course.all().map(|p| p.origin).collect(),
            };
            Self { waypoints, next: 1 }
        }

        fn landed(&mut self, platform: Option<u32>) {
            if let Some(id) = platform {
                self.next = self.next.max(id as usize + 1);
            }
        }

        fn steer(&mut self, session: &mut GameSession) {
            let pos = session.player.position;
            let planar = |v: Vec3| Vec3::new(v.x, 0.0, v.z);

            if session.variant() == Variant::Maze {
                let reach = session.tuning.maze.walk_speed * 1.5;
                while self
                    .waypoints
                    .get(self.next)
                    .is_some_and(|w| planar(*w - pos).length() < reach)
                {
                    self.next += 1;
                }
            }

            let Some(&target) = self.waypoints.get(self.next) else {
                session.set_intent(MoveFlag::Forward, false);
                return;
            };
            let to_target = planar(target - pos);

            // Turn through the look input: yaw decreases with +dx
            let turn = normalize_angle(yaw_towards(to_target) - session.player.yaw);
            let sensitivity = session.tuning.look.sensitivity;
            session.add_look_delta(-turn / sensitivity, 0.0);
            session.set_intent(MoveFlag::Forward, true);

            if session.variant() == Variant::Course {
                let player = &session.player;
                let gap = to_target.length();
                let jump = if player.grounded {
                    gap < session.tuning.course.spacing * 1.2
                } else {
                    player.can_double_jump && player.velocity.y < 0.0
                };
                session.set_intent(MoveFlag::Jump, jump);
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Arena Runner (native) starting...");

    if let Err(e) = demo::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on wasm; the host page drives `sim::tick`
}
