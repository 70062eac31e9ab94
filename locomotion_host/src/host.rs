//! Headless host loop.
//!
//! Runs one character through a fixed physics timestep plus a variable
//! frame step, the way an engine would:
//! - physics ticks are accumulated from frame time and each one integrates
//!   the motor after `fixed_update`
//! - every frame scripts the game state and input, then runs
//!   `frame_update` and `move_character` with the predicted velocity as
//!   root motion
//!
//! Keep gameplay deterministic for a given seed: the wander targets come
//! from a seeded RNG and no wall-clock time feeds the simulation.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use locomotion_controller::{
    arbiter::ControlState, events::ControllerEvent, input::InputState, CharacterController,
    SpeedAdjustment,
};
use locomotion_shared::{
    animation::EventDefinition,
    config::ControllerConfig,
    game_state::{CharState, MovementMethod},
    math::Vec3,
    physics::{CharacterMotor, FlatGround},
    profile::InputProfile,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::sim::{GameScript, ScriptedGameState, SimMotor, StubMatcher};

/// What drives the character during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Stick input sweeping slowly around a circle.
    #[default]
    Direct,
    /// Walk to a fixed point-and-click target.
    PointAndClick,
    /// Point-and-click towards random targets, picking a new one on arrival.
    Wander,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Physics ticks per second.
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,
    /// Frames per second.
    #[serde(default = "default_frame_hz")]
    pub frame_hz: u32,
    /// Frames to run before exiting.
    #[serde(default = "default_frames")]
    pub frames: u32,
    #[serde(default)]
    pub scenario: Scenario,
    /// Destination for `Scenario::PointAndClick`.
    #[serde(default = "default_target")]
    pub target: Vec3,
    #[serde(default = "default_wander_radius")]
    pub wander_radius: f32,
    #[serde(default)]
    pub seed: u64,
    /// Press jump every N frames; 0 disables.
    #[serde(default)]
    pub jump_every: u32,
    /// Goal updates a jump event lasts in the stub matcher.
    #[serde(default = "default_jump_frames")]
    pub jump_frames: u32,
    /// Sleep between frames to run at wall-clock speed.
    #[serde(default)]
    pub realtime: bool,
}

fn default_tick_hz() -> u32 {
    50
}

fn default_frame_hz() -> u32 {
    60
}

fn default_frames() -> u32 {
    600
}

fn default_target() -> Vec3 {
    Vec3::new(0.0, 0.0, 10.0)
}

fn default_wander_radius() -> f32 {
    8.0
}

fn default_jump_frames() -> u32 {
    30
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            tick_hz: default_tick_hz(),
            frame_hz: default_frame_hz(),
            frames: default_frames(),
            scenario: Scenario::default(),
            target: default_target(),
            wander_radius: default_wander_radius(),
            seed: 0,
            jump_every: 0,
            jump_frames: default_jump_frames(),
            realtime: false,
        }
    }
}

/// On-disk layout for `--config`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostFile {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub host: HostConfig,
}

impl HostFile {
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

/// Summary printed when a run ends.
#[derive(Debug, Clone, Serialize)]
pub struct HostReport {
    pub frames: u64,
    pub physics_ticks: u64,
    pub position: Vec3,
    pub facing: f32,
    pub distance_travelled: f32,
    pub control_state: ControlState,
    pub state_changes: u32,
    pub jumps_started: u32,
    pub jumps_completed: u32,
    pub targets_reached: u32,
}

pub struct Host {
    cfg: HostConfig,
    controller: CharacterController,
    motor: SimMotor,
    game: ScriptedGameState,
    matcher: StubMatcher,
    rng: StdRng,

    accumulator: f32,
    frame: u64,
    physics_ticks: u64,
    travelled: f32,
    state_changes: u32,
    jumps_started: u32,
    jumps_completed: u32,
    targets_reached: u32,
}

impl Host {
    pub fn new(
        cfg: HostConfig,
        controller_cfg: ControllerConfig,
        profile: Option<Arc<InputProfile>>,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(cfg.tick_hz > 0, "tick_hz must be positive");
        anyhow::ensure!(cfg.frame_hz > 0, "frame_hz must be positive");

        let motor = SimMotor::new();
        let game = ScriptedGameState::new(GameScript::default());
        let matcher = StubMatcher::new(cfg.jump_frames);

        let controller = CharacterController::builder(controller_cfg)
            .motor(Box::new(motor.clone()))
            .predictor(profile)
            .animation_matcher(Box::new(matcher.clone()))
            .game_state(Box::new(game.clone()))
            .ground_caster(Box::new(FlatGround { height: 0.0 }))
            .jump_event(EventDefinition::new("jump"))
            .camera_forward(Vec3::FORWARD)
            .build()
            .context("build character controller")?;

        let mut host = Self {
            rng: StdRng::seed_from_u64(cfg.seed),
            cfg,
            controller,
            motor,
            game,
            matcher,
            accumulator: 0.0,
            frame: 0,
            physics_ticks: 0,
            travelled: 0.0,
            state_changes: 0,
            jumps_started: 0,
            jumps_completed: 0,
            targets_reached: 0,
        };
        host.prepare_scenario();
        Ok(host)
    }

    pub fn controller(&self) -> &CharacterController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut CharacterController {
        &mut self.controller
    }

    pub fn motor(&self) -> &SimMotor {
        &self.motor
    }

    pub fn game(&self) -> &ScriptedGameState {
        &self.game
    }

    pub fn matcher(&self) -> &StubMatcher {
        &self.matcher
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn frame_dt(&self) -> f32 {
        1.0 / self.cfg.frame_hz as f32
    }

    pub fn tick_dt(&self) -> f32 {
        1.0 / self.cfg.tick_hz as f32
    }

    pub fn adjust_speed(&mut self, speeds: SpeedAdjustment) {
        self.controller.adjust_movement_speed(speeds);
    }

    /// Runs `frames` frames without pacing.
    pub fn run_for_frames(&mut self, frames: u32) {
        let dt = self.frame_dt();
        for _ in 0..frames {
            self.step_frame(dt);
        }
    }

    /// Runs the configured number of frames, sleeping between frames when
    /// `realtime` is set.
    pub async fn run(&mut self) -> anyhow::Result<HostReport> {
        let dt = Duration::from_secs_f32(self.frame_dt());
        let mut next = Instant::now();

        for _ in 0..self.cfg.frames {
            self.step_frame(dt.as_secs_f32());
            if self.cfg.realtime {
                next += dt;
                tokio::time::sleep_until(next).await;
            }
        }
        Ok(self.report())
    }

    /// Executes one frame: pending physics ticks first, then the frame step.
    pub fn step_frame(&mut self, dt: f32) {
        let tick_dt = self.tick_dt();
        self.accumulator += dt;
        while self.accumulator >= tick_dt {
            self.controller.fixed_update(tick_dt);
            let before = self.motor.position();
            self.motor.integrate(tick_dt);
            self.travelled += self.motor.position().distance(before);
            self.accumulator -= tick_dt;
            self.physics_ticks += 1;
        }

        self.script_frame();
        self.matcher.set_origin(self.motor.position());

        let prediction = self.controller.frame_update(dt);
        self.controller.move_character(prediction.desired_velocity);
        self.motor
            .turn_towards(prediction.desired_orientation, (dt * 10.0).min(1.0));

        for event in self.controller.drain_events() {
            self.on_event(event);
        }
        self.frame += 1;
    }

    pub fn report(&self) -> HostReport {
        let body = self.motor.body();
        HostReport {
            frames: self.frame,
            physics_ticks: self.physics_ticks,
            position: body.position,
            facing: body.facing,
            distance_travelled: self.travelled,
            control_state: self.controller.control_state(),
            state_changes: self.state_changes,
            jumps_started: self.jumps_started,
            jumps_completed: self.jumps_completed,
            targets_reached: self.targets_reached,
        }
    }

    fn prepare_scenario(&mut self) {
        let target = match self.cfg.scenario {
            Scenario::Direct => None,
            Scenario::PointAndClick => Some(self.cfg.target),
            Scenario::Wander => Some(self.random_target()),
        };
        self.game.edit(|g| {
            g.movement_method = if target.is_some() {
                MovementMethod::PointAndClick
            } else {
                MovementMethod::Direct
            };
            g.target_position = target;
        });
        info!(scenario = ?self.cfg.scenario, ?target, "Scenario prepared");
    }

    fn script_frame(&mut self) {
        let jump = self.cfg.jump_every > 0 && self.frame % u64::from(self.cfg.jump_every) == 0;
        let stopping = self.controller.config().stopping_distance;
        let position = self.motor.position();

        match self.cfg.scenario {
            Scenario::Direct => {
                let t = self.frame as f32 * self.frame_dt() * 0.5;
                let mut input = InputState::from_axes(t.sin(), t.cos());
                input.jump_pressed = jump;
                self.controller.set_input(input);
                self.game.edit(|g| g.char_state = CharState::Moving);
            }
            Scenario::PointAndClick | Scenario::Wander => {
                let arrived = self
                    .game
                    .script()
                    .target_position
                    .map_or(true, |target| (target - position).horizontal().len_sq() < stopping);
                if arrived && self.game.script().char_state == CharState::Moving {
                    self.targets_reached += 1;
                    debug!(?position, "Target reached");
                }
                if arrived && self.cfg.scenario == Scenario::Wander {
                    let next = self.random_target();
                    self.game.edit(|g| {
                        g.target_position = Some(next);
                        g.char_state = CharState::Moving;
                    });
                } else {
                    self.game.edit(|g| {
                        g.char_state = if arrived {
                            CharState::Idle
                        } else {
                            CharState::Moving
                        };
                    });
                }
                self.controller.set_input(InputState {
                    jump_pressed: jump,
                    ..Default::default()
                });
            }
        }
    }

    fn random_target(&mut self) -> Vec3 {
        let radius = self.cfg.wander_radius.max(f32::EPSILON);
        Vec3::new(
            self.rng.gen_range(-radius..=radius),
            0.0,
            self.rng.gen_range(-radius..=radius),
        )
    }

    fn on_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::ControlStateChanged { .. } => self.state_changes += 1,
            ControllerEvent::JumpStarted { .. } => self.jumps_started += 1,
            ControllerEvent::JumpCompleted => self.jumps_completed += 1,
            _ => {}
        }
        debug!(frame = self.frame, ?event, "Controller event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_file_fills_defaults() {
        let file = HostFile::from_json_str(r#"{ "host": { "scenario": "wander", "seed": 7 } }"#)
            .unwrap();
        assert_eq!(file.host.scenario, Scenario::Wander);
        assert_eq!(file.host.seed, 7);
        assert_eq!(file.host.tick_hz, 50);
        assert_eq!(file.controller.max_speed, 4.0);
    }

    #[test]
    fn point_and_click_reaches_target() {
        let cfg = HostConfig {
            scenario: Scenario::PointAndClick,
            target: Vec3::new(0.0, 0.0, 5.0),
            ..Default::default()
        };
        let mut host = Host::new(cfg, ControllerConfig::default(), None).unwrap();
        host.run_for_frames(600);

        let report = host.report();
        assert!(report.targets_reached >= 1);
        assert!(report.position.distance(Vec3::new(0.0, 0.0, 5.0)) < 1.5);
        assert_eq!(report.control_state, ControlState::TurningOnly);
    }

    #[test]
    fn zero_rates_are_rejected() {
        let cfg = HostConfig {
            tick_hz: 0,
            ..Default::default()
        };
        assert!(Host::new(cfg, ControllerConfig::default(), None).is_err());
    }
}
