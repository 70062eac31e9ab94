//! Shared fixtures for the locomotion integration tests.
//!
//! A [`Rig`] wires a controller to the host's simulated collaborators and
//! keeps handles to them so tests can script the game and inspect the
//! motor and matcher.

use locomotion_controller::{
    adapter::MotorCommand, predictor::Prediction, CharacterController, ControllerBuilder,
};
use locomotion_host::sim::{GameScript, ScriptedGameState, SimMotor, StubMatcher};
use locomotion_shared::prelude::{ControllerConfig, EventDefinition, FlatGround};

/// Frame step used by the scenario tests.
pub const FRAME_DT: f32 = 1.0 / 60.0;

/// Goal updates a jump lasts in the stub matcher.
pub const JUMP_FRAMES: u32 = 3;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

pub struct Rig {
    pub controller: CharacterController,
    pub motor: SimMotor,
    pub game: ScriptedGameState,
    pub matcher: StubMatcher,
}

impl Rig {
    /// Direct-control rig on flat ground with a jump event and no camera.
    pub fn new(cfg: ControllerConfig) -> anyhow::Result<Self> {
        Self::with(cfg, |builder| builder)
    }

    /// Like [`Rig::new`], letting the test adjust the builder first.
    pub fn with(
        cfg: ControllerConfig,
        customize: impl FnOnce(ControllerBuilder) -> ControllerBuilder,
    ) -> anyhow::Result<Self> {
        let motor = SimMotor::new();
        let game = ScriptedGameState::new(GameScript::default());
        let matcher = StubMatcher::new(JUMP_FRAMES);

        let builder = CharacterController::builder(cfg)
            .motor(Box::new(motor.clone()))
            .predictor(None)
            .animation_matcher(Box::new(matcher.clone()))
            .game_state(Box::new(game.clone()))
            .ground_caster(Box::new(FlatGround { height: 0.0 }))
            .jump_event(EventDefinition::new("jump"));
        let controller = customize(builder).build()?;

        Ok(Self {
            controller,
            motor,
            game,
            matcher,
        })
    }

    /// One frame: prediction, then the predicted velocity as root motion.
    pub fn frame(&mut self) -> (Prediction, Option<MotorCommand>) {
        self.matcher.set_origin(self.motor.body().position);
        let prediction = self.controller.frame_update(FRAME_DT);
        let command = self.controller.move_character(prediction.desired_velocity);
        (prediction, command)
    }

    /// One physics tick: history (if on this cadence) and motor integration.
    pub fn physics(&mut self, dt: f32) {
        self.controller.fixed_update(dt);
        self.motor.integrate(dt);
    }
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}
