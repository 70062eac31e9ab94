//! Character controller.
//!
//! Composes the predictor, arbiter, movement adapter, and jump sequencer
//! around the injected host collaborators. The host drives it with three
//! calls per frame:
//! - `fixed_update` on the physics cadence
//! - `frame_update` on the frame cadence (arbitration, jump, prediction)
//! - `move_character` when the animator hands over its root motion

use std::sync::Arc;

use locomotion_shared::{
    animation::{AnimationMatcher, EventDefinition, TrajectoryPoint},
    config::{ControllerConfig, HistoryCadence, MoveMode},
    game_state::GameStateProvider,
    math::Vec3,
    physics::{Capsule, CharacterMotor, GroundCaster, MotorInputs},
    profile::InputProfile,
};
use tracing::{debug, info, trace};

use crate::{
    adapter::{MotorCommand, MovementInputAdapter},
    arbiter::{ControlArbiter, ControlState},
    error::SetupError,
    events::{ControllerEvent, EventQueue},
    input::InputState,
    jump::{JumpOutcome, JumpSequencer, JumpState},
    predictor::{Prediction, PredictionContext, TrajectoryGenerator, TrajectoryPredictor, DEFAULT_PREDICTION_TIMES},
    trajectory::TrajectoryBuffer,
};

/// New speeds applied in one go across motor, adapter, and predictor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedAdjustment {
    pub max_stable_move_speed: f32,
    pub move_speed: f32,
    pub max_speed: f32,
}

/// Assembles a controller from its collaborators.
pub struct ControllerBuilder {
    config: ControllerConfig,
    motor: Option<Box<dyn CharacterMotor>>,
    generator: Option<Box<dyn TrajectoryGenerator>>,
    matcher: Option<Box<dyn AnimationMatcher>>,
    game_state: Option<Box<dyn GameStateProvider>>,
    ground_caster: Option<Box<dyn GroundCaster>>,
    jump_event: Option<EventDefinition>,
    camera_forward: Option<Vec3>,
    prediction_times: Vec<f32>,
}

impl ControllerBuilder {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            motor: None,
            generator: None,
            matcher: None,
            game_state: None,
            ground_caster: None,
            jump_event: None,
            camera_forward: None,
            prediction_times: DEFAULT_PREDICTION_TIMES.to_vec(),
        }
    }

    pub fn motor(mut self, motor: Box<dyn CharacterMotor>) -> Self {
        self.motor = Some(motor);
        self
    }

    pub fn trajectory_generator(mut self, generator: Box<dyn TrajectoryGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Uses the stock predictor built from this builder's config.
    pub fn predictor(self, profile: Option<Arc<InputProfile>>) -> Self {
        let mut predictor = TrajectoryPredictor::new(&self.config);
        predictor.set_input_profile(profile);
        self.trajectory_generator(Box::new(predictor))
    }

    pub fn animation_matcher(mut self, matcher: Box<dyn AnimationMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn game_state(mut self, game_state: Box<dyn GameStateProvider>) -> Self {
        self.game_state = Some(game_state);
        self
    }

    pub fn ground_caster(mut self, caster: Box<dyn GroundCaster>) -> Self {
        self.ground_caster = Some(caster);
        self
    }

    pub fn jump_event(mut self, definition: EventDefinition) -> Self {
        self.jump_event = Some(definition);
        self
    }

    pub fn camera_forward(mut self, forward: Vec3) -> Self {
        self.camera_forward = Some(forward);
        self
    }

    pub fn prediction_times(mut self, times: Vec<f32>) -> Self {
        self.prediction_times = times;
        self
    }

    /// Validates the wiring and starts the controller.
    pub fn build(self) -> Result<CharacterController, SetupError> {
        self.config.validate().map_err(SetupError::InvalidConfig)?;
        let mut motor = self.motor.ok_or(SetupError::MissingMotor)?;
        let mut generator = self.generator.ok_or(SetupError::MissingTrajectoryGenerator)?;
        let matcher = self.matcher.ok_or(SetupError::MissingAnimationMatcher)?;
        let game_state = self.game_state.ok_or(SetupError::MissingGameState)?;

        generator.setup(&self.prediction_times);
        generator.reset_motion(motor.facing());
        motor.set_max_stable_move_speed(self.config.max_stable_move_speed);

        info!(
            iterations = generator.trajectory().len(),
            cadence = ?self.config.history_cadence,
            jump = self.jump_event.is_some(),
            camera = self.camera_forward.is_some(),
            "Character controller started"
        );

        let input = InputState {
            move_mode: self.config.move_mode,
            ..Default::default()
        };
        Ok(CharacterController {
            adapter: MovementInputAdapter::new(self.config.move_speed),
            jump: JumpSequencer::new(self.jump_event, self.config.jump),
            move_mode: self.config.move_mode,
            config: self.config,
            motor,
            generator,
            matcher,
            game_state,
            ground_caster: self.ground_caster,
            camera_forward: self.camera_forward,
            arbiter: ControlArbiter::new(),
            input,
            events: EventQueue::default(),
            goal: Vec::with_capacity(self.prediction_times.len()),
            prediction: Prediction::default(),
            last_command: MotorCommand::default(),
            collision_enabled: true,
            hybrid_on: false,
        })
    }
}

/// One character's locomotion core.
pub struct CharacterController {
    config: ControllerConfig,
    motor: Box<dyn CharacterMotor>,
    generator: Box<dyn TrajectoryGenerator>,
    matcher: Box<dyn AnimationMatcher>,
    game_state: Box<dyn GameStateProvider>,
    ground_caster: Option<Box<dyn GroundCaster>>,
    camera_forward: Option<Vec3>,

    arbiter: ControlArbiter,
    adapter: MovementInputAdapter,
    jump: JumpSequencer,

    input: InputState,
    move_mode: MoveMode,
    events: EventQueue,
    goal: Vec<TrajectoryPoint>,
    prediction: Prediction,
    last_command: MotorCommand,

    collision_enabled: bool,
    hybrid_on: bool,
}

impl CharacterController {
    pub fn builder(config: ControllerConfig) -> ControllerBuilder {
        ControllerBuilder::new(config)
    }

    /// Sets this tick's input. The move mode is owned by the controller and
    /// the target comes from the game state, so both fields are overwritten.
    pub fn set_input(&mut self, input: InputState) {
        self.input = InputState {
            move_mode: self.move_mode,
            target: self.input.target,
            ..input
        };
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn set_move_mode(&mut self, mode: MoveMode) {
        self.move_mode = mode;
        self.input.move_mode = mode;
    }

    pub fn move_mode(&self) -> MoveMode {
        self.move_mode
    }

    pub fn set_camera_forward(&mut self, forward: Option<Vec3>) {
        self.camera_forward = forward;
    }

    /// Physics-synchronized step.
    pub fn fixed_update(&mut self, dt: f32) {
        if self.config.history_cadence == HistoryCadence::Physics {
            self.record_history(dt);
        }
    }

    /// Frame-synchronized step: arbitration, jump sequencing, prediction,
    /// and handing the trajectory goal to the matcher.
    pub fn frame_update(&mut self, dt: f32) -> Prediction {
        if self.config.history_cadence == HistoryCadence::Frame {
            self.record_history(dt);
        }

        let snapshot = self.game_state.snapshot();
        let generator = &mut self.generator;
        let jump = &mut self.jump;
        let arbitration = self.arbiter.update(&snapshot, |point_and_click| {
            generator.set_point_and_click(point_and_click);
            jump.set_point_and_click(point_and_click);
        });
        if let Some(from) = arbitration.changed_from {
            self.events.push(ControllerEvent::ControlStateChanged {
                from,
                to: arbitration.state,
            });
        }
        self.input.target = self.game_state.target_position();

        let position = self.motor.position();
        let facing = self.motor.facing();

        match self.jump.update(
            dt,
            position,
            self.input.jump_pressed,
            self.matcher.as_mut(),
            self.ground_caster.as_deref(),
        ) {
            JumpOutcome::Started {
                contact,
                ground_aligned,
            } => self.events.push(ControllerEvent::JumpStarted {
                contact,
                ground_aligned,
            }),
            JumpOutcome::Completed => self.events.push(ControllerEvent::JumpCompleted),
            JumpOutcome::Nothing => {}
        }

        let ctx = PredictionContext {
            dt,
            position,
            facing,
            camera_forward: self.camera_forward,
            input: &self.input,
        };
        self.prediction = self.generator.update_prediction(&ctx);

        self.matcher
            .set_long_error_warp_scale(self.generator.long_error_warp_scale());
        self.generator.extract_goal(&mut self.goal);
        self.matcher.set_trajectory_goal(&self.goal);

        self.prediction
    }

    /// Applies the animator's root motion for this tick through the motor.
    ///
    /// Returns the command sent, or `None` when collision is disabled.
    pub fn move_character(&mut self, root_motion: Vec3) -> Option<MotorCommand> {
        if self.hybrid_on && (self.generator.input_vector() != Vec3::ZERO || self.input.jump_pressed) {
            self.hybrid_on = false;
            self.matcher.blend_out_controller(self.config.hybrid_blend_time);
            self.events.push(ControllerEvent::HybridBlendedOut);
        }

        if !self.collision_enabled {
            return None;
        }

        let command = if self.jump.is_in_progress() {
            // The jump event drives the character until it completes.
            let command = MotorCommand {
                inputs: MotorInputs::Null,
                zero_base_velocity: false,
            };
            self.motor.set_inputs(command.inputs);
            command
        } else {
            self.adapter.apply(
                self.arbiter.state(),
                root_motion,
                self.input.jump_pressed,
                self.motor.as_mut(),
            )
        };
        trace!(state = ?self.arbiter.state(), ?command, "Motor inputs applied");
        self.last_command = command;
        Some(command)
    }

    /// Snaps the motor to the game's target pose and stomps trajectory.
    pub fn teleport(&mut self) {
        self.motor.set_base_velocity(Vec3::ZERO);
        if let Some(target) = self.game_state.target_position() {
            self.motor.set_position(target);
        }
        let rotation = self.game_state.target_rotation();
        self.motor.set_rotation(rotation);

        let facing = rotation.yaw_degrees();
        self.generator.reset_motion(facing);
        let position = self.motor.position();
        debug!(?position, facing, "Teleported");
        self.events.push(ControllerEvent::Teleported { position, facing });
    }

    pub fn adjust_movement_speed(&mut self, speeds: SpeedAdjustment) {
        self.motor
            .set_max_stable_move_speed(speeds.max_stable_move_speed);
        self.adapter.set_move_speed(speeds.move_speed);
        self.generator.set_max_speed(speeds.max_speed);
        self.config.max_stable_move_speed = speeds.max_stable_move_speed;
        self.config.move_speed = speeds.move_speed;
        self.config.max_speed = speeds.max_speed;
        info!(?speeds, "Movement speed adjusted");
        self.events.push(ControllerEvent::SpeedAdjusted {
            max_speed: speeds.max_speed,
            move_speed: speeds.move_speed,
            max_stable_move_speed: speeds.max_stable_move_speed,
        });
    }

    /// Hands the character to the controller-driven animator.
    ///
    /// With no trigger the matcher blends into controller mode; otherwise
    /// the trigger is fired. Either way the next movement input or jump
    /// blends back out.
    pub fn play_animation(&mut self, trigger: Option<&str>) {
        self.hybrid_on = true;
        match trigger {
            None => self.matcher.blend_in_controller(self.config.hybrid_blend_time),
            Some(name) => self.matcher.set_trigger(name),
        }
    }

    pub fn is_hybrid(&self) -> bool {
        self.hybrid_on
    }

    pub fn set_collision_enabled(&mut self, enabled: bool) {
        if self.collision_enabled != enabled {
            self.motor.set_enabled(enabled);
        }
        self.collision_enabled = enabled;
    }

    pub fn collision_enabled(&self) -> bool {
        self.collision_enabled
    }

    pub fn control_state(&self) -> ControlState {
        self.arbiter.state()
    }

    pub fn prediction(&self) -> Prediction {
        self.prediction
    }

    pub fn last_command(&self) -> MotorCommand {
        self.last_command
    }

    pub fn has_movement_input(&self) -> bool {
        self.generator.has_movement_input()
    }

    pub fn is_point_and_click(&self) -> bool {
        self.generator.is_point_and_click()
    }

    pub fn trajectory(&self) -> &TrajectoryBuffer {
        self.generator.trajectory()
    }

    /// Goal most recently handed to the matcher.
    pub fn goal(&self) -> &[TrajectoryPoint] {
        &self.goal
    }

    pub fn jump_state(&self) -> JumpState {
        self.jump.state()
    }

    pub fn drain_events(&mut self) -> Vec<ControllerEvent> {
        self.events.drain()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn motor(&self) -> &dyn CharacterMotor {
        self.motor.as_ref()
    }

    pub fn is_grounded(&self) -> bool {
        self.motor.is_stable_on_ground()
    }

    pub fn velocity(&self) -> Vec3 {
        self.motor.base_velocity()
    }

    pub fn height(&self) -> f32 {
        self.motor.capsule().height
    }

    pub fn set_height(&mut self, height: f32) {
        let capsule = self.motor.capsule();
        self.motor.set_capsule(Capsule { height, ..capsule });
    }

    pub fn radius(&self) -> f32 {
        self.motor.capsule().radius
    }

    pub fn set_radius(&mut self, radius: f32) {
        let capsule = self.motor.capsule();
        self.motor.set_capsule(Capsule { radius, ..capsule });
    }

    fn record_history(&mut self, dt: f32) {
        let position = self.motor.position();
        let facing = self.motor.facing();
        self.generator.record_past(dt, position, facing);
    }
}
