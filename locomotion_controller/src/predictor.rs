//! Trajectory prediction.
//!
//! Turns movement input into a desired velocity and facing, then relaxes the
//! predicted part of the trajectory towards them. The animation matcher
//! searches against the resulting trajectory, so it has to curve smoothly
//! towards the target rather than jump.

use std::sync::Arc;

use locomotion_shared::{
    animation::TrajectoryPoint,
    config::{ControllerConfig, MoveMode},
    math::{signed_angle, Quat, Vec3},
    profile::{InputProfile, InputShaping},
};
use tracing::trace;

use crate::{
    input::{source_raw_input, InputState},
    trajectory::TrajectoryBuffer,
};

/// Below this squared magnitude the input counts as released.
const INPUT_DEADZONE_SQ: f32 = 0.001;
/// Below this squared displacement the facing is not derived from motion.
const DISPLACEMENT_DEADZONE_SQ: f32 = 0.0001;

/// Default sample times handed to the matcher (seconds, negative = past).
pub const DEFAULT_PREDICTION_TIMES: [f32; 6] = [-0.5, -0.2, 0.2, 0.5, 0.8, 1.0];

/// Per-tick inputs to the predictor.
#[derive(Debug, Clone, Copy)]
pub struct PredictionContext<'a> {
    pub dt: f32,
    /// Character world position.
    pub position: Vec3,
    /// Character world yaw in degrees.
    pub facing: f32,
    /// Camera forward in world space; `None` means world-relative input.
    pub camera_forward: Option<Vec3>,
    pub input: &'a InputState,
}

/// Desired motion produced for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Prediction {
    pub desired_velocity: Vec3,
    /// World yaw in degrees.
    pub desired_orientation: f32,
}

/// Capabilities the controller needs from a trajectory generator.
pub trait TrajectoryGenerator: Send {
    /// Sizes internal buffers for the matcher's sample times.
    fn setup(&mut self, prediction_times: &[f32]);
    fn update_prediction(&mut self, ctx: &PredictionContext<'_>) -> Prediction;
    /// Records past trajectory. Call from exactly one update cadence.
    fn record_past(&mut self, dt: f32, position: Vec3, facing: f32);
    fn has_movement_input(&self) -> bool;
    /// Clamped, shaped input of the last update, before the deadzone.
    fn input_vector(&self) -> Vec3;
    /// Stomps past and future trajectory, e.g. after a teleport.
    fn reset_motion(&mut self, rotation: f32);
    fn set_point_and_click(&mut self, enabled: bool);
    fn is_point_and_click(&self) -> bool;
    fn set_max_speed(&mut self, max_speed: f32);
    fn trajectory(&self) -> &TrajectoryBuffer;
    /// Samples the trajectory at the configured prediction times.
    fn extract_goal(&self, out: &mut Vec<TrajectoryPoint>);
    fn long_error_warp_scale(&self) -> f32;
}

/// Input-driven trajectory predictor.
pub struct TrajectoryPredictor {
    max_speed: f32,
    pos_bias: f32,
    dir_bias: f32,
    stopping_distance: f32,
    reset_direction_on_no_input: bool,

    input_profile: Option<Arc<InputProfile>>,
    /// Strafe facing used when no camera is available.
    strafe_direction: Vec3,
    point_and_click: bool,

    buffer: TrajectoryBuffer,
    prediction_times: Vec<f32>,

    has_input: bool,
    input_vector: Vec3,
    linear_input_vector: Vec3,
    shaping: InputShaping,
    long_error_warp_scale: f32,
    last_desired_orientation: f32,
}

impl TrajectoryPredictor {
    pub fn new(cfg: &ControllerConfig) -> Self {
        Self {
            max_speed: cfg.max_speed,
            pos_bias: cfg.pos_bias,
            dir_bias: cfg.dir_bias,
            stopping_distance: cfg.stopping_distance,
            reset_direction_on_no_input: cfg.reset_direction_on_no_input,
            input_profile: None,
            strafe_direction: Vec3::FORWARD,
            point_and_click: false,
            buffer: TrajectoryBuffer::new(cfg.past_samples(), cfg.future_samples(), cfg.sample_rate),
            prediction_times: DEFAULT_PREDICTION_TIMES.to_vec(),
            has_input: false,
            input_vector: Vec3::ZERO,
            linear_input_vector: Vec3::ZERO,
            shaping: InputShaping::IDENTITY,
            long_error_warp_scale: 1.0,
            last_desired_orientation: 0.0,
        }
    }

    pub fn with_input_profile(mut self, profile: Arc<InputProfile>) -> Self {
        self.input_profile = Some(profile);
        self
    }

    pub fn set_input_profile(&mut self, profile: Option<Arc<InputProfile>>) {
        self.input_profile = profile;
    }

    pub fn set_strafe_direction(&mut self, direction: Vec3) {
        self.strafe_direction = direction;
    }

    pub fn set_pos_bias(&mut self, bias: f32) {
        self.pos_bias = bias;
    }

    pub fn set_dir_bias(&mut self, bias: f32) {
        self.dir_bias = bias;
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Clamped and profile-shaped input of the last update.
    pub fn input_vector(&self) -> Vec3 {
        self.input_vector
    }

    /// Input of the last update rotated into camera space.
    pub fn linear_input_vector(&self) -> Vec3 {
        self.linear_input_vector
    }

    pub fn desired_orientation(&self) -> f32 {
        self.last_desired_orientation
    }

    /// Camera-relative input expressed in the character's local frame.
    pub fn relative_input_vector(&self, camera_forward: Option<Vec3>, character_facing: f32) -> Vec3 {
        match camera_yaw(camera_forward) {
            None => self.input_vector,
            Some(yaw) => {
                let linear = Quat::from_yaw_degrees(yaw) * self.input_vector;
                Quat::from_yaw_degrees(character_facing).conjugate() * linear
            }
        }
    }

    fn calculate_desired_linear_velocity(&mut self, ctx: &PredictionContext<'_>) -> Vec3 {
        let raw = match source_raw_input(
            ctx.input,
            self.point_and_click,
            ctx.position,
            self.stopping_distance,
        ) {
            Some(v) => v,
            None => {
                self.input_vector = Vec3::ZERO;
                self.linear_input_vector = Vec3::ZERO;
                self.has_input = false;
                return Vec3::ZERO;
            }
        };

        let mut input = if raw.len_sq() > 1.0 {
            raw.normalized()
        } else {
            raw
        };

        self.shaping = match &self.input_profile {
            Some(profile) => {
                let shaping = profile.lookup(input.len());
                input *= shaping.scale;
                self.long_error_warp_scale = if shaping.scale > f32::EPSILON {
                    1.0 / shaping.scale
                } else {
                    1.0
                };
                shaping
            }
            None => {
                self.long_error_warp_scale = 1.0;
                InputShaping::IDENTITY
            }
        };
        self.input_vector = input;

        if input.len_sq() <= INPUT_DEADZONE_SQ {
            self.linear_input_vector = Vec3::ZERO;
            self.has_input = false;
            return Vec3::ZERO;
        }
        self.has_input = true;

        self.linear_input_vector = match camera_yaw(ctx.camera_forward) {
            Some(yaw) => Quat::from_yaw_degrees(yaw) * input,
            None => input,
        };
        self.linear_input_vector * self.max_speed
    }

    fn desired_orientation_for(&self, ctx: &PredictionContext<'_>, displacement: Vec3) -> f32 {
        if ctx.input.move_mode != MoveMode::Normal {
            return camera_yaw(ctx.camera_forward)
                .unwrap_or_else(|| signed_angle(Vec3::FORWARD, self.strafe_direction, Vec3::UP));
        }
        if displacement.len_sq() > DISPLACEMENT_DEADZONE_SQ {
            return displacement.x.atan2(displacement.z).to_degrees();
        }
        if self.reset_direction_on_no_input {
            ctx.facing
        } else {
            self.last_desired_orientation
        }
    }
}

/// Yaw from world forward to the camera's horizontal forward, if usable.
fn camera_yaw(camera_forward: Option<Vec3>) -> Option<f32> {
    let flat = camera_forward?.project_on_plane(Vec3::UP);
    if flat.len_sq() <= f32::EPSILON {
        return None;
    }
    Some(signed_angle(Vec3::FORWARD, flat, Vec3::UP))
}

impl TrajectoryGenerator for TrajectoryPredictor {
    fn setup(&mut self, prediction_times: &[f32]) {
        if !prediction_times.is_empty() {
            self.prediction_times = prediction_times.to_vec();
        }
        if !self.buffer.covers(&self.prediction_times) {
            let mut times = self.prediction_times.clone();
            times.push(-(self.buffer.past_len() as f32) / self.buffer.sample_rate());
            times.push(self.buffer.future_len() as f32 / self.buffer.sample_rate());
            self.buffer = TrajectoryBuffer::for_prediction_times(&times, self.buffer.sample_rate());
        }
    }

    fn update_prediction(&mut self, ctx: &PredictionContext<'_>) -> Prediction {
        let desired_velocity = self.calculate_desired_linear_velocity(ctx);
        let displacement = desired_velocity / self.buffer.sample_rate();

        let desired_orientation = self.desired_orientation_for(ctx, displacement);
        self.last_desired_orientation = desired_orientation;

        let move_rate = self.pos_bias * self.shaping.pos_bias * ctx.dt;
        let turn_rate = self.dir_bias * self.shaping.dir_bias * ctx.dt;
        self.buffer
            .relax_future(displacement, desired_orientation, move_rate, turn_rate);

        trace!(
            velocity = ?desired_velocity,
            orientation = desired_orientation,
            has_input = self.has_input,
            "Prediction updated"
        );

        Prediction {
            desired_velocity,
            desired_orientation,
        }
    }

    fn record_past(&mut self, dt: f32, position: Vec3, facing: f32) {
        self.buffer.record_past(dt, position, facing);
    }

    fn has_movement_input(&self) -> bool {
        self.has_input
    }

    fn input_vector(&self) -> Vec3 {
        self.input_vector
    }

    fn reset_motion(&mut self, rotation: f32) {
        self.buffer.reset(rotation);
        self.last_desired_orientation = rotation;
        self.has_input = false;
    }

    fn set_point_and_click(&mut self, enabled: bool) {
        self.point_and_click = enabled;
    }

    fn is_point_and_click(&self) -> bool {
        self.point_and_click
    }

    fn set_max_speed(&mut self, max_speed: f32) {
        self.max_speed = max_speed;
    }

    fn trajectory(&self) -> &TrajectoryBuffer {
        &self.buffer
    }

    fn extract_goal(&self, out: &mut Vec<TrajectoryPoint>) {
        self.buffer.extract(&self.prediction_times, out);
    }

    fn long_error_warp_scale(&self) -> f32 {
        self.long_error_warp_scale
    }
}
