//! Configuration system.
//!
//! Loads designer tunables from JSON strings (file IO left to the host).
//! Every field has a default so partial documents are valid.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which movement model the trajectory follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MoveMode {
    #[default]
    Normal,
    Strafe,
    Climb,
}

/// Update cadence on which past trajectory is recorded.
///
/// Exactly one cadence records history, otherwise past samples are doubled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HistoryCadence {
    /// Physics-synchronized fixed step.
    Physics,
    /// Frame-synchronized variable step.
    #[default]
    Frame,
}

/// Downward ground cast used to align a jump landing contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JumpGroundConfig {
    /// Height above the predicted contact the cast starts from.
    #[serde(default = "default_cast_height")]
    pub cast_height: f32,
    /// Maximum downward cast distance.
    #[serde(default = "default_cast_distance")]
    pub cast_distance: f32,
}

impl Default for JumpGroundConfig {
    fn default() -> Self {
        Self {
            cast_height: default_cast_height(),
            cast_distance: default_cast_distance(),
        }
    }
}

fn default_cast_height() -> f32 {
    3.5
}

fn default_cast_distance() -> f32 {
    10.0
}

/// Root configuration for one character controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Maximum trajectory speed (units/s).
    #[serde(default = "default_max_speed")]
    pub max_speed: f32,
    /// Positional responsiveness of the predicted trajectory.
    #[serde(default = "default_pos_bias")]
    pub pos_bias: f32,
    /// Rotational responsiveness of the predicted trajectory.
    #[serde(default = "default_dir_bias")]
    pub dir_bias: f32,
    /// Point-and-click arrival radius.
    #[serde(default = "default_stopping_distance")]
    pub stopping_distance: f32,
    /// Trajectory samples per second, independent of frame rate.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f32,
    /// Seconds of recorded history kept in the buffer.
    #[serde(default = "default_past_time")]
    pub past_time: f32,
    /// Seconds of predicted future kept in the buffer.
    #[serde(default = "default_prediction_time")]
    pub prediction_time: f32,
    #[serde(default)]
    pub move_mode: MoveMode,
    /// Snap desired facing to the current facing when there is no input.
    #[serde(default = "default_true")]
    pub reset_direction_on_no_input: bool,
    #[serde(default)]
    pub history_cadence: HistoryCadence,
    /// Scale applied to root-motion deltas before they become motor axes.
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    /// Motor's cap on grounded speed.
    #[serde(default = "default_max_stable_move_speed")]
    pub max_stable_move_speed: f32,
    /// Seconds used when blending the matcher in or out of controller mode.
    #[serde(default = "default_hybrid_blend_time")]
    pub hybrid_blend_time: f32,
    #[serde(default)]
    pub jump: JumpGroundConfig,
}

fn default_max_speed() -> f32 {
    4.0
}

fn default_pos_bias() -> f32 {
    15.0
}

fn default_dir_bias() -> f32 {
    10.0
}

fn default_stopping_distance() -> f32 {
    1.0
}

fn default_sample_rate() -> f32 {
    20.0
}

fn default_past_time() -> f32 {
    1.0
}

fn default_prediction_time() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_move_speed() -> f32 {
    1.0
}

fn default_max_stable_move_speed() -> f32 {
    10.0
}

fn default_hybrid_blend_time() -> f32 {
    0.5
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_speed: default_max_speed(),
            pos_bias: default_pos_bias(),
            dir_bias: default_dir_bias(),
            stopping_distance: default_stopping_distance(),
            sample_rate: default_sample_rate(),
            past_time: default_past_time(),
            prediction_time: default_prediction_time(),
            move_mode: MoveMode::default(),
            reset_direction_on_no_input: default_true(),
            history_cadence: HistoryCadence::default(),
            move_speed: default_move_speed(),
            max_stable_move_speed: default_max_stable_move_speed(),
            hybrid_blend_time: default_hybrid_blend_time(),
            jump: JumpGroundConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Number of recorded past samples.
    pub fn past_samples(&self) -> usize {
        (self.past_time * self.sample_rate).ceil().max(0.0) as usize
    }

    /// Number of predicted future samples (at least one).
    pub fn future_samples(&self) -> usize {
        let samples = (self.prediction_time * self.sample_rate).ceil() as usize;
        if samples == 0 {
            warn!(
                prediction_time = self.prediction_time,
                "Prediction horizon shorter than one sample, using one"
            );
        }
        samples.max(1)
    }

    /// Returns a description of the first invalid tunable, if any.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.sample_rate > 0.0) {
            return Err(format!("sample_rate must be positive, got {}", self.sample_rate));
        }
        let non_negative = [
            ("max_speed", self.max_speed),
            ("pos_bias", self.pos_bias),
            ("dir_bias", self.dir_bias),
            ("stopping_distance", self.stopping_distance),
            ("past_time", self.past_time),
            ("prediction_time", self.prediction_time),
            ("move_speed", self.move_speed),
            ("max_stable_move_speed", self.max_stable_move_speed),
            ("hybrid_blend_time", self.hybrid_blend_time),
            ("jump.cast_distance", self.jump.cast_distance),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(format!("{name} must be non-negative, got {value}"));
            }
        }
        Ok(())
    }
}
