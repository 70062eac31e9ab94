//! Physics abstraction.
//!
//! The character motor and the ground caster are host collaborators. This
//! module defines the narrow contracts the controller drives them through.

use crate::math::{Quat, Vec3};

/// Per-tick inputs for a kinematic character motor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerInputs {
    pub move_axis_forward: f32,
    pub move_axis_right: f32,
    pub camera_rotation: Quat,
    pub jump_down: bool,
}

/// What the motor should consume this tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MotorInputs {
    Player(PlayerInputs),
    /// No movement intent.
    #[default]
    Null,
}

/// Collision capsule dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    pub height: f32,
    pub radius: f32,
}

impl Default for Capsule {
    fn default() -> Self {
        Self {
            height: 2.0,
            radius: 0.5,
        }
    }
}

/// Kinematic character motor.
pub trait CharacterMotor: Send {
    fn set_inputs(&mut self, inputs: MotorInputs);
    fn base_velocity(&self) -> Vec3;
    fn set_base_velocity(&mut self, velocity: Vec3);
    fn is_stable_on_ground(&self) -> bool;
    fn capsule(&self) -> Capsule;
    fn set_capsule(&mut self, capsule: Capsule);
    fn position(&self) -> Vec3;
    /// World yaw in degrees.
    fn facing(&self) -> f32;
    fn set_position(&mut self, position: Vec3);
    fn set_rotation(&mut self, rotation: Quat);
    fn set_enabled(&mut self, enabled: bool);
    fn set_max_stable_move_speed(&mut self, speed: f32);
}

/// Casts rays against world geometry.
pub trait GroundCaster: Send + Sync {
    /// Returns the first hit point along the ray, if any within `max_distance`.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3>;
}

/// Infinite horizontal plane at a fixed height.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatGround {
    pub height: f32,
}

impl GroundCaster for FlatGround {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3> {
        let dir = direction.normalized();
        if dir.y.abs() <= f32::EPSILON {
            return None;
        }
        let t = (self.height - origin.y) / dir.y;
        (t >= 0.0 && t <= max_distance).then(|| origin + dir * t)
    }
}

/// Ground that never hits anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullGround;

impl GroundCaster for NullGround {
    fn raycast(&self, _origin: Vec3, _direction: Vec3, _max_distance: f32) -> Option<Vec3> {
        None
    }
}
