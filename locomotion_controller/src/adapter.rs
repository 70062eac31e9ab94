//! Movement input adapter.
//!
//! Shapes the arbitrated movement intent into what the character motor
//! consumes. Camera rotation is always identity here: the move vector is
//! already in world space.

use locomotion_shared::{
    math::{Quat, Vec3},
    physics::{CharacterMotor, MotorInputs, PlayerInputs},
};

use crate::arbiter::ControlState;

/// Motor inputs for one tick plus whether base velocity must be zeroed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotorCommand {
    pub inputs: MotorInputs,
    pub zero_base_velocity: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct MovementInputAdapter {
    move_speed: f32,
}

impl MovementInputAdapter {
    pub fn new(move_speed: f32) -> Self {
        Self { move_speed }
    }

    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    pub fn set_move_speed(&mut self, move_speed: f32) {
        self.move_speed = move_speed;
    }

    /// Builds the command for `state`. Exactly one branch applies per tick.
    pub fn build(&self, state: ControlState, move_vector: Vec3, jump_pressed: bool) -> MotorCommand {
        match state {
            ControlState::UnderDirectControl => MotorCommand {
                inputs: MotorInputs::Player(self.axes(move_vector, jump_pressed)),
                zero_base_velocity: false,
            },
            ControlState::PathfindingDriven => MotorCommand {
                inputs: MotorInputs::Player(self.axes(move_vector, false)),
                zero_base_velocity: false,
            },
            // Residual momentum would make a turning character drift.
            ControlState::TurningOnly | ControlState::Uninitialized => MotorCommand {
                inputs: MotorInputs::Null,
                zero_base_velocity: true,
            },
        }
    }

    /// Builds the command and hands it to the motor.
    pub fn apply(
        &self,
        state: ControlState,
        move_vector: Vec3,
        jump_pressed: bool,
        motor: &mut dyn CharacterMotor,
    ) -> MotorCommand {
        let command = self.build(state, move_vector, jump_pressed);
        motor.set_inputs(command.inputs);
        if command.zero_base_velocity {
            motor.set_base_velocity(Vec3::ZERO);
        }
        command
    }

    fn axes(&self, move_vector: Vec3, jump_down: bool) -> PlayerInputs {
        PlayerInputs {
            move_axis_forward: move_vector.z * self.move_speed,
            move_axis_right: move_vector.x * self.move_speed,
            camera_rotation: Quat::IDENTITY,
            jump_down,
        }
    }
}
