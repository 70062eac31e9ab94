//! `locomotion_controller`
//!
//! Character locomotion core:
//! - Trajectory prediction from player input or a game-supplied target
//! - Control-state arbitration between player input and pathfinding
//! - Movement input shaping for the character motor
//! - Jump sequencing through authored animation events
//!
//! Host collaborators (motor, matcher, game state, ground caster) are
//! injected through [`ControllerBuilder`].

pub mod adapter;
pub mod arbiter;
pub mod controller;
pub mod error;
pub mod events;
pub mod input;
pub mod jump;
pub mod predictor;
pub mod trajectory;

pub use controller::{CharacterController, ControllerBuilder, SpeedAdjustment};
pub use error::SetupError;
pub use predictor::{TrajectoryGenerator, TrajectoryPredictor};
