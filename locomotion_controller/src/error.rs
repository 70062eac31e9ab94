//! Controller setup errors.

use std::fmt;

/// Why a controller refused to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    MissingMotor,
    MissingTrajectoryGenerator,
    MissingAnimationMatcher,
    MissingGameState,
    InvalidConfig(String),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::MissingMotor => write!(f, "no character motor was provided"),
            SetupError::MissingTrajectoryGenerator => {
                write!(f, "no trajectory generator was provided")
            }
            SetupError::MissingAnimationMatcher => write!(f, "no animation matcher was provided"),
            SetupError::MissingGameState => write!(f, "no game state provider was provided"),
            SetupError::InvalidConfig(reason) => write!(f, "invalid controller config: {reason}"),
        }
    }
}

impl std::error::Error for SetupError {}
