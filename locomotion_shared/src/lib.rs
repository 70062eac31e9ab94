//! `locomotion_shared`
//!
//! Shared libraries used by the controller and the host.
//!
//! Design goals:
//! - Deterministic and modular where practical.
//! - Clear separation of concerns (math, config, profiles, collaborators).
//! - Traits for the host collaborators so they can be injected and faked.
//! - No `unsafe`.

pub mod animation;
pub mod config;
pub mod game_state;
pub mod math;
pub mod physics;
pub mod profile;

pub mod prelude {
    //! Commonly used exports.

    pub use crate::animation::*;
    pub use crate::config::*;
    pub use crate::game_state::*;
    pub use crate::math::*;
    pub use crate::physics::*;
    pub use crate::profile::*;
}
