//! `locomotion_host`
//!
//! Headless host for the character controller:
//! - Fixed physics timestep accumulated from frame time
//! - Frame step running arbitration, prediction, and motor input
//! - Flat-ground motor, scripted game state, and stub animation matcher
//!
//! Scenarios cover direct stick input, a fixed point-and-click target, and
//! wandering between random targets.

pub mod host;
pub mod sim;

pub use host::{Host, HostConfig, HostFile, HostReport, Scenario};
