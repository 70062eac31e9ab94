//! Input profiles.
//!
//! An input profile remaps ranges of raw input magnitude onto magnitudes the
//! animation set can actually reproduce (e.g. walk and run speeds), along
//! with per-range responsiveness multipliers. Profiles are read-only assets.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of looking up an input magnitude in a profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputShaping {
    /// Multiplier applied to the input vector.
    pub scale: f32,
    /// Positional responsiveness multiplier.
    pub pos_bias: f32,
    /// Directional responsiveness multiplier.
    pub dir_bias: f32,
}

impl InputShaping {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        pos_bias: 1.0,
        dir_bias: 1.0,
    };
}

/// One magnitude range of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputRange {
    /// Inclusive lower bound of the raw magnitude.
    pub min: f32,
    /// Inclusive upper bound of the raw magnitude.
    pub max: f32,
    /// Magnitude the input is remapped to.
    pub remap: f32,
    #[serde(default = "one")]
    pub pos_bias: f32,
    #[serde(default = "one")]
    pub dir_bias: f32,
}

fn one() -> f32 {
    1.0
}

/// Ordered set of magnitude ranges. The first matching range wins.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InputProfile {
    #[serde(default)]
    pub name: String,
    pub ranges: Vec<InputRange>,
}

impl InputProfile {
    /// Parses a profile from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        let profile: Self = serde_json::from_str(s)?;
        debug!(name = %profile.name, ranges = profile.ranges.len(), "Input profile loaded");
        Ok(profile)
    }

    /// Looks up the shaping for a raw input magnitude.
    ///
    /// Magnitudes that match no range, and zero magnitudes, are left unshaped.
    pub fn lookup(&self, magnitude: f32) -> InputShaping {
        if magnitude <= f32::EPSILON {
            return InputShaping::IDENTITY;
        }
        self.ranges
            .iter()
            .find(|r| magnitude >= r.min && magnitude <= r.max)
            .map(|r| InputShaping {
                scale: r.remap / magnitude,
                pos_bias: r.pos_bias,
                dir_bias: r.dir_bias,
            })
            .unwrap_or(InputShaping::IDENTITY)
    }
}
