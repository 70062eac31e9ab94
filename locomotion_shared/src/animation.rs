//! Animation matcher abstraction.
//!
//! The motion-matching animator is a host collaborator. It consumes the
//! trajectory goal each time it searches for a pose and runs authored
//! events (jumps, vaults) that take over locomotion until they complete.

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// One sampled point of a character trajectory.
///
/// `position` is relative to the character; `facing` is world yaw in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub position: Vec3,
    pub facing: f32,
}

impl TrajectoryPoint {
    pub const fn new(position: Vec3, facing: f32) -> Self {
        Self { position, facing }
    }
}

/// World-space contact an event is expected to hit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EventContact {
    pub position: Vec3,
    pub rotation_y: f32,
}

/// Authored animation event and its desired contacts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventDefinition {
    pub id: String,
    #[serde(default)]
    pub contacts: Vec<EventContact>,
}

impl EventDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            contacts: Vec::new(),
        }
    }

    pub fn clear_contacts(&mut self) {
        self.contacts.clear();
    }

    /// Adds placeholder contacts the matcher fills in from the animation data.
    pub fn add_dummy_contacts(&mut self, count: usize) {
        self.contacts
            .extend(std::iter::repeat(EventContact::default()).take(count));
    }
}

/// Motion-matching animator.
pub trait AnimationMatcher: Send {
    /// Hands the current trajectory goal to the matcher.
    fn set_trajectory_goal(&mut self, goal: &[TrajectoryPoint]);
    /// Time-warp scale compensating for input profile reshaping.
    fn set_long_error_warp_scale(&mut self, scale: f32);
    fn begin_event(&mut self, definition: &EventDefinition);
    fn is_event_complete(&self) -> bool;
    fn next_event_contact_world_position(&self) -> Vec3;
    fn modify_desired_event_contact_position(&mut self, position: Vec3);
    /// Hands control to the controller-driven animator for `blend_time` seconds.
    fn blend_in_controller(&mut self, blend_time: f32);
    fn blend_out_controller(&mut self, blend_time: f32);
    fn set_trigger(&mut self, name: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dummy_contacts_replace_cleared_ones() {
        let mut def = EventDefinition::new("jump");
        def.add_dummy_contacts(3);
        def.clear_contacts();
        def.add_dummy_contacts(1);
        assert_eq!(def.contacts, vec![EventContact::default()]);
    }
}
