//! Jump sequencing.
//!
//! A jump is an authored animation event. While it plays, normal locomotion
//! is suspended and the sequencer only waits for the matcher to report the
//! event complete.

use locomotion_shared::{
    animation::{AnimationMatcher, EventDefinition},
    config::JumpGroundConfig,
    math::Vec3,
    physics::GroundCaster,
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JumpState {
    #[default]
    Idle,
    InProgress,
}

/// What happened to the jump during one update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JumpOutcome {
    Nothing,
    Started {
        /// Landing contact handed to the matcher.
        contact: Vec3,
        /// Whether the contact was moved onto ground found below it.
        ground_aligned: bool,
    },
    Completed,
}

pub struct JumpSequencer {
    state: JumpState,
    definition: Option<EventDefinition>,
    ground_cfg: JumpGroundConfig,
    point_and_click: bool,
    last_position: Option<Vec3>,
    velocity: Vec3,
}

impl JumpSequencer {
    pub fn new(definition: Option<EventDefinition>, ground_cfg: JumpGroundConfig) -> Self {
        Self {
            state: JumpState::Idle,
            definition,
            ground_cfg,
            point_and_click: false,
            last_position: None,
            velocity: Vec3::ZERO,
        }
    }

    pub fn state(&self) -> JumpState {
        self.state
    }

    pub fn is_in_progress(&self) -> bool {
        self.state == JumpState::InProgress
    }

    /// Planar velocity estimated from position deltas.
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn definition(&self) -> Option<&EventDefinition> {
        self.definition.as_ref()
    }

    pub fn set_point_and_click(&mut self, enabled: bool) {
        self.point_and_click = enabled;
    }

    /// Runs one tick of the sequencer.
    pub fn update(
        &mut self,
        dt: f32,
        position: Vec3,
        jump_pressed: bool,
        matcher: &mut dyn AnimationMatcher,
        ground: Option<&dyn GroundCaster>,
    ) -> JumpOutcome {
        if dt > 0.0 {
            let last = self.last_position.unwrap_or(position);
            self.velocity = ((position - last) / dt).horizontal();
        }

        let outcome = match self.state {
            JumpState::Idle => {
                if jump_pressed && !self.point_and_click {
                    self.trigger(matcher, ground)
                } else {
                    JumpOutcome::Nothing
                }
            }
            JumpState::InProgress => {
                if matcher.is_event_complete() {
                    self.state = JumpState::Idle;
                    self.velocity = Vec3::ZERO;
                    debug!("Jump complete");
                    JumpOutcome::Completed
                } else {
                    JumpOutcome::Nothing
                }
            }
        };

        self.last_position = Some(position);
        outcome
    }

    /// Starts the jump event. A no-op while a jump is already playing or
    /// when no jump event is configured.
    pub fn trigger(
        &mut self,
        matcher: &mut dyn AnimationMatcher,
        ground: Option<&dyn GroundCaster>,
    ) -> JumpOutcome {
        if self.state == JumpState::InProgress {
            return JumpOutcome::Nothing;
        }
        let Some(definition) = self.definition.as_mut() else {
            return JumpOutcome::Nothing;
        };

        definition.clear_contacts();
        definition.add_dummy_contacts(1);
        matcher.begin_event(definition);

        let predicted = matcher.next_event_contact_world_position();
        let origin = predicted + Vec3::UP * self.ground_cfg.cast_height;
        let hit = ground.and_then(|g| g.raycast(origin, Vec3::DOWN, self.ground_cfg.cast_distance));

        let contact = match hit {
            Some(point) => {
                matcher.modify_desired_event_contact_position(point);
                point
            }
            None => {
                debug!(?predicted, "No ground under jump contact, keeping prediction");
                predicted
            }
        };

        self.state = JumpState::InProgress;
        debug!(event = %definition.id, ?contact, "Jump started");
        JumpOutcome::Started {
            contact,
            ground_aligned: hit.is_some(),
        }
    }
}
