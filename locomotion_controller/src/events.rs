//! Controller events.
//!
//! Notable transitions are queued here for the host to drain once per
//! frame (logging, UI, audio cues).

use locomotion_shared::math::Vec3;

use crate::arbiter::ControlState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerEvent {
    ControlStateChanged {
        from: ControlState,
        to: ControlState,
    },
    JumpStarted {
        contact: Vec3,
        ground_aligned: bool,
    },
    JumpCompleted,
    Teleported {
        position: Vec3,
        facing: f32,
    },
    HybridBlendedOut,
    SpeedAdjusted {
        max_speed: f32,
        move_speed: f32,
        max_stable_move_speed: f32,
    },
}

/// FIFO of controller events.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<ControllerEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: ControllerEvent) {
        self.events.push(event);
    }

    /// Takes all queued events, oldest first.
    pub fn drain(&mut self) -> Vec<ControllerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
