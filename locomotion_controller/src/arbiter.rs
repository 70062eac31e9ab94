//! Control-state arbitration.
//!
//! Decides each tick who drives the character: the player's direct input,
//! the game's pathfinding, or nobody (the game only turns the character in
//! place). The decision also fixes where the trajectory predictor and the
//! jump sequencer take their input from, so the point-and-click flag is
//! pushed to them on every tick.

use locomotion_shared::game_state::{CharState, GameSnapshot, MovementMethod};
use serde::Serialize;
use tracing::debug;

/// Who drives the character this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ControlState {
    /// No tick has been arbitrated yet.
    #[default]
    Uninitialized,
    UnderDirectControl,
    PathfindingDriven,
    TurningOnly,
}

impl ControlState {
    /// Whether input should be sourced from the game's target position.
    pub fn is_point_and_click(self) -> bool {
        matches!(self, ControlState::PathfindingDriven | ControlState::TurningOnly)
    }
}

/// Pure decision table.
pub fn arbitrate(snapshot: &GameSnapshot) -> ControlState {
    let game_drives = !snapshot.gameplay_active()
        || !snapshot.is_player()
        || snapshot.is_pathfinding()
        || snapshot.movement_method == MovementMethod::PointAndClick;

    if !game_drives {
        return ControlState::UnderDirectControl;
    }
    if snapshot.char_state == CharState::Moving {
        ControlState::PathfindingDriven
    } else {
        ControlState::TurningOnly
    }
}

/// Result of one arbitration tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arbitration {
    pub state: ControlState,
    /// Previous state when this tick changed it.
    pub changed_from: Option<ControlState>,
    pub point_and_click: bool,
}

/// Stateful arbiter remembering the last decision.
#[derive(Debug, Default)]
pub struct ControlArbiter {
    state: ControlState,
}

impl ControlArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    /// Arbitrates one tick and hands the point-and-click flag to `sync`.
    ///
    /// `sync` runs every tick, even when the state label is unchanged.
    pub fn update(&mut self, snapshot: &GameSnapshot, mut sync: impl FnMut(bool)) -> Arbitration {
        let next = arbitrate(snapshot);
        let point_and_click = next.is_point_and_click();
        sync(point_and_click);

        let previous = self.state;
        self.state = next;
        let changed_from = (previous != next).then_some(previous);
        if changed_from.is_some() {
            debug!(from = ?previous, to = ?next, point_and_click, "Control state changed");
        }

        Arbitration {
            state: next,
            changed_from,
            point_and_click,
        }
    }
}
