//! Game-state abstraction.
//!
//! The adventure-game framework owns the notion of "are we in gameplay",
//! "is this the player", pathfinding, and the configured movement method.
//! The controller polls it once per tick.

use serde::{Deserialize, Serialize};

use crate::math::{Quat, Vec3};

/// How the game expects the player to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MovementMethod {
    #[default]
    Direct,
    PointAndClick,
}

/// Character activity as seen by the game framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CharState {
    #[default]
    Idle,
    Moving,
    Custom,
    Decelerating,
}

bitflags::bitflags! {
    /// Boolean game-state flags, polled once per tick.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct GameFlags: u8 {
        const IN_GAMEPLAY = 1 << 0;
        const IS_PLAYER = 1 << 1;
        const IS_PATHFINDING = 1 << 2;
    }
}

/// Everything the arbiter reads for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GameSnapshot {
    pub flags: GameFlags,
    pub movement_method: MovementMethod,
    pub char_state: CharState,
}

impl GameSnapshot {
    pub fn new(
        gameplay_active: bool,
        is_player: bool,
        is_pathfinding: bool,
        movement_method: MovementMethod,
        char_state: CharState,
    ) -> Self {
        let mut flags = GameFlags::empty();
        flags.set(GameFlags::IN_GAMEPLAY, gameplay_active);
        flags.set(GameFlags::IS_PLAYER, is_player);
        flags.set(GameFlags::IS_PATHFINDING, is_pathfinding);
        Self {
            flags,
            movement_method,
            char_state,
        }
    }

    pub fn gameplay_active(&self) -> bool {
        self.flags.contains(GameFlags::IN_GAMEPLAY)
    }

    pub fn is_player(&self) -> bool {
        self.flags.contains(GameFlags::IS_PLAYER)
    }

    pub fn is_pathfinding(&self) -> bool {
        self.flags.contains(GameFlags::IS_PATHFINDING)
    }
}

/// Game framework view of one character.
pub trait GameStateProvider: Send {
    fn in_gameplay(&self) -> bool;
    fn is_player(&self) -> bool;
    fn is_pathfinding(&self) -> bool;
    fn movement_method(&self) -> MovementMethod;
    fn char_state(&self) -> CharState;
    /// Current pathfinding / point-and-click destination.
    fn target_position(&self) -> Option<Vec3>;
    fn target_rotation(&self) -> Quat;

    fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::new(
            self.in_gameplay(),
            self.is_player(),
            self.is_pathfinding(),
            self.movement_method(),
            self.char_state(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_packs_flags() {
        let snap = GameSnapshot::new(true, false, true, MovementMethod::Direct, CharState::Idle);
        assert!(snap.gameplay_active());
        assert!(!snap.is_player());
        assert!(snap.is_pathfinding());
        assert_eq!(snap.flags, GameFlags::IN_GAMEPLAY | GameFlags::IS_PATHFINDING);
    }
}
