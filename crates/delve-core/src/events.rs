//! Notifications produced by dungeon exploration.
//!
//! The core records facts; HUD, audio, and save subscribers react to
//! them. Events accumulate in a queue owned by the manager and are
//! drained by the host with `take_events`, so the core stays agnostic
//! of listeners.

use serde::{Deserialize, Serialize};

use crate::dungeon::RoomId;

/// A fact the presentation layer may react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DungeonEvent {
    /// The player entered a room (newly generated or revisited).
    RoomEntered { room: RoomId },
    /// The current room's encounter was resolved.
    RoomCleared { room: RoomId },
}
