//! Door directions on the room grid.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Cardinal direction of a door on a room's wall.
///
/// North is negative y on the grid, matching screen coordinates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum DoorDirection {
    North = 0,
    South = 1,
    East = 2,
    West = 3,
}

impl DoorDirection {
    /// All directions for iteration, in a fixed order.
    pub const ALL: [DoorDirection; 4] = [
        DoorDirection::North,
        DoorDirection::South,
        DoorDirection::East,
        DoorDirection::West,
    ];

    /// The facing wall on the far side of a doorway: a room entered going
    /// north is reached through its south wall.
    pub const fn opposite(self) -> DoorDirection {
        match self {
            DoorDirection::North => DoorDirection::South,
            DoorDirection::South => DoorDirection::North,
            DoorDirection::East => DoorDirection::West,
            DoorDirection::West => DoorDirection::East,
        }
    }

    /// Grid step taken when leaving a room through this wall.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            DoorDirection::North => (0, -1),
            DoorDirection::South => (0, 1),
            DoorDirection::East => (1, 0),
            DoorDirection::West => (-1, 0),
        }
    }
}
