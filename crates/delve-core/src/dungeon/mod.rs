//! Dungeon floor graphs.
//!
//! Rooms on an integer grid, connected by directional doors. Two
//! strategies build the graph: `generator` produces a whole floor in one
//! pass, `live` grows it one room per traversed door.

mod direction;
mod floor;
mod generator;
mod live;
mod registry;
mod room;
mod template;

pub use direction::DoorDirection;
pub use floor::{Floor, PlacementError};
pub use generator::{generate_floor, GenerationParams};
pub use live::{LiveDungeonManager, LiveParams, ManagerState};
pub use registry::{CatalogError, TemplateRegistry};
pub use room::{Door, Room, RoomFlags, RoomId, RoomType};
pub use template::{
    Constraints, DoorSlot, RoomTemplate, SizeCategory, SpawnKind, SpawnPoint, TemplateError,
};
