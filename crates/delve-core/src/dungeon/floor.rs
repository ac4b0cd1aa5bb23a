//! Floor arena and its lookup indexes.
//!
//! One owned `Vec<Room>` plus two auxiliary maps (id to slot, grid cell
//! to slot). The maps are derived state: they are rebuilt on
//! deserialization rather than persisted, since JSON cannot key maps by
//! tuples.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::direction::DoorDirection;
use super::room::{Room, RoomId};

/// Room insertion failures. Both indicate a caller bug (generators check
/// occupancy before placing), so they are reported rather than panicking
/// and the floor is left unchanged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    #[error("grid cell ({x}, {y}) is already occupied")]
    CellOccupied { x: i32, y: i32 },

    #[error("{0} is already placed on this floor")]
    DuplicateId(RoomId),
}

/// Serialized form: rooms only, indexes rebuilt on load.
#[derive(Serialize, Deserialize)]
struct FloorData {
    rooms: Vec<Room>,
    start_room: Option<RoomId>,
    boss_room: Option<RoomId>,
    seed: u64,
    floor_number: u32,
    next_id: u32,
}

/// One dungeon level: a connected graph of rooms on an unbounded grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "FloorData", from = "FloorData")]
pub struct Floor {
    rooms: Vec<Room>,
    by_id: HashMap<RoomId, usize>,
    by_pos: HashMap<(i32, i32), usize>,
    pub start_room: Option<RoomId>,
    pub boss_room: Option<RoomId>,
    pub seed: u64,
    pub floor_number: u32,
    next_id: u32,
}

impl From<Floor> for FloorData {
    fn from(floor: Floor) -> Self {
        FloorData {
            rooms: floor.rooms,
            start_room: floor.start_room,
            boss_room: floor.boss_room,
            seed: floor.seed,
            floor_number: floor.floor_number,
            next_id: floor.next_id,
        }
    }
}

impl From<FloorData> for Floor {
    fn from(data: FloorData) -> Self {
        let mut floor = Floor {
            rooms: Vec::new(),
            by_id: HashMap::new(),
            by_pos: HashMap::new(),
            start_room: data.start_room,
            boss_room: data.boss_room,
            seed: data.seed,
            floor_number: data.floor_number,
            next_id: data.next_id,
        };
        for room in data.rooms {
            // Persisted floors already satisfy the grid invariants.
            let _ = floor.insert(room);
        }
        floor
    }
}

impl Floor {
    pub fn new(seed: u64, floor_number: u32) -> Self {
        Self {
            rooms: Vec::new(),
            by_id: HashMap::new(),
            by_pos: HashMap::new(),
            start_room: None,
            boss_room: None,
            seed,
            floor_number,
            next_id: 0,
        }
    }

    /// Hand out the next unused room id.
    pub fn allocate_id(&mut self) -> RoomId {
        let id = RoomId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Place a room at its grid position. A cell, once occupied, is never
    /// reassigned.
    pub fn insert(&mut self, room: Room) -> Result<RoomId, PlacementError> {
        let pos = (room.grid_x, room.grid_y);
        if self.by_pos.contains_key(&pos) {
            return Err(PlacementError::CellOccupied {
                x: room.grid_x,
                y: room.grid_y,
            });
        }
        if self.by_id.contains_key(&room.id) {
            return Err(PlacementError::DuplicateId(room.id));
        }
        let id = room.id;
        let slot = self.rooms.len();
        self.by_id.insert(id, slot);
        self.by_pos.insert(pos, slot);
        self.rooms.push(room);
        Ok(id)
    }

    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.by_pos.contains_key(&(x, y))
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.by_id.get(&id).map(|&slot| &self.rooms[slot])
    }

    pub fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.by_id.get(&id).map(|&slot| &mut self.rooms[slot])
    }

    pub fn room_at(&self, x: i32, y: i32) -> Option<&Room> {
        self.by_pos.get(&(x, y)).map(|&slot| &self.rooms[slot])
    }

    /// Rooms in insertion order.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Install a reciprocal door pair between two placed rooms: `a` gets
    /// a door on `direction`, `b` one on the opposite wall, each
    /// targeting the other. Returns false if either room is missing.
    pub fn connect(&mut self, a: RoomId, direction: DoorDirection, b: RoomId) -> bool {
        let (Some(&slot_a), Some(&slot_b)) = (self.by_id.get(&a), self.by_id.get(&b)) else {
            return false;
        };
        self.rooms[slot_a].add_door(direction, Some(b));
        self.rooms[slot_b].add_door(direction.opposite(), Some(a));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::room::RoomType;

    fn placed(floor: &mut Floor, x: i32, y: i32) -> RoomId {
        let id = floor.allocate_id();
        let mut room = Room::new(id, RoomType::Normal, 15, 9);
        room.set_grid_position(x, y);
        floor.insert(room).unwrap()
    }

    #[test]
    fn test_insert_and_lookup_both_indexes() {
        let mut floor = Floor::new(1, 1);
        let id = placed(&mut floor, 2, -3);
        assert_eq!(floor.room(id).unwrap().grid_x, 2);
        assert_eq!(floor.room_at(2, -3).unwrap().id, id);
        assert!(floor.is_occupied(2, -3));
        assert!(!floor.is_occupied(0, 0));
    }

    #[test]
    fn test_grid_exclusivity() {
        let mut floor = Floor::new(1, 1);
        placed(&mut floor, 0, 0);
        let id = floor.allocate_id();
        let room = Room::new(id, RoomType::Normal, 15, 9);
        assert_eq!(
            floor.insert(room),
            Err(PlacementError::CellOccupied { x: 0, y: 0 })
        );
        assert_eq!(floor.len(), 1);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut floor = Floor::new(1, 1);
        let id = placed(&mut floor, 0, 0);
        let mut dup = Room::new(id, RoomType::Normal, 15, 9);
        dup.set_grid_position(1, 0);
        assert_eq!(floor.insert(dup), Err(PlacementError::DuplicateId(id)));
    }

    #[test]
    fn test_connect_is_reciprocal() {
        let mut floor = Floor::new(1, 1);
        let a = placed(&mut floor, 0, 0);
        let b = placed(&mut floor, 1, 0);
        assert!(floor.connect(a, DoorDirection::East, b));

        let door_a = floor.room(a).unwrap().door(DoorDirection::East).unwrap();
        let door_b = floor.room(b).unwrap().door(DoorDirection::West).unwrap();
        assert_eq!(door_a.target_room, Some(b));
        assert_eq!(door_b.target_room, Some(a));
    }

    #[test]
    fn test_connect_missing_room() {
        let mut floor = Floor::new(1, 1);
        let a = placed(&mut floor, 0, 0);
        assert!(!floor.connect(a, DoorDirection::East, RoomId(999)));
    }

    #[test]
    fn test_serde_rebuilds_indexes() {
        let mut floor = Floor::new(7, 2);
        let a = placed(&mut floor, 0, 0);
        let b = placed(&mut floor, 0, 1);
        floor.connect(a, DoorDirection::South, b);
        floor.start_room = Some(a);

        let json = serde_json::to_string(&floor).unwrap();
        let restored: Floor = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.seed, 7);
        assert_eq!(restored.floor_number, 2);
        assert_eq!(restored.room_at(0, 1).unwrap().id, b);
        assert_eq!(
            restored.room(a).unwrap().door(DoorDirection::South).unwrap().target_room,
            Some(b)
        );
    }
}
