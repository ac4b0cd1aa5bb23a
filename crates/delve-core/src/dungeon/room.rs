//! Rooms and doors of the floor graph.
//!
//! A `Room` is one node on the grid: a tile matrix, up to four directional
//! doors, and visited/cleared state. Rooms are stored in a `Floor` arena
//! and referenced by `RoomId`.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::direction::DoorDirection;
use super::template::{RoomTemplate, SpawnPoint};
use crate::consts::{CELL_HEIGHT, CELL_WIDTH, TILE_FLOOR, TILE_OUT_OF_BOUNDS, TILE_WALL};

/// Unique id of a placed room within one floor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RoomId(pub u32);

impl core::fmt::Display for RoomId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "room#{}", self.0)
    }
}

/// Role of a room on the floor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum RoomType {
    /// Entry room of the floor, always at the grid origin.
    Start = 0,
    /// Ordinary combat room.
    #[default]
    Normal = 1,
    /// Loot room.
    Treasure = 2,
    /// Vendor room.
    Shop = 3,
    /// Floor-ending encounter; exactly one per floor.
    Boss = 4,
    /// Hidden room, reached through concealed doors.
    Secret = 5,
    /// Optional high-risk encounter.
    Challenge = 6,
    /// Junction room favoring many door slots.
    Hub = 7,
}

impl RoomType {
    /// All room types for iteration.
    pub const ALL: [RoomType; 8] = [
        RoomType::Start,
        RoomType::Normal,
        RoomType::Treasure,
        RoomType::Shop,
        RoomType::Boss,
        RoomType::Secret,
        RoomType::Challenge,
        RoomType::Hub,
    ];

    /// Reward rooms that never lock the player in.
    pub fn is_special(self) -> bool {
        matches!(self, RoomType::Treasure | RoomType::Shop | RoomType::Secret)
    }

    /// Types that appear at most once per floor.
    pub fn is_unique(self) -> bool {
        matches!(self, RoomType::Start | RoomType::Boss)
    }
}

bitflags! {
    /// Per-room state flags.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct RoomFlags: u8 {
        /// The player has entered this room at least once.
        const VISITED = 0x01;
        /// The room's encounter has been resolved; doors stay unlocked.
        const CLEARED = 0x02;
    }
}

impl Serialize for RoomFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RoomFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(RoomFlags::from_bits_truncate(bits))
    }
}

/// A directional doorway on a room's wall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Door {
    /// Which wall the door sits on.
    pub direction: DoorDirection,
    /// Room on the far side; `None` while the connection is pending.
    pub target_room: Option<RoomId>,
    pub locked: bool,
    pub open: bool,
    /// Room-local world offset of the wall midpoint. Because every grid
    /// cell has the same world footprint, the midpoints of two facing
    /// walls always coincide at the shared edge.
    pub position: (f32, f32),
}

/// Midpoint of a wall in room-local world units.
fn wall_midpoint(direction: DoorDirection) -> (f32, f32) {
    match direction {
        DoorDirection::North => (CELL_WIDTH / 2.0, 0.0),
        DoorDirection::South => (CELL_WIDTH / 2.0, CELL_HEIGHT),
        DoorDirection::East => (CELL_WIDTH, CELL_HEIGHT / 2.0),
        DoorDirection::West => (0.0, CELL_HEIGHT / 2.0),
    }
}

/// Default tile matrix: wall border, floor interior. Indexed `[y][x]`.
fn default_tiles(width: usize, height: usize) -> Vec<Vec<i32>> {
    (0..height)
        .map(|y| {
            (0..width)
                .map(|x| {
                    if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                        TILE_WALL
                    } else {
                        TILE_FLOOR
                    }
                })
                .collect()
        })
        .collect()
}

/// One placed room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub room_type: RoomType,
    /// Interior width in tiles.
    pub width: usize,
    /// Interior height in tiles.
    pub height: usize,
    pub grid_x: i32,
    pub grid_y: i32,
    /// Tile matrix, row-major `[y][x]`.
    tiles: Vec<Vec<i32>>,
    /// At most one door per wall.
    pub doors: Vec<Door>,
    pub flags: RoomFlags,
    /// Template this room was instantiated from, if any.
    pub template_id: Option<String>,
    pub spawn_points: Vec<SpawnPoint>,
    pub difficulty: u32,
}

impl Room {
    /// Create a room with the default generated layout.
    pub fn new(id: RoomId, room_type: RoomType, width: usize, height: usize) -> Self {
        Self {
            id,
            room_type,
            width,
            height,
            grid_x: 0,
            grid_y: 0,
            tiles: default_tiles(width, height),
            doors: Vec::new(),
            flags: RoomFlags::empty(),
            template_id: None,
            spawn_points: Vec::new(),
            difficulty: 1,
        }
    }

    /// Instantiate a room from a template, copying its layout and spawns.
    pub fn from_template(id: RoomId, template: &RoomTemplate) -> Self {
        Self {
            id,
            room_type: template.room_type,
            width: template.width,
            height: template.height,
            grid_x: 0,
            grid_y: 0,
            tiles: template.tiles.clone(),
            doors: Vec::new(),
            flags: RoomFlags::empty(),
            template_id: Some(template.id.clone()),
            spawn_points: template.spawn_points.clone(),
            difficulty: template.difficulty,
        }
    }

    /// Place the room on the grid.
    pub fn set_grid_position(&mut self, x: i32, y: i32) {
        self.grid_x = x;
        self.grid_y = y;
    }

    /// World-space origin derived from the grid position, for renderers.
    pub fn world_origin(&self) -> (f32, f32) {
        (
            self.grid_x as f32 * CELL_WIDTH,
            self.grid_y as f32 * CELL_HEIGHT,
        )
    }

    /// Add a door on `direction`'s wall, open and unlocked, positioned at
    /// the wall midpoint. If a door already exists there, only a newly
    /// known target is recorded; the door is never duplicated.
    pub fn add_door(&mut self, direction: DoorDirection, target: Option<RoomId>) {
        if let Some(door) = self.doors.iter_mut().find(|d| d.direction == direction) {
            if target.is_some() {
                door.target_room = target;
            }
            return;
        }
        self.doors.push(Door {
            direction,
            target_room: target,
            locked: false,
            open: true,
            position: wall_midpoint(direction),
        });
        debug_assert!(self.doors.len() <= crate::consts::MAX_DOORS);
    }

    /// The door on `direction`'s wall, if any.
    pub fn door(&self, direction: DoorDirection) -> Option<&Door> {
        self.doors.iter().find(|d| d.direction == direction)
    }

    pub fn door_mut(&mut self, direction: DoorDirection) -> Option<&mut Door> {
        self.doors.iter_mut().find(|d| d.direction == direction)
    }

    pub fn has_door(&self, direction: DoorDirection) -> bool {
        self.door(direction).is_some()
    }

    /// Lock every door at once (combat gating).
    pub fn lock_doors(&mut self) {
        for door in &mut self.doors {
            door.locked = true;
        }
    }

    /// Unlock every door at once.
    pub fn unlock_doors(&mut self) {
        for door in &mut self.doors {
            door.locked = false;
        }
    }

    /// Bounds-checked tile read; out of range yields the sentinel.
    pub fn tile(&self, x: usize, y: usize) -> i32 {
        if x < self.width && y < self.height {
            self.tiles[y][x]
        } else {
            TILE_OUT_OF_BOUNDS
        }
    }

    /// Bounds-checked tile write. Returns false (and writes nothing) out
    /// of range.
    pub fn set_tile(&mut self, x: usize, y: usize, value: i32) -> bool {
        if x < self.width && y < self.height {
            self.tiles[y][x] = value;
            true
        } else {
            false
        }
    }

    pub fn visit(&mut self) {
        self.flags.insert(RoomFlags::VISITED);
    }

    /// Resolve the room's encounter: mark cleared and unlock the doors.
    pub fn clear(&mut self) {
        self.flags.insert(RoomFlags::CLEARED);
        self.unlock_doors();
    }

    pub fn is_visited(&self) -> bool {
        self.flags.contains(RoomFlags::VISITED)
    }

    pub fn is_cleared(&self) -> bool {
        self.flags.contains(RoomFlags::CLEARED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> Room {
        Room::new(RoomId(1), RoomType::Normal, 15, 9)
    }

    #[test]
    fn test_default_layout_has_wall_border() {
        let r = room();
        assert_eq!(r.tile(0, 0), TILE_WALL);
        assert_eq!(r.tile(14, 8), TILE_WALL);
        assert_eq!(r.tile(7, 4), TILE_FLOOR);
    }

    #[test]
    fn test_tile_out_of_bounds_sentinel() {
        let mut r = room();
        assert_eq!(r.tile(15, 0), TILE_OUT_OF_BOUNDS);
        assert_eq!(r.tile(0, 9), TILE_OUT_OF_BOUNDS);
        assert!(!r.set_tile(99, 99, 5));
        assert!(r.set_tile(3, 3, 5));
        assert_eq!(r.tile(3, 3), 5);
    }

    #[test]
    fn test_add_door_places_wall_midpoint() {
        let mut r = room();
        r.add_door(DoorDirection::North, None);
        let door = r.door(DoorDirection::North).unwrap();
        assert_eq!(door.position, (CELL_WIDTH / 2.0, 0.0));
        assert!(door.open);
        assert!(!door.locked);
        assert_eq!(door.target_room, None);
    }

    #[test]
    fn test_add_door_twice_updates_target_without_duplicating() {
        let mut r = room();
        r.add_door(DoorDirection::East, None);
        r.add_door(DoorDirection::East, Some(RoomId(7)));
        assert_eq!(r.doors.len(), 1);
        assert_eq!(
            r.door(DoorDirection::East).unwrap().target_room,
            Some(RoomId(7))
        );
        // A second call without a target must not erase the known one.
        r.add_door(DoorDirection::East, None);
        assert_eq!(
            r.door(DoorDirection::East).unwrap().target_room,
            Some(RoomId(7))
        );
    }

    #[test]
    fn test_facing_door_midpoints_coincide_at_shared_edge() {
        let mut a = room();
        a.set_grid_position(0, 0);
        a.add_door(DoorDirection::East, None);
        let mut b = room();
        b.set_grid_position(1, 0);
        b.add_door(DoorDirection::West, None);

        let (ax, ay) = a.world_origin();
        let (bx, by) = b.world_origin();
        let da = a.door(DoorDirection::East).unwrap().position;
        let db = b.door(DoorDirection::West).unwrap().position;
        assert_eq!((ax + da.0, ay + da.1), (bx + db.0, by + db.1));
    }

    #[test]
    fn test_lock_unlock_all_doors() {
        let mut r = room();
        r.add_door(DoorDirection::North, None);
        r.add_door(DoorDirection::South, None);
        r.lock_doors();
        assert!(r.doors.iter().all(|d| d.locked));
        r.unlock_doors();
        assert!(r.doors.iter().all(|d| !d.locked));
    }

    #[test]
    fn test_clear_unlocks_doors() {
        let mut r = room();
        r.add_door(DoorDirection::West, None);
        r.lock_doors();
        assert!(!r.is_cleared());
        r.clear();
        assert!(r.is_cleared());
        assert!(!r.door(DoorDirection::West).unwrap().locked);
    }

    #[test]
    fn test_visit_flag() {
        let mut r = room();
        assert!(!r.is_visited());
        r.visit();
        assert!(r.is_visited());
    }

    #[test]
    fn test_world_origin_from_grid() {
        let mut r = room();
        r.set_grid_position(2, -1);
        assert_eq!(r.world_origin(), (2.0 * CELL_WIDTH, -CELL_HEIGHT));
    }
}
