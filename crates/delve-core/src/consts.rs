//! Shared dungeon constants.
//!
//! Grid cells have a fixed world-space footprint regardless of a room's
//! interior tile dimensions, so wall-midpoint doors of adjacent rooms
//! always line up when rendered.

/// World-space size of one tile, in render units.
pub const TILE_SIZE: f32 = 32.0;

/// Default interior dimensions (in tiles) for generator-built rooms.
pub const DEFAULT_ROOM_WIDTH: usize = 15;
pub const DEFAULT_ROOM_HEIGHT: usize = 9;

/// World-space footprint of one grid cell.
pub const CELL_WIDTH: f32 = DEFAULT_ROOM_WIDTH as f32 * TILE_SIZE;
pub const CELL_HEIGHT: f32 = DEFAULT_ROOM_HEIGHT as f32 * TILE_SIZE;

/// Tile ids used by generator-built rooms; catalogs may define more.
pub const TILE_FLOOR: i32 = 0;
pub const TILE_WALL: i32 = 1;

/// Sentinel returned by out-of-bounds tile reads.
pub const TILE_OUT_OF_BOUNDS: i32 = -1;

/// A room has at most one door per wall.
pub const MAX_DOORS: usize = 4;
