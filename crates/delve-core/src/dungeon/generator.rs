//! Eager floor generation: a whole connected graph in one pass.
//!
//! A frontier random walk places normal rooms around the start, the boss
//! lands next to the room furthest from the start (Manhattan distance),
//! and a final pass installs doors between every pair of grid-adjacent
//! rooms, not only the pairs the walk linked.

use delve_rng::SeededRandom;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::direction::DoorDirection;
use super::floor::Floor;
use super::room::{Room, RoomId, RoomType};
use crate::consts::{DEFAULT_ROOM_HEIGHT, DEFAULT_ROOM_WIDTH};

/// Parameters for eager generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Seed for all derived randomness; `None` seeds from the clock.
    #[serde(default)]
    pub seed: Option<u64>,
    pub floor_number: u32,
    /// Bounds on the walked room count (start plus normals); the boss
    /// room is placed on top of this.
    pub min_rooms: usize,
    pub max_rooms: usize,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            seed: None,
            floor_number: 1,
            min_rooms: 6,
            max_rooms: 10,
        }
    }
}

fn place_room(floor: &mut Floor, room_type: RoomType, x: i32, y: i32) -> Option<RoomId> {
    let id = floor.allocate_id();
    let mut room = Room::new(id, room_type, DEFAULT_ROOM_WIDTH, DEFAULT_ROOM_HEIGHT);
    room.set_grid_position(x, y);
    match floor.insert(room) {
        Ok(id) => Some(id),
        Err(err) => {
            // Callers check occupancy first, so this is unreachable in
            // practice; degrade instead of crashing.
            warn!("room placement rejected at ({x}, {y}): {err}");
            None
        }
    }
}

/// Generate a complete floor. Identical parameters (seed included) yield
/// an identical graph.
pub fn generate_floor(params: &GenerationParams) -> Floor {
    let seed = params.seed.unwrap_or_else(|| SeededRandom::from_time().seed());
    let mut rng = SeededRandom::new(seed);
    let mut floor = Floor::new(seed, params.floor_number);

    // int_between(min > max) is undefined, so guard the bounds here.
    let lo = params.min_rooms.max(1);
    let hi = params.max_rooms.max(lo);
    let target = rng.int_between(lo as i32, hi as i32) as usize;

    let start_id = match place_room(&mut floor, RoomType::Start, 0, 0) {
        Some(id) => id,
        None => return floor,
    };
    floor.start_room = Some(start_id);

    frontier_walk(&mut floor, &mut rng, target);
    place_boss(&mut floor, &mut rng);
    connect_adjacent(&mut floor);

    debug!(
        "generated floor {} with {} rooms (seed {seed})",
        params.floor_number,
        floor.len()
    );
    floor
}

/// Grow the floor to `target` rooms by repeatedly popping a random
/// frontier cell. Entries can be stale (pushed by several neighbors, or
/// occupied since); those are skipped, not re-rolled.
fn frontier_walk(floor: &mut Floor, rng: &mut SeededRandom, target: usize) {
    let mut frontier: Vec<(i32, i32)> = Vec::new();
    push_unoccupied_neighbors(floor, 0, 0, &mut frontier);

    while floor.len() < target {
        if frontier.is_empty() {
            // Tolerated: the caller gets a smaller floor than requested.
            warn!(
                "frontier exhausted at {} of {target} rooms",
                floor.len()
            );
            break;
        }
        let idx = rng.int_between(0, frontier.len() as i32 - 1) as usize;
        let (x, y) = frontier.swap_remove(idx);
        if floor.is_occupied(x, y) {
            continue;
        }
        if place_room(floor, RoomType::Normal, x, y).is_some() {
            push_unoccupied_neighbors(floor, x, y, &mut frontier);
        }
    }
}

fn push_unoccupied_neighbors(
    floor: &Floor,
    x: i32,
    y: i32,
    frontier: &mut Vec<(i32, i32)>,
) {
    for dir in DoorDirection::ALL {
        let (dx, dy) = dir.delta();
        let cell = (x + dx, y + dy);
        if !floor.is_occupied(cell.0, cell.1) {
            frontier.push(cell);
        }
    }
}

/// Place the boss next to the room with the greatest Manhattan distance
/// from the start (first found on ties). If all four neighbor cells are
/// taken, the furthest room itself is re-flagged as the boss room.
fn place_boss(floor: &mut Floor, rng: &mut SeededRandom) {
    let mut furthest: Option<(RoomId, i32, i32, i32)> = None;
    for room in floor.rooms() {
        let dist = room.grid_x.abs() + room.grid_y.abs();
        // Strictly greater keeps the first room on ties.
        if furthest.map_or(true, |(_, _, _, best)| dist > best) {
            furthest = Some((room.id, room.grid_x, room.grid_y, dist));
        }
    }
    let Some((furthest_id, fx, fy, _)) = furthest else {
        return;
    };

    let mut dirs = DoorDirection::ALL;
    rng.shuffle(&mut dirs);
    for dir in dirs {
        let (dx, dy) = dir.delta();
        let (x, y) = (fx + dx, fy + dy);
        if !floor.is_occupied(x, y) {
            floor.boss_room = place_room(floor, RoomType::Boss, x, y);
            return;
        }
    }

    // Landlocked furthest room; flag it rather than fail the floor.
    warn!("no free cell adjacent to furthest room, flagging {furthest_id} as boss");
    if let Some(room) = floor.room_mut(furthest_id) {
        room.room_type = RoomType::Boss;
    }
    floor.boss_room = Some(furthest_id);
}

/// Install reciprocal doors between every pair of grid-adjacent rooms
/// that do not already share one.
fn connect_adjacent(floor: &mut Floor) {
    let placed: Vec<(RoomId, i32, i32)> = floor
        .rooms()
        .iter()
        .map(|r| (r.id, r.grid_x, r.grid_y))
        .collect();
    for (id, x, y) in placed {
        for dir in DoorDirection::ALL {
            let (dx, dy) = dir.delta();
            let neighbor = floor.room_at(x + dx, y + dy).map(|r| r.id);
            if let Some(neighbor_id) = neighbor {
                let already = floor
                    .room(id)
                    .is_some_and(|r| r.door(dir).is_some_and(|d| d.target_room.is_some()));
                if !already {
                    floor.connect(id, dir, neighbor_id);
                }
            }
        }
    }
}
