//! Incremental floor growth driven by player exploration.
//!
//! The manager places one room per door traversal, keeping a record of
//! pending doors (template slots whose far side does not exist yet).
//! Work is bounded by what the player actually explores; a floor that is
//! never walked stays a single start room.

use std::collections::{HashSet, VecDeque};

use delve_rng::SeededRandom;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::direction::DoorDirection;
use super::floor::Floor;
use super::registry::TemplateRegistry;
use super::room::{Room, RoomId, RoomType};
use super::template::Constraints;
use crate::events::DungeonEvent;

/// Past this many placed templates, repeats are allowed so a small
/// catalog cannot starve generation.
const USED_ID_LIMIT: usize = 10;

/// Probability that a freshly generated room is a treasure or shop
/// instead of a normal room, once the floor has more than two rooms.
const SPECIAL_ROOM_CHANCE: f64 = 0.15;

/// Parameters for incremental generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveParams {
    /// Seed for all derived randomness; `None` seeds from the clock.
    #[serde(default)]
    pub seed: Option<u64>,
    pub floor_number: u32,
    /// Boss forcing threshold: the room generated when the count reaches
    /// `max_rooms - 1` is the boss.
    pub max_rooms: usize,
}

impl Default for LiveParams {
    fn default() -> Self {
        Self {
            seed: None,
            floor_number: 1,
            max_rooms: 12,
        }
    }
}

/// Lifecycle of the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    /// No start room yet; only `initialize` is meaningful.
    Initializing,
    /// Start room placed; traversals grow the floor.
    Exploring,
}

/// Grows a floor graph one room per traversed door.
///
/// The registry is owned by the surrounding session and borrowed here;
/// there is no global template state.
pub struct LiveDungeonManager<'a> {
    registry: &'a TemplateRegistry,
    rng: SeededRandom,
    floor: Floor,
    state: ManagerState,
    /// Doors awaiting their target room, keyed by room and wall.
    pending: HashSet<(RoomId, DoorDirection)>,
    boss_placed: bool,
    used_template_ids: Vec<String>,
    current_room: Option<RoomId>,
    max_rooms: usize,
    events: VecDeque<DungeonEvent>,
}

impl<'a> LiveDungeonManager<'a> {
    pub fn new(registry: &'a TemplateRegistry, params: &LiveParams) -> Self {
        let seed = params.seed.unwrap_or_else(|| SeededRandom::from_time().seed());
        Self {
            registry,
            rng: SeededRandom::new(seed),
            floor: Floor::new(seed, params.floor_number),
            state: ManagerState::Initializing,
            pending: HashSet::new(),
            boss_placed: false,
            used_template_ids: Vec::new(),
            current_room: None,
            max_rooms: params.max_rooms.max(2),
            events: VecDeque::new(),
        }
    }

    /// Place the start room at the grid origin. Returns its id, or
    /// `None` when the catalog offers no start template (the manager
    /// stays in `Initializing` and can be retried after a catalog fix).
    pub fn initialize(&mut self) -> Option<RoomId> {
        if self.state != ManagerState::Initializing {
            warn!("initialize called twice");
            return self.floor.start_room;
        }

        let constraints = Constraints {
            required_type: Some(RoomType::Start),
            floor_number: Some(self.floor.floor_number),
            ..Default::default()
        };
        // Validation guarantees every registered template has at least
        // one door slot, so any match can seed exploration.
        let template = self.registry.find_matching(&constraints, &mut self.rng)?.clone();

        let id = self.floor.allocate_id();
        let mut room = Room::from_template(id, &template);
        room.set_grid_position(0, 0);
        // Slots become doors immediately; a null target marks them
        // unconnected until traversal resolves them.
        for slot in &template.door_slots {
            room.add_door(slot.direction, None);
        }
        room.visit();
        let id = match self.floor.insert(room) {
            Ok(id) => id,
            Err(err) => {
                warn!("start room rejected: {err}");
                return None;
            }
        };
        self.floor.start_room = Some(id);
        self.used_template_ids.push(template.id.clone());
        for slot in &template.door_slots {
            self.pending.insert((id, slot.direction));
        }
        self.current_room = Some(id);
        self.state = ManagerState::Exploring;
        self.events.push_back(DungeonEvent::RoomEntered { room: id });
        debug!("live floor initialized with template '{}'", template.id);
        Some(id)
    }

    /// Traverse the door leaving `from_room` through `direction`.
    ///
    /// Generates the room on the far side if the door was pending,
    /// reuses an existing room when the traversal loops back onto an
    /// occupied cell, and returns `None` without mutating anything for a
    /// door that is neither. A failed template query also returns `None`
    /// and leaves the door pending for a later retry.
    pub fn enter_door(&mut self, from_room: RoomId, direction: DoorDirection) -> Option<RoomId> {
        if self.state != ManagerState::Exploring {
            warn!("enter_door before initialize");
            return None;
        }
        let (from_x, from_y) = {
            let room = self.floor.room(from_room)?;
            (room.grid_x, room.grid_y)
        };
        let (dx, dy) = direction.delta();
        let (target_x, target_y) = (from_x + dx, from_y + dy);
        let occupant = self.floor.room_at(target_x, target_y).map(|r| r.id);

        if !self.pending.contains(&(from_room, direction)) {
            // No pending record: either the far room already exists (a
            // loop back through another path) or the traversal is bogus.
            return match occupant {
                Some(existing) => {
                    self.connect_resolving_pending(from_room, direction, existing);
                    self.move_into(existing);
                    Some(existing)
                }
                None => {
                    warn!("invalid traversal: {from_room} has no {direction} door");
                    None
                }
            };
        }

        // A pending door can still land on an occupied cell when another
        // exploration path claimed it first; connect instead of placing.
        if let Some(existing) = occupant {
            self.connect_resolving_pending(from_room, direction, existing);
            self.move_into(existing);
            return Some(existing);
        }

        let room_type = self.choose_room_type();
        let constraints = self.build_constraints(room_type);
        let template = match self.registry.find_for_door(direction, &constraints, &mut self.rng) {
            Some(t) => t.clone(),
            None => {
                // Retry once with the type requirement relaxed; on
                // continued failure the door stays pending. The relaxed
                // query must never produce a unique room type: a boss
                // that slips in here would break the one-boss invariant,
                // and a second start room makes no sense at all.
                let relaxed = Constraints {
                    required_type: None,
                    excluded_types: vec![RoomType::Start, RoomType::Boss],
                    ..constraints
                };
                match self.registry.find_for_door(direction, &relaxed, &mut self.rng) {
                    Some(t) => t.clone(),
                    None => {
                        warn!("no template fits {direction} traversal from {from_room}");
                        return None;
                    }
                }
            }
        };

        let id = self.floor.allocate_id();
        let mut room = Room::from_template(id, &template);
        room.set_grid_position(target_x, target_y);
        for slot in &template.door_slots {
            room.add_door(slot.direction, None);
        }
        let id = match self.floor.insert(room) {
            Ok(id) => id,
            Err(err) => {
                warn!("generated room rejected: {err}");
                return None;
            }
        };
        self.pending.remove(&(from_room, direction));
        self.floor.connect(from_room, direction, id);
        self.used_template_ids.push(template.id.clone());
        if template.room_type == RoomType::Boss {
            self.boss_placed = true;
        }

        // Remaining slots either become pending or, when they face an
        // already-occupied cell, connect immediately. This is what lets
        // the graph form cycles instead of staying a tree.
        let entry_wall = direction.opposite();
        for slot in &template.door_slots {
            if slot.direction == entry_wall {
                continue;
            }
            let (sx, sy) = slot.direction.delta();
            let neighbor = self.floor.room_at(target_x + sx, target_y + sy).map(|r| r.id);
            match neighbor {
                Some(neighbor_id) => {
                    self.connect_resolving_pending(id, slot.direction, neighbor_id)
                }
                None => {
                    self.pending.insert((id, slot.direction));
                }
            }
        }

        self.move_into(id);
        Some(id)
    }

    /// Resolve the current room's encounter: mark it cleared, unlock its
    /// doors, and emit a room-cleared notification.
    pub fn clear_current_room(&mut self) {
        let Some(id) = self.current_room else {
            return;
        };
        if let Some(room) = self.floor.room_mut(id) {
            room.clear();
            self.events.push_back(DungeonEvent::RoomCleared { room: id });
        }
    }

    /// True once no pending doors remain anywhere on the floor.
    pub fn is_fully_explored(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn state(&self) -> ManagerState {
        self.state
    }

    pub fn current_room(&self) -> Option<RoomId> {
        self.current_room
    }

    pub fn floor(&self) -> &Floor {
        &self.floor
    }

    /// Doors still awaiting a target room.
    pub fn pending_doors(&self) -> impl Iterator<Item = (RoomId, DoorDirection)> + '_ {
        self.pending.iter().copied()
    }

    /// Drain all queued notifications, oldest first.
    pub fn take_events(&mut self) -> Vec<DungeonEvent> {
        self.events.drain(..).collect()
    }

    /// Boss forcing plus the occasional reward room; everything else is
    /// a normal combat room.
    fn choose_room_type(&mut self) -> RoomType {
        if !self.boss_placed && self.floor.len() >= self.max_rooms - 1 {
            return RoomType::Boss;
        }
        if self.floor.len() > 2 && self.rng.chance(SPECIAL_ROOM_CHANCE) {
            if self.rng.chance(0.5) {
                return RoomType::Treasure;
            }
            return RoomType::Shop;
        }
        RoomType::Normal
    }

    fn build_constraints(&self, room_type: RoomType) -> Constraints {
        let floor = self.floor.floor_number;
        // Once the catalog has been cycled past the repeat limit,
        // exclusion would starve selection; allow repeats instead.
        let used = if self.used_template_ids.len() > USED_ID_LIMIT {
            Vec::new()
        } else {
            self.used_template_ids.clone()
        };
        Constraints {
            required_door: None, // find_for_door fills this in
            required_type: Some(room_type),
            floor_number: Some(floor),
            min_difficulty: Some(floor.saturating_sub(1).max(1)),
            max_difficulty: Some(floor + 2),
            used_room_ids: used,
            ..Default::default()
        }
    }

    /// Connect two rooms and retire any pending record either side held
    /// for the shared wall, so each pending door resolves exactly once.
    fn connect_resolving_pending(&mut self, a: RoomId, direction: DoorDirection, b: RoomId) {
        self.floor.connect(a, direction, b);
        self.pending.remove(&(a, direction));
        self.pending.remove(&(b, direction.opposite()));
    }

    /// Shared arrival handling for new and revisited rooms.
    fn move_into(&mut self, id: RoomId) {
        if let Some(room) = self.floor.room_mut(id) {
            room.visit();
            if room.room_type == RoomType::Normal && !room.is_cleared() {
                room.lock_doors();
            }
        }
        self.current_room = Some(id);
        self.events.push_back(DungeonEvent::RoomEntered { room: id });
    }
}
