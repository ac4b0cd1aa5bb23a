//! Room templates and the constraint query object.
//!
//! Templates are authored data (typically loaded from JSON once at
//! startup) matched against `Constraints` to produce placed rooms.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use thiserror::Error;

use super::direction::DoorDirection;
use super::room::RoomType;

/// Size class used by constraint queries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SizeCategory {
    Small = 0,
    #[default]
    Medium = 1,
    Large = 2,
    Huge = 3,
}

/// What an entity spawn marker produces.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SpawnKind {
    Enemy = 0,
    Chest = 1,
    Npc = 2,
    Boss = 3,
    Decoration = 4,
}

/// Authored spawn marker, in tile coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: usize,
    pub y: usize,
    pub kind: SpawnKind,
}

/// A template's potential connection point; becomes a `Door` once the
/// template is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorSlot {
    pub direction: DoorDirection,
    /// Tile offset along the wall.
    pub position: usize,
    /// Required slots must resolve to an instantiated door.
    #[serde(default)]
    pub required: bool,
}

fn default_weight() -> f64 {
    1.0
}

fn default_difficulty() -> u32 {
    1
}

/// An author-defined room layout plus the metadata constraint queries
/// match against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomTemplate {
    pub id: String,
    pub room_type: RoomType,
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub size: SizeCategory,
    pub door_slots: Vec<DoorSlot>,
    /// Tile matrix, row-major `[y][x]`.
    pub tiles: Vec<Vec<i32>>,
    #[serde(default)]
    pub spawn_points: Vec<SpawnPoint>,
    #[serde(default = "default_difficulty")]
    pub difficulty: u32,
    /// Lowest floor this template may appear on, if bounded.
    #[serde(default)]
    pub min_floor: Option<u32>,
    /// Highest floor this template may appear on, if bounded.
    #[serde(default)]
    pub max_floor: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Selection weight for weighted-random picks.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

/// Shape problems that make a template unusable. Catalog loading logs
/// these and skips the entry rather than aborting the whole load.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template has a blank id")]
    MissingId,

    #[error("template '{id}' has an empty tile matrix")]
    MissingTiles { id: String },

    #[error("template '{id}' tile matrix is {rows}x{cols}, declared {height}x{width}")]
    TileDimensionMismatch {
        id: String,
        rows: usize,
        cols: usize,
        height: usize,
        width: usize,
    },

    #[error("template '{id}' tile row {row} has ragged width")]
    RaggedTiles { id: String, row: usize },

    #[error("template '{id}' declares no door slots")]
    MissingDoorSlots { id: String },

    #[error("template '{id}' has a {direction} slot positioned off the wall")]
    SlotOffWall {
        id: String,
        direction: DoorDirection,
    },
}

impl RoomTemplate {
    /// Shape validation performed at registration.
    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.id.trim().is_empty() {
            return Err(TemplateError::MissingId);
        }
        if self.tiles.is_empty() || self.tiles[0].is_empty() {
            return Err(TemplateError::MissingTiles {
                id: self.id.clone(),
            });
        }
        let cols = self.tiles[0].len();
        for (row, r) in self.tiles.iter().enumerate() {
            if r.len() != cols {
                return Err(TemplateError::RaggedTiles {
                    id: self.id.clone(),
                    row,
                });
            }
        }
        if self.tiles.len() != self.height || cols != self.width {
            return Err(TemplateError::TileDimensionMismatch {
                id: self.id.clone(),
                rows: self.tiles.len(),
                cols,
                height: self.height,
                width: self.width,
            });
        }
        if self.door_slots.is_empty() {
            return Err(TemplateError::MissingDoorSlots {
                id: self.id.clone(),
            });
        }
        for slot in &self.door_slots {
            let wall_len = match slot.direction {
                DoorDirection::North | DoorDirection::South => self.width,
                DoorDirection::East | DoorDirection::West => self.height,
            };
            if slot.position >= wall_len {
                return Err(TemplateError::SlotOffWall {
                    id: self.id.clone(),
                    direction: slot.direction,
                });
            }
        }
        Ok(())
    }

    /// Whether the template offers a slot on `direction`'s wall.
    pub fn has_slot(&self, direction: DoorDirection) -> bool {
        self.door_slots.iter().any(|s| s.direction == direction)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Query object for template selection. Unset fields do not constrain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Constraints {
    /// Wall the candidate must offer a slot on. Set on every traversal
    /// query; `None` only for the initial start-room pick.
    pub required_door: Option<DoorDirection>,
    pub allowed_sizes: Option<Vec<SizeCategory>>,
    pub required_type: Option<RoomType>,
    /// Types the candidate must not be. Used by relaxed retries so a
    /// failed typed query cannot fall back onto a unique room type.
    #[serde(default)]
    pub excluded_types: Vec<RoomType>,
    pub min_difficulty: Option<u32>,
    pub max_difficulty: Option<u32>,
    pub floor_number: Option<u32>,
    #[serde(default)]
    pub required_tags: Vec<String>,
    #[serde(default)]
    pub excluded_tags: Vec<String>,
    /// Template ids already placed this floor, excluded to avoid repeats.
    #[serde(default)]
    pub used_room_ids: Vec<String>,
}

impl Constraints {
    /// The matching predicate: every set clause must hold.
    pub fn matches(&self, template: &RoomTemplate) -> bool {
        if let Some(dir) = self.required_door {
            if !template.has_slot(dir) {
                return false;
            }
        }
        if let Some(sizes) = &self.allowed_sizes {
            if !sizes.contains(&template.size) {
                return false;
            }
        }
        if let Some(ty) = self.required_type {
            if template.room_type != ty {
                return false;
            }
        }
        if self.excluded_types.contains(&template.room_type) {
            return false;
        }
        if let Some(min) = self.min_difficulty {
            if template.difficulty < min {
                return false;
            }
        }
        if let Some(max) = self.max_difficulty {
            if template.difficulty > max {
                return false;
            }
        }
        // The floor window only applies when the template bounds both ends.
        if let (Some(floor), Some(min_floor), Some(max_floor)) =
            (self.floor_number, template.min_floor, template.max_floor)
        {
            if floor < min_floor || floor > max_floor {
                return false;
            }
        }
        if !self.required_tags.iter().all(|t| template.has_tag(t)) {
            return false;
        }
        if self.excluded_tags.iter().any(|t| template.has_tag(t)) {
            return false;
        }
        if self.used_room_ids.iter().any(|id| *id == template.id) {
            return false;
        }
        true
    }
}
