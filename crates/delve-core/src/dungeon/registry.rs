//! Template registry with constraint-satisfaction queries.
//!
//! The catalog is indexed three ways at registration: full list, by room
//! type, and by door direction (a template appears once under every
//! direction it offers a slot in). Queries narrow through the door index
//! first, then run the full predicate.

use std::collections::HashMap;

use delve_rng::SeededRandom;
use log::{debug, warn};
use thiserror::Error;

use super::direction::DoorDirection;
use super::room::RoomType;
use super::template::{Constraints, RoomTemplate, TemplateError};

/// The catalog file itself could not be read as structured data.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to parse template catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Indexed catalog of room templates.
///
/// Owned by a session/context object and passed by reference into the
/// generators; there is no global registry.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: Vec<RoomTemplate>,
    by_type: HashMap<RoomType, Vec<usize>>,
    by_door: HashMap<DoorDirection, Vec<usize>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and index one template.
    pub fn register(&mut self, template: RoomTemplate) -> Result<(), TemplateError> {
        template.validate()?;
        let idx = self.templates.len();
        self.by_type
            .entry(template.room_type)
            .or_default()
            .push(idx);
        for dir in DoorDirection::ALL {
            if template.has_slot(dir) {
                self.by_door.entry(dir).or_default().push(idx);
            }
        }
        self.templates.push(template);
        Ok(())
    }

    /// Register a whole catalog. Malformed entries are logged and
    /// skipped; the rest of the load proceeds. Returns how many entries
    /// were registered.
    pub fn register_catalog(&mut self, catalog: Vec<RoomTemplate>) -> usize {
        let mut registered = 0;
        for template in catalog {
            let id = template.id.clone();
            match self.register(template) {
                Ok(()) => registered += 1,
                Err(err) => warn!("skipping template '{id}': {err}"),
            }
        }
        registered
    }

    /// Build a registry from a JSON catalog (array of templates).
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Vec<RoomTemplate> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        let count = registry.register_catalog(catalog);
        debug!("template catalog loaded: {count} entries");
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&RoomTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoomTemplate> {
        self.templates.iter()
    }

    /// Number of templates of a given type.
    pub fn count_of_type(&self, room_type: RoomType) -> usize {
        self.by_type.get(&room_type).map_or(0, Vec::len)
    }

    /// Every template satisfying the constraints, in registration order.
    ///
    /// When a required door is set the door index narrows the candidate
    /// list before the predicate runs; queries without one scan the full
    /// catalog (only the initial start-room pick does this).
    pub fn find_all_matching(&self, constraints: &Constraints) -> Vec<&RoomTemplate> {
        match constraints.required_door {
            Some(dir) => self
                .by_door
                .get(&dir)
                .map(|indexes| {
                    indexes
                        .iter()
                        .map(|&i| &self.templates[i])
                        .filter(|t| constraints.matches(t))
                        .collect()
                })
                .unwrap_or_default(),
            None => self
                .templates
                .iter()
                .filter(|t| constraints.matches(t))
                .collect(),
        }
    }

    /// Weighted-random pick over the matching templates. `None` (with a
    /// logged warning) when nothing matches; callers decide whether to
    /// relax and retry.
    pub fn find_matching(
        &self,
        constraints: &Constraints,
        rng: &mut SeededRandom,
    ) -> Option<&RoomTemplate> {
        let matches = self.find_all_matching(constraints);
        if matches.is_empty() {
            warn!(
                "no template matches constraints (door {:?}, type {:?}, floor {:?})",
                constraints.required_door, constraints.required_type, constraints.floor_number
            );
            return None;
        }
        let weights: Vec<f64> = matches.iter().map(|t| t.weight).collect();
        rng.weighted_pick(&matches, &weights).copied()
    }

    /// Pick a template reachable through a door leaving in
    /// `from_direction`: the candidate must offer a slot on the opposite
    /// wall to connect back.
    pub fn find_for_door(
        &self,
        from_direction: DoorDirection,
        constraints: &Constraints,
        rng: &mut SeededRandom,
    ) -> Option<&RoomTemplate> {
        let mut c = constraints.clone();
        c.required_door = Some(from_direction.opposite());
        self.find_matching(&c, rng)
    }
}
