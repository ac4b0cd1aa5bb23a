//! delve-core: procedural dungeon floor graphs.
//!
//! Builds the logical layout of a roguelike floor: grid-positioned rooms
//! connected by reciprocal directional doors, instantiated from a
//! constraint-matched template catalog, reproducible from an integer
//! seed. Rendering, physics, input and combat live elsewhere; this crate
//! only produces and mutates the graph and reports what happened.
//!
//! Everything is synchronous and single-owner: the registry, RNG and
//! floor are plain values owned by the caller, with no global state.

pub mod consts;
pub mod dungeon;
pub mod events;

pub use delve_rng::SeededRandom;
pub use events::DungeonEvent;
