//! # Archway
//!
//! Archetype-based Entity-Component-System (ECS) core: an in-memory data
//! store that groups entities by the exact set of component types they carry
//! and lays each group out as a struct-of-arrays table for cache-friendly
//! bulk iteration.
//!
//! ## Design Goals
//! - Archetype tables with type-erased, alignment-aware columns
//! - Generational entity handles that survive table reorganization
//! - Structural transitions as whole-row moves between tables
//! - Single-threaded, lock-free core with explicit failure atomicity
//!
//! ## Quick start
//!
//! ```
//! use archway::prelude::*;
//!
//! #[derive(Clone, Copy)]
//! struct Position { x: f32, y: f32 }
//! #[derive(Clone, Copy)]
//! struct Velocity { dx: f32, dy: f32 }
//!
//! let mut world = World::new();
//! world.register_component::<Position>();
//! world.register_component::<Velocity>();
//!
//! let entity = world
//!     .spawn_with((Position { x: 0.0, y: 0.0 }, Velocity { dx: 1.0, dy: 1.0 }))
//!     .unwrap();
//!
//! for (positions, velocities) in world.iter::<(&mut Position, &Velocity)>() {
//!     for (position, velocity) in positions.iter_mut().zip(velocities) {
//!         position.x += velocity.dx;
//!         position.y += velocity.dy;
//!     }
//! }
//!
//! assert_eq!(world.get::<Position>(entity).unwrap().x, 1.0);
//! ```

#![forbid(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

pub mod engine;
pub mod profiling;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (Public API)
// ─────────────────────────────────────────────────────────────────────────────

pub use engine::world::World;

pub use engine::entity::{Entities, Entity, EntityLocation};

pub use engine::component::{Bundle, Component, ComponentDesc, ComponentRegistry};

pub use engine::archetype::{Archetype, Archetypes};

pub use engine::storage::Column;
pub use engine::table::Table;

pub use engine::query::{ColumnView, TableIter, TableView};

pub use engine::error::{CapacityError, EcsError, EcsResult, OutOfMemoryError};

pub use engine::types::{ArchetypeID, ComponentID, EntityID, RowID};

// ─────────────────────────────────────────────────────────────────────────────
// Prelude (Optional but recommended)
// ─────────────────────────────────────────────────────────────────────────────

/// Commonly used ECS types.
///
/// Import with:
/// ```rust
/// use archway::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Component,
        EcsError,
        EcsResult,
        Entity,
        World,
    };
}
