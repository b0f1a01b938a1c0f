//! Core ECS identifier types and bit-level layouts.
//!
//! This module defines the **fundamental types, identifiers, and bit layouts**
//! shared across all subsystems: entity management, archetypes, tables, and
//! iteration.
//!
//! ## Entity Representation
//!
//! Entities are encoded as a packed 32-bit integer with the following layout:
//!
//! ```text
//! | generation | index |
//! ```
//!
//! - **Index** identifies the slot within the entity directory.
//! - **Generation** enables stale-entity detection after despawning.
//!
//! The exact bit widths are controlled by compile-time constants and validated
//! using static assertions.
//!
//! ## Components and Archetypes
//!
//! Components are identified by compact [`ComponentID`] values assigned
//! sequentially at first registration. Archetypes are identified by
//! [`ArchetypeID`] values that index the world's archetype set in insertion
//! order and remain stable for the lifetime of the world.

/// Bit-width type used for compile-time layout calculations.
pub type Bits = u8;

/// Entity identifier encoded as a packed 32-bit value.
pub type EntityID = u32;
/// Index within the entity directory.
pub type IndexID = u32;
/// Generation counter used to detect stale entities.
pub type GenerationID = u32;

/// Total number of bits in an [`EntityID`].
pub const ENTITY_BITS: Bits = 32;
/// Number of bits reserved for the directory index.
pub const INDEX_BITS: Bits = 27;
/// Number of bits reserved for entity generations.
pub const GENERATION_BITS: Bits = ENTITY_BITS - INDEX_BITS;

const _: [(); 1] = [(); (INDEX_BITS > 0) as usize];
const _: [(); 1] = [(); (INDEX_BITS < ENTITY_BITS) as usize];
const _: [(); 1] = [(); (GENERATION_BITS > 0) as usize];

const fn mask(bits: Bits) -> EntityID {
    if bits == 0 { 0 } else { ((1 as EntityID) << bits) - 1 }
}

/// Mask selecting the index portion of an [`EntityID`].
pub const INDEX_MASK: EntityID = mask(INDEX_BITS);
/// Mask selecting the generation portion of an [`EntityID`] after shifting.
pub const GENERATION_MASK: EntityID = mask(GENERATION_BITS);
/// Maximum number of directory slots.
pub const INDEX_CAP: IndexID = INDEX_MASK as IndexID;

/// Unique identifier for a registered component type.
///
/// IDs are dense, assigned sequentially at first registration, and never
/// recycled for the lifetime of the world.
pub type ComponentID = u32;

/// Index of an archetype within the world's archetype set.
///
/// Stable for the lifetime of the world once issued; the archetype set is
/// never compacted.
pub type ArchetypeID = u32;

/// Row index of an entity within its table.
pub type RowID = u32;
