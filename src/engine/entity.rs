//! Entity identity, lifecycle, and the generational directory.
//!
//! ## Entity Model
//! An [`Entity`] is a compact, versioned handle composed of:
//!
//! - An **index**, identifying the slot within the directory
//! - A **generation**, used to detect stale or recycled handles
//!
//! This layout allows fast validation and prevents use-after-free bugs when
//! entities are despawned and their slots reused.
//!
//! ## Directory
//! [`Entities`] maps each live handle to its [`EntityLocation`] (archetype
//! index and row). Each slot carries a generation counter outside its
//! occupied/free state, and free slots thread a LIFO free list through the
//! directory itself.
//!
//! ## Invariants
//! - A handle is alive iff its index is in range, its generation matches the
//!   slot's, and the slot is occupied.
//! - The stored location always reflects the entity's actual table row;
//!   structural moves update it in the same operation.
//! - Despawning bumps the slot generation **before** the slot is freed, so
//!   every previously issued handle for that slot stops matching.
//! - Generations wrap modulo their bit width; a slot despawned
//!   2^`GENERATION_BITS` times can produce an ABA collision.

use crate::engine::error::CapacityError;
use crate::engine::types::{
    ArchetypeID, EntityID, GenerationID, IndexID, RowID, GENERATION_MASK, INDEX_BITS, INDEX_CAP,
    INDEX_MASK,
};

/// Opaque, versioned identifier for an ECS entity.
///
/// Two handles with the same index but different generations are distinct.
/// `Entity` values are cheap to copy and compare.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Entity(pub EntityID);

#[inline]
const fn make_id(index: IndexID, generation: GenerationID) -> EntityID {
    ((generation as EntityID) << INDEX_BITS) | (index as EntityID)
}

#[inline]
fn make_entity(index: IndexID, generation: GenerationID) -> Entity {
    debug_assert!((index as EntityID) <= INDEX_MASK);
    debug_assert!((generation as EntityID) <= GENERATION_MASK);
    Entity(make_id(index, generation))
}

#[inline]
const fn split_entity(entity: Entity) -> (IndexID, GenerationID) {
    let id = entity.0;
    ((id & INDEX_MASK) as IndexID, (id >> INDEX_BITS) as GenerationID)
}

impl Entity {
    /// Returns the `(index, generation)` components of this handle.
    #[inline]
    pub fn components(self) -> (IndexID, GenerationID) {
        split_entity(self)
    }

    /// Returns the directory index encoded in this handle.
    #[inline]
    pub fn index(self) -> IndexID {
        (self.0 & INDEX_MASK) as IndexID
    }

    /// Returns the generation encoded in this handle.
    #[inline]
    pub fn generation(self) -> GenerationID {
        (self.0 >> INDEX_BITS) as GenerationID
    }
}

/// Physical storage location of an entity.
///
/// ## Invariants
/// - Must always reflect the true location of the entity's component row.
/// - Updated in the same operation as any table row move.
/// - Invalidated immediately on despawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntityLocation {
    /// Archetype containing the entity.
    pub archetype: ArchetypeID,

    /// Row index within the archetype's table.
    pub row: RowID,
}

enum SlotPayload {
    Occupied(EntityLocation),
    Free { next: Option<IndexID> },
}

struct Slot {
    generation: GenerationID,
    payload: SlotPayload,
}

/// Generational slot directory mapping entity handles to table locations.
///
/// ## Design
/// - Slots are allocated from a LIFO free list threaded through the free
///   slots themselves, or appended when the list is empty.
/// - Generations are bumped on despawn to invalidate stale handles.
#[derive(Default)]
pub struct Entities {
    slots: Vec<Slot>,
    free_head: Option<IndexID>,
}

impl Entities {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of slots ever created (live and free).
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Allocates a slot for a new entity at `location`.
    ///
    /// ## Behavior
    /// - Pops the free-list head if available; the slot keeps the generation
    ///   it received at its last despawn.
    /// - Otherwise appends a fresh slot with generation 0.
    ///
    /// ## Errors
    /// Returns `CapacityError` once the index space is exhausted.
    pub fn allocate(&mut self, location: EntityLocation) -> Result<Entity, CapacityError> {
        if let Some(index) = self.free_head {
            let slot = &mut self.slots[index as usize];
            let next = match slot.payload {
                SlotPayload::Free { next } => next,
                SlotPayload::Occupied(_) => unreachable!("occupied slot on the free list"),
            };
            self.free_head = next;
            slot.payload = SlotPayload::Occupied(location);
            return Ok(make_entity(index, slot.generation));
        }

        let index = self.slots.len();
        if index > INDEX_CAP as usize {
            return Err(CapacityError {
                entities_needed: index as u64 + 1,
                capacity: INDEX_CAP as u64 + 1,
            });
        }

        self.slots.push(Slot {
            generation: 0,
            payload: SlotPayload::Occupied(location),
        });
        Ok(make_entity(index as IndexID, 0))
    }

    /// Returns a slot allocated by [`Entities::allocate`] whose handle never
    /// escaped the failed operation.
    ///
    /// The generation is left untouched, so the slot's next occupant reuses
    /// the handle the failed operation discarded.
    pub fn rollback_allocate(&mut self, entity: Entity) {
        let (index, generation) = split_entity(entity);
        let slot = &mut self.slots[index as usize];
        debug_assert_eq!(slot.generation, generation, "rollback of a foreign handle");
        debug_assert!(
            matches!(slot.payload, SlotPayload::Occupied(_)),
            "rollback of a free slot"
        );

        slot.payload = SlotPayload::Free { next: self.free_head };
        self.free_head = Some(index);
    }

    /// Destroys an entity and invalidates its handle.
    ///
    /// ## Behavior
    /// - Verifies the handle's generation against the slot.
    /// - Bumps the slot generation (wrapping in its bit width), then links
    ///   the slot onto the free list.
    ///
    /// ## Returns
    /// The vacated location if the entity was alive, `None` if the handle
    /// was stale or invalid.
    pub fn despawn(&mut self, entity: Entity) -> Option<EntityLocation> {
        let (index, generation) = split_entity(entity);
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != generation {
            return None;
        }

        let location = match slot.payload {
            SlotPayload::Occupied(location) => location,
            SlotPayload::Free { .. } => return None,
        };

        slot.generation = (slot.generation + 1) & GENERATION_MASK;
        slot.payload = SlotPayload::Free { next: self.free_head };
        self.free_head = Some(index);
        Some(location)
    }

    /// Returns `true` if the handle refers to a live entity.
    pub fn is_alive(&self, entity: Entity) -> bool {
        let (index, generation) = split_entity(entity);
        match self.slots.get(index as usize) {
            Some(slot) => {
                slot.generation == generation
                    && matches!(slot.payload, SlotPayload::Occupied(_))
            }
            None => false,
        }
    }

    /// Returns the location of a live entity.
    ///
    /// ## Panics
    /// Panics if the handle is stale or the slot is free.
    pub fn resolve(&self, entity: Entity) -> &EntityLocation {
        let (index, generation) = split_entity(entity);
        let slot = &self.slots[index as usize];
        assert_eq!(slot.generation, generation, "stale or dead entity handle");
        match &slot.payload {
            SlotPayload::Occupied(location) => location,
            SlotPayload::Free { .. } => panic!("stale or dead entity handle"),
        }
    }

    /// Updates the stored location for an entity.
    ///
    /// Caller must ensure the entity is alive and that `location` matches
    /// actual table storage.
    pub fn set_location(&mut self, entity: Entity, location: EntityLocation) {
        let (index, generation) = split_entity(entity);
        debug_assert!(
            self.is_alive(entity),
            "set_location on a dead or stale entity {entity:?} (generation {generation})"
        );
        if let Some(slot) = self.slots.get_mut(index as usize) {
            if let SlotPayload::Occupied(stored) = &mut slot.payload {
                *stored = location;
            }
        }
    }
}
