//! The world façade.
//!
//! [`World`] owns the component registry, the entity directory, and the
//! archetype set, and exposes the public mutation and read surface: spawning,
//! despawning, component add/del/put/set/get (typed and type-erased), and
//! bulk iteration.
//!
//! ## Structural transitions
//!
//! Adding or removing a component moves the entity's whole row between
//! tables:
//!
//! 1. the destination table appends a copy of the columns both archetypes
//!    share,
//! 2. the source table swap-removes the old row,
//! 3. if another entity was swapped into the vacated row, its directory entry
//!    is fixed,
//! 4. the moving entity's directory entry is pointed at the new row.
//!
//! The order is load-bearing: until step 2 completes, the mover's directory
//! entry still points into the source table.
//!
//! ## Failure atomicity
//!
//! Every mutating operation that can fail with `OutOfMemory` or `Capacity`
//! leaves the world as if the call never happened: partially grown columns
//! are rolled back by the table layer, directory slots allocated on behalf of
//! the failed call are returned unbumped, and an archetype entry inserted by
//! the failed call is removed again (ordered removal; its index never
//! escaped).
//!
//! ## Borrows and invalidation
//!
//! `get`/`get_raw` pointers and iteration slices borrow the world; any
//! structural mutation requires `&mut World` and therefore cannot overlap
//! them.

use std::ptr::NonNull;

use crate::engine::archetype::{Archetype, Archetypes};
use crate::engine::component::{component_bytes, Bundle, Component, ComponentRegistry};
use crate::engine::entity::{Entities, Entity, EntityLocation};
use crate::engine::error::EcsResult;
use crate::engine::query::{TableIter, TableView};
use crate::engine::types::{ArchetypeID, ComponentID, RowID};
use crate::profiling;

/// The central container for entities, components, and archetype tables.
pub struct World {
    registry: ComponentRegistry,
    entities: Entities,
    archetypes: Archetypes,
}

impl World {
    /// Creates an empty world with no registered components.
    pub fn new() -> Self {
        Self {
            registry: ComponentRegistry::new(),
            entities: Entities::new(),
            archetypes: Archetypes::new(),
        }
    }

    /// Registers component type `T`, returning its id.
    ///
    /// Registration is idempotent: the second call for the same type returns
    /// the same id and the stored descriptor is untouched. Ids are dense,
    /// minted in registration order, and never recycled for the lifetime of
    /// the world.
    pub fn register_component<T: Component>(&mut self) -> ComponentID {
        self.registry.register::<T>()
    }

    /// Returns the id of a registered component type. Never registers.
    pub fn component_id<T: Component>(&self) -> Option<ComponentID> {
        self.registry.id_of::<T>()
    }

    /// The world's component registry.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Returns `true` if `entity` refers to a live entity.
    ///
    /// Stale handles return `false`; this never asserts.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Spawns an entity with no components.
    ///
    /// Ensures the empty archetype exists, allocates a directory slot, and
    /// appends an empty row.
    pub fn spawn(&mut self) -> EcsResult<Entity> {
        let _span = profiling::span("World::spawn");

        let (archetype_id, created) = self
            .archetypes
            .ensure_owned(Archetype::empty(), &self.registry);
        self.spawn_into(archetype_id, created)
    }

    /// Spawns an entity carrying the bundle's component values.
    ///
    /// The bundle's field types must be pre-registered and pairwise distinct
    /// (both asserted). The archetype is built from the field ids, the
    /// matching table is found or created, and each field's bytes are written
    /// into its column at the new row.
    pub fn spawn_with<B: Bundle>(&mut self, bundle: B) -> EcsResult<Entity> {
        let _span = profiling::span("World::spawn_with");

        let ids = B::component_ids(&self.registry);
        let archetype = Archetype::from_ids(&ids);
        let (archetype_id, created) = self.archetypes.ensure(&archetype, &self.registry);

        let entity = self.spawn_into(archetype_id, created)?;
        let row = self.entities.resolve(entity).row;
        let table = self.archetypes.table_mut(archetype_id);
        bundle.for_each_bytes(&self.registry, |id, bytes| table.write(row, id, bytes));
        Ok(entity)
    }

    /// Allocates a directory slot pointing at the next row of
    /// `archetype_id`'s table, then appends the row.
    ///
    /// `created` marks an archetype entry inserted on behalf of this call,
    /// to be rolled back on failure.
    fn spawn_into(&mut self, archetype_id: ArchetypeID, created: bool) -> EcsResult<Entity> {
        let row = self.archetypes.table(archetype_id).count() as RowID;
        let location = EntityLocation { archetype: archetype_id, row };

        let entity = match self.entities.allocate(location) {
            Ok(entity) => entity,
            Err(e) => {
                if created {
                    self.archetypes.rollback_insert(archetype_id);
                }
                return Err(e.into());
            }
        };

        if let Err(e) = self.archetypes.table_mut(archetype_id).add_row(entity) {
            self.entities.rollback_allocate(entity);
            if created {
                self.archetypes.rollback_insert(archetype_id);
            }
            return Err(e);
        }

        Ok(entity)
    }

    /// Destroys an entity.
    ///
    /// Stale handles are a silent no-op. Otherwise the entity's row is
    /// swap-removed from its table, the swapped-in entity's directory row is
    /// fixed, and the slot's generation is bumped before it joins the free
    /// list, so every outstanding handle for it stops matching.
    pub fn despawn(&mut self, entity: Entity) {
        let _span = profiling::span("World::despawn");

        let Some(location) = self.entities.despawn(entity) else {
            return;
        };

        let table = self.archetypes.table_mut(location.archetype);
        if let Some(swapped) = table.swap_remove_row(location.row) {
            self.entities.set_location(swapped, location);
        }
    }

    /// Adds component `T` to a live entity.
    ///
    /// ## Panics
    /// Panics if the entity is stale, `T` is unregistered, or the entity
    /// already has the component.
    pub fn add<T: Component>(&mut self, entity: Entity, value: T) -> EcsResult<()> {
        let component_id = self.registry.require_id_of::<T>();
        self.add_raw(entity, component_id, component_bytes(&value))
    }

    /// Type-erased [`World::add`]: `bytes` must be exactly the component's
    /// size and a valid object representation of it.
    pub fn add_raw(
        &mut self,
        entity: Entity,
        component_id: ComponentID,
        bytes: &[u8],
    ) -> EcsResult<()> {
        let _span = profiling::span("World::add");

        let location = *self.entities.resolve(entity);
        let source = self.archetypes.archetype(location.archetype);
        assert!(
            !source.contains(component_id),
            "entity already has component {}",
            self.registry.desc(component_id).name
        );

        let target = source.with_added(component_id);
        let (target_id, created) = self.archetypes.ensure_owned(target, &self.registry);

        if let Err(e) = self.move_row(entity, location, target_id) {
            if created {
                self.archetypes.rollback_insert(target_id);
            }
            return Err(e);
        }

        let row = self.entities.resolve(entity).row;
        self.archetypes
            .table_mut(target_id)
            .write(row, component_id, bytes);
        Ok(())
    }

    /// Removes component `T` from a live entity.
    ///
    /// A no-op if the entity does not have the component.
    ///
    /// ## Panics
    /// Panics if the entity is stale or `T` is unregistered.
    pub fn del<T: Component>(&mut self, entity: Entity) -> EcsResult<()> {
        let component_id = self.registry.require_id_of::<T>();
        self.del_raw(entity, component_id)
    }

    /// Type-erased [`World::del`].
    pub fn del_raw(&mut self, entity: Entity, component_id: ComponentID) -> EcsResult<()> {
        let _span = profiling::span("World::del");

        let location = *self.entities.resolve(entity);
        let source = self.archetypes.archetype(location.archetype);
        if !source.contains(component_id) {
            return Ok(());
        }

        let target = source.with_removed(component_id);
        let (target_id, created) = self.archetypes.ensure_owned(target, &self.registry);

        if let Err(e) = self.move_row(entity, location, target_id) {
            if created {
                self.archetypes.rollback_insert(target_id);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Writes component `T` on a live entity, adding it first if absent.
    pub fn put<T: Component>(&mut self, entity: Entity, value: T) -> EcsResult<()> {
        let component_id = self.registry.require_id_of::<T>();
        self.put_raw(entity, component_id, component_bytes(&value))
    }

    /// Type-erased [`World::put`].
    pub fn put_raw(
        &mut self,
        entity: Entity,
        component_id: ComponentID,
        bytes: &[u8],
    ) -> EcsResult<()> {
        let location = *self.entities.resolve(entity);
        if self.archetypes.archetype(location.archetype).contains(component_id) {
            self.archetypes
                .table_mut(location.archetype)
                .write(location.row, component_id, bytes);
            Ok(())
        } else {
            self.add_raw(entity, component_id, bytes)
        }
    }

    /// Overwrites component `T` on a live entity in place.
    ///
    /// ## Panics
    /// Panics if the entity is stale, `T` is unregistered, or the entity
    /// lacks the component.
    pub fn set<T: Component>(&mut self, entity: Entity, value: T) {
        let component_id = self.registry.require_id_of::<T>();
        self.set_raw(entity, component_id, component_bytes(&value));
    }

    /// Type-erased [`World::set`]: `bytes` must be exactly the component's
    /// size.
    pub fn set_raw(&mut self, entity: Entity, component_id: ComponentID, bytes: &[u8]) {
        let location = *self.entities.resolve(entity);
        assert!(
            self.archetypes.archetype(location.archetype).contains(component_id),
            "entity lacks component {}",
            self.registry.desc(component_id).name
        );
        self.archetypes
            .table_mut(location.archetype)
            .write(location.row, component_id, bytes);
    }

    /// Reads component `T` from a live entity.
    ///
    /// Returns `None` if the entity's archetype lacks the component. The
    /// borrow is invalidated by the next structural mutation, which the
    /// `&self` receiver enforces.
    ///
    /// ## Panics
    /// Panics if the entity is stale or `T` is unregistered.
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        let component_id = self.registry.require_id_of::<T>();
        self.get_raw(entity, component_id)
            .map(|ptr| unsafe { &*(ptr.as_ptr() as *const T) })
    }

    /// Mutable [`World::get`].
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        let component_id = self.registry.require_id_of::<T>();
        self.get_raw(entity, component_id)
            .map(|ptr| unsafe { &mut *(ptr.as_ptr() as *mut T) })
    }

    /// Type-erased [`World::get`]: a raw pointer into the component's column
    /// slot, valid until the next structural mutation on this world.
    ///
    /// For zero-sized components the pointer is well-aligned and dangling.
    pub fn get_raw(&self, entity: Entity, component_id: ComponentID) -> Option<NonNull<u8>> {
        let location = *self.entities.resolve(entity);
        let table = self.archetypes.table(location.archetype);
        table
            .column(component_id)
            .map(|column| column.item_ptr(location.row))
    }

    /// Iterates all tables whose archetype contains every component named by
    /// the view tuple `V`, in archetype-insertion order.
    ///
    /// Each matching table yields one tuple of typed slices, all of the
    /// table's row count. The iterator exclusively borrows the world, so
    /// structural mutation during iteration is rejected at compile time.
    ///
    /// ## Panics
    /// Panics if any view type is unregistered or the tuple names the same
    /// component twice.
    pub fn iter<'w, V: TableView<'w>>(&'w mut self) -> TableIter<'w, V> {
        let _span = profiling::span("World::iter");
        TableIter::new(&self.registry, self.archetypes.entries_mut())
    }

    /// Moves `entity`'s row from its current table into `target`'s table.
    ///
    /// At entry the entity's directory entry still points into the source
    /// table at `location`.
    fn move_row(
        &mut self,
        entity: Entity,
        location: EntityLocation,
        target: ArchetypeID,
    ) -> EcsResult<()> {
        let (source_table, target_table) =
            self.archetypes.pair_mut(location.archetype, target);

        let new_row = target_table.copy_row_from(source_table, location.row)?;

        if let Some(swapped) = source_table.swap_remove_row(location.row) {
            self.entities.set_location(swapped, location);
        }
        self.entities.set_location(
            entity,
            EntityLocation { archetype: target, row: new_row },
        );
        Ok(())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
