//! Per-archetype row storage.
//!
//! A [`Table`] holds every entity of one archetype as parallel columns, one
//! per component id, plus a vector of entity handles. Columns are kept in
//! ascending component-id order, mirroring the archetype's id order, so a
//! column lookup is a binary search and bulk iteration walks columns in a
//! deterministic order.
//!
//! ## Invariants
//! - Every column's `len` equals `count`, as does the entity vector's length.
//! - Row `r` of every column belongs to the entity at `entities[r]`.
//! - Rows are densely packed; removal is swap-remove in lock-step across all
//!   columns and the entity vector.

use crate::engine::archetype::Archetype;
use crate::engine::component::ComponentRegistry;
use crate::engine::entity::Entity;
use crate::engine::error::EcsResult;
use crate::engine::storage::Column;
use crate::engine::types::{ComponentID, RowID};

/// Struct-of-arrays storage for all entities sharing one archetype.
pub struct Table {
    count: usize,
    columns: Vec<(ComponentID, Column)>,
    entities: Vec<Entity>,
}

impl Table {
    /// Creates a table with zero columns and zero rows (the empty archetype).
    pub fn empty() -> Self {
        Self {
            count: 0,
            columns: Vec::new(),
            entities: Vec::new(),
        }
    }

    /// Creates a table with one empty column per component id of
    /// `archetype`, in the archetype's id order.
    ///
    /// ## Panics
    /// Panics if any id in the archetype was never registered.
    pub fn for_archetype(archetype: &Archetype, registry: &ComponentRegistry) -> Self {
        let mut columns = Vec::with_capacity(archetype.len());
        for id in archetype.ids() {
            columns.push((*id, Column::new(registry.desc(*id))));
        }

        Self {
            count: 0,
            columns,
            entities: Vec::new(),
        }
    }

    /// Number of rows currently stored.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns `true` if the table holds no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Entity handles in row order.
    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Looks up the column for `component_id`, if this table stores it.
    #[inline]
    pub fn column(&self, component_id: ComponentID) -> Option<&Column> {
        self.columns
            .binary_search_by_key(&component_id, |(id, _)| *id)
            .ok()
            .map(|i| &self.columns[i].1)
    }

    /// Mutable column lookup.
    #[inline]
    pub fn column_mut(&mut self, component_id: ComponentID) -> Option<&mut Column> {
        self.columns
            .binary_search_by_key(&component_id, |(id, _)| *id)
            .ok()
            .map(|i| &mut self.columns[i].1)
    }

    /// Appends a row for `entity`.
    ///
    /// Every column reserves one uninitialized (debug-poisoned) slot; the
    /// caller must write each column's row before it is read. On growth
    /// failure, columns grown so far are rolled back and the table is
    /// unchanged.
    pub fn add_row(&mut self, entity: Entity) -> EcsResult<RowID> {
        let row = self.count as RowID;
        for i in 0..self.columns.len() {
            if let Err(e) = self.columns[i].1.add_one() {
                for j in 0..i {
                    self.columns[j].1.swap_remove(row);
                }
                return Err(e.into());
            }
        }

        self.entities.push(entity);
        self.count += 1;
        Ok(row)
    }

    /// Removes `row` from every column and the entity vector in lock-step.
    ///
    /// Returns the entity that was swapped into `row`, or `None` if the
    /// removed row was the last.
    pub fn swap_remove_row(&mut self, row: RowID) -> Option<Entity> {
        debug_assert!((row as usize) < self.count, "row {row} out of range");

        for (_, column) in &mut self.columns {
            column.swap_remove(row);
        }
        self.entities.swap_remove(row as usize);
        self.count -= 1;

        if (row as usize) < self.count {
            Some(self.entities[row as usize])
        } else {
            None
        }
    }

    /// Appends a new row copying, for every component id present in both
    /// tables, the byte slot of `src`'s row into this table.
    ///
    /// Columns present here but absent in `src` are left uninitialized for
    /// the caller to write; columns present only in `src` are simply not
    /// copied. The entity handle is copied. On growth failure, columns grown
    /// so far are rolled back and this table is unchanged.
    pub fn copy_row_from(&mut self, src: &Table, row: RowID) -> EcsResult<RowID> {
        debug_assert!((row as usize) < src.count, "source row {row} out of range");

        let new_row = self.count as RowID;
        for i in 0..self.columns.len() {
            let id = self.columns[i].0;
            match self.columns[i].1.add_one() {
                Ok(slot) => {
                    if let Some(src_column) = src.column(id) {
                        slot.copy_from_slice(src_column.slot(row));
                    }
                }
                Err(e) => {
                    for j in 0..i {
                        self.columns[j].1.swap_remove(new_row);
                    }
                    return Err(e.into());
                }
            }
        }

        self.entities.push(src.entities[row as usize]);
        self.count += 1;
        Ok(new_row)
    }

    /// Copies `bytes` into the slot of `component_id` at `row`.
    ///
    /// ## Panics
    /// Panics if the table lacks the column or `bytes` is not exactly the
    /// component's size.
    pub fn write(&mut self, row: RowID, component_id: ComponentID, bytes: &[u8]) {
        let column = self
            .column_mut(component_id)
            .expect("component id not present in this table");
        assert_eq!(
            bytes.len(),
            column.item_size(),
            "component byte length mismatch for id {component_id}"
        );
        column.slot_mut(row).copy_from_slice(bytes);
    }
}
