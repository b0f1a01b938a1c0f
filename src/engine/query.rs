//! Bulk iteration over archetype tables.
//!
//! A view tuple such as `(&mut Position, &Velocity)` names the components a
//! sweep needs and how it accesses them. [`World::iter`] resolves the tuple's
//! component ids once, then walks tables in archetype-insertion order: a
//! table missing **any** required column is skipped, a matching table yields
//! one tuple of typed slices, each of the table's row count.
//!
//! The match is "has all of": entities whose archetype carries additional
//! components still appear. There is no exclude filter.
//!
//! ## Safety model
//!
//! The iterator exclusively borrows the world, so no structural mutation can
//! run while any yielded slice is live. Within one pass:
//!
//! - every table is visited at most once, so slices from different `next`
//!   calls never alias, and
//! - the view tuple's component ids are asserted pairwise distinct at
//!   construction, so slices within one tuple come from distinct columns.
//!
//! [`World::iter`]: crate::engine::world::World::iter

use std::marker::PhantomData;
use std::ptr::NonNull;
use std::slice;

use smallvec::SmallVec;

use crate::engine::archetype::ArchetypeEntry;
use crate::engine::component::{Component, ComponentRegistry};
use crate::engine::table::Table;
use crate::engine::types::ComponentID;

/// One field of a view tuple: a shared or exclusive borrow of a component
/// column, projected as a typed slice.
pub trait ColumnView<'w> {
    /// The slice type this view yields (`&[T]` or `&mut [T]`).
    type Slice;

    /// Resolves the viewed component's id.
    ///
    /// ## Panics
    /// Panics if the component type is unregistered.
    fn component_id(registry: &ComponentRegistry) -> ComponentID;

    /// Builds the typed slice over a column's buffer.
    ///
    /// ## Safety
    /// `base` must be the base pointer of a column created for this view's
    /// component type, holding at least `len` initialized elements, and the
    /// aliasing rules of the produced slice must hold for `'w`.
    unsafe fn project(base: NonNull<u8>, len: usize) -> Self::Slice;
}

impl<'w, T: Component> ColumnView<'w> for &'w T {
    type Slice = &'w [T];

    fn component_id(registry: &ComponentRegistry) -> ComponentID {
        registry.require_id_of::<T>()
    }

    unsafe fn project(base: NonNull<u8>, len: usize) -> &'w [T] {
        unsafe { slice::from_raw_parts(base.as_ptr() as *const T, len) }
    }
}

impl<'w, T: Component> ColumnView<'w> for &'w mut T {
    type Slice = &'w mut [T];

    fn component_id(registry: &ComponentRegistry) -> ComponentID {
        registry.require_id_of::<T>()
    }

    unsafe fn project(base: NonNull<u8>, len: usize) -> &'w mut [T] {
        unsafe { slice::from_raw_parts_mut(base.as_ptr() as *mut T, len) }
    }
}

/// A tuple of [`ColumnView`]s projected together against one table.
///
/// Implemented for tuples of 1 to 8 views.
pub trait TableView<'w> {
    /// The tuple of slices yielded per matching table.
    type Slices;

    /// Resolves every field's component id, in field order.
    fn component_ids(registry: &ComponentRegistry) -> SmallVec<[ComponentID; 8]>;

    /// Projects the tuple against `table`, or `None` if the table lacks any
    /// required column.
    ///
    /// ## Safety
    /// `ids` must be this view's [`TableView::component_ids`] result and must
    /// be pairwise distinct; the produced slices alias nothing else for `'w`.
    unsafe fn project(table: &mut Table, ids: &[ComponentID]) -> Option<Self::Slices>;
}

macro_rules! impl_table_view {
    ($(($view:ident, $index:tt)),+) => {
        impl<'w, $($view: ColumnView<'w>),+> TableView<'w> for ($($view,)+) {
            type Slices = ($($view::Slice,)+);

            fn component_ids(registry: &ComponentRegistry) -> SmallVec<[ComponentID; 8]> {
                let mut ids = SmallVec::new();
                $( ids.push($view::component_id(registry)); )+
                ids
            }

            unsafe fn project(
                table: &mut Table,
                ids: &[ComponentID],
            ) -> Option<Self::Slices> {
                let count = table.count();
                Some((
                    $(
                        {
                            let column = table.column(ids[$index])?;
                            unsafe { $view::project(column.base_ptr(), count) }
                        },
                    )+
                ))
            }
        }
    };
}

impl_table_view!((A, 0));
impl_table_view!((A, 0), (B, 1));
impl_table_view!((A, 0), (B, 1), (C, 2));
impl_table_view!((A, 0), (B, 1), (C, 2), (D, 3));
impl_table_view!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4));
impl_table_view!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5));
impl_table_view!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6));
impl_table_view!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6), (H, 7));

/// Iterator over the tables matching a view tuple, in archetype-insertion
/// order.
///
/// Within a table, rows are in storage order, not entity-id order.
pub struct TableIter<'w, V: TableView<'w>> {
    entries: *mut ArchetypeEntry,
    len: usize,
    cursor: usize,
    ids: SmallVec<[ComponentID; 8]>,
    _marker: PhantomData<(&'w mut (), V)>,
}

impl<'w, V: TableView<'w>> TableIter<'w, V> {
    pub(crate) fn new(registry: &ComponentRegistry, entries: &'w mut [ArchetypeEntry]) -> Self {
        let ids = V::component_ids(registry);
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                assert!(
                    ids[i] != ids[j],
                    "view tuple names component id {} twice",
                    ids[i]
                );
            }
        }

        Self {
            entries: entries.as_mut_ptr(),
            len: entries.len(),
            cursor: 0,
            ids,
            _marker: PhantomData,
        }
    }
}

impl<'w, V: TableView<'w>> Iterator for TableIter<'w, V> {
    type Item = V::Slices;

    fn next(&mut self) -> Option<V::Slices> {
        while self.cursor < self.len {
            // Each table is visited exactly once, so slices handed out for
            // earlier tables never alias this one.
            let table = unsafe { &mut (*self.entries.add(self.cursor)).table };
            self.cursor += 1;

            if let Some(slices) = unsafe { V::project(table, &self.ids) } {
                return Some(slices);
            }
        }
        None
    }
}
