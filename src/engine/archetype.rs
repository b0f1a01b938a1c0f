//! Archetype identity and the deduplicated archetype set.
//!
//! An [`Archetype`] is the exact set of component ids an entity carries,
//! stored as an ascending-sorted, duplicate-free sequence. Keeping the
//! sequence sorted makes equality O(n), hashing deterministic, membership a
//! binary search, and fixes the column order of every table to the id order.
//!
//! [`Archetypes`] is the world's insertion-ordered, deduplicated mapping from
//! archetype to table. Archetype indices are handed out in insertion order
//! and stay valid for the lifetime of the world; the set is never compacted.
//! The only removal is the ordered rollback of a freshly inserted entry, used
//! when the mutation that created it fails before any index escapes.

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::engine::component::ComponentRegistry;
use crate::engine::table::Table;
use crate::engine::types::{ArchetypeID, ComponentID};

/// An ordered set of distinct component ids, sorted ascending.
///
/// Operations that derive a new set ([`Archetype::with_added`],
/// [`Archetype::with_removed`]) are value-semantic: the result is owned
/// independently of the input.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Archetype {
    ids: SmallVec<[ComponentID; 8]>,
}

impl Archetype {
    /// The empty archetype (entities with no components).
    pub fn empty() -> Self {
        Self { ids: SmallVec::new() }
    }

    /// Builds an archetype from a list of component ids.
    ///
    /// The ids are sorted ascending.
    ///
    /// ## Panics
    /// Panics if the list contains a duplicate id (e.g. a spawn tuple naming
    /// the same component type twice).
    pub fn from_ids(ids: &[ComponentID]) -> Self {
        let mut sorted: SmallVec<[ComponentID; 8]> = SmallVec::from_slice(ids);
        sorted.sort_unstable();
        for pair in sorted.windows(2) {
            assert!(
                pair[0] != pair[1],
                "duplicate component id {} in archetype",
                pair[0]
            );
        }
        Self { ids: sorted }
    }

    /// Number of component ids in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` for the empty archetype.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The ids in ascending order.
    #[inline]
    pub fn ids(&self) -> &[ComponentID] {
        &self.ids
    }

    /// O(log n) membership test.
    #[inline]
    pub fn contains(&self, component_id: ComponentID) -> bool {
        self.ids.binary_search(&component_id).is_ok()
    }

    /// Returns a new set with `component_id` inserted at its sorted position.
    ///
    /// ## Panics
    /// Panics if the id is already present.
    pub fn with_added(&self, component_id: ComponentID) -> Self {
        let position = match self.ids.binary_search(&component_id) {
            Err(position) => position,
            Ok(_) => panic!("component id {component_id} already present in archetype"),
        };

        let mut ids = self.ids.clone();
        ids.insert(position, component_id);
        Self { ids }
    }

    /// Returns a new set with `component_id` removed.
    ///
    /// ## Panics
    /// Panics if the id is absent.
    pub fn with_removed(&self, component_id: ComponentID) -> Self {
        let position = match self.ids.binary_search(&component_id) {
            Ok(position) => position,
            Err(_) => panic!("component id {component_id} not present in archetype"),
        };

        let mut ids = self.ids.clone();
        ids.remove(position);
        Self { ids }
    }
}

/// One archetype together with its table.
pub(crate) struct ArchetypeEntry {
    pub(crate) archetype: Archetype,
    pub(crate) table: Table,
}

/// The world's deduplicated, insertion-ordered archetype set.
pub struct Archetypes {
    entries: Vec<ArchetypeEntry>,
    by_key: AHashMap<Archetype, ArchetypeID>,
}

impl Archetypes {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_key: AHashMap::new(),
        }
    }

    /// Number of archetypes created so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no archetype has been created yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The archetype stored at `id`.
    #[inline]
    pub fn archetype(&self, id: ArchetypeID) -> &Archetype {
        &self.entries[id as usize].archetype
    }

    /// The table stored at `id`.
    #[inline]
    pub fn table(&self, id: ArchetypeID) -> &Table {
        &self.entries[id as usize].table
    }

    /// Mutable access to the table stored at `id`.
    #[inline]
    pub fn table_mut(&mut self, id: ArchetypeID) -> &mut Table {
        &mut self.entries[id as usize].table
    }

    /// All entries in insertion order, for bulk iteration.
    #[inline]
    pub(crate) fn entries_mut(&mut self) -> &mut [ArchetypeEntry] {
        &mut self.entries
    }

    /// Looks up `archetype`, inserting a new entry on miss by cloning the
    /// borrowed key.
    ///
    /// Used when the caller holds a stack-built archetype (e.g. a spawn
    /// tuple's). Returns the stable index and whether the entry was created
    /// by this call.
    pub fn ensure(
        &mut self,
        archetype: &Archetype,
        registry: &ComponentRegistry,
    ) -> (ArchetypeID, bool) {
        if let Some(&id) = self.by_key.get(archetype) {
            return (id, false);
        }
        (self.insert(archetype.clone(), registry), true)
    }

    /// Looks up `archetype`, taking ownership; on hit the duplicate is
    /// dropped, on miss it is stored directly.
    pub fn ensure_owned(
        &mut self,
        archetype: Archetype,
        registry: &ComponentRegistry,
    ) -> (ArchetypeID, bool) {
        if let Some(&id) = self.by_key.get(&archetype) {
            return (id, false);
        }
        (self.insert(archetype, registry), true)
    }

    fn insert(&mut self, archetype: Archetype, registry: &ComponentRegistry) -> ArchetypeID {
        let id = self.entries.len() as ArchetypeID;
        // Column order follows the archetype's id iteration order.
        let table = Table::for_archetype(&archetype, registry);
        self.by_key.insert(archetype.clone(), id);
        self.entries.push(ArchetypeEntry { archetype, table });
        id
    }

    /// Removes the most recently inserted entry.
    ///
    /// Used to keep a failed mutation atomic: the entry must be the last one,
    /// must hold no rows, and no index to it may have escaped.
    pub fn rollback_insert(&mut self, id: ArchetypeID) {
        assert_eq!(
            id as usize,
            self.entries.len() - 1,
            "only the most recent archetype entry can be rolled back"
        );
        let entry = self.entries.pop().expect("archetype set is empty");
        debug_assert!(entry.table.is_empty(), "cannot roll back a populated table");
        self.by_key.remove(&entry.archetype);
    }

    /// Mutable access to two distinct tables at once.
    ///
    /// ## Panics
    /// Panics if `a == b`.
    pub fn pair_mut(&mut self, a: ArchetypeID, b: ArchetypeID) -> (&mut Table, &mut Table) {
        assert!(a != b, "source and destination archetype must differ");
        let (low, high) = if a < b { (a, b) } else { (b, a) };

        let (head, tail) = self.entries.split_at_mut(high as usize);
        let low_table = &mut head[low as usize].table;
        let high_table = &mut tail[0].table;
        if a < b {
            (low_table, high_table)
        } else {
            (high_table, low_table)
        }
    }
}

impl Default for Archetypes {
    fn default() -> Self {
        Self::new()
    }
}
