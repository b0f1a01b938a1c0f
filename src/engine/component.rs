//! Component identity, descriptors, and the per-world registry.
//!
//! This module assigns stable [`ComponentID`] values to Rust component types
//! and records the per-type metadata (name, size, alignment) that column
//! storage needs to lay out type-erased buffers.
//!
//! ## Design
//! - Components are registered once per world and assigned a dense
//!   `ComponentID` in registration order.
//! - The registry is owned by the world; nothing in the core touches global
//!   state.
//! - IDs are never recycled. Tearing a component type back out of a world
//!   would require rewriting every archetype key and column order, and is
//!   deliberately unsupported.
//!
//! ## Invariants
//! - Every entry in `by_type` has a matching descriptor in `by_id`.
//! - `by_id[id].component_id == id` for all registered ids.

use std::any::{type_name, TypeId};
use std::fmt;
use std::mem::{align_of, size_of};

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::engine::types::ComponentID;

/// Marker trait for component types.
///
/// Components are plain values moved between type-erased buffers with
/// `memcpy`. The `Copy` bound encodes that contract: a component must be
/// trivially relocatable and must not own resources that need a destructor,
/// because column storage has no per-value drop hook. Types owning heap data
/// must be wrapped behind an index or handle instead.
///
/// Zero-sized types are valid components and never allocate column storage.
pub trait Component: Copy + Send + Sync + 'static {}

impl<T: Copy + Send + Sync + 'static> Component for T {}

/// Describes a registered component type.
///
/// ## Fields
/// - `component_id`: The runtime identifier assigned by the registry.
/// - `name`: The Rust type name (`type_name::<T>()`), for diagnostics.
/// - `type_id`: The runtime `TypeId` for the component.
/// - `size`: `size_of::<T>()` in bytes.
/// - `align`: `align_of::<T>()` in bytes (always a power of two).
///
/// ## Notes
/// `ComponentDesc` is `Copy` and safe to clone freely for reporting and
/// diagnostics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComponentDesc {
    /// Runtime identifier assigned to this component type.
    pub component_id: ComponentID,

    /// Rust type name for diagnostics.
    pub name: &'static str,

    /// Runtime `TypeId` of the component.
    pub type_id: TypeId,

    /// Size of the component type in bytes.
    pub size: usize,

    /// Alignment of the component type in bytes.
    pub align: usize,
}

impl ComponentDesc {
    /// Constructs a descriptor for type `T` using its `TypeId`, name, size,
    /// and alignment.
    ///
    /// ## Notes
    /// The returned descriptor uses `component_id = 0` and should be
    /// finalized via [`ComponentDesc::with_id`].
    #[inline]
    pub fn of<T: Component>() -> Self {
        Self {
            component_id: 0,
            name: type_name::<T>(),
            type_id: TypeId::of::<T>(),
            size: size_of::<T>(),
            align: align_of::<T>(),
        }
    }

    /// Returns `true` if this descriptor refers to type `T`.
    #[inline]
    pub fn matches_type<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Returns a copy of this descriptor with `component_id` set.
    #[inline]
    pub fn with_id(mut self, component_id: ComponentID) -> Self {
        self.component_id = component_id;
        self
    }
}

impl fmt::Display for ComponentDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ComponentDesc {{ id: {}, name: {}, size: {}, align: {} }}",
            self.component_id, self.name, self.size, self.align
        )
    }
}

/// Per-world mapping between Rust component types and compact
/// [`ComponentID`] values.
///
/// ## Design
/// - `by_type` maps `TypeId -> ComponentID`.
/// - `by_id` stores one [`ComponentDesc`] per id, indexed by `ComponentID`.
/// - New IDs are assigned sequentially; registration is idempotent per type.
#[derive(Default)]
pub struct ComponentRegistry {
    by_type: AHashMap<TypeId, ComponentID>,
    by_id: Vec<ComponentDesc>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers component type `T` and returns its assigned `ComponentID`.
    ///
    /// ## Behavior
    /// - If `T` is already registered, returns the existing ID and leaves the
    ///   stored descriptor untouched.
    /// - Otherwise mints the next sequential ID and records the descriptor.
    pub fn register<T: Component>(&mut self) -> ComponentID {
        let type_id = TypeId::of::<T>();
        if let Some(&existing) = self.by_type.get(&type_id) {
            return existing;
        }

        let id = self.by_id.len() as ComponentID;
        self.by_type.insert(type_id, id);
        self.by_id.push(ComponentDesc::of::<T>().with_id(id));
        id
    }

    /// Returns the `ComponentID` for `T`, if registered. Never creates.
    #[inline]
    pub fn id_of<T: Component>(&self) -> Option<ComponentID> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Returns the `ComponentID` for `T`.
    ///
    /// ## Panics
    /// Panics if `T` was never registered with this world.
    #[inline]
    pub fn require_id_of<T: Component>(&self) -> ComponentID {
        match self.id_of::<T>() {
            Some(id) => id,
            None => panic!(
                "component type {} was never registered with this world",
                type_name::<T>()
            ),
        }
    }

    /// Returns the descriptor for a registered `component_id`.
    ///
    /// ## Panics
    /// Panics if the id was never issued by this registry.
    #[inline]
    pub fn desc(&self, component_id: ComponentID) -> &ComponentDesc {
        &self.by_id[component_id as usize]
    }

    /// Number of registered component types.
    #[inline]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns `true` if no component types are registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Views a component value as its raw bytes for a column write.
///
/// Zero-sized components yield the empty slice.
#[inline]
pub(crate) fn component_bytes<T: Component>(value: &T) -> &[u8] {
    // Components are plain copyable data; their object representation is the
    // unit of exchange with erased columns.
    unsafe { std::slice::from_raw_parts(value as *const T as *const u8, size_of::<T>()) }
}

/// A statically typed group of component values used by `spawn_with`.
///
/// Implemented for tuples of 1 to 8 component types. The tuple's field types
/// must be pairwise distinct and pre-registered; both are asserted when the
/// spawn archetype is built.
pub trait Bundle {
    /// Component ids of the bundle's fields, in declaration order.
    fn component_ids(registry: &ComponentRegistry) -> SmallVec<[ComponentID; 8]>;

    /// Invokes `write` once per field with the field's component id and raw
    /// bytes, in declaration order.
    fn for_each_bytes(self, registry: &ComponentRegistry, write: impl FnMut(ComponentID, &[u8]));
}

macro_rules! impl_bundle_for_tuple {
    ($($field:ident),+) => {
        impl<$($field: Component),+> Bundle for ($($field,)+) {
            fn component_ids(registry: &ComponentRegistry) -> SmallVec<[ComponentID; 8]> {
                let mut ids = SmallVec::new();
                $( ids.push(registry.require_id_of::<$field>()); )+
                ids
            }

            #[allow(non_snake_case)]
            fn for_each_bytes(
                self,
                registry: &ComponentRegistry,
                mut write: impl FnMut(ComponentID, &[u8]),
            ) {
                let ($($field,)+) = self;
                $( write(registry.require_id_of::<$field>(), component_bytes(&$field)); )+
            }
        }
    };
}

impl_bundle_for_tuple!(A);
impl_bundle_for_tuple!(A, B);
impl_bundle_for_tuple!(A, B, C);
impl_bundle_for_tuple!(A, B, C, D);
impl_bundle_for_tuple!(A, B, C, D, E);
impl_bundle_for_tuple!(A, B, C, D, E, F);
impl_bundle_for_tuple!(A, B, C, D, E, F, G);
impl_bundle_for_tuple!(A, B, C, D, E, F, G, H);
