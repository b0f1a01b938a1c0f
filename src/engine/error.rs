//! Error types for world mutation and column storage.
//!
//! This module declares focused, composable error types used across the
//! storage and mutation pipeline. Each error carries enough context to make
//! failures actionable while remaining small and cheap to pass around or
//! convert into the aggregate [`EcsError`].
//!
//! ## Failure classes
//!
//! Only two kinds of failure are *returned*:
//!
//! * [`OutOfMemoryError`] — a column or table could not grow its backing
//!   allocation. Every mutating operation that can hit this leaves the world
//!   exactly as it was before the call.
//! * [`CapacityError`] — the entity directory's index space is exhausted.
//!
//! Everything else (unregistered component types, stale handles passed to
//! operations that assert liveness, adding a component an entity already has,
//! duplicate component types in a spawn tuple) is a programmer error and
//! asserts rather than returning.
//!
//! ## Display vs. Debug
//!
//! * [`fmt::Display`] is optimized for operator logs (short, imperative
//!   phrasing).
//! * [`fmt::Debug`] (derived) retains full structure for diagnostics.

use std::fmt;

/// Returned when a backing allocation could not be grown.
///
/// The failing operation is atomic: partially grown columns are rolled back
/// and directory or archetype bookkeeping performed on its behalf is undone,
/// so the world observes no change.
///
/// ### Fields
/// * `requested_bytes` — Size of the allocation that the allocator refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfMemoryError {
    /// Size in bytes of the refused allocation.
    pub requested_bytes: usize,
}

impl fmt::Display for OutOfMemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "out of memory ({} bytes requested)", self.requested_bytes)
    }
}

impl std::error::Error for OutOfMemoryError {}

/// Returned when the system cannot satisfy a request to create additional
/// entities because the directory's index space is exhausted.
///
/// ### Fields
/// * `entities_needed` — Total number of slots the operation attempted to
///   occupy.
/// * `capacity` — The index-space bound that prevented the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityError {
    /// Total slots the operation attempted to occupy.
    pub entities_needed: u64,

    /// Index-space capacity limiting the operation.
    pub capacity: u64,
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "entity limit reached ({} needed; capacity {})",
            self.entities_needed, self.capacity
        )
    }
}

impl std::error::Error for CapacityError {}

/// Aggregate error for world mutation.
///
/// `From<T>` conversions allow `?` from low-level operations while callers
/// still match on a single, expressive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcsError {
    /// A backing allocation could not be grown.
    OutOfMemory(OutOfMemoryError),

    /// The entity directory's index space is exhausted.
    Capacity(CapacityError),
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::OutOfMemory(e) => write!(f, "{e}"),
            EcsError::Capacity(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EcsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EcsError::OutOfMemory(e) => Some(e),
            EcsError::Capacity(e) => Some(e),
        }
    }
}

impl From<OutOfMemoryError> for EcsError {
    fn from(e: OutOfMemoryError) -> Self { EcsError::OutOfMemory(e) }
}

impl From<CapacityError> for EcsError {
    fn from(e: CapacityError) -> Self { EcsError::Capacity(e) }
}

/// Result alias for world mutation operations.
pub type EcsResult<T> = Result<T, EcsError>;
