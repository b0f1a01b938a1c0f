//! Type-erased column storage.
//!
//! A [`Column`] is a contiguous buffer of raw bytes holding `len` elements of
//! a single component type. The column knows only the element's size and
//! alignment, captured from a [`ComponentDesc`] at construction; all typed
//! interpretation happens at the edges, in the world façade and in iteration.
//!
//! ## Invariants
//! - `byte_capacity >= len * item_size`.
//! - The backing allocation's alignment equals `item_align` (a power of two).
//! - Capacity grows geometrically: `new = new + new/2 + 256` until the
//!   request is satisfied.
//! - Zero-size elements never allocate; their capacity is an unbounded
//!   sentinel and their pointers are well-aligned and dangling.
//!
//! ## Safety
//! Rows are moved with `memcpy`; elements must be trivially relocatable
//! (enforced by the `Copy` bound on [`Component`](crate::engine::component::Component)
//! at registration). Debug builds fill vacated and freshly reserved slots
//! with a sentinel byte pattern to surface use-after-remove and
//! read-before-write bugs.

use std::alloc::{self, Layout};
use std::ptr::NonNull;
use std::slice;

use crate::engine::component::ComponentDesc;
use crate::engine::error::OutOfMemoryError;
use crate::engine::types::RowID;

/// Sentinel byte pattern written over vacated and uninitialized slots in
/// debug builds.
#[cfg(debug_assertions)]
const SLOT_POISON: u8 = 0xAA;

/// Capacity sentinel for zero-size elements: the column can always hold one
/// more element without allocating.
const UNBOUNDED_CAP: usize = usize::MAX;

/// Type-erased contiguous storage for one component across all rows of a
/// table.
pub struct Column {
    data: NonNull<u8>,
    cap_bytes: usize,
    len: usize,
    item_size: usize,
    item_align: usize,
}

// A column owns its buffer outright; the component types stored in it are
// Send + Sync by the registration bound.
unsafe impl Send for Column {}
unsafe impl Sync for Column {}

impl Column {
    /// Creates an empty column for the described component type.
    ///
    /// Allocates nothing; captures the element size and alignment.
    ///
    /// ## Panics
    /// Panics if the descriptor's alignment is not a power of two.
    pub fn new(desc: &ComponentDesc) -> Self {
        assert!(
            desc.align.is_power_of_two(),
            "component {} has non-power-of-two alignment {}",
            desc.name,
            desc.align
        );

        Self {
            // Well-aligned dangling pointer; replaced on first allocation.
            data: unsafe { NonNull::new_unchecked(desc.align as *mut u8) },
            cap_bytes: if desc.size == 0 { UNBOUNDED_CAP } else { 0 },
            len: 0,
            item_size: desc.size,
            item_align: desc.align,
        }
    }

    /// Number of elements currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the column holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Element size in bytes.
    #[inline]
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// Element alignment in bytes.
    #[inline]
    pub fn item_align(&self) -> usize {
        self.item_align
    }

    /// Current capacity of the backing buffer in bytes.
    ///
    /// Zero-size elements report an unbounded sentinel capacity.
    #[inline]
    pub fn byte_capacity(&self) -> usize {
        self.cap_bytes
    }

    /// Grows the backing buffer to hold at least `cap_bytes`.
    ///
    /// Growth is geometric; the buffer is remapped in place when the
    /// allocator allows it and otherwise moved, preserving the stored
    /// alignment. On failure the column is unchanged.
    pub fn ensure_capacity(&mut self, cap_bytes: usize) -> Result<(), OutOfMemoryError> {
        if self.item_size == 0 || cap_bytes <= self.cap_bytes {
            return Ok(());
        }

        let mut new_cap = self.cap_bytes;
        while new_cap < cap_bytes {
            new_cap = new_cap.saturating_add(new_cap / 2).saturating_add(256);
        }

        let layout = Layout::from_size_align(new_cap, self.item_align)
            .map_err(|_| OutOfMemoryError { requested_bytes: new_cap })?;

        let grown = unsafe {
            if self.cap_bytes == 0 {
                alloc::alloc(layout)
            } else {
                let old = Layout::from_size_align_unchecked(self.cap_bytes, self.item_align);
                alloc::realloc(self.data.as_ptr(), old, new_cap)
            }
        };

        match NonNull::new(grown) {
            Some(ptr) => {
                self.data = ptr;
                self.cap_bytes = new_cap;
                Ok(())
            }
            None => Err(OutOfMemoryError { requested_bytes: new_cap }),
        }
    }

    /// Reserves one more element and returns its byte slot.
    ///
    /// The slot is uninitialized with respect to component data; the caller
    /// must write it before it is read. Debug builds fill it with
    /// [`SLOT_POISON`].
    pub fn add_one(&mut self) -> Result<&mut [u8], OutOfMemoryError> {
        let needed = self
            .len
            .checked_add(1)
            .and_then(|n| n.checked_mul(self.item_size))
            .ok_or(OutOfMemoryError { requested_bytes: usize::MAX })?;
        self.ensure_capacity(needed)?;

        self.len += 1;
        let slot = self.slot_mut((self.len - 1) as RowID);
        #[cfg(debug_assertions)]
        slot.fill(SLOT_POISON);
        Ok(slot)
    }

    /// Removes the element at `row`, moving the last element into its place
    /// unless `row` is the last.
    ///
    /// Debug builds poison the vacated slot.
    pub fn swap_remove(&mut self, row: RowID) {
        let row = row as usize;
        debug_assert!(row < self.len, "swap_remove past end: row {row}, len {}", self.len);

        let last = self.len - 1;
        if self.item_size > 0 {
            unsafe {
                if row != last {
                    let src = self.data.as_ptr().add(last * self.item_size);
                    let dst = self.data.as_ptr().add(row * self.item_size);
                    std::ptr::copy_nonoverlapping(src, dst, self.item_size);
                }
                #[cfg(debug_assertions)]
                slice::from_raw_parts_mut(
                    self.data.as_ptr().add(last * self.item_size),
                    self.item_size,
                )
                .fill(SLOT_POISON);
            }
        }
        self.len = last;
    }

    /// Byte view of the element at `row`.
    ///
    /// Zero-size elements yield the empty byte span.
    #[inline]
    pub fn slot(&self, row: RowID) -> &[u8] {
        let row = row as usize;
        debug_assert!(row < self.len, "slot past end: row {row}, len {}", self.len);
        unsafe { slice::from_raw_parts(self.data.as_ptr().add(row * self.item_size), self.item_size) }
    }

    /// Mutable byte view of the element at `row`.
    #[inline]
    pub fn slot_mut(&mut self, row: RowID) -> &mut [u8] {
        let row = row as usize;
        debug_assert!(row < self.len, "slot past end: row {row}, len {}", self.len);
        unsafe {
            slice::from_raw_parts_mut(self.data.as_ptr().add(row * self.item_size), self.item_size)
        }
    }

    /// Raw pointer to the element at `row`.
    ///
    /// For zero-size elements the pointer is well-aligned and dangling and
    /// must not be read through as bytes.
    #[inline]
    pub fn item_ptr(&self, row: RowID) -> NonNull<u8> {
        let row = row as usize;
        debug_assert!(row < self.len, "item_ptr past end: row {row}, len {}", self.len);
        unsafe { NonNull::new_unchecked(self.data.as_ptr().add(row * self.item_size)) }
    }

    /// Base pointer of the buffer, for bulk slice projection.
    #[inline]
    pub fn base_ptr(&self) -> NonNull<u8> {
        self.data
    }

    /// Typed view of the whole column.
    ///
    /// ## Safety
    /// `T` must be the component type this column was created for.
    #[inline]
    pub unsafe fn as_slice<T>(&self) -> &[T] {
        debug_assert_eq!(std::mem::size_of::<T>(), self.item_size);
        debug_assert_eq!(self.data.as_ptr() as usize % std::mem::align_of::<T>(), 0);
        unsafe { slice::from_raw_parts(self.data.as_ptr() as *const T, self.len) }
    }

    /// Mutable typed view of the whole column.
    ///
    /// ## Safety
    /// `T` must be the component type this column was created for, and no
    /// other view of this column may be live.
    #[inline]
    pub unsafe fn as_slice_mut<T>(&mut self) -> &mut [T] {
        debug_assert_eq!(std::mem::size_of::<T>(), self.item_size);
        debug_assert_eq!(self.data.as_ptr() as usize % std::mem::align_of::<T>(), 0);
        unsafe { slice::from_raw_parts_mut(self.data.as_ptr() as *mut T, self.len) }
    }
}

impl Drop for Column {
    fn drop(&mut self) {
        if self.item_size > 0 && self.cap_bytes > 0 {
            unsafe {
                let layout = Layout::from_size_align_unchecked(self.cap_bytes, self.item_align);
                alloc::dealloc(self.data.as_ptr(), layout);
            }
        }
    }
}
