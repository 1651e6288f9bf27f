//! Fixed-capacity linear (arena) allocator
//!
//! The buffer lives inline in the allocator, so `N` is fixed at compile
//! time. Allocation advances a cursor; individual frees are ignored and
//! `reset` releases everything at once.
//!
//! Pointers handed out point into `self`. Moving the allocator invalidates
//! them, so place it where it will stay (`boxed()` for large `N`).

use std::alloc::{self, Layout};
use std::mem::MaybeUninit;
use std::ptr::NonNull;

use taskrt_core::AllocResult;

use crate::bump::Cursor;
use crate::traits::{MemoryUsage, RawAllocator, Resettable};

#[repr(C, align(16))]
struct Storage<const N: usize>([MaybeUninit<u8>; N]);

/// Arena over an inline, 16-byte-aligned `N`-byte buffer
pub struct LinearAllocator<const N: usize> {
    storage: Storage<N>,
    cursor: Cursor,
}

impl<const N: usize> LinearAllocator<N> {
    pub const fn new() -> Self {
        Self {
            storage: Storage([MaybeUninit::uninit(); N]),
            cursor: Cursor::new(),
        }
    }

    /// Heap-allocated arena, constructed in place
    ///
    /// Avoids building an `N`-byte value on the stack first.
    pub fn boxed() -> Box<Self> {
        let layout = Layout::new::<Self>();
        // SAFETY: all-zero bytes are a valid Self (uninit storage, cursor 0);
        // layout is non-zero because the cursor field is
        unsafe {
            let ptr = alloc::alloc_zeroed(layout) as *mut Self;
            if ptr.is_null() {
                alloc::handle_alloc_error(layout);
            }
            Box::from_raw(ptr)
        }
    }

    #[inline]
    fn base(&mut self) -> *mut u8 {
        self.storage.0.as_mut_ptr().cast()
    }
}

impl<const N: usize> Default for LinearAllocator<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RawAllocator for LinearAllocator<N> {
    fn allocate(&mut self, size: usize, align: usize) -> AllocResult<NonNull<u8>> {
        let base = self.base();
        self.cursor.bump(base, N, size, align)
    }

    /// No-op: memory is reclaimed only by `reset`
    unsafe fn deallocate(&mut self, _ptr: NonNull<u8>) -> AllocResult<()> {
        Ok(())
    }
}

impl<const N: usize> Resettable for LinearAllocator<N> {
    fn reset(&mut self) {
        self.cursor.rewind();
    }
}

impl<const N: usize> MemoryUsage for LinearAllocator<N> {
    #[inline]
    fn capacity(&self) -> usize {
        N
    }

    #[inline]
    fn bytes_used(&self) -> usize {
        self.cursor.offset()
    }
}

impl<const N: usize> std::fmt::Debug for LinearAllocator<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinearAllocator")
            .field("capacity", &N)
            .field("used", &self.cursor.offset())
            .finish()
    }
}
