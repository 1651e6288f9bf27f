//! Allocator traits
//!
//! Every allocator in this crate is single-owner: methods take `&mut self`
//! and nothing here is `Sync`. Share an allocator between threads by
//! wrapping it in a lock, or give each worker its own.

use std::ptr::NonNull;

use taskrt_core::AllocResult;

/// Raw, untyped allocation
pub trait RawAllocator {
    /// Allocate `size` bytes aligned to `align`
    ///
    /// `align` must be a non-zero power of two (otherwise
    /// `AllocError::InvalidArgument`). A zero `size` is served as one byte,
    /// so every successful call returns a distinct pointer. Exhaustion is
    /// `AllocError::OutOfMemory`; there is no partial success.
    fn allocate(&mut self, size: usize, align: usize) -> AllocResult<NonNull<u8>>;

    /// Return a block to the allocator
    ///
    /// Allocators without individual release accept and ignore the call.
    ///
    /// # Safety
    ///
    /// `ptr` must have come from `allocate` on this same allocator, must
    /// not have been deallocated already, and must not be used afterwards.
    unsafe fn deallocate(&mut self, ptr: NonNull<u8>) -> AllocResult<()>;
}

/// Bulk release of every allocation at once
pub trait Resettable {
    /// Invalidate all outstanding allocations
    fn reset(&mut self);
}

/// Byte accounting
pub trait MemoryUsage {
    /// Total bytes this allocator can hand out
    fn capacity(&self) -> usize;

    /// Bytes currently consumed, including alignment padding and headers
    fn bytes_used(&self) -> usize;

    fn bytes_available(&self) -> usize {
        self.capacity().saturating_sub(self.bytes_used())
    }
}

impl<A: RawAllocator + ?Sized> RawAllocator for &mut A {
    #[inline]
    fn allocate(&mut self, size: usize, align: usize) -> AllocResult<NonNull<u8>> {
        (**self).allocate(size, align)
    }

    #[inline]
    unsafe fn deallocate(&mut self, ptr: NonNull<u8>) -> AllocResult<()> {
        (**self).deallocate(ptr)
    }
}

impl<A: RawAllocator + ?Sized> RawAllocator for Box<A> {
    #[inline]
    fn allocate(&mut self, size: usize, align: usize) -> AllocResult<NonNull<u8>> {
        (**self).allocate(size, align)
    }

    #[inline]
    unsafe fn deallocate(&mut self, ptr: NonNull<u8>) -> AllocResult<()> {
        (**self).deallocate(ptr)
    }
}
