//! Monotonic (bump) allocator over a heap buffer
//!
//! Same policy as [`LinearAllocator`](crate::LinearAllocator) with the
//! capacity chosen at runtime. The buffer comes from the system allocator
//! and does not move, so the allocator itself may be moved freely.

use std::ptr::NonNull;

use taskrt_core::constants::MAX_ALIGN;
use taskrt_core::AllocResult;

use crate::buffer::HeapBuffer;
use crate::bump::Cursor;
use crate::traits::{MemoryUsage, RawAllocator, Resettable};

pub struct MonotonicAllocator {
    buffer: HeapBuffer,
    cursor: Cursor,
}

impl MonotonicAllocator {
    /// Bump allocator over `capacity` bytes
    ///
    /// A zero capacity is `InvalidArgument`.
    pub fn new(capacity: usize) -> AllocResult<Self> {
        let buffer = HeapBuffer::new(capacity, MAX_ALIGN)?;
        tracing::trace!(capacity, "monotonic allocator created");
        Ok(Self {
            buffer,
            cursor: Cursor::new(),
        })
    }
}

impl RawAllocator for MonotonicAllocator {
    fn allocate(&mut self, size: usize, align: usize) -> AllocResult<NonNull<u8>> {
        self.cursor
            .bump(self.buffer.as_ptr(), self.buffer.len(), size, align)
    }

    /// No-op: memory is reclaimed only by `reset`
    unsafe fn deallocate(&mut self, _ptr: NonNull<u8>) -> AllocResult<()> {
        Ok(())
    }
}

impl Resettable for MonotonicAllocator {
    fn reset(&mut self) {
        self.cursor.rewind();
    }
}

impl MemoryUsage for MonotonicAllocator {
    #[inline]
    fn capacity(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    fn bytes_used(&self) -> usize {
        self.cursor.offset()
    }
}

impl std::fmt::Debug for MonotonicAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonotonicAllocator")
            .field("capacity", &self.capacity())
            .field("used", &self.bytes_used())
            .finish()
    }
}
