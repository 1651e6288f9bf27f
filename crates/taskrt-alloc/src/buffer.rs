//! Owned, aligned heap region backing the dynamic allocators

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use taskrt_core::{AllocError, AllocResult};

/// Uninitialised bytes obtained from the system allocator
///
/// Freed on drop. Never reallocated, so pointers into it stay valid for
/// the buffer's lifetime.
pub(crate) struct HeapBuffer {
    ptr: NonNull<u8>,
    layout: Layout,
}

// SAFETY: HeapBuffer owns its memory exclusively
unsafe impl Send for HeapBuffer {}

impl HeapBuffer {
    /// Allocate `size` bytes (must be non-zero) aligned to `align`
    pub(crate) fn new(size: usize, align: usize) -> AllocResult<Self> {
        if size == 0 {
            return Err(AllocError::InvalidArgument("capacity must be non-zero"));
        }
        let layout = Layout::from_size_align(size, align)
            .map_err(|_| AllocError::InvalidArgument("capacity overflows layout"))?;

        // SAFETY: layout has non-zero size
        let raw = unsafe { alloc::alloc(layout) };
        let ptr = NonNull::new(raw).ok_or_else(|| AllocError::out_of_memory(size, align, 0))?;

        Ok(Self { ptr, layout })
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.layout.size()
    }

    /// Address of the first byte
    #[inline]
    pub(crate) fn addr(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// Check if `ptr` points inside this buffer
    #[inline]
    pub(crate) fn contains(&self, ptr: *const u8) -> bool {
        let p = ptr as usize;
        p >= self.addr() && p < self.addr() + self.len()
    }
}

impl Drop for HeapBuffer {
    fn drop(&mut self) {
        // SAFETY: allocated in `new` with this exact layout
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}
