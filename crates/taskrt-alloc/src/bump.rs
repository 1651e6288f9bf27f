//! Bump cursor shared by the linear and monotonic allocators

use std::ptr::NonNull;

use taskrt_core::{AllocError, AllocResult};

use crate::align::{check_align, padding_for};

/// Offset of the next free byte in a fixed region
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Cursor {
    offset: usize,
}

impl Cursor {
    #[inline]
    pub(crate) const fn new() -> Self {
        Self { offset: 0 }
    }

    #[inline]
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub(crate) fn rewind(&mut self) {
        self.offset = 0;
    }

    /// Carve `size` bytes aligned to `align` out of `[base, base + capacity)`
    ///
    /// Padding is computed on the absolute address, so alignments stricter
    /// than the region's own alignment are still honoured.
    pub(crate) fn bump(
        &mut self,
        base: *mut u8,
        capacity: usize,
        size: usize,
        align: usize,
    ) -> AllocResult<NonNull<u8>> {
        check_align(align)?;

        let current = base as usize + self.offset;
        let start = self.offset + padding_for(current, align);
        // Zero-size requests take one byte while there is room, so their
        // pointers stay distinct; at the very end they take none.
        let size = if size == 0 && start < capacity { 1 } else { size };
        let end = start
            .checked_add(size)
            .filter(|&end| end <= capacity)
            .ok_or_else(|| {
                AllocError::out_of_memory(size, align, capacity - self.offset)
            })?;

        self.offset = end;
        // SAFETY: start <= end <= capacity, inside or one past the region
        Ok(unsafe { NonNull::new_unchecked(base.add(start)) })
    }
}
