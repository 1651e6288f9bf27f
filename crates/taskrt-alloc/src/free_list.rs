//! First-fit free-list allocator over one heap buffer
//!
//! # Layout
//!
//! ```text
//!   span start                        payload (aligned)
//!   |<- padding ->|<- Header (16B) ->|<- size ... ->|<- round-up ->|
//!   |<------------------------ header.size --------------------->|
//! ```
//!
//! The header sits immediately before the payload, so `deallocate` finds
//! it at `ptr - HEADER_SIZE` and recovers the span start from
//! `header.padding`. Every span offset and span size is a multiple of 8.
//!
//! Free spans form a singly linked list threaded through the free memory
//! itself, addressed by offset from the buffer base. Freed spans go to the
//! head of the list. Adjacent free spans are only merged by an explicit
//! [`FreeListAllocator::coalesce`] pass.
//!
//! Invariant: `bytes_used() + free_bytes() == capacity()` at all times.

use std::mem;
use std::ptr::NonNull;

use taskrt_core::constants::MAX_ALIGN;
use taskrt_core::{AllocError, AllocResult};

use crate::align::{align_up, check_align, padding_for};
use crate::buffer::HeapBuffer;
use crate::traits::{MemoryUsage, RawAllocator, Resettable};

/// Granularity of span offsets and sizes
const SPAN_ALIGN: usize = 8;

/// End-of-list marker
const NIL: usize = usize::MAX;

/// Per-allocation bookkeeping, directly before the payload
#[repr(C)]
#[derive(Clone, Copy)]
struct Header {
    /// Whole span size, padding and header included
    size: usize,
    /// Bytes between span start and header
    padding: usize,
}

/// Record written at the start of each free span
#[repr(C)]
#[derive(Clone, Copy)]
struct FreeSpan {
    size: usize,
    next: usize,
}

const HEADER_SIZE: usize = mem::size_of::<Header>();
const MIN_SPAN: usize = mem::size_of::<FreeSpan>();

pub struct FreeListAllocator {
    buffer: HeapBuffer,
    capacity: usize,
    head: usize,
    used: usize,
}

impl FreeListAllocator {
    /// Allocator over `capacity` bytes, rounded down to a multiple of 8
    ///
    /// The rounded capacity must hold at least one header plus one byte.
    pub fn new(capacity: usize) -> AllocResult<Self> {
        let capacity = capacity & !(SPAN_ALIGN - 1);
        if capacity < HEADER_SIZE + SPAN_ALIGN {
            return Err(AllocError::InvalidArgument("free-list capacity too small"));
        }

        let buffer = HeapBuffer::new(capacity, MAX_ALIGN)?;
        let mut alloc = Self {
            buffer,
            capacity,
            head: NIL,
            used: 0,
        };
        alloc.reset();
        tracing::trace!(capacity, "free-list allocator created");
        Ok(alloc)
    }

    #[inline]
    fn span(&self, offset: usize) -> FreeSpan {
        debug_assert!(offset % SPAN_ALIGN == 0 && offset + MIN_SPAN <= self.capacity);
        // SAFETY: offset is an 8-aligned free-span start inside the buffer
        unsafe { self.buffer.as_ptr().add(offset).cast::<FreeSpan>().read() }
    }

    #[inline]
    fn write_span(&mut self, offset: usize, span: FreeSpan) {
        debug_assert!(offset % SPAN_ALIGN == 0 && offset + MIN_SPAN <= self.capacity);
        // SAFETY: as in `span`
        unsafe {
            self.buffer
                .as_ptr()
                .add(offset)
                .cast::<FreeSpan>()
                .write(span)
        }
    }

    /// Point the link held by `prev` (the list head when `prev` is NIL) at `to`
    fn relink(&mut self, prev: usize, to: usize) {
        if prev == NIL {
            self.head = to;
        } else {
            let mut p = self.span(prev);
            p.next = to;
            self.write_span(prev, p);
        }
    }

    /// Iterate `(offset, size)` over the free list in list order
    fn free_spans(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            if cursor == NIL {
                return None;
            }
            let at = cursor;
            let span = self.span(at);
            cursor = span.next;
            Some((at, span.size))
        })
    }

    /// Total bytes on the free list
    pub fn free_bytes(&self) -> usize {
        self.free_spans().map(|(_, size)| size).sum()
    }

    /// Number of free spans (fragmentation indicator)
    pub fn free_span_count(&self) -> usize {
        self.free_spans().count()
    }

    /// Size of the largest free span
    pub fn largest_free_span(&self) -> usize {
        self.free_spans().map(|(_, size)| size).max().unwrap_or(0)
    }

    /// Merge address-adjacent free spans
    ///
    /// Rebuilds the free list in address order. Returns the number of
    /// merges performed.
    pub fn coalesce(&mut self) -> usize {
        let mut spans: Vec<(usize, usize)> = self.free_spans().collect();
        spans.sort_unstable_by_key(|&(offset, _)| offset);

        let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
        let mut merges = 0;
        for (offset, size) in spans {
            match merged.last_mut() {
                Some((last_off, last_size)) if *last_off + *last_size == offset => {
                    *last_size += size;
                    merges += 1;
                }
                _ => merged.push((offset, size)),
            }
        }

        self.head = NIL;
        for &(offset, size) in merged.iter().rev() {
            let next = self.head;
            self.write_span(offset, FreeSpan { size, next });
            self.head = offset;
        }

        if merges > 0 {
            tracing::trace!(merges, spans = merged.len(), "free list coalesced");
        }
        merges
    }
}

impl RawAllocator for FreeListAllocator {
    fn allocate(&mut self, size: usize, align: usize) -> AllocResult<NonNull<u8>> {
        check_align(align)?;
        let size = size.max(1);
        // Header must stay 8-aligned
        let align = align.max(SPAN_ALIGN);
        let base = self.buffer.addr();

        let mut prev = NIL;
        let mut current = self.head;
        while current != NIL {
            let span = self.span(current);
            let padding = padding_for(base + current + HEADER_SIZE, align);
            let required = size
                .checked_add(HEADER_SIZE + padding)
                .and_then(|n| align_up(n, SPAN_ALIGN));

            if let Some(required) = required.filter(|&r| r <= span.size) {
                let remainder = span.size - required;
                let taken = if remainder >= MIN_SPAN {
                    let split = current + required;
                    self.write_span(
                        split,
                        FreeSpan {
                            size: remainder,
                            next: span.next,
                        },
                    );
                    self.relink(prev, split);
                    required
                } else {
                    // Too small to track: absorb into this allocation
                    self.relink(prev, span.next);
                    span.size
                };

                let payload = current + padding + HEADER_SIZE;
                // SAFETY: header lies inside the span, 8-aligned
                unsafe {
                    self.buffer
                        .as_ptr()
                        .add(payload - HEADER_SIZE)
                        .cast::<Header>()
                        .write(Header {
                            size: taken,
                            padding,
                        });
                }
                self.used += taken;
                // SAFETY: payload < capacity
                return Ok(unsafe { NonNull::new_unchecked(self.buffer.as_ptr().add(payload)) });
            }

            prev = current;
            current = span.next;
        }

        Err(AllocError::out_of_memory(
            size,
            align,
            self.capacity - self.used,
        ))
    }

    unsafe fn deallocate(&mut self, ptr: NonNull<u8>) -> AllocResult<()> {
        let addr = ptr.as_ptr() as usize;
        let base = self.buffer.addr();
        if addr < base + HEADER_SIZE || addr >= base + self.capacity {
            return Err(AllocError::InvalidArgument("pointer outside free-list buffer"));
        }

        let payload = addr - base;
        let header = self
            .buffer
            .as_ptr()
            .add(payload - HEADER_SIZE)
            .cast::<Header>()
            .read();
        let start = payload - HEADER_SIZE - header.padding;
        debug_assert!(start + header.size <= self.capacity);

        let next = self.head;
        self.write_span(
            start,
            FreeSpan {
                size: header.size,
                next,
            },
        );
        self.head = start;
        self.used -= header.size;
        Ok(())
    }
}

impl Resettable for FreeListAllocator {
    /// Single free span covering the whole buffer
    fn reset(&mut self) {
        self.head = 0;
        self.used = 0;
        let capacity = self.capacity;
        self.write_span(
            0,
            FreeSpan {
                size: capacity,
                next: NIL,
            },
        );
    }
}

impl MemoryUsage for FreeListAllocator {
    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    /// Live span bytes, headers and padding included
    #[inline]
    fn bytes_used(&self) -> usize {
        self.used
    }
}

impl std::fmt::Debug for FreeListAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreeListAllocator")
            .field("capacity", &self.capacity)
            .field("used", &self.used)
            .field("free_spans", &self.free_span_count())
            .finish()
    }
}
