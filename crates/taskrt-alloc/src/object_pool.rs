//! Fixed-size slot pool
//!
//! Memory comes in blocks of uniform slots. Free slots are threaded into an
//! intrusive singly linked list through their own first word, so a slot is
//! at least pointer-sized. The first block is allocated eagerly; another is
//! added only when the free list runs dry. Blocks are released on drop.
//!
//! The pool hands out raw memory. Constructing and destroying objects is
//! the caller's job ([`TypedPool`] offers helpers for that).

use std::marker::PhantomData;
use std::mem;
use std::ptr::{self, NonNull};

use taskrt_core::constants::DEFAULT_POOL_BLOCK_SIZE;
use taskrt_core::{AllocError, AllocResult};

use crate::align::{align_up, check_align};
use crate::buffer::HeapBuffer;
use crate::traits::{MemoryUsage, RawAllocator};

/// Link stored in a free slot
struct FreeSlot {
    next: Option<NonNull<FreeSlot>>,
}

/// Untyped pool of equally sized, equally aligned slots
pub struct ObjectPool {
    slot_size: usize,
    slot_align: usize,
    block_size: usize,
    slots_per_block: usize,
    blocks: Vec<HeapBuffer>,
    free: Option<NonNull<FreeSlot>>,
    allocations: usize,
    deallocations: usize,
}

// SAFETY: free-list pointers only point into blocks owned by the pool
unsafe impl Send for ObjectPool {}

impl ObjectPool {
    /// Pool for objects of `size` bytes aligned to `align`, with the
    /// default block size (grown to fit at least one slot)
    pub fn new(size: usize, align: usize) -> AllocResult<Self> {
        let (slot_size, _) = Self::slot_layout(size, align)?;
        Self::with_block_size(size, align, DEFAULT_POOL_BLOCK_SIZE.max(slot_size))
    }

    /// Pool whose blocks are `block_size` bytes each
    ///
    /// `block_size` must hold at least one slot.
    pub fn with_block_size(size: usize, align: usize, block_size: usize) -> AllocResult<Self> {
        let (slot_size, slot_align) = Self::slot_layout(size, align)?;
        let slots_per_block = block_size / slot_size;
        if slots_per_block == 0 {
            return Err(AllocError::InvalidArgument("block too small for one slot"));
        }

        let mut pool = Self {
            slot_size,
            slot_align,
            block_size,
            slots_per_block,
            blocks: Vec::new(),
            free: None,
            allocations: 0,
            deallocations: 0,
        };
        pool.add_block()?;
        Ok(pool)
    }

    /// Slot geometry: at least one link wide, size a multiple of alignment
    fn slot_layout(size: usize, align: usize) -> AllocResult<(usize, usize)> {
        check_align(align)?;
        let slot_align = align.max(mem::align_of::<FreeSlot>());
        let slot_size = align_up(size.max(mem::size_of::<FreeSlot>()), slot_align)
            .ok_or(AllocError::InvalidArgument("slot size overflows"))?;
        Ok((slot_size, slot_align))
    }

    fn add_block(&mut self) -> AllocResult<()> {
        let block = HeapBuffer::new(self.slots_per_block * self.slot_size, self.slot_align)?;
        let base = block.as_ptr();

        // Push in reverse so the lowest address is handed out first
        for i in (0..self.slots_per_block).rev() {
            // SAFETY: i < slots_per_block, slot lies inside the block and is
            // aligned for FreeSlot (slot_align >= align_of::<FreeSlot>())
            unsafe {
                let slot = base.add(i * self.slot_size).cast::<FreeSlot>();
                slot.write(FreeSlot { next: self.free });
                self.free = Some(NonNull::new_unchecked(slot));
            }
        }

        self.blocks.push(block);
        tracing::trace!(
            blocks = self.blocks.len(),
            slot_size = self.slot_size,
            "object pool grew"
        );
        Ok(())
    }

    /// Pop one slot, growing by a block if needed
    pub fn allocate_slot(&mut self) -> AllocResult<NonNull<u8>> {
        if self.free.is_none() {
            self.add_block()?;
        }
        let slot = self
            .free
            .ok_or_else(|| AllocError::out_of_memory(self.slot_size, self.slot_align, 0))?;
        // SAFETY: every free-list entry is an initialised FreeSlot
        self.free = unsafe { slot.as_ptr().read().next };
        self.allocations += 1;
        Ok(slot.cast())
    }

    /// Push a slot back onto the free list
    ///
    /// # Safety
    ///
    /// `ptr` must come from this pool and be outstanding. Any object in the
    /// slot must already have been dropped.
    pub unsafe fn deallocate_slot(&mut self, ptr: NonNull<u8>) {
        debug_assert!(self.owns(ptr.as_ptr()), "pointer not owned by this pool");
        let slot = ptr.cast::<FreeSlot>();
        slot.as_ptr().write(FreeSlot { next: self.free });
        self.free = Some(slot);
        self.deallocations += 1;
    }

    fn owns(&self, ptr: *const u8) -> bool {
        self.blocks.iter().any(|b| b.contains(ptr))
    }

    /// Bytes per slot after rounding
    #[inline]
    pub fn slot_size(&self) -> usize {
        self.slot_size
    }

    #[inline]
    pub fn slot_align(&self) -> usize {
        self.slot_align
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Total slots across all blocks
    #[inline]
    pub fn slot_capacity(&self) -> usize {
        self.blocks.len() * self.slots_per_block
    }

    #[inline]
    pub fn allocation_count(&self) -> usize {
        self.allocations
    }

    #[inline]
    pub fn deallocation_count(&self) -> usize {
        self.deallocations
    }

    /// Slots currently handed out
    #[inline]
    pub fn outstanding(&self) -> usize {
        self.allocations - self.deallocations
    }
}

impl RawAllocator for ObjectPool {
    /// Any request that fits the slot layout gets one slot
    fn allocate(&mut self, size: usize, align: usize) -> AllocResult<NonNull<u8>> {
        check_align(align)?;
        if size > self.slot_size || align > self.slot_align {
            return Err(AllocError::InvalidArgument("request exceeds pool slot layout"));
        }
        self.allocate_slot()
    }

    unsafe fn deallocate(&mut self, ptr: NonNull<u8>) -> AllocResult<()> {
        self.deallocate_slot(ptr);
        Ok(())
    }
}

impl MemoryUsage for ObjectPool {
    fn capacity(&self) -> usize {
        self.slot_capacity() * self.slot_size
    }

    fn bytes_used(&self) -> usize {
        self.outstanding() * self.slot_size
    }
}

impl std::fmt::Debug for ObjectPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectPool")
            .field("slot_size", &self.slot_size)
            .field("slot_align", &self.slot_align)
            .field("blocks", &self.blocks.len())
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

/// [`ObjectPool`] sized and aligned for `T`
pub struct TypedPool<T> {
    pool: ObjectPool,
    _marker: PhantomData<T>,
}

impl<T> TypedPool<T> {
    pub fn new() -> AllocResult<Self> {
        Ok(Self {
            pool: ObjectPool::new(mem::size_of::<T>(), mem::align_of::<T>())?,
            _marker: PhantomData,
        })
    }

    pub fn with_block_size(block_size: usize) -> AllocResult<Self> {
        Ok(Self {
            pool: ObjectPool::with_block_size(
                mem::size_of::<T>(),
                mem::align_of::<T>(),
                block_size,
            )?,
            _marker: PhantomData,
        })
    }

    /// Uninitialised slot for one `T`
    pub fn allocate(&mut self) -> AllocResult<NonNull<T>> {
        self.pool.allocate_slot().map(NonNull::cast)
    }

    /// # Safety
    ///
    /// Same contract as [`ObjectPool::deallocate_slot`].
    pub unsafe fn deallocate(&mut self, ptr: NonNull<T>) {
        self.pool.deallocate_slot(ptr.cast());
    }

    /// Allocate a slot and move `value` into it
    pub fn alloc_init(&mut self, value: T) -> AllocResult<NonNull<T>> {
        let ptr = self.allocate()?;
        // SAFETY: fresh slot, sized and aligned for T
        unsafe { ptr::write(ptr.as_ptr(), value) };
        Ok(ptr)
    }

    /// Drop the object in place and free its slot
    ///
    /// # Safety
    ///
    /// `ptr` must come from `alloc_init` (or be initialised after
    /// `allocate`) on this pool and not be used afterwards.
    pub unsafe fn destroy(&mut self, ptr: NonNull<T>) {
        ptr::drop_in_place(ptr.as_ptr());
        self.deallocate(ptr);
    }

    /// The underlying untyped pool
    #[inline]
    pub fn raw(&self) -> &ObjectPool {
        &self.pool
    }

    #[inline]
    pub fn outstanding(&self) -> usize {
        self.pool.outstanding()
    }
}

impl<T> std::fmt::Debug for TypedPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TypedPool").field(&self.pool).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::rc::Rc;

    #[test]
    fn test_slot_geometry() {
        let pool = ObjectPool::new(1, 1).unwrap();
        assert_eq!(pool.slot_size(), mem::size_of::<usize>());

        let pool = ObjectPool::new(24, 16).unwrap();
        assert_eq!(pool.slot_size(), 32);
        assert_eq!(pool.slot_align(), 16);
        assert_eq!(pool.block_count(), 1);
        assert_eq!(pool.slot_capacity(), DEFAULT_POOL_BLOCK_SIZE / 32);
    }

    #[test]
    fn test_large_objects_get_a_block() {
        let pool = ObjectPool::new(10_000, 8).unwrap();
        assert_eq!(pool.slot_capacity(), 1);
    }

    #[test]
    fn test_block_too_small() {
        assert!(matches!(
            ObjectPool::with_block_size(64, 8, 32),
            Err(AllocError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_grows_by_blocks() {
        let mut pool = ObjectPool::with_block_size(16, 8, 64).unwrap();
        assert_eq!(pool.slot_capacity(), 4);

        let ptrs: Vec<_> = (0..9).map(|_| pool.allocate_slot().unwrap()).collect();
        assert_eq!(pool.block_count(), 3);
        let unique: HashSet<_> = ptrs.iter().map(|p| p.as_ptr() as usize).collect();
        assert_eq!(unique.len(), 9);
        for p in &ptrs {
            assert_eq!(p.as_ptr() as usize % 8, 0);
        }
    }

    #[test]
    fn test_reuse_is_lifo() {
        let mut pool = ObjectPool::new(32, 8).unwrap();
        let a = pool.allocate_slot().unwrap();
        let _b = pool.allocate_slot().unwrap();
        unsafe { pool.deallocate_slot(a) };
        assert_eq!(pool.allocate_slot().unwrap(), a);
    }

    #[test]
    fn test_counters_track_outstanding() {
        let mut pool = ObjectPool::new(8, 8).unwrap();
        let ptrs: Vec<_> = (0..10).map(|_| pool.allocate_slot().unwrap()).collect();
        for p in ptrs.iter().take(4) {
            unsafe { pool.deallocate_slot(*p) };
        }
        assert_eq!(pool.allocation_count(), 10);
        assert_eq!(pool.deallocation_count(), 4);
        assert_eq!(pool.outstanding(), 6);
        assert_eq!(pool.bytes_used(), 6 * pool.slot_size());
    }

    #[test]
    fn test_raw_allocator_rejects_oversize() {
        let mut pool = ObjectPool::new(16, 8).unwrap();
        assert!(pool.allocate(16, 8).is_ok());
        assert!(matches!(
            pool.allocate(17, 8),
            Err(AllocError::InvalidArgument(_))
        ));
        assert!(matches!(
            pool.allocate(8, 32),
            Err(AllocError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_typed_pool_init_and_destroy() {
        #[derive(Debug, PartialEq)]
        struct Particle {
            pos: [f32; 3],
            tag: Rc<()>,
        }

        let tag = Rc::new(());
        let mut pool = TypedPool::<Particle>::new().unwrap();
        let p = pool
            .alloc_init(Particle {
                pos: [1.0, 2.0, 3.0],
                tag: Rc::clone(&tag),
            })
            .unwrap();
        assert_eq!(unsafe { p.as_ref() }.pos, [1.0, 2.0, 3.0]);
        assert_eq!(Rc::strong_count(&tag), 2);

        unsafe { pool.destroy(p) };
        assert_eq!(Rc::strong_count(&tag), 1);
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.raw().allocation_count(), 1);
    }

    #[test]
    fn test_typed_pool_zero_sized() {
        let mut pool = TypedPool::<()>::new().unwrap();
        let a = pool.alloc_init(()).unwrap();
        let b = pool.alloc_init(()).unwrap();
        assert_ne!(a, b);
    }
}
