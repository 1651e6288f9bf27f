//! Container-facing adapter
//!
//! [`AllocatorRef`] is a copyable handle to any [`RawAllocator`] that
//! speaks in typed element counts, the way a container wants to. Two
//! handles compare equal when they point at the same allocator instance.
//! [`AllocVec`] is a growable vector whose storage comes from one.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};
use std::slice;

use taskrt_core::{AllocError, AllocResult};

use crate::traits::RawAllocator;

/// Shared handle to an allocator held in a `RefCell`
pub struct AllocatorRef<'a, A: RawAllocator> {
    cell: &'a RefCell<A>,
}

impl<'a, A: RawAllocator> AllocatorRef<'a, A> {
    pub fn new(cell: &'a RefCell<A>) -> Self {
        Self { cell }
    }

    /// Storage for `n` values of `T`
    ///
    /// Zero-sized requests (`n == 0` or zero-sized `T`) return a dangling,
    /// well-aligned pointer without touching the allocator.
    pub fn allocate<T>(&self, n: usize) -> AllocResult<NonNull<T>> {
        let bytes = mem::size_of::<T>()
            .checked_mul(n)
            .ok_or(AllocError::InvalidArgument("element count overflows"))?;
        if bytes == 0 {
            return Ok(NonNull::dangling());
        }
        self.cell
            .borrow_mut()
            .allocate(bytes, mem::align_of::<T>())
            .map(NonNull::cast)
    }

    /// Release storage from [`allocate`](Self::allocate)
    ///
    /// # Safety
    ///
    /// `ptr` and `n` must match a prior `allocate::<T>(n)` through a handle
    /// to the same allocator, and the storage must not be used afterwards.
    pub unsafe fn deallocate<T>(&self, ptr: NonNull<T>, n: usize) -> AllocResult<()> {
        if mem::size_of::<T>() == 0 || n == 0 {
            return Ok(());
        }
        self.cell.borrow_mut().deallocate(ptr.cast())
    }

    /// Borrow the underlying allocator
    pub fn with<R>(&self, f: impl FnOnce(&A) -> R) -> R {
        f(&self.cell.borrow())
    }
}

impl<A: RawAllocator> Clone for AllocatorRef<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: RawAllocator> Copy for AllocatorRef<'_, A> {}

impl<A: RawAllocator> PartialEq for AllocatorRef<'_, A> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.cell, other.cell)
    }
}

impl<A: RawAllocator> Eq for AllocatorRef<'_, A> {}

impl<A: RawAllocator> fmt::Debug for AllocatorRef<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AllocatorRef")
            .field(&(self.cell as *const RefCell<A>))
            .finish()
    }
}

/// Growable array backed by an [`AllocatorRef`]
///
/// Capacity doubles on growth. With an arena underneath, old buffers are
/// only reclaimed when the arena is reset.
pub struct AllocVec<'a, T, A: RawAllocator> {
    ptr: NonNull<T>,
    len: usize,
    cap: usize,
    alloc: AllocatorRef<'a, A>,
    _marker: PhantomData<T>,
}

impl<'a, T, A: RawAllocator> AllocVec<'a, T, A> {
    pub fn new_in(alloc: AllocatorRef<'a, A>) -> Self {
        let cap = if mem::size_of::<T>() == 0 { usize::MAX } else { 0 };
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            cap,
            alloc,
            _marker: PhantomData,
        }
    }

    pub fn with_capacity_in(capacity: usize, alloc: AllocatorRef<'a, A>) -> AllocResult<Self> {
        let mut v = Self::new_in(alloc);
        v.reserve(capacity)?;
        Ok(v)
    }

    /// Ensure room for `additional` more elements
    pub fn reserve(&mut self, additional: usize) -> AllocResult<()> {
        let needed = self
            .len
            .checked_add(additional)
            .ok_or(AllocError::InvalidArgument("capacity overflows"))?;
        if needed <= self.cap {
            return Ok(());
        }
        let new_cap = needed.max(self.cap.saturating_mul(2)).max(4);
        self.grow_to(new_cap)
    }

    fn grow_to(&mut self, new_cap: usize) -> AllocResult<()> {
        let new_ptr = self.alloc.allocate::<T>(new_cap)?;
        // SAFETY: both regions hold at least `len` elements and are distinct
        unsafe {
            ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), self.len);
            if self.cap > 0 {
                self.alloc.deallocate(self.ptr, self.cap)?;
            }
        }
        self.ptr = new_ptr;
        self.cap = new_cap;
        Ok(())
    }

    /// Append `value`; on allocation failure the vector is unchanged
    pub fn push(&mut self, value: T) -> AllocResult<()> {
        if self.len == self.cap {
            self.reserve(1)?;
        }
        // SAFETY: len < cap after reserve
        unsafe { self.ptr.as_ptr().add(self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: element at `len` was initialised and is now logically removed
        Some(unsafe { self.ptr.as_ptr().add(self.len).read() })
    }

    /// Drop every element, keeping the storage
    pub fn clear(&mut self) {
        let len = self.len;
        self.len = 0;
        // SAFETY: first `len` elements are initialised
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), len)) };
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    #[inline]
    pub fn allocator(&self) -> AllocatorRef<'a, A> {
        self.alloc
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: first `len` elements are initialised; ptr is aligned and
        // non-null even when empty
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as above, with unique access through &mut self
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T, A: RawAllocator> Deref for AllocVec<'_, T, A> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: RawAllocator> DerefMut for AllocVec<'_, T, A> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A: RawAllocator> Drop for AllocVec<'_, T, A> {
    fn drop(&mut self) {
        self.clear();
        if self.cap > 0 && mem::size_of::<T>() != 0 {
            // SAFETY: storage came from `alloc.allocate::<T>(cap)`
            let _ = unsafe { self.alloc.deallocate(self.ptr, self.cap) };
        }
    }
}

impl<T: fmt::Debug, A: RawAllocator> fmt::Debug for AllocVec<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FreeListAllocator, LinearAllocator, MemoryUsage, MonotonicAllocator, Resettable};
    use std::rc::Rc;

    #[test]
    fn test_equality_is_identity() {
        let a = RefCell::new(MonotonicAllocator::new(256).unwrap());
        let b = RefCell::new(MonotonicAllocator::new(256).unwrap());
        let ra1 = AllocatorRef::new(&a);
        let ra2 = ra1;
        let rb = AllocatorRef::new(&b);
        assert_eq!(ra1, ra2);
        assert_ne!(ra1, rb);
    }

    #[test]
    fn test_typed_allocation_forwarding() {
        let arena = RefCell::new(LinearAllocator::<1024>::new());
        let handle = AllocatorRef::new(&arena);

        let p = handle.allocate::<u64>(4).unwrap();
        assert_eq!(p.as_ptr() as usize % mem::align_of::<u64>(), 0);
        assert_eq!(handle.with(|a| a.bytes_used()), 32);

        // Zero-length requests never reach the allocator
        handle.allocate::<u64>(0).unwrap();
        handle.allocate::<()>(100).unwrap();
        assert_eq!(handle.with(|a| a.bytes_used()), 32);

        assert!(handle.allocate::<u64>(usize::MAX).is_err());
    }

    #[test]
    fn test_vec_push_pop_grow() {
        let heap = RefCell::new(FreeListAllocator::new(64 * 1024).unwrap());
        let mut v = AllocVec::new_in(AllocatorRef::new(&heap));
        for i in 0..1000u32 {
            v.push(i).unwrap();
        }
        assert_eq!(v.len(), 1000);
        assert!(v.capacity() >= 1000);
        assert_eq!(v[999], 999);
        assert_eq!(v.iter().copied().sum::<u32>(), 999 * 1000 / 2);
        assert_eq!(v.pop(), Some(999));

        drop(v);
        // Every buffer, including outgrown ones, went back to the free list
        assert_eq!(heap.borrow().bytes_used(), 0);
    }

    #[test]
    fn test_vec_exhaustion_leaves_vec_intact() {
        let arena = RefCell::new(LinearAllocator::<256>::new());
        let mut v = AllocVec::new_in(AllocatorRef::new(&arena));
        let mut pushed = 0u64;
        let err = loop {
            match v.push(pushed) {
                Ok(()) => pushed += 1,
                Err(e) => break e,
            }
        };
        assert!(err.is_out_of_memory());
        assert_eq!(v.len() as u64, pushed);
        assert_eq!(v.as_slice().last().copied(), pushed.checked_sub(1));
    }

    #[test]
    fn test_vec_drops_elements() {
        let tag = Rc::new(());
        let arena = RefCell::new(MonotonicAllocator::new(4096).unwrap());
        {
            let mut v = AllocVec::with_capacity_in(8, AllocatorRef::new(&arena)).unwrap();
            assert_eq!(v.capacity(), 8);
            for _ in 0..5 {
                v.push(Rc::clone(&tag)).unwrap();
            }
            assert_eq!(Rc::strong_count(&tag), 6);
            v.clear();
            assert_eq!(Rc::strong_count(&tag), 1);
            v.push(Rc::clone(&tag)).unwrap();
        }
        assert_eq!(Rc::strong_count(&tag), 1);
        arena.borrow_mut().reset();
        assert_eq!(arena.borrow().bytes_used(), 0);
    }

    #[test]
    fn test_vec_zero_sized() {
        let arena = RefCell::new(LinearAllocator::<16>::new());
        let mut v = AllocVec::new_in(AllocatorRef::new(&arena));
        for _ in 0..100 {
            v.push(()).unwrap();
        }
        assert_eq!(v.len(), 100);
        assert_eq!(arena.borrow().bytes_used(), 0);
    }
}
