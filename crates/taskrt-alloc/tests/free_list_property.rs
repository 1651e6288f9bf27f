//! Property tests for allocator accounting invariants.
//!
//! - Free list: live span bytes + free span bytes == capacity after every
//!   allocate and deallocate, with or without coalescing.
//! - Object pool: allocation_count - deallocation_count == outstanding.

use std::ptr::NonNull;

use proptest::prelude::*;
use taskrt_alloc::{FreeListAllocator, MemoryUsage, ObjectPool, RawAllocator};

#[derive(Debug, Clone)]
enum Op {
    Alloc { size: usize, align_shift: u32 },
    Free { index: usize },
    Coalesce,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (1usize..512, 0u32..7).prop_map(|(size, align_shift)| Op::Alloc { size, align_shift }),
        3 => any::<usize>().prop_map(|index| Op::Free { index }),
        1 => Just(Op::Coalesce),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn free_list_conserves_capacity(ops in prop::collection::vec(op_strategy(), 1..200)) {
        let mut heap = FreeListAllocator::new(16 * 1024).unwrap();
        let mut live: Vec<(NonNull<u8>, usize)> = Vec::new();

        for op in ops {
            match op {
                Op::Alloc { size, align_shift } => {
                    let align = 1usize << align_shift;
                    if let Ok(ptr) = heap.allocate(size, align) {
                        prop_assert_eq!(ptr.as_ptr() as usize % align, 0);
                        live.push((ptr, size));
                    }
                }
                Op::Free { index } => {
                    if !live.is_empty() {
                        let (ptr, _) = live.swap_remove(index % live.len());
                        unsafe { heap.deallocate(ptr).unwrap() };
                    }
                }
                Op::Coalesce => {
                    heap.coalesce();
                }
            }
            prop_assert_eq!(heap.bytes_used() + heap.free_bytes(), heap.capacity());
        }

        for (ptr, _) in live.drain(..) {
            unsafe { heap.deallocate(ptr).unwrap() };
        }
        prop_assert_eq!(heap.bytes_used(), 0);
        heap.coalesce();
        prop_assert_eq!(heap.free_span_count(), 1);
    }

    #[test]
    fn live_allocations_never_overlap(sizes in prop::collection::vec(1usize..300, 1..60)) {
        let mut heap = FreeListAllocator::new(32 * 1024).unwrap();
        let mut ranges: Vec<(usize, usize)> = Vec::new();
        for size in sizes {
            if let Ok(ptr) = heap.allocate(size, 8) {
                ranges.push((ptr.as_ptr() as usize, size));
            }
        }
        ranges.sort_unstable();
        for pair in ranges.windows(2) {
            prop_assert!(pair[0].0 + pair[0].1 <= pair[1].0);
        }
    }

    #[test]
    fn object_pool_counts_outstanding(
        ops in prop::collection::vec(any::<bool>(), 1..300),
        size in 1usize..128,
    ) {
        let mut pool = ObjectPool::with_block_size(size, 8, 512).unwrap();
        let mut live = Vec::new();
        for alloc in ops {
            if alloc || live.is_empty() {
                live.push(pool.allocate(size, 8).unwrap());
            } else if let Some(ptr) = live.pop() {
                unsafe { pool.deallocate(ptr).unwrap() };
            }
            prop_assert_eq!(pool.allocation_count() - pool.deallocation_count(), live.len());
            prop_assert_eq!(pool.outstanding(), live.len());
        }
    }
}
