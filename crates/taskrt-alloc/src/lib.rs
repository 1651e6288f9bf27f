//! # taskrt-alloc
//!
//! Special-purpose allocators for task payloads and per-worker scratch.
//!
//! | Allocator | Backing | Free | Reset |
//! |---|---|---|---|
//! | `LinearAllocator<N>` | inline `[u8; N]` | no-op | yes |
//! | `MonotonicAllocator` | heap, runtime size | no-op | yes |
//! | `ObjectPool` / `TypedPool<T>` | heap blocks of uniform slots | O(1) | no |
//! | `FreeListAllocator` | one heap buffer, first fit | O(1) push | yes |
//!
//! All of them report exhaustion as `AllocError::OutOfMemory` and a bad
//! alignment as `AllocError::InvalidArgument`. None is thread-safe: give
//! each worker its own, or put one behind a lock.
//!
//! `AllocatorRef` adapts any of them to typed, container-style use;
//! `AllocVec` is a vector built on it.

mod align;
mod buffer;
mod bump;

pub mod traits;
pub mod linear;
pub mod monotonic;
pub mod object_pool;
pub mod free_list;
pub mod adapter;

// Re-exports
pub use adapter::{AllocVec, AllocatorRef};
pub use free_list::FreeListAllocator;
pub use linear::LinearAllocator;
pub use monotonic::MonotonicAllocator;
pub use object_pool::{ObjectPool, TypedPool};
pub use traits::{MemoryUsage, RawAllocator, Resettable};

pub use align::{align_up, padding_for};
