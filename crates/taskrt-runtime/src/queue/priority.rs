//! Max-heap queue keyed on task priority
//!
//! # Complexity
//!
//! - Push: O(log n)
//! - Pop: O(log n)
//!
//! Equal priorities are broken by submission sequence (earlier first). That
//! is a property of this implementation, not part of the pool contract.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use taskrt_core::Priority;

use super::TaskQueue;
use crate::task::Task;

/// Wrapper for heap ordering (max-heap by priority)
struct HeapEntry {
    priority: Priority,
    seq: u64,
    task: Task,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher priority first; tie-break on lower sequence
        match self.priority.cmp(&other.priority) {
            Ordering::Equal => other.seq.cmp(&self.seq),
            ord => ord,
        }
    }
}

/// Priority-ordered task queue
#[derive(Default)]
pub struct PriorityQueue {
    heap: BinaryHeap<HeapEntry>,
    next_seq: u64,
}

impl PriorityQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            next_seq: 0,
        }
    }

    /// Priority of the task that `pop` would return
    pub fn peek_priority(&self) -> Option<Priority> {
        self.heap.peek().map(|e| e.priority)
    }
}

impl TaskQueue for PriorityQueue {
    fn push(&mut self, task: Task, priority: Priority) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.heap.push(HeapEntry {
            priority,
            seq,
            task,
        });
    }

    fn pop(&mut self) -> Option<Task> {
        self.heap.pop().map(|e| e.task)
    }

    #[inline]
    fn len(&self) -> usize {
        self.heap.len()
    }

    fn drain(&mut self) -> Vec<Task> {
        self.heap.drain().map(|e| e.task).collect()
    }
}

impl std::fmt::Debug for PriorityQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityQueue")
            .field("len", &self.heap.len())
            .field("top", &self.peek_priority())
            .finish()
    }
}
