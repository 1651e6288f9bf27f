//! Task queue abstraction for pool scheduling
//!
//! The pool owns exactly one queue behind one mutex; implementations are
//! plain single-threaded containers.
//!
//! # Implementations
//! - `FifoQueue` - insertion order (base pool)
//! - `PriorityQueue` - max-heap on [`Priority`] (priority pool)

mod fifo;
mod priority;

pub use fifo::FifoQueue;
pub use priority::PriorityQueue;

use taskrt_core::Priority;

use crate::task::Task;

/// Trait for pending-task containers
///
/// Called only with the pool's queue mutex held.
pub trait TaskQueue: Send + 'static {
    /// Enqueue a task
    ///
    /// # Arguments
    /// * `task` - Packaged or detached task
    /// * `priority` - Scheduling key (ignored by FIFO)
    fn push(&mut self, task: Task, priority: Priority);

    /// Next task to run, if any
    fn pop(&mut self) -> Option<Task>;

    /// Number of queued tasks
    fn len(&self) -> usize;

    /// Check if empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every queued task (shutdown discard path)
    fn drain(&mut self) -> Vec<Task>;
}
