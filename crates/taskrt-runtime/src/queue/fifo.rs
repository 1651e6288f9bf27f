//! FIFO queue: back-insertion, front-removal

use std::collections::VecDeque;

use taskrt_core::Priority;

use super::TaskQueue;
use crate::task::Task;

/// Insertion-ordered task queue
#[derive(Debug, Default)]
pub struct FifoQueue {
    tasks: VecDeque<Task>,
}

impl FifoQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tasks: VecDeque::with_capacity(capacity),
        }
    }
}

impl TaskQueue for FifoQueue {
    #[inline]
    fn push(&mut self, task: Task, _priority: Priority) {
        self.tasks.push_back(task);
    }

    #[inline]
    fn pop(&mut self) -> Option<Task> {
        self.tasks.pop_front()
    }

    #[inline]
    fn len(&self) -> usize {
        self.tasks.len()
    }

    fn drain(&mut self) -> Vec<Task> {
        self.tasks.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_fifo_order_ignores_priority() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut q = FifoQueue::new();
        for (i, prio) in [Priority::Low, Priority::Critical, Priority::Normal]
            .into_iter()
            .enumerate()
        {
            let log = Arc::clone(&log);
            q.push(Task::detached(move || log.lock().unwrap().push(i)), prio);
        }
        assert_eq!(q.len(), 3);

        while let Some(task) = q.pop() {
            task.run();
        }
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_drain_empties_queue() {
        let mut q = FifoQueue::with_capacity(4);
        let (task, fut) = Task::packaged(|| 9);
        q.push(task, Priority::Normal);
        let drained = q.drain();
        assert_eq!(drained.len(), 1);
        assert!(q.is_empty());
        drop(drained);
        assert!(fut.get().unwrap_err().is_cancelled());
    }
}
