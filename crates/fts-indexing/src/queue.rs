//! FIFO queue of pending indexing tasks.

use std::collections::VecDeque;

use crate::task::Task;

/// Pending tasks in submission order.
///
/// Tasks leave the queue only through [`TaskQueue::pop`], one per scheduler
/// tick. Nothing is reordered or coalesced.
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: VecDeque<Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task at the tail.
    pub fn push(&mut self, task: Task) {
        self.tasks.push_back(task);
    }

    /// Append every task, keeping their relative order.
    pub fn extend(&mut self, tasks: impl IntoIterator<Item = Task>) {
        self.tasks.extend(tasks);
    }

    /// Remove the task at the head.
    pub fn pop(&mut self) -> Option<Task> {
        self.tasks.pop_front()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
