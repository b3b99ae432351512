//! FIFO queue of work items awaiting dispatch.
//!
//! Entries hold [`AgentTask`] values by value until the coordinator
//! dispatches them to the registry. Submission order is preserved;
//! `priority` on an entry is informational and never reorders dispatch.

use crate::agent::AgentTask;
use crate::core::task::TaskId;
use std::collections::VecDeque;

/// Ordered collection of pending assignment requests.
#[derive(Debug, Default)]
pub struct TaskQueue {
    entries: VecDeque<AgentTask>,
}

impl TaskQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Append a work item at the back of the queue.
    pub fn enqueue(&mut self, task: AgentTask) {
        self.entries.push_back(task);
    }

    /// Read-only snapshot of queued entries in submission order.
    pub fn snapshot(&self) -> Vec<AgentTask> {
        self.entries.iter().cloned().collect()
    }

    /// Remove a specific entry by task id. No-op if absent.
    ///
    /// Returns the removed entry so the caller can hand it off.
    pub fn remove(&mut self, task_id: &TaskId) -> Option<AgentTask> {
        let position = self.entries.iter().position(|t| t.task_id == *task_id)?;
        self.entries.remove(position)
    }

    /// Cancel a queued entry. Same as [`remove`](Self::remove) but
    /// discards the entry; a no-op once the entry was dispatched.
    pub fn cancel(&mut self, task_id: &TaskId) {
        let _ = self.remove(task_id);
    }

    /// Check whether an entry is still queued.
    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.entries.iter().any(|t| t.task_id == *task_id)
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
