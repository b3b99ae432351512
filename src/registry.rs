//! Agent registry: source of truth for worker availability.
//!
//! One entry per role in the fixed roster. An entry tracks the worker's
//! status and its ordered list of active work items. A worker is
//! `Working` iff at least one of its items is `Working`; detaching the
//! last item reverts the worker to `Idle`.

use crate::agent::{AgentRole, AgentStatus, AgentTask};
use crate::core::task::TaskId;
use crate::error::{Error, Result};
use std::collections::HashMap;

/// State of one worker in the roster.
#[derive(Debug, Clone, Default)]
pub struct AgentEntry {
    /// Current worker status.
    pub status: AgentStatus,
    /// Active work items, in attachment order.
    pub tasks: Vec<AgentTask>,
}

/// Fixed table of worker entries, one per [`AgentRole`].
#[derive(Debug)]
pub struct AgentRegistry {
    entries: HashMap<AgentRole, AgentEntry>,
}

impl AgentRegistry {
    /// Create a registry with every role idle and unloaded.
    pub fn new() -> Self {
        let entries = AgentRole::ALL
            .iter()
            .map(|role| (*role, AgentEntry::default()))
            .collect();
        Self { entries }
    }

    fn entry(&self, role: AgentRole) -> &AgentEntry {
        // The roster is closed and fully populated at construction
        &self.entries[&role]
    }

    fn entry_mut(&mut self, role: AgentRole) -> &mut AgentEntry {
        self.entries.get_mut(&role).unwrap()
    }

    /// Current status of a worker.
    pub fn status(&self, role: AgentRole) -> AgentStatus {
        self.entry(role).status
    }

    /// Overwrite a worker's status. Last write wins; used by both the
    /// coordinator and external status reports.
    pub fn set_status(&mut self, role: AgentRole, status: AgentStatus) {
        self.entry_mut(role).status = status;
    }

    /// Active work items of a worker, in attachment order.
    pub fn tasks(&self, role: AgentRole) -> &[AgentTask] {
        &self.entry(role).tasks
    }

    /// Attach a work item to a worker and mark both `Working`.
    pub fn attach_task(&mut self, role: AgentRole, mut task: AgentTask) {
        task.assigned_to = role;
        task.set_status(AgentStatus::Working);
        let entry = self.entry_mut(role);
        entry.tasks.push(task);
        entry.status = AgentStatus::Working;
    }

    /// Detach a work item after it reached a terminal status.
    ///
    /// Reverts the worker to `Idle` when no active items remain.
    ///
    /// # Errors
    /// Returns `TaskNotFound` if the worker holds no such item.
    pub fn detach_task(&mut self, role: AgentRole, task_id: &TaskId) -> Result<AgentTask> {
        let entry = self.entry_mut(role);
        let position = entry
            .tasks
            .iter()
            .position(|t| t.task_id == *task_id)
            .ok_or(Error::TaskNotFound(*task_id))?;
        let task = entry.tasks.remove(position);

        if !entry.tasks.iter().any(|t| t.status == AgentStatus::Working) {
            entry.status = AgentStatus::Idle;
        }
        Ok(task)
    }

    /// Record progress on a worker's active item, clamped to 0..=100.
    ///
    /// # Errors
    /// Returns `TaskNotFound` if the worker holds no such item.
    pub fn update_progress(&mut self, role: AgentRole, task_id: &TaskId, progress: u8) -> Result<()> {
        let entry = self.entry_mut(role);
        let task = entry
            .tasks
            .iter_mut()
            .find(|t| t.task_id == *task_id)
            .ok_or(Error::TaskNotFound(*task_id))?;
        task.set_progress(progress);
        Ok(())
    }

    /// Mark a worker's item with a status; terminal statuses detach it.
    ///
    /// Returns the item when it was detached.
    pub fn report_task_status(
        &mut self,
        role: AgentRole,
        task_id: &TaskId,
        status: AgentStatus,
    ) -> Result<Option<AgentTask>> {
        let entry = self.entry_mut(role);
        let task = entry
            .tasks
            .iter_mut()
            .find(|t| t.task_id == *task_id)
            .ok_or(Error::TaskNotFound(*task_id))?;
        task.set_status(status);

        if status.is_terminal() {
            return self.detach_task(role, task_id).map(Some);
        }
        Ok(None)
    }

    /// Snapshot of every worker's status, in roster order.
    pub fn status_snapshot(&self) -> Vec<(AgentRole, AgentStatus)> {
        AgentRole::ALL
            .iter()
            .map(|role| (*role, self.status(*role)))
            .collect()
    }

    /// Roles currently idle, in roster order.
    pub fn idle_roles(&self) -> Vec<AgentRole> {
        AgentRole::ALL
            .iter()
            .filter(|role| self.status(**role) == AgentStatus::Idle)
            .copied()
            .collect()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
