//! Quest store: owner of all quests and their task graphs.
//!
//! The store is the single entry point for graph mutation. It is an
//! explicitly constructed value (no process-wide singleton); callers
//! and the coordinator share it behind a lock.

use crate::agent::AgentRole;
use crate::core::quest::{Quest, QuestId, QuestStatus};
use crate::core::task::{TaskId, TaskStatus};
use crate::error::{Error, Result};
use crate::glog_debug;

/// Owns every quest and routes graph operations to them.
#[derive(Debug, Default)]
pub struct QuestStore {
    /// Quests in creation order.
    quests: Vec<Quest>,
}

impl QuestStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self { quests: Vec::new() }
    }

    /// Allocate a new active quest. Always succeeds.
    pub fn create_quest(&mut self, title: &str, description: &str) -> QuestId {
        let quest = Quest::new(title, description);
        let id = quest.id;
        glog_debug!("QuestStore::create_quest id={} title={}", id.short(), title);
        self.quests.push(quest);
        id
    }

    /// Get a quest by id.
    pub fn quest(&self, id: &QuestId) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == *id)
    }

    fn quest_mut(&mut self, id: &QuestId) -> Result<&mut Quest> {
        self.quests
            .iter_mut()
            .find(|q| q.id == *id)
            .ok_or(Error::QuestNotFound(*id))
    }

    fn mutable_quest(&mut self, id: &QuestId) -> Result<&mut Quest> {
        let quest = self.quest_mut(id)?;
        if quest.status == QuestStatus::Archived {
            return Err(Error::InvalidState(format!(
                "quest {} is archived",
                id.short()
            )));
        }
        Ok(quest)
    }

    /// All quests in creation order.
    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    /// Find the quest containing a given task.
    pub fn quest_for_task(&self, task_id: &TaskId) -> Option<QuestId> {
        self.quests
            .iter()
            .find(|q| q.contains_task(task_id))
            .map(|q| q.id)
    }

    /// Add a task to a quest. See [`Quest::add_task`] for semantics.
    pub fn add_task(
        &mut self,
        quest_id: &QuestId,
        title: &str,
        description: &str,
        dependencies: &[TaskId],
    ) -> Result<TaskId> {
        let id = self
            .mutable_quest(quest_id)?
            .add_task(title, description, dependencies)?;
        glog_debug!(
            "QuestStore::add_task quest={} task={} deps={}",
            quest_id.short(),
            id.short(),
            dependencies.len()
        );
        Ok(id)
    }

    /// Add a dependency edge within a quest. Rejects cycles.
    pub fn add_dependency(
        &mut self,
        quest_id: &QuestId,
        task: &TaskId,
        on: &TaskId,
    ) -> Result<()> {
        self.mutable_quest(quest_id)?.add_dependency(task, on)
    }

    /// Assign a pending task to a worker role.
    pub fn assign_task(
        &mut self,
        quest_id: &QuestId,
        task_id: &TaskId,
        role: AgentRole,
    ) -> Result<()> {
        self.mutable_quest(quest_id)?.assign(task_id, role)?;
        glog_debug!(
            "QuestStore::assign_task quest={} task={} role={}",
            quest_id.short(),
            task_id.short(),
            role
        );
        Ok(())
    }

    /// Apply a status transition; returns ids of tasks it unblocked.
    pub fn update_task_status(
        &mut self,
        quest_id: &QuestId,
        task_id: &TaskId,
        status: TaskStatus,
    ) -> Result<Vec<TaskId>> {
        let unblocked = self
            .mutable_quest(quest_id)?
            .update_task_status(task_id, status)?;
        if !unblocked.is_empty() {
            glog_debug!(
                "QuestStore::update_task_status task={} -> {} unblocked={}",
                task_id.short(),
                status,
                unblocked.len()
            );
        }
        Ok(unblocked)
    }

    /// Retire a quest. Archived quests reject further mutation.
    pub fn archive_quest(&mut self, quest_id: &QuestId) -> Result<()> {
        let quest = self.quest_mut(quest_id)?;
        quest.status = QuestStatus::Archived;
        Ok(())
    }
}
