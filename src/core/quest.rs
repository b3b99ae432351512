//! Quest model: a deliverable-producing unit of work with a task DAG.
//!
//! Each quest exclusively owns its tasks and the dependency edges
//! between them. The graph is kept acyclic: every edge insertion is
//! validated and rejected if it would close a cycle.

use crate::agent::AgentRole;
use crate::core::task::{Task, TaskId, TaskStatus};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestId(pub uuid::Uuid);

impl QuestId {
    /// Create a new unique quest identifier.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Return first 8 characters of the UUID for display.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for QuestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for QuestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    /// Accepting tasks and assignments.
    #[default]
    Active,
    /// Every task completed. Set only by the completion invariant.
    Completed,
    /// Retired; rejects further mutation.
    Archived,
}

impl std::fmt::Display for QuestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestStatus::Active => write!(f, "active"),
            QuestStatus::Completed => write!(f, "completed"),
            QuestStatus::Archived => write!(f, "archived"),
        }
    }
}

/// A quest and its task dependency graph.
///
/// Nodes are tasks; an edge `a -> b` means `b` depends on `a` (so `a`
/// must complete before `b` may start). Node insertion order is the
/// deterministic iteration order for readiness re-evaluation.
pub struct Quest {
    /// Unique identifier for this quest.
    pub id: QuestId,
    /// Human-readable title.
    pub title: String,
    /// Detailed description of the deliverable.
    pub description: String,
    /// Current lifecycle state.
    pub status: QuestStatus,
    /// When the quest was created.
    pub created_at: DateTime<Utc>,
    /// The underlying directed graph of tasks.
    graph: DiGraph<Task, ()>,
    /// Index mapping from TaskId to NodeIndex for fast lookups.
    task_index: HashMap<TaskId, NodeIndex>,
}

impl Quest {
    /// Create a new active quest with no tasks.
    pub fn new(title: &str, description: &str) -> Self {
        Self {
            id: QuestId::new(),
            title: title.to_string(),
            description: description.to_string(),
            status: QuestStatus::Active,
            created_at: Utc::now(),
            graph: DiGraph::new(),
            task_index: HashMap::new(),
        }
    }

    /// Add a task to the quest.
    ///
    /// The task starts `Pending` when every listed dependency is already
    /// completed (or there are none), otherwise `Blocked`.
    ///
    /// # Errors
    /// Returns `UnknownDependency` if any dependency id does not resolve
    /// to a task in this quest. No mutation is applied on failure.
    pub fn add_task(
        &mut self,
        title: &str,
        description: &str,
        dependencies: &[TaskId],
    ) -> Result<TaskId> {
        let task = Task::new(title, description);
        let id = task.id;

        // Validate every dependency before touching the graph
        for dep in dependencies {
            if !self.task_index.contains_key(dep) {
                return Err(Error::UnknownDependency {
                    task: id,
                    dependency: *dep,
                });
            }
        }

        let index = self.graph.add_node(task);
        self.task_index.insert(id, index);

        // A fresh node has no outgoing edges, so these cannot close a cycle
        for dep in dependencies {
            let dep_index = self.task_index[dep];
            self.graph.add_edge(dep_index, index, ());
        }

        self.refresh_readiness(&id);
        Ok(id)
    }

    /// Add a dependency edge: `task` depends on `on`.
    ///
    /// # Errors
    /// Returns `TaskNotFound` if either id is missing, `CycleDetected`
    /// if the edge would close a cycle (the graph is left unchanged),
    /// and `InvalidState` if `task` already started or completed.
    pub fn add_dependency(&mut self, task: &TaskId, on: &TaskId) -> Result<()> {
        let task_index = *self
            .task_index
            .get(task)
            .ok_or(Error::TaskNotFound(*task))?;
        let on_index = *self.task_index.get(on).ok_or(Error::TaskNotFound(*on))?;

        let status = self.graph[task_index].status;
        if matches!(status, TaskStatus::InProgress | TaskStatus::Completed) {
            return Err(Error::InvalidState(format!(
                "cannot add dependency to task {} in status {}",
                task.short(),
                status
            )));
        }

        // Tentatively add the edge, then verify acyclicity
        let edge = self.graph.add_edge(on_index, task_index, ());
        if is_cyclic_directed(&self.graph) {
            self.graph.remove_edge(edge);
            return Err(Error::CycleDetected {
                from: *task,
                on: *on,
            });
        }

        self.refresh_readiness(task);
        Ok(())
    }

    /// Get a reference to a task by its ID.
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.task_index
            .get(id)
            .and_then(|&index| self.graph.node_weight(index))
    }

    /// Get a mutable reference to a task by its ID.
    pub fn task_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        if let Some(&index) = self.task_index.get(id) {
            self.graph.node_weight_mut(index)
        } else {
            None
        }
    }

    /// All tasks in insertion order.
    pub fn tasks(&self) -> Vec<&Task> {
        self.graph
            .node_indices()
            .filter_map(|index| self.graph.node_weight(index))
            .collect()
    }

    /// Tasks the given task depends on.
    pub fn dependencies_of(&self, id: &TaskId) -> Vec<&Task> {
        if let Some(&index) = self.task_index.get(id) {
            self.graph
                .neighbors_directed(index, petgraph::Direction::Incoming)
                .filter_map(|neighbor| self.graph.node_weight(neighbor))
                .collect()
        } else {
            Vec::new()
        }
    }

    /// Tasks that depend on the given task.
    pub fn dependents_of(&self, id: &TaskId) -> Vec<&Task> {
        if let Some(&index) = self.task_index.get(id) {
            self.graph
                .neighbors_directed(index, petgraph::Direction::Outgoing)
                .filter_map(|neighbor| self.graph.node_weight(neighbor))
                .collect()
        } else {
            Vec::new()
        }
    }

    /// Check whether every dependency of a task is completed.
    pub fn dependencies_satisfied(&self, id: &TaskId) -> bool {
        if let Some(&index) = self.task_index.get(id) {
            self.graph
                .neighbors_directed(index, petgraph::Direction::Incoming)
                .all(|dep_index| {
                    self.graph
                        .node_weight(dep_index)
                        .map(|dep| dep.is_completed())
                        .unwrap_or(false)
                })
        } else {
            false
        }
    }

    /// Check if the quest contains a task.
    pub fn contains_task(&self, id: &TaskId) -> bool {
        self.task_index.contains_key(id)
    }

    /// Number of tasks in the quest.
    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of dependency edges in the quest.
    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Check if the quest has no tasks.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Assign a pending task to a worker role.
    ///
    /// # Errors
    /// `DependencyNotSatisfied` when the task is blocked, `InvalidState`
    /// when it already started or completed, `TaskNotFound` when missing.
    pub fn assign(&mut self, id: &TaskId, role: AgentRole) -> Result<()> {
        let index = *self.task_index.get(id).ok_or(Error::TaskNotFound(*id))?;
        let task = &mut self.graph[index];
        match task.status {
            TaskStatus::Pending => {
                task.start(role);
                Ok(())
            }
            TaskStatus::Blocked => Err(Error::DependencyNotSatisfied(*id)),
            TaskStatus::InProgress | TaskStatus::Completed => Err(Error::InvalidState(format!(
                "task {} is already {}",
                id.short(),
                task.status
            ))),
        }
    }

    /// Apply a status transition to a task.
    ///
    /// On transition to `Completed`, blocked dependents whose remaining
    /// dependencies are now all completed become `Pending`, processed in
    /// quest insertion order, and the quest's completion invariant is
    /// re-evaluated. Re-applying `Completed` to a completed task is a
    /// no-op; any other transition out of `Completed` is rejected. A
    /// transition to `InProgress` requires every dependency to be
    /// completed, the same readiness rule `assign` enforces.
    ///
    /// Returns the ids of tasks unblocked by this transition.
    pub fn update_task_status(&mut self, id: &TaskId, status: TaskStatus) -> Result<Vec<TaskId>> {
        let index = *self.task_index.get(id).ok_or(Error::TaskNotFound(*id))?;

        // Terminal status never regresses
        if self.graph[index].status == TaskStatus::Completed {
            if status == TaskStatus::Completed {
                return Ok(Vec::new());
            }
            return Err(Error::InvalidState(format!(
                "task {} is completed and cannot transition to {}",
                id.short(),
                status
            )));
        }

        let mut unblocked = Vec::new();
        match status {
            TaskStatus::Completed => {
                self.graph[index].complete();
                unblocked = self.unblock_ready_dependents(id);
                self.refresh_completion();
            }
            TaskStatus::InProgress if !self.dependencies_satisfied(id) => {
                return Err(Error::DependencyNotSatisfied(*id));
            }
            other => {
                self.graph[index].status = other;
            }
        }

        Ok(unblocked)
    }

    /// Recompute a not-yet-started task's readiness from its dependencies.
    fn refresh_readiness(&mut self, id: &TaskId) {
        let satisfied = self.dependencies_satisfied(id);
        if let Some(task) = self.task_mut(id) {
            if matches!(task.status, TaskStatus::Pending | TaskStatus::Blocked) {
                if satisfied {
                    task.unblock();
                } else {
                    task.block();
                }
            }
        }
    }

    /// Unblock dependents of a completed task, in insertion order.
    fn unblock_ready_dependents(&mut self, completed: &TaskId) -> Vec<TaskId> {
        let completed_index = match self.task_index.get(completed) {
            Some(&index) => index,
            None => return Vec::new(),
        };

        // node_indices() iterates in insertion order, which keeps the
        // re-evaluation deterministic
        let candidates: Vec<TaskId> = self
            .graph
            .node_indices()
            .filter(|&index| {
                self.graph.contains_edge(completed_index, index)
                    && self.graph[index].status == TaskStatus::Blocked
            })
            .map(|index| self.graph[index].id)
            .collect();

        let mut unblocked = Vec::new();
        for candidate in candidates {
            if self.dependencies_satisfied(&candidate) {
                if let Some(task) = self.task_mut(&candidate) {
                    task.unblock();
                }
                unblocked.push(candidate);
            }
        }
        unblocked
    }

    /// Re-evaluate the completion invariant: a non-empty quest whose
    /// tasks are all completed becomes `Completed`.
    fn refresh_completion(&mut self) {
        if self.status != QuestStatus::Active {
            return;
        }
        if !self.is_empty() && self.graph.node_weights().all(|task| task.is_completed()) {
            self.status = QuestStatus::Completed;
        }
    }
}

impl std::fmt::Debug for Quest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Quest")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("status", &self.status)
            .field("tasks", &self.task_count())
            .field("dependencies", &self.dependency_count())
            .finish()
    }
}
