//! Task data model for the quest dependency graph.
//!
//! Graph tasks are the atomic units of quest work. Each task tracks its
//! readiness state, assignment, and lifecycle timestamps. Dependency
//! edges between tasks live in the owning quest's graph.

use crate::agent::AgentRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a task within a quest.
///
/// Uses UUID v4 for generation and provides a short form display
/// for human-readable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub Uuid);

impl TaskId {
    /// Create a new unique task identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Return first 8 characters of the UUID for display.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Readiness state of a graph task.
///
/// `Pending` means every dependency is completed and the task may be
/// assigned. `Blocked` means at least one dependency is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Dependencies satisfied, eligible for assignment.
    #[default]
    Pending,
    /// At least one dependency is not yet completed.
    Blocked,
    /// Assigned to a worker and underway.
    InProgress,
    /// Finished. Terminal.
    Completed,
}

impl TaskStatus {
    /// Completed is the only terminal state for a graph task.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Blocked => write!(f, "blocked"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A single task in a quest's dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier for this task.
    pub id: TaskId,
    /// Human-readable title.
    pub title: String,
    /// Detailed description of what the task should accomplish.
    pub description: String,
    /// Current readiness/lifecycle state.
    pub status: TaskStatus,
    /// Role of the worker assigned to this task, if any.
    pub assigned_to: Option<AgentRole>,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task was assigned and started.
    pub started_at: Option<DateTime<Utc>>,
    /// When the task completed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new pending task with the given title and description.
    pub fn new(title: &str, description: &str) -> Self {
        Self {
            id: TaskId::new(),
            title: title.to_string(),
            description: description.to_string(),
            status: TaskStatus::Pending,
            assigned_to: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Assign the task to a worker role and start it.
    pub fn start(&mut self, role: AgentRole) {
        self.status = TaskStatus::InProgress;
        self.assigned_to = Some(role);
        self.started_at = Some(Utc::now());
    }

    /// Mark the task completed.
    pub fn complete(&mut self) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Mark the task blocked on unmet dependencies.
    pub fn block(&mut self) {
        self.status = TaskStatus::Blocked;
    }

    /// Mark the task pending (all dependencies satisfied).
    pub fn unblock(&mut self) {
        self.status = TaskStatus::Pending;
    }

    /// Check if the task may be assigned right now.
    pub fn is_assignable(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    /// Check if the task has completed.
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}
