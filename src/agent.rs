//! Agent roles and dispatchable work items.
//!
//! The worker roster is a closed set of specialized roles. Each role
//! performs one kind of work on a quest deliverable. Dispatchable work
//! is modeled as [`AgentTask`], a queue entry distinct from the graph
//! tasks owned by the quest store.

use crate::core::task::TaskId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The fixed roster of worker roles.
///
/// The roster is closed: role-specific logic matches exhaustively so a
/// new role cannot be added without the compiler pointing at every
/// place that must handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    ProjectManager,
    GameDesigner,
    VisualArtist,
    NarrativeDesigner,
    SoundDesigner,
    CodeGenerator,
    QaTester,
}

impl AgentRole {
    /// All roles, in roster order.
    pub const ALL: [AgentRole; 7] = [
        AgentRole::ProjectManager,
        AgentRole::GameDesigner,
        AgentRole::VisualArtist,
        AgentRole::NarrativeDesigner,
        AgentRole::SoundDesigner,
        AgentRole::CodeGenerator,
        AgentRole::QaTester,
    ];

    /// The kind of work this role produces by default.
    pub fn default_task_kind(&self) -> &'static str {
        match self {
            AgentRole::ProjectManager => "planning",
            AgentRole::GameDesigner => "game_design",
            AgentRole::VisualArtist => "art",
            AgentRole::NarrativeDesigner => "narrative",
            AgentRole::SoundDesigner => "audio",
            AgentRole::CodeGenerator => "code",
            AgentRole::QaTester => "qa",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AgentRole::ProjectManager => "project_manager",
            AgentRole::GameDesigner => "game_designer",
            AgentRole::VisualArtist => "visual_artist",
            AgentRole::NarrativeDesigner => "narrative_designer",
            AgentRole::SoundDesigner => "sound_designer",
            AgentRole::CodeGenerator => "code_generator",
            AgentRole::QaTester => "qa_tester",
        };
        write!(f, "{}", name)
    }
}

/// Status of a worker or of a dispatched work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    Idle,
    Working,
    Completed,
    Error,
}

impl AgentStatus {
    /// Completed and Error are terminal for a work item.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentStatus::Completed | AgentStatus::Error)
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentStatus::Idle => write!(f, "idle"),
            AgentStatus::Working => write!(f, "working"),
            AgentStatus::Completed => write!(f, "completed"),
            AgentStatus::Error => write!(f, "error"),
        }
    }
}

/// Informational priority for a queued work item.
///
/// Priority is carried and displayed but does not reorder dispatch;
/// the queue is strict FIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

/// One unit of assignable work addressed to a worker role.
///
/// Distinct from a graph `Task`: an `AgentTask` lives on the dispatch
/// queue and then in a worker's active list. When `task_id` matches a
/// graph task, the coordinator keeps the two models consistent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTask {
    /// Identifier of the work item; may reference a graph task.
    pub task_id: TaskId,
    /// Free-form label for the kind of work.
    pub kind: String,
    /// Current status of the work item.
    pub status: AgentStatus,
    /// Completion progress, 0 to 100.
    pub progress: u8,
    /// The role this work is addressed to.
    pub assigned_to: AgentRole,
    /// Informational priority.
    pub priority: Priority,
    /// Optional graph task ids this work depends on.
    pub dependencies: Vec<TaskId>,
    /// Identifiers of artifacts produced so far.
    pub artifacts: Vec<String>,
    /// When the work item was created.
    pub created_at: DateTime<Utc>,
    /// When the work item was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl AgentTask {
    /// Create a new idle work item addressed to a role.
    pub fn new(task_id: TaskId, kind: &str, assigned_to: AgentRole) -> Self {
        let now = Utc::now();
        Self {
            task_id,
            kind: kind.to_string(),
            status: AgentStatus::Idle,
            progress: 0,
            assigned_to,
            priority: Priority::default(),
            dependencies: Vec::new(),
            artifacts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a work item with the role's default kind.
    pub fn for_role(task_id: TaskId, assigned_to: AgentRole) -> Self {
        Self::new(task_id, assigned_to.default_task_kind(), assigned_to)
    }

    /// Set the priority (builder style).
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the dependency list (builder style).
    pub fn with_dependencies(mut self, dependencies: Vec<TaskId>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Transition to a new status, bumping the update timestamp.
    pub fn set_status(&mut self, status: AgentStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Record progress, clamped to 0..=100.
    pub fn set_progress(&mut self, progress: u8) {
        self.progress = progress.min(100);
        self.updated_at = Utc::now();
    }

    /// Record a produced artifact identifier.
    pub fn add_artifact(&mut self, artifact: &str) {
        self.artifacts.push(artifact.to_string());
        self.updated_at = Utc::now();
    }

    /// Check if the work item reached a terminal status.
    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}
