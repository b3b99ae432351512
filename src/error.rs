use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Quest not found: {0}")]
    QuestNotFound(crate::core::quest::QuestId),

    #[error("Task not found: {0}")]
    TaskNotFound(crate::core::task::TaskId),

    #[error("Unknown dependency: task {task} depends on missing task {dependency}")]
    UnknownDependency {
        task: crate::core::task::TaskId,
        dependency: crate::core::task::TaskId,
    },

    #[error("Adding dependency from {from} on {on} would create a cycle")]
    CycleDetected {
        from: crate::core::task::TaskId,
        on: crate::core::task::TaskId,
    },

    #[error("Dependencies not satisfied for task {0}")]
    DependencyNotSatisfied(crate::core::task::TaskId),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Decision enhancement failed: {0}")]
    EnhancementFailed(String),

    #[error("Assignment conflict: agent {0} is no longer idle")]
    AssignmentConflict(crate::agent::AgentRole),

    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

pub type Result<T> = std::result::Result<T, Error>;
