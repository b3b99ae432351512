//! Core quest/task graph model.
//!
//! Owns the dependency graph: quests, their tasks, readiness
//! computation, and status transitions.

pub mod quest;
pub mod store;
pub mod task;

pub use quest::{Quest, QuestId, QuestStatus};
pub use store::QuestStore;
pub use task::{Task, TaskId, TaskStatus};
