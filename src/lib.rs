//! guild: task orchestration and coordination engine.
//!
//! Work is organized as quests: named units of effort decomposed into
//! tasks connected by dependency edges. A fixed roster of specialized
//! workers picks up tasks as their dependencies complete. The
//! [`Coordinator`] runs the periodic pass that matches queued work to
//! idle workers, optionally consulting a [`DecisionEnhancer`] before
//! committing each assignment.
//!
//! The crate is an in-process library: persistence, telemetry sinks,
//! and presentation are external collaborators driven through the
//! operations defined here.

pub mod agent;
pub mod config;
pub mod coordinator;
pub mod core;
pub mod enhancer;
pub mod error;
pub mod log;
pub mod queue;
pub mod registry;

pub use agent::{AgentRole, AgentStatus, AgentTask, Priority};
pub use config::Config;
pub use coordinator::{Coordinator, CoordinatorEvent};
pub use crate::core::{Quest, QuestId, QuestStatus, QuestStore, Task, TaskId, TaskStatus};
pub use enhancer::{DecisionEnhancer, EnhanceContext, NoopEnhancer, QuestSummary};
pub use error::{Error, Result};
pub use queue::TaskQueue;
pub use registry::{AgentEntry, AgentRegistry};
