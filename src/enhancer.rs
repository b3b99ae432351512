//! Decision enhancer adapter.
//!
//! Before committing an assignment, the coordinator may consult an
//! external capability that can refine the work item. The adapter is
//! optional and unreliable by contract: on error or timeout the
//! coordinator falls back to the original item unchanged.

use crate::agent::{AgentRole, AgentStatus, AgentTask};
use crate::core::quest::{QuestId, QuestStatus};
use crate::error::Result;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

/// Read-only quest summary handed to the enhancer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestSummary {
    pub id: QuestId,
    pub title: String,
    pub status: QuestStatus,
    pub task_count: usize,
}

/// Context for one enhancement call: the quest the work belongs to (if
/// any), a snapshot of worker statuses, and the candidate work item.
#[derive(Debug, Clone, Serialize)]
pub struct EnhanceContext {
    pub quest: Option<QuestSummary>,
    pub registry: Vec<(AgentRole, AgentStatus)>,
    pub task: AgentTask,
}

/// External decision-enhancement capability.
///
/// Implementations are expected to be network-bound; the coordinator
/// awaits them under a bounded timeout and never holds a store lock
/// across the call.
pub trait DecisionEnhancer: Send + Sync {
    /// Refine the first candidate for the given role. Returning an
    /// error (or exceeding the coordinator's timeout) makes the caller
    /// use the original candidate unmodified.
    fn enhance<'a>(
        &'a self,
        role: AgentRole,
        context: EnhanceContext,
        candidates: &'a [AgentTask],
    ) -> BoxFuture<'a, Result<AgentTask>>;
}

/// Enhancer that returns the first candidate unchanged.
///
/// Stands in for an absent remote capability; also useful in tests.
#[derive(Debug, Default)]
pub struct NoopEnhancer;

impl DecisionEnhancer for NoopEnhancer {
    fn enhance<'a>(
        &'a self,
        _role: AgentRole,
        context: EnhanceContext,
        candidates: &'a [AgentTask],
    ) -> BoxFuture<'a, Result<AgentTask>> {
        let task = candidates.first().cloned().unwrap_or(context.task);
        Box::pin(async move { Ok(task) })
    }
}
