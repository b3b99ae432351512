//! Coordination loop: matches queued work to idle workers.
//!
//! The coordinator runs a recurring pass over the task queue. For each
//! queued entry whose target worker is idle, it optionally consults the
//! decision enhancer, then commits the assignment: the work item moves
//! from the queue to the worker's active list and, when the item
//! references a graph task, the quest store transitions that task to
//! in-progress in the same commit.
//!
//! Locking discipline: store, then registry, then queue. The enhancer
//! call is the only significant await and holds no lock. The commit
//! (idle re-check, graph sync, queue removal, attach) happens under the
//! write locks as one unit, so the loop and direct calls cannot
//! double-assign a worker or dispatch an entry twice.

use crate::agent::{AgentRole, AgentStatus, AgentTask};
use crate::core::quest::QuestId;
use crate::core::store::QuestStore;
use crate::core::task::TaskId;
use crate::enhancer::{DecisionEnhancer, EnhanceContext, QuestSummary};
use crate::error::{Error, Result};
use crate::queue::TaskQueue;
use crate::registry::AgentRegistry;
use crate::{glog_debug, glog_error, glog_warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;

/// Events emitted by the coordinator for observation.
///
/// These let a presentation layer react to assignments without polling.
/// Delivery is best effort; a full or dropped channel never fails an
/// assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorEvent {
    /// A work item was committed to a worker.
    Assigned {
        /// The worker that received the item.
        role: AgentRole,
        /// The dispatched work item id.
        task_id: TaskId,
    },
    /// The enhancer failed or timed out; the original item was used.
    EnhancementFallback {
        /// The worker the item is addressed to.
        role: AgentRole,
        /// The work item id.
        task_id: TaskId,
        /// The failure that was absorbed.
        error: String,
    },
    /// An entry stayed queued for a later tick.
    Requeued {
        /// The work item id.
        task_id: TaskId,
        /// Why it could not be dispatched this tick.
        reason: String,
    },
    /// An entry was removed without dispatch; it can never succeed.
    Dropped {
        /// The work item id.
        task_id: TaskId,
        /// The error that disqualified it.
        error: String,
    },
    /// A quest's tasks are all completed.
    QuestCompleted {
        /// The quest that completed.
        quest_id: QuestId,
    },
}

/// Outcome of one dispatch attempt, for callers that need to know
/// whether the entry moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DispatchOutcome {
    /// Committed to the worker.
    Assigned,
    /// Left queued (worker busy or dependencies unmet).
    Requeued,
    /// Removed without dispatch.
    Dropped,
    /// Entry no longer queued; another path dispatched it.
    AlreadyDispatched,
}

/// The scheduler that drives assignment.
///
/// Explicitly constructed and explicitly stopped: `run()` polls on a
/// fixed period until the cancellation token fires, and `tick()` is
/// public so tests can drive the loop deterministically.
pub struct Coordinator {
    store: Arc<RwLock<QuestStore>>,
    registry: Arc<RwLock<AgentRegistry>>,
    queue: Arc<RwLock<TaskQueue>>,
    enhancer: Option<Arc<dyn DecisionEnhancer>>,
    enhancer_timeout: Duration,
    tick_interval: Duration,
    event_tx: mpsc::Sender<CoordinatorEvent>,
    shutdown: CancellationToken,
}

impl Coordinator {
    /// Create a coordinator over shared store, registry, and queue.
    pub fn new(
        store: Arc<RwLock<QuestStore>>,
        registry: Arc<RwLock<AgentRegistry>>,
        queue: Arc<RwLock<TaskQueue>>,
        event_tx: mpsc::Sender<CoordinatorEvent>,
    ) -> Self {
        Self {
            store,
            registry,
            queue,
            enhancer: None,
            enhancer_timeout: Duration::from_millis(crate::config::DEFAULT_ENHANCER_TIMEOUT_MS),
            tick_interval: Duration::from_secs(crate::config::DEFAULT_TICK_SECS),
            event_tx,
            shutdown: CancellationToken::new(),
        }
    }

    /// Attach a decision enhancer (builder style).
    pub fn with_enhancer(mut self, enhancer: Arc<dyn DecisionEnhancer>) -> Self {
        self.enhancer = Some(enhancer);
        self
    }

    /// Override the coordination period (builder style).
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Override the enhancement timeout (builder style).
    pub fn with_enhancer_timeout(mut self, timeout: Duration) -> Self {
        self.enhancer_timeout = timeout;
        self
    }

    /// Token that stops `run()` when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run the coordination loop until the shutdown token fires.
    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    glog_debug!("Coordinator shutting down");
                    break;
                }
                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }
    }

    /// One coordination pass: drain the queue snapshot against the
    /// registry. A failure on one entry never halts the rest.
    pub async fn tick(&self) {
        let snapshot = {
            let queue = self.queue.read().await;
            queue.snapshot()
        };
        if snapshot.is_empty() {
            return;
        }
        glog_debug!("Coordinator tick: {} queued entries", snapshot.len());

        for entry in snapshot {
            let task_id = entry.task_id;
            if let Err(err) = self.try_dispatch(entry).await {
                glog_error!("dispatch of {} failed: {}", task_id.short(), err);
            }
        }
    }

    /// Direct, non-loop assignment bypassing queue wait.
    ///
    /// Performs enhancement and commit synchronously with the same
    /// discipline as the loop.
    ///
    /// # Errors
    /// `AssignmentConflict` when the worker is not idle at commit time;
    /// graph-store errors (`DependencyNotSatisfied`, `InvalidState`)
    /// when the referenced graph task cannot start.
    pub async fn assign_task_to_agent(&self, task: AgentTask, role: AgentRole) -> Result<()> {
        {
            let registry = self.registry.read().await;
            if registry.status(role) != AgentStatus::Idle {
                return Err(Error::AssignmentConflict(role));
            }
        }

        let enhanced = self.enhance_or_fallback(role, &task).await;
        match self.commit(role, &task, enhanced, false).await? {
            DispatchOutcome::Assigned => Ok(()),
            DispatchOutcome::Requeued | DispatchOutcome::AlreadyDispatched => {
                Err(Error::AssignmentConflict(role))
            }
            DispatchOutcome::Dropped => Err(Error::InvalidState(format!(
                "task {} cannot be assigned",
                task.task_id.short()
            ))),
        }
    }

    /// Attempt to dispatch one queued entry.
    async fn try_dispatch(&self, entry: AgentTask) -> Result<()> {
        let role = entry.assigned_to;

        // Cheap pre-check; the authoritative check happens at commit
        {
            let registry = self.registry.read().await;
            if registry.status(role) != AgentStatus::Idle {
                return Ok(());
            }
        }

        let enhanced = self.enhance_or_fallback(role, &entry).await;
        let outcome = self.commit(role, &entry, enhanced, true).await?;
        glog_debug!(
            "dispatch {} to {}: {:?}",
            entry.task_id.short(),
            role,
            outcome
        );
        Ok(())
    }

    /// Consult the enhancer under a bounded timeout, no locks held.
    ///
    /// Any failure is absorbed: the original item is used and a
    /// fallback event is recorded.
    async fn enhance_or_fallback(&self, role: AgentRole, task: &AgentTask) -> AgentTask {
        let enhancer = match &self.enhancer {
            Some(enhancer) => Arc::clone(enhancer),
            None => return task.clone(),
        };

        let context = self.build_context(task).await;
        let candidates = [task.clone()];
        let call = enhancer.enhance(role, context, &candidates);

        let failure = match tokio::time::timeout(self.enhancer_timeout, call).await {
            Ok(Ok(enhanced)) => return enhanced,
            Ok(Err(err)) => err.to_string(),
            Err(_) => Error::Timeout(self.enhancer_timeout).to_string(),
        };

        glog_warn!(
            "enhancement failed for {} ({}), using original task: {}",
            task.task_id.short(),
            role,
            failure
        );
        self.emit(CoordinatorEvent::EnhancementFallback {
            role,
            task_id: task.task_id,
            error: failure,
        });
        task.clone()
    }

    /// Snapshot quest and registry state for the enhancer. Read locks
    /// only, released before the enhancer is awaited.
    async fn build_context(&self, task: &AgentTask) -> EnhanceContext {
        let quest = {
            let store = self.store.read().await;
            store
                .quest_for_task(&task.task_id)
                .and_then(|quest_id| store.quest(&quest_id))
                .map(|quest| QuestSummary {
                    id: quest.id,
                    title: quest.title.clone(),
                    status: quest.status,
                    task_count: quest.task_count(),
                })
        };
        let registry = {
            let registry = self.registry.read().await;
            registry.status_snapshot()
        };
        EnhanceContext {
            quest,
            registry,
            task: task.clone(),
        }
    }

    /// Commit an assignment as one atomic unit.
    ///
    /// Under store -> registry -> queue write locks: re-check the worker
    /// is still idle, sync the graph task when the entry references one,
    /// remove the queue entry, and attach the item to the worker.
    async fn commit(
        &self,
        role: AgentRole,
        original: &AgentTask,
        enhanced: AgentTask,
        queued: bool,
    ) -> Result<DispatchOutcome> {
        let mut store = self.store.write().await;
        let mut registry = self.registry.write().await;
        let mut queue = self.queue.write().await;

        if queued && !queue.contains(&original.task_id) {
            return Ok(DispatchOutcome::AlreadyDispatched);
        }

        // Raced by a concurrent assignment: leave the entry queued
        if registry.status(role) != AgentStatus::Idle {
            if queued {
                self.emit(CoordinatorEvent::Requeued {
                    task_id: original.task_id,
                    reason: format!("agent {} is busy", role),
                });
                return Ok(DispatchOutcome::Requeued);
            }
            return Err(Error::AssignmentConflict(role));
        }

        // Keep the graph model consistent when the entry references a
        // graph task
        if let Some(quest_id) = store.quest_for_task(&original.task_id) {
            match store.assign_task(&quest_id, &original.task_id, role) {
                Ok(()) => {}
                Err(Error::DependencyNotSatisfied(id)) => {
                    if queued {
                        self.emit(CoordinatorEvent::Requeued {
                            task_id: original.task_id,
                            reason: "dependencies not satisfied".to_string(),
                        });
                        return Ok(DispatchOutcome::Requeued);
                    }
                    return Err(Error::DependencyNotSatisfied(id));
                }
                Err(err) => {
                    glog_error!(
                        "graph sync for {} failed, dropping entry: {}",
                        original.task_id.short(),
                        err
                    );
                    if queued {
                        queue.remove(&original.task_id);
                        self.emit(CoordinatorEvent::Dropped {
                            task_id: original.task_id,
                            error: err.to_string(),
                        });
                        return Ok(DispatchOutcome::Dropped);
                    }
                    return Err(err);
                }
            }
        }

        // A direct assignment may have a queued copy of the same entry;
        // consume it here so no later tick can dispatch it again
        queue.remove(&original.task_id);
        registry.attach_task(role, enhanced);

        self.emit(CoordinatorEvent::Assigned {
            role,
            task_id: original.task_id,
        });
        Ok(DispatchOutcome::Assigned)
    }

    /// Report a work item's terminal or progress status back into the
    /// registry and, when it references a graph task, into the store.
    ///
    /// Completion may unblock dependents and complete the quest; a
    /// completed quest is announced with a `QuestCompleted` event.
    pub async fn report_status(
        &self,
        role: AgentRole,
        task_id: &TaskId,
        status: AgentStatus,
    ) -> Result<()> {
        {
            let mut registry = self.registry.write().await;
            registry.report_task_status(role, task_id, status)?;
        }

        if status != AgentStatus::Completed {
            return Ok(());
        }

        let completed_quest = {
            let mut store = self.store.write().await;
            match store.quest_for_task(task_id) {
                Some(quest_id) => {
                    store.update_task_status(
                        &quest_id,
                        task_id,
                        crate::core::task::TaskStatus::Completed,
                    )?;
                    store
                        .quest(&quest_id)
                        .filter(|q| q.status == crate::core::quest::QuestStatus::Completed)
                        .map(|q| q.id)
                }
                None => None,
            }
        };

        if let Some(quest_id) = completed_quest {
            self.emit(CoordinatorEvent::QuestCompleted { quest_id });
        }
        Ok(())
    }

    /// Best-effort event delivery. Never blocks: a full or closed
    /// channel drops the event rather than stalling a commit that may
    /// hold the store locks.
    fn emit(&self, event: CoordinatorEvent) {
        let _ = self.event_tx.try_send(event);
    }
}
