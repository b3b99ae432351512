//! Shared fixtures for the integration suite.

use futures::future::BoxFuture;
use guild::coordinator::{Coordinator, CoordinatorEvent};
use guild::enhancer::{DecisionEnhancer, EnhanceContext};
use guild::{AgentRegistry, AgentRole, AgentTask, Error, QuestStore, Result, TaskQueue};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

/// A fully wired orchestration core with direct access to every part.
pub struct World {
    pub store: Arc<RwLock<QuestStore>>,
    pub registry: Arc<RwLock<AgentRegistry>>,
    pub queue: Arc<RwLock<TaskQueue>>,
    pub events: mpsc::Receiver<CoordinatorEvent>,
    pub coordinator: Coordinator,
}

/// Build a world with no enhancer and a fast tick for tests.
pub fn world() -> World {
    let store = Arc::new(RwLock::new(QuestStore::new()));
    let registry = Arc::new(RwLock::new(AgentRegistry::new()));
    let queue = Arc::new(RwLock::new(TaskQueue::new()));
    let (event_tx, events) = mpsc::channel(100);
    let coordinator = Coordinator::new(
        Arc::clone(&store),
        Arc::clone(&registry),
        Arc::clone(&queue),
        event_tx,
    )
    .with_tick_interval(Duration::from_millis(10))
    .with_enhancer_timeout(Duration::from_millis(50));
    World {
        store,
        registry,
        queue,
        events,
        coordinator,
    }
}

/// Enhancer that always errors, simulating a dead remote capability.
pub struct FailingEnhancer;

impl DecisionEnhancer for FailingEnhancer {
    fn enhance<'a>(
        &'a self,
        _role: AgentRole,
        _context: EnhanceContext,
        _candidates: &'a [AgentTask],
    ) -> BoxFuture<'a, Result<AgentTask>> {
        Box::pin(async { Err(Error::EnhancementFailed("simulated outage".to_string())) })
    }
}

/// Enhancer that never answers inside any reasonable timeout.
pub struct HangingEnhancer;

impl DecisionEnhancer for HangingEnhancer {
    fn enhance<'a>(
        &'a self,
        _role: AgentRole,
        _context: EnhanceContext,
        candidates: &'a [AgentTask],
    ) -> BoxFuture<'a, Result<AgentTask>> {
        let task = candidates[0].clone();
        Box::pin(async move {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(task)
        })
    }
}
