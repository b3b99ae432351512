//! Concurrency: the loop and direct assignment racing for one worker.

use crate::fixtures::world;
use guild::{AgentRole, AgentStatus, AgentTask, Error, TaskId};
use std::sync::Arc;

#[tokio::test]
async fn concurrent_tick_and_direct_commit_exactly_once() {
    for _ in 0..20 {
        let w = world();
        let queued = AgentTask::for_role(TaskId::new(), AgentRole::CodeGenerator);
        let direct = AgentTask::for_role(TaskId::new(), AgentRole::CodeGenerator);
        w.queue.write().await.enqueue(queued.clone());

        let coordinator = Arc::new(w.coordinator);
        let tick = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.tick().await })
        };
        let direct_call = {
            let coordinator = Arc::clone(&coordinator);
            let direct = direct.clone();
            tokio::spawn(async move {
                coordinator
                    .assign_task_to_agent(direct, AgentRole::CodeGenerator)
                    .await
            })
        };

        tick.await.unwrap();
        let direct_result = direct_call.await.unwrap();

        // Exactly one work item is attached, no matter who won
        let registry = w.registry.read().await;
        let held = registry.tasks(AgentRole::CodeGenerator);
        assert_eq!(held.len(), 1);
        assert_eq!(registry.status(AgentRole::CodeGenerator), AgentStatus::Working);

        match direct_result {
            Ok(()) if held[0].task_id == direct.task_id => {
                // Direct call won; the queued entry waits for the next tick
                assert!(w.queue.read().await.contains(&queued.task_id));
            }
            Ok(()) => panic!("direct call reported success without attaching"),
            Err(Error::AssignmentConflict(_)) => {
                // Loop won; the queue entry was consumed
                assert_eq!(held[0].task_id, queued.task_id);
                assert!(w.queue.read().await.is_empty());
            }
            Err(other) => panic!("unexpected error: {}", other),
        }
    }
}

#[tokio::test]
async fn same_entry_never_dispatched_twice() {
    for _ in 0..20 {
        let w = world();
        let entry = AgentTask::for_role(TaskId::new(), AgentRole::VisualArtist);
        w.queue.write().await.enqueue(entry.clone());

        // Two concurrent ticks over the same snapshot
        let coordinator = Arc::new(w.coordinator);
        let first = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.tick().await })
        };
        let second = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.tick().await })
        };
        first.await.unwrap();
        second.await.unwrap();

        let registry = w.registry.read().await;
        assert_eq!(registry.tasks(AgentRole::VisualArtist).len(), 1);
        assert!(w.queue.read().await.is_empty());
    }
}

#[tokio::test]
async fn direct_assignments_to_distinct_workers_do_not_interfere() {
    let w = world();
    let coordinator = Arc::new(w.coordinator);

    let mut handles = Vec::new();
    for role in [
        AgentRole::GameDesigner,
        AgentRole::VisualArtist,
        AgentRole::SoundDesigner,
        AgentRole::CodeGenerator,
    ] {
        let coordinator = Arc::clone(&coordinator);
        handles.push(tokio::spawn(async move {
            let task = AgentTask::for_role(TaskId::new(), role);
            coordinator.assign_task_to_agent(task, role).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let registry = w.registry.read().await;
    for role in [
        AgentRole::GameDesigner,
        AgentRole::VisualArtist,
        AgentRole::SoundDesigner,
        AgentRole::CodeGenerator,
    ] {
        assert_eq!(registry.status(role), AgentStatus::Working);
        assert_eq!(registry.tasks(role).len(), 1);
    }
    assert_eq!(registry.status(AgentRole::ProjectManager), AgentStatus::Idle);
}
