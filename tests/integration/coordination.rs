//! Coordination loop behavior: dispatch, enhancer fallback, reports.

use crate::fixtures::{world, FailingEnhancer, HangingEnhancer};
use guild::coordinator::CoordinatorEvent;
use guild::{AgentRole, AgentStatus, AgentTask, QuestStatus, TaskId, TaskStatus};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn enhancer_failure_assigns_original_task() {
    let mut w = world();
    w.coordinator = w.coordinator.with_enhancer(Arc::new(FailingEnhancer));

    let entry = AgentTask::for_role(TaskId::new(), AgentRole::GameDesigner);
    w.queue.write().await.enqueue(entry.clone());

    w.coordinator.tick().await;

    // Worker went to work on the unmodified task
    let registry = w.registry.read().await;
    assert_eq!(registry.status(AgentRole::GameDesigner), AgentStatus::Working);
    let held = registry.tasks(AgentRole::GameDesigner);
    assert_eq!(held[0].task_id, entry.task_id);
    assert_eq!(held[0].kind, entry.kind);
    drop(registry);
    assert!(w.queue.read().await.is_empty());

    // The fallback surfaced as an event, not as a caller error
    let first = w.events.recv().await.unwrap();
    assert!(matches!(
        first,
        CoordinatorEvent::EnhancementFallback {
            role: AgentRole::GameDesigner,
            ..
        }
    ));
    let second = w.events.recv().await.unwrap();
    assert_eq!(
        second,
        CoordinatorEvent::Assigned {
            role: AgentRole::GameDesigner,
            task_id: entry.task_id,
        }
    );
}

#[tokio::test(start_paused = true)]
async fn enhancer_timeout_assigns_original_task() {
    let mut w = world();
    w.coordinator = w.coordinator.with_enhancer(Arc::new(HangingEnhancer));

    let entry = AgentTask::for_role(TaskId::new(), AgentRole::SoundDesigner);
    w.queue.write().await.enqueue(entry.clone());

    w.coordinator.tick().await;

    assert_eq!(
        w.registry.read().await.status(AgentRole::SoundDesigner),
        AgentStatus::Working
    );
    assert!(matches!(
        w.events.recv().await.unwrap(),
        CoordinatorEvent::EnhancementFallback { .. }
    ));
}

#[tokio::test]
async fn full_quest_lifecycle_through_the_loop() {
    let w = world();

    // Quest with two chained tasks
    let (quest_id, first, second) = {
        let mut store = w.store.write().await;
        let quest_id = store.create_quest("Build Game", "");
        let first = store.add_task(&quest_id, "design", "", &[]).unwrap();
        let second = store.add_task(&quest_id, "implement", "", &[first]).unwrap();
        (quest_id, first, second)
    };

    // Queue both; only the first is dispatchable
    {
        let mut queue = w.queue.write().await;
        queue.enqueue(AgentTask::for_role(first, AgentRole::GameDesigner));
        queue.enqueue(AgentTask::for_role(second, AgentRole::CodeGenerator));
    }

    w.coordinator.tick().await;
    {
        let registry = w.registry.read().await;
        assert_eq!(registry.status(AgentRole::GameDesigner), AgentStatus::Working);
        // Second entry referenced a blocked graph task and stayed queued
        assert_eq!(registry.status(AgentRole::CodeGenerator), AgentStatus::Idle);
        assert!(w.queue.read().await.contains(&second));
    }

    // First task completes; its dependent becomes pending
    w.coordinator
        .report_status(AgentRole::GameDesigner, &first, AgentStatus::Completed)
        .await
        .unwrap();
    {
        let store = w.store.read().await;
        let quest = store.quest(&quest_id).unwrap();
        assert_eq!(quest.task(&second).unwrap().status, TaskStatus::Pending);
    }

    // Next tick dispatches the unblocked entry
    w.coordinator.tick().await;
    assert_eq!(
        w.registry.read().await.status(AgentRole::CodeGenerator),
        AgentStatus::Working
    );
    assert!(w.queue.read().await.is_empty());

    // Completing the second task closes out the quest
    w.coordinator
        .report_status(AgentRole::CodeGenerator, &second, AgentStatus::Completed)
        .await
        .unwrap();
    assert_eq!(
        w.store.read().await.quest(&quest_id).unwrap().status,
        QuestStatus::Completed
    );
}

#[tokio::test(start_paused = true)]
async fn loop_runs_on_period_and_stops_on_cancel() {
    let w = world();
    let entry = AgentTask::for_role(TaskId::new(), AgentRole::VisualArtist);
    w.queue.write().await.enqueue(entry);

    let coordinator = Arc::new(w.coordinator);
    let token = coordinator.shutdown_token();
    let handle = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.run().await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    token.cancel();
    handle.await.unwrap();

    assert_eq!(
        w.registry.read().await.status(AgentRole::VisualArtist),
        AgentStatus::Working
    );
}

#[tokio::test]
async fn error_report_frees_worker_without_completing_graph_task() {
    let w = world();
    let (quest_id, task_id) = {
        let mut store = w.store.write().await;
        let quest_id = store.create_quest("Build Game", "");
        let task_id = store.add_task(&quest_id, "design", "", &[]).unwrap();
        (quest_id, task_id)
    };
    w.queue
        .write()
        .await
        .enqueue(AgentTask::for_role(task_id, AgentRole::GameDesigner));
    w.coordinator.tick().await;

    w.coordinator
        .report_status(AgentRole::GameDesigner, &task_id, AgentStatus::Error)
        .await
        .unwrap();

    // Worker is free again; the graph task is still in progress and the
    // quest did not complete
    assert_eq!(
        w.registry.read().await.status(AgentRole::GameDesigner),
        AgentStatus::Idle
    );
    let store = w.store.read().await;
    let quest = store.quest(&quest_id).unwrap();
    assert_eq!(quest.status, QuestStatus::Active);
    assert_eq!(quest.task(&task_id).unwrap().status, TaskStatus::InProgress);
}

#[tokio::test]
async fn direct_assignment_consumes_queued_copy() {
    let w = world();
    let entry = AgentTask::for_role(TaskId::new(), AgentRole::VisualArtist);
    w.queue.write().await.enqueue(entry.clone());

    // Same task handed straight to a different worker
    w.coordinator
        .assign_task_to_agent(entry.clone(), AgentRole::CodeGenerator)
        .await
        .unwrap();
    assert!(w.queue.read().await.is_empty());

    // A later tick has nothing left to hand out
    w.coordinator.tick().await;
    let registry = w.registry.read().await;
    let holders: Vec<AgentRole> = AgentRole::ALL
        .into_iter()
        .filter(|&role| {
            registry
                .tasks(role)
                .iter()
                .any(|held| held.task_id == entry.task_id)
        })
        .collect();
    assert_eq!(holders, vec![AgentRole::CodeGenerator]);
    assert_eq!(registry.status(AgentRole::VisualArtist), AgentStatus::Idle);
}

#[tokio::test]
async fn canceling_queued_entry_prevents_dispatch() {
    let w = world();
    let entry = AgentTask::for_role(TaskId::new(), AgentRole::QaTester);
    w.queue.write().await.enqueue(entry.clone());

    w.queue.write().await.cancel(&entry.task_id);
    w.coordinator.tick().await;

    assert_eq!(
        w.registry.read().await.status(AgentRole::QaTester),
        AgentStatus::Idle
    );
}
