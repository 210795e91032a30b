// Postgres integration tests
// Run with: DATABASE_URL=postgres://... cargo test -p taskmill-storage -- --ignored

use serde_json::json;
use taskmill_contracts::{Task, TaskPriority, TaskStatus};
use taskmill_core::TaskStore;
use taskmill_storage::PgTaskStore;

async fn store() -> PgTaskStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required for pg tests");
    let store = PgTaskStore::connect(&url).await.expect("connect");
    store.migrate().await.expect("migrate");
    store
}

#[tokio::test]
#[ignore] // needs a running Postgres
async fn create_update_and_query_round_trip() {
    let store = store().await;

    let task = Task::new(TaskPriority::High, json!({"action": "send_email"}));
    store.create(&task).await.expect("create");

    let found = store
        .get_by_id(task.id)
        .await
        .expect("get_by_id")
        .expect("task should exist");
    assert_eq!(found.status, TaskStatus::Pending);
    assert_eq!(found.priority, TaskPriority::High);

    store
        .update_status(task.id, TaskStatus::Completed)
        .await
        .expect("update_status");

    let unfinished = store
        .get_by_status_in(&[TaskStatus::Pending, TaskStatus::Running])
        .await
        .expect("get_by_status_in");
    assert!(unfinished.iter().all(|t| t.id != task.id));

    let all = store.get_all().await.expect("get_all");
    assert!(all.iter().any(|t| t.id == task.id));
}
