// Map-backed TaskStore for tests and local runs

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use taskmill_contracts::{Task, TaskStatus};
use taskmill_core::{StoreError, TaskStore};
use uuid::Uuid;

/// In-memory `TaskStore`. Never fails; contents vanish with the process.
#[derive(Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, task: &Task) -> Result<(), StoreError> {
        self.tasks.write().unwrap().insert(task.id, task.clone());
        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: TaskStatus) -> Result<(), StoreError> {
        if let Some(task) = self.tasks.write().unwrap().get_mut(&id) {
            task.status = status;
        }
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(self.tasks.read().unwrap().get(&id).cloned())
    }

    async fn get_by_status_in(&self, statuses: &[TaskStatus]) -> Result<Vec<Task>, StoreError> {
        Ok(self
            .tasks
            .read()
            .unwrap()
            .values()
            .filter(|t| statuses.contains(&t.status))
            .cloned()
            .collect())
    }

    async fn get_all(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.tasks.read().unwrap().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taskmill_contracts::TaskPriority;

    #[tokio::test]
    async fn create_then_query() {
        let store = InMemoryTaskStore::new();
        let task = Task::new(TaskPriority::High, json!({"n": 1}));
        store.create(&task).await.unwrap();

        let found = store.get_by_id(task.id).await.unwrap().unwrap();
        assert_eq!(found.id, task.id);
        assert!(store.get_by_id(Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn status_filter_matches_updates() {
        let store = InMemoryTaskStore::new();
        let a = Task::new(TaskPriority::High, json!({}));
        let b = Task::new(TaskPriority::Low, json!({}));
        store.create(&a).await.unwrap();
        store.create(&b).await.unwrap();
        store
            .update_status(a.id, TaskStatus::Completed)
            .await
            .unwrap();

        let unfinished = store
            .get_by_status_in(&[TaskStatus::Pending, TaskStatus::Running])
            .await
            .unwrap();
        assert_eq!(unfinished.len(), 1);
        assert_eq!(unfinished[0].id, b.id);
        assert_eq!(store.get_all().await.unwrap().len(), 2);
    }
}
