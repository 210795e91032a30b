// Persistence contract consumed by the scheduler and worker pool

use async_trait::async_trait;
use taskmill_contracts::{Task, TaskStatus};
use uuid::Uuid;

use crate::error::StoreError;

/// Durable task records.
///
/// Every method may fail; failure is recoverable for callers on the dispatch
/// path (they log and continue in memory). The trait is object-safe so the
/// scheduler and worker pool can share one `Arc<dyn TaskStore>`.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persist a newly created task.
    async fn create(&self, task: &Task) -> Result<(), StoreError>;

    /// Update the status of an existing task record.
    async fn update_status(&self, id: Uuid, status: TaskStatus) -> Result<(), StoreError>;

    /// Fetch a single task by id.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError>;

    /// Fetch all tasks whose status is in the given set.
    async fn get_by_status_in(&self, statuses: &[TaskStatus]) -> Result<Vec<Task>, StoreError>;

    /// Fetch every task record.
    async fn get_all(&self) -> Result<Vec<Task>, StoreError>;
}
