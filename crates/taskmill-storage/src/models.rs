// Database row types and conversions to the shared DTOs

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use taskmill_contracts::{Task, TaskPriority, TaskStatus};
use taskmill_core::StoreError;
use uuid::Uuid;

/// Row shape of the `tasks` table.
///
/// Priority and status are stored as text so the table stays readable and
/// migrations stay trivial; parsing back is where a corrupt row surfaces.
#[derive(Debug, Clone, FromRow)]
pub struct TaskRow {
    pub id: Uuid,
    pub priority: String,
    pub payload: serde_json::Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let priority: TaskPriority = row
            .priority
            .parse()
            .map_err(|e: String| StoreError::decode(format!("task {}: {e}", row.id)))?;
        let status: TaskStatus = row
            .status
            .parse()
            .map_err(|e: String| StoreError::decode(format!("task {}: {e}", row.id)))?;
        Ok(Task {
            id: row.id,
            priority,
            payload: row.payload,
            created_at: row.created_at,
            status,
        })
    }
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            priority: task.priority.as_str().to_owned(),
            payload: task.payload.clone(),
            status: task.status.as_str().to_owned(),
            created_at: task.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn row_round_trips_to_task() {
        let task = Task::new(TaskPriority::Medium, json!({"action": "resize_image"}));
        let row = TaskRow::from(&task);
        let back = Task::try_from(row).unwrap();
        assert_eq!(back.id, task.id);
        assert_eq!(back.priority, task.priority);
        assert_eq!(back.status, task.status);
    }

    #[test]
    fn corrupt_status_is_a_decode_error() {
        let task = Task::new(TaskPriority::High, json!({}));
        let mut row = TaskRow::from(&task);
        row.status = "exploded".into();
        assert!(matches!(Task::try_from(row), Err(StoreError::Decode(_))));
    }
}
