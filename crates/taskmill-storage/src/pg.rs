// Postgres-backed TaskStore

use async_trait::async_trait;
use sqlx::PgPool;
use taskmill_contracts::{Task, TaskStatus};
use taskmill_core::{StoreError, TaskStore};
use uuid::Uuid;

use crate::models::TaskRow;

/// Durable task records in Postgres.
#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database at `url`.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(url)
            .await
            .map_err(|e| StoreError::database(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Apply embedded migrations. Fatal at startup when this fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::database(e.to_string()))?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn create(&self, task: &Task) -> Result<(), StoreError> {
        let row = TaskRow::from(task);
        sqlx::query(
            r#"
            INSERT INTO tasks (id, priority, payload, status, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(row.id)
        .bind(&row.priority)
        .bind(&row.payload)
        .bind(&row.status)
        .bind(row.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(e.to_string()))?;
        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: TaskStatus) -> Result<(), StoreError> {
        sqlx::query("UPDATE tasks SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::database(e.to_string()))?;
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let row = sqlx::query_as::<_, TaskRow>(
            "SELECT id, priority, payload, status, created_at FROM tasks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::database(e.to_string()))?;

        row.map(Task::try_from).transpose()
    }

    async fn get_by_status_in(&self, statuses: &[TaskStatus]) -> Result<Vec<Task>, StoreError> {
        let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_owned()).collect();
        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, priority, payload, status, created_at
            FROM tasks
            WHERE status = ANY($1)
            "#,
        )
        .bind(&statuses)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::database(e.to_string()))?;

        rows.into_iter().map(Task::try_from).collect()
    }

    async fn get_all(&self) -> Result<Vec<Task>, StoreError> {
        let rows = sqlx::query_as::<_, TaskRow>(
            "SELECT id, priority, payload, status, created_at FROM tasks",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::database(e.to_string()))?;

        rows.into_iter().map(Task::try_from).collect()
    }
}
