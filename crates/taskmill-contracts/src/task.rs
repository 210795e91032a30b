// Task DTOs for the public API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Priority band of a task.
///
/// Declaration order matters: the derived `Ord` makes `High < Medium < Low`,
/// which is the dequeue order used by the priority queue (High first).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::High => "high",
            TaskPriority::Medium => "medium",
            TaskPriority::Low => "low",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(TaskPriority::High),
            "medium" => Ok(TaskPriority::Medium),
            "low" => Ok(TaskPriority::Low),
            other => Err(format!(
                "invalid priority {other:?} (must be high, medium, or low)"
            )),
        }
    }
}

/// Lifecycle state of a task.
///
/// Advances pending -> running -> completed | failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    /// True for statuses a restarted process must re-enqueue.
    pub fn is_unfinished(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::Running)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "running" => Ok(TaskStatus::Running),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            other => Err(format!("unknown task status {other:?}")),
        }
    }
}

/// A unit of work flowing through the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Task {
    pub id: Uuid,
    pub priority: TaskPriority,
    /// Opaque application data, passed through untouched.
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub status: TaskStatus,
}

impl Task {
    /// Create a new pending task with a fresh time-ordered id.
    pub fn new(priority: TaskPriority, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::now_v7(),
            priority,
            payload,
            created_at: Utc::now(),
            status: TaskStatus::Pending,
        }
    }
}

/// Request body for submitting a task.
///
/// Priority arrives as a raw string so the handler can reject anything
/// outside {high, medium, low} with a 400 before the scheduler is touched.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitTaskRequest {
    #[schema(example = "high")]
    pub priority: String,
    #[schema(example = json!({"action": "send_email"}))]
    pub payload: serde_json::Value,
}
