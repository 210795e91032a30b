// Error types for the scheduling core

use thiserror::Error;

/// Errors surfaced by `TaskStore` implementations.
///
/// Store failures are recoverable everywhere in the dispatch path: callers
/// log them and continue on the in-memory route. Only startup wiring treats
/// them as fatal.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database failure
    #[error("database error: {0}")]
    Database(String),

    /// A persisted row could not be mapped back into a task
    #[error("corrupt task record: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn database(msg: impl Into<String>) -> Self {
        StoreError::Database(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        StoreError::Decode(msg.into())
    }
}

/// Error returned by a `TaskExecutor`; routes the task to `failed`.
#[derive(Debug, Error)]
#[error("task execution failed: {0}")]
pub struct ExecError(pub String);

impl ExecError {
    pub fn new(msg: impl Into<String>) -> Self {
        ExecError(msg.into())
    }
}
