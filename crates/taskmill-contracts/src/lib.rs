// Shared DTOs for the taskmill public API

pub mod task;

pub use task::{SubmitTaskRequest, Task, TaskPriority, TaskStatus};
