// Task execution seam
//
// Real workloads plug in here. The default executor simulates a
// fixed-duration operation, matching what the service dispatches today.

use std::time::Duration;

use async_trait::async_trait;
use taskmill_contracts::Task;

use crate::error::ExecError;

/// Executes the workload of a single task.
///
/// An `Err` routes the task to `failed`; `Ok` routes it to `completed`.
/// Execution has no deadline: a stalled executor occupies its worker.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    async fn execute(&self, task: &Task) -> Result<(), ExecError>;
}

/// Sleeps for a fixed duration and succeeds.
pub struct SimulatedExecutor {
    duration: Duration,
}

impl SimulatedExecutor {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl Default for SimulatedExecutor {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

#[async_trait]
impl TaskExecutor for SimulatedExecutor {
    async fn execute(&self, _task: &Task) -> Result<(), ExecError> {
        tokio::time::sleep(self.duration).await;
        Ok(())
    }
}
