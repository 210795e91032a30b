// Fixed-size worker pool consuming the priority queue

use std::sync::{Arc, Mutex};
use std::time::Instant;

use metrics::{counter, histogram};
use taskmill_contracts::{Task, TaskStatus};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::executor::TaskExecutor;
use crate::queue::TaskQueue;
use crate::scheduler::TaskCache;
use crate::store::TaskStore;

/// Pool of N workers pulling from the shared queue.
///
/// Cancellation is cooperative and non-preemptive: in-flight and
/// already-popped work always completes. Tasks still sitting in the queue
/// when `stop` returns are not drained; a later `start` on the same queue
/// resumes consuming them.
pub struct WorkerPool {
    queue: Arc<TaskQueue>,
    cache: Arc<TaskCache>,
    store: Arc<dyn TaskStore>,
    executor: Arc<dyn TaskExecutor>,
    worker_count: usize,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    pub fn new(
        queue: Arc<TaskQueue>,
        cache: Arc<TaskCache>,
        store: Arc<dyn TaskStore>,
        executor: Arc<dyn TaskExecutor>,
        worker_count: usize,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            queue,
            cache,
            store,
            executor,
            worker_count,
            shutdown_tx,
            shutdown_rx,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Launch the workers and return without waiting for them.
    pub fn start(&self) {
        let mut handles = self.handles.lock().unwrap();
        for worker_id in 0..self.worker_count {
            handles.push(tokio::spawn(worker_loop(
                worker_id,
                self.queue.clone(),
                self.cache.clone(),
                self.store.clone(),
                self.executor.clone(),
                self.shutdown_rx.clone(),
            )));
        }
        info!(workers = self.worker_count, "worker pool started");
    }

    /// Signal shutdown and wait for every worker to return.
    ///
    /// A worker mid-task finishes that task first. Idempotent: a second call
    /// finds no handles and returns immediately.
    pub async fn stop(&self) {
        info!("worker pool stopping");
        let _ = self.shutdown_tx.send(true);

        let handles: Vec<JoinHandle<()>> = {
            let mut guard = self.handles.lock().unwrap();
            guard.drain(..).collect()
        };
        for handle in handles {
            let _ = handle.await;
        }
        info!("all workers stopped");
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: Arc<TaskQueue>,
    cache: Arc<TaskCache>,
    store: Arc<dyn TaskStore>,
    executor: Arc<dyn TaskExecutor>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        if *shutdown_rx.borrow() {
            break;
        }
        // The shutdown arm wins while the pop is still pending; once a task
        // is popped it runs to completion without re-checking the signal.
        tokio::select! {
            biased;
            _ = shutdown_rx.changed() => break,
            task = queue.pop() => {
                process_task(worker_id, task, &cache, &store, &executor).await;
            }
        }
    }
    debug!(worker = worker_id, "worker shut down");
}

async fn process_task(
    worker_id: usize,
    mut task: Task,
    cache: &TaskCache,
    store: &Arc<dyn TaskStore>,
    executor: &Arc<dyn TaskExecutor>,
) {
    info!(worker = worker_id, task_id = %task.id, priority = %task.priority, "processing task");
    let started = Instant::now();

    task.status = TaskStatus::Running;
    cache.set_status(task.id, TaskStatus::Running);
    if let Err(e) = store.update_status(task.id, TaskStatus::Running).await {
        warn!(worker = worker_id, task_id = %task.id, error = %e, "failed to persist running status");
    }

    let final_status = match executor.execute(&task).await {
        Ok(()) => TaskStatus::Completed,
        Err(e) => {
            warn!(worker = worker_id, task_id = %task.id, error = %e, "task execution failed");
            TaskStatus::Failed
        }
    };

    task.status = final_status;
    cache.set_status(task.id, final_status);
    if let Err(e) = store.update_status(task.id, final_status).await {
        warn!(worker = worker_id, task_id = %task.id, error = %e, "failed to persist final status");
    }

    let elapsed = started.elapsed();
    histogram!("task_processing_seconds", "priority" => task.priority.as_str())
        .record(elapsed.as_secs_f64());
    counter!("task_processed_total", "status" => final_status.as_str()).increment(1);

    info!(
        worker = worker_id,
        task_id = %task.id,
        status = %final_status,
        elapsed_ms = elapsed.as_millis() as u64,
        "task finished"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExecError, StoreError};
    use crate::SimulatedExecutor;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::RwLock;
    use std::time::Duration;
    use taskmill_contracts::TaskPriority;
    use uuid::Uuid;

    #[derive(Default)]
    struct MapStore {
        tasks: RwLock<HashMap<Uuid, Task>>,
    }

    impl MapStore {
        fn status_of(&self, id: Uuid) -> Option<TaskStatus> {
            self.tasks.read().unwrap().get(&id).map(|t| t.status)
        }
    }

    #[async_trait]
    impl TaskStore for MapStore {
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

        async fn get_by_status_in(
            &self,
            statuses: &[TaskStatus],
        ) -> Result<Vec<Task>, StoreError> {
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

    struct FailingExecutor;

    #[async_trait]
    impl TaskExecutor for FailingExecutor {
        async fn execute(&self, _task: &Task) -> Result<(), ExecError> {
            Err(ExecError::new("simulated crash"))
        }
    }

    fn pool_with(
        executor: Arc<dyn TaskExecutor>,
        workers: usize,
    ) -> (WorkerPool, Arc<TaskQueue>, Arc<TaskCache>, Arc<MapStore>) {
        let queue = Arc::new(TaskQueue::new());
        let cache = Arc::new(TaskCache::new());
        let store = Arc::new(MapStore::default());
        let pool = WorkerPool::new(
            queue.clone(),
            cache.clone(),
            store.clone(),
            executor,
            workers,
        );
        (pool, queue, cache, store)
    }

    async fn enqueue(
        queue: &TaskQueue,
        cache: &TaskCache,
        store: &MapStore,
        priority: TaskPriority,
    ) -> Task {
        let task = Task::new(priority, json!({}));
        store.create(&task).await.unwrap();
        cache.insert(task.clone());
        queue.push(task.clone());
        task
    }

    async fn wait_for_status(store: &MapStore, id: Uuid, want: TaskStatus) {
        for _ in 0..100 {
            if store.status_of(id) == Some(want) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("task {id} never reached {want}");
    }

    #[tokio::test]
    async fn workers_complete_queued_tasks() {
        let executor = Arc::new(SimulatedExecutor::new(Duration::from_millis(10)));
        let (pool, queue, cache, store) = pool_with(executor, 2);

        let t1 = enqueue(&queue, &cache, &store, TaskPriority::High).await;
        let t2 = enqueue(&queue, &cache, &store, TaskPriority::Low).await;

        pool.start();
        wait_for_status(&store, t1.id, TaskStatus::Completed).await;
        wait_for_status(&store, t2.id, TaskStatus::Completed).await;
        pool.stop().await;

        // Cache statuses advanced alongside the store.
        assert_eq!(cache.get(t1.id).unwrap().status, TaskStatus::Completed);
        assert_eq!(cache.get(t2.id).unwrap().status, TaskStatus::Completed);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn executor_failure_marks_task_failed() {
        let (pool, queue, cache, store) = pool_with(Arc::new(FailingExecutor), 1);
        let task = enqueue(&queue, &cache, &store, TaskPriority::Medium).await;

        pool.start();
        wait_for_status(&store, task.id, TaskStatus::Failed).await;
        pool.stop().await;

        assert_eq!(cache.get(task.id).unwrap().status, TaskStatus::Failed);
    }

    #[tokio::test]
    async fn stop_waits_for_in_flight_task() {
        let executor = Arc::new(SimulatedExecutor::new(Duration::from_millis(200)));
        let (pool, queue, cache, store) = pool_with(executor, 1);
        let task = enqueue(&queue, &cache, &store, TaskPriority::High).await;

        pool.start();
        // Let the worker pop and enter execution.
        wait_for_status(&store, task.id, TaskStatus::Running).await;

        pool.stop().await;
        // stop() must not return before the in-flight task completed.
        assert_eq!(store.status_of(task.id), Some(TaskStatus::Completed));
    }

    #[tokio::test]
    async fn queued_tasks_are_not_drained_after_stop() {
        let executor = Arc::new(SimulatedExecutor::new(Duration::from_millis(10)));
        let (pool, queue, cache, store) = pool_with(executor, 1);

        pool.start();
        pool.stop().await;

        // Pushed after the workers exited: stays queued, no consumer.
        let task = enqueue(&queue, &cache, &store, TaskPriority::High).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(queue.len(), 1);
        assert_eq!(store.status_of(task.id), Some(TaskStatus::Pending));
    }

    #[tokio::test]
    async fn stop_twice_is_harmless() {
        let executor = Arc::new(SimulatedExecutor::new(Duration::from_millis(10)));
        let (pool, _queue, _cache, _store) = pool_with(executor, 2);

        pool.start();
        pool.stop().await;
        pool.stop().await;
    }
}
