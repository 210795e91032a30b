// Task intake: cache + persistence + queue coordination

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use metrics::counter;
use taskmill_contracts::{Task, TaskPriority, TaskStatus};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::queue::TaskQueue;
use crate::store::TaskStore;

/// In-memory task map serving as the fast read path in front of the store.
///
/// Shared between the scheduler (which fills it) and the worker pool (which
/// advances statuses in it), so a `get_task` after a worker finished sees the
/// final status without a store round trip. Entries are never evicted.
pub struct TaskCache {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl TaskCache {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, task: Task) {
        self.tasks.write().unwrap().insert(task.id, task);
    }

    pub fn get(&self, id: Uuid) -> Option<Task> {
        self.tasks.read().unwrap().get(&id).cloned()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.tasks.read().unwrap().contains_key(&id)
    }

    /// Advance the status of a cached task; no-op if the id is unknown.
    pub fn set_status(&self, id: Uuid, status: TaskStatus) {
        if let Some(task) = self.tasks.write().unwrap().get_mut(&id) {
            task.status = status;
        }
    }

    pub fn all(&self) -> Vec<Task> {
        self.tasks.read().unwrap().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TaskCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Mediates task intake between callers, the cache, the store, and the queue.
///
/// Persistence is best-effort relative to in-memory dispatch: a store failure
/// is logged and the task still flows through cache and queue. The trade-off
/// is availability of dispatch over durability of the submission record, and
/// it means the store can lag behind under sustained storage failure.
///
/// No lock is ever held across store I/O: cache mutation and queue pushes are
/// short synchronous sections, store calls happen outside them.
pub struct TaskScheduler {
    queue: Arc<TaskQueue>,
    cache: Arc<TaskCache>,
    store: Arc<dyn TaskStore>,
}

impl TaskScheduler {
    pub fn new(queue: Arc<TaskQueue>, cache: Arc<TaskCache>, store: Arc<dyn TaskStore>) -> Self {
        Self {
            queue,
            cache,
            store,
        }
    }

    /// Create, persist, cache, and enqueue a new pending task.
    ///
    /// Returns as soon as the task is queued; execution happens later on a
    /// worker.
    pub async fn submit_task(&self, priority: TaskPriority, payload: serde_json::Value) -> Task {
        let task = Task::new(priority, payload);

        if let Err(e) = self.store.create(&task).await {
            warn!(task_id = %task.id, error = %e, "failed to persist submitted task; continuing in memory");
        }

        self.cache.insert(task.clone());
        self.queue.push(task.clone());
        counter!("task_submitted_total", "priority" => priority.as_str()).increment(1);

        info!(task_id = %task.id, priority = %priority, "task submitted");
        task
    }

    /// Look up a task by id: cache first, store on miss (back-filling the
    /// cache on a hit so the next lookup stays in memory).
    pub async fn get_task(&self, id: Uuid) -> Option<Task> {
        if let Some(task) = self.cache.get(id) {
            return Some(task);
        }

        match self.store.get_by_id(id).await {
            Ok(Some(task)) => {
                self.cache.insert(task.clone());
                Some(task)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(task_id = %id, error = %e, "store lookup failed");
                None
            }
        }
    }

    /// Union of persisted and cached tasks, cache entries winning for ids
    /// present in both. No ordering guarantee.
    pub async fn get_all_tasks(&self) -> Vec<Task> {
        let mut merged: HashMap<Uuid, Task> = HashMap::new();

        match self.store.get_all().await {
            Ok(tasks) => {
                for task in tasks {
                    merged.insert(task.id, task);
                }
            }
            Err(e) => warn!(error = %e, "store scan failed; returning cached tasks only"),
        }

        // Cache is assumed fresher: workers advance statuses there first.
        for task in self.cache.all() {
            merged.insert(task.id, task);
        }

        merged.into_values().collect()
    }

    /// Re-enqueue persisted tasks that never finished.
    ///
    /// Must run after the store is reachable and before workers start
    /// pulling. Tasks already present in the cache are skipped, which makes a
    /// repeated invocation a no-op instead of a duplicate enqueue.
    pub async fn recover_unfinished_tasks(&self) {
        let unfinished = match self
            .store
            .get_by_status_in(&[TaskStatus::Pending, TaskStatus::Running])
            .await
        {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(error = %e, "recovery scan failed; starting with an empty queue");
                return;
            }
        };

        let mut recovered = 0usize;
        for task in unfinished {
            if self.cache.contains(task.id) {
                debug!(task_id = %task.id, "already tracked; skipping recovery enqueue");
                continue;
            }
            self.cache.insert(task.clone());
            self.queue.push(task);
            recovered += 1;
        }

        info!(recovered, "recovered unfinished tasks");
    }
}
