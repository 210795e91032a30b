// Blocking priority queue shared by the scheduler and the worker pool

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Mutex;

use metrics::gauge;
use taskmill_contracts::Task;
use tokio::sync::Notify;

/// Heap bookkeeping wrapper; exists only while the task is queued.
///
/// `BinaryHeap` is a max-heap, so the ordering is inverted: the entry that
/// should pop first (highest priority band, then oldest `created_at`)
/// compares greatest.
struct QueueEntry(Task);

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.0.priority, other.0.created_at).cmp(&(self.0.priority, self.0.created_at))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

/// Thread-safe priority queue with an awaitable pop.
///
/// Pop order is (priority band, created_at): FIFO within a band. All
/// mutation happens under one mutex with short critical sections; waiting
/// for work happens outside the lock on a `Notify`.
pub struct TaskQueue {
    heap: Mutex<BinaryHeap<QueueEntry>>,
    notify: Notify,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
            notify: Notify::new(),
        }
    }

    /// Insert a task and wake one waiter, if any.
    pub fn push(&self, task: Task) {
        self.heap.lock().unwrap().push(QueueEntry(task));
        gauge!("task_queue_depth").increment(1.0);
        self.notify.notify_one();
    }

    /// Remove and return the highest-priority, oldest task, suspending until
    /// one is available.
    ///
    /// Registering the `Notified` future before checking the heap closes the
    /// window where a push lands between the check and the wait (no lost
    /// wakeups). The only await point holds no lock and removes nothing, so a
    /// `select!`-cancelled pop never loses a task.
    pub async fn pop(&self) -> Task {
        loop {
            let notified = self.notify.notified();
            if let Some(entry) = self.heap.lock().unwrap().pop() {
                gauge!("task_queue_depth").decrement(1.0);
                return entry.0;
            }
            notified.await;
        }
    }

    /// Pop without waiting; `None` when the queue is empty.
    pub fn try_pop(&self) -> Option<Task> {
        let entry = self.heap.lock().unwrap().pop()?;
        gauge!("task_queue_depth").decrement(1.0);
        Some(entry.0)
    }

    pub fn len(&self) -> usize {
        self.heap.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}
