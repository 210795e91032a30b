// Core scheduling logic: priority queue, scheduler, worker pool, cluster loops
//
// This crate owns every piece with real concurrency semantics. Persistence is
// consumed through the `TaskStore` trait; implementations live in
// `taskmill-storage`.

pub mod cluster;
pub mod error;
pub mod executor;
pub mod queue;
pub mod scheduler;
pub mod store;
pub mod worker;

pub use cluster::{node_id_from_env, ElectionStrategy, Heartbeater, LeaderElector, RandomDraw, Role};
pub use error::{ExecError, StoreError};
pub use executor::{SimulatedExecutor, TaskExecutor};
pub use queue::TaskQueue;
pub use scheduler::{TaskCache, TaskScheduler};
pub use store::TaskStore;
pub use worker::WorkerPool;
