// Environment-driven server configuration

use std::time::Duration;

use anyhow::{Context, Result};
use taskmill_core::node_id_from_env;

/// Runtime configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub worker_count: usize,
    pub node_id: String,
    pub election_interval: Duration,
    pub heartbeat_interval: Duration,
    /// Length of the simulated workload each worker runs per task.
    pub task_duration: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL environment variable required")?;

        Ok(Self {
            database_url,
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            worker_count: env_or("WORKER_COUNT", 4),
            node_id: node_id_from_env(),
            election_interval: Duration::from_secs(env_or("ELECTION_INTERVAL_SECS", 3)),
            heartbeat_interval: Duration::from_secs(env_or("HEARTBEAT_INTERVAL_SECS", 5)),
            task_duration: Duration::from_millis(env_or("TASK_DURATION_MS", 2000)),
        })
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
