// Periodic leader election loop

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info};

/// Role a node holds within the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Leader,
    Follower,
}

/// Decides the node's role on each election tick.
///
/// The production implementation should back this with a distributed lock or
/// consensus service; `RandomDraw` below is a stand-in.
pub trait ElectionStrategy: Send + Sync {
    fn decide(&self) -> Role;
}

/// Placeholder strategy: a 1-in-3 draw for leadership on every tick.
// TODO: replace with an etcd/consul lease once the coordination service is picked
pub struct RandomDraw;

impl ElectionStrategy for RandomDraw {
    fn decide(&self) -> Role {
        if rand::thread_rng().gen_range(0..3) == 1 {
            Role::Leader
        } else {
            Role::Follower
        }
    }
}

type LeadershipCallback = Box<dyn Fn() + Send + Sync>;

/// Runs the election loop and tracks the node's current role.
///
/// Starts as follower. The leadership-gained callback fires exactly once per
/// follower-to-leader transition, never on repeated leader ticks, and is
/// invoked after the role lock is released so it cannot stall the loop's
/// state handling.
pub struct LeaderElector {
    node_id: String,
    interval: Duration,
    strategy: Arc<dyn ElectionStrategy>,
    callback: LeadershipCallback,
    is_leader: RwLock<bool>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl LeaderElector {
    pub fn new(
        node_id: impl Into<String>,
        interval: Duration,
        strategy: Arc<dyn ElectionStrategy>,
        on_leadership_gained: LeadershipCallback,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            node_id: node_id.into(),
            interval,
            strategy,
            callback: on_leadership_gained,
            is_leader: RwLock::new(false),
            shutdown_tx,
            shutdown_rx,
            handle: Mutex::new(None),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Spawn the election loop.
    pub fn start(self: &Arc<Self>) {
        let elector = self.clone();
        let mut shutdown_rx = self.shutdown_rx.clone();
        let handle = tokio::spawn(async move {
            // First tick one full interval out, matching a plain ticker.
            let mut ticker = interval_at(Instant::now() + elector.interval, elector.interval);
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => elector.run_election(),
                }
            }
            debug!(node_id = %elector.node_id, "election loop stopped");
        });
        *self.handle.lock().unwrap() = Some(handle);
        info!(node_id = %self.node_id, "leader election loop started");
    }

    /// Signal the loop to exit and wait for it. Safe to call more than once.
    pub async fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
        let handle = self.handle.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Thread-safe snapshot of the current role.
    pub fn is_current_leader(&self) -> bool {
        *self.is_leader.read().unwrap()
    }

    fn run_election(&self) {
        let role = self.strategy.decide();
        self.set_leadership(role == Role::Leader);
    }

    fn set_leadership(&self, is_leader: bool) {
        let gained = {
            let mut guard = self.is_leader.write().unwrap();
            if *guard == is_leader {
                return;
            }
            *guard = is_leader;
            is_leader
        };

        if gained {
            info!(node_id = %self.node_id, "became leader");
            (self.callback)();
        } else {
            info!(node_id = %self.node_id, "now a follower");
        }
    }
}
