// Cluster coordination loops: leader election and liveness heartbeat
//
// Each node runs both loops independently; there is no inter-node transport
// yet. The election decision is a pluggable strategy so the random
// placeholder can be swapped for a real coordination service without
// touching the loop or callback logic.

mod heartbeat;
mod leader;

pub use heartbeat::Heartbeater;
pub use leader::{ElectionStrategy, LeaderElector, RandomDraw, Role};

use chrono::Utc;

/// Node identity shared by the elector and the heartbeater.
///
/// Taken from `NODE_ID` when set, otherwise a time-based fallback.
pub fn node_id_from_env() -> String {
    match std::env::var("NODE_ID") {
        Ok(id) if !id.is_empty() => id,
        _ => format!("node-{}", Utc::now().format("%H%M%S")),
    }
}
