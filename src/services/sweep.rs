//! Idle sweep: evicts members that stopped polling.
//!
//! A client that vanishes without sending `leave` keeps its membership until
//! this task notices its `last_seen` is older than the idle limit.

#[cfg(test)]
#[path = "sweep_test.rs"]
mod sweep_test;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;

use crate::state::AppState;

/// Spawn the background sweep task. Returns a handle for shutdown.
pub fn spawn_idle_sweep(state: AppState) -> JoinHandle<()> {
    let idle = state.config.idle_timeout;
    let every = state.config.sweep_interval;
    info!(idle_secs = idle.as_secs(), sweep_secs = every.as_secs(), "idle sweep configured");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let mut room = state.room.lock().await;
            let evicted = room.evict_idle(Instant::now(), idle);
            if !evicted.is_empty() {
                info!(?evicted, remaining = room.len(), "idle sweep: evicted members");
            }
        }
    })
}
