use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::ws::manager::WsManager;

/// How often idle live-channel connections are pinged.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Keep live-channel connections warm through proxies that drop idle sockets.
///
/// The first ping goes out one full interval after startup, and a stalled
/// runtime does not trigger a burst of catch-up pings.
pub fn start_heartbeat(ws_manager: Arc<WsManager>) -> tokio::task::JoinHandle<()> {
    spawn_heartbeat(ws_manager, HEARTBEAT_INTERVAL)
}

fn spawn_heartbeat(ws_manager: Arc<WsManager>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticks.tick().await;
            let connections = ws_manager.connection_count().await;
            if connections == 0 {
                continue;
            }
            tracing::debug!(connections, "Pinging live connections");
            ws_manager.ping_all().await;
        }
    })
}
