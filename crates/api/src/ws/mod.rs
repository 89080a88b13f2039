//! Live channel: authenticated WebSocket connections used to push
//! notifications to connected accounts.

mod handler;
mod heartbeat;
pub mod manager;
pub mod messages;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
