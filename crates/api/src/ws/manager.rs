use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use campus_core::roles::Role;
use campus_core::types::{DbId, Timestamp};
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single authenticated WebSocket connection.
pub struct WsConnection {
    pub account_id: DbId,
    pub role: Role,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// Registry of all live WebSocket connections.
///
/// Every connection belongs to two delivery groups: its account (all tabs
/// and devices of one user) and its role. Thread-safe via interior
/// `RwLock`; owned by [`AppState`](crate::state::AppState) behind an `Arc`.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(
        &self,
        conn_id: String,
        account_id: DbId,
        role: Role,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            account_id,
            role,
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its ID.
    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Find all connection IDs associated with a given account.
    pub async fn get_by_account(&self, account_id: DbId) -> Vec<String> {
        self.connections
            .read()
            .await
            .iter()
            .filter(|(_, conn)| conn.account_id == account_id)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Send a message to every connection of one account.
    ///
    /// Returns the number of connections the message was sent to. Closed
    /// channels are skipped; they are cleaned up when their receive loop ends.
    pub async fn send_to_account(&self, account_id: DbId, message: Message) -> usize {
        self.send_where(|conn| conn.account_id == account_id, message)
            .await
    }

    /// Send a message to every connection whose account has `role`.
    pub async fn send_to_role(&self, role: Role, message: Message) -> usize {
        self.send_where(|conn| conn.role == role, message).await
    }

    async fn send_where<F>(&self, predicate: F, message: Message) -> usize
    where
        F: Fn(&WsConnection) -> bool,
    {
        let conns = self.connections.read().await;
        let mut count = 0;
        for conn in conns.values().filter(|c| predicate(c)) {
            if conn.sender.send(message.clone()).is_ok() {
                count += 1;
            }
        }
        count
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops accepting new connections.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
