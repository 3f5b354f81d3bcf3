//! Connection fan-out.
//!
//! Every WebSocket has a writer task draining an unbounded channel; the
//! coordinator keeps the sending half here. One channel per connection keeps
//! each client's events in emission order.

use std::collections::HashMap;

use tokio::sync::mpsc;

use super::dto::websocket::ServerEvent;
use crate::domain::ConnectionId;

/// Frame handed to a connection's writer task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Serialized JSON text frame
    Text(String),
    /// Send a close frame and stop writing
    Close,
}

pub type OutboundSender = mpsc::UnboundedSender<Outbound>;

/// Registry of connection writers
#[derive(Debug, Default)]
pub struct Broadcaster {
    connections: HashMap<ConnectionId, OutboundSender>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, connection_id: ConnectionId, sender: OutboundSender) {
        self.connections.insert(connection_id, sender);
    }

    /// Forget a connection. Returns false if it was not registered.
    pub fn unregister(&mut self, connection_id: &ConnectionId) -> bool {
        self.connections.remove(connection_id).is_some()
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.connections.contains_key(connection_id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Send `event` to every registered connection.
    pub fn broadcast_all(&self, event: &ServerEvent) {
        let Some(json) = serialize(event) else {
            return;
        };
        for (connection_id, sender) in &self.connections {
            if sender.send(Outbound::Text(json.clone())).is_err() {
                tracing::warn!(
                    "Failed to send '{}' to connection '{}'",
                    event.name(),
                    connection_id
                );
            }
        }
        tracing::debug!(
            "Broadcasted '{}' to {} connections",
            event.name(),
            self.connections.len()
        );
    }

    /// Send `event` to one connection. Returns false if it could not be queued.
    pub fn unicast(&self, connection_id: &ConnectionId, event: &ServerEvent) -> bool {
        let Some(sender) = self.connections.get(connection_id) else {
            tracing::debug!(
                "Dropping '{}' for unknown connection '{}'",
                event.name(),
                connection_id
            );
            return false;
        };
        let Some(json) = serialize(event) else {
            return false;
        };
        if sender.send(Outbound::Text(json)).is_err() {
            tracing::warn!(
                "Failed to send '{}' to connection '{}'",
                event.name(),
                connection_id
            );
            return false;
        }
        true
    }

    /// Ask the writer of `connection_id` to close the socket, then forget it.
    ///
    /// Frames queued before the close are still delivered first.
    pub fn close(&mut self, connection_id: &ConnectionId) {
        if let Some(sender) = self.connections.remove(connection_id) {
            let _ = sender.send(Outbound::Close);
        }
    }
}

fn serialize(event: &ServerEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::error!("Failed to serialize '{}': {}", event.name(), e);
            None
        }
    }
}
