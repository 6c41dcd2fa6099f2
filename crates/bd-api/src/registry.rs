//! Live push-connection registry
//!
//! Holds the set of currently-connected push clients and fans broadcast
//! events out to them. Constructed once at startup and handed to request
//! handlers through `AppState`; connect/disconnect and broadcast paths run
//! on different tasks, so the map is guarded by an async RwLock.

use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Event pushed to every live connection on a broadcast.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushEvent {
    pub id: Uuid,
    pub message: String,
    #[serde(rename = "type")]
    pub category: String,
    pub additional_data: serde_json::Value,
}

pub struct NotificationRegistry {
    connections: RwLock<HashMap<Uuid, mpsc::UnboundedSender<PushEvent>>>,
}

impl NotificationRegistry {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new live connection; the returned receiver yields every
    /// event broadcast while the connection stays registered.
    pub async fn register(&self) -> (Uuid, mpsc::UnboundedReceiver<PushEvent>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.write().await.insert(id, tx);
        (id, rx)
    }

    /// Drop a connection. Safe to call for an id that is already gone.
    pub async fn unregister(&self, id: Uuid) {
        self.connections.write().await.remove(&id);
    }

    /// Queue `event` to every live connection, best-effort.
    ///
    /// Returns the number of connections the event reached. A connection
    /// whose receiver has gone away simply does not count; it is removed
    /// when its socket task unregisters.
    pub async fn broadcast(&self, event: &PushEvent) -> usize {
        let connections = self.connections.read().await;
        let mut delivered = 0;
        for tx in connections.values() {
            if tx.send(event.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

impl Default for NotificationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> PushEvent {
        PushEvent {
            id: Uuid::new_v4(),
            message: "test".to_string(),
            category: "general".to_string(),
            additional_data: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_live_connections() {
        let registry = NotificationRegistry::new();
        let (_id_a, mut rx_a) = registry.register().await;
        let (_id_b, mut rx_b) = registry.register().await;

        let delivered = registry.broadcast(&event()).await;
        assert_eq!(delivered, 2);
        assert!(rx_a.recv().await.is_some());
        assert!(rx_b.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_unregistered_connection_not_counted() {
        let registry = NotificationRegistry::new();
        let (id_a, _rx_a) = registry.register().await;
        let (_id_b, _rx_b) = registry.register().await;

        registry.unregister(id_a).await;
        assert_eq!(registry.connection_count().await, 1);
        assert_eq!(registry.broadcast(&event()).await, 1);
    }

    #[tokio::test]
    async fn test_broadcast_with_no_connections() {
        let registry = NotificationRegistry::new();
        assert_eq!(registry.broadcast(&event()).await, 0);
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_best_effort() {
        let registry = NotificationRegistry::new();
        let (_id, rx) = registry.register().await;
        drop(rx);
        // Still registered but the receiver is gone; delivery count skips it.
        assert_eq!(registry.broadcast(&event()).await, 0);
    }
}
