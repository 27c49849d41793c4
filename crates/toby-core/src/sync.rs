//! Cross-instance notifications.
//!
//! Several pages may be open over the same storage. After toggling a
//! collapse flag, a page broadcasts its whole collapsed map; receivers
//! replace theirs wholesale. Collections themselves are not reconciled:
//! the last instance to save a key wins.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::PersistenceError;

/// Message sent between open instances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SyncMessage {
    #[serde(rename_all = "camelCase")]
    CollapsedStateUpdated {
        collapsed_collections: BTreeMap<String, bool>,
    },
}

/// Transport for [`SyncMessage`]s
pub trait SyncChannel: Send + Sync {
    fn broadcast(&self, message: &SyncMessage) -> Result<(), PersistenceError>;
}

/// A channel that drops every message (single-instance use)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullChannel;

impl SyncChannel for NullChannel {
    fn broadcast(&self, _message: &SyncMessage) -> Result<(), PersistenceError> {
        Ok(())
    }
}

/// In-process bus over `tokio::sync::broadcast`.
///
/// Clones share the same bus; each instance subscribes for its own receiver.
#[derive(Debug, Clone)]
pub struct LocalBus {
    sender: broadcast::Sender<SyncMessage>,
}

impl LocalBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncMessage> {
        self.sender.subscribe()
    }
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl SyncChannel for LocalBus {
    fn broadcast(&self, message: &SyncMessage) -> Result<(), PersistenceError> {
        match self.sender.send(message.clone()) {
            Ok(receivers) => {
                tracing::debug!("Broadcast sync message to {} receiver(s)", receivers);
                Ok(())
            }
            // nobody else is listening
            Err(_) => {
                tracing::debug!("Broadcast sync message with no receivers");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let message = SyncMessage::CollapsedStateUpdated {
            collapsed_collections: BTreeMap::from([("c1".to_string(), true)]),
        };
        let json = serde_json::to_string(&message).unwrap();
        assert_eq!(
            json,
            r#"{"type":"collapsedStateUpdated","collapsedCollections":{"c1":true}}"#
        );
        let back: SyncMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, message);
    }

    #[tokio::test]
    async fn test_local_bus_delivers_to_subscribers() {
        let bus = LocalBus::default();
        let mut rx = bus.subscribe();
        let message = SyncMessage::CollapsedStateUpdated {
            collapsed_collections: BTreeMap::new(),
        };
        bus.broadcast(&message).unwrap();
        assert_eq!(rx.recv().await.unwrap(), message);
    }

    #[test]
    fn test_local_bus_without_receivers_is_ok() {
        let bus = LocalBus::default();
        let message = SyncMessage::CollapsedStateUpdated {
            collapsed_collections: BTreeMap::new(),
        };
        assert!(bus.broadcast(&message).is_ok());
    }
}
