use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::constants::DEFAULT_EVENT_CHANNEL_CAPACITY;

/// Fan-out publisher for ticket lifecycle events
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<PublishedEvent>,
    enabled: bool,
}

/// Event that has been published
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub name: String,
    pub context: Value,
    pub published_at: DateTime<Utc>,
}

impl EventPublisher {
    /// Create a new event publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            enabled: true,
        }
    }

    /// Publisher that accepts and drops every event
    pub fn disabled() -> Self {
        let mut publisher = Self::new(1);
        publisher.enabled = false;
        publisher
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Publish an event with the given name and context
    pub async fn publish(
        &self,
        event_name: impl Into<String>,
        context: Value,
    ) -> Result<(), PublishError> {
        self.publish_at(event_name, context, Utc::now())
    }

    /// Publish with an explicit timestamp, normally the one stamped on the audit entry
    pub fn publish_at(
        &self,
        event_name: impl Into<String>,
        context: Value,
        published_at: DateTime<Utc>,
    ) -> Result<(), PublishError> {
        if !self.enabled {
            return Ok(());
        }

        let event = PublishedEvent {
            name: event_name.into(),
            context,
            published_at,
        };

        // No subscribers is not an error
        match self.sender.send(event) {
            Ok(_) => Ok(()),
            Err(broadcast::error::SendError(_)) => Ok(()),
        }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Error types for event publishing
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Event channel is closed")]
    ChannelClosed,
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CHANNEL_CAPACITY)
    }
}
