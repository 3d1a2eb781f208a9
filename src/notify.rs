//! Outbound delivery of session events.
//!
//! Sessions only queue events. Whoever drives a session drains the queue
//! after each command and hands the events to a [`NotificationSink`].

use crate::session::{SessionEvent, SessionId};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument};

/// Receives drained session events.
pub trait NotificationSink: Send + Sync {
    /// Delivers one event. Delivery is best effort.
    fn publish(&self, session_id: &SessionId, event: &SessionEvent);

    /// Delivers a batch in order.
    fn publish_all(&self, session_id: &SessionId, events: &[SessionEvent]) {
        for event in events {
            self.publish(session_id, event);
        }
    }
}

/// Writes each event to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn publish(&self, session_id: &SessionId, event: &SessionEvent) {
        info!(%session_id, event = event.name(), ?event, "Session event");
    }
}

/// Fans events out to any number of subscribers.
///
/// Subscribers that fall behind lose the oldest events, as with any
/// [`broadcast`] channel.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<SessionEvent>,
}

impl BroadcastSink {
    /// Creates a sink buffering up to `capacity` events per subscriber.
    #[instrument]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

impl NotificationSink for BroadcastSink {
    fn publish(&self, session_id: &SessionId, event: &SessionEvent) {
        // No subscribers is not an error.
        let delivered = self.sender.send(event.clone()).unwrap_or(0);
        debug!(%session_id, event = event.name(), delivered, "Event broadcast");
    }
}

/// Publishes every event to several sinks in turn.
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl FanoutSink {
    /// Creates an empty fan-out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink.
    pub fn with(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl NotificationSink for FanoutSink {
    fn publish(&self, session_id: &SessionId, event: &SessionEvent) {
        for sink in &self.sinks {
            sink.publish(session_id, event);
        }
    }
}
