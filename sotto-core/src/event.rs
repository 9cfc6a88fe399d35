// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed publish/subscribe bus for overlay notifications.
//!
//! The overlay publishes a closed set of event variants instead of ad-hoc
//! subject/topic/data triples. Listeners subscribe through a broadcast
//! channel; publishing is synchronous and never blocks, listeners that fall
//! behind lose the oldest events.
use tokio::sync::broadcast;

use crate::conversation::ConversationId;
use crate::session::SessionSnapshot;
use crate::trust::TrustLevel;

/// Capacity of the broadcast channel behind [`EventBus`]. Listeners lagging
/// further than this lose events.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Notification published by the overlay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Protocol-level log line, mirrored to `tracing` as well.
    Log(String),

    /// The cryptographic state of a session changed, for example after a
    /// completed key exchange or a disconnect.
    StateChanged {
        conversation: ConversationId,
        session: SessionSnapshot,
        trust: TrustLevel,
    },
}

/// Fan-out handle for [`Event`]s.
#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Publishes an event to all current subscribers. An event published
    /// while nobody listens is dropped silently.
    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Event, EventBus};

    #[test]
    fn all_subscribers_receive_published_events() {
        let bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(Event::Log("hello".into()));

        assert_eq!(first.try_recv(), Ok(Event::Log("hello".into())));
        assert_eq!(second.try_recv(), Ok(Event::Log("hello".into())));
        assert!(first.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_a_no_op() {
        let bus = EventBus::new();
        bus.publish(Event::Log("dropped".into()));

        // A subscriber joining later only sees what is published afterwards.
        let mut rx = bus.subscribe();
        assert!(rx.try_recv().is_err());
    }
}
