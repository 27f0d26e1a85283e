//! Event bus for broadcasting runtime events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from multiple sources (controller, escalator,
//! signal relay).
//!
//! ```text
//! Publishers (many):                    Subscriber (one):
//!   Controller ──┐
//!   Escalator  ──┼──────► Bus ───────► subscriber listener ────► SubscriberSet
//!   Relay      ──┘  (broadcast chan)     (in Controller)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks or awaits.
//! - **Bounded capacity**: a single ring buffer stores recent events.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n`
//!   oldest items.
//! - **No persistence**: events are lost if there are no active subscribers
//!   at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// Cheap to clone (internally holds an `Arc`-backed sender); multiple
/// publishers can publish concurrently and subscribers receive clones of each
/// event.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to >= 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active subscribers.
    ///
    /// If there are no receivers the event is dropped; publishing still
    /// returns immediately.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that observes subsequent events.
    ///
    /// Each call creates an independent receiver; it only sees events sent
    /// after it subscribed.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn subscriber_receives_published_events() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(Event::now(EventKind::CycleStarting).with_cycle(1));
        let ev = rx.recv().await.expect("event");
        assert_eq!(ev.kind, EventKind::CycleStarting);
        assert_eq!(ev.cycle, Some(1));
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_noop() {
        let bus = Bus::new(1);
        // No receiver; must not panic or block.
        bus.publish(Event::now(EventKind::InterruptRequested));
    }
}
