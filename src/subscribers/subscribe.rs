//! Event subscriber trait.
//!
//! [`Subscribe`] is the extension point for plugging custom event handlers
//! into the supervisor (logging, metrics, alerting).
//!
//! Each subscriber gets:
//! - a **dedicated worker task** (runs independently),
//! - a **per-subscriber bounded queue** (capacity via
//!   [`Subscribe::queue_capacity`]),
//! - **panic isolation** (panics are caught and reported to stderr).
//!
//! ## Rules
//! - A slow subscriber only affects its own queue.
//! - Queue overflow drops the event **for this subscriber only**.
//! - Events are processed sequentially (FIFO) per subscriber.
//! - Subscribers never block publishers or each other.

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for supervisor observability.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from a dedicated worker task, never in the publisher context.
    /// Events are delivered in FIFO order per subscriber.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in overflow/panic diagnostics.
    ///
    /// Prefer short, descriptive names (e.g. "log", "metrics").
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this subscriber.
    ///
    /// The runtime clamps capacity to a minimum of 1. Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
