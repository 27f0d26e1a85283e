//! Event subscribers for supervisor observability.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`]
//! fan-out, and the built-in [`LogWriter`] that renders timestamped log
//! lines.
//!
//! ```text
//! Event flow:
//!   Controller/Escalator/Relay ── publish(Event) ──► Bus
//!                                                     │
//!                                   subscriber listener (in Controller)
//!                                                     │
//!                                             SubscriberSet::emit
//!                                      ┌──────────────┼──────────────┐
//!                                      ▼              ▼              ▼
//!                                  [queue S1]     [queue S2]     [queue SN]
//!                                      ▼              ▼              ▼
//!                                  worker S1      worker S2      worker SN
//!                                      ▼              ▼              ▼
//!                                 on_event()     on_event()     on_event()
//! ```
//!
//! Observability is strictly fire-and-forget: a slow or panicking subscriber
//! never blocks the control loop.

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
