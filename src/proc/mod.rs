//! Process plumbing: launching, supervising, and signaling the engine.
//!
//! Internal modules:
//! - [`state`]: the one piece of cross-context shared mutable state
//!   (active process group + latched interrupt flag);
//! - [`launch`]: spawns the engine in its own process group with captured
//!   output streams;
//! - [`escalate`]: bounds a launched process to a deadline and owns the
//!   graceful-then-forceful escalation protocol.
//!
//! ```text
//! Controller ──► launch::spawn_group() ──► ProcessHandle
//!                                              │
//!                      escalate::supervise(handle, timeout, grace, ...)
//!                                              │
//!              ┌───────────────┬───────────────┴──────────────┐
//!              ▼               ▼                              ▼
//!        child exits      deadline hits               interrupt token
//!              │               └──────────┬──────────────────┘
//!              ▼                          ▼
//!      Completed/Failed        SIGINT → grace wait → SIGKILL
//!                              TimedOutGraceful / TimedOutKilled
//! ```
//!
//! Exactly one `ProcessHandle` exists at any instant; `SupervisorState`
//! records its process group for the signal relay and is cleared before the
//! handle is reaped.

mod escalate;
mod launch;
mod state;

pub use escalate::supervise;
pub use launch::{spawn_group, ProcessHandle};
pub use state::SupervisorState;
