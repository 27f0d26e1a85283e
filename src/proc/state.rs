//! Process-wide supervisor state shared with the signal relay.
//!
//! [`SupervisorState`] is the **only** cross-context shared mutable state in
//! the system: the process group currently being supervised (if any) and a
//! latched interrupt flag backed by a [`CancellationToken`].
//!
//! ## Rules
//! - The active group is registered right after spawn and cleared before the
//!   handle is reaped, so the relay can never address a stale group.
//! - `request_interrupt()` latches: only the first call cancels the token and
//!   returns `true`; later calls are no-ops. This makes repeated operator
//!   signals idempotent.
//! - With the single-concurrency invariant, "a group is registered" is
//!   equivalent to "the escalator is waiting on it" — which is why the relay
//!   never needs to send signals itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use nix::unistd::Pid;
use tokio_util::sync::CancellationToken;

/// Shared state between the run loop, the escalator, and the signal relay.
#[derive(Debug, Default)]
pub struct SupervisorState {
    active: Mutex<Option<Pid>>,
    interrupted: AtomicBool,
    token: CancellationToken,
}

impl SupervisorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a clone of the runtime cancellation token.
    ///
    /// The token is cancelled exactly once, by the first interrupt request.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Records the process group of the run in flight.
    pub fn set_active(&self, pgid: Pid) {
        *self.active.lock().expect("state lock poisoned") = Some(pgid);
    }

    /// Clears the active process group. Must happen before the handle is reaped.
    pub fn clear_active(&self) {
        *self.active.lock().expect("state lock poisoned") = None;
    }

    /// Returns the process group currently being supervised, if any.
    pub fn active(&self) -> Option<Pid> {
        *self.active.lock().expect("state lock poisoned")
    }

    /// Latches the interrupt flag.
    ///
    /// Returns `true` only for the first request; that call also cancels the
    /// runtime token. Subsequent requests are no-ops.
    pub fn request_interrupt(&self) -> bool {
        let first = !self.interrupted.swap(true, Ordering::SeqCst);
        if first {
            self.token.cancel();
        }
        first
    }

    /// True once an interrupt has been requested.
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}
