//! Operator signal relay.
//!
//! Installs listeners for the interrupt and terminate signals for the
//! lifetime of the supervisor and converts the **first** one observed into a
//! latched interrupt request: publish [`EventKind::InterruptRequested`],
//! cancel the runtime token, done.
//!
//! The relay never signals the child itself. If a run is in flight, the
//! escalator is parked on the same token and converges on its one
//! graceful-then-forceful path; if no run is in flight, the controller's
//! cancellable sleep observes the token and unwinds. Either way there is a
//! single place that issues termination signals.
//!
//! Signals after the first are no-ops until process exit — the listener keeps
//! draining them so the default disposition never fires mid-cleanup.
//!
//! ## Signals
//! **Unix:** `SIGINT` (Ctrl-C), `SIGTERM` (default kill, systemd).
//! **Elsewhere:** `Ctrl-C` via [`tokio::signal::ctrl_c`].

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::events::{Bus, Event, EventKind};
use crate::proc::SupervisorState;

/// Waits for one interrupt/terminate signal.
///
/// Each call creates independent listeners. Returns `Ok(())` when a signal is
/// received, or `Err` if registration fails.
#[cfg(unix)]
async fn wait_for_interrupt_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_interrupt_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Spawns the relay task for the lifetime of the supervisor.
///
/// Only the first signal latches the interrupt; the task then keeps absorbing
/// repeats so they cannot re-trigger escalation or kill the process outright.
pub fn relay(state: Arc<SupervisorState>, bus: Bus) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if wait_for_interrupt_signal().await.is_err() {
                // Registration failed; nothing to relay.
                return;
            }
            if state.request_interrupt() {
                bus.publish(Event::now(EventKind::InterruptRequested));
            }
        }
    })
}
