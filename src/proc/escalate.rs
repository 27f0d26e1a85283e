//! Deadline supervision and the graceful-then-forceful escalation protocol.
//!
//! [`supervise`] blocks until one of three outcomes drives the run's state
//! machine:
//!
//! ```text
//! Running ──(child exits)──────────────► Completed / Failed
//!    │
//!    ├──(deadline expires)──┐
//!    └──(interrupt token)───┴─► GraceWait: SIGINT to the process group
//!                                   │
//!                                   ├─(exits within grace)─► TimedOutGraceful
//!                                   └─(grace expires)──────► SIGKILL ─► TimedOutKilled
//! ```
//!
//! ## Rules
//! - This module is the **only** place that issues termination signals; the
//!   signal relay just cancels the token and lets the in-flight wait converge
//!   here. One code path, no double-kill races.
//! - The active process group is registered in [`SupervisorState`] for the
//!   whole wait and cleared before the handle is reaped.
//! - `ESRCH` from `killpg` means the group is already gone; the subsequent
//!   `wait` reaps it and classification proceeds normally.
//! - Captured engine output is echoed to the supervisor's own streams after
//!   classification, whatever the outcome.

use std::io::Write;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use std::time::Duration;

use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tokio::time;

use crate::error::ExitClass;
use crate::events::{Bus, Event, EventKind};

use super::launch::ProcessHandle;
use super::state::SupervisorState;

/// What ended the `Running` state.
enum Trigger {
    Exited(std::io::Result<ExitStatus>),
    Deadline,
    Interrupt,
}

/// Supervises one launched engine run until exit, deadline, or interrupt.
///
/// Returns the run's [`ExitClass`]; never the supervisor's own errors — a
/// failed `wait` is folded into `Failed` so the cycle still gets exactly one
/// classification line.
pub async fn supervise(
    mut handle: ProcessHandle,
    timeout: Duration,
    grace: Duration,
    state: &SupervisorState,
    bus: &Bus,
    cycle: u64,
) -> ExitClass {
    state.set_active(handle.pgid());

    let deadline = time::sleep(timeout);
    tokio::pin!(deadline);
    let token = state.token();

    let trigger = {
        let wait = handle.wait();
        tokio::pin!(wait);
        tokio::select! {
            res = &mut wait => Trigger::Exited(res),
            _ = &mut deadline => Trigger::Deadline,
            _ = token.cancelled() => Trigger::Interrupt,
        }
    };

    let class = match trigger {
        Trigger::Exited(res) => classify(res),
        Trigger::Deadline => {
            bus.publish(
                Event::now(EventKind::TimeoutHit)
                    .with_cycle(cycle)
                    .with_timeout(timeout),
            );
            escalate(&mut handle, grace, bus, cycle).await
        }
        // The relay already announced the interrupt; escalation starts
        // immediately instead of after the deadline.
        Trigger::Interrupt => escalate(&mut handle, grace, bus, cycle).await,
    };

    state.clear_active();

    let (out, err) = handle.drain_output().await;
    echo(&out, &err);

    class
}

/// The single escalation routine: SIGINT, grace wait, then SIGKILL.
async fn escalate(
    handle: &mut ProcessHandle,
    grace: Duration,
    bus: &Bus,
    cycle: u64,
) -> ExitClass {
    signal_group(handle.pgid(), Signal::SIGINT);

    match time::timeout(grace, handle.wait()).await {
        Ok(_status) => ExitClass::TimedOutGraceful,
        Err(_elapsed) => {
            bus.publish(Event::now(EventKind::GraceExceeded).with_cycle(cycle));
            signal_group(handle.pgid(), Signal::SIGKILL);
            let _ = handle.wait().await;
            ExitClass::TimedOutKilled
        }
    }
}

/// Sends `sig` to the whole process group.
///
/// ESRCH means every process in the group already exited; the caller's
/// `wait` will reap the child either way, so errors are not propagated.
fn signal_group(pgid: Pid, sig: Signal) {
    if let Err(errno) = killpg(pgid, sig) {
        if errno != nix::errno::Errno::ESRCH {
            eprintln!("[simvisor] killpg({pgid:?}, {sig:?}) failed: {errno}");
        }
    }
}

fn classify(res: std::io::Result<ExitStatus>) -> ExitClass {
    match res {
        Ok(status) => match status.code() {
            Some(0) => ExitClass::Completed,
            Some(code) => ExitClass::Failed { code },
            // Died to an external signal before our deadline; report the
            // shell convention 128 + N.
            None => ExitClass::Failed {
                code: 128 + status.signal().unwrap_or(0),
            },
        },
        Err(_) => ExitClass::Failed { code: -1 },
    }
}

/// Replays the child's captured output on the supervisor's own streams.
fn echo(out: &[u8], err: &[u8]) {
    if !out.is_empty() {
        let _ = std::io::stdout().write_all(out);
    }
    if !err.is_empty() {
        let _ = std::io::stderr().write_all(err);
    }
}
