//! Error types and exit classifications used by the supervisor.
//!
//! This module defines three error enums plus the per-run exit classification:
//!
//! - [`RuntimeError`] — failures that unwind the whole supervisor (startup
//!   failure, operator interrupt).
//! - [`CycleError`] — failures confined to one cycle (the engine could not be
//!   launched); the loop always continues past these.
//! - [`CollabError`] — failures reported by collaborator commands (model
//!   generator, analysis routine).
//! - [`ExitClass`] — how one supervised engine run ended.
//!
//! All types provide `as_label()` returning a short stable snake_case string
//! for log lines; every classification produces exactly one such line.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that terminate the supervisor itself.
///
/// Everything else is caught and logged at the cycle boundary; only these two
/// unwind `Controller::run`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A prerequisite artifact could not be produced before the loop began.
    #[error("startup failed: {error}")]
    Startup {
        /// Description of the failed generation step.
        error: String,
    },

    /// The operator requested termination (SIGINT/SIGTERM).
    ///
    /// This is a normal termination path, not a fault.
    #[error("interrupted by operator")]
    Interrupted,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Startup { .. } => "startup_failed",
            RuntimeError::Interrupted => "interrupt_requested",
        }
    }

    /// Process exit code the supervisor should terminate with.
    ///
    /// `130` is the conventional "terminated by user request" sentinel.
    pub fn exit_code(&self) -> i32 {
        match self {
            RuntimeError::Startup { .. } => 1,
            RuntimeError::Interrupted => 130,
        }
    }
}

/// Errors confined to a single cycle.
///
/// The run loop logs these and proceeds to the next cycle after the pause.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CycleError {
    /// The engine process could not be spawned.
    #[error("failed to launch engine: {source}")]
    Launch {
        /// Underlying OS error from `spawn`.
        #[source]
        source: std::io::Error,
    },
}

impl CycleError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            CycleError::Launch { .. } => "launch_failed",
        }
    }
}

/// Errors reported by collaborator commands (generator, analyzer).
///
/// A generator error is fatal at startup ([`RuntimeError::Startup`]); an
/// analyzer error is logged and the display refresh is skipped.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CollabError {
    /// The collaborator command could not be started.
    #[error("command failed to start: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },

    /// The collaborator command ran and exited with a failure code.
    #[error("command exited with code {code}")]
    Status {
        /// Exit code (`-1` when terminated by a signal).
        code: i32,
    },

    /// The collaborator exited successfully but its promised artifact is missing.
    #[error("expected artifact missing: {path}")]
    MissingArtifact {
        /// Path the collaborator was expected to produce.
        path: PathBuf,
    },
}

/// Classification of one supervised engine run.
///
/// Produced by the timeout escalator (or by the controller when the launch
/// itself failed) and carried on the cycle record and its log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitClass {
    /// The engine exited with code 0 before the deadline. No signals were sent.
    Completed,

    /// The engine exited on its own with a non-zero code before the deadline.
    Failed {
        /// Exit code; `128 + signal` when the engine died to an external signal.
        code: i32,
    },

    /// Deadline (or interrupt) hit; the engine exited within the grace period
    /// after the graceful interrupt signal.
    TimedOutGraceful,

    /// Deadline (or interrupt) hit; the engine ignored the graceful signal and
    /// was forcefully killed after the grace period.
    TimedOutKilled,

    /// The engine process never started (spawn error, missing generated script).
    LaunchFailed,
}

impl ExitClass {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ExitClass::Completed => "completed",
            ExitClass::Failed { .. } => "non_zero_exit",
            ExitClass::TimedOutGraceful => "timed_out_graceful",
            ExitClass::TimedOutKilled => "timed_out_killed",
            ExitClass::LaunchFailed => "launch_failed",
        }
    }

    /// True only for a clean, in-deadline exit.
    pub fn is_success(&self) -> bool {
        matches!(self, ExitClass::Completed)
    }

    /// True when the run was cut short by the escalation protocol.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExitClass::TimedOutGraceful | ExitClass::TimedOutKilled)
    }
}

impl std::fmt::Display for ExitClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(RuntimeError::Interrupted.as_label(), "interrupt_requested");
        assert_eq!(
            RuntimeError::Startup {
                error: "boom".into()
            }
            .as_label(),
            "startup_failed"
        );
        assert_eq!(ExitClass::Completed.as_label(), "completed");
        assert_eq!(ExitClass::Failed { code: 7 }.as_label(), "non_zero_exit");
        assert_eq!(ExitClass::TimedOutGraceful.as_label(), "timed_out_graceful");
        assert_eq!(ExitClass::TimedOutKilled.as_label(), "timed_out_killed");
        assert_eq!(ExitClass::LaunchFailed.as_label(), "launch_failed");
    }

    #[test]
    fn exit_codes() {
        assert_eq!(RuntimeError::Interrupted.exit_code(), 130);
        assert_eq!(
            RuntimeError::Startup {
                error: "gen".into()
            }
            .exit_code(),
            1
        );
    }

    #[test]
    fn classification_predicates() {
        assert!(ExitClass::Completed.is_success());
        assert!(!ExitClass::Failed { code: 1 }.is_success());
        assert!(ExitClass::TimedOutKilled.is_timeout());
        assert!(!ExitClass::LaunchFailed.is_timeout());
    }
}
