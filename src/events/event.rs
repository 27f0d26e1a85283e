//! Runtime events emitted by the supervisor.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Startup events**: model generation before the loop begins
//! - **Cycle events**: one launch → wait/escalate → classify iteration
//! - **Post-run events**: analysis and display refresh
//! - **Shutdown events**: operator interrupt
//!
//! The [`Event`] struct carries optional metadata (cycle number, pid, exit
//! code, durations, paths, reasons) depending on the kind.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore exact order when events are delivered
//! out of order.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::error::ExitClass;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Startup events ===
    /// The supervisor loop is starting.
    ///
    /// Sets: `reason` (parameter summary), `at`, `seq`.
    SupervisorStarted,

    /// The model file is missing and generation has begun.
    ///
    /// Sets: `path` (model file), `at`, `seq`.
    ModelGenerating,

    /// Model generation finished successfully.
    ///
    /// Sets: `path` (model file), `at`, `seq`.
    ModelGenerated,

    // === Cycle events ===
    /// A new cycle is starting.
    ///
    /// Sets: `cycle`, `reason` (backend name), `timeout_ms`, `at`, `seq`.
    CycleStarting,

    /// The engine process was spawned into its own process group.
    ///
    /// Sets: `cycle`, `pid`, `reason` (command line), `at`, `seq`.
    EngineSpawned,

    /// The engine could not be started this cycle.
    ///
    /// Sets: `cycle`, `reason` (spawn error), `at`, `seq`.
    LaunchFailed,

    /// Deadline expired; the graceful interrupt was sent to the process group.
    ///
    /// Sets: `cycle`, `timeout_ms`, `at`, `seq`.
    TimeoutHit,

    /// Grace period expired; the forceful kill was sent to the process group.
    ///
    /// Sets: `cycle`, `at`, `seq`.
    GraceExceeded,

    /// The cycle finished and was classified.
    ///
    /// Sets: `cycle`, `class`, `duration_ms`, `code` (non-zero exits only),
    /// `at`, `seq`.
    CycleFinished,

    // === Post-run events ===
    /// The analysis collaborator produced a fresh image artifact.
    ///
    /// Sets: `cycle`, `path` (image), `at`, `seq`.
    AnalysisCompleted,

    /// The analysis collaborator failed; the display is not refreshed.
    ///
    /// Sets: `cycle`, `reason`, `at`, `seq`.
    AnalysisFailed,

    /// The live display re-rendered the image artifact.
    ///
    /// Sets: `path` (image), `at`, `seq`.
    DisplayRefreshed,

    // === Shutdown events ===
    /// Operator interrupt observed; the supervisor is winding down.
    ///
    /// Sets: `at`, `seq`.
    InterruptRequested,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Cycle number (1-based), if applicable.
    pub cycle: Option<u64>,
    /// Engine process id.
    pub pid: Option<u32>,
    /// Engine exit code.
    pub code: Option<i32>,
    /// Configured deadline in milliseconds (compact).
    pub timeout_ms: Option<u64>,
    /// Cycle duration in milliseconds (compact).
    pub duration_ms: Option<u64>,
    /// Exit classification of a finished cycle.
    pub class: Option<ExitClass>,
    /// Artifact path (model file, activity log, image).
    pub path: Option<Arc<str>>,
    /// Human-readable reason (errors, command lines, parameter summaries).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            cycle: None,
            pid: None,
            code: None,
            timeout_ms: None,
            duration_ms: None,
            class: None,
            path: None,
            reason: None,
        }
    }

    /// Attaches a cycle number.
    #[inline]
    pub fn with_cycle(mut self, cycle: u64) -> Self {
        self.cycle = Some(cycle);
        self
    }

    /// Attaches an engine process id.
    #[inline]
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Attaches an exit code.
    #[inline]
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Attaches a deadline (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(d.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }

    /// Attaches a duration (stored as milliseconds).
    #[inline]
    pub fn with_duration(mut self, d: Duration) -> Self {
        self.duration_ms = Some(d.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }

    /// Attaches an exit classification.
    #[inline]
    pub fn with_class(mut self, class: ExitClass) -> Self {
        self.class = Some(class);
        self
    }

    /// Attaches an artifact path.
    #[inline]
    pub fn with_path(mut self, path: impl Into<Arc<str>>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_set_fields() {
        let ev = Event::now(EventKind::CycleFinished)
            .with_cycle(3)
            .with_class(ExitClass::Failed { code: 7 })
            .with_code(7)
            .with_duration(Duration::from_millis(1500));

        assert_eq!(ev.kind, EventKind::CycleFinished);
        assert_eq!(ev.cycle, Some(3));
        assert_eq!(ev.code, Some(7));
        assert_eq!(ev.duration_ms, Some(1500));
        assert_eq!(ev.class, Some(ExitClass::Failed { code: 7 }));
        assert!(ev.pid.is_none());
    }

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::now(EventKind::CycleStarting);
        let b = Event::now(EventKind::CycleStarting);
        assert!(b.seq > a.seq);
    }
}
