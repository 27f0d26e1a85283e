//! Per-cycle bookkeeping.
//!
//! A [`CycleRecord`] exists only to back the one `[done]` log line printed at
//! cycle end; it is never persisted. Start/end wall-clock stamps live on the
//! `CycleStarting`/`CycleFinished` events themselves.

use std::time::Duration;

use crate::error::ExitClass;

/// Ephemeral summary of one finished cycle.
#[derive(Debug, Clone, Copy)]
pub struct CycleRecord {
    /// Cycle number, 1-based.
    pub cycle: u64,
    /// How the run ended.
    pub class: ExitClass,
    /// Wall-clock duration of the launch-to-classification span.
    pub duration: Duration,
}

impl CycleRecord {
    pub fn new(cycle: u64, class: ExitClass, duration: Duration) -> Self {
        Self {
            cycle,
            class,
            duration,
        }
    }

    /// Exit code to surface on the log line, when the class carries one.
    pub fn code(&self) -> Option<i32> {
        match self.class {
            ExitClass::Failed { code } => Some(code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_only_for_non_zero_exits() {
        let failed = CycleRecord::new(1, ExitClass::Failed { code: 9 }, Duration::ZERO);
        assert_eq!(failed.code(), Some(9));

        let killed = CycleRecord::new(2, ExitClass::TimedOutKilled, Duration::ZERO);
        assert_eq!(killed.code(), None);
    }
}
