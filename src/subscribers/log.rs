//! Timestamped stdout logging subscriber.
//!
//! [`LogWriter`] prints every event as one human-readable, timestamped line.
//! This is the default observability surface of the supervisor: each error
//! classification produces exactly one line naming it.
//!
//! ## Output format
//! ```text
//! [2026-08-06T12:00:00] [info] starting loop: param_set=A backend=jnml timeout=30s (press Ctrl+C to stop)
//! [2026-08-06T12:00:00] [model] generating LEMS_sim_A.xml
//! [2026-08-06T12:00:04] [run] cycle=1 backend=jnml timeout=30s
//! [2026-08-06T12:00:04] [engine] pid=4242 cmd="pynml LEMS_sim_A.xml"
//! [2026-08-06T12:00:34] [timeout] interrupt sent to process group after 30s
//! [2026-08-06T12:00:39] [grace-exceeded] kill sent to process group
//! [2026-08-06T12:00:39] [done] cycle=1 class=timed_out_killed duration=35.1s
//! [2026-08-06T12:00:40] [analysis] image=activity_analysis.png
//! [2026-08-06T12:00:40] [display] refreshed activity_analysis.png
//! [2026-08-06T12:00:41] [interrupt] stopping current run and exiting
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Timestamped stdout logging subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    pub fn new() -> Self {
        Self
    }

    fn ts(ev: &Event) -> String {
        DateTime::<Local>::from(ev.at)
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string()
    }

    fn secs(ms: Option<u64>) -> String {
        match ms {
            Some(ms) => format!("{:.1}s", ms as f64 / 1000.0),
            None => "?".to_string(),
        }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let ts = Self::ts(e);
        match e.kind {
            EventKind::SupervisorStarted => {
                println!(
                    "[{ts}] [info] starting loop: {} (press Ctrl+C to stop)",
                    e.reason.as_deref().unwrap_or("")
                );
            }
            EventKind::ModelGenerating => {
                println!(
                    "[{ts}] [model] generating {}",
                    e.path.as_deref().unwrap_or("?")
                );
            }
            EventKind::ModelGenerated => {
                println!(
                    "[{ts}] [model] generated {}",
                    e.path.as_deref().unwrap_or("?")
                );
            }
            EventKind::CycleStarting => {
                println!(
                    "[{ts}] [run] cycle={} backend={} timeout={}",
                    e.cycle.unwrap_or(0),
                    e.reason.as_deref().unwrap_or("?"),
                    Self::secs(e.timeout_ms),
                );
            }
            EventKind::EngineSpawned => {
                println!(
                    "[{ts}] [engine] pid={} cmd={:?}",
                    e.pid.unwrap_or(0),
                    e.reason.as_deref().unwrap_or(""),
                );
            }
            EventKind::LaunchFailed => {
                println!(
                    "[{ts}] [error] cycle={} launch_failed: {}",
                    e.cycle.unwrap_or(0),
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
            EventKind::TimeoutHit => {
                println!(
                    "[{ts}] [timeout] interrupt sent to process group after {}",
                    Self::secs(e.timeout_ms),
                );
            }
            EventKind::GraceExceeded => {
                println!("[{ts}] [grace-exceeded] kill sent to process group");
            }
            EventKind::CycleFinished => {
                let class = e.class.map(|c| c.as_label()).unwrap_or("?");
                match e.code {
                    Some(code) => println!(
                        "[{ts}] [done] cycle={} class={class} code={code} duration={}",
                        e.cycle.unwrap_or(0),
                        Self::secs(e.duration_ms),
                    ),
                    None => println!(
                        "[{ts}] [done] cycle={} class={class} duration={}",
                        e.cycle.unwrap_or(0),
                        Self::secs(e.duration_ms),
                    ),
                }
            }
            EventKind::AnalysisCompleted => {
                println!(
                    "[{ts}] [analysis] image={}",
                    e.path.as_deref().unwrap_or("?")
                );
            }
            EventKind::AnalysisFailed => {
                println!(
                    "[{ts}] [error] cycle={} analysis_failed: {}",
                    e.cycle.unwrap_or(0),
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
            EventKind::DisplayRefreshed => {
                println!(
                    "[{ts}] [display] refreshed {}",
                    e.path.as_deref().unwrap_or("?")
                );
            }
            EventKind::InterruptRequested => {
                println!("[{ts}] [interrupt] stopping current run and exiting");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
