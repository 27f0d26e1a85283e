//! # simvisor
//!
//! **Simvisor** runs an external simulation engine in a supervised loop:
//! each run is capped to a wall-clock deadline, escalated through a
//! graceful-then-forceful signal protocol when it overstays, optionally
//! analyzed and pushed to a live display, then repeated after a fixed pause —
//! forever, until the operator interrupts.
//!
//! ## Architecture
//! ```text
//!          CLI args ──► RunConfig (immutable for the whole invocation)
//!                             │
//! ┌───────────────────────────▼───────────────────────────────────────┐
//! │ Controller (run-cycle loop)                                       │
//! │  - ensures the model artifact exists (generate once, fatal on err)│
//! │  - one cycle at a time: launch ► supervise ► classify ► analyze   │
//! │  - pauses a fixed interval between cycles, repeats unconditionally│
//! └──────┬──────────────────────┬─────────────────────────┬───────────┘
//!        ▼                      ▼                         ▼
//! ┌──────────────┐      ┌───────────────┐        ┌─────────────────┐
//! │ spawn_group  │      │  supervise    │        │ collab seams    │
//! │ (new process │ ───► │  (deadline +  │        │ ModelSource     │
//! │  group, piped│      │   escalation  │        │ Analyzer        │
//! │  stdio)      │      │   protocol)   │        │ Display         │
//! └──────────────┘      └───────┬───────┘        └─────────────────┘
//!                               │ SIGINT → grace → SIGKILL
//!                               ▼ (killpg, the only signal sender)
//!                     child process group
//!
//! Orthogonal: signals::relay listens for SIGINT/SIGTERM, latches the
//! interrupt in SupervisorState and cancels the runtime token; whichever
//! suspension point is active observes it. Exit code 130.
//!
//! Observability: every component publishes Events to the Bus; the
//! SubscriberSet fans them out (bounded queues, panic isolation) and the
//! built-in LogWriter prints one timestamped line per event.
//! ```
//!
//! ## Guarantees
//! - At most one engine process (group) is alive at any instant.
//! - A child that exits cleanly before the deadline never receives a signal.
//! - Escalation sends exactly one SIGINT and at most one SIGKILL per run,
//!   from exactly one code path, whether triggered by deadline or operator.
//! - Per-cycle failures (launch, non-zero exit, timeout, analysis) are
//!   logged and never stop the loop.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use simvisor::{
//!     Controller, LogWriter, NoopDisplay, RunConfig, ScriptAnalyzer,
//!     ScriptModelSource, Subscribe,
//! };
//!
//! #[tokio::main(flavor = "multi_thread")]
//! async fn main() {
//!     let cfg = RunConfig::default();
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!
//!     let mut controller = Controller::new(
//!         cfg.clone(),
//!         subs,
//!         Box::new(ScriptModelSource::from_config(&cfg)),
//!         Box::new(ScriptAnalyzer::from_config(&cfg)),
//!         Box::new(NoopDisplay),
//!     );
//!
//!     if let Err(e) = controller.run().await {
//!         std::process::exit(e.exit_code());
//!     }
//! }
//! ```

mod collab;
mod config;
mod cycle;
mod error;
mod events;
mod proc;
mod signals;
mod subscribers;

// ---- Public re-exports ----

pub use collab::{
    Analyzer, Display, ImageViewer, ModelSource, NoopDisplay, ScriptAnalyzer, ScriptModelSource,
};
pub use config::{Backend, RunConfig};
pub use cycle::{Controller, CycleRecord};
pub use error::{CollabError, CycleError, ExitClass, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use proc::{spawn_group, supervise, ProcessHandle, SupervisorState};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
