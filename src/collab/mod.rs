//! Collaborator seams: model generation, analysis, live display.
//!
//! The supervisor does not know how its collaborators compute anything; it
//! only starts them and reads their exit status. Each seam is a trait with a
//! script-backed implementation, so tests can substitute fakes:
//!
//! - [`ModelSource`] produces the model file the engine consumes
//!   (fatal at startup when it fails);
//! - [`Analyzer`] turns the engine's activity log into an image artifact
//!   (failures are logged, never fatal);
//! - [`Display`] re-renders that image in a live window
//!   (best-effort, failures swallowed, no-op by default).

mod analyze;
mod display;
mod model;

pub use analyze::{Analyzer, ScriptAnalyzer};
pub use display::{Display, ImageViewer, NoopDisplay};
pub use model::{ModelSource, ScriptModelSource};
