//! Per-invocation run configuration.
//!
//! [`RunConfig`] bundles everything one supervisor invocation needs: the
//! parameter set and stimulus delay handed to the model generator, the
//! execution [`Backend`], the per-run deadline and escalation grace, the
//! inter-cycle pause, collaborator script paths, and display toggles.
//!
//! Built once from CLI input at startup; never mutated afterwards. Artifact
//! paths (model file, activity log, analysis image) are derived from the
//! parameter set so a restarted supervisor finds the same files again.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use simvisor::{Backend, RunConfig};
//!
//! let mut cfg = RunConfig::default();
//! cfg.param_set = "B".into();
//! cfg.backend = Backend::Neuron;
//! cfg.timeout = Duration::from_secs(45);
//!
//! assert_eq!(cfg.model_file().file_name().unwrap(), "LEMS_sim_B.xml");
//! assert_eq!(cfg.activity_log().file_name().unwrap(), "sim_B.dat");
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

/// The external engine used to execute one simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Run the model directly through `pynml`.
    Jnml,
    /// Generate NEURON code from the model, then run it through `nrniv`.
    Neuron,
}

impl Backend {
    /// Stable lowercase name for log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Jnml => "jnml",
            Backend::Neuron => "neuron",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable configuration for one supervisor invocation.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Model parameter set identifier (e.g. "A", "B").
    pub param_set: String,
    /// Stimulus onset delay in milliseconds, forwarded to generator and analyzer.
    pub stim_delay_ms: u64,
    /// Execution backend for each run.
    pub backend: Backend,
    /// Per-run deadline before escalation begins.
    pub timeout: Duration,
    /// How long to wait after the graceful interrupt before the forceful kill.
    pub grace: Duration,
    /// Pause between cycles, applied unconditionally.
    pub pause: Duration,
    /// Directory the engine runs in and artifacts live in.
    pub work_dir: PathBuf,
    /// Model-generation collaborator script.
    pub generator: PathBuf,
    /// Analysis collaborator script.
    pub analyzer: PathBuf,
    /// Interpreter used to run collaborator scripts.
    pub python: String,
    /// Run the analysis collaborator after each cycle.
    pub analysis: bool,
    /// Push refreshed analysis images to a live display.
    pub gui: bool,
    /// Ask the display for a fullscreen window.
    pub fullscreen: bool,
    /// Raise the display window after each refresh.
    pub raise_on_update: bool,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
}

impl Default for RunConfig {
    /// Provides a default configuration:
    /// - `param_set = "A"`, `stim_delay_ms = 2000`, `backend = Jnml`
    /// - `timeout = 30s`, `grace = 5s`, `pause = 2s`
    /// - `work_dir = "."`, `python = "python3"`
    /// - analysis/display toggles off, `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            param_set: "A".to_string(),
            stim_delay_ms: 2000,
            backend: Backend::Jnml,
            timeout: Duration::from_secs(30),
            grace: Duration::from_secs(5),
            pause: Duration::from_secs(2),
            work_dir: PathBuf::from("."),
            generator: PathBuf::from("generate_model.py"),
            analyzer: PathBuf::from("analyze_activity.py"),
            python: "python3".to_string(),
            analysis: false,
            gui: false,
            fullscreen: false,
            raise_on_update: false,
            bus_capacity: 1024,
        }
    }
}

impl RunConfig {
    /// Path of the model file the generator produces and the engine consumes.
    pub fn model_file(&self) -> PathBuf {
        self.work_dir.join(format!("LEMS_sim_{}.xml", self.param_set))
    }

    /// Path of the NEURON driver script produced by `pynml -neuron` codegen.
    pub fn nrn_script(&self) -> PathBuf {
        self.work_dir
            .join(format!("LEMS_sim_{}_nrn.py", self.param_set))
    }

    /// Path of the tabular activity log the engine writes.
    pub fn activity_log(&self) -> PathBuf {
        self.work_dir.join(format!("sim_{}.dat", self.param_set))
    }

    /// Path of the image artifact the analyzer produces.
    pub fn analysis_image(&self) -> PathBuf {
        self.work_dir.join("activity_analysis.png")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.backend, Backend::Jnml);
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert_eq!(cfg.grace, Duration::from_secs(5));
        assert_eq!(cfg.pause, Duration::from_secs(2));
        assert!(!cfg.analysis);
        assert!(!cfg.gui);
    }

    #[test]
    fn derived_paths_follow_param_set() {
        let cfg = RunConfig {
            param_set: "C".into(),
            work_dir: PathBuf::from("/tmp/runs"),
            ..RunConfig::default()
        };
        assert_eq!(
            cfg.model_file(),
            PathBuf::from("/tmp/runs/LEMS_sim_C.xml")
        );
        assert_eq!(
            cfg.nrn_script(),
            PathBuf::from("/tmp/runs/LEMS_sim_C_nrn.py")
        );
        assert_eq!(cfg.activity_log(), PathBuf::from("/tmp/runs/sim_C.dat"));
        assert_eq!(
            cfg.analysis_image(),
            PathBuf::from("/tmp/runs/activity_analysis.png")
        );
    }

    #[test]
    fn backend_names() {
        assert_eq!(Backend::Jnml.as_str(), "jnml");
        assert_eq!(Backend::Neuron.to_string(), "neuron");
    }
}
