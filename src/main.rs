use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use simvisor::{
    Backend, Controller, Display, ImageViewer, LogWriter, NoopDisplay, RunConfig, RuntimeError,
    ScriptAnalyzer, ScriptModelSource, Subscribe,
};

/// Delay before exiting on interrupt, so queued log lines can flush.
const FLUSH_DELAY: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(
    name = "simvisor",
    version,
    about = "Run a simulation engine in a supervised loop with per-run timeouts"
)]
struct Cli {
    /// Model parameter set (e.g. A, B, C)
    #[arg(default_value = "A")]
    param_set: String,

    /// Stimulus onset delay in milliseconds
    #[arg(default_value_t = 2000)]
    stim_delay_ms: u64,

    /// Simulation backend
    #[arg(value_enum, default_value_t = Backend::Jnml)]
    backend: Backend,

    /// Per-run timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Analyze each run and show the plot in a live window
    #[arg(long)]
    gui: bool,

    /// Open the live window in fullscreen (with --gui)
    #[arg(long)]
    fullscreen: bool,

    /// Raise the live window to the front after each update (with --gui)
    #[arg(long)]
    popup: bool,

    /// Directory the engine runs in and artifacts live in
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,

    /// Model-generation script
    #[arg(long, default_value = "generate_model.py")]
    generator: PathBuf,

    /// Analysis script
    #[arg(long, default_value = "analyze_activity.py")]
    analyzer: PathBuf,
}

impl Cli {
    fn into_config(self) -> RunConfig {
        RunConfig {
            param_set: self.param_set,
            stim_delay_ms: self.stim_delay_ms,
            backend: self.backend,
            timeout: Duration::from_secs(self.timeout),
            work_dir: self.work_dir,
            generator: self.generator,
            analyzer: self.analyzer,
            analysis: self.gui,
            gui: self.gui,
            fullscreen: self.fullscreen,
            raise_on_update: self.popup,
            ..RunConfig::default()
        }
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cfg = Cli::parse().into_config();

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let display: Box<dyn Display> = if cfg.gui {
        Box::new(ImageViewer::new().fullscreen(cfg.fullscreen))
    } else {
        Box::new(NoopDisplay)
    };

    let mut controller = Controller::new(
        cfg.clone(),
        subs,
        Box::new(ScriptModelSource::from_config(&cfg)),
        Box::new(ScriptAnalyzer::from_config(&cfg)),
        display,
    );

    // run() only ever returns by unwinding: operator interrupt or a fatal
    // startup failure.
    let err = match controller.run().await {
        Ok(()) => return,
        Err(err) => err,
    };

    match &err {
        RuntimeError::Interrupted => {
            tokio::time::sleep(FLUSH_DELAY).await;
        }
        RuntimeError::Startup { error } => {
            eprintln!("[simvisor] {}: {error}", err.as_label());
        }
        _ => {}
    }
    std::process::exit(err.exit_code());
}
