//! The run-cycle controller: launch, bound, classify, analyze, pause, repeat.
//!
//! [`Controller`] owns the event bus, the subscriber fan-out, the shared
//! [`SupervisorState`] and the collaborator seams. `run()` is the whole
//! program:
//!
//! ```text
//! ensure model exists (generate once; fatal on failure)
//! loop {
//!   ├─► publish CycleStarting
//!   ├─► build backend command ──► spawn_group() ──► supervise()
//!   ├─► publish CycleFinished { class, duration }       (observability only)
//!   ├─► if analysis enabled and activity log non-empty:
//!   │     analyze ──► display.refresh() ──► display.raise()
//!   │     (failures logged, refresh skipped, loop unaffected)
//!   └─► cancellable pause, then next cycle
//! }
//! ```
//!
//! ## Rules
//! - A launch failure, a non-zero exit, a timeout, or an analysis failure
//!   fail **this cycle only**; the loop always continues after the pause.
//! - The only exits are an operator interrupt
//!   ([`RuntimeError::Interrupted`], exit code 130) and a model-generation
//!   failure before the first cycle ([`RuntimeError::Startup`]).
//! - All suspension points race the runtime token, so an interrupt is
//!   honored wherever the loop happens to be parked.

use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;
use tokio::time;

use crate::collab::{Analyzer, Display, ModelSource};
use crate::config::{Backend, RunConfig};
use crate::cycle::record::CycleRecord;
use crate::error::{CycleError, ExitClass, RuntimeError};
use crate::events::{Bus, Event, EventKind};
use crate::proc::{spawn_group, supervise, SupervisorState};
use crate::signals;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Drives the unbounded supervision loop.
pub struct Controller {
    cfg: RunConfig,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    state: Arc<SupervisorState>,
    model: Box<dyn ModelSource>,
    analyzer: Box<dyn Analyzer>,
    display: Box<dyn Display>,
}

impl Controller {
    /// Creates a controller with the given config, subscribers, and
    /// collaborator implementations.
    pub fn new(
        cfg: RunConfig,
        subscribers: Vec<Arc<dyn Subscribe>>,
        model: Box<dyn ModelSource>,
        analyzer: Box<dyn Analyzer>,
        display: Box<dyn Display>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity);
        let subs = Arc::new(SubscriberSet::new(subscribers));
        Self {
            cfg,
            bus,
            subs,
            state: Arc::new(SupervisorState::new()),
            model,
            analyzer,
            display,
        }
    }

    /// Event bus shared with all components (useful for extra receivers).
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Shared supervisor state (active process group, interrupt latch).
    pub fn state(&self) -> Arc<SupervisorState> {
        Arc::clone(&self.state)
    }

    /// Runs the loop until an operator interrupt or a startup failure.
    ///
    /// `Ok(())` is unreachable in practice; the signature exists so both
    /// unwinding paths surface as [`RuntimeError`].
    pub async fn run(&mut self) -> Result<(), RuntimeError> {
        self.subscriber_listener();
        signals::relay(Arc::clone(&self.state), self.bus.clone());

        self.bus.publish(
            Event::now(EventKind::SupervisorStarted).with_reason(format!(
                "param_set={} backend={} timeout={}s",
                self.cfg.param_set,
                self.cfg.backend,
                self.cfg.timeout.as_secs()
            )),
        );

        self.ensure_model().await?;

        let token = self.state.token();
        let mut cycle: u64 = 0;
        loop {
            if token.is_cancelled() {
                return Err(RuntimeError::Interrupted);
            }
            cycle += 1;

            self.bus.publish(
                Event::now(EventKind::CycleStarting)
                    .with_cycle(cycle)
                    .with_reason(self.cfg.backend.as_str())
                    .with_timeout(self.cfg.timeout),
            );

            let started = Instant::now();
            let class = self.run_engine(cycle).await;
            let record = CycleRecord::new(cycle, class, started.elapsed());

            let mut finished = Event::now(EventKind::CycleFinished)
                .with_cycle(record.cycle)
                .with_class(record.class)
                .with_duration(record.duration);
            if let Some(code) = record.code() {
                finished = finished.with_code(code);
            }
            self.bus.publish(finished);

            if self.cfg.analysis {
                self.analyze_and_refresh(cycle).await;
            }

            tokio::select! {
                _ = time::sleep(self.cfg.pause) => {}
                _ = token.cancelled() => return Err(RuntimeError::Interrupted),
            }
        }
    }

    /// Forwards bus events to the subscriber fan-out (fire-and-forget).
    fn subscriber_listener(&self) {
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    /// Generates the model file if it does not exist yet.
    ///
    /// Idempotent across restarts: a present file skips the generator
    /// entirely. A generation failure is fatal to the supervisor.
    async fn ensure_model(&self) -> Result<(), RuntimeError> {
        let model = self.cfg.model_file();
        if model.exists() {
            return Ok(());
        }

        self.bus.publish(
            Event::now(EventKind::ModelGenerating).with_path(model.display().to_string()),
        );
        match self
            .model
            .generate(&self.cfg.param_set, self.cfg.stim_delay_ms)
            .await
        {
            Ok(path) => {
                self.bus.publish(
                    Event::now(EventKind::ModelGenerated).with_path(path.display().to_string()),
                );
                Ok(())
            }
            Err(e) => Err(RuntimeError::Startup {
                error: e.to_string(),
            }),
        }
    }

    async fn run_engine(&self, cycle: u64) -> ExitClass {
        match self.cfg.backend {
            Backend::Jnml => self.run_jnml(cycle).await,
            Backend::Neuron => self.run_neuron(cycle).await,
        }
    }

    async fn run_jnml(&self, cycle: u64) -> ExitClass {
        let model = self.cfg.model_file();
        self.launch_and_supervise(cycle, "pynml", &[model.as_os_str()])
            .await
    }

    async fn run_neuron(&self, cycle: u64) -> ExitClass {
        let model = self.cfg.model_file();

        // Code generation must succeed before there is anything to run.
        if let Err(reason) = self
            .run_checked("pynml", &[model.as_os_str(), OsStr::new("-neuron")])
            .await
        {
            return self.launch_failed(cycle, reason);
        }

        // Compile membrane mechanisms when present; best-effort.
        if has_mod_files(&self.cfg) {
            let _ = self.run_checked("nrnivmodl", &[]).await;
        }

        let nrn = self.cfg.nrn_script();
        if !nrn.exists() {
            return self.launch_failed(
                cycle,
                format!("generated NEURON script not found: {}", nrn.display()),
            );
        }

        self.launch_and_supervise(cycle, "nrniv", &[OsStr::new("-python"), nrn.as_os_str()])
            .await
    }

    /// Spawns the engine command and hands it to the escalator.
    async fn launch_and_supervise(
        &self,
        cycle: u64,
        program: &str,
        args: &[&OsStr],
    ) -> ExitClass {
        match spawn_group(program, args.iter().copied(), &self.cfg.work_dir) {
            Ok(handle) => {
                self.bus.publish(
                    Event::now(EventKind::EngineSpawned)
                        .with_cycle(cycle)
                        .with_pid(handle.pid())
                        .with_reason(render_cmdline(program, args)),
                );
                supervise(
                    handle,
                    self.cfg.timeout,
                    self.cfg.grace,
                    &self.state,
                    &self.bus,
                    cycle,
                )
                .await
            }
            Err(CycleError::Launch { source }) => self.launch_failed(cycle, source.to_string()),
        }
    }

    fn launch_failed(&self, cycle: u64, reason: String) -> ExitClass {
        self.bus.publish(
            Event::now(EventKind::LaunchFailed)
                .with_cycle(cycle)
                .with_reason(reason),
        );
        ExitClass::LaunchFailed
    }

    /// Runs a preparatory command to completion with inherited stdio.
    async fn run_checked(&self, program: &str, args: &[&OsStr]) -> Result<(), String> {
        let status = tokio::process::Command::new(program)
            .args(args)
            .current_dir(&self.cfg.work_dir)
            .status()
            .await
            .map_err(|e| format!("{program}: {e}"))?;
        if status.success() {
            Ok(())
        } else {
            Err(format!(
                "{program} exited with code {}",
                status.code().unwrap_or(-1)
            ))
        }
    }

    /// Analysis + display step; failures never leave this function.
    async fn analyze_and_refresh(&mut self, cycle: u64) {
        let log = self.cfg.activity_log();
        let non_empty = std::fs::metadata(&log).map(|m| m.len() > 0).unwrap_or(false);
        if !non_empty {
            return;
        }

        match self
            .analyzer
            .analyze(&log, self.cfg.stim_delay_ms, &self.cfg.model_file())
            .await
        {
            Ok(image) => {
                self.bus.publish(
                    Event::now(EventKind::AnalysisCompleted)
                        .with_cycle(cycle)
                        .with_path(image.display().to_string()),
                );
                if self.cfg.gui {
                    self.display.refresh(&image);
                    if self.cfg.raise_on_update {
                        self.display.raise();
                    }
                    self.bus.publish(
                        Event::now(EventKind::DisplayRefreshed)
                            .with_path(image.display().to_string()),
                    );
                }
            }
            Err(e) => {
                self.bus.publish(
                    Event::now(EventKind::AnalysisFailed)
                        .with_cycle(cycle)
                        .with_reason(e.to_string()),
                );
            }
        }
    }
}

fn render_cmdline(program: &str, args: &[&OsStr]) -> String {
    let mut line = String::from(program);
    for arg in args {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    line
}

fn has_mod_files(cfg: &RunConfig) -> bool {
    std::fs::read_dir(&cfg.work_dir)
        .map(|entries| {
            entries
                .flatten()
                .any(|e| e.path().extension().is_some_and(|ext| ext == "mod"))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::NoopDisplay;
    use crate::error::CollabError;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FakeModel {
        calls: Arc<AtomicUsize>,
        produces: Option<PathBuf>,
    }

    #[async_trait]
    impl ModelSource for FakeModel {
        async fn generate(&self, _set: &str, _delay: u64) -> Result<PathBuf, CollabError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.produces {
                Some(path) => {
                    std::fs::write(path, "<model/>").expect("write model");
                    Ok(path.clone())
                }
                None => Err(CollabError::Status { code: 1 }),
            }
        }
    }

    struct FailingAnalyzer;

    #[async_trait]
    impl Analyzer for FailingAnalyzer {
        async fn analyze(
            &self,
            _log: &Path,
            _delay: u64,
            _model: &Path,
        ) -> Result<PathBuf, CollabError> {
            Err(CollabError::Status { code: 2 })
        }
    }

    struct CountingDisplay {
        refreshes: Arc<AtomicUsize>,
    }

    impl Display for CountingDisplay {
        fn refresh(&mut self, _image: &Path) {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
        }
        fn raise(&mut self) {}
    }

    fn controller_in(
        dir: &Path,
        model: Box<dyn ModelSource>,
        analyzer: Box<dyn Analyzer>,
        display: Box<dyn Display>,
    ) -> Controller {
        let cfg = RunConfig {
            work_dir: dir.to_path_buf(),
            timeout: Duration::from_millis(200),
            grace: Duration::from_millis(100),
            pause: Duration::from_millis(10),
            analysis: true,
            gui: true,
            ..RunConfig::default()
        };
        Controller::new(cfg, Vec::new(), model, analyzer, display)
    }

    #[tokio::test]
    async fn present_model_skips_the_generator() {
        let dir = tempfile::tempdir().expect("tempdir");
        let calls = Arc::new(AtomicUsize::new(0));
        let controller = controller_in(
            dir.path(),
            Box::new(FakeModel {
                calls: calls.clone(),
                produces: None,
            }),
            Box::new(FailingAnalyzer),
            Box::new(NoopDisplay),
        );

        std::fs::write(controller.cfg.model_file(), "<model/>").expect("seed model");
        controller.ensure_model().await.expect("model present");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_model_is_generated_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let calls = Arc::new(AtomicUsize::new(0));
        let model_path = dir.path().join("LEMS_sim_A.xml");
        let controller = controller_in(
            dir.path(),
            Box::new(FakeModel {
                calls: calls.clone(),
                produces: Some(model_path.clone()),
            }),
            Box::new(FailingAnalyzer),
            Box::new(NoopDisplay),
        );

        controller.ensure_model().await.expect("generated");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(model_path.exists());
    }

    #[tokio::test]
    async fn generation_failure_is_fatal_at_startup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let controller = controller_in(
            dir.path(),
            Box::new(FakeModel {
                calls: Arc::new(AtomicUsize::new(0)),
                produces: None,
            }),
            Box::new(FailingAnalyzer),
            Box::new(NoopDisplay),
        );

        match controller.ensure_model().await {
            Err(RuntimeError::Startup { error }) => {
                assert!(error.contains("exited with code 1"));
            }
            other => panic!("expected startup failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn analysis_failure_skips_the_display_refresh() {
        let dir = tempfile::tempdir().expect("tempdir");
        let refreshes = Arc::new(AtomicUsize::new(0));
        let mut controller = controller_in(
            dir.path(),
            Box::new(FakeModel {
                calls: Arc::new(AtomicUsize::new(0)),
                produces: None,
            }),
            Box::new(FailingAnalyzer),
            Box::new(CountingDisplay {
                refreshes: refreshes.clone(),
            }),
        );

        std::fs::write(controller.cfg.activity_log(), "0.0 1.0\n").expect("seed log");
        let mut rx = controller.bus().subscribe();

        controller.analyze_and_refresh(1).await;

        assert_eq!(refreshes.load(Ordering::SeqCst), 0);
        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        assert_eq!(kinds, vec![EventKind::AnalysisFailed]);
    }

    #[tokio::test]
    async fn empty_activity_log_skips_analysis_entirely() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut controller = controller_in(
            dir.path(),
            Box::new(FakeModel {
                calls: Arc::new(AtomicUsize::new(0)),
                produces: None,
            }),
            Box::new(FailingAnalyzer),
            Box::new(NoopDisplay),
        );

        std::fs::write(controller.cfg.activity_log(), "").expect("seed empty log");
        let mut rx = controller.bus().subscribe();

        controller.analyze_and_refresh(1).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn loop_survives_launch_failures_until_interrupted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut controller = controller_in(
            dir.path(),
            Box::new(FakeModel {
                calls: Arc::new(AtomicUsize::new(0)),
                produces: None,
            }),
            Box::new(FailingAnalyzer),
            Box::new(NoopDisplay),
        );
        // The engine command is absent in the scratch dir, so every cycle
        // fails to launch; the loop must keep going regardless.
        std::fs::write(controller.cfg.model_file(), "<model/>").expect("seed model");

        let state = controller.state();
        let mut rx = controller.bus().subscribe();

        let worker = tokio::spawn(async move { controller.run().await });
        time::sleep(Duration::from_millis(150)).await;
        state.request_interrupt();

        let res = worker.await.expect("join");
        assert!(matches!(res, Err(RuntimeError::Interrupted)));

        let mut starts = 0;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::CycleStarting {
                starts += 1;
            }
        }
        assert!(starts >= 2, "expected several cycles, saw {starts}");
    }
}
