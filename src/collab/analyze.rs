//! Analysis collaborator.
//!
//! Turns the engine's tabular activity log into an image artifact:
//! `<python> <script> <activity_log> <delay_ms> <model_file>`. Invoked
//! synchronously after a cycle; a failure is logged by the controller and the
//! display simply does not refresh.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::RunConfig;
use crate::error::CollabError;

/// Produces an image artifact from an activity log.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Analyzes `activity_log` and returns the path of the produced image.
    async fn analyze(
        &self,
        activity_log: &Path,
        stim_delay_ms: u64,
        model_file: &Path,
    ) -> Result<PathBuf, CollabError>;
}

/// Script-backed analyzer, inheriting the supervisor's stdio.
pub struct ScriptAnalyzer {
    python: String,
    script: PathBuf,
    work_dir: PathBuf,
    image: PathBuf,
}

impl ScriptAnalyzer {
    pub fn from_config(cfg: &RunConfig) -> Self {
        Self {
            python: cfg.python.clone(),
            script: cfg.analyzer.clone(),
            work_dir: cfg.work_dir.clone(),
            image: cfg.analysis_image(),
        }
    }
}

#[async_trait]
impl Analyzer for ScriptAnalyzer {
    async fn analyze(
        &self,
        activity_log: &Path,
        stim_delay_ms: u64,
        model_file: &Path,
    ) -> Result<PathBuf, CollabError> {
        let status = Command::new(&self.python)
            .arg(&self.script)
            .arg(activity_log)
            .arg(stim_delay_ms.to_string())
            .arg(model_file)
            .current_dir(&self.work_dir)
            .status()
            .await
            .map_err(|source| CollabError::Spawn { source })?;

        if !status.success() {
            return Err(CollabError::Status {
                code: status.code().unwrap_or(-1),
            });
        }
        if !self.image.exists() {
            return Err(CollabError::MissingArtifact {
                path: self.image.clone(),
            });
        }
        Ok(self.image.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn produces_image_path_on_success() {
        let dir = tempfile::tempdir().expect("tempdir");
        let script = dir.path().join("analyze.sh");
        fs::write(&script, "touch activity_analysis.png\n").expect("write script");

        let analyzer = ScriptAnalyzer {
            python: "sh".into(),
            script,
            work_dir: dir.path().to_path_buf(),
            image: dir.path().join("activity_analysis.png"),
        };

        let image = analyzer
            .analyze(&dir.path().join("sim_A.dat"), 2000, &dir.path().join("m.xml"))
            .await
            .expect("analyze");
        assert!(image.exists());
    }

    #[tokio::test]
    async fn non_zero_exit_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let script = dir.path().join("analyze.sh");
        fs::write(&script, "exit 2\n").expect("write script");

        let analyzer = ScriptAnalyzer {
            python: "sh".into(),
            script,
            work_dir: dir.path().to_path_buf(),
            image: dir.path().join("activity_analysis.png"),
        };

        let res = analyzer
            .analyze(&dir.path().join("sim_A.dat"), 2000, &dir.path().join("m.xml"))
            .await;
        assert!(matches!(res, Err(CollabError::Status { code: 2 })));
    }
}
