//! Model-generation collaborator.
//!
//! [`ModelSource::generate`] must leave the model file at the deterministic
//! path the configuration derives ([`RunConfig::model_file`]); the controller
//! invokes it once at startup, and only when that file is missing. A failure
//! here is fatal to the whole supervisor.
//!
//! [`RunConfig::model_file`]: crate::RunConfig::model_file

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::RunConfig;
use crate::error::CollabError;

/// Produces the model file the engine consumes.
#[async_trait]
pub trait ModelSource: Send + Sync {
    /// Generates the model for `param_set` with the given stimulus delay and
    /// returns the path of the produced file.
    async fn generate(&self, param_set: &str, stim_delay_ms: u64)
        -> Result<PathBuf, CollabError>;
}

/// Script-backed model source: `<python> <script> <param_set> <delay_ms>`.
///
/// The script inherits the supervisor's stdio, runs to completion, and must
/// leave the model file at the configured path.
pub struct ScriptModelSource {
    python: String,
    script: PathBuf,
    work_dir: PathBuf,
    model_file: PathBuf,
}

impl ScriptModelSource {
    pub fn from_config(cfg: &RunConfig) -> Self {
        Self {
            python: cfg.python.clone(),
            script: cfg.generator.clone(),
            work_dir: cfg.work_dir.clone(),
            model_file: cfg.model_file(),
        }
    }
}

#[async_trait]
impl ModelSource for ScriptModelSource {
    async fn generate(
        &self,
        param_set: &str,
        stim_delay_ms: u64,
    ) -> Result<PathBuf, CollabError> {
        let status = Command::new(&self.python)
            .arg(&self.script)
            .arg(param_set)
            .arg(stim_delay_ms.to_string())
            .current_dir(&self.work_dir)
            .status()
            .await
            .map_err(|source| CollabError::Spawn { source })?;

        if !status.success() {
            return Err(CollabError::Status {
                code: status.code().unwrap_or(-1),
            });
        }
        if !self.model_file.exists() {
            return Err(CollabError::MissingArtifact {
                path: self.model_file.clone(),
            });
        }
        Ok(self.model_file.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn source_in(dir: &std::path::Path, script_body: &str) -> ScriptModelSource {
        let script = dir.join("gen.sh");
        fs::write(&script, script_body).expect("write script");
        ScriptModelSource {
            python: "sh".into(),
            script,
            work_dir: dir.to_path_buf(),
            model_file: dir.join("LEMS_sim_A.xml"),
        }
    }

    #[tokio::test]
    async fn successful_generation_returns_model_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = source_in(dir.path(), "touch LEMS_sim_A.xml\n");

        let path = src.generate("A", 2000).await.expect("generate");
        assert_eq!(path, dir.path().join("LEMS_sim_A.xml"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn failing_script_reports_exit_code() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = source_in(dir.path(), "exit 3\n");

        match src.generate("A", 2000).await {
            Err(CollabError::Status { code }) => assert_eq!(code, 3),
            other => panic!("expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn silent_script_reports_missing_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = source_in(dir.path(), "true\n");

        match src.generate("A", 2000).await {
            Err(CollabError::MissingArtifact { path }) => {
                assert_eq!(path, dir.path().join("LEMS_sim_A.xml"));
            }
            other => panic!("expected MissingArtifact, got {other:?}"),
        }
    }
}
