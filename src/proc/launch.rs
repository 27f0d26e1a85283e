//! Launch the engine in its own process group.
//!
//! [`spawn_group`] starts an external command with `setpgid(0, 0)` applied
//! between `fork` and `exec`, making the child the leader of a fresh process
//! group. Signals addressed to that group reach the child and all of its
//! descendants, never the supervisor.
//!
//! Standard output and error are piped and drained concurrently (one task per
//! pipe) so a chatty engine can never dead-lock on a full pipe; the captured
//! bytes are echoed by the escalator once the run is over.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;

use nix::unistd::Pid;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use crate::error::CycleError;

/// One in-flight engine process.
///
/// Owned exclusively by the escalator for the duration of one run; at most
/// one handle is live at any time.
pub struct ProcessHandle {
    child: Child,
    pid: u32,
    pgid: Pid,
    stdout: JoinHandle<Vec<u8>>,
    stderr: JoinHandle<Vec<u8>>,
}

impl ProcessHandle {
    /// Process id of the direct child.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Process group id (equal to the child's pid, it leads the group).
    pub fn pgid(&self) -> Pid {
        self.pgid
    }

    /// Waits for the child to exit.
    ///
    /// Cancel safe; may be awaited again after a dropped wait future.
    pub async fn wait(&mut self) -> std::io::Result<std::process::ExitStatus> {
        self.child.wait().await
    }

    /// Consumes the handle, returning the fully drained (stdout, stderr).
    ///
    /// Call only after the child has exited; both pipes will be at EOF.
    pub async fn drain_output(self) -> (Vec<u8>, Vec<u8>) {
        let out = self.stdout.await.unwrap_or_default();
        let err = self.stderr.await.unwrap_or_default();
        (out, err)
    }
}

/// Spawns `program` with `args` in `cwd`, as the leader of a new process group.
///
/// Returns immediately with a [`ProcessHandle`]; completion is the
/// escalator's business. A spawn failure is cycle-fatal but never
/// supervisor-fatal.
pub fn spawn_group(
    program: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
    cwd: &Path,
) -> Result<ProcessHandle, CycleError> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    // Runs in the child between fork and exec: become our own group leader.
    unsafe {
        cmd.pre_exec(|| {
            if libc::setpgid(0, 0) == 0 {
                Ok(())
            } else {
                Err(std::io::Error::last_os_error())
            }
        });
    }

    let mut child = cmd.spawn().map_err(|source| CycleError::Launch { source })?;
    let pid = child.id().ok_or_else(|| CycleError::Launch {
        source: std::io::Error::other("child exited before its pid could be read"),
    })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    Ok(ProcessHandle {
        child,
        pid,
        pgid: Pid::from_raw(pid as i32),
        stdout,
        stderr,
    })
}

/// Reads a pipe to EOF on its own task, so the child never blocks on output.
fn drain(
    stream: Option<impl tokio::io::AsyncRead + Unpin + Send + 'static>,
) -> JoinHandle<Vec<u8>> {
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buf).await;
        }
        buf
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn spawn_captures_output_and_group() {
        let mut handle = spawn_group("sh", ["-c", "echo out; echo err >&2"], &PathBuf::from("."))
            .expect("spawn sh");
        assert_eq!(handle.pgid().as_raw(), handle.pid() as i32);

        let status = handle.wait().await.expect("wait");
        assert_eq!(status.code(), Some(0));

        let (out, err) = handle.drain_output().await;
        assert_eq!(out, b"out\n");
        assert_eq!(err, b"err\n");
    }

    #[tokio::test]
    async fn missing_binary_is_a_launch_failure() {
        let res = spawn_group(
            "definitely-not-a-real-binary-7f3a",
            Vec::<String>::new(),
            &PathBuf::from("."),
        );
        match res {
            Err(CycleError::Launch { source }) => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            Ok(_) => panic!("expected a launch failure"),
        }
    }
}
