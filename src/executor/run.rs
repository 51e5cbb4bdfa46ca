use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use super::limits::ResourceLimits;

/// What the run step launches: an interpreter pointed at the source file,
/// or a compiled artifact invoked directly.
#[derive(Debug, Clone, Copy)]
pub enum ExecutableSpec<'a> {
    Interpreter {
        interpreter: &'static str,
        source_path: &'a Path,
    },
    Artifact { artifact_path: &'a Path },
}

impl ExecutableSpec<'_> {
    fn command(&self) -> Command {
        match self {
            ExecutableSpec::Interpreter {
                interpreter,
                source_path,
            } => {
                let mut cmd = Command::new(interpreter);
                cmd.arg(source_path);
                cmd
            }
            ExecutableSpec::Artifact { artifact_path } => Command::new(artifact_path),
        }
    }
}

/// Outcome of running the program: both streams captured to completion and
/// the exit code, `None` when the process died to a signal or was killed
/// at the wall-clock deadline.
#[derive(Debug)]
pub struct RunOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl RunOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Spawns the program with resource limits applied and captures its output.
///
/// `stdin` is piped to the child when present; otherwise the child reads
/// EOF. The stdin write happens inside the timed section, so a child that
/// never consumes its input is still reaped at the deadline. The wall-clock
/// timeout is independent of the CPU rlimit: a sleeping process burns no
/// CPU but is killed here all the same.
pub async fn run(
    executable: ExecutableSpec<'_>,
    stdin: Option<&str>,
    wall_timeout: Duration,
    limits: ResourceLimits,
) -> Result<RunOutcome> {
    let mut cmd = executable.command();
    cmd.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true);
    limits.apply_to(&mut cmd);

    let mut child = cmd.spawn().context("failed to spawn child process")?;

    let input = stdin.map(str::to_owned);
    let mut stdin_handle = child.stdin.take();
    let wait = async move {
        if let (Some(input), Some(mut handle)) = (input, stdin_handle.take()) {
            // EPIPE from a child that exited early is not a pipeline fault.
            let _ = handle.write_all(input.as_bytes()).await;
            let _ = handle.shutdown().await;
        }
        child.wait_with_output().await
    };

    match timeout(wall_timeout, wait).await {
        Ok(output) => {
            let output = output.context("failed to wait for child process")?;
            let mut stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            if stderr.is_empty() {
                // Resource-limit kills usually leave no diagnostics behind.
                if let Some(signal) = output.status.signal() {
                    stderr = format!("process terminated by signal {signal}");
                }
            }
            Ok(RunOutcome {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr,
                exit_code: output.status.code(),
            })
        }
        Err(_) => {
            // The dropped future kills the child via kill_on_drop.
            log::info!(
                "child process killed after exceeding the {}s wall-clock limit",
                wall_timeout.as_secs()
            );
            Ok(RunOutcome {
                stdout: String::new(),
                stderr: format!(
                    "process timed out after {} seconds",
                    wall_timeout.as_secs()
                ),
                exit_code: None,
            })
        }
    }
}
