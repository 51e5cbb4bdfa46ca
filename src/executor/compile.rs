use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::{COMPILE_TIMEOUT, Language, Toolchain};

/// Result of the compile step for compiled languages.
///
/// `ok` is false on a non-zero compiler exit or a compile timeout; in both
/// cases `stderr` carries the diagnostic text and the run step is skipped,
/// so a partial artifact is never executed.
#[derive(Debug)]
pub struct CompileOutcome {
    pub ok: bool,
    pub stderr: String,
}

/// Invokes the language's compiler against the workspace source.
///
/// The command line is fixed (`<compiler> <source> -O2 -o <artifact>`) so
/// builds are reproducible. The whole invocation is bounded by
/// [`COMPILE_TIMEOUT`]; on expiry the compiler process is killed and the
/// outcome reads as a failed compile.
pub async fn compile(
    language: Language,
    source_path: &Path,
    artifact_path: &Path,
) -> Result<CompileOutcome> {
    let Toolchain::Compiled { compiler } = language.toolchain() else {
        anyhow::bail!("language {language} has no compile step");
    };

    let mut cmd = Command::new(compiler);
    cmd.arg(source_path)
        .arg("-O2")
        .arg("-o")
        .arg(artifact_path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd
        .spawn()
        .with_context(|| format!("failed to spawn {compiler}"))?;

    match timeout(COMPILE_TIMEOUT, child.wait_with_output()).await {
        Ok(output) => {
            let output = output.with_context(|| format!("failed to wait for {compiler}"))?;
            if !output.status.success() {
                log::info!("{compiler} exited with {} on {}", output.status, source_path.display());
            }
            Ok(CompileOutcome {
                ok: output.status.success(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
        Err(_) => {
            log::warn!(
                "{compiler} timed out after {}s on {}",
                COMPILE_TIMEOUT.as_secs(),
                source_path.display()
            );
            Ok(CompileOutcome {
                ok: false,
                stderr: format!(
                    "compilation timed out after {} seconds",
                    COMPILE_TIMEOUT.as_secs()
                ),
            })
        }
    }
}
