mod compile;
mod limits;
mod output;
mod run;
mod workspace;

pub use compile::CompileOutcome;
pub use limits::ResourceLimits;
pub use output::truncate_output;
pub use run::{ExecutableSpec, RunOutcome};
pub use workspace::Workspace;

use serde::{Deserialize, Serialize};

use crate::config::{Language, Toolchain};

/// A submission as delivered by the routing collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionRequest {
    pub language: String,
    pub code: String,
    pub stdin: Option<String>,
}

/// The uniform answer shape: sanitized streams plus a success flag.
///
/// `success` is true iff the final process of the pipeline (the run step,
/// or the compile step if it failed first) exited with status zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub output: String,
    pub error: String,
    pub success: bool,
}

impl ExecutionResult {
    fn failure(error: String) -> Self {
        Self {
            output: String::new(),
            error,
            success: false,
        }
    }
}

/// Executes a submission end to end. The single public entry point.
///
/// The language identifier is parsed against the closed [`Language`] set;
/// unknown identifiers short-circuit with an error result before any
/// workspace or process is created. Every failure mode, including internal
/// faults, comes back as an [`ExecutionResult`] rather than an error.
pub async fn execute(language: &str, code: &str, stdin: Option<&str>) -> ExecutionResult {
    match language.parse::<Language>() {
        Ok(language) => execute_submission(language, code, stdin).await,
        Err(unsupported) => {
            log::info!("Rejected submission: {unsupported}");
            ExecutionResult::failure(unsupported.to_string())
        }
    }
}

/// Runs the typed pipeline for an already-validated language.
pub async fn execute_submission(
    language: Language,
    code: &str,
    stdin: Option<&str>,
) -> ExecutionResult {
    match run_pipeline(language, code, stdin).await {
        Ok(result) => result,
        Err(e) => {
            log::error!("Execution pipeline failed for {language}: {e:#}");
            ExecutionResult::failure(format!("internal error: {e:#}"))
        }
    }
}

/// Workspace -> [compile ->] run -> sanitize.
///
/// The workspace guard is held across every step, so its files are removed
/// on each return path below, including the `?` ones.
async fn run_pipeline(
    language: Language,
    code: &str,
    stdin: Option<&str>,
) -> anyhow::Result<ExecutionResult> {
    let workspace = Workspace::create(language, code)?;

    let executable = match language.toolchain() {
        Toolchain::Interpreted { interpreter } => ExecutableSpec::Interpreter {
            interpreter,
            source_path: workspace.source_path(),
        },
        Toolchain::Compiled { .. } => {
            let artifact_path = workspace
                .artifact_path()
                .expect("compiled language workspace always has an artifact path");

            let compiled = compile::compile(language, workspace.source_path(), artifact_path).await?;
            if !compiled.ok {
                // A failed or timed-out compile never reaches the run step.
                return Ok(ExecutionResult::failure(truncate_output(&compiled.stderr)));
            }
            ExecutableSpec::Artifact { artifact_path }
        }
    };

    let outcome = run::run(
        executable,
        stdin,
        language.run_timeout(),
        ResourceLimits::default(),
    )
    .await?;

    Ok(ExecutionResult {
        output: truncate_output(&outcome.stdout),
        error: truncate_output(&outcome.stderr),
        success: outcome.success(),
    })
}
