use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use chrono::Local;

use crate::config::Language;

// Distinguishes workspaces created in the same second by the same process.
static WORKSPACE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Scoped temporary files for a single execution.
///
/// A workspace owns a uniquely named source file and, for compiled
/// languages, the path the artifact will be written to. It is never shared
/// between executions. Removal happens in `Drop`, so every exit path of the
/// pipeline (success, compile failure, timeout, internal error) releases
/// the files exactly once; removal errors are logged and swallowed.
#[derive(Debug)]
pub struct Workspace {
    source_path: PathBuf,
    artifact_path: Option<PathBuf>,
}

impl Workspace {
    /// Writes `code` verbatim to a fresh temp file named after `language`.
    pub fn create(language: Language, code: &str) -> Result<Self> {
        let seq = WORKSPACE_SEQ.fetch_add(1, Ordering::Relaxed);
        let name = format!(
            "submission-{}-{}-{}.{}",
            Local::now().format("%y%m%d-%H%M%S"),
            std::process::id(),
            seq,
            language.extension()
        );
        let source_path = std::env::temp_dir().join(name);

        fs::write(&source_path, code)
            .with_context(|| format!("failed to write source file {}", source_path.display()))?;
        log::debug!("Workspace created at {}", source_path.display());

        let artifact_path = language
            .is_compiled()
            .then(|| artifact_path_for(&source_path));

        Ok(Self {
            source_path,
            artifact_path,
        })
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Where the compiled binary goes; `None` for interpreted languages.
    pub fn artifact_path(&self) -> Option<&Path> {
        self.artifact_path.as_deref()
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        remove_if_present(&self.source_path);
        if let Some(artifact) = &self.artifact_path {
            remove_if_present(artifact);
        }
    }
}

/// The artifact sits next to the source with an `.out` suffix appended.
fn artifact_path_for(source_path: &Path) -> PathBuf {
    let mut name = source_path.as_os_str().to_os_string();
    name.push(".out");
    PathBuf::from(name)
}

fn remove_if_present(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => log::debug!("Removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove {}: {e}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_writes_source_verbatim() {
        let code = "print('hi')\n";
        let workspace = Workspace::create(Language::Python, code).unwrap();
        assert!(workspace.source_path().exists());
        assert_eq!(
            workspace.source_path().extension().unwrap().to_str(),
            Some("py")
        );
        assert_eq!(fs::read_to_string(workspace.source_path()).unwrap(), code);
        assert!(workspace.artifact_path().is_none());
    }

    #[test]
    fn test_compiled_language_records_artifact_path() {
        let workspace = Workspace::create(Language::C, "int main(){}").unwrap();
        let artifact = workspace.artifact_path().unwrap();
        let expected = format!("{}.out", workspace.source_path().display());
        assert_eq!(artifact.display().to_string(), expected);
    }

    #[test]
    fn test_drop_removes_files() {
        let workspace = Workspace::create(Language::Cpp, "int main(){}").unwrap();
        let source = workspace.source_path().to_path_buf();
        let artifact = workspace.artifact_path().unwrap().to_path_buf();
        fs::write(&artifact, b"fake binary").unwrap();

        drop(workspace);
        assert!(!source.exists());
        assert!(!artifact.exists());
    }

    #[test]
    fn test_concurrent_workspaces_are_distinct() {
        let a = Workspace::create(Language::Python, "a").unwrap();
        let b = Workspace::create(Language::Python, "b").unwrap();
        assert_ne!(a.source_path(), b.source_path());
    }
}
