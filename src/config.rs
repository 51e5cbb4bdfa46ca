use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// CPU time ceiling for every executed program, soft and hard.
pub const MAX_CPU_SECONDS: u64 = 2;

/// Address-space ceiling for every executed program.
pub const MAX_MEMORY_BYTES: u64 = 256 * 1024 * 1024;

/// Maximum number of characters kept per captured stream.
pub const MAX_OUTPUT_CHARS: usize = 10_000;

/// Wall-clock bound for a single toolchain invocation.
pub const COMPILE_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Parser)]
#[command(name = "codexec", version = "1.0", about, long_about = None)]
pub struct CliArgs {
    /// Path to an execution request JSON file; reads stdin when omitted
    #[arg(long = "request", short = 'r')]
    pub request_path: Option<String>,

    /// Pretty-print the result JSON
    #[arg(long = "pretty", short = 'p', default_value_t = false)]
    pub pretty: bool,
}

/// The closed set of supported languages.
///
/// Dispatch is keyed on this enum so a missing pipeline for a variant is a
/// compile error, not a runtime fallthrough. Identifiers outside this set
/// are rejected at the parsing boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Javascript,
    C,
    Cpp,
}

/// How a language's submissions are turned into a runnable process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toolchain {
    /// Run `interpreter <source-path>` directly.
    Interpreted { interpreter: &'static str },
    /// Compile with `compiler <source> -O2 -o <artifact>`, then run the artifact.
    Compiled { compiler: &'static str },
}

impl Language {
    /// File extension written to the workspace so tools recognize the source.
    pub fn extension(self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::Javascript => "js",
            Language::C => "c",
            Language::Cpp => "cpp",
        }
    }

    pub fn toolchain(self) -> Toolchain {
        match self {
            Language::Python => Toolchain::Interpreted {
                interpreter: "python3",
            },
            Language::Javascript => Toolchain::Interpreted { interpreter: "node" },
            Language::C => Toolchain::Compiled { compiler: "gcc" },
            Language::Cpp => Toolchain::Compiled { compiler: "g++" },
        }
    }

    /// Wall-clock bound for the run step, independent of the CPU limit.
    pub fn run_timeout(self) -> Duration {
        match self {
            Language::Python | Language::Javascript => Duration::from_secs(25),
            Language::C | Language::Cpp => Duration::from_secs(20),
        }
    }

    pub fn is_compiled(self) -> bool {
        matches!(self.toolchain(), Toolchain::Compiled { .. })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::Python => "python",
            Language::Javascript => "javascript",
            Language::C => "c",
            Language::Cpp => "cpp",
        };
        f.write_str(name)
    }
}

/// Error produced when a language identifier is outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedLanguage(pub String);

impl fmt::Display for UnsupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unsupported language: {}", self.0)
    }
}

impl std::error::Error for UnsupportedLanguage {}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "python" => Ok(Language::Python),
            "javascript" => Ok(Language::Javascript),
            "c" => Ok(Language::C),
            "cpp" => Ok(Language::Cpp),
            other => Err(UnsupportedLanguage(other.to_string())),
        }
    }
}
