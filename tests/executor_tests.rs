use std::path::Path;

use assert_json_diff::assert_json_eq;
use pretty_assertions::assert_eq;
use serde_json::json;

use codexec::executor::{ExecutionRequest, execute};

/// Mirrors the runner-selection probe: skip toolchain-dependent tests on
/// hosts that do not carry the interpreter or compiler.
fn has_command(cmd: &str) -> bool {
    std::process::Command::new("which")
        .arg(cmd)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[tokio::test]
async fn test_python_hello() {
    if !has_command("python3") {
        eprintln!("skipping: python3 not found in PATH");
        return;
    }

    let result = execute("python", "print('hi')", None).await;
    assert_json_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({ "output": "hi\n", "error": "", "success": true })
    );
}

#[tokio::test]
async fn test_python_reads_stdin() {
    if !has_command("python3") {
        eprintln!("skipping: python3 not found in PATH");
        return;
    }

    let result = execute("python", "print(input())", Some("hello")).await;
    assert_eq!(result.output, "hello\n");
    assert!(result.success);
}

#[tokio::test]
async fn test_javascript_echoes_stdin() {
    if !has_command("node") {
        eprintln!("skipping: node not found in PATH");
        return;
    }

    let code = "console.log(require('fs').readFileSync(0,'utf8'))";
    let result = execute("javascript", code, Some("hello")).await;
    assert_eq!(result.output, "hello\n");
    assert_eq!(result.error, "");
    assert!(result.success);
}

#[tokio::test]
async fn test_c_nonzero_exit_is_failure() {
    if !has_command("gcc") {
        eprintln!("skipping: gcc not found in PATH");
        return;
    }

    let result = execute("c", "int main(){return 1;}", None).await;
    assert_json_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({ "output": "", "error": "", "success": false })
    );
}

#[tokio::test]
async fn test_cpp_compile_error_skips_run() {
    if !has_command("g++") {
        eprintln!("skipping: g++ not found in PATH");
        return;
    }

    let result = execute("cpp", "int main(){ syntax error", None).await;
    assert_eq!(result.output, "");
    assert!(!result.success);
    assert!(
        result.error.contains("error"),
        "expected a compiler diagnostic, got: {}",
        result.error
    );
}

#[tokio::test]
async fn test_unsupported_language() {
    let result = execute("go", "package main", None).await;
    assert_json_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "output": "",
            "error": "Unsupported language: go",
            "success": false
        })
    );
}

#[tokio::test]
async fn test_source_file_removed_after_run() {
    if !has_command("python3") {
        eprintln!("skipping: python3 not found in PATH");
        return;
    }

    // The script prints its own path, so the test can check it afterwards.
    let result = execute("python", "print(__file__)", None).await;
    assert!(result.success);
    let source_path = result.output.trim();
    assert!(!source_path.is_empty());
    assert!(
        !Path::new(source_path).exists(),
        "source file {source_path} survived the pipeline"
    );
}

#[tokio::test]
async fn test_artifact_removed_after_run() {
    if !has_command("gcc") {
        eprintln!("skipping: gcc not found in PATH");
        return;
    }

    let code = r#"
#include <stdio.h>
int main(int argc, char **argv) { (void)argc; puts(argv[0]); return 0; }
"#;
    let result = execute("c", code, None).await;
    assert!(result.success, "run failed: {}", result.error);
    let artifact_path = result.output.trim();
    assert!(artifact_path.ends_with(".out"));
    assert!(
        !Path::new(artifact_path).exists(),
        "artifact {artifact_path} survived the pipeline"
    );
}

#[tokio::test]
async fn test_cpu_spinner_is_killed() {
    if !has_command("python3") {
        eprintln!("skipping: python3 not found in PATH");
        return;
    }

    let started = std::time::Instant::now();
    let result = execute("python", "while True: pass", None).await;
    assert!(!result.success);
    // The 2s CPU rlimit fires long before the 25s wall-clock deadline.
    assert!(
        started.elapsed() < std::time::Duration::from_secs(20),
        "spinner outlived the CPU limit: {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn test_sleeper_hits_wall_clock_timeout() {
    if !has_command("python3") {
        eprintln!("skipping: python3 not found in PATH");
        return;
    }

    // Sleeping burns no CPU, so only the wall-clock deadline can stop it.
    let started = std::time::Instant::now();
    let result = execute("python", "import time\ntime.sleep(600)", None).await;
    assert!(!result.success);
    assert!(result.error.contains("timed out"), "error: {}", result.error);
    assert!(
        started.elapsed() < std::time::Duration::from_secs(30),
        "sleeper outlived the wall-clock deadline: {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn test_overallocation_is_contained() {
    if !has_command("python3") {
        eprintln!("skipping: python3 not found in PATH");
        return;
    }

    let code = "x = bytearray(512 * 1024 * 1024)\nprint('allocated')";
    let result = execute("python", code, None).await;
    assert!(!result.success);
    assert_eq!(result.output, "");
}

#[tokio::test]
async fn test_large_output_is_truncated() {
    if !has_command("python3") {
        eprintln!("skipping: python3 not found in PATH");
        return;
    }

    // 20_000 chars plus the trailing newline: 10_001 get dropped.
    let result = execute("python", "print('a' * 20000)", None).await;
    assert!(result.success);
    let expected = format!(
        "{}\n... (truncated, 10001 more characters)",
        "a".repeat(10_000)
    );
    assert_eq!(result.output, expected);
}

#[test]
fn test_request_shape_deserializes() {
    let request: ExecutionRequest = serde_json::from_str(
        r#"{ "language": "python", "code": "print('hi')", "stdin": "x" }"#,
    )
    .unwrap();
    assert_eq!(request.language, "python");
    assert_eq!(request.stdin.as_deref(), Some("x"));

    // stdin is optional on the wire.
    let request: ExecutionRequest =
        serde_json::from_str(r#"{ "language": "c", "code": "int main(){}" }"#).unwrap();
    assert!(request.stdin.is_none());
}
