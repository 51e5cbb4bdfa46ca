use std::io::Read;

use clap::Parser;

use codexec::config::CliArgs;
use codexec::executor::{ExecutionRequest, execute};

/// Development harness standing in for the routing collaborator: reads one
/// execution request as JSON, runs it, prints the result as JSON.
#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = CliArgs::parse();

    let raw = match &cli.request_path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let request: ExecutionRequest = serde_json::from_str(&raw).map_err(std::io::Error::other)?;
    log::info!("Executing {} submission ({} bytes)", request.language, request.code.len());

    let result = execute(&request.language, &request.code, request.stdin.as_deref()).await;

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    }
    .map_err(std::io::Error::other)?;
    println!("{rendered}");

    Ok(())
}
