pub mod config;
pub mod executor;

pub use config::Language;
pub use executor::{ExecutionRequest, ExecutionResult, execute};
