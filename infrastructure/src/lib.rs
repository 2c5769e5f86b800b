//! Infrastructure layer for toolgate
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the tool executor, builtin tools,
//! configuration file loading and the JSONL dispatch log.

pub mod config;
pub mod logging;
pub mod tools;

// Re-export commonly used types
pub use config::{ConfigError, ConfigLoader, FileConfig, FileExecutorConfig, FileGuardConfig, FileLoggingConfig};
pub use logging::JsonlDispatchLogger;
pub use tools::{JsonSchemaToolConverter, ReadFileTool, ToolExecutor, WriteFileTool, builtin_tools};
