//! File operation tools: read_file, write_file

use std::path::Path;
use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;
use toolgate_domain::tool::{
    core_tool::{CoreTool, ToolFailure, ToolOutput},
    entities::{ToolDefinition, ToolParameter},
};

/// Tool name constants
pub const READ_FILE: &str = "read_file";
pub const WRITE_FILE: &str = "write_file";

/// Maximum file size to read (10 MB)
const MAX_READ_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct ReadFileInput {
    pub path: String,
    /// Line number to start from (0-indexed)
    #[serde(default)]
    pub offset: Option<usize>,
    /// Maximum number of lines
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct WriteFileInput {
    pub path: String,
    pub content: String,
    #[serde(default)]
    pub create_dirs: bool,
}

/// Reads a text file, optionally a window of its lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadFileTool;

#[async_trait]
impl CoreTool for ReadFileTool {
    type Input = ReadFileInput;
    type Output = String;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(READ_FILE, "Read the contents of a file at the specified path")
            .with_parameter(
                ToolParameter::new("path", "Path to the file to read", true).with_type("path"),
            )
            .with_parameter(
                ToolParameter::new(
                    "offset",
                    "Line number to start reading from (0-indexed)",
                    false,
                )
                .with_type("integer"),
            )
            .with_parameter(
                ToolParameter::new("limit", "Maximum number of lines to read", false)
                    .with_type("integer"),
            )
    }

    fn check_input(&self, input: &ReadFileInput) -> Result<(), String> {
        if input.path.trim().is_empty() {
            return Err("'path' must not be empty".to_string());
        }
        Ok(())
    }

    async fn run(&self, input: ReadFileInput) -> Result<ToolOutput<String>, ToolFailure> {
        let start = Instant::now();
        let path = Path::new(&input.path);

        if !path.exists() {
            return Err(ToolFailure::new(format!("File not found: {}", input.path)));
        }
        if !path.is_file() {
            return Err(ToolFailure::new(format!("'{}' is not a file", input.path)));
        }

        let size = tokio::fs::metadata(path).await?.len();
        if size > MAX_READ_SIZE {
            return Err(ToolFailure::new(format!(
                "File too large ({} bytes). Maximum size is {} bytes",
                size, MAX_READ_SIZE
            )));
        }

        let content = tokio::fs::read_to_string(path).await?;

        let output = if input.offset.is_some() || input.limit.is_some() {
            let offset = input.offset.unwrap_or(0);
            let lines = content.lines().skip(offset);
            match input.limit {
                Some(limit) => lines.take(limit).collect::<Vec<_>>().join("\n"),
                None => lines.collect::<Vec<_>>().join("\n"),
            }
        } else {
            content
        };

        let bytes = output.len();
        Ok(ToolOutput::new(output)
            .with_metadata("path", input.path)
            .with_metadata("bytes", bytes)
            .with_metadata("duration_ms", start.elapsed().as_millis() as u64))
    }
}

/// Writes (or overwrites) a text file.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteFileTool;

#[async_trait]
impl CoreTool for WriteFileTool {
    type Input = WriteFileInput;
    type Output = String;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            WRITE_FILE,
            "Write content to a file at the specified path. Creates the file if it doesn't exist, or overwrites if it does.",
        )
        .with_parameter(ToolParameter::new("path", "Path to the file to write", true).with_type("path"))
        .with_parameter(ToolParameter::new("content", "Content to write to the file", true).with_type("string"))
        .with_parameter(
            ToolParameter::new("create_dirs", "Create parent directories if they don't exist", false)
                .with_type("boolean"),
        )
    }

    fn check_input(&self, input: &WriteFileInput) -> Result<(), String> {
        if input.path.trim().is_empty() {
            return Err("'path' must not be empty".to_string());
        }
        Ok(())
    }

    async fn run(&self, input: WriteFileInput) -> Result<ToolOutput<String>, ToolFailure> {
        let start = Instant::now();
        let path = Path::new(&input.path);

        // A bare file name has an empty parent, meaning the current directory.
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            if input.create_dirs {
                tokio::fs::create_dir_all(parent).await?;
            } else {
                return Err(ToolFailure::new(format!(
                    "Parent directory does not exist: {}",
                    parent.display()
                )));
            }
        }

        let bytes = input.content.len();
        tokio::fs::write(path, &input.content).await?;

        Ok(ToolOutput::new(format!(
            "Successfully wrote {} bytes to {}",
            bytes, input.path
        ))
        .with_metadata("path", input.path.clone())
        .with_metadata("bytes", bytes)
        .with_metadata("duration_ms", start.elapsed().as_millis() as u64))
    }
}
