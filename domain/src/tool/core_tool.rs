//! Local tool contract
//!
//! A [`CoreTool`] declares a typed input and output. The executor never sees
//! those types: every `CoreTool` is also a [`DynCoreTool`] through a blanket
//! impl, which decodes the raw JSON arguments into `Input`, runs the tool and
//! renders `Output` back into result content.
//!
//! ```text
//! raw arguments ──decode──▶ Input ──check_input──▶ run() ──▶ Output ──render──▶ content
//!        │                    │                      │
//!   InvalidInput         InvalidInput             Failed
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use super::entities::ToolDefinition;
use super::value_objects::ToolErrorType;

/// Runtime failure raised by a tool implementation.
///
/// Defaults to `EXECUTION_ERROR`. Only the kinds in
/// [`ToolFailure::PASSTHROUGH_KINDS`] survive dispatch; any other kind is
/// reported as `EXECUTION_ERROR`.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ToolFailure {
    pub kind: ToolErrorType,
    pub message: String,
}

impl ToolFailure {
    /// Kinds a tool may report about itself.
    pub const PASSTHROUGH_KINDS: [ToolErrorType; 3] = [
        ToolErrorType::PermissionDenied,
        ToolErrorType::UserRejected,
        ToolErrorType::Timeout,
    ];

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: ToolErrorType::ExecutionError,
            message: message.into(),
        }
    }

    pub fn with_kind(mut self, kind: ToolErrorType) -> Self {
        self.kind = kind;
        self
    }

    pub fn permission_denied(resource: impl Into<String>) -> Self {
        Self::new(format!("Permission denied: {}", resource.into()))
            .with_kind(ToolErrorType::PermissionDenied)
    }

    /// The kind the dispatcher reports for this failure.
    pub fn reported_kind(&self) -> ToolErrorType {
        if Self::PASSTHROUGH_KINDS.contains(&self.kind) {
            self.kind
        } else {
            ToolErrorType::ExecutionError
        }
    }
}

impl From<std::io::Error> for ToolFailure {
    fn from(err: std::io::Error) -> Self {
        let failure = Self::new(err.to_string());
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                failure.with_kind(ToolErrorType::PermissionDenied)
            }
            std::io::ErrorKind::TimedOut => failure.with_kind(ToolErrorType::Timeout),
            _ => failure,
        }
    }
}

/// Typed value returned by a tool, plus optional result metadata.
#[derive(Debug, Clone)]
pub struct ToolOutput<T> {
    pub value: T,
    pub metadata: Map<String, Value>,
}

impl<T> ToolOutput<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl<T: Serialize> ToolOutput<T> {
    /// Strings are passed through verbatim, `null` becomes empty content and
    /// everything else is rendered as compact JSON.
    fn render(self) -> Result<RenderedOutput, ToolInvokeError> {
        let value = serde_json::to_value(&self.value)
            .map_err(|e| ToolInvokeError::Serialization(e.to_string()))?;
        let content = match value {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        };
        Ok(RenderedOutput {
            content,
            metadata: self.metadata,
        })
    }
}

/// Output of a type-erased tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedOutput {
    pub content: String,
    pub metadata: Map<String, Value>,
}

/// Why a type-erased invocation did not produce output.
#[derive(Debug, Error)]
pub enum ToolInvokeError {
    /// Arguments could not be decoded into the tool's input type, or were rejected by it
    #[error("{0}")]
    InvalidInput(String),

    /// The tool ran and failed
    #[error(transparent)]
    Failed(#[from] ToolFailure),

    /// The tool's output could not be serialized
    #[error("Failed to serialize tool output: {0}")]
    Serialization(String),
}

/// A locally implemented tool with a typed input/output contract.
#[async_trait]
pub trait CoreTool: Send + Sync + 'static {
    type Input: DeserializeOwned + Send + 'static;
    type Output: Serialize + Send + 'static;

    /// Name, description and parameter list advertised to the model.
    fn definition(&self) -> ToolDefinition;

    /// Semantic checks on the decoded input (ranges, mutually exclusive fields).
    fn check_input(&self, _input: &Self::Input) -> Result<(), String> {
        Ok(())
    }

    async fn run(&self, input: Self::Input) -> Result<ToolOutput<Self::Output>, ToolFailure>;
}

/// Object-safe view of a [`CoreTool`], used by registries.
#[async_trait]
pub trait DynCoreTool: Send + Sync {
    fn tool_definition(&self) -> ToolDefinition;

    async fn invoke(
        &self,
        arguments: &HashMap<String, Value>,
    ) -> Result<RenderedOutput, ToolInvokeError>;
}

#[async_trait]
impl<T: CoreTool> DynCoreTool for T {
    fn tool_definition(&self) -> ToolDefinition {
        CoreTool::definition(self)
    }

    async fn invoke(
        &self,
        arguments: &HashMap<String, Value>,
    ) -> Result<RenderedOutput, ToolInvokeError> {
        let raw = Value::Object(
            arguments
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        );
        let input: T::Input =
            serde_json::from_value(raw).map_err(|e| ToolInvokeError::InvalidInput(e.to_string()))?;
        self.check_input(&input)
            .map_err(ToolInvokeError::InvalidInput)?;

        let output = self.run(input).await?;
        output.render()
    }
}
