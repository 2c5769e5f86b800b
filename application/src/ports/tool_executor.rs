//! Tool Executor port
//!
//! Defines the interface for dispatching tool calls.

use async_trait::async_trait;
use toolgate_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolSpec},
    value_objects::ToolCallResult,
};

/// Port for tool execution
///
/// This port defines how the application layer dispatches tool calls.
/// Implementations (adapters) live in the infrastructure layer.
///
/// `execute` never fails: every outcome, including "no such tool", is a
/// [`ToolCallResult`] whose `tool_call_id` equals the call's `id`. It must be
/// safe to run concurrently for distinct calls.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Get the specification of all locally registered tools
    fn tool_spec(&self) -> &ToolSpec;

    /// Check if a local tool is available
    fn has_tool(&self, name: &str) -> bool {
        self.tool_spec().get(name).is_some()
    }

    /// Get the definition of a specific local tool
    fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tool_spec().get(name)
    }

    /// Get names of all local tools
    fn available_tools(&self) -> Vec<&str> {
        self.tool_spec().names().collect()
    }

    /// Dispatch a tool call
    async fn execute(&self, call: &ToolCall) -> ToolCallResult;
}
