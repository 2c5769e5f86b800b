//! Port for structured dispatch logging.
//!
//! Defines the [`DispatchLogger`] trait for recording tool calls, their
//! results and safety interventions to a structured audit log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures every call
//! and outcome in a machine-readable format (JSONL).

use serde_json::{Value, json};
use toolgate_domain::tool::{entities::ToolCall, value_objects::ToolCallResult};

/// A structured dispatch event for logging.
///
/// Each event has a type string and a JSON payload containing
/// event-specific fields. Timestamps are added by the logger.
#[derive(Debug, Clone)]
pub struct DispatchEvent {
    /// Event type identifier ("tool_call", "tool_result", "intervention").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl DispatchEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    pub fn tool_call(iteration: usize, call: &ToolCall) -> Self {
        Self::new(
            "tool_call",
            json!({
                "iteration": iteration,
                "tool_call_id": call.id,
                "tool_name": call.tool_name,
                "arguments": call.arguments,
            }),
        )
    }

    pub fn tool_result(iteration: usize, result: &ToolCallResult) -> Self {
        Self::new(
            "tool_result",
            json!({
                "iteration": iteration,
                "result": result,
            }),
        )
    }

    pub fn intervention(iteration: usize, feedback: &ToolCallResult) -> Self {
        Self::new(
            "intervention",
            json!({
                "iteration": iteration,
                "kind": feedback.metadata.get("intervention"),
                "tool_name": feedback.tool_name,
                "tool_call_id": feedback.tool_call_id,
                "message": feedback.content,
            }),
        )
    }
}

/// Port for logging dispatch events to a structured log.
///
/// The `log` method is synchronous and non-fallible so logging problems
/// cannot disturb dispatch; implementations swallow their own errors.
pub trait DispatchLogger: Send + Sync {
    /// Record a dispatch event.
    fn log(&self, event: DispatchEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoDispatchLogger;

impl DispatchLogger for NoDispatchLogger {
    fn log(&self, _event: DispatchEvent) {}
}
