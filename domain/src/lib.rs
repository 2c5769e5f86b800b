//! Domain layer for toolgate
//!
//! This crate contains the tool call model, the dispatch contracts and the
//! loop-safety policy. It has no dependencies on infrastructure concerns.
//!
//! # Core Concepts
//!
//! ## Dispatch
//!
//! A [`ToolCall`] is answered by an interceptor, a local [`CoreTool`], a
//! remote [`ToolRouter`] or nobody, and always yields a [`ToolCallResult`].
//!
//! ## Loop Safety
//!
//! - **IterationLimitHandler**: soft warnings near the budget, hard stop past it
//! - **RepetitionDetector**: exact repeats, per-tool quotas, circular call patterns

pub mod config;
pub mod core;
pub mod guard;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, Severity};
pub use core::error::DomainError;
pub use guard::{
    CallHistory, CallSignature, Intervention, IterationLimitHandler, RepetitionConfig,
    RepetitionDetector,
};
pub use tool::{
    ContentSegment, CoreTool, DefaultToolValidator, DynCoreTool, Interception, InterceptorError,
    RenderedOutput, RouterError, RouterKind, RouterResponse, ToolCall, ToolCallResult,
    ToolDefinition, ToolErrorType, ToolFailure, ToolInterceptor, ToolInvokeError, ToolOutput,
    ToolParameter, ToolRouter, ToolSpec, ToolValidator,
};
