//! Tool domain module
//!
//! This module defines the core abstractions for dispatching tool calls
//! requested inside an agent loop.
//!
//! # Overview
//!
//! A [`ToolCall`] is resolved against three kinds of tool sources and always
//! produces a [`ToolCallResult`]:
//!
//! ```text
//! ┌──────────────┐    ┌──────────────────────────────┐    ┌────────────────┐
//! │ ToolCall     │───▶│ interceptor → local tool →   │───▶│ ToolCallResult │
//! │ (id, name,   │    │ remote router → not found    │    │ (one shape)    │
//! │  arguments)  │    └──────────────────────────────┘    └────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`ToolCall`]: an invocation request with a correlation id
//! - [`ToolCallResult`] / [`ToolErrorType`]: the single result shape and its error taxonomy
//! - [`CoreTool`] / [`DynCoreTool`]: typed contract for locally implemented tools
//! - [`ToolRouter`]: remote tool servers (MCP, CLI bridges, scripts)
//! - [`ToolInterceptor`]: per-name pre-dispatch hooks
//! - [`ToolValidator`]: structural argument validation against a [`ToolDefinition`]
//!
//! # Architecture
//!
//! - **Domain** (this module): contracts and value objects, no I/O
//! - **Application** (`ToolExecutorPort`): port trait for tool execution
//! - **Infrastructure** (`ToolExecutor`): registries and the dispatch itself

pub mod core_tool;
pub mod entities;
pub mod interceptor;
pub mod router;
pub mod traits;
pub mod value_objects;

pub use core_tool::{CoreTool, DynCoreTool, RenderedOutput, ToolFailure, ToolInvokeError, ToolOutput};
pub use entities::{ToolCall, ToolDefinition, ToolParameter, ToolSpec};
pub use interceptor::{Interception, InterceptorError, ToolInterceptor};
pub use router::{ContentSegment, RouterError, RouterKind, RouterResponse, ToolRouter};
pub use traits::{DefaultToolValidator, ToolValidator};
pub use value_objects::{ToolCallResult, ToolErrorType};
