//! Pre-dispatch interceptors
//!
//! An interceptor is registered for a single tool name and sees the call
//! before any local tool or router does. It either answers the call itself
//! ([`Interception::Handled`]) or lets normal dispatch continue
//! ([`Interception::Passthrough`]). An interceptor error is never fatal: the
//! executor logs it and dispatches as if no interceptor were registered.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use super::value_objects::ToolCallResult;

/// Decision returned by an interceptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Interception {
    /// Short-circuit dispatch with this result
    Handled(ToolCallResult),
    /// Continue with normal dispatch
    Passthrough,
}

#[derive(Debug, Error)]
#[error("Interceptor failed: {0}")]
pub struct InterceptorError(pub String);

#[async_trait]
pub trait ToolInterceptor: Send + Sync {
    async fn intercept(
        &self,
        tool_name: &str,
        arguments: &HashMap<String, serde_json::Value>,
    ) -> Result<Interception, InterceptorError>;
}
