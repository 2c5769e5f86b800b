//! Tool executor: the concrete implementation of [`ToolExecutorPort`].
//!
//! [`ToolExecutor`] owns three registries and resolves every call through
//! them in a fixed order:
//!
//! ```text
//! ToolExecutorPort::execute(call)
//!   ├─ interceptors[name]  → Handled(result)? return it
//!   │                        Passthrough / error / panic → continue
//!   ├─ core_tools[name]    → validate arguments, invoke
//!   ├─ routers (in order)  → first running router that has the tool
//!   └─ otherwise           → NOT_FOUND
//! ```
//!
//! Whatever path answers, the returned `tool_call_id` is the call's `id`.
//!
//! # Concurrency
//!
//! `execute` only reads the registries, so distinct calls may be dispatched
//! concurrently through a shared reference. Registration takes `&mut self`
//! and is meant for setup and teardown.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use toolgate_application::ports::tool_executor::ToolExecutorPort;
use toolgate_domain::DomainError;
use toolgate_domain::tool::{
    core_tool::{DynCoreTool, ToolInvokeError},
    entities::{ToolCall, ToolSpec},
    interceptor::{Interception, ToolInterceptor},
    router::ToolRouter,
    traits::{DefaultToolValidator, ToolValidator},
    value_objects::{ToolCallResult, ToolErrorType},
};
use tracing::{debug, warn};

/// Dispatcher over interceptors, local tools and remote routers.
///
/// # Registries
///
/// | Registry | Key | Mutated by |
/// |----------|-----|------------|
/// | local tools | tool name (unique) | [`register_core_tool`](Self::register_core_tool), [`unregister_core_tool`](Self::unregister_core_tool) |
/// | routers | registration order | [`register_mcp_servers`](Self::register_mcp_servers) |
/// | interceptors | tool name (one each) | [`register_interceptor`](Self::register_interceptor), [`remove_interceptor`](Self::remove_interceptor) |
pub struct ToolExecutor {
    /// Definitions of the local tools
    tool_spec: ToolSpec,
    /// Local tools by name
    core_tools: HashMap<String, Arc<dyn DynCoreTool>>,
    /// Remote routers, consulted in order
    routers: Vec<Arc<dyn ToolRouter>>,
    /// Pre-dispatch hooks by tool name
    interceptors: HashMap<String, Arc<dyn ToolInterceptor>>,
    validator: DefaultToolValidator,
}

impl ToolExecutor {
    /// Create an executor with empty registries
    pub fn new() -> Self {
        Self {
            tool_spec: ToolSpec::new(),
            core_tools: HashMap::new(),
            routers: Vec::new(),
            interceptors: HashMap::new(),
            validator: DefaultToolValidator,
        }
    }

    // ==================== Registration ====================

    /// Register a local tool. Names must be unique.
    pub fn register_core_tool<T: DynCoreTool + 'static>(
        &mut self,
        tool: T,
    ) -> Result<(), DomainError> {
        self.register_core_tool_arc(Arc::new(tool))
    }

    /// Register a local tool (Arc version)
    pub fn register_core_tool_arc(&mut self, tool: Arc<dyn DynCoreTool>) -> Result<(), DomainError> {
        let definition = tool.tool_definition();
        if definition.name.trim().is_empty() {
            return Err(DomainError::InvalidDefinition(
                "tool name must not be empty".to_string(),
            ));
        }
        if self.core_tools.contains_key(&definition.name) {
            return Err(DomainError::DuplicateTool(definition.name));
        }

        debug!(tool = %definition.name, "Registered local tool");
        self.core_tools.insert(definition.name.clone(), tool);
        self.tool_spec.insert(definition);
        Ok(())
    }

    /// Remove a local tool.
    pub fn unregister_core_tool(&mut self, name: &str) -> Result<(), DomainError> {
        if self.core_tools.remove(name).is_none() {
            return Err(DomainError::UnknownTool(name.to_string()));
        }
        self.tool_spec.remove(name);
        debug!(tool = %name, "Unregistered local tool");
        Ok(())
    }

    /// Append remote routers; earlier registrations take precedence.
    pub fn register_mcp_servers(&mut self, routers: impl IntoIterator<Item = Arc<dyn ToolRouter>>) {
        for router in routers {
            debug!(router = router.id(), kind = %router.kind(), "Registered router");
            self.routers.push(router);
        }
    }

    /// Install the interceptor for a tool name, returning the one it replaces.
    pub fn register_interceptor(
        &mut self,
        tool_name: impl Into<String>,
        interceptor: Arc<dyn ToolInterceptor>,
    ) -> Option<Arc<dyn ToolInterceptor>> {
        self.interceptors.insert(tool_name.into(), interceptor)
    }

    /// Remove the interceptor for a tool name. Returns whether one existed.
    pub fn remove_interceptor(&mut self, tool_name: &str) -> bool {
        self.interceptors.remove(tool_name).is_some()
    }

    // ==================== Introspection ====================

    /// Names of local tools, sorted
    pub fn core_tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.core_tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Router IDs in resolution order
    pub fn router_ids(&self) -> Vec<&str> {
        self.routers.iter().map(|r| r.id()).collect()
    }

    /// Tool names that have an interceptor, sorted
    pub fn interceptor_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.interceptors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    // ==================== Dispatch ====================

    async fn dispatch(&self, call: &ToolCall) -> ToolCallResult {
        if let Some(result) = self.try_intercept(call).await {
            return result;
        }

        if let Some(tool) = self.core_tools.get(&call.tool_name) {
            return self.execute_core_tool(tool.as_ref(), call).await;
        }

        for router in &self.routers {
            if router_owns(router.as_ref(), &call.tool_name).await {
                return execute_on_router(router.as_ref(), call).await;
            }
        }

        debug!(tool = %call.tool_name, call_id = %call.id, "No resolver for tool");
        ToolCallResult::failure(
            &call.tool_name,
            ToolErrorType::NotFound,
            format!("Tool '{}' not found", call.tool_name),
        )
    }

    /// `Some` only when the interceptor handled the call.
    async fn try_intercept(&self, call: &ToolCall) -> Option<ToolCallResult> {
        let interceptor = self.interceptors.get(&call.tool_name)?;

        match catch_panic(interceptor.intercept(&call.tool_name, &call.arguments)).await {
            Ok(Ok(Interception::Handled(result))) => {
                debug!(tool = %call.tool_name, call_id = %call.id, "Call handled by interceptor");
                Some(result.normalized())
            }
            Ok(Ok(Interception::Passthrough)) => None,
            Ok(Err(e)) => {
                warn!(tool = %call.tool_name, error = %e, "Interceptor failed, dispatching normally");
                None
            }
            Err(panic) => {
                warn!(tool = %call.tool_name, panic = %panic, "Interceptor panicked, dispatching normally");
                None
            }
        }
    }

    async fn execute_core_tool(&self, tool: &dyn DynCoreTool, call: &ToolCall) -> ToolCallResult {
        let name = call.tool_name.as_str();

        if let Some(definition) = self.tool_spec.get(name)
            && let Err(e) = self.validator.validate(&call.arguments, definition)
        {
            return ToolCallResult::failure(name, ToolErrorType::ValidationError, e);
        }

        match catch_panic(tool.invoke(&call.arguments)).await {
            Ok(Ok(output)) => {
                ToolCallResult::success(name, output.content).extend_metadata(output.metadata)
            }
            Ok(Err(ToolInvokeError::InvalidInput(msg))) => ToolCallResult::failure(
                name,
                ToolErrorType::ValidationError,
                format!("Invalid arguments for tool '{}': {}", name, msg),
            ),
            Ok(Err(ToolInvokeError::Failed(failure))) => {
                ToolCallResult::failure(name, failure.reported_kind(), failure.message)
            }
            Ok(Err(e @ ToolInvokeError::Serialization(_))) => {
                ToolCallResult::failure(name, ToolErrorType::ExecutionError, e.to_string())
            }
            Err(panic) => {
                warn!(tool = %name, panic = %panic, "Local tool panicked");
                ToolCallResult::failure(
                    name,
                    ToolErrorType::ExecutionError,
                    format!("Tool '{}' panicked: {}", name, panic),
                )
            }
        }
    }
}

impl Default for ToolExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the router is running and claims the tool. A panic counts as no.
async fn router_owns(router: &dyn ToolRouter, tool_name: &str) -> bool {
    let ownership = async { router.is_running() && router.has_tool(tool_name).await };
    match catch_panic(ownership).await {
        Ok(owns) => owns,
        Err(panic) => {
            warn!(router = router.id(), tool = %tool_name, panic = %panic, "Router ownership check panicked");
            false
        }
    }
}

async fn execute_on_router(router: &dyn ToolRouter, call: &ToolCall) -> ToolCallResult {
    let name = call.tool_name.as_str();

    let result = match catch_panic(router.call_tool(name, &call.arguments)).await {
        Ok(Ok(response)) if response.is_error => {
            let text = response.first_text();
            let message = if text.is_empty() {
                format!("Remote tool '{}' reported an error", name)
            } else {
                text.to_string()
            };
            ToolCallResult::failure(name, ToolErrorType::ExecutionError, message)
        }
        Ok(Ok(response)) => ToolCallResult::success(name, response.first_text()),
        Ok(Err(e)) => {
            warn!(router = router.id(), tool = %name, error = %e, "Remote tool call failed");
            ToolCallResult::failure(
                name,
                ToolErrorType::ExecutionError,
                format!("Remote tool call failed: {}", e),
            )
        }
        Err(panic) => {
            warn!(router = router.id(), tool = %name, panic = %panic, "Router panicked");
            ToolCallResult::failure(
                name,
                ToolErrorType::ExecutionError,
                format!("Remote tool call failed: router panicked: {}", panic),
            )
        }
    };

    result
        .with_metadata("router_type", router.kind().as_str())
        .with_metadata("router_id", router.id())
}

/// Run a future, turning a panic into its message.
async fn catch_panic<F: Future>(future: F) -> Result<F::Output, String> {
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|payload| panic_message(&*payload))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[async_trait]
impl ToolExecutorPort for ToolExecutor {
    fn tool_spec(&self) -> &ToolSpec {
        &self.tool_spec
    }

    async fn execute(&self, call: &ToolCall) -> ToolCallResult {
        self.dispatch(call).await.for_call(&call.id)
    }
}
