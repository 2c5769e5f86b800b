//! Tool implementations and the dispatching executor
//!
//! - [`ToolExecutor`]: resolves calls through interceptors, local tools and routers
//! - `file`: builtin `read_file` / `write_file` local tools
//! - [`JsonSchemaToolConverter`]: renders tool definitions as JSON Schema

pub mod file;

mod executor;
mod schema;

pub use executor::ToolExecutor;
pub use file::{ReadFileTool, WriteFileTool};
pub use schema::JsonSchemaToolConverter;

use std::sync::Arc;
use toolgate_domain::tool::core_tool::DynCoreTool;

/// The builtin local tools, ready to register
pub fn builtin_tools() -> Vec<Arc<dyn DynCoreTool>> {
    vec![Arc::new(ReadFileTool), Arc::new(WriteFileTool)]
}
