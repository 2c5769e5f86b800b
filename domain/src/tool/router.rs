//! Remote tool router abstraction
//!
//! This module defines the [`ToolRouter`] trait, which abstracts external
//! tool servers (MCP servers, CLI bridges, script hosts) that the executor
//! falls back to when no local tool claims a name.
//!
//! # Resolution
//!
//! Routers are consulted in registration order. The first router that is
//! currently running and reports ownership of the tool name serves the call:
//!
//! ```text
//!  ToolExecutor
//!      │  is_running()? has_tool(name)?
//!      ├──────────────▶ router[0]  (no)
//!      ├──────────────▶ router[1]  (yes) ──▶ call_tool(name, args)
//!      └── (not consulted) router[2]
//! ```
//!
//! # Response Shape
//!
//! A router answers with an ordered list of [`ContentSegment`]s and an
//! `isError` flag, mirroring the MCP `tools/call` result. Transport or
//! connection problems are reported as [`RouterError`] instead.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for router operations
#[derive(Debug, Error)]
pub enum RouterError {
    /// The router process/service is not reachable
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The request was sent but the exchange broke down
    #[error("Transport error: {0}")]
    Transport(String),

    /// The router answered with something that is not a tool result
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Category of a router, recorded on every result it serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouterKind {
    /// MCP (Model Context Protocol) server
    Mcp,
    /// Wrapped command-line tools
    Cli,
    /// User-defined scripts
    Script,
}

impl RouterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouterKind::Mcp => "mcp",
            RouterKind::Cli => "cli",
            RouterKind::Script => "script",
        }
    }
}

impl std::fmt::Display for RouterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One piece of a router response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSegment {
    #[serde(rename = "type", default = "ContentSegment::default_kind")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

impl ContentSegment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: Self::default_kind(),
            text: text.into(),
        }
    }

    fn default_kind() -> String {
        "text".to_string()
    }
}

/// Result of a `call_tool` round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterResponse {
    #[serde(default)]
    pub content: Vec<ContentSegment>,
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl RouterResponse {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentSegment::text(text)],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentSegment::text(text)],
            is_error: true,
        }
    }

    /// Text of the first segment; later segments are dropped.
    pub fn first_text(&self) -> &str {
        self.content.first().map(|s| s.text.as_str()).unwrap_or("")
    }
}

/// Remote tool router - external source of tools
#[async_trait]
pub trait ToolRouter: Send + Sync {
    /// Unique identifier for this router
    ///
    /// Examples: "mcp:filesystem", "cli", "script:deploy"
    fn id(&self) -> &str;

    /// Category recorded in result metadata
    fn kind(&self) -> RouterKind {
        RouterKind::Mcp
    }

    /// Liveness flag; stopped routers are skipped during resolution
    fn is_running(&self) -> bool;

    /// Whether this router serves the named tool
    async fn has_tool(&self, tool_name: &str) -> bool;

    /// Invoke a tool on the router
    async fn call_tool(
        &self,
        tool_name: &str,
        arguments: &HashMap<String, serde_json::Value>,
    ) -> Result<RouterResponse, RouterError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A mock router for testing
    struct MockRouter {
        id: String,
        tools: Vec<String>,
        running: bool,
    }

    impl MockRouter {
        fn new(id: &str, running: bool) -> Self {
            Self {
                id: id.to_string(),
                tools: Vec::new(),
                running,
            }
        }

        fn with_tool(mut self, name: &str) -> Self {
            self.tools.push(name.to_string());
            self
        }
    }

    #[async_trait]
    impl ToolRouter for MockRouter {
        fn id(&self) -> &str {
            &self.id
        }

        fn is_running(&self) -> bool {
            self.running
        }

        async fn has_tool(&self, tool_name: &str) -> bool {
            self.tools.iter().any(|t| t == tool_name)
        }

        async fn call_tool(
            &self,
            tool_name: &str,
            _arguments: &HashMap<String, serde_json::Value>,
        ) -> Result<RouterResponse, RouterError> {
            if !self.running {
                return Err(RouterError::Connection("router stopped".into()));
            }
            Ok(RouterResponse::ok(format!("ran {}", tool_name)))
        }
    }

    #[tokio::test]
    async fn test_router_has_tool() {
        let router = MockRouter::new("mcp:fs", true).with_tool("list_dir");

        assert!(router.is_running());
        assert!(router.has_tool("list_dir").await);
        assert!(!router.has_tool("unknown").await);
        assert_eq!(router.kind(), RouterKind::Mcp);
    }

    #[tokio::test]
    async fn test_router_call() {
        let router = MockRouter::new("mcp:fs", true).with_tool("list_dir");
        let response = router.call_tool("list_dir", &HashMap::new()).await.unwrap();
        assert!(!response.is_error);
        assert_eq!(response.first_text(), "ran list_dir");
    }

    #[tokio::test]
    async fn test_stopped_router_errors() {
        let router = MockRouter::new("mcp:fs", false);
        let err = router.call_tool("list_dir", &HashMap::new()).await.unwrap_err();
        assert!(err.to_string().contains("router stopped"));
    }

    #[test]
    fn test_response_deserializes_mcp_shape() {
        let response: RouterResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"first"},{"type":"text","text":"second"}],"isError":true}"#,
        )
        .unwrap();
        assert!(response.is_error);
        assert_eq!(response.first_text(), "first");

        let empty: RouterResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.first_text(), "");
        assert!(!empty.is_error);
    }
}
