//! Tool domain value objects: the single result shape and its error taxonomy
//!
//! Every dispatch path (local tool, remote router, interceptor override,
//! not-found) and every safety intervention produces a [`ToolCallResult`].
//! The agent loop therefore has one code path for "a tool ran" and
//! "the loop was told to stop or redirect".
//!
//! | Kind | Produced by |
//! |------|-------------|
//! | `EXECUTION_ERROR` | Tool raised, remote router failed or flagged an error |
//! | `VALIDATION_ERROR` | Arguments did not satisfy the tool's input contract |
//! | `INVALID_ARGS` | Safety interventions (repetition, iteration limit) |
//! | `NOT_FOUND` | No interceptor, local tool or running router claims the name |
//! | `TIMEOUT` | Caller-imposed deadline expired |
//! | `PERMISSION_DENIED`, `USER_REJECTED` | Reserved for tools and callers |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::util::summarize;

/// Upper bound for the one-line `user_display` summary.
const USER_DISPLAY_MAX_BYTES: usize = 200;

/// Closed set of error kinds shared by tool failures and policy interventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolErrorType {
    ExecutionError,
    Timeout,
    ValidationError,
    NotFound,
    PermissionDenied,
    UserRejected,
    InvalidArgs,
}

impl ToolErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolErrorType::ExecutionError => "EXECUTION_ERROR",
            ToolErrorType::Timeout => "TIMEOUT",
            ToolErrorType::ValidationError => "VALIDATION_ERROR",
            ToolErrorType::NotFound => "NOT_FOUND",
            ToolErrorType::PermissionDenied => "PERMISSION_DENIED",
            ToolErrorType::UserRejected => "USER_REJECTED",
            ToolErrorType::InvalidArgs => "INVALID_ARGS",
        }
    }
}

impl std::fmt::Display for ToolErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a tool call, carrying output or error information.
///
/// `is_error` is true iff both `error` and `error_type` are populated. The
/// constructors uphold this; [`is_consistent`](Self::is_consistent) checks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// Name of the tool the call was addressed to
    pub tool_name: String,
    /// Correlation id echoed from the originating call
    pub tool_call_id: String,
    /// Output handed back to the model
    pub content: String,
    /// Whether the call failed or was rejected
    pub is_error: bool,
    /// Error message (only for failures)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Error kind (only for failures)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ToolErrorType>,
    /// Short human-readable summary for UIs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_display: Option<String>,
    /// Structured extra data (router tags, intervention kind, tool metadata)
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl ToolCallResult {
    /// Create a successful result
    pub fn success(tool_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            tool_call_id: String::new(),
            content: content.into(),
            is_error: false,
            error: None,
            error_type: None,
            user_display: None,
            metadata: Map::new(),
        }
    }

    /// Create a failed result. The message doubles as `content` so the model sees it.
    pub fn failure(
        tool_name: impl Into<String>,
        error_type: ToolErrorType,
        message: impl Into<String>,
    ) -> Self {
        let tool_name = tool_name.into();
        let message = message.into();
        let display = format!(
            "{} failed: {}",
            tool_name,
            summarize(&message, USER_DISPLAY_MAX_BYTES)
        );
        Self {
            tool_name,
            tool_call_id: String::new(),
            content: message.clone(),
            is_error: true,
            error: Some(message),
            error_type: Some(error_type),
            user_display: Some(display),
            metadata: Map::new(),
        }
    }

    /// Correlate this result with a call id, overriding whatever was set before.
    pub fn for_call(mut self, tool_call_id: impl Into<String>) -> Self {
        self.tool_call_id = tool_call_id.into();
        self
    }

    pub fn with_user_display(mut self, display: impl Into<String>) -> Self {
        self.user_display = Some(display.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Merge a whole metadata map into the result; existing keys are overwritten.
    pub fn extend_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata.extend(metadata);
        self
    }

    pub fn is_success(&self) -> bool {
        !self.is_error
    }

    pub fn error_type(&self) -> Option<ToolErrorType> {
        self.error_type
    }

    /// Restore the `is_error` invariant on a result built outside the constructors.
    ///
    /// An error result missing its message or kind gets `content` (or a generic
    /// message) and `EXECUTION_ERROR`; a success result loses any stray error fields.
    pub fn normalized(mut self) -> Self {
        if self.is_error {
            if self.error.is_none() {
                let message = if self.content.is_empty() {
                    format!("Tool '{}' failed", self.tool_name)
                } else {
                    self.content.clone()
                };
                self.error = Some(message);
            }
            if self.error_type.is_none() {
                self.error_type = Some(ToolErrorType::ExecutionError);
            }
        } else {
            self.error = None;
            self.error_type = None;
        }
        self
    }

    /// `is_error` agrees with the presence of `error` and `error_type`.
    pub fn is_consistent(&self) -> bool {
        self.is_error == self.error.is_some() && self.is_error == self.error_type.is_some()
    }
}
