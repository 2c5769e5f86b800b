//! Guard parameters: loop-safety and dispatch control.
//!
//! [`GuardParams`] groups the static parameters that control
//! [`DispatchTurnUseCase`](crate::use_cases::dispatch_turn::DispatchTurnUseCase).
//! The policies themselves live in the domain layer; this type only decides
//! how they are configured for one session.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use toolgate_domain::guard::{IterationLimitHandler, RepetitionConfig, RepetitionDetector};

/// Loop-safety and dispatch parameters.
///
/// | Field | Default | Consumer |
/// |-------|---------|----------|
/// | `max_iterations` | 50 | IterationLimitHandler |
/// | `exact_threshold` | 3 | RepetitionDetector |
/// | `pattern_detection` | true | RepetitionDetector |
/// | `tool_limits` | empty | RepetitionDetector |
/// | `call_timeout` | none | DispatchTurnUseCase |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardParams {
    /// Iteration budget for one agent run.
    pub max_iterations: usize,
    /// Identical calls allowed before the next one is rejected.
    pub exact_threshold: usize,
    /// Whether circular call patterns are rejected.
    pub pattern_detection: bool,
    /// Per-tool call quotas for the whole session.
    pub tool_limits: HashMap<String, usize>,
    /// Deadline applied to each dispatched call.
    pub call_timeout: Option<Duration>,
}

impl Default for GuardParams {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            exact_threshold: 3,
            pattern_detection: true,
            tool_limits: HashMap::new(),
            call_timeout: None,
        }
    }
}

impl GuardParams {
    // ==================== Builder Methods ====================

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_exact_threshold(mut self, threshold: usize) -> Self {
        self.exact_threshold = threshold;
        self
    }

    pub fn with_pattern_detection(mut self, enabled: bool) -> Self {
        self.pattern_detection = enabled;
        self
    }

    pub fn with_tool_limit(mut self, tool_name: impl Into<String>, limit: usize) -> Self {
        self.tool_limits.insert(tool_name.into(), limit);
        self
    }

    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    // ==================== Policy Construction ====================

    pub fn iteration_handler(&self) -> IterationLimitHandler {
        IterationLimitHandler::new(self.max_iterations)
    }

    pub fn repetition_config(&self) -> RepetitionConfig {
        RepetitionConfig {
            exact_threshold: self.exact_threshold,
            pattern_detection: self.pattern_detection,
        }
    }

    pub fn repetition_detector(&self) -> RepetitionDetector {
        RepetitionDetector::new(self.repetition_config())
    }
}
