//! Guard configuration from TOML (`[guard]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [guard]
//! max_iterations = 30
//! exact_threshold = 3
//! pattern_detection = true
//!
//! [guard.tool_limits]
//! web_search = 5
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use toolgate_domain::config::{ConfigIssue, ConfigIssueCode, Severity};

/// Loop-safety settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGuardConfig {
    /// Iteration budget for one agent run
    pub max_iterations: usize,
    /// Identical calls allowed before rejection
    pub exact_threshold: usize,
    /// Reject circular call patterns
    pub pattern_detection: bool,
    /// Per-tool call quotas (tool name -> max calls per session)
    pub tool_limits: HashMap<String, usize>,
}

impl Default for FileGuardConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            exact_threshold: 3,
            pattern_detection: true,
            tool_limits: HashMap::new(),
        }
    }
}

impl FileGuardConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.max_iterations == 0 {
            issues.push(ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::ZeroValue {
                    field: "guard.max_iterations".to_string(),
                },
                message: "guard.max_iterations must be at least 1; with 0 no tool can ever run"
                    .to_string(),
            });
        }

        match self.exact_threshold {
            0 => issues.push(ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::ZeroValue {
                    field: "guard.exact_threshold".to_string(),
                },
                message: "guard.exact_threshold must be at least 2".to_string(),
            }),
            1 => issues.push(ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::RejectsEveryCall {
                    field: "guard.exact_threshold".to_string(),
                },
                message: "guard.exact_threshold = 1 rejects the first call of every tool"
                    .to_string(),
            }),
            _ => {}
        }

        let mut limited: Vec<(&String, &usize)> = self.tool_limits.iter().collect();
        limited.sort();
        for (tool, _) in limited.into_iter().filter(|(_, limit)| **limit == 0) {
            issues.push(ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::RejectsEveryCall {
                    field: format!("guard.tool_limits.{}", tool),
                },
                message: format!(
                    "guard.tool_limits.{} = 0 rejects every call to '{}'",
                    tool, tool
                ),
            });
        }

        issues
    }
}
