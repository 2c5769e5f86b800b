//! Executor and logging configuration from TOML (`[executor]`, `[logging]`)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use toolgate_domain::config::{ConfigIssue, ConfigIssueCode, Severity};

/// Dispatch settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExecutorConfig {
    /// Per-call deadline in seconds (unset = no deadline)
    pub call_timeout_secs: Option<u64>,
}

impl FileExecutorConfig {
    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        if self.call_timeout_secs == Some(0) {
            return vec![ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::RejectsEveryCall {
                    field: "executor.call_timeout_secs".to_string(),
                },
                message: "executor.call_timeout_secs = 0 makes every call time out".to_string(),
            }];
        }
        Vec::new()
    }
}

/// Audit log settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving every dispatch event
    pub dispatch_log: Option<PathBuf>,
}
