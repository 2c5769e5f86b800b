//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application types.

mod executor;
mod guard;

pub use executor::{FileExecutorConfig, FileLoggingConfig};
pub use guard::FileGuardConfig;

use serde::{Deserialize, Serialize};
use toolgate_application::config::GuardParams;
use toolgate_domain::config::ConfigIssue;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Loop-safety settings
    pub guard: FileGuardConfig,
    /// Dispatch settings
    pub executor: FileExecutorConfig,
    /// Audit log settings
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.guard.validate();
        issues.extend(self.executor.validate());
        issues
    }

    /// Convert to the parameters used by the dispatch use case.
    pub fn to_guard_params(&self) -> GuardParams {
        GuardParams {
            max_iterations: self.guard.max_iterations,
            exact_threshold: self.guard.exact_threshold,
            pattern_detection: self.guard.pattern_detection,
            tool_limits: self.guard.tool_limits.clone(),
            call_timeout: self.executor.call_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use toolgate_domain::config::ConfigIssueCode;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[guard]
max_iterations = 30
exact_threshold = 4
pattern_detection = false

[guard.tool_limits]
web_search = 5
read_file = 20

[executor]
call_timeout_secs = 90

[logging]
dispatch_log = "/tmp/toolgate.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.guard.max_iterations, 30);
        assert_eq!(config.guard.exact_threshold, 4);
        assert!(!config.guard.pattern_detection);
        assert_eq!(config.guard.tool_limits.get("web_search"), Some(&5));
        assert_eq!(config.executor.call_timeout_secs, Some(90));
        assert_eq!(
            config.logging.dispatch_log.as_deref(),
            Some(std::path::Path::new("/tmp/toolgate.jsonl"))
        );
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[guard]
max_iterations = 10
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.guard.max_iterations, 10);
        // Defaults should apply
        assert_eq!(config.guard.exact_threshold, 3);
        assert!(config.guard.pattern_detection);
        assert!(config.executor.call_timeout_secs.is_none());
    }

    #[test]
    fn test_to_guard_params() {
        let toml_str = r#"
[guard.tool_limits]
web_search = 2

[executor]
call_timeout_secs = 15
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let params = config.to_guard_params();
        assert_eq!(params.max_iterations, 50);
        assert_eq!(params.tool_limits.get("web_search"), Some(&2));
        assert_eq!(params.call_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_default_matches_guard_params_default() {
        assert_eq!(FileConfig::default().to_guard_params(), GuardParams::default());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_unusable_values() {
        let toml_str = r#"
[guard]
max_iterations = 0
exact_threshold = 1

[guard.tool_limits]
write_file = 0

[executor]
call_timeout_secs = 0
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();

        assert_eq!(issues.len(), 4);
        assert_eq!(issues.iter().filter(|i| i.is_error()).count(), 2);
        assert!(issues.iter().any(|i| i.code
            == ConfigIssueCode::ZeroValue {
                field: "guard.max_iterations".to_string()
            }));
        assert!(issues.iter().any(|i| i.code
            == ConfigIssueCode::RejectsEveryCall {
                field: "guard.tool_limits.write_file".to_string()
            }));
    }

    #[test]
    fn test_validate_zero_exact_threshold() {
        let config: FileConfig = toml::from_str("[guard]\nexact_threshold = 0\n").unwrap();
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
    }
}
