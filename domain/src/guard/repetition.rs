//! Repetition policy for tool calls within one session.
//!
//! [`RepetitionDetector::check`] runs once per attempted call, in call order,
//! and commits its side effects step by step:
//!
//! 1. Count the call signature and the tool name (always, even if a later step rejects).
//! 2. Reject if the tool's configured per-tool limit is exceeded.
//! 3. Reject if the identical call has been seen `exact_threshold` times.
//! 4. Record the call in the 10-entry history.
//! 5. Reject if the history ends in a 2-step or 3-step cycle.
//!
//! Rejections are returned as `INVALID_ARGS` results so the loop handles them
//! like any other tool error. The detector is not meant to be shared between
//! concurrent callers; batch callers must check calls one at a time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::tool::value_objects::{ToolCallResult, ToolErrorType};

use super::Intervention;
use super::history::{CallHistory, HistoryEntry};
use super::signature::CallSignature;

/// Detector configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepetitionConfig {
    /// Identical calls allowed before the next one is rejected
    pub exact_threshold: usize,
    /// Whether circular call patterns are detected
    pub pattern_detection: bool,
}

impl Default for RepetitionConfig {
    fn default() -> Self {
        Self {
            exact_threshold: 3,
            pattern_detection: true,
        }
    }
}

/// Per-session monitor of call signatures and call history.
#[derive(Debug, Clone, Default)]
pub struct RepetitionDetector {
    config: RepetitionConfig,
    call_counts: HashMap<CallSignature, usize>,
    tool_call_counts: HashMap<String, usize>,
    history: CallHistory,
}

impl RepetitionDetector {
    pub fn new(config: RepetitionConfig) -> Self {
        Self {
            config,
            call_counts: HashMap::new(),
            tool_call_counts: HashMap::new(),
            history: CallHistory::default(),
        }
    }

    pub fn config(&self) -> &RepetitionConfig {
        &self.config
    }

    /// Record a call and return feedback if it must be rejected.
    pub fn check(
        &mut self,
        tool_name: &str,
        arguments: &HashMap<String, serde_json::Value>,
        tool_limits: Option<&HashMap<String, usize>>,
    ) -> Option<ToolCallResult> {
        let signature = CallSignature::compute(tool_name, arguments);

        let exact_count = {
            let count = self.call_counts.entry(signature.clone()).or_insert(0);
            *count += 1;
            *count
        };
        let tool_count = {
            let count = self.tool_call_counts.entry(tool_name.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        if let Some(limit) = tool_limits.and_then(|limits| limits.get(tool_name))
            && tool_count > *limit
        {
            let message = format!(
                "Tool '{}' has been called {} times, exceeding its limit of {} calls. \
                 Use the results you already have or try a different approach.",
                tool_name, tool_count, limit
            );
            return Some(
                reject(tool_name, Intervention::ToolLimit, message)
                    .with_metadata("call_count", tool_count)
                    .with_metadata("limit", *limit),
            );
        }

        if exact_count >= self.config.exact_threshold {
            let message = format!(
                "Tool '{}' has been called {} times with identical arguments. \
                 Repeating the same call will not produce a different result; \
                 change the arguments or move on.",
                tool_name, exact_count
            );
            return Some(
                reject(tool_name, Intervention::Repetition, message)
                    .with_metadata("call_count", exact_count),
            );
        }

        self.history.push(HistoryEntry {
            tool_name: tool_name.to_string(),
            signature,
        });

        if self.config.pattern_detection
            && let Some(cycle) = self.detect_cycle()
        {
            let message = format!(
                "Circular tool call pattern detected: {} -> (repeat). \
                 The same sequence of calls keeps recurring; step back and try a different approach.",
                cycle.join(" -> ")
            );
            return Some(
                reject(tool_name, Intervention::Pattern, message)
                    .with_metadata("cycle_length", cycle.len()),
            );
        }

        None
    }

    /// Tool names of the repeating cycle at the end of the history, 3-step cycles first.
    fn detect_cycle(&self) -> Option<Vec<String>> {
        let h = |back: usize| self.history.from_back(back);

        if self.history.len() >= 6 && h(6) == h(3) && h(5) == h(2) && h(4) == h(1) {
            return Some(
                [3, 2, 1]
                    .iter()
                    .filter_map(|&back| h(back).map(|e| e.tool_name.clone()))
                    .collect(),
            );
        }

        if self.history.len() >= 4 && h(4) == h(2) && h(3) == h(1) {
            return Some(
                [2, 1]
                    .iter()
                    .filter_map(|&back| h(back).map(|e| e.tool_name.clone()))
                    .collect(),
            );
        }

        None
    }

    /// How often this exact call has been seen.
    pub fn call_count(&self, tool_name: &str, arguments: &HashMap<String, serde_json::Value>) -> usize {
        self.call_counts
            .get(&CallSignature::compute(tool_name, arguments))
            .copied()
            .unwrap_or(0)
    }

    /// How often the tool has been called, regardless of arguments.
    pub fn tool_call_count(&self, tool_name: &str) -> usize {
        self.tool_call_counts.get(tool_name).copied().unwrap_or(0)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Forget everything seen so far; configuration is kept.
    pub fn reset(&mut self) {
        self.call_counts.clear();
        self.tool_call_counts.clear();
        self.history.clear();
    }
}

fn reject(tool_name: &str, intervention: Intervention, message: String) -> ToolCallResult {
    ToolCallResult::failure(tool_name, ToolErrorType::InvalidArgs, message)
        .with_user_display(format!("{} call blocked ({})", tool_name, intervention.as_str()))
        .with_metadata("intervention", intervention.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn args(value: Value) -> HashMap<String, Value> {
        match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => HashMap::new(),
        }
    }

    fn no_patterns(exact_threshold: usize) -> RepetitionDetector {
        RepetitionDetector::new(RepetitionConfig {
            exact_threshold,
            pattern_detection: false,
        })
    }

    #[test]
    fn third_identical_call_is_rejected() {
        let mut detector = RepetitionDetector::new(RepetitionConfig::default());
        let a = args(json!({"path": "/etc/hosts"}));

        assert!(detector.check("read_file", &a, None).is_none());
        assert!(detector.check("read_file", &a, None).is_none());

        let feedback = detector.check("read_file", &a, None).unwrap();
        assert!(feedback.is_error);
        assert_eq!(feedback.error_type, Some(ToolErrorType::InvalidArgs));
        assert!(feedback.content.contains("read_file"));
        assert!(feedback.content.contains("3 times"));
        assert_eq!(feedback.metadata["intervention"], "repetition");
        assert_eq!(feedback.metadata["call_count"], 3);
    }

    #[test]
    fn differing_arguments_never_share_a_counter() {
        let mut detector = no_patterns(3);
        for i in 0..20 {
            let a = args(json!({"path": format!("/file/{i}")}));
            assert!(detector.check("read_file", &a, None).is_none());
        }
        assert_eq!(detector.tool_call_count("read_file"), 20);
    }

    #[test]
    fn argument_key_order_is_irrelevant() {
        let mut detector = no_patterns(2);
        let first: Value = serde_json::from_str(r#"{"a":1,"b":2}"#).unwrap();
        let second: Value = serde_json::from_str(r#"{"b":2,"a":1}"#).unwrap();

        assert!(detector.check("t", &args(first), None).is_none());
        assert!(detector.check("t", &args(second), None).is_some());
    }

    #[test]
    fn two_step_cycle_is_detected_on_fourth_call() {
        let mut detector = RepetitionDetector::new(RepetitionConfig {
            exact_threshold: 100,
            pattern_detection: true,
        });
        let a = args(json!({"q": "a"}));
        let b = args(json!({"q": "b"}));

        assert!(detector.check("search", &a, None).is_none());
        assert!(detector.check("fetch", &b, None).is_none());
        assert!(detector.check("search", &a, None).is_none());

        let feedback = detector.check("fetch", &b, None).unwrap();
        assert!(feedback.is_error);
        assert!(feedback.content.contains("search"));
        assert!(feedback.content.contains("fetch"));
        assert_eq!(feedback.metadata["intervention"], "pattern");
        assert_eq!(feedback.metadata["cycle_length"], 2);
    }

    #[test]
    fn three_step_cycle_is_detected_on_sixth_call() {
        let mut detector = RepetitionDetector::new(RepetitionConfig {
            exact_threshold: 100,
            pattern_detection: true,
        });
        let calls = ["list", "read", "grep", "list", "read"];
        for name in calls {
            assert!(detector.check(name, &HashMap::new(), None).is_none(), "{name}");
        }

        let feedback = detector.check("grep", &HashMap::new(), None).unwrap();
        assert_eq!(feedback.metadata["cycle_length"], 3);
        assert!(feedback.content.contains("list -> read -> grep"));
    }

    #[test]
    fn three_step_description_wins_when_both_cycles_match() {
        let mut detector = RepetitionDetector::new(RepetitionConfig {
            exact_threshold: 100,
            pattern_detection: true,
        });
        let a = args(json!({"q": "a"}));

        let cycle_lengths: Vec<Option<Value>> = (0..6)
            .map(|_| {
                detector
                    .check("search", &a, None)
                    .map(|feedback| feedback.metadata["cycle_length"].clone())
            })
            .collect();

        assert_eq!(
            cycle_lengths,
            vec![None, None, None, Some(json!(2)), Some(json!(2)), Some(json!(3))]
        );
        // Pattern rejections still enter the history
        assert_eq!(detector.history_len(), 6);
    }

    #[test]
    fn pattern_detection_can_be_disabled() {
        let mut detector = no_patterns(100);
        for name in ["a", "b", "a", "b", "a", "b"] {
            assert!(detector.check(name, &HashMap::new(), None).is_none());
        }
    }

    #[test]
    fn per_tool_limit_rejects_third_call() {
        let mut detector = no_patterns(100);
        let limits: HashMap<String, usize> = [("web_search".to_string(), 2)].into_iter().collect();

        assert!(detector.check("web_search", &args(json!({"q": "1"})), Some(&limits)).is_none());
        assert!(detector.check("web_search", &args(json!({"q": "2"})), Some(&limits)).is_none());

        let feedback = detector
            .check("web_search", &args(json!({"q": "3"})), Some(&limits))
            .unwrap();
        assert!(feedback.content.contains("web_search"));
        assert!(feedback.content.contains("3 times"));
        assert!(feedback.content.contains("limit of 2"));
        assert_eq!(feedback.metadata["intervention"], "tool_limit");
        assert_eq!(feedback.metadata["limit"], 2);

        // Other tools are unaffected
        assert!(detector.check("read_file", &HashMap::new(), Some(&limits)).is_none());
    }

    #[test]
    fn counts_persist_through_rejections() {
        let mut detector = no_patterns(100);
        let limits: HashMap<String, usize> = [("t".to_string(), 1)].into_iter().collect();

        assert!(detector.check("t", &HashMap::new(), Some(&limits)).is_none());
        assert!(detector.check("t", &HashMap::new(), Some(&limits)).is_some());
        assert!(detector.check("t", &HashMap::new(), Some(&limits)).is_some());

        assert_eq!(detector.tool_call_count("t"), 3);
        assert_eq!(detector.call_count("t", &HashMap::new()), 3);
        // Rejected calls never reach the history
        assert_eq!(detector.history_len(), 1);
    }

    #[test]
    fn reset_reproduces_fresh_behaviour() {
        let config = RepetitionConfig {
            exact_threshold: 2,
            pattern_detection: true,
        };
        let sequence = [
            ("a", json!({"x": 1})),
            ("b", json!({})),
            ("a", json!({"x": 1})),
            ("b", json!({})),
            ("c", json!({"y": true})),
            ("c", json!({"y": true})),
        ];
        let run = |detector: &mut RepetitionDetector| -> Vec<Option<ToolCallResult>> {
            sequence
                .iter()
                .map(|(name, value)| detector.check(name, &args(value.clone()), None))
                .collect()
        };

        let mut fresh = RepetitionDetector::new(config);
        let expected = run(&mut fresh);

        let mut reused = RepetitionDetector::new(config);
        run(&mut reused);
        reused.reset();
        assert_eq!(reused.history_len(), 0);
        assert_eq!(run(&mut reused), expected);
    }
}
