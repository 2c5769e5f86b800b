//! Iteration budget policy.
//!
//! [`IterationLimitHandler`] looks at the loop counter before each step and
//! answers with feedback in the same [`ToolCallResult`] shape a tool would
//! produce:
//!
//! | Iteration | Feedback | `is_error` |
//! |-----------|----------|------------|
//! | `== floor(0.8 * max)` | approaching the limit | no |
//! | `== floor(0.9 * max)` | final warning, start summarizing | no |
//! | `>= max` | limit reached, no further tools | yes (`INVALID_ARGS`) |
//!
//! The two warnings are exact-match checks and fire at most once per run; the
//! limit check is monotone and fires on every call past the budget. With a
//! very small budget the thresholds may coincide or fall below 1 and never
//! trigger; when they coincide the final warning is reported.

use crate::tool::value_objects::{ToolCallResult, ToolErrorType};

use super::Intervention;

/// Tool name carried by iteration feedback.
pub const ITERATION_FEEDBACK_TOOL: &str = "iteration_limit";

/// Stateless threshold evaluator over the loop counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationLimitHandler {
    max_iterations: usize,
    warning_threshold: usize,
    final_warning_threshold: usize,
}

impl IterationLimitHandler {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            warning_threshold: fraction_of(max_iterations, 8),
            final_warning_threshold: fraction_of(max_iterations, 9),
        }
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn warning_threshold(&self) -> usize {
        self.warning_threshold
    }

    pub fn final_warning_threshold(&self) -> usize {
        self.final_warning_threshold
    }

    /// Feedback for the given iteration, if any.
    pub fn check(&self, current_iteration: usize) -> Option<ToolCallResult> {
        if self.is_at_limit(current_iteration) {
            let message = format!(
                "Iteration limit reached ({}/{}). No further tools will run. \
                 Produce your final summary of the work done so far now.",
                current_iteration, self.max_iterations
            );
            return Some(
                ToolCallResult::failure(ITERATION_FEEDBACK_TOOL, ToolErrorType::InvalidArgs, message)
                    .with_user_display(format!(
                        "Iteration limit of {} reached",
                        self.max_iterations
                    ))
                    .with_metadata("intervention", Intervention::IterationLimit.as_str())
                    .with_metadata("current_iteration", current_iteration)
                    .with_metadata("max_iterations", self.max_iterations),
            );
        }

        let (intervention, message) = if current_iteration == self.final_warning_threshold {
            (
                Intervention::IterationFinalWarning,
                format!(
                    "Final warning: iteration {} of {} ({} remaining). \
                     Stop exploring and summarize your results.",
                    current_iteration,
                    self.max_iterations,
                    self.remaining(current_iteration)
                ),
            )
        } else if current_iteration == self.warning_threshold {
            (
                Intervention::IterationWarning,
                format!(
                    "Approaching the iteration limit: iteration {} of {} ({} remaining). \
                     Prioritize the remaining work.",
                    current_iteration,
                    self.max_iterations,
                    self.remaining(current_iteration)
                ),
            )
        } else {
            return None;
        };

        Some(
            ToolCallResult::success(ITERATION_FEEDBACK_TOOL, message)
                .with_user_display(format!(
                    "{} iterations remaining",
                    self.remaining(current_iteration)
                ))
                .with_metadata("intervention", intervention.as_str())
                .with_metadata("current_iteration", current_iteration)
                .with_metadata("max_iterations", self.max_iterations),
        )
    }

    pub fn is_at_limit(&self, current_iteration: usize) -> bool {
        current_iteration >= self.max_iterations
    }

    pub fn remaining(&self, current_iteration: usize) -> usize {
        self.max_iterations.saturating_sub(current_iteration)
    }
}

/// `floor(max * tenths / 10)` without intermediate overflow.
fn fraction_of(max: usize, tenths: u128) -> usize {
    (max as u128 * tenths / 10) as usize
}
