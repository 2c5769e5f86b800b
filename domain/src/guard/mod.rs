//! Loop-safety policy
//!
//! Two components observe the agent loop and answer with feedback instead of
//! real execution when the loop is unproductive or over budget:
//!
//! - [`IterationLimitHandler`]: stateless thresholds over the iteration counter
//! - [`RepetitionDetector`]: per-session exact-repeat, per-tool quota and cycle detection
//!
//! Both emit [`ToolCallResult`](crate::tool::ToolCallResult)s tagged with an
//! [`Intervention`] in `metadata.intervention`.

pub mod history;
pub mod iteration;
pub mod repetition;
pub mod signature;

pub use history::{CallHistory, HISTORY_CAPACITY, HistoryEntry};
pub use iteration::{ITERATION_FEEDBACK_TOOL, IterationLimitHandler};
pub use repetition::{RepetitionConfig, RepetitionDetector};
pub use signature::CallSignature;

/// Kind of safety feedback, recorded as `metadata.intervention`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intervention {
    Repetition,
    ToolLimit,
    Pattern,
    IterationWarning,
    IterationFinalWarning,
    IterationLimit,
}

impl Intervention {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intervention::Repetition => "repetition",
            Intervention::ToolLimit => "tool_limit",
            Intervention::Pattern => "pattern",
            Intervention::IterationWarning => "iteration_warning",
            Intervention::IterationFinalWarning => "iteration_final_warning",
            Intervention::IterationLimit => "iteration_limit",
        }
    }
}

impl std::fmt::Display for Intervention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
