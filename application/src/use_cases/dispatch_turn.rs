//! Dispatch Turn use case.
//!
//! Drives one agent loop step through the loop-safety policy and the tool
//! executor:
//!
//! 1. [`IterationLimitHandler`] decides whether the step may run at all.
//! 2. Each call is checked against the [`RepetitionDetector`] one at a time,
//!    in call order.
//! 3. Accepted calls run concurrently, each optionally bounded by a deadline.
//!
//! Results come back in call order, one per call, each correlated to its call id.

use crate::config::GuardParams;
use crate::ports::dispatch_logger::{DispatchEvent, DispatchLogger, NoDispatchLogger};
use crate::ports::tool_executor::ToolExecutorPort;
use std::sync::Arc;
use toolgate_domain::guard::{IterationLimitHandler, RepetitionDetector};
use toolgate_domain::tool::{
    entities::ToolCall,
    value_objects::{ToolCallResult, ToolErrorType},
};
use tracing::{debug, info, warn};

/// Outcome of one dispatched turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// One result per call, in call order.
    pub results: Vec<ToolCallResult>,
    /// Iteration feedback for this step (warning or limit), if any.
    pub advisory: Option<ToolCallResult>,
    /// The iteration budget is exhausted; no call was executed.
    pub halted: bool,
}

/// Use case that guards and dispatches the tool calls of one model turn.
///
/// Owns the per-session repetition state, so one instance serves one agent
/// session. Call [`reset`](Self::reset) to start a new one.
pub struct DispatchTurnUseCase {
    executor: Arc<dyn ToolExecutorPort>,
    iteration: IterationLimitHandler,
    detector: RepetitionDetector,
    params: GuardParams,
    logger: Arc<dyn DispatchLogger>,
}

impl DispatchTurnUseCase {
    pub fn new(executor: Arc<dyn ToolExecutorPort>, params: GuardParams) -> Self {
        Self {
            executor,
            iteration: params.iteration_handler(),
            detector: params.repetition_detector(),
            params,
            logger: Arc::new(NoDispatchLogger),
        }
    }

    /// Set the dispatch logger for structured event recording.
    pub fn with_logger(mut self, logger: Arc<dyn DispatchLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn params(&self) -> &GuardParams {
        &self.params
    }

    pub fn iteration_handler(&self) -> &IterationLimitHandler {
        &self.iteration
    }

    pub fn detector(&self) -> &RepetitionDetector {
        &self.detector
    }

    /// Forget all repetition state.
    pub fn reset(&mut self) {
        self.detector.reset();
    }

    /// Guard and dispatch the calls of the given iteration.
    pub async fn run(&mut self, iteration: usize, calls: &[ToolCall]) -> TurnOutcome {
        for call in calls {
            self.logger.log(DispatchEvent::tool_call(iteration, call));
        }

        let mut advisory = None;
        if let Some(feedback) = self.iteration.check(iteration) {
            info!(
                iteration,
                max_iterations = self.iteration.max_iterations(),
                "Iteration feedback: {}",
                feedback.content
            );
            self.logger
                .log(DispatchEvent::intervention(iteration, &feedback));

            if feedback.is_error {
                let results: Vec<ToolCallResult> = calls
                    .iter()
                    .map(|call| feedback.clone().for_call(&call.id))
                    .collect();
                self.log_results(iteration, &results);
                return TurnOutcome {
                    results,
                    advisory: Some(feedback),
                    halted: true,
                };
            }
            advisory = Some(feedback);
        }

        // Detector state is sequential; check every call before fanning out.
        let mut slots: Vec<Option<ToolCallResult>> = Vec::with_capacity(calls.len());
        let mut accepted = Vec::new();
        for (index, call) in calls.iter().enumerate() {
            let rejection = self.detector.check(
                &call.tool_name,
                &call.arguments,
                Some(&self.params.tool_limits),
            );
            match rejection {
                Some(feedback) => {
                    let feedback = feedback.for_call(&call.id);
                    info!(
                        tool = %call.tool_name,
                        call_id = %call.id,
                        intervention = ?feedback.metadata.get("intervention"),
                        "Tool call rejected"
                    );
                    self.logger
                        .log(DispatchEvent::intervention(iteration, &feedback));
                    slots.push(Some(feedback));
                }
                None => {
                    slots.push(None);
                    accepted.push(index);
                }
            }
        }

        debug!(
            iteration,
            accepted = accepted.len(),
            rejected = calls.len() - accepted.len(),
            "Dispatching tool calls"
        );

        let futures = accepted
            .iter()
            .map(|&index| self.execute_bounded(&calls[index]));
        let executed: Vec<_> = futures::future::join_all(futures).await;

        for (index, result) in accepted.into_iter().zip(executed) {
            slots[index] = Some(result);
        }
        let results: Vec<ToolCallResult> = slots.into_iter().flatten().collect();
        self.log_results(iteration, &results);

        TurnOutcome {
            results,
            advisory,
            halted: false,
        }
    }

    async fn execute_bounded(&self, call: &ToolCall) -> ToolCallResult {
        let Some(limit) = self.params.call_timeout else {
            return self.executor.execute(call).await;
        };

        match tokio::time::timeout(limit, self.executor.execute(call)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    tool = %call.tool_name,
                    call_id = %call.id,
                    timeout_ms = limit.as_millis() as u64,
                    "Tool call timed out"
                );
                ToolCallResult::failure(
                    &call.tool_name,
                    ToolErrorType::Timeout,
                    format!(
                        "Tool '{}' did not finish within {}ms",
                        call.tool_name,
                        limit.as_millis()
                    ),
                )
                .for_call(&call.id)
            }
        }
    }

    fn log_results(&self, iteration: usize, results: &[ToolCallResult]) {
        for result in results {
            self.logger.log(DispatchEvent::tool_result(iteration, result));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use toolgate_domain::tool::entities::ToolSpec;

    // ==================== Test Mocks ====================

    /// Echoes the tool name and arguments; sleeps for tools listed in `delays`.
    struct MockExecutor {
        spec: ToolSpec,
        executed: AtomicUsize,
        delays: HashMap<String, Duration>,
    }

    impl MockExecutor {
        fn new() -> Self {
            Self {
                spec: ToolSpec::new(),
                executed: AtomicUsize::new(0),
                delays: HashMap::new(),
            }
        }

        fn with_delay(mut self, tool: &str, delay: Duration) -> Self {
            self.delays.insert(tool.to_string(), delay);
            self
        }

        fn executed(&self) -> usize {
            self.executed.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ToolExecutorPort for MockExecutor {
        fn tool_spec(&self) -> &ToolSpec {
            &self.spec
        }

        async fn execute(&self, call: &ToolCall) -> ToolCallResult {
            self.executed.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delays.get(&call.tool_name) {
                tokio::time::sleep(*delay).await;
            }
            let content = format!(
                "{}:{}",
                call.tool_name,
                serde_json::to_string(&call.arguments).unwrap()
            );
            ToolCallResult::success(&call.tool_name, content).for_call(&call.id)
        }
    }

    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<&'static str>>,
    }

    impl DispatchLogger for RecordingLogger {
        fn log(&self, event: DispatchEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }
    }

    fn call(id: &str, tool: &str, arg: i64) -> ToolCall {
        ToolCall::new(id, tool).with_arg("n", arg)
    }

    fn use_case(executor: &Arc<MockExecutor>, params: GuardParams) -> DispatchTurnUseCase {
        DispatchTurnUseCase::new(executor.clone(), params)
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_results_in_call_order() {
        let executor = Arc::new(MockExecutor::new());
        let mut uc = use_case(&executor, GuardParams::default());

        let calls = vec![call("c1", "a", 1), call("c2", "b", 2), call("c3", "c", 3)];
        let outcome = uc.run(1, &calls).await;

        assert!(!outcome.halted);
        assert!(outcome.advisory.is_none());
        let ids: Vec<_> = outcome.results.iter().map(|r| r.tool_call_id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
        assert_eq!(outcome.results[1].content, "b:{\"n\":2}");
        assert_eq!(executor.executed(), 3);
    }

    #[tokio::test]
    async fn test_repeated_call_rejected_within_turn() {
        let executor = Arc::new(MockExecutor::new());
        let mut uc = use_case(&executor, GuardParams::default().with_pattern_detection(false));

        let calls = vec![call("c1", "grep", 1), call("c2", "grep", 1), call("c3", "grep", 1)];
        let outcome = uc.run(1, &calls).await;

        assert!(outcome.results[0].is_success());
        assert!(outcome.results[1].is_success());
        let rejected = &outcome.results[2];
        assert_eq!(rejected.error_type(), Some(ToolErrorType::InvalidArgs));
        assert_eq!(rejected.tool_call_id, "c3");
        assert_eq!(rejected.metadata["intervention"], "repetition");
        assert_eq!(executor.executed(), 2);
    }

    #[tokio::test]
    async fn test_tool_limit_spans_turns() {
        let executor = Arc::new(MockExecutor::new());
        let mut uc = use_case(&executor, GuardParams::default().with_tool_limit("search", 2));

        uc.run(1, &[call("c1", "search", 1)]).await;
        uc.run(2, &[call("c2", "search", 2)]).await;
        let outcome = uc.run(3, &[call("c3", "search", 3)]).await;

        let rejected = &outcome.results[0];
        assert!(rejected.is_error);
        assert_eq!(rejected.metadata["intervention"], "tool_limit");
        assert!(rejected.content.contains("limit of 2"));
        assert_eq!(executor.executed(), 2);
    }

    #[tokio::test]
    async fn test_iteration_limit_halts_turn() {
        let executor = Arc::new(MockExecutor::new());
        let mut uc = use_case(&executor, GuardParams::default().with_max_iterations(5));

        let calls = vec![call("c1", "a", 1), call("c2", "b", 2)];
        let outcome = uc.run(5, &calls).await;

        assert!(outcome.halted);
        assert_eq!(outcome.results.len(), 2);
        for (result, call) in outcome.results.iter().zip(&calls) {
            assert_eq!(result.tool_call_id, call.id);
            assert_eq!(result.error_type(), Some(ToolErrorType::InvalidArgs));
            assert_eq!(result.metadata["intervention"], "iteration_limit");
        }
        assert!(outcome.advisory.is_some_and(|a| a.is_error));
        assert_eq!(executor.executed(), 0);
    }

    #[tokio::test]
    async fn test_iteration_warning_is_advisory() {
        let executor = Arc::new(MockExecutor::new());
        let mut uc = use_case(&executor, GuardParams::default().with_max_iterations(10));

        let outcome = uc.run(8, &[call("c1", "a", 1)]).await;

        assert!(!outcome.halted);
        let advisory = outcome.advisory.unwrap();
        assert!(!advisory.is_error);
        assert_eq!(advisory.metadata["intervention"], "iteration_warning");
        assert!(outcome.results[0].is_success());
        assert_eq!(executor.executed(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_timeout_produces_timeout_result() {
        let executor =
            Arc::new(MockExecutor::new().with_delay("slow", Duration::from_secs(60)));
        let params = GuardParams::default().with_call_timeout(Some(Duration::from_secs(1)));
        let mut uc = use_case(&executor, params);

        let calls = vec![call("c1", "slow", 1), call("c2", "fast", 1)];
        let outcome = uc.run(1, &calls).await;

        assert_eq!(outcome.results[0].error_type(), Some(ToolErrorType::Timeout));
        assert_eq!(outcome.results[0].tool_call_id, "c1");
        assert!(outcome.results[0].is_consistent());
        assert!(outcome.results[1].is_success());
    }

    #[tokio::test]
    async fn test_reset_forgets_history() {
        let executor = Arc::new(MockExecutor::new());
        let params = GuardParams::default().with_exact_threshold(2);
        let mut uc = use_case(&executor, params);

        uc.run(1, &[call("c1", "a", 1)]).await;
        let second = uc.run(2, &[call("c2", "a", 1)]).await;
        assert!(second.results[0].is_error);

        uc.reset();
        let after_reset = uc.run(3, &[call("c3", "a", 1)]).await;
        assert!(after_reset.results[0].is_success());
        assert_eq!(uc.detector().history_len(), 1);
    }

    #[tokio::test]
    async fn test_events_are_logged() {
        let executor = Arc::new(MockExecutor::new());
        let logger = Arc::new(RecordingLogger::default());
        let mut uc = use_case(&executor, GuardParams::default().with_exact_threshold(2))
            .with_logger(logger.clone());

        uc.run(1, &[call("c1", "a", 1), call("c2", "a", 1)]).await;

        let events = logger.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec!["tool_call", "tool_call", "intervention", "tool_result", "tool_result"]
        );
    }
}
