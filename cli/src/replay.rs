//! Transcript replay: feeds recorded tool-call turns through the guarded
//! dispatch use case and writes every result as a JSON line.

use anyhow::{Context, Result};
use std::io::Write;
use toolgate_application::DispatchTurnUseCase;
use toolgate_domain::tool::{entities::ToolCall, value_objects::ToolCallResult};
use tracing::{debug, info};

/// Summary of a finished replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub turns: usize,
    pub calls: usize,
    pub errors: usize,
    pub halted: bool,
}

/// Parse one transcript line into the calls of a turn.
pub fn parse_turn(line: &str) -> Result<Vec<ToolCall>> {
    serde_json::from_str(line).context("expected a JSON array of tool calls")
}

/// Replay every turn in `transcript`, stopping after a halted turn.
pub async fn replay(
    use_case: &mut DispatchTurnUseCase,
    transcript: &str,
    out: &mut impl Write,
) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary {
        turns: 0,
        calls: 0,
        errors: 0,
        halted: false,
    };

    let turns = transcript
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    for (line_index, line) in turns {
        let calls = parse_turn(line).with_context(|| format!("line {}", line_index + 1))?;
        summary.turns += 1;
        summary.calls += calls.len();
        debug!(turn = summary.turns, calls = calls.len(), "Replaying turn");

        let outcome = use_case.run(summary.turns, &calls).await;

        // Halted turns already carry the feedback on every result.
        if let Some(advisory) = &outcome.advisory
            && (!outcome.halted || outcome.results.is_empty())
        {
            write_result(out, advisory)?;
        }
        for result in &outcome.results {
            if result.is_error {
                summary.errors += 1;
            }
            write_result(out, result)?;
        }

        if outcome.halted {
            info!(turn = summary.turns, "Iteration budget exhausted, stopping replay");
            summary.halted = true;
            break;
        }
    }

    Ok(summary)
}

fn write_result(out: &mut impl Write, result: &ToolCallResult) -> Result<()> {
    serde_json::to_writer(&mut *out, result)?;
    writeln!(out)?;
    Ok(())
}
