//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for toolgate
#[derive(Parser, Debug)]
#[command(name = "toolgate")]
#[command(author, version, about = "Guarded tool-call dispatch for agent loops")]
#[command(long_about = r#"
toolgate dispatches LLM tool calls to local tools and guards the agent loop
against runaway iteration and repetitive calls.

Configuration is loaded from (in priority order):
1. TOOLGATE_* environment variables (e.g. TOOLGATE_GUARD__MAX_ITERATIONS=20)
2. --config <path>     Explicit config file
3. ./toolgate.toml     Project-level config
4. ~/.config/toolgate/config.toml   Global config

Example:
  toolgate replay turns.jsonl
  toolgate -vv replay --max-iterations 10 --log-file dispatch.jsonl turns.jsonl
  toolgate tools
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a JSONL transcript of tool-call turns through the guarded executor
    ///
    /// Each non-empty line is one model turn: a JSON array of
    /// `{"id": ..., "name": ..., "arguments": {...}}` objects. Every result
    /// is printed to stdout as one JSON line.
    Replay {
        /// Transcript file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Override guard.max_iterations
        #[arg(long, value_name = "N")]
        max_iterations: Option<usize>,

        /// Append dispatch events to this JSONL file
        #[arg(long, value_name = "PATH")]
        log_file: Option<PathBuf>,
    },

    /// Print the JSON schema of the registered tools
    Tools,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_replay() {
        let cli = Cli::try_parse_from([
            "toolgate",
            "-vv",
            "replay",
            "--max-iterations",
            "10",
            "--log-file",
            "out.jsonl",
            "turns.jsonl",
            "--no-config",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert!(cli.no_config);
        match cli.command {
            Command::Replay {
                file,
                max_iterations,
                log_file,
            } => {
                assert_eq!(file, PathBuf::from("turns.jsonl"));
                assert_eq!(max_iterations, Some(10));
                assert_eq!(log_file, Some(PathBuf::from("out.jsonl")));
            }
            Command::Tools => panic!("expected replay"),
        }
    }

    #[test]
    fn test_parse_tools() {
        let cli = Cli::try_parse_from(["toolgate", "tools", "--config", "x.toml"]).unwrap();
        assert!(matches!(cli.command, Command::Tools));
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_replay_requires_file() {
        assert!(Cli::try_parse_from(["toolgate", "replay"]).is_err());
    }
}
