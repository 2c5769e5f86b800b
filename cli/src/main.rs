//! CLI entrypoint for toolgate
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod commands;
mod replay;

use anyhow::{Context, Result, bail};
use clap::Parser;
use commands::{Cli, Command};
use std::path::PathBuf;
use std::sync::Arc;
use toolgate_application::{
    DispatchLogger, DispatchTurnUseCase, NoDispatchLogger, ToolExecutorPort, ToolSchemaPort,
};
use toolgate_infrastructure::{
    ConfigLoader, FileConfig, JsonSchemaToolConverter, JsonlDispatchLogger, ToolExecutor,
    builtin_tools,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    // stdout carries results; diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    let executor = build_executor()?;

    match cli.command {
        Command::Tools => {
            let schemas = JsonSchemaToolConverter.all_tools_schema(executor.tool_spec());
            println!("{}", serde_json::to_string_pretty(&schemas)?);
        }
        Command::Replay {
            file,
            max_iterations,
            log_file,
        } => {
            let mut params = config.to_guard_params();
            if let Some(max) = max_iterations {
                params = params.with_max_iterations(max);
            }
            if params.max_iterations == 0 {
                bail!("--max-iterations must be at least 1");
            }

            let logger = open_dispatch_log(log_file.or_else(|| config.logging.dispatch_log.clone()))?;

            info!(
                file = %file.display(),
                max_iterations = params.max_iterations,
                "Starting replay"
            );

            let transcript = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read transcript {}", file.display()))?;

            let mut use_case =
                DispatchTurnUseCase::new(Arc::new(executor), params).with_logger(logger);
            let mut stdout = std::io::stdout().lock();
            let summary = replay::replay(&mut use_case, &transcript, &mut stdout)
                .await
                .with_context(|| format!("Failed to replay {}", file.display()))?;

            info!(
                turns = summary.turns,
                calls = summary.calls,
                errors = summary.errors,
                halted = summary.halted,
                "Replay finished"
            );
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }

    let (config, warnings) = ConfigLoader::load_validated(cli.config.as_deref())?;
    for issue in warnings {
        warn!("{}", issue.message);
    }
    Ok(config)
}

fn build_executor() -> Result<ToolExecutor> {
    let mut executor = ToolExecutor::new();
    for tool in builtin_tools() {
        executor.register_core_tool_arc(tool)?;
    }
    Ok(executor)
}

fn open_dispatch_log(path: Option<PathBuf>) -> Result<Arc<dyn DispatchLogger>> {
    let Some(path) = path else {
        return Ok(Arc::new(NoDispatchLogger));
    };
    match JsonlDispatchLogger::new(&path) {
        Some(logger) => {
            info!(path = %logger.path().display(), "Writing dispatch log");
            Ok(Arc::new(logger))
        }
        None => bail!("Could not open dispatch log {}", path.display()),
    }
}
