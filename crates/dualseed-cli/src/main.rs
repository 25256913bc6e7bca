//! dualseed - seeding pipeline entry point

use clap::Parser;
use dualseed_cli::{Cli, Pipeline, PipelineError};
use dualseed_cli::pipeline::ProcessInvoker;
use dualseed_common::logging::{init_logging, LogConfig, LogLevel};
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    let log_config = LogConfig::new("dualseed").with_level(level);
    let log_config = match log_config.clone().with_env_overrides() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: ignoring logging overrides: {e}");
            log_config
        },
    };
    // The pipeline still runs without logging
    let _guard = match init_logging(&log_config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {e}");
            None
        },
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Pipeline failed");
            eprintln!("Error: {e}");
            ExitCode::from(exit_status(&e))
        }
    }
}

fn run(cli: &Cli) -> dualseed_cli::Result<()> {
    let options = cli.options()?;
    let config = cli.pipeline_config()?;
    let mut pipeline = Pipeline::new(&cli.root, config, options, ProcessInvoker::new())?;
    pipeline.run()
}

// Exit statuses outside 1..=255 collapse to 1
fn exit_status(err: &PipelineError) -> u8 {
    u8::try_from(err.exit_code())
        .ok()
        .filter(|code| *code != 0)
        .unwrap_or(1)
}
