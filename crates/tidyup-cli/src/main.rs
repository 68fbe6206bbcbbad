mod commands;
mod logging;
mod progress;
mod prompt;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use colored::*;
use commands::Cli;
use dotenv::dotenv;
use progress::CliReporter;
use prompt::TerminalChooser;
use tidyup_core::{AppConfig, Mode, Orchestrator};
use tracing::error;

fn main() -> ExitCode {
    dotenv().ok();

    // An unknown mode exits here with clap's usage error, before any scanning.
    let args = Cli::parse();

    let _guard = logging::init_logger();

    let config = match tidyup_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match run(&config, args.mode.into()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &AppConfig, mode: Mode) -> anyhow::Result<()> {
    let reporter = CliReporter::new();
    let mut chooser = TerminalChooser::stdio();
    let mut orchestrator = Orchestrator::new(config, &mut chooser, &reporter);

    let report = orchestrator
        .run(mode)
        .with_context(|| format!("{} run did not complete", mode))?;

    if report.nothing_to_do() {
        match mode {
            Mode::Replay => println!(
                "No actions loaded. Run in analyze, auto, select, or json mode first."
            ),
            _ => println!("No actions suggested."),
        }
        return Ok(());
    }

    if mode == Mode::Json {
        println!(
            "JSON generation complete ({} actions). Use 'replay' mode to execute actions.",
            report.plan.total()
        );
        return Ok(());
    }

    if let Some(persist_error) = &report.persist_error {
        eprintln!("{} {}", "Actions were not saved:".yellow(), persist_error);
    }
    println!(
        "Processing complete: {} succeeded, {} failed, {} skipped.",
        report.succeeded().to_string().green(),
        report.failed().to_string().red(),
        report.skipped().to_string().yellow(),
    );

    Ok(())
}
