//! Command-line driver over the Deskribe engine.
//!
//! The driver maps the four engine entry points onto subcommands and owns
//! the process conventions: telemetry bootstrap, plan output as pretty
//! JSON on stdout, findings one per line on stderr, exit code `0` on
//! success (including warning-only runs) and `1` on any error.
//!
//! The driver registers no adapters itself; embedders populate an
//! [`AdapterRegistry`] with their drivers and hand it to [`run`].

pub mod cli;
pub mod telemetry;

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::process::ExitCode;

use deskribe_adapters::{AdapterRegistry, CancelToken, ValidationReport};
use deskribe_engine::{CommandTarget, Engine, EngineError};

use crate::cli::{Cli, CliCommand, PlanArgs, TargetArgs};

/// Parses arguments, runs the selected command, and returns the exit code.
pub fn run(args: impl IntoIterator<Item = OsString>, registry: AdapterRegistry) -> ExitCode {
    let cli = match <Cli as clap::Parser>::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            // Clap renders its own help and usage output.
            let _ = error.print();
            return ExitCode::from(2);
        }
    };

    telemetry::initialise(&cli.log_filter, cli.log_format);
    let engine = Engine::new(registry);
    match execute(&engine, cli.command) {
        Ok(code) => code,
        Err(error) => {
            report_error(&error);
            ExitCode::FAILURE
        }
    }
}

fn execute(engine: &Engine, command: CliCommand) -> Result<ExitCode, EngineError> {
    match command {
        CliCommand::Validate(args) => {
            let report = engine.validate(&target_of(&args))?;
            print_findings(&report);
            if report.is_valid() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        CliCommand::Plan(args) => {
            let plan = engine.plan(&target_of(&args.target), &images_of(&args))?;
            for warning in &plan.warnings {
                eprintln!("warning: {warning}");
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&plan).expect("plan serialises")
            );
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Apply(args) => {
            let plan = engine.plan(&target_of(&args.target), &images_of(&args))?;
            let outcome = engine.apply(&plan, &CancelToken::new())?;
            for warning in &outcome.warnings {
                eprintln!("warning: {warning}");
            }
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Destroy(args) => {
            let outcome = engine.destroy(&target_of(&args), &CancelToken::new())?;
            for warning in &outcome.warnings {
                eprintln!("warning: {warning}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn target_of(args: &TargetArgs) -> CommandTarget {
    CommandTarget::new(&args.manifest, &args.platform, &args.env)
}

fn images_of(args: &PlanArgs) -> BTreeMap<String, String> {
    args.images.iter().cloned().collect()
}

fn print_findings(report: &ValidationReport) {
    for error in &report.errors {
        eprintln!("error: {error}");
    }
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
}

fn report_error(error: &EngineError) {
    if let EngineError::ValidationFailed { report } = error {
        print_findings(report);
    }
    eprintln!("error: {error}");
}
