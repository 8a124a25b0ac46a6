//! CLI argument definitions for the Deskribe driver.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::telemetry::LogFormat;

/// Command-line interface for the Deskribe orchestrator.
#[derive(Parser, Debug)]
#[command(name = "deskribe", version, about = "Intent-as-code orchestrator")]
pub struct Cli {
    /// Log filter expression (tracing `EnvFilter` syntax).
    #[arg(long, default_value = "info", global = true)]
    pub log_filter: String,
    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,
    /// The command to run.
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Engine commands exposed by the driver.
#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Statically checks a manifest against the platform configuration.
    Validate(TargetArgs),
    /// Computes and prints the execution plan as JSON.
    Plan(PlanArgs),
    /// Plans, provisions infrastructure, and deploys the workload.
    Apply(PlanArgs),
    /// Tears down the workload and its infrastructure.
    Destroy(TargetArgs),
}

/// Arguments identifying the documents and environment to operate on.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Path of the developer manifest.
    #[arg(long)]
    pub manifest: PathBuf,
    /// Directory holding `base.json` and `envs/`.
    #[arg(long)]
    pub platform: PathBuf,
    /// Environment name to target.
    #[arg(long)]
    pub env: String,
}

/// Arguments for commands that compute a plan.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    /// Container image override, `<service>=<image>`; repeatable.
    #[arg(long = "image", value_name = "SERVICE=IMAGE", value_parser = parse_image_override)]
    pub images: Vec<(String, String)>,
}

/// Parses a `<service>=<image>` override pair.
fn parse_image_override(value: &str) -> Result<(String, String), String> {
    let (service, image) = value
        .split_once('=')
        .ok_or_else(|| format!("expected <service>=<image>, got '{value}'"))?;
    if service.is_empty() || image.is_empty() {
        return Err(format!("expected <service>=<image>, got '{value}'"));
    }
    Ok((service.to_owned(), image.to_owned()))
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parses_plan_with_image_overrides() {
        let cli = Cli::try_parse_from([
            "deskribe",
            "plan",
            "--manifest",
            "manifest.json",
            "--platform",
            "platform",
            "--env",
            "dev",
            "--image",
            "api=registry/svc:1.2.3",
        ])
        .expect("parse plan command");
        let CliCommand::Plan(args) = cli.command else {
            panic!("expected plan command");
        };
        assert_eq!(args.target.env, "dev");
        assert_eq!(
            args.images,
            vec![("api".to_owned(), "registry/svc:1.2.3".to_owned())]
        );
    }

    #[test]
    fn rejects_malformed_image_override() {
        let result = Cli::try_parse_from([
            "deskribe",
            "plan",
            "--manifest",
            "manifest.json",
            "--platform",
            "platform",
            "--env",
            "dev",
            "--image",
            "no-separator",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn destroy_takes_target_arguments_only() {
        let cli = Cli::try_parse_from([
            "deskribe",
            "destroy",
            "--manifest",
            "manifest.json",
            "--platform",
            "platform",
            "--env",
            "prod",
        ])
        .expect("parse destroy command");
        assert!(matches!(cli.command, CliCommand::Destroy(_)));
    }
}
