//! CLI entrypoint for the Deskribe orchestrator.
//!
//! The stock binary runs with an empty adapter registry; organisations
//! embed the engine behind their own binary and register concrete backend
//! and runtime drivers before calling [`deskribe_cli::run`].

use std::process::ExitCode;

use deskribe_adapters::AdapterRegistry;

fn main() -> ExitCode {
    deskribe_cli::run(std::env::args_os(), AdapterRegistry::new())
}
