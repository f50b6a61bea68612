//! mpsbuild CLI - build script generation for MPS projects

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use mpsbuild::builder::PlanError;
use mpsbuild::core::DescriptorError;
use mpsbuild::miner::MinerError;
use mpsbuild::ops::ConfigError;
use mpsbuild::resolver::ResolveError;
use mpsbuild::util::diagnostic::{emit, Diagnostic};
use mpsbuild::GlobalContext;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli, color) {
        match diagnostic(&e) {
            Some(diagnostic) => emit(&diagnostic, color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, color: bool) -> Result<()> {
    let filter = if cli.verbose {
        EnvFilter::new("mpsbuild=debug")
    } else {
        EnvFilter::new("mpsbuild=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(false)
        .without_time()
        .init();

    let ctx = GlobalContext::new()?;
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Generate(args) => commands::generate::execute(args, &ctx, config),
        Commands::Check(args) => commands::check::execute(args, &ctx, config),
        Commands::Modules(args) => commands::modules::execute(args, &ctx, config),
        Commands::Publications(args) => commands::publications::execute(args, &ctx, config),
        Commands::Stubs(args) => commands::stubs::execute(args, &ctx, config),
    }
}

/// Find a domain error anywhere in the chain and describe it, keeping the
/// outermost context line.
fn diagnostic(err: &anyhow::Error) -> Option<Diagnostic> {
    let found = err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<ConfigError>() {
            Some(e.to_diagnostic())
        } else if let Some(e) = cause.downcast_ref::<ResolveError>() {
            Some(e.to_diagnostic())
        } else if let Some(e) = cause.downcast_ref::<PlanError>() {
            Some(e.to_diagnostic())
        } else if let Some(e) = cause.downcast_ref::<MinerError>() {
            Some(e.to_diagnostic())
        } else {
            cause.downcast_ref::<DescriptorError>().map(|e| e.to_diagnostic())
        }
    })?;

    let outer = err.to_string();
    if err.chain().count() > 1 {
        Some(found.with_context(outer))
    } else {
        Some(found)
    }
}
