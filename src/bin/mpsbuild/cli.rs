//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// mpsbuild - Generate build scripts for JetBrains MPS projects
#[derive(Parser)]
#[command(name = "mpsbuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to mpsbuild.toml (defaults to searching upward from the current directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the build description, the build plan and stub solutions
    Generate(GenerateArgs),

    /// Check the publication configuration without writing anything
    Check(CheckArgs),

    /// List all discovered modules
    Modules(ModulesArgs),

    /// Show what each publication packages and depends on
    Publications(PublicationsArgs),

    /// Write the stub solutions for configured libraries
    Stubs(StubsArgs),
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Write outputs to this directory instead of `build.build_dir`
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ModulesArgs {
    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct PublicationsArgs {
    /// Print the packaging view as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct StubsArgs {}
