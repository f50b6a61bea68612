//! `mpsbuild generate` command

use std::path::Path;

use anyhow::Result;

use crate::cli::GenerateArgs;
use crate::commands::load_workspace;
use mpsbuild::ops::generate;
use mpsbuild::GlobalContext;

pub fn execute(args: GenerateArgs, ctx: &GlobalContext, config: Option<&Path>) -> Result<()> {
    let mut ws = load_workspace(ctx, config)?;
    if let Some(build_dir) = args.build_dir {
        ws = ws.with_build_dir(ctx.cwd().join(build_dir));
    }

    let result = generate(&ws)?;

    println!(
        "Generated {} modules in {} chunks",
        result.plan.module_count(),
        result.plan.chunks.len()
    );
    println!("  build description: {}", result.script_path.display());
    println!("  build plan: {}", result.plan_path.display());
    if !result.stub_paths.is_empty() {
        println!("  stub solutions: {}", result.stub_paths.len());
    }
    Ok(())
}
