//! `mpsbuild check` command

use std::path::Path;

use anyhow::Result;

use crate::cli::CheckArgs;
use crate::commands::load_workspace;
use mpsbuild::ops::{check_workspace, format_check};
use mpsbuild::GlobalContext;

pub fn execute(args: CheckArgs, ctx: &GlobalContext, config: Option<&Path>) -> Result<()> {
    let ws = load_workspace(ctx, config)?;
    let report = check_workspace(&ws)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_check(&report));
        println!("configuration is valid");
    }
    Ok(())
}
