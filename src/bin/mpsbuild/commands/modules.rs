//! `mpsbuild modules` command

use std::path::Path;

use anyhow::Result;

use crate::cli::ModulesArgs;
use crate::commands::load_workspace;
use mpsbuild::ops::{format_modules, list_modules};
use mpsbuild::GlobalContext;

pub fn execute(args: ModulesArgs, ctx: &GlobalContext, config: Option<&Path>) -> Result<()> {
    let ws = load_workspace(ctx, config)?;
    let modules = list_modules(&ws)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&modules)?);
    } else {
        print!("{}", format_modules(&modules, ws.root()));
    }
    Ok(())
}
