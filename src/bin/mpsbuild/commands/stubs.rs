//! `mpsbuild stubs` command

use std::path::Path;

use anyhow::Result;

use crate::cli::StubsArgs;
use crate::commands::load_workspace;
use mpsbuild::ops::generate_stubs;
use mpsbuild::GlobalContext;

pub fn execute(_args: StubsArgs, ctx: &GlobalContext, config: Option<&Path>) -> Result<()> {
    let ws = load_workspace(ctx, config)?;
    let paths = generate_stubs(&ws)?;

    if paths.is_empty() {
        println!("no [[stubs]] configured");
    }
    for path in paths {
        println!("wrote {}", path.display());
    }
    Ok(())
}
