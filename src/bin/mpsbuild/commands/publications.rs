//! `mpsbuild publications` command

use std::path::Path;

use anyhow::Result;

use crate::cli::PublicationsArgs;
use crate::commands::load_workspace;
use mpsbuild::ops::{format_publications, publication_artifacts};
use mpsbuild::GlobalContext;

pub fn execute(args: PublicationsArgs, ctx: &GlobalContext, config: Option<&Path>) -> Result<()> {
    let ws = load_workspace(ctx, config)?;
    let publications = publication_artifacts(&ws)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&publications)?);
    } else {
        print!("{}", format_publications(&publications, ws.root()));
    }
    Ok(())
}
