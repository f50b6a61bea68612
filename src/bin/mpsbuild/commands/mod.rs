//! Command implementations

pub mod check;
pub mod generate;
pub mod modules;
pub mod publications;
pub mod stubs;

use std::path::Path;

use anyhow::Result;

use mpsbuild::core::Workspace;
use mpsbuild::GlobalContext;

/// Locate and load the workspace configuration.
pub fn load_workspace(ctx: &GlobalContext, config: Option<&Path>) -> Result<Workspace> {
    let path = ctx.config_path(config)?;
    Workspace::new(&path)
}
