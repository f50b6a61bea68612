//! High-level operations.
//!
//! This module contains the implementation of mpsbuild commands.

pub mod check;
pub mod generate;
pub mod listing;
pub mod publications;

pub use check::{check_publications, CheckedGraph, ConfigError};
pub use generate::{generate, generate_stubs, mine_workspace, plan_workspace, GenerateResult};
pub use listing::{
    check_workspace, format_check, format_modules, format_publications, list_modules,
    publication_artifacts, CheckReport, ModuleSummary,
};
