//! mpsbuild - build script generation for JetBrains MPS projects
//!
//! This crate discovers MPS modules in source trees, jars and IDE plugin
//! folders, resolves the dependencies between them, checks that the
//! configured publications can be built independently and writes an
//! ordered build description.

pub mod builder;
pub mod core;
pub mod graph;
pub mod miner;
pub mod ops;
pub mod resolver;
pub mod util;

pub use core::{
    descriptor::ModuleDescriptor, module_id::ModuleId, module_id::ModuleIdAndName,
    registry::FoundModule, registry::FoundModules, workspace::Workspace,
};

pub use builder::BuildPlan;
pub use miner::ModulesMiner;
pub use resolver::ModuleResolver;
pub use util::context::GlobalContext;
