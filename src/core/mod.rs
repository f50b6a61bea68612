//! Core data structures for mpsbuild.
//!
//! This module contains the foundational types used throughout mpsbuild:
//! - Module identities and references
//! - Parsed descriptors and their dependencies
//! - Module provenance and the registry of found modules
//! - Publications and the resolved workspace configuration

pub mod coordinates;
pub mod dependency;
pub mod descriptor;
pub mod macros;
pub mod module_id;
pub mod owner;
pub mod publication;
pub mod registry;
pub mod workspace;

pub use coordinates::Coordinates;
pub use dependency::{DependencyType, ModuleDependency};
pub use descriptor::{DescriptorError, DescriptorKind, ModuleDescriptor, ModuleType};
pub use macros::Macros;
pub use module_id::{ModuleId, ModuleIdAndName};
pub use owner::ModuleOwner;
pub use publication::{IdeaPlugin, Publication};
pub use registry::{FoundModule, FoundModules, FoundPlugin, FoundProject};
pub use workspace::{StubSpec, Workspace};
