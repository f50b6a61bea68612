//! Module dependency declarations.
//!
//! A [`ModuleDependency`] describes one edge a descriptor declares towards
//! another module, together with how strictly it must be resolved.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::module_id::{ModuleId, ModuleIdAndName};

/// Why one module needs another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    /// Explicit `<dependency>`; the target is needed on the classpath.
    Classpath,
    /// Needed to load this module's models.
    Model,
    /// Template dependency between generators.
    Generator,
    /// A language or devkit used by this module's models.
    UseLanguageOrDevkit,
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DependencyType::Classpath => "classpath",
            DependencyType::Model => "model",
            DependencyType::Generator => "generator",
            DependencyType::UseLanguageOrDevkit => "use-language-or-devkit",
        };
        f.write_str(s)
    }
}

/// A dependency of one module on another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDependency {
    /// Target module id
    pub id: ModuleId,

    /// Name the target was referenced by, if any
    pub name: Option<String>,

    /// Dependency type
    #[serde(rename = "type")]
    pub kind: DependencyType,

    /// Whether an unresolvable target is silently dropped
    pub ignore_if_missing: bool,
}

impl ModuleDependency {
    /// Create a dependency on the referenced module.
    pub fn new(target: ModuleIdAndName, kind: DependencyType, ignore_if_missing: bool) -> Self {
        ModuleDependency {
            id: target.id,
            name: target.name,
            kind,
            ignore_if_missing,
        }
    }

    /// A mandatory classpath dependency.
    pub fn classpath(target: ModuleIdAndName) -> Self {
        Self::new(target, DependencyType::Classpath, false)
    }

    /// A language or devkit usage.
    pub fn usage(target: ModuleIdAndName, ignore_if_missing: bool) -> Self {
        Self::new(target, DependencyType::UseLanguageOrDevkit, ignore_if_missing)
    }

    /// The referenced module.
    pub fn target(&self) -> ModuleIdAndName {
        ModuleIdAndName::new(self.id.clone(), self.name.clone())
    }

    /// Whether this is a language or devkit usage rather than a module edge.
    pub fn is_usage(&self) -> bool {
        self.kind == DependencyType::UseLanguageOrDevkit
    }
}

impl fmt::Display for ModuleDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.target(), self.kind)
    }
}
