//! Publications: named groups of modules built and packaged together.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

use crate::core::registry::FoundModule;

/// Name that selects every publication on the command line.
pub const RESERVED_PUBLICATION_NAME: &str = "all";

/// A user-declared publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Publication {
    pub name: String,

    /// Module names included explicitly
    pub module_names: BTreeSet<String>,

    /// Absolute folders whose modules are all included
    pub include_paths: Vec<PathBuf>,

    pub idea_plugins: Vec<IdeaPlugin>,
}

/// An IDEA plugin shipped with a publication, built from one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdeaPlugin {
    /// Name of the solution implementing the plugin
    pub implementation_module: String,

    pub description: Option<String>,

    /// Contents of a hand-written `plugin.xml`, used instead of a generated one
    pub plugin_xml: Option<String>,
}

impl IdeaPlugin {
    pub fn new(implementation_module: impl Into<String>) -> Self {
        IdeaPlugin {
            implementation_module: implementation_module.into(),
            description: None,
            plugin_xml: None,
        }
    }
}

impl Publication {
    pub fn new(name: impl Into<String>) -> Self {
        Publication {
            name: name.into(),
            module_names: BTreeSet::new(),
            include_paths: Vec::new(),
            idea_plugins: Vec::new(),
        }
    }

    pub fn with_module(mut self, name: impl Into<String>) -> Self {
        self.module_names.insert(name.into());
        self
    }

    pub fn with_include_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.include_paths.push(path.into());
        self
    }

    pub fn with_idea_plugin(mut self, plugin: IdeaPlugin) -> Self {
        self.idea_plugins.push(plugin);
        self
    }

    /// Whether `module` lies below one of the included paths.
    pub fn includes_path_of(&self, module: &FoundModule) -> bool {
        let path = module.owner.path();
        self.include_paths.iter().any(|p| path.starts_with(p))
    }

    /// Name usable in artifact file names.
    pub fn artifact_name(&self) -> String {
        to_artifact_name(&self.name)
    }
}

/// Replace everything outside `[A-Za-z0-9_.-]` with `_` and lowercase.
pub fn to_artifact_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::ModuleDescriptor;
    use crate::core::owner::ModuleOwner;

    #[test]
    fn test_artifact_name() {
        assert_eq!(to_artifact_name("My Lib/Core"), "my_lib_core");
        assert_eq!(to_artifact_name("org.example-1_x"), "org.example-1_x");
    }

    #[test]
    fn test_includes_path_of() {
        let descriptor =
            ModuleDescriptor::parse(r#"<solution name="a" uuid="1"/>"#, "a.msd").unwrap();
        let module = FoundModule::new(
            descriptor,
            ModuleOwner::source("/p/code/core/a/a.msd"),
            PathBuf::from("/p/code/core/a/a.msd"),
        );

        let publication = Publication::new("core").with_include_path("/p/code/core");
        assert!(publication.includes_path_of(&module));

        let other = Publication::new("ui").with_include_path("/p/code/co");
        assert!(!other.includes_path_of(&module));
    }
}
