//! Module provenance.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// The plugin a library jar was found in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PluginRef {
    pub id: String,
    pub path: PathBuf,
}

/// Where a module was physically found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModuleOwner {
    /// A descriptor file in a source tree.
    Source {
        /// The descriptor file
        path: PathBuf,
        /// Folder shown in the IDE project view, from `.mps/modules.xml`
        virtual_folder: Option<String>,
    },

    /// A jar containing compiled modules.
    Library {
        /// The jar file
        path: PathBuf,
        plugin: Option<PluginRef>,
    },

    /// A descriptor file below an unpacked IDE plugin folder.
    Plugin { path: PathBuf, plugin_id: String },
}

impl ModuleOwner {
    /// Owner of a descriptor file found in a source tree.
    pub fn source(path: impl Into<PathBuf>) -> Self {
        ModuleOwner::Source {
            path: path.into(),
            virtual_folder: None,
        }
    }

    /// The file or folder this owner stands for.
    pub fn path(&self) -> &Path {
        match self {
            ModuleOwner::Source { path, .. }
            | ModuleOwner::Library { path, .. }
            | ModuleOwner::Plugin { path, .. } => path,
        }
    }

    pub fn is_source(&self) -> bool {
        matches!(self, ModuleOwner::Source { .. })
    }

    /// Id of the containing plugin, if any.
    pub fn plugin_id(&self) -> Option<&str> {
        match self {
            ModuleOwner::Plugin { plugin_id, .. } => Some(plugin_id),
            ModuleOwner::Library {
                plugin: Some(plugin),
                ..
            } => Some(&plugin.id),
            _ => None,
        }
    }

    /// Plugin reference to hand down to jars found below this owner.
    pub fn plugin_ref(&self) -> Option<PluginRef> {
        match self {
            ModuleOwner::Plugin { path, plugin_id } => Some(PluginRef {
                id: plugin_id.clone(),
                path: path.clone(),
            }),
            ModuleOwner::Library { plugin, .. } => plugin.clone(),
            ModuleOwner::Source { .. } => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ModuleOwner::Source { .. } => "source",
            ModuleOwner::Library { .. } => "library",
            ModuleOwner::Plugin { .. } => "plugin",
        }
    }
}

impl fmt::Display for ModuleOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind_name(), self.path().display())
    }
}
