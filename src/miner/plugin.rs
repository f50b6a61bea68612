//! IDE plugin descriptors (`META-INF/plugin.xml`).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use roxmltree::Document;

use crate::core::descriptor::DescriptorError;
use crate::core::registry::FoundPlugin;
use crate::util::xml::{attribute, children_named, find_child, text};

/// Location of the plugin descriptor inside a plugin folder or jar.
pub const PLUGIN_DESCRIPTOR: &str = "META-INF/plugin.xml";

/// Plugin bundled with MPS whose jar has no usable descriptor.
pub const WORKBENCH_PLUGIN_ID: &str = "com.intellij.modules.mps";

const DEFAULT_MODULE_FOLDERS: &[&str] = &["languages", "lib"];

/// A parsed plugin descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescriptor {
    pub id: String,
    pub name: Option<String>,
    pub depends: BTreeSet<String>,
    /// Folders declared by `*LanguageLibrary` extensions
    pub library_dirs: Vec<String>,
}

impl PluginDescriptor {
    pub fn parse(xml: &str, file: &str) -> Result<Self, DescriptorError> {
        let doc = Document::parse(xml).map_err(|e| DescriptorError::xml(file, e))?;
        let root = doc.root_element();

        let name = find_child(root, "name")
            .map(text)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let id = find_child(root, "id")
            .map(text)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| name.clone())
            .ok_or_else(|| DescriptorError::MissingAttribute {
                file: file.to_string(),
                tag: root.tag_name().name().to_string(),
                attribute: "id",
                parent: None,
            })?;

        let depends = children_named(root, "depends")
            .map(text)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        let library_dirs = root
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name().ends_with("LanguageLibrary"))
            .filter_map(|n| attribute(n, "dir"))
            .map(|dir| dir.trim_start_matches('/').to_string())
            .collect();

        Ok(PluginDescriptor {
            id,
            name,
            depends,
            library_dirs,
        })
    }

    /// Folders below `plugin_root` to scan for module jars.
    pub fn module_jar_folders(&self, plugin_root: &Path) -> Vec<PathBuf> {
        if self.library_dirs.is_empty() {
            DEFAULT_MODULE_FOLDERS
                .iter()
                .map(|f| plugin_root.join(f))
                .filter(|p| p.is_dir())
                .collect()
        } else {
            self.library_dirs.iter().map(|d| plugin_root.join(d)).collect()
        }
    }

    pub fn into_found_plugin(self, path: &Path) -> FoundPlugin {
        FoundPlugin {
            id: self.id,
            name: self.name,
            path: path.to_path_buf(),
            dependencies: self.depends,
            module_jars: Vec::new(),
        }
    }
}

/// The MPS workbench plugin, registered from `lib/mps-workbench.jar`.
pub fn workbench_plugin(jar: &Path) -> FoundPlugin {
    FoundPlugin {
        id: WORKBENCH_PLUGIN_ID.to_string(),
        name: Some("MPS Workbench".to_string()),
        path: jar.to_path_buf(),
        dependencies: BTreeSet::new(),
        module_jars: Vec::new(),
    }
}
