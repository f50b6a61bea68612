//! Configuration file support for mpsbuild.
//!
//! A project is described by an `mpsbuild.toml` file:
//!
//! ```toml
//! [build]
//! build_dir = "build/mpsbuild"
//! heap_size = "2G"
//! search = ["code", "libs/*"]
//! mps_home = "/opt/mps"
//! ignored_modules = ["0a1b..."]
//!
//! [macros]
//! mps_home = "/opt/mps"
//!
//! [[publication]]
//! name = "core"
//! modules = ["org.example.core"]
//! include_paths = ["code/core"]
//!
//! [[publication.idea_plugin]]
//! implementation_module = "org.example.core.plugin"
//! description = "Example support"
//!
//! [[stubs]]
//! coordinates = "org.slf4j:slf4j-api:2.0.9"
//! jars = ["libs/slf4j-api-2.0.9.jar"]
//! ```
//!
//! Relative paths are interpreted relative to the directory holding the file;
//! that resolution happens in [`crate::core::workspace`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = "mpsbuild.toml";

/// Default heap size handed to the generator.
pub const DEFAULT_HEAP_SIZE: &str = "2G";

/// Default build directory, relative to the project root.
pub const DEFAULT_BUILD_DIR: &str = "build/mpsbuild";

/// Raw contents of `mpsbuild.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Path macros usable as `${name}` in descriptor model roots
    pub macros: BTreeMap<String, PathBuf>,

    /// Publications, in declaration order
    #[serde(rename = "publication")]
    pub publications: Vec<PublicationConfig>,

    /// Libraries wrapped as stub solutions
    pub stubs: Vec<StubConfig>,
}

/// The `[build]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Output directory for generated files
    pub build_dir: Option<PathBuf>,

    /// Heap size passed opaquely to the generator
    pub heap_size: String,

    /// Folders to search for modules; glob patterns are allowed
    pub search: Vec<String>,

    /// MPS installation to mine for bootstrap languages
    pub mps_home: Option<PathBuf>,

    /// Module ids that are never resolved
    pub ignored_modules: Vec<String>,

    /// Whether language usage adds edges to the module graph
    pub include_language_usage: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            build_dir: None,
            heap_size: DEFAULT_HEAP_SIZE.to_string(),
            search: Vec::new(),
            mps_home: None,
            ignored_modules: Vec::new(),
            include_language_usage: true,
        }
    }
}

/// A `[[publication]]` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicationConfig {
    /// Unique publication name
    pub name: String,

    /// Module names included explicitly
    pub modules: Vec<String>,

    /// Folders whose modules are all included
    pub include_paths: Vec<PathBuf>,

    #[serde(rename = "idea_plugin", skip_serializing_if = "Vec::is_empty")]
    pub idea_plugins: Vec<IdeaPluginConfig>,
}

/// A `[[publication.idea_plugin]]` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdeaPluginConfig {
    pub implementation_module: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Inline `plugin.xml` replacing the generated one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_xml: Option<String>,
}

/// A `[[stubs]]` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StubConfig {
    /// `group:artifact:version`
    pub coordinates: String,

    /// Jars making up the library
    pub jars: Vec<PathBuf>,

    /// Coordinates of other stubbed libraries this one depends on
    pub dependencies: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        Self::parse(&contents, path)
    }

    /// Parse configuration text; `path` is only used in error messages.
    pub fn parse(contents: &str, path: &Path) -> Result<Self> {
        toml::from_str(contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Serialize back to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config")
    }
}
