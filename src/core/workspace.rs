//! Workspace - central configuration hub.
//!
//! A Workspace is `mpsbuild.toml` with every path made absolute against the
//! folder holding it, plus the output locations derived from the build
//! directory.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::coordinates::Coordinates;
use crate::core::macros::Macros;
use crate::core::module_id::ModuleId;
use crate::core::publication::{IdeaPlugin, Publication};
use crate::util::config::{Config, DEFAULT_BUILD_DIR};
use crate::util::fs::{expand_search_paths, normalize_lexically};

/// Name of the generated build description.
pub const SCRIPT_FILE: &str = "build-modules.xml";

/// Name of the JSON build plan.
pub const PLAN_FILE: &str = "build-plan.json";

/// An external library to wrap in a stub solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubSpec {
    pub coordinates: Coordinates,
    pub jars: Vec<PathBuf>,
    pub dependencies: Vec<Coordinates>,
}

/// A loaded and resolved project configuration.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    build_dir: PathBuf,
    heap_size: String,
    search_roots: Vec<PathBuf>,
    mps_home: Option<PathBuf>,
    macros: Macros,
    publications: Vec<Publication>,
    stubs: Vec<StubSpec>,
    ignored_modules: BTreeSet<ModuleId>,
    include_language_usage: bool,
}

impl Workspace {
    /// Load a workspace from a config file path.
    pub fn new(config_path: &Path) -> Result<Self> {
        let config = Config::load(config_path)?;
        let root = config_path.parent().unwrap_or(Path::new("."));
        let root = if root.as_os_str().is_empty() {
            std::env::current_dir().context("failed to get current directory")?
        } else {
            root.to_path_buf()
        };
        Self::from_config(config, &root)
    }

    /// Resolve a parsed config against `root`.
    pub fn from_config(config: Config, root: &Path) -> Result<Self> {
        let root = normalize_lexically(root);
        let resolve = |p: &Path| normalize_lexically(&root.join(p));

        let build_dir = resolve(
            config
                .build
                .build_dir
                .as_deref()
                .unwrap_or(Path::new(DEFAULT_BUILD_DIR)),
        );

        let search = if config.build.search.is_empty() {
            vec![".".to_string()]
        } else {
            config.build.search.clone()
        };
        let search_roots = expand_search_paths(&root, &search)?;

        let mps_home = match &config.build.mps_home {
            Some(home) => {
                let home = resolve(home);
                if !home.is_dir() {
                    bail!("mps_home `{}` is not a directory", home.display());
                }
                Some(home)
            }
            None => None,
        };

        let mut macros: Macros = config
            .macros
            .iter()
            .map(|(name, path)| (name.clone(), resolve(path)))
            .collect();
        if let Some(home) = &mps_home {
            if macros.get("mps_home").is_none() {
                macros.insert("mps_home", home.clone());
            }
        }

        let publications = config
            .publications
            .iter()
            .map(|p| Publication {
                name: p.name.clone(),
                module_names: p.modules.iter().cloned().collect(),
                include_paths: p.include_paths.iter().map(|i| resolve(i)).collect(),
                idea_plugins: p
                    .idea_plugins
                    .iter()
                    .map(|plugin| IdeaPlugin {
                        implementation_module: plugin.implementation_module.clone(),
                        description: plugin.description.clone(),
                        plugin_xml: plugin.plugin_xml.clone(),
                    })
                    .collect(),
            })
            .collect();

        let stubs = config
            .stubs
            .iter()
            .map(|s| {
                let coordinates = s
                    .coordinates
                    .parse()
                    .with_context(|| format!("invalid [[stubs]] entry `{}`", s.coordinates))?;
                let dependencies = s
                    .dependencies
                    .iter()
                    .map(|d| d.parse())
                    .collect::<Result<Vec<Coordinates>, _>>()
                    .with_context(|| format!("invalid dependency of stub `{}`", s.coordinates))?;
                Ok(StubSpec {
                    coordinates,
                    jars: s.jars.iter().map(|j| resolve(j)).collect(),
                    dependencies,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Workspace {
            build_dir,
            heap_size: config.build.heap_size.clone(),
            search_roots,
            mps_home,
            macros,
            publications,
            stubs,
            ignored_modules: config
                .build
                .ignored_modules
                .iter()
                .map(|id| ModuleId::new(id.as_str()))
                .collect(),
            include_language_usage: config.build.include_language_usage,
            root,
        })
    }

    /// Override the build directory.
    pub fn with_build_dir(mut self, build_dir: PathBuf) -> Self {
        self.build_dir = build_dir;
        self
    }

    /// Get the workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Project name, taken from the root folder.
    pub fn project_name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string())
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn heap_size(&self) -> &str {
        &self.heap_size
    }

    pub fn search_roots(&self) -> &[PathBuf] {
        &self.search_roots
    }

    pub fn mps_home(&self) -> Option<&Path> {
        self.mps_home.as_deref()
    }

    pub fn macros(&self) -> &Macros {
        &self.macros
    }

    pub fn publications(&self) -> &[Publication] {
        &self.publications
    }

    pub fn stubs(&self) -> &[StubSpec] {
        &self.stubs
    }

    pub fn ignored_modules(&self) -> &BTreeSet<ModuleId> {
        &self.ignored_modules
    }

    pub fn include_language_usage(&self) -> bool {
        self.include_language_usage
    }

    /// Folder holding generated stub solutions.
    pub fn stubs_dir(&self) -> PathBuf {
        self.build_dir.join("dependencies").join("stubs")
    }

    /// Path of the generated build description.
    pub fn script_path(&self) -> PathBuf {
        self.build_dir.join(SCRIPT_FILE)
    }

    /// Path of the JSON build plan.
    pub fn plan_path(&self) -> PathBuf {
        self.build_dir.join(PLAN_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_workspace_defaults() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::from_config(Config::default(), tmp.path()).unwrap();

        assert_eq!(ws.build_dir(), tmp.path().join("build/mpsbuild"));
        assert_eq!(ws.search_roots(), &[tmp.path().to_path_buf()]);
        assert_eq!(ws.heap_size(), "2G");
        assert!(ws.include_language_usage());
        assert_eq!(ws.script_path(), tmp.path().join("build/mpsbuild/build-modules.xml"));
        assert_eq!(ws.stubs_dir(), tmp.path().join("build/mpsbuild/dependencies/stubs"));
    }

    #[test]
    fn test_workspace_resolves_relative_paths() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("mpsbuild.toml");
        std::fs::create_dir_all(tmp.path().join("mps")).unwrap();
        std::fs::write(
            &config_path,
            r#"
[build]
build_dir = "out"
search = ["code"]
mps_home = "mps"
ignored_modules = ["abc"]

[macros]
libs = "../shared/libs"

[[publication]]
name = "core"
include_paths = ["code/core"]

[[stubs]]
coordinates = "g:a:1"
jars = ["libs/a.jar"]
dependencies = ["g:b:2"]
"#,
        )
        .unwrap();

        let ws = Workspace::new(&config_path).unwrap();
        assert_eq!(ws.build_dir(), tmp.path().join("out"));
        assert_eq!(ws.search_roots(), &[tmp.path().join("code")]);
        assert_eq!(ws.mps_home(), Some(tmp.path().join("mps").as_path()));
        assert_eq!(ws.macros().get("mps_home"), Some(tmp.path().join("mps").as_path()));
        assert_eq!(
            ws.macros().get("libs").unwrap(),
            normalize_lexically(&tmp.path().join("../shared/libs"))
        );
        assert_eq!(ws.publications()[0].include_paths, vec![tmp.path().join("code/core")]);
        assert!(ws.ignored_modules().contains(&ModuleId::new("abc")));
        assert_eq!(ws.stubs()[0].jars, vec![tmp.path().join("libs/a.jar")]);
        assert_eq!(ws.stubs()[0].dependencies[0].artifact, "b");
    }

    #[test]
    fn test_missing_mps_home_is_error() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.build.mps_home = Some(PathBuf::from("nowhere"));
        let err = Workspace::from_config(config, tmp.path()).unwrap_err();
        assert!(err.to_string().contains("mps_home"));
    }

    #[test]
    fn test_invalid_stub_coordinates() {
        let tmp = TempDir::new().unwrap();
        let config = Config::parse(
            "[[stubs]]\ncoordinates = \"only-two:parts\"\n",
            Path::new("mpsbuild.toml"),
        )
        .unwrap();
        assert!(Workspace::from_config(config, tmp.path()).is_err());
    }
}
