//! Module discovery.
//!
//! A [`ModulesMiner`] walks search roots and fills a [`FoundModules`]
//! registry. Recognized locations, most specific first:
//!
//! - a folder with `.mps/modules.xml`: only the listed modules are mined
//! - a folder with `META-INF/plugin.xml`: an IDE plugin; its module jar
//!   folders are scanned with the plugin as owner
//! - `.msd`, `.mpl` and `.devkit` files: parsed, then their model roots are
//!   scanned for language usages
//! - jar and zip archives: descriptor entries are read in place, together
//!   with `-src` and `-generator` companion jars
//!
//! A folder containing a `.mpsbuild-ignore` file is skipped with its subtree.

pub mod archive;
pub mod models;
pub mod plugin;
pub mod project;

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::descriptor::{DescriptorError, ModuleDescriptor};
use crate::core::macros::Macros;
use crate::core::module_id::ModuleId;
use crate::core::owner::ModuleOwner;
use crate::core::registry::{DuplicateModule, FoundModule, FoundModules, FoundProject};
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::fs::{normalize_lexically, normalize_path};

use self::plugin::{workbench_plugin, PluginDescriptor, PLUGIN_DESCRIPTOR};
use self::project::PROJECT_SETTINGS_DIR;

/// Marker file excluding a folder from mining.
pub const IGNORE_MARKER: &str = ".mpsbuild-ignore";

const DEPLOYMENT_DESCRIPTOR: &str = "META-INF/module.xml";
const DESCRIPTOR_EXTENSIONS: &[&str] = &["msd", "mpl", "devkit"];
const ARCHIVE_EXTENSIONS: &[&str] = &["jar", "zip"];

/// Errors that abort a mining pass.
#[derive(Debug, Error)]
pub enum MinerError {
    #[error(transparent)]
    Parse(#[from] DescriptorError),

    #[error(transparent)]
    DuplicateModule(#[from] DuplicateModule),

    #[error("failed to read `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read archive `{}`", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to walk `{}`", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl MinerError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            MinerError::Parse(e) => e.to_diagnostic(),
            MinerError::DuplicateModule(e) => Diagnostic::error(e.to_string())
                .with_context(format!("first found in {}", e.first.display()))
                .with_context(format!("found again in {}", e.second.display()))
                .with_suggestion(format!(
                    "Add a `{}` file next to one of the copies",
                    IGNORE_MARKER
                )),
            MinerError::Io { source, .. } => {
                Diagnostic::error(self.to_string()).with_context(source.to_string())
            }
            MinerError::Archive { source, .. } => Diagnostic::error(self.to_string())
                .with_context(source.to_string())
                .with_suggestion(suggestions::FIX_DESCRIPTOR),
            MinerError::Walk { source, .. } => {
                Diagnostic::error(self.to_string()).with_context(source.to_string())
            }
        }
    }
}

/// One mining session. The visited set lives as long as the miner.
#[derive(Debug, Default)]
pub struct ModulesMiner {
    searched: HashSet<PathBuf>,
    modules: FoundModules,
    macros: Macros,
}

impl ModulesMiner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a miner that also offers `macros` to model roots.
    pub fn with_macros(macros: Macros) -> Self {
        ModulesMiner {
            macros,
            ..Self::default()
        }
    }

    /// Modules found so far.
    pub fn modules(&self) -> &FoundModules {
        &self.modules
    }

    pub fn into_modules(self) -> FoundModules {
        self.modules
    }

    /// Search a folder or archive for modules.
    pub fn search_in_folder(&mut self, root: &Path) -> Result<(), MinerError> {
        self.search_in_folder_filtered(root, &|_| true)
    }

    /// Search a folder or archive, pruning every path rejected by `filter`.
    pub fn search_in_folder_filtered(
        &mut self,
        root: &Path,
        filter: &dyn Fn(&Path) -> bool,
    ) -> Result<(), MinerError> {
        debug!("searching for modules in {}", root.display());
        self.collect(&normalize_lexically(root), None, None, filter)
    }

    /// Register a descriptor that only exists in memory, as if it had been
    /// found at `path`. Its models are not scanned.
    pub fn register_descriptor(&mut self, xml: &str, path: &Path) -> Result<Vec<ModuleId>, MinerError> {
        self.searched.insert(normalize_path(path));
        let owner = ModuleOwner::source(path);
        self.register_xml(xml, &path.display().to_string(), path, &owner)
    }

    fn collect(
        &mut self,
        file: &Path,
        virtual_folder: Option<&str>,
        owner: Option<&ModuleOwner>,
        filter: &dyn Fn(&Path) -> bool,
    ) -> Result<(), MinerError> {
        if !self.searched.insert(normalize_path(file)) {
            return Ok(());
        }
        if is_ignored(file, filter) {
            debug!("ignoring {}", file.display());
            return Ok(());
        }

        let metadata = match fs::metadata(file) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} does not exist", file.display());
                return Ok(());
            }
            Err(source) => {
                return Err(MinerError::Io {
                    path: file.to_path_buf(),
                    source,
                })
            }
        };

        if metadata.is_dir() {
            return self.collect_directory(file, owner, filter);
        }
        if !metadata.is_file() {
            return Ok(());
        }
        if metadata.len() == 0 {
            debug!("skipping empty file {}", file.display());
            return Ok(());
        }

        let extension = file
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if DESCRIPTOR_EXTENSIONS.contains(&extension.as_str()) {
            let owner = match owner {
                Some(owner) => owner.clone(),
                None => ModuleOwner::Source {
                    path: file.to_path_buf(),
                    virtual_folder: virtual_folder.map(str::to_string),
                },
            };
            self.load_descriptor_file(file, &owner)?;
        } else if ARCHIVE_EXTENSIONS.contains(&extension.as_str()) {
            self.scan_archive(file, owner)?;
        }
        Ok(())
    }

    fn collect_directory(
        &mut self,
        dir: &Path,
        owner: Option<&ModuleOwner>,
        filter: &dyn Fn(&Path) -> bool,
    ) -> Result<(), MinerError> {
        let settings = dir.join(PROJECT_SETTINGS_DIR);
        if settings.is_dir() {
            debug!("found project {}", dir.display());
            self.modules.add_project(FoundProject {
                path: dir.to_path_buf(),
            });
        }

        let modules_xml = settings.join("modules.xml");
        if modules_xml.is_file() {
            for listed in project::read_project_modules(&modules_xml, dir)? {
                if is_module_file_ignored(&listed.module_file, dir, filter) {
                    debug!("ignoring project module {}", listed.module_file.display());
                    continue;
                }
                self.collect(
                    &listed.module_file,
                    listed.virtual_folder.as_deref(),
                    owner,
                    filter,
                )?;
            }
            return Ok(());
        }

        let plugin_xml = dir.join(PLUGIN_DESCRIPTOR);
        if plugin_xml.is_file() {
            let xml = read_file(&plugin_xml)?;
            let descriptor = PluginDescriptor::parse(&xml, &plugin_xml.display().to_string())?;
            debug!("found plugin {} in {}", descriptor.id, dir.display());

            let folders = descriptor.module_jar_folders(dir);
            let plugin_owner = ModuleOwner::Plugin {
                path: dir.to_path_buf(),
                plugin_id: descriptor.id.clone(),
            };
            self.modules.add_plugin(descriptor.into_found_plugin(dir));
            for folder in folders {
                self.collect(&folder, None, Some(&plugin_owner), filter)?;
            }
            return Ok(());
        }

        let mut children = Vec::new();
        for entry in fs::read_dir(dir).map_err(|source| MinerError::Io {
            path: dir.to_path_buf(),
            source,
        })? {
            let entry = entry.map_err(|source| MinerError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            children.push(entry.path());
        }
        children.sort();

        for child in children {
            self.collect(&child, None, owner, filter)?;
        }
        Ok(())
    }

    fn load_descriptor_file(&mut self, file: &Path, owner: &ModuleOwner) -> Result<(), MinerError> {
        let xml = read_file(file)?;
        let ids = self.register_xml(&xml, &file.display().to_string(), file, owner)?;

        let macros = self.macros.for_descriptor(file);
        for id in ids {
            self.scan_models(&id, &macros)?;
        }
        Ok(())
    }

    fn scan_models(&mut self, id: &ModuleId, macros: &Macros) -> Result<(), MinerError> {
        let Some(module) = self.modules.get(id) else {
            return Ok(());
        };
        let name = module.name.clone();
        let roots = module.descriptor.model_root_paths();

        let mut usages = Vec::new();
        for raw in roots {
            match macros.resolve(&raw) {
                Ok(folder) if folder.exists() => {
                    usages.extend(models::collect_model_usages(&folder, &name)?);
                }
                Ok(_) => {}
                Err(e) => warn!("skipping model root of {}: {}", name, e),
            }
        }

        if let Some(module) = self.modules.get_mut(id) {
            for usage in usages {
                module.add_model_usage(usage);
            }
        }
        Ok(())
    }

    fn scan_archive(&mut self, file: &Path, owner: Option<&ModuleOwner>) -> Result<(), MinerError> {
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let in_lib = file.parent().and_then(Path::file_name) == Some(OsStr::new("lib"));

        if in_lib && file_name == "mps-boot.jar" {
            if let Some(home) = file.parent().and_then(Path::parent) {
                debug!("found MPS home {}", home.display());
                self.modules.set_mps_home(home.to_path_buf());
            }
        }
        if in_lib && file_name == "mps-workbench.jar" {
            self.modules.add_plugin(workbench_plugin(file));
            return Ok(());
        }
        if archive::is_companion_jar(file) {
            return Ok(());
        }

        let library_owner = ModuleOwner::Library {
            path: file.to_path_buf(),
            plugin: owner.and_then(ModuleOwner::plugin_ref),
        };

        let mut jars = vec![file.to_path_buf()];
        jars.extend(archive::sibling_jars(file));

        let mut registered = 0;
        for jar in jars {
            for (entry, contents) in archive::read_entries(&jar, is_descriptor_entry)? {
                let source = format!("{}!/{}", jar.display(), entry);
                if entry == PLUGIN_DESCRIPTOR {
                    if owner.is_none() {
                        let descriptor = PluginDescriptor::parse(&contents, &source)?;
                        debug!("found plugin {} in {}", descriptor.id, jar.display());
                        self.modules.add_plugin(descriptor.into_found_plugin(file));
                    }
                    continue;
                }
                registered += self
                    .register_xml(&contents, &source, Path::new(&source), &library_owner)?
                    .len();
            }
        }

        if let Some(ModuleOwner::Plugin { plugin_id, .. }) = owner {
            if registered > 0 {
                if let Some(plugin) = self.modules.plugin_mut(plugin_id) {
                    plugin.module_jars.push(file.to_path_buf());
                }
            }
        }
        Ok(())
    }

    /// Parse a descriptor and register it together with nested generators.
    fn register_xml(
        &mut self,
        xml: &str,
        source: &str,
        descriptor_path: &Path,
        owner: &ModuleOwner,
    ) -> Result<Vec<ModuleId>, MinerError> {
        let descriptor = ModuleDescriptor::parse(xml, source)?;
        let generators = descriptor.generators().to_vec();

        let mut ids = Vec::with_capacity(1 + generators.len());
        for descriptor in std::iter::once(descriptor).chain(generators) {
            debug!(
                "found {} {} ({})",
                descriptor.module_type(),
                descriptor.name,
                descriptor.id
            );
            ids.push(descriptor.id.clone());
            self.modules.add_module(FoundModule::new(
                descriptor,
                owner.clone(),
                descriptor_path.to_path_buf(),
            ))?;
        }
        Ok(ids)
    }
}

fn read_file(path: &Path) -> Result<String, MinerError> {
    fs::read_to_string(path).map_err(|source| MinerError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn is_descriptor_entry(name: &str) -> bool {
    if name == DEPLOYMENT_DESCRIPTOR || name == PLUGIN_DESCRIPTOR {
        return true;
    }
    name.rsplit_once('.')
        .map(|(_, ext)| DESCRIPTOR_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_ignored(path: &Path, filter: &dyn Fn(&Path) -> bool) -> bool {
    !filter(path) || path.join(IGNORE_MARKER).exists()
}

/// Check `module_file` and each of its ancestors below `project_dir`.
fn is_module_file_ignored(
    module_file: &Path,
    project_dir: &Path,
    filter: &dyn Fn(&Path) -> bool,
) -> bool {
    let project_dir = normalize_path(project_dir);
    let mut current = Some(normalize_path(module_file));
    while let Some(path) = current {
        if path == project_dir {
            break;
        }
        if is_ignored(&path, filter) {
            return true;
        }
        current = path.parent().map(Path::to_path_buf);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::ModuleType;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::FileOptions;

    const SOLUTION: &str = r#"<solution name="org.example.sol" uuid="00000000-0000-0000-0000-000000000001">
  <models>
    <modelRoot contentPath="${module}" type="default"><sourceRoot location="models" /></modelRoot>
  </models>
</solution>"#;

    const LANGUAGE: &str = r#"<language namespace="org.example.lang" uuid="00000000-0000-0000-0000-000000000002">
  <generators>
    <generator namespace="org.example.lang.gen" uuid="00000000-0000-0000-0000-000000000003" />
  </generators>
</language>"#;

    const MODEL: &str = r#"<model ref="r:1(main)"><languages>
  <use id="00000000-0000-0000-0000-000000000002" name="org.example.lang" version="0" />
</languages></model>"#;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn write_jar(path: &Path, entries: &[(&str, &str)]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, contents) in entries {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(contents.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    fn mine(root: &Path) -> FoundModules {
        let mut miner = ModulesMiner::new();
        miner.search_in_folder(root).unwrap();
        miner.into_modules()
    }

    #[test]
    fn test_mines_source_modules_and_model_usages() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("sol/sol.msd"), SOLUTION);
        write(&tmp.path().join("sol/models/main.mps"), MODEL);
        write(&tmp.path().join("lang/lang.mpl"), LANGUAGE);

        let modules = mine(tmp.path());
        assert_eq!(modules.len(), 3);

        let generator = modules.find_by_name("org.example.lang.gen").unwrap();
        assert_eq!(generator.module_type, ModuleType::Generator);
        assert_eq!(generator.owner.path(), tmp.path().join("lang/lang.mpl"));

        let sol = modules.find_by_name("org.example.sol").unwrap();
        let usages: Vec<_> = sol.model_usages().map(|u| u.id.as_str().to_string()).collect();
        assert_eq!(usages, vec!["00000000-0000-0000-0000-000000000002"]);
    }

    #[test]
    fn test_ignore_marker_prunes_subtree() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("keep/sol.msd"), SOLUTION);
        write(&tmp.path().join("skip/lang.mpl"), LANGUAGE);
        write(&tmp.path().join("skip").join(IGNORE_MARKER), "");

        let modules = mine(tmp.path());
        assert_eq!(modules.len(), 1);
        assert!(modules.find_by_name("org.example.lang").is_none());
    }

    #[test]
    fn test_file_filter_prunes() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("keep/sol.msd"), SOLUTION);
        write(&tmp.path().join("skip/lang.mpl"), LANGUAGE);

        let mut miner = ModulesMiner::new();
        miner
            .search_in_folder_filtered(tmp.path(), &|p: &Path| !p.ends_with("skip"))
            .unwrap();
        assert_eq!(miner.modules().len(), 1);
    }

    #[test]
    fn test_empty_files_are_skipped() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("a/empty.msd"), "");
        write(&tmp.path().join("a/empty.jar"), "");

        assert!(mine(tmp.path()).is_empty());
    }

    #[test]
    fn test_revisiting_a_root_is_a_no_op() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("sol/sol.msd"), SOLUTION);

        let mut miner = ModulesMiner::new();
        miner.search_in_folder(tmp.path()).unwrap();
        miner.search_in_folder(&tmp.path().join("sol")).unwrap();
        assert_eq!(miner.modules().len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_root_reached_through_symlink_is_searched_once() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("real/sol/sol.msd"), SOLUTION);
        std::os::unix::fs::symlink(tmp.path().join("real"), tmp.path().join("link")).unwrap();

        let mut miner = ModulesMiner::new();
        miner.search_in_folder(&tmp.path().join("real")).unwrap();
        miner.search_in_folder(&tmp.path().join("link")).unwrap();
        assert_eq!(miner.modules().len(), 1);

        let sol = miner.modules().find_by_name("org.example.sol").unwrap();
        assert_eq!(sol.owner.path(), tmp.path().join("real/sol/sol.msd"));
    }

    #[test]
    fn test_project_module_outside_project_dir_is_normalized() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("shared/x/x.msd"), SOLUTION);
        write(
            &tmp.path().join("proj/.mps/modules.xml"),
            r#"<project><component name="MPSProject"><projectModules>
<modulePath path="$PROJECT_DIR$/../shared/x/x.msd" />
</projectModules></component></project>"#,
        );

        let modules = mine(&tmp.path().join("proj"));
        let sol = modules.find_by_name("org.example.sol").unwrap();
        assert_eq!(sol.owner.path(), tmp.path().join("shared/x/x.msd"));
    }

    #[test]
    fn test_duplicate_module_is_error() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("a/sol.msd"), SOLUTION);
        write(&tmp.path().join("b/sol.msd"), SOLUTION);

        let mut miner = ModulesMiner::new();
        let err = miner.search_in_folder(tmp.path()).unwrap_err();
        assert!(matches!(err, MinerError::DuplicateModule(_)));
    }

    #[test]
    fn test_malformed_descriptor_aborts() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("a/broken.msd"), "<solution");

        let mut miner = ModulesMiner::new();
        let err = miner.search_in_folder(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("broken.msd"));
    }

    #[test]
    fn test_project_modules_xml_limits_scan() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("listed/sol.msd"), SOLUTION);
        write(&tmp.path().join("unlisted/lang.mpl"), LANGUAGE);
        write(
            &tmp.path().join(".mps/modules.xml"),
            r#"<project><component name="MPSProject"><projectModules>
<modulePath path="$PROJECT_DIR$/listed/sol.msd" folder="main" />
<modulePath path="$PROJECT_DIR$/missing/x.msd" />
</projectModules></component></project>"#,
        );

        let modules = mine(tmp.path());
        assert_eq!(modules.len(), 1);
        assert_eq!(modules.projects().len(), 1);
        match &modules.find_by_name("org.example.sol").unwrap().owner {
            ModuleOwner::Source { virtual_folder, .. } => {
                assert_eq!(virtual_folder.as_deref(), Some("main"))
            }
            other => panic!("unexpected owner {:?}", other),
        }
    }

    #[test]
    fn test_project_module_below_ignored_folder() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("skip/sol/sol.msd"), SOLUTION);
        write(&tmp.path().join("skip").join(IGNORE_MARKER), "");
        write(
            &tmp.path().join(".mps/modules.xml"),
            r#"<project><component name="MPSProject"><projectModules>
<modulePath path="$PROJECT_DIR$/skip/sol/sol.msd" />
</projectModules></component></project>"#,
        );

        assert!(mine(tmp.path()).is_empty());
    }

    #[test]
    fn test_jar_with_deployment_descriptor_and_src_jar() {
        let tmp = TempDir::new().unwrap();
        let lib = tmp.path().join("libs");
        write_jar(
            &lib.join("lang.jar"),
            &[(
                "META-INF/module.xml",
                r#"<module namespace="org.example.lang" uuid="00000000-0000-0000-0000-000000000002" type="language"/>"#,
            )],
        );
        write_jar(&lib.join("lang-src.jar"), &[("module/lang.mpl", LANGUAGE)]);

        let modules = mine(tmp.path());
        let lang = modules.find_by_name("org.example.lang").unwrap();
        assert!(!lang.descriptor.is_deployment);
        assert_eq!(lang.owner.path(), lib.join("lang.jar"));
        assert!(modules.find_by_name("org.example.lang.gen").is_some());
    }

    #[test]
    fn test_generator_jars_belong_to_base_jar() {
        let tmp = TempDir::new().unwrap();
        let lib = tmp.path().join("libs");
        write_jar(
            &lib.join("lang.jar"),
            &[(
                "META-INF/module.xml",
                r#"<module namespace="org.example.lang" uuid="00000000-0000-0000-0000-000000000002" type="language"/>"#,
            )],
        );
        write_jar(
            &lib.join("lang-generator.jar"),
            &[(
                "META-INF/module.xml",
                r#"<module namespace="org.example.lang.main" uuid="00000000-0000-0000-0000-000000000010" type="generator"/>"#,
            )],
        );
        write_jar(
            &lib.join("lang-1-generator.jar"),
            &[(
                "META-INF/module.xml",
                r#"<module namespace="org.example.lang.extra" uuid="00000000-0000-0000-0000-000000000011" type="generator"/>"#,
            )],
        );

        let modules = mine(tmp.path());
        assert_eq!(modules.len(), 3);
        for name in ["org.example.lang.main", "org.example.lang.extra"] {
            let generator = modules.find_by_name(name).unwrap();
            assert_eq!(generator.module_type, ModuleType::Generator);
            assert_eq!(generator.owner.path(), lib.join("lang.jar"));
        }
    }

    #[test]
    fn test_plugin_folder_owns_its_jars() {
        let tmp = TempDir::new().unwrap();
        let plugin = tmp.path().join("plugins/example");
        write(
            &plugin.join("META-INF/plugin.xml"),
            "<idea-plugin><id>org.example.plugin</id></idea-plugin>",
        );
        write_jar(
            &plugin.join("languages/lang.jar"),
            &[(
                "META-INF/module.xml",
                r#"<module namespace="org.example.lang" uuid="00000000-0000-0000-0000-000000000002" type="language"/>"#,
            )],
        );

        let modules = mine(tmp.path());
        let lang = modules.find_by_name("org.example.lang").unwrap();
        assert_eq!(lang.owner.plugin_id(), Some("org.example.plugin"));

        let found = modules.plugin("org.example.plugin").unwrap();
        assert_eq!(found.module_jars, vec![plugin.join("languages/lang.jar")]);
    }

    #[test]
    fn test_distribution_markers() {
        let tmp = TempDir::new().unwrap();
        write_jar(&tmp.path().join("mps/lib/mps-boot.jar"), &[("a.txt", "x")]);
        write_jar(&tmp.path().join("mps/lib/mps-workbench.jar"), &[("a.txt", "x")]);

        let modules = mine(tmp.path());
        assert_eq!(modules.mps_home(), Some(tmp.path().join("mps").as_path()));
        assert!(modules.plugin(plugin::WORKBENCH_PLUGIN_ID).is_some());
    }

    #[test]
    fn test_register_in_memory_descriptor() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stubs/s/s.msd");

        let mut miner = ModulesMiner::new();
        let ids = miner.register_descriptor(SOLUTION, &path).unwrap();
        assert_eq!(ids.len(), 1);
        assert!(miner.modules().get(&ids[0]).unwrap().owner.is_source());
    }
}
