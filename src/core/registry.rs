//! The module registry.
//!
//! [`FoundModules`] collects everything a mining pass discovers: modules,
//! IDE plugin bundles, projects and the platform home. Entries are only ever
//! added or augmented with language usages from their models.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::dependency::ModuleDependency;
use crate::core::descriptor::{ModuleDescriptor, ModuleType};
use crate::core::module_id::{ModuleId, ModuleIdAndName, STUB_NAME_PREFIX};
use crate::core::owner::ModuleOwner;

/// The same module id found at two distinct locations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("module `{name}` ({id}) found twice: in {} and in {}", first.display(), second.display())]
pub struct DuplicateModule {
    pub id: ModuleId,
    pub name: String,
    pub first: PathBuf,
    pub second: PathBuf,
}

/// A discovered module.
#[derive(Debug, Clone)]
pub struct FoundModule {
    pub id: ModuleId,
    pub name: String,
    pub module_type: ModuleType,
    pub owner: ModuleOwner,
    pub descriptor: ModuleDescriptor,

    /// Descriptor file, or `jar!/entry` for archived descriptors
    pub descriptor_path: PathBuf,

    used_in_models: BTreeMap<ModuleId, ModuleDependency>,
}

impl FoundModule {
    pub fn new(descriptor: ModuleDescriptor, owner: ModuleOwner, descriptor_path: PathBuf) -> Self {
        FoundModule {
            id: descriptor.id.clone(),
            name: descriptor.name.clone(),
            module_type: descriptor.module_type(),
            owner,
            descriptor,
            descriptor_path,
            used_in_models: BTreeMap::new(),
        }
    }

    pub fn id_and_name(&self) -> ModuleIdAndName {
        ModuleIdAndName::new(self.id.clone(), Some(self.name.clone()))
    }

    /// Record a language or devkit referenced from one of this module's models.
    pub fn add_model_usage(&mut self, usage: ModuleIdAndName) {
        self.used_in_models
            .entry(usage.id.clone())
            .or_insert_with(|| ModuleDependency::usage(usage, false));
    }

    /// Languages and devkits referenced from this module's models.
    pub fn model_usages(&self) -> impl Iterator<Item = &ModuleDependency> {
        self.used_in_models.values()
    }

    /// Declared and model-level usages, one per target id.
    ///
    /// Model-level usages are mandatory, so they win over an ignorable
    /// declaration of the same language.
    pub fn used_languages_and_devkits(&self) -> Vec<ModuleDependency> {
        let mut usages: BTreeMap<&ModuleId, &ModuleDependency> = BTreeMap::new();
        for usage in self.descriptor.declared_usages() {
            usages.entry(&usage.id).or_insert(usage);
        }
        for usage in self.used_in_models.values() {
            usages.insert(&usage.id, usage);
        }
        usages.into_values().cloned().collect()
    }

    /// Module edges declared in the descriptor.
    pub fn module_dependencies(&self) -> impl Iterator<Item = &ModuleDependency> {
        self.descriptor.module_dependencies()
    }

    /// Whether this is a generated stub solution.
    pub fn is_stub(&self) -> bool {
        self.id.is_stub() || self.name.starts_with(STUB_NAME_PREFIX)
    }

    /// Folder holding the descriptor, for source and plugin modules.
    pub fn module_dir(&self) -> Option<&Path> {
        match self.owner {
            ModuleOwner::Library { .. } => None,
            _ => self.descriptor_path.parent(),
        }
    }
}

/// A discovered IDE plugin bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundPlugin {
    pub id: String,
    pub name: Option<String>,
    pub path: PathBuf,
    pub dependencies: BTreeSet<String>,
    /// Jars below the plugin that contained modules
    pub module_jars: Vec<PathBuf>,
}

/// A discovered IDE project folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundProject {
    pub path: PathBuf,
}

/// Registry of everything found by a mining pass.
#[derive(Debug, Clone, Default)]
pub struct FoundModules {
    modules: BTreeMap<ModuleId, FoundModule>,
    plugins: BTreeMap<String, FoundPlugin>,
    projects: Vec<FoundProject>,
    mps_home: Option<PathBuf>,
}

impl FoundModules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module.
    ///
    /// A second registration under the same owner path merges into the first:
    /// a source descriptor replaces a deployment descriptor, anything else is
    /// dropped. The same id under a different owner is an error.
    pub fn add_module(&mut self, module: FoundModule) -> Result<(), DuplicateModule> {
        match self.modules.get_mut(&module.id) {
            None => {
                self.modules.insert(module.id.clone(), module);
                Ok(())
            }
            Some(existing) if existing.owner.path() == module.owner.path() => {
                if existing.descriptor.is_deployment && !module.descriptor.is_deployment {
                    tracing::debug!("using source descriptor for {}", module.name);
                    existing.descriptor = module.descriptor;
                    existing.descriptor_path = module.descriptor_path;
                }
                Ok(())
            }
            Some(existing) => Err(DuplicateModule {
                id: module.id.clone(),
                name: module.name.clone(),
                first: existing.owner.path().to_path_buf(),
                second: module.owner.path().to_path_buf(),
            }),
        }
    }

    pub fn get(&self, id: &ModuleId) -> Option<&FoundModule> {
        self.modules.get(id)
    }

    pub fn get_mut(&mut self, id: &ModuleId) -> Option<&mut FoundModule> {
        self.modules.get_mut(id)
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.modules.contains_key(id)
    }

    /// First module with the given name, in id order.
    pub fn find_by_name(&self, name: &str) -> Option<&FoundModule> {
        self.modules.values().find(|m| m.name == name)
    }

    /// All modules, in id order.
    pub fn modules(&self) -> impl Iterator<Item = &FoundModule> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn add_plugin(&mut self, plugin: FoundPlugin) {
        self.plugins.entry(plugin.id.clone()).or_insert(plugin);
    }

    pub fn plugin(&self, id: &str) -> Option<&FoundPlugin> {
        self.plugins.get(id)
    }

    pub fn plugin_mut(&mut self, id: &str) -> Option<&mut FoundPlugin> {
        self.plugins.get_mut(id)
    }

    pub fn plugins(&self) -> impl Iterator<Item = &FoundPlugin> {
        self.plugins.values()
    }

    pub fn add_project(&mut self, project: FoundProject) {
        if !self.projects.contains(&project) {
            self.projects.push(project);
        }
    }

    pub fn projects(&self) -> &[FoundProject] {
        &self.projects
    }

    pub fn set_mps_home(&mut self, path: PathBuf) {
        self.mps_home = Some(path);
    }

    pub fn mps_home(&self) -> Option<&Path> {
        self.mps_home.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::ModuleDescriptor;

    fn solution(id: &str, name: &str) -> ModuleDescriptor {
        ModuleDescriptor::parse(
            &format!(r#"<solution name="{}" uuid="{}"/>"#, name, id),
            "test.msd",
        )
        .unwrap()
    }

    fn deployment(id: &str, name: &str) -> ModuleDescriptor {
        ModuleDescriptor::parse(
            &format!(r#"<module namespace="{}" uuid="{}" type="solution"/>"#, name, id),
            "a.jar!/META-INF/module.xml",
        )
        .unwrap()
    }

    #[test]
    fn test_add_and_lookup() {
        let mut modules = FoundModules::new();
        modules
            .add_module(FoundModule::new(
                solution("1", "a"),
                ModuleOwner::source("/p/a.msd"),
                PathBuf::from("/p/a.msd"),
            ))
            .unwrap();

        assert!(modules.contains(&ModuleId::new("1")));
        assert_eq!(modules.find_by_name("a").unwrap().id.as_str(), "1");
        assert!(modules.find_by_name("b").is_none());
    }

    #[test]
    fn test_duplicate_from_different_owner_is_error() {
        let mut modules = FoundModules::new();
        modules
            .add_module(FoundModule::new(
                solution("1", "a"),
                ModuleOwner::source("/p/a.msd"),
                PathBuf::from("/p/a.msd"),
            ))
            .unwrap();
        let err = modules
            .add_module(FoundModule::new(
                solution("1", "a"),
                ModuleOwner::source("/q/a.msd"),
                PathBuf::from("/q/a.msd"),
            ))
            .unwrap_err();
        assert_eq!(err.first, PathBuf::from("/p/a.msd"));
        assert_eq!(err.second, PathBuf::from("/q/a.msd"));
    }

    #[test]
    fn test_same_owner_prefers_source_descriptor() {
        let owner = ModuleOwner::Library {
            path: PathBuf::from("/lib/a.jar"),
            plugin: None,
        };
        let mut modules = FoundModules::new();
        modules
            .add_module(FoundModule::new(
                deployment("1", "a"),
                owner.clone(),
                PathBuf::from("/lib/a.jar!/META-INF/module.xml"),
            ))
            .unwrap();
        modules
            .add_module(FoundModule::new(
                solution("1", "a"),
                owner,
                PathBuf::from("/lib/a-src.jar!/module/a.msd"),
            ))
            .unwrap();

        let found = modules.get(&ModuleId::new("1")).unwrap();
        assert!(!found.descriptor.is_deployment);
        assert_eq!(found.descriptor_path, PathBuf::from("/lib/a-src.jar!/module/a.msd"));
    }

    #[test]
    fn test_model_usages_are_mandatory() {
        let descriptor = ModuleDescriptor::parse(
            r#"<solution name="a" uuid="1"><usedLanguages><usedLanguage>9(l)</usedLanguage><usedLanguage>8(k)</usedLanguage></usedLanguages></solution>"#,
            "a.msd",
        )
        .unwrap();
        let mut module =
            FoundModule::new(descriptor, ModuleOwner::source("/p/a.msd"), PathBuf::from("/p/a.msd"));
        module.add_model_usage(ModuleIdAndName::parse("9(l)").unwrap());

        let usages = module.used_languages_and_devkits();
        assert_eq!(usages.len(), 2);
        let l = usages.iter().find(|u| u.id.as_str() == "9").unwrap();
        assert!(!l.ignore_if_missing);
        let k = usages.iter().find(|u| u.id.as_str() == "8").unwrap();
        assert!(k.ignore_if_missing);
    }

    #[test]
    fn test_stub_detection() {
        let module = FoundModule::new(
            solution("~stubs#g#a#1", "stubs#g#a#1"),
            ModuleOwner::source("/b/s.msd"),
            PathBuf::from("/b/s.msd"),
        );
        assert!(module.is_stub());
    }
}
