//! Resolving publications to module sets.

use std::collections::{BTreeMap, BTreeSet};

use roxmltree::Document;

use crate::core::module_id::ModuleId;
use crate::core::publication::{IdeaPlugin, Publication, RESERVED_PUBLICATION_NAME};
use crate::core::registry::{FoundModule, FoundModules};
use crate::ops::check::ConfigError;

/// A publication together with the modules it selects.
#[derive(Debug, Clone)]
pub struct ResolvedPublication<'a> {
    pub publication: Publication,
    pub modules: BTreeMap<ModuleId, &'a FoundModule>,
    pub idea_plugins: Vec<ResolvedIdeaPlugin<'a>>,
}

/// An IDEA plugin with its implementation module looked up.
#[derive(Debug, Clone)]
pub struct ResolvedIdeaPlugin<'a> {
    pub plugin: IdeaPlugin,
    pub module: &'a FoundModule,
}

impl<'a> ResolvedPublication<'a> {
    pub fn name(&self) -> &str {
        &self.publication.name
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.modules.contains_key(id)
    }

    pub fn module_names(&self) -> Vec<&'a str> {
        let mut names: Vec<&'a str> = self.modules.values().copied().map(|m| m.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Reject duplicate and reserved publication names.
pub fn validate_names(publications: &[Publication]) -> Result<(), ConfigError> {
    let mut seen = BTreeSet::new();
    for publication in publications {
        if publication.name == RESERVED_PUBLICATION_NAME {
            return Err(ConfigError::ReservedPublicationName {
                name: publication.name.clone(),
            });
        }
        if !seen.insert(publication.name.as_str()) {
            return Err(ConfigError::DuplicatePublication {
                name: publication.name.clone(),
            });
        }
    }
    Ok(())
}

/// Select the modules of every publication, by name or by path. The
/// implementation module of an IDEA plugin belongs to its publication.
///
/// Names that match no module are collected over all publications and
/// reported together.
pub fn resolve_publications<'a>(
    publications: &[Publication],
    modules: &'a FoundModules,
) -> Result<Vec<ResolvedPublication<'a>>, ConfigError> {
    let mut resolved = Vec::with_capacity(publications.len());
    let mut missing = Vec::new();
    let mut missing_plugins = Vec::new();

    for publication in publications {
        let mut selected = BTreeMap::new();
        let mut found_names = BTreeSet::new();

        for module in modules.modules() {
            if publication.module_names.contains(&module.name) {
                found_names.insert(module.name.as_str());
                selected.insert(module.id.clone(), module);
            } else if publication.includes_path_of(module) {
                selected.insert(module.id.clone(), module);
            }
        }

        for name in &publication.module_names {
            if !found_names.contains(name.as_str()) {
                missing.push(format!("{} (in publication `{}`)", name, publication.name));
            }
        }

        let mut idea_plugins = Vec::with_capacity(publication.idea_plugins.len());
        for plugin in &publication.idea_plugins {
            check_plugin_xml(plugin)?;
            match modules.find_by_name(&plugin.implementation_module) {
                Some(module) => {
                    selected.insert(module.id.clone(), module);
                    idea_plugins.push(ResolvedIdeaPlugin {
                        plugin: plugin.clone(),
                        module,
                    });
                }
                None => missing_plugins.push(format!(
                    "{} (in publication `{}`)",
                    plugin.implementation_module, publication.name
                )),
            }
        }

        resolved.push(ResolvedPublication {
            publication: publication.clone(),
            modules: selected,
            idea_plugins,
        });
    }

    if !missing.is_empty() {
        return Err(ConfigError::MissingIncludedModules { modules: missing });
    }
    if !missing_plugins.is_empty() {
        return Err(ConfigError::MissingPluginModules {
            modules: missing_plugins,
        });
    }
    if let Some(empty) = resolved.iter().find(|p| p.modules.is_empty()) {
        return Err(ConfigError::EmptyPublication {
            name: empty.name().to_string(),
        });
    }
    Ok(resolved)
}

/// A hand-written `plugin.xml` must be well-formed with an `<idea-plugin>` root.
fn check_plugin_xml(plugin: &IdeaPlugin) -> Result<(), ConfigError> {
    let Some(xml) = &plugin.plugin_xml else {
        return Ok(());
    };
    let invalid = |message: String| ConfigError::InvalidPluginXml {
        module: plugin.implementation_module.clone(),
        message,
    };
    let doc = Document::parse(xml).map_err(|e| invalid(e.to_string()))?;
    let root = doc.root_element().tag_name().name();
    if root != "idea-plugin" {
        return Err(invalid(format!("unexpected root element `<{}>`", root)));
    }
    Ok(())
}

/// Publications must select disjoint module sets.
pub fn check_overlaps(publications: &[ResolvedPublication<'_>]) -> Result<(), ConfigError> {
    for (i, a) in publications.iter().enumerate() {
        for b in &publications[i + 1..] {
            let mut shared: Vec<String> = a
                .modules
                .iter()
                .filter(|(id, _)| b.contains(id))
                .map(|(_, m)| m.name.clone())
                .collect();
            if !shared.is_empty() {
                shared.sort();
                return Err(ConfigError::PublicationOverlap {
                    first: a.name().to_string(),
                    second: b.name().to_string(),
                    modules: shared,
                });
            }
        }
    }
    Ok(())
}
