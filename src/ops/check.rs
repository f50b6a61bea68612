//! Publication consistency checks.
//!
//! Loads the module graph for all configured publications, merges every
//! publication into a single node and collapses cycles, failing as soon as
//! publications would have to be built as one unit.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{anyhow, Result};
use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::module_id::ModuleId;
use crate::core::registry::{FoundModule, FoundModules};
use crate::core::workspace::Workspace;
use crate::graph::cycles::Cycle;
use crate::graph::{load_module_graph, DependencyNode, ModuleGraph};
use crate::ops::publications::{
    check_overlaps, resolve_publications, validate_names, ResolvedPublication,
};
use crate::resolver::ModuleResolver;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Invalid publication configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum ConfigError {
    #[error("publications `{first}` and `{second}` both contain {}", modules.join(", "))]
    #[diagnostic(
        code(mpsbuild::config::publication_overlap),
        help("Every module may belong to one publication only")
    )]
    PublicationOverlap {
        first: String,
        second: String,
        modules: Vec<String>,
    },

    #[error("cycle between publications {}", publications.join(" and "))]
    #[diagnostic(
        code(mpsbuild::config::publication_cycle),
        help("Move the modules on the cycle into one publication")
    )]
    CrossPublicationCycle {
        publications: Vec<String>,
        modules: Vec<String>,
    },

    #[error("module {} is used by several publications but not part of any", modules.join(", "))]
    #[diagnostic(
        code(mpsbuild::config::orphaned_module),
        help("Add the module to one of the publications that use it")
    )]
    OrphanedSharedModule {
        modules: Vec<String>,
        publications: Vec<String>,
    },

    #[error("modules not found: {}", modules.join(", "))]
    #[diagnostic(code(mpsbuild::config::missing_modules))]
    MissingIncludedModules { modules: Vec<String> },

    #[error("IDEA plugin implementation modules not found: {}", modules.join(", "))]
    #[diagnostic(code(mpsbuild::config::missing_plugin_modules))]
    MissingPluginModules { modules: Vec<String> },

    #[error("invalid plugin.xml for IDEA plugin `{module}`: {message}")]
    #[diagnostic(
        code(mpsbuild::config::invalid_plugin_xml),
        help("The document must have an `<idea-plugin>` root element")
    )]
    InvalidPluginXml { module: String, message: String },

    #[error("unexpected merge of publications `{first}` and `{second}`")]
    #[diagnostic(code(mpsbuild::config::publication_merge))]
    UnexpectedPublicationMerge { first: String, second: String },

    #[error("publication `{name}` is declared twice")]
    #[diagnostic(code(mpsbuild::config::duplicate_publication))]
    DuplicatePublication { name: String },

    #[error("`{name}` cannot be used as a publication name")]
    #[diagnostic(
        code(mpsbuild::config::reserved_name),
        help("`all` selects every publication on the command line")
    )]
    ReservedPublicationName { name: String },

    #[error("publication `{name}` contains no modules")]
    #[diagnostic(code(mpsbuild::config::empty_publication))]
    EmptyPublication { name: String },
}

impl ConfigError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            ConfigError::PublicationOverlap { .. } => {
                diag.with_suggestion(suggestions::REVIEW_PUBLICATIONS)
            }
            ConfigError::CrossPublicationCycle { modules, .. } => diag
                .with_context(format!("probably caused by: {}", modules.join(", ")))
                .with_suggestion(suggestions::REVIEW_PUBLICATIONS),
            ConfigError::OrphanedSharedModule { publications, .. } => diag
                .with_context(format!("used by: {}", publications.join(", ")))
                .with_suggestion(suggestions::REVIEW_PUBLICATIONS),
            ConfigError::MissingIncludedModules { .. }
            | ConfigError::MissingPluginModules { .. } => {
                diag.with_suggestion(suggestions::MODULE_NOT_FOUND)
            }
            _ => diag,
        }
    }
}

/// The module graph after all publication checks and merges.
#[derive(Debug)]
pub struct CheckedGraph<'a> {
    pub graph: ModuleGraph<'a>,
    pub publications: Vec<ResolvedPublication<'a>>,
    publication_nodes: Vec<DependencyNode>,
}

impl<'a> CheckedGraph<'a> {
    /// Live node of the publication at `index`.
    pub fn publication_node(&self, index: usize) -> DependencyNode {
        self.graph.merged_node(self.publication_nodes[index])
    }

    /// Index of the publication merged into `node`.
    pub fn publication_of(&self, node: DependencyNode) -> Option<usize> {
        let node = self.graph.merged_node(node);
        (0..self.publication_nodes.len()).find(|&i| self.publication_node(i) == node)
    }

    /// Publications the given publication depends on, transitively through
    /// nodes that belong to no publication.
    pub fn publication_dependencies(&self, index: usize) -> BTreeSet<usize> {
        let mut result = BTreeSet::new();
        let mut visited = BTreeSet::new();
        let mut stack: Vec<DependencyNode> = self
            .graph
            .dependencies(self.publication_node(index))
            .into_iter()
            .collect();

        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            match self.publication_of(node) {
                Some(other) => {
                    result.insert(other);
                }
                None => stack.extend(self.graph.dependencies(node)),
            }
        }
        result.remove(&index);
        result
    }
}

/// Run every check against mined `modules`.
pub fn check_publications<'a>(
    workspace: &Workspace,
    modules: &'a FoundModules,
) -> Result<CheckedGraph<'a>> {
    validate_names(workspace.publications())?;
    let publications = resolve_publications(workspace.publications(), modules)?;
    check_overlaps(&publications)?;

    let resolver = ModuleResolver::new(modules, workspace.ignored_modules().clone());
    let roots: Vec<&FoundModule> = publications
        .iter()
        .flat_map(|p| p.modules.values().copied())
        .collect();
    let mut graph = load_module_graph(&resolver, roots, workspace.include_language_usage())?;
    debug!("loaded graph of {} modules", graph.element_count());

    let module_publication: BTreeMap<ModuleId, usize> = publications
        .iter()
        .enumerate()
        .flat_map(|(i, p)| p.modules.keys().map(move |id| (id.clone(), i)))
        .collect();

    check_cross_publication_cycles(&graph, &publications, &module_publication)?;

    let publication_nodes = publications
        .iter()
        .map(|p| graph.merge_elements(p.modules.keys()))
        .collect::<Option<Vec<DependencyNode>>>()
        .ok_or_else(|| anyhow!("publication modules are missing from the dependency graph"))?;
    let mut checked = CheckedGraph {
        graph,
        publications,
        publication_nodes,
    };

    check_cross_publication_cycles(&checked.graph, &checked.publications, &module_publication)?;
    checked.ensure_publications_not_merged()?;

    let merged = checked.graph.merge_cycles();
    if merged > 0 {
        debug!("merged {} cycles", merged);
    }
    checked.ensure_publications_not_merged()?;

    checked.fold_exclusive_dependencies();
    checked.ensure_publications_not_merged()?;

    checked.check_orphans()?;

    for (i, publication) in checked.publications.iter().enumerate() {
        info!(
            "publication `{}`: {} modules",
            publication.name(),
            checked.graph.elements(checked.publication_node(i)).count()
        );
    }
    Ok(checked)
}

fn check_cross_publication_cycles(
    graph: &ModuleGraph<'_>,
    publications: &[ResolvedPublication<'_>],
    module_publication: &BTreeMap<ModuleId, usize>,
) -> Result<(), ConfigError> {
    let cycles = graph.detect_cycles(|node| {
        graph
            .elements(node)
            .find_map(|m| module_publication.get(&m.id).copied())
    });

    match cycles.into_iter().find(Cycle::spans_categories) {
        None => Ok(()),
        Some(cycle) => {
            let mut modules: Vec<String> = cycle
                .nodes
                .iter()
                .flat_map(|n| graph.elements(*n).map(|m| m.name.clone()))
                .collect();
            modules.sort();
            Err(ConfigError::CrossPublicationCycle {
                publications: cycle
                    .categories
                    .iter()
                    .map(|&i| publications[i].name().to_string())
                    .collect(),
                modules,
            })
        }
    }
}

impl<'a> CheckedGraph<'a> {
    fn ensure_publications_not_merged(&self) -> Result<(), ConfigError> {
        for a in 0..self.publication_nodes.len() {
            for b in a + 1..self.publication_nodes.len() {
                if self.publication_node(a) == self.publication_node(b) {
                    return Err(ConfigError::UnexpectedPublicationMerge {
                        first: self.publications[a].name().to_string(),
                        second: self.publications[b].name().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Merge nodes with a single dependent into that dependent, as long as
    /// they hold source modules and are not publications themselves.
    fn fold_exclusive_dependencies(&mut self) {
        loop {
            let mut any_merge = false;
            for node in self.graph.nodes() {
                let node = self.graph.merged_node(node);
                if self.publication_of(node).is_some() {
                    continue;
                }
                if !self.graph.elements(node).any(|m| m.owner.is_source()) {
                    continue;
                }
                let dependents = self.graph.reverse_dependencies(node);
                if dependents.len() != 1 {
                    continue;
                }
                if let Some(&dependent) = dependents.iter().next() {
                    self.graph.merge_nodes(node, dependent);
                    any_merge = true;
                }
            }
            if !any_merge {
                break;
            }
        }
    }

    /// Every node holding non-stub source modules must belong to a
    /// publication once folding is done.
    fn check_orphans(&self) -> Result<(), ConfigError> {
        for node in self.graph.nodes() {
            let mut modules: Vec<String> = self
                .graph
                .elements(node)
                .filter(|m| m.owner.is_source() && !m.is_stub())
                .map(|m| m.name.clone())
                .collect();
            if modules.is_empty() || self.publication_of(node).is_some() {
                continue;
            }
            modules.sort();
            let publications = self
                .graph
                .reverse_dependencies(node)
                .into_iter()
                .filter_map(|n| self.publication_of(n))
                .map(|i| self.publications[i].name().to_string())
                .collect();
            return Err(ConfigError::OrphanedSharedModule {
                modules,
                publications,
            });
        }
        Ok(())
    }
}
