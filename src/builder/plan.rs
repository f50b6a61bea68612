//! Build plan generation.
//!
//! A [`BuildPlan`] describes everything needed to build the configured
//! publications: build chunks in dependency order, the modules each chunk
//! generates and compiles, and the artifacts every publication packages.
//! A chunk is one node of the checked module graph, so modules that form a
//! cycle always share a chunk.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::coordinates::Coordinates;
use crate::core::descriptor::ModuleType;
use crate::core::module_id::{ModuleId, ModuleIdAndName};
use crate::core::owner::ModuleOwner;
use crate::core::registry::{FoundModule, FoundModules};
use crate::core::workspace::Workspace;
use crate::graph::{CycleError, DependencyNode, ModuleGraph};
use crate::ops::check::CheckedGraph;
use crate::resolver::{ModuleResolver, ResolveError, RuntimeDependencyCollector};
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Folder below the build directory receiving packaged module jars.
pub const PACKAGED_MODULES_DIR: &str = "packaged-modules";

/// Folder below the build directory receiving assembled IDEA plugins.
pub const IDEA_PLUGINS_DIR: &str = "idea-plugins";

/// Errors raised while turning a checked graph into a plan.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("module `{module}` uses undefined macro `{name}` in `{path}`")]
    UnresolvedMacro {
        module: String,
        name: String,
        path: String,
    },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Cycle(#[from] CycleError),
}

impl PlanError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            PlanError::UnresolvedMacro { module, name, path } => {
                Diagnostic::error(format!("undefined path macro `${{{}}}`", name))
                    .with_context(format!("used by module `{}`", module))
                    .with_context(format!("in model root `{}`", path))
                    .with_suggestion(suggestions::DEFINE_MACRO)
            }
            PlanError::Resolve(err) => err.to_diagnostic(),
            PlanError::Cycle(err) => Diagnostic::error(err.to_string()),
        }
    }
}

/// A complete build plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildPlan {
    pub project: String,

    /// Workspace root; rendered paths are relative to it
    pub root: PathBuf,

    pub build_dir: PathBuf,

    /// Heap size handed to the build process, passed through unchanged
    pub heap_size: String,

    pub macros: BTreeMap<String, PathBuf>,

    /// Chunks in build order, dependencies first
    pub chunks: Vec<BuildChunk>,

    pub publications: Vec<PublicationArtifacts>,

    /// SHA-256 of the rendered build description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

/// Modules that are generated and compiled together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildChunk {
    pub name: String,

    /// Publication this chunk was merged into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication: Option<String>,

    /// Names of chunks that must be built first
    pub depends_on: Vec<String>,

    pub modules: Vec<ModuleBuild>,
}

/// Build instructions for one source module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleBuild {
    pub id: ModuleId,
    pub name: String,
    pub kind: ModuleType,
    pub descriptor: PathBuf,

    /// Model root folders with all macros expanded
    pub model_roots: Vec<PathBuf>,

    pub source_gen_dir: PathBuf,
    pub classes_dir: PathBuf,

    /// Class folders and jars of everything the module depends on
    pub classpath: Vec<PathBuf>,

    pub used_languages: Vec<String>,

    /// Runtime solutions of the used languages
    pub runtime: Vec<String>,

    /// Jar the module is packaged into, if a publication contains it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<PathBuf>,
}

/// What a publication packages and needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationArtifacts {
    pub name: String,
    pub artifact_name: String,
    pub modules: Vec<String>,
    pub generated_files: Vec<PathBuf>,

    /// Publications that must be available first
    pub depends_on: Vec<String>,

    /// `group:artifact:version` of the libraries reached through stubs
    pub stub_coordinates: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub idea_plugins: Vec<IdeaPluginBuild>,
}

/// An IDEA plugin assembled from a module of a publication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdeaPluginBuild {
    pub module: String,
    pub id: ModuleId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_xml: Option<String>,

    /// Folder the plugin layout is written to
    pub output_dir: PathBuf,
}

impl BuildPlan {
    /// Create a plan from the checked graph of `workspace`.
    pub fn new<'a>(
        workspace: &Workspace,
        modules: &'a FoundModules,
        checked: &CheckedGraph<'a>,
    ) -> Result<Self, PlanError> {
        let resolver = ModuleResolver::new(modules, workspace.ignored_modules().clone());
        let mut planner = Planner {
            workspace,
            checked,
            resolver: &resolver,
            collector: RuntimeDependencyCollector::new(&resolver),
        };

        let publications = planner.publication_artifacts();
        let packages: HashMap<ModuleId, PathBuf> = (0..checked.publications.len())
            .flat_map(|i| planner.packaged_modules(i))
            .filter_map(|m| {
                planner
                    .packaged_files(m)
                    .into_iter()
                    .next()
                    .map(|jar| (m.id.clone(), jar))
            })
            .collect();

        let mut chunks = planner.chunks()?;
        for module in chunks.iter_mut().flat_map(|c| c.modules.iter_mut()) {
            module.package = packages.get(&module.id).cloned();
        }

        Ok(BuildPlan {
            project: workspace.project_name(),
            root: workspace.root().to_path_buf(),
            build_dir: workspace.build_dir().to_path_buf(),
            heap_size: workspace.heap_size().to_string(),
            macros: workspace
                .macros()
                .iter()
                .map(|(name, path)| (name.to_string(), path.to_path_buf()))
                .collect(),
            chunks,
            publications,
            fingerprint: None,
        })
    }

    pub fn module_count(&self) -> usize {
        self.chunks.iter().map(|c| c.modules.len()).sum()
    }

    /// Find the chunk building the module with `name`.
    pub fn chunk_of(&self, name: &str) -> Option<&BuildChunk> {
        self.chunks
            .iter()
            .find(|c| c.modules.iter().any(|m| m.name == name))
    }

    pub fn publication(&self, name: &str) -> Option<&PublicationArtifacts> {
        self.publications.iter().find(|p| p.name == name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

struct Planner<'p, 'a> {
    workspace: &'p Workspace,
    checked: &'p CheckedGraph<'a>,
    resolver: &'p ModuleResolver<'a>,
    collector: RuntimeDependencyCollector<'p, 'a>,
}

impl<'p, 'a> Planner<'p, 'a> {
    fn chunks(&mut self) -> Result<Vec<BuildChunk>, PlanError> {
        let checked = self.checked;
        let graph = &checked.graph;
        let order = graph.topological_order()?;

        let mut names: HashMap<DependencyNode, String> = HashMap::new();
        for node in &order {
            if graph.elements(*node).any(|m| is_built(m)) {
                names.insert(*node, format!("chunk-{}", names.len()));
            }
        }

        let mut chunks = Vec::with_capacity(names.len());
        for node in order {
            let Some(name) = names.get(&node) else {
                continue;
            };
            let members = dependency_order(
                graph.elements(node).copied().filter(|m| is_built(m)).collect(),
                graph,
            );

            let mut modules = Vec::with_capacity(members.len());
            for module in members {
                modules.push(self.module_build(module)?);
            }

            debug!("{}: {} modules", name, modules.len());
            chunks.push(BuildChunk {
                name: name.clone(),
                publication: checked
                    .publication_of(node)
                    .map(|i| checked.publications[i].name().to_string()),
                depends_on: self.chunk_dependencies(node, &names),
                modules,
            });
        }
        Ok(chunks)
    }

    /// Chunks reachable from `node`, looking through nodes that hold nothing
    /// to build.
    fn chunk_dependencies(
        &self,
        node: DependencyNode,
        names: &HashMap<DependencyNode, String>,
    ) -> Vec<String> {
        let graph = &self.checked.graph;
        let mut result = BTreeSet::new();
        let mut visited = BTreeSet::new();
        let mut stack: Vec<DependencyNode> = graph.dependencies(node).into_iter().collect();

        while let Some(next) = stack.pop() {
            if !visited.insert(next) {
                continue;
            }
            match names.get(&next) {
                Some(name) => {
                    result.insert(name.clone());
                }
                None => stack.extend(graph.dependencies(next)),
            }
        }
        result.into_iter().collect()
    }

    fn module_build(&mut self, module: &'a FoundModule) -> Result<ModuleBuild, PlanError> {
        let macros = self.workspace.macros().for_descriptor(&module.descriptor_path);
        let model_roots = module
            .descriptor
            .model_root_paths()
            .iter()
            .map(|raw| {
                macros.resolve(raw).map_err(|e| PlanError::UnresolvedMacro {
                    module: module.name.clone(),
                    name: e.name,
                    path: e.path,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let runtime = self.collector.collect_for(module)?;
        let out_dir = self.module_out_dir(module);

        Ok(ModuleBuild {
            id: module.id.clone(),
            name: module.name.clone(),
            kind: module.module_type,
            descriptor: module.descriptor_path.clone(),
            model_roots,
            source_gen_dir: out_dir.join("source_gen"),
            classes_dir: out_dir.join("classes"),
            classpath: self.classpath(module),
            used_languages: self.names(&runtime.used_languages),
            runtime: self.names(&runtime.language_runtimes),
            package: None,
        })
    }

    /// Output folders and jars of every module `module` transitively
    /// depends on, in a stable order.
    fn classpath(&self, module: &'a FoundModule) -> Vec<PathBuf> {
        let graph = &self.checked.graph;
        let mut entries = BTreeSet::new();
        let mut visited = BTreeSet::from([module.id.clone()]);
        let mut queue: VecDeque<&FoundModule> =
            graph.element_dependencies(&module.id).into_iter().copied().collect();

        while let Some(dependency) = queue.pop_front() {
            if !visited.insert(dependency.id.clone()) {
                continue;
            }
            if dependency.is_stub() {
                entries.extend(dependency.descriptor.stub_entries.iter().map(PathBuf::from));
            } else {
                match &dependency.owner {
                    ModuleOwner::Source { .. } => {
                        entries.insert(self.module_out_dir(dependency).join("classes"));
                    }
                    ModuleOwner::Library { path, .. } => {
                        entries.insert(path.clone());
                    }
                    ModuleOwner::Plugin { .. } => {}
                }
            }
            queue.extend(graph.element_dependencies(&dependency.id).into_iter().copied());
        }
        entries.into_iter().collect()
    }

    fn module_out_dir(&self, module: &FoundModule) -> PathBuf {
        self.workspace.build_dir().join("modules").join(&module.name)
    }

    fn names(&self, ids: &BTreeSet<ModuleId>) -> Vec<String> {
        let mut names: Vec<String> = ids
            .iter()
            .map(|id| match self.resolver.resolve(&ModuleIdAndName::new(id.clone(), None)) {
                Some(module) => module.name.clone(),
                None => id.to_string(),
            })
            .collect();
        names.sort();
        names
    }

    fn publication_artifacts(&self) -> Vec<PublicationArtifacts> {
        let checked = self.checked;
        checked
            .publications
            .iter()
            .enumerate()
            .map(|(index, publication)| {
                let packaged = self.packaged_modules(index);

                let mut modules: Vec<String> = packaged.iter().map(|m| m.name.clone()).collect();
                modules.sort();

                let mut generated_files: Vec<PathBuf> = packaged
                    .iter()
                    .flat_map(|m| self.packaged_files(m))
                    .collect();
                generated_files.sort();
                generated_files.dedup();

                PublicationArtifacts {
                    name: publication.name().to_string(),
                    artifact_name: publication.publication.artifact_name(),
                    modules,
                    generated_files,
                    depends_on: checked
                        .publication_dependencies(index)
                        .into_iter()
                        .map(|i| checked.publications[i].name().to_string())
                        .collect(),
                    stub_coordinates: self.stub_coordinates(checked.publication_node(index)),
                    idea_plugins: publication
                        .idea_plugins
                        .iter()
                        .map(|p| IdeaPluginBuild {
                            module: p.module.name.clone(),
                            id: p.module.id.clone(),
                            description: p.plugin.description.clone(),
                            plugin_xml: p.plugin.plugin_xml.clone(),
                            output_dir: self
                                .workspace
                                .build_dir()
                                .join(IDEA_PLUGINS_DIR)
                                .join(&p.module.name),
                        })
                        .collect(),
                }
            })
            .collect()
    }

    /// Modules packaged by the publication at `index`: its own source
    /// modules and those folded into it. IDEA plugin modules ship inside
    /// their plugin instead.
    fn packaged_modules(&self, index: usize) -> Vec<&'a FoundModule> {
        let checked = self.checked;
        let plugin_modules: BTreeSet<&ModuleId> = checked
            .publications
            .iter()
            .flat_map(|p| p.idea_plugins.iter().map(|plugin| &plugin.module.id))
            .collect();
        checked
            .graph
            .elements(checked.publication_node(index))
            .copied()
            .filter(|m| is_built(m) && !plugin_modules.contains(&m.id))
            .collect()
    }

    /// Jars produced when packaging `module`, main jar first.
    fn packaged_files(&self, module: &FoundModule) -> Vec<PathBuf> {
        let dir = self.workspace.build_dir().join(PACKAGED_MODULES_DIR);
        match module.module_type {
            ModuleType::Generator => vec![dir.join(self.generator_jar_name(module))],
            _ => vec![
                dir.join(format!("{}.jar", module.name)),
                dir.join(format!("{}-src.jar", module.name)),
            ],
        }
    }

    /// `<language>-generator.jar`, numbered when the language has more than
    /// one generator.
    fn generator_jar_name(&self, generator: &FoundModule) -> String {
        let language = generator
            .descriptor
            .generator()
            .and_then(|g| g.source_language.as_ref());
        let Some(reference) = language else {
            return format!("{}-generator.jar", generator.name);
        };

        match self.resolver.resolve(reference) {
            Some(language) => {
                let generators = language.descriptor.generators();
                match generators.iter().position(|g| g.id == generator.id) {
                    Some(index) if generators.len() > 1 => {
                        format!("{}-{}-generator.jar", language.name, index)
                    }
                    _ => format!("{}-generator.jar", language.name),
                }
            }
            None => format!("{}-generator.jar", reference.display_name()),
        }
    }

    /// Coordinates of stub solutions reachable from `node`.
    fn stub_coordinates(&self, node: DependencyNode) -> Vec<String> {
        let graph = &self.checked.graph;
        let mut coordinates = BTreeSet::new();
        let mut visited = BTreeSet::new();
        let mut stack = vec![node];

        while let Some(next) = stack.pop() {
            if !visited.insert(next) {
                continue;
            }
            for module in graph.elements(next).filter(|m| m.is_stub()) {
                match Coordinates::from_stub_name(&module.name) {
                    Ok(c) => {
                        coordinates.insert(c.to_string());
                    }
                    Err(_) => debug!("stub `{}` has no library coordinates", module.name),
                }
            }
            stack.extend(graph.dependencies(next));
        }
        coordinates.into_iter().collect()
    }
}

/// Order the modules of one chunk so that dependencies come first, as far
/// as they do not form a cycle. Ties keep load order.
fn dependency_order<'a>(
    mut pending: Vec<&'a FoundModule>,
    graph: &ModuleGraph<'a>,
) -> Vec<&'a FoundModule> {
    let mut ordered = Vec::with_capacity(pending.len());
    while !pending.is_empty() {
        let ready = pending
            .iter()
            .position(|m| {
                graph
                    .element_dependencies(&m.id)
                    .iter()
                    .all(|d| d.id == m.id || !pending.iter().any(|p| p.id == d.id))
            })
            .unwrap_or(0);
        ordered.push(pending.remove(ready));
    }
    ordered
}

/// Source modules that get generated, compiled and packaged.
fn is_built(module: &FoundModule) -> bool {
    module.owner.is_source() && !module.is_stub()
}
