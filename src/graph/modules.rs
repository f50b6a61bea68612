//! The dependency graph over discovered modules.

use tracing::debug;

use crate::core::module_id::{ModuleId, ModuleIdAndName};
use crate::core::registry::FoundModule;
use crate::graph::{DependencyGraph, GraphElement};
use crate::resolver::{ModuleResolver, ResolveError, RuntimeDependencyCollector};

impl GraphElement for &FoundModule {
    type Id = ModuleId;

    fn graph_id(&self) -> ModuleId {
        self.id.clone()
    }
}

pub type ModuleGraph<'a> = DependencyGraph<&'a FoundModule>;

/// Load the graph of `roots` and everything they need to be built.
///
/// Declared module dependencies always become edges. With
/// `include_language_usage`, so do used languages together with their
/// generators, solutions exported by used devkits, and language runtimes.
pub fn load_module_graph<'a>(
    resolver: &ModuleResolver<'a>,
    roots: impl IntoIterator<Item = &'a FoundModule>,
    include_language_usage: bool,
) -> Result<ModuleGraph<'a>, ResolveError> {
    let mut collector = RuntimeDependencyCollector::new(resolver);
    let mut graph = ModuleGraph::new();

    graph.load(roots, |module: &&'a FoundModule| {
        let module: &'a FoundModule = module;
        let mut targets = Vec::new();

        for dependency in module.module_dependencies() {
            if let Some(target) = resolver.resolve_dependency(dependency, module)? {
                targets.push(target);
            }
        }

        if include_language_usage {
            let runtime = collector.collect_for(module)?;
            for id in &runtime.used_languages {
                let Some(language) = resolver.resolve(&ModuleIdAndName::new(id.clone(), None)) else {
                    continue;
                };
                targets.push(language);
                targets.extend(
                    language
                        .descriptor
                        .generators()
                        .iter()
                        .filter_map(|g| resolver.resolve(&g.id_and_name())),
                );
            }
            for id in runtime
                .devkit_solutions
                .iter()
                .chain(&runtime.language_runtimes)
            {
                if let Some(target) = resolver.resolve(&ModuleIdAndName::new(id.clone(), None)) {
                    targets.push(target);
                }
            }
        }

        targets.retain(|t| t.id != module.id);

        debug!("{} depends on {} modules", module.name, targets.len());
        Ok::<_, ResolveError>(targets)
    })?;

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::FoundModules;
    use crate::resolver::tests::add;
    use std::collections::BTreeSet;

    fn registry() -> FoundModules {
        let mut modules = FoundModules::new();
        add(
            &mut modules,
            "lang.mpl",
            r#"<language namespace="lang" uuid="l">
  <generators><generator namespace="lang.gen" uuid="g"/></generators>
  <runtime><dependency reexport="false">rt(lang.runtime)</dependency></runtime>
</language>"#,
        );
        add(&mut modules, "rt.msd", r#"<solution name="lang.runtime" uuid="rt"/>"#);
        add(&mut modules, "lib.msd", r#"<solution name="lib" uuid="lib"/>"#);
        add(
            &mut modules,
            "app.msd",
            r#"<solution name="app" uuid="app">
  <dependencies><dependency reexport="false">lib(lib)</dependency></dependencies>
  <languageVersions><language slang="l:l:lang" version="0"/></languageVersions>
</solution>"#,
        );
        modules
            .get_mut(&ModuleId::new("app"))
            .unwrap()
            .add_model_usage(ModuleIdAndName::new(ModuleId::new("l"), Some("lang".into())));
        modules
    }

    fn dependency_names(graph: &ModuleGraph<'_>, id: &str) -> BTreeSet<String> {
        graph
            .element_dependencies(&ModuleId::new(id))
            .into_iter()
            .map(|m| m.name.clone())
            .collect()
    }

    #[test]
    fn test_language_usage_edges() {
        let modules = registry();
        let resolver = ModuleResolver::new(&modules, BTreeSet::new());
        let app = modules.get(&ModuleId::new("app")).unwrap();

        let graph = load_module_graph(&resolver, [app], true).unwrap();
        assert_eq!(
            dependency_names(&graph, "app"),
            ["lib", "lang", "lang.gen", "lang.runtime"]
                .into_iter()
                .map(String::from)
                .collect::<BTreeSet<_>>()
        );
        assert!(graph.contains(&ModuleId::new("g")));
    }

    #[test]
    fn test_without_language_usage_edges() {
        let modules = registry();
        let resolver = ModuleResolver::new(&modules, BTreeSet::new());
        let app = modules.get(&ModuleId::new("app")).unwrap();

        let graph = load_module_graph(&resolver, [app], false).unwrap();
        assert_eq!(graph.element_count(), 2);
        assert_eq!(
            dependency_names(&graph, "app"),
            BTreeSet::from(["lib".to_string()])
        );
    }

    #[test]
    fn test_unresolved_dependency_fails_load() {
        let mut modules = registry();
        add(
            &mut modules,
            "broken.msd",
            r#"<solution name="broken" uuid="broken">
  <dependencies><dependency reexport="false">nowhere(nowhere)</dependency></dependencies>
</solution>"#,
        );
        let resolver = ModuleResolver::new(&modules, BTreeSet::new());
        let broken = modules.get(&ModuleId::new("broken")).unwrap();

        assert!(load_module_graph(&resolver, [broken], false).is_err());
    }
}
