//! Effective runtime dependencies of a module.
//!
//! Reproduces how MPS itself deploys a module: languages used directly or
//! through devkits, solutions exported by devkits, and the runtime solutions
//! of every used language including the languages it extends.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::core::descriptor::ModuleType;
use crate::core::module_id::{ModuleId, ModuleIdAndName};
use crate::core::registry::FoundModule;
use crate::resolver::{ModuleResolver, ResolveError};

/// Derived dependency sets of one module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuntimeDependencies {
    /// Languages used directly or exported by a used devkit
    pub used_languages: BTreeSet<ModuleId>,
    /// Used devkits including the devkits they extend
    pub used_devkits: BTreeSet<ModuleId>,
    /// Solutions exported by the used devkits
    pub devkit_solutions: BTreeSet<ModuleId>,
    /// Runtime solutions of the used languages and the languages they extend
    pub language_runtimes: BTreeSet<ModuleId>,
    /// Devkit solutions plus the module's own resolved dependencies
    pub compile_dependencies: BTreeSet<ModuleId>,
}

/// Computes [`RuntimeDependencies`], caching language runtimes per
/// language version.
pub struct RuntimeDependencyCollector<'r, 'a> {
    resolver: &'r ModuleResolver<'a>,
    runtimes: HashMap<(ModuleId, i32), BTreeSet<ModuleId>>,
}

impl<'r, 'a> RuntimeDependencyCollector<'r, 'a> {
    pub fn new(resolver: &'r ModuleResolver<'a>) -> Self {
        RuntimeDependencyCollector {
            resolver,
            runtimes: HashMap::new(),
        }
    }

    pub fn collect_for(&mut self, module: &FoundModule) -> Result<RuntimeDependencies, ResolveError> {
        let mut deps = RuntimeDependencies::default();

        let mut languages: Vec<&'a FoundModule> = Vec::new();
        let mut devkits: Vec<&'a FoundModule> = Vec::new();
        for usage in module.used_languages_and_devkits() {
            let Some(target) = self.resolver.resolve_dependency(&usage, module)? else {
                continue;
            };
            match target.module_type {
                ModuleType::Language => languages.push(target),
                ModuleType::Devkit => devkits.push(target),
                other => debug!(
                    "{}: `{}` is used as a language but is a {}",
                    module.name, target.name, other
                ),
            }
        }

        for devkit in self.closure(devkits, |d| {
            d.descriptor
                .devkit()
                .map(|d| d.extended_devkits.clone())
                .unwrap_or_default()
        })? {
            deps.used_devkits.insert(devkit.id.clone());
            let Some(descriptor) = devkit.descriptor.devkit() else {
                continue;
            };
            for language in self.resolver.resolve_all(&descriptor.exported_languages, devkit)? {
                languages.push(language);
            }
            for solution in self.resolver.resolve_all(&descriptor.exported_solutions, devkit)? {
                deps.devkit_solutions.insert(solution.id.clone());
            }
        }

        deps.used_languages = languages.iter().map(|l| l.id.clone()).collect();

        for language in self.closure(languages, |l| {
            l.descriptor
                .language()
                .map(|l| l.extended_languages.clone())
                .unwrap_or_default()
        })? {
            let runtimes = self.runtimes_of(language)?;
            deps.language_runtimes.extend(runtimes);
        }

        deps.compile_dependencies = deps.devkit_solutions.clone();
        for dependency in module.module_dependencies() {
            if let Some(target) = self.resolver.resolve_dependency(dependency, module)? {
                deps.compile_dependencies.insert(target.id.clone());
            }
        }

        Ok(deps)
    }

    /// Runtime solutions declared by one language, cached per version.
    fn runtimes_of(&mut self, language: &'a FoundModule) -> Result<BTreeSet<ModuleId>, ResolveError> {
        let Some(descriptor) = language.descriptor.language() else {
            return Ok(BTreeSet::new());
        };
        let key = (language.id.clone(), descriptor.language_version);
        if let Some(cached) = self.runtimes.get(&key) {
            return Ok(cached.clone());
        }

        let runtimes: BTreeSet<ModuleId> = self
            .resolver
            .resolve_all(&descriptor.runtime, language)?
            .into_iter()
            .map(|m| m.id.clone())
            .collect();
        self.runtimes.insert(key, runtimes.clone());
        Ok(runtimes)
    }

    /// `start` plus everything reachable through `extended`, each module
    /// once, in discovery order.
    fn closure(
        &self,
        start: Vec<&'a FoundModule>,
        extended: impl Fn(&FoundModule) -> Vec<ModuleIdAndName>,
    ) -> Result<Vec<&'a FoundModule>, ResolveError> {
        let mut visited = BTreeSet::new();
        let mut result = Vec::new();
        let mut worklist = start;
        worklist.reverse();

        while let Some(module) = worklist.pop() {
            if !visited.insert(module.id.clone()) {
                continue;
            }
            result.push(module);
            let mut next = self.resolver.resolve_all(&extended(module), module)?;
            next.reverse();
            worklist.extend(next);
        }
        Ok(result)
    }
}
