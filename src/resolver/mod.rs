//! Module resolution.
//!
//! References between modules carry an id and an optional name. The
//! [`ModuleResolver`] looks them up in the mined registry, honoring the
//! configured ignore list and each reference's ignore-if-missing flag.

pub mod errors;
pub mod runtime;

use std::collections::BTreeSet;

use tracing::debug;

use crate::core::dependency::ModuleDependency;
use crate::core::module_id::{ModuleId, ModuleIdAndName};
use crate::core::registry::{FoundModule, FoundModules};

pub use errors::ResolveError;
pub use runtime::{RuntimeDependencies, RuntimeDependencyCollector};

/// Resolves module references against a registry.
#[derive(Debug, Clone)]
pub struct ModuleResolver<'a> {
    modules: &'a FoundModules,
    ignored: BTreeSet<ModuleId>,
}

impl<'a> ModuleResolver<'a> {
    pub fn new(modules: &'a FoundModules, ignored: BTreeSet<ModuleId>) -> Self {
        ModuleResolver { modules, ignored }
    }

    pub fn available_modules(&self) -> &'a FoundModules {
        self.modules
    }

    pub fn is_ignored(&self, id: &ModuleId) -> bool {
        self.ignored.contains(id)
    }

    fn lookup(&self, reference: &ModuleIdAndName) -> Option<&'a FoundModule> {
        self.modules.get(&reference.id).or_else(|| {
            let by_name = self.modules.find_by_name(reference.name.as_deref()?)?;
            debug!("resolved `{}` by name to {}", reference, by_name.id);
            Some(by_name)
        })
    }

    /// Look up a reference by id, then by name. Ignored targets resolve to
    /// `None`.
    pub fn resolve(&self, reference: &ModuleIdAndName) -> Option<&'a FoundModule> {
        if self.is_ignored(&reference.id) {
            return None;
        }
        self.lookup(reference).filter(|m| !self.is_ignored(&m.id))
    }

    /// Resolve a mandatory reference made by `requesting`.
    ///
    /// Targets on the ignore list yield `Ok(None)`; any other miss is an
    /// error.
    pub fn resolve_module(
        &self,
        reference: &ModuleIdAndName,
        requesting: &FoundModule,
    ) -> Result<Option<&'a FoundModule>, ResolveError> {
        if self.is_ignored(&reference.id) {
            return Ok(None);
        }
        match self.lookup(reference) {
            Some(found) if self.is_ignored(&found.id) => Ok(None),
            Some(found) => Ok(Some(found)),
            None => Err(ResolveError::Unresolved {
                requesting: requesting.id_and_name(),
                missing: reference.clone(),
            }),
        }
    }

    /// Resolve a declared dependency. Misses of ignore-if-missing
    /// dependencies are dropped.
    pub fn resolve_dependency(
        &self,
        dependency: &ModuleDependency,
        requesting: &FoundModule,
    ) -> Result<Option<&'a FoundModule>, ResolveError> {
        match self.resolve_module(&dependency.target(), requesting) {
            Err(_) if dependency.ignore_if_missing => {
                debug!(
                    "{}: dropping missing optional dependency {}",
                    requesting.name,
                    dependency.target()
                );
                Ok(None)
            }
            other => other,
        }
    }

    /// Resolve every reference in `references`, skipping ignored ones.
    pub fn resolve_all<'r>(
        &self,
        references: impl IntoIterator<Item = &'r ModuleIdAndName>,
        requesting: &FoundModule,
    ) -> Result<Vec<&'a FoundModule>, ResolveError> {
        let mut resolved = Vec::new();
        for reference in references {
            if let Some(module) = self.resolve_module(reference, requesting)? {
                resolved.push(module);
            }
        }
        Ok(resolved)
    }
}
