//! Path macros.
//!
//! Descriptor model roots are written with `${name}` placeholders, most
//! commonly `${module}` for the folder holding the descriptor.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::util::fs::normalize_lexically;

/// Name of the macro bound to a module's descriptor folder.
pub const MODULE_MACRO: &str = "module";

/// A `${name}` placeholder with no binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unresolved macro `${{{name}}}` in `{path}`")]
pub struct UnresolvedMacro {
    pub name: String,
    pub path: String,
}

/// A set of macro bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Macros {
    values: BTreeMap<String, PathBuf>,
}

impl Macros {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a binding.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PathBuf>) {
        self.values.insert(name.into(), value.into());
    }

    /// Copy of these bindings with one more.
    pub fn with(&self, name: impl Into<String>, value: impl Into<PathBuf>) -> Self {
        let mut macros = self.clone();
        macros.insert(name, value);
        macros
    }

    /// Copy with `${module}` bound to the folder of `descriptor`.
    pub fn for_descriptor(&self, descriptor: &Path) -> Self {
        let folder = descriptor.parent().unwrap_or(Path::new("."));
        self.with(MODULE_MACRO, folder)
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.values.get(name).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Expand every `${name}` in `raw` and normalize the result.
    pub fn resolve(&self, raw: &str) -> Result<PathBuf, UnresolvedMacro> {
        let mut expanded = String::with_capacity(raw.len());
        let mut rest = raw;

        while let Some(start) = rest.find("${") {
            expanded.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or_else(|| UnresolvedMacro {
                name: after.to_string(),
                path: raw.to_string(),
            })?;
            let name = &after[..end];
            let value = self.get(name).ok_or_else(|| UnresolvedMacro {
                name: name.to_string(),
                path: raw.to_string(),
            })?;
            expanded.push_str(&value.to_string_lossy());
            rest = &after[end + 1..];
        }
        expanded.push_str(rest);

        Ok(normalize_lexically(Path::new(&expanded)))
    }
}

impl FromIterator<(String, PathBuf)> for Macros {
    fn from_iter<I: IntoIterator<Item = (String, PathBuf)>>(iter: I) -> Self {
        Macros {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_module_macro() {
        let macros = Macros::new().for_descriptor(Path::new("/p/code/a/a.msd"));
        assert_eq!(
            macros.resolve("${module}/models").unwrap(),
            PathBuf::from("/p/code/a/models")
        );
        assert_eq!(
            macros.resolve("${module}/../shared").unwrap(),
            PathBuf::from("/p/code/shared")
        );
    }

    #[test]
    fn test_resolve_without_macros() {
        assert_eq!(
            Macros::new().resolve("/abs/./path").unwrap(),
            PathBuf::from("/abs/path")
        );
    }

    #[test]
    fn test_unresolved_macro() {
        let err = Macros::new().resolve("${mps_home}/languages").unwrap_err();
        assert_eq!(err.name, "mps_home");
        assert!(err.to_string().contains("${mps_home}"));
    }

    #[test]
    fn test_unterminated_macro() {
        assert!(Macros::new().with("a", "/x").resolve("${a").is_err());
    }
}
