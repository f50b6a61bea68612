//! Module identities and module references.
//!
//! Every MPS module has a UUID-like id and a human readable name. Descriptor
//! files refer to other modules with one of three spellings:
//!
//! - `uuid(name)` in `<dependency>` and `<runtime>` lists
//! - `l:uuid:name` in `<languageVersions>` and model `<use>` elements
//! - a bare `uuid`
//!
//! [`ModuleIdAndName`] parses all three.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of stub solution names.
pub const STUB_NAME_PREFIX: &str = "stubs#";

/// Prefix of stub solution ids.
pub const STUB_ID_PREFIX: char = '~';

/// A module identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    /// Create a module id from its textual form.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        match id.trim() {
            trimmed if trimmed.len() == id.len() => ModuleId(id),
            trimmed => ModuleId(trimmed.to_string()),
        }
    }

    /// The id of the stub solution with the given name.
    pub fn for_stub(stub_name: &str) -> Self {
        ModuleId(format!("{}{}", STUB_ID_PREFIX, stub_name))
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id belongs to a generated stub solution.
    pub fn is_stub(&self) -> bool {
        self.0.starts_with(STUB_ID_PREFIX)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        ModuleId::new(id)
    }
}

/// A malformed module reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid module reference `{0}`")]
pub struct InvalidModuleReference(pub String);

/// A reference to a module by id, with the name it was known by.
///
/// Equality, ordering and hashing only consider the id; the name is a hint
/// used for diagnostics and as a resolution fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleIdAndName {
    pub id: ModuleId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ModuleIdAndName {
    pub fn new(id: ModuleId, name: Option<String>) -> Self {
        ModuleIdAndName {
            id,
            name: name.filter(|n| !n.is_empty()),
        }
    }

    /// Parse any of the supported reference spellings.
    pub fn parse(reference: &str) -> Result<Self, InvalidModuleReference> {
        let trimmed = reference.trim();
        let invalid = || InvalidModuleReference(reference.to_string());

        if trimmed.is_empty() {
            return Err(invalid());
        }

        if let Some(rest) = trimmed.strip_prefix("l:") {
            let (id, name) = rest.split_once(':').ok_or_else(invalid)?;
            if id.is_empty() {
                return Err(invalid());
            }
            return Ok(Self::new(ModuleId::new(id), Some(name.to_string())));
        }

        if let Some(open) = trimmed.find('(') {
            let name = trimmed[open + 1..].strip_suffix(')').ok_or_else(invalid)?;
            let id = &trimmed[..open];
            if id.is_empty() {
                return Err(invalid());
            }
            return Ok(Self::new(ModuleId::new(id), Some(name.to_string())));
        }

        Ok(Self::new(ModuleId::new(trimmed), None))
    }

    /// Name if known, the id otherwise.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}

impl FromStr for ModuleIdAndName {
    type Err = InvalidModuleReference;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq for ModuleIdAndName {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ModuleIdAndName {}

impl Hash for ModuleIdAndName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for ModuleIdAndName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ModuleIdAndName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for ModuleIdAndName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}({})", self.id, name),
            None => write!(f, "{}", self.id),
        }
    }
}
