//! Resolution error types and diagnostics.

use thiserror::Error;

use crate::core::module_id::ModuleIdAndName;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error during module resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("module `{requesting}` depends on `{missing}`, which was not found")]
    Unresolved {
        requesting: ModuleIdAndName,
        missing: ModuleIdAndName,
    },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::Unresolved {
                requesting,
                missing,
            } => Diagnostic::error(format!(
                "unresolved dependency `{}`",
                missing.display_name()
            ))
            .with_context(format!("required by `{}`", requesting.display_name()))
            .with_context(format!("module reference: {}", missing))
            .with_suggestion(suggestions::MODULE_NOT_FOUND)
            .with_suggestion(suggestions::SET_MPS_HOME)
            .with_suggestion(suggestions::IGNORE_MODULE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::module_id::ModuleId;

    #[test]
    fn test_unresolved_diagnostic() {
        let err = ResolveError::Unresolved {
            requesting: ModuleIdAndName::new(ModuleId::new("a"), Some("org.example.a".into())),
            missing: ModuleIdAndName::new(ModuleId::new("b"), Some("org.example.b".into())),
        };
        let text = err.to_diagnostic().format(false);
        assert!(text.contains("unresolved dependency `org.example.b`"));
        assert!(text.contains("required by `org.example.a`"));
        assert!(text.contains("b(org.example.b)"));
    }
}
