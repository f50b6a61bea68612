//! User-friendly diagnostic messages.
//!
//! Errors raised while mining, resolving or checking a configuration carry
//! the offending module or publication names; [`Diagnostic`] renders them
//! together with suggested fixes.

use std::fmt;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no configuration file is found.
    pub const NO_CONFIG: &str = "Create an `mpsbuild.toml` in the project root or pass `--config`";

    /// Suggestion when a module reference cannot be resolved.
    pub const MODULE_NOT_FOUND: &str = "Run `mpsbuild modules` to see all discovered modules";

    /// Suggestion when the module is part of an MPS installation.
    pub const SET_MPS_HOME: &str = "Set `build.mps_home` so the MPS distribution is searched too";

    /// Suggestion when a module should be skipped instead of resolved.
    pub const IGNORE_MODULE: &str = "Add the module id to `build.ignored_modules` to skip it";

    /// Suggestion when publications overlap or form a cycle.
    pub const REVIEW_PUBLICATIONS: &str =
        "Run `mpsbuild publications` to see which modules each publication contains";

    /// Suggestion when a path macro has no value.
    pub const DEFINE_MACRO: &str = "Define the macro in the `[macros]` table of `mpsbuild.toml`";

    /// Suggestion when descriptor XML is malformed.
    pub const FIX_DESCRIPTOR: &str =
        "Re-save the module in MPS or exclude its folder with a `.mpsbuild-ignore` file";
}

/// An error message with context lines and suggested fixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,

    /// File the error was found in
    pub location: Option<PathBuf>,

    pub context: Vec<String>,
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            location: None,
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Add a line explaining where the error comes from.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Render for the terminal. A single suggestion is printed inline,
    /// several are numbered.
    pub fn format(&self, color: bool) -> String {
        let (error, help) = if color {
            ("\x1b[1;31merror\x1b[0m", "\x1b[1;36mhelp\x1b[0m")
        } else {
            ("error", "help")
        };

        let mut output = format!("{}: {}\n", error, self.message);
        if let Some(path) = &self.location {
            let _ = writeln!(output, "  --> {}", path.display());
        }
        for line in &self.context {
            let _ = writeln!(output, "  = {}", line);
        }

        match self.suggestions.as_slice() {
            [] => {}
            [only] => {
                let _ = write!(output, "\n{}: {}\n", help, only);
            }
            many => {
                let _ = write!(output, "\n{}:\n", help);
                for (i, suggestion) in many.iter().enumerate() {
                    let _ = writeln!(output, "  {}. {}", i + 1, suggestion);
                }
            }
        }
        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
