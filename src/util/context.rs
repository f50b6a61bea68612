//! Global context for mpsbuild operations.
//!
//! Carries the working directory and locates the project configuration file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::util::config::CONFIG_FILE;
use crate::util::diagnostic::suggestions;

/// Failure to locate `mpsbuild.toml`.
#[derive(Debug, Error)]
#[error("could not find `{}` in `{}` or any parent directory", CONFIG_FILE, dir.display())]
pub struct ConfigNotFound {
    pub dir: PathBuf,
}

/// Global context: where the command was started from.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    cwd: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext for the process working directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    pub fn with_cwd(cwd: PathBuf) -> Self {
        GlobalContext { cwd }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Find `mpsbuild.toml` starting from cwd and searching upward.
    pub fn find_config(&self) -> Result<PathBuf, ConfigNotFound> {
        let mut current = self.cwd.clone();
        loop {
            let candidate = current.join(CONFIG_FILE);
            if candidate.is_file() {
                return Ok(candidate);
            }
            if !current.pop() {
                return Err(ConfigNotFound {
                    dir: self.cwd.clone(),
                });
            }
        }
    }

    /// Resolve an explicit `--config` argument or search for the file.
    pub fn config_path(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(self.cwd.join(path)),
            None => self
                .find_config()
                .map_err(|e| anyhow::anyhow!("{}\nhelp: {}", e, suggestions::NO_CONFIG)),
        }
    }
}
