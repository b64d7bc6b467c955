//! Project discovery and layout

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the directory marking a project root
pub const PROJECT_DIR: &str = ".fmea";

/// An FMEA workspace: a directory holding `.fmea/`
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (parent of .fmea/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create `.fmea/` with a commented default config
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        Self::create(path, false)
    }

    /// Rewrite the default config even if `.fmea/` exists
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        Self::create(path, true)
    }

    fn create(path: &Path, force: bool) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let fmea_dir = root.join(PROJECT_DIR);
        if fmea_dir.exists() && !force {
            return Err(ProjectError::AlreadyExists(root));
        }

        std::fs::create_dir_all(&fmea_dir).map_err(|e| ProjectError::IoError(e.to_string()))?;
        let project = Self { root };
        std::fs::write(project.config_path(), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Ok(project)
    }

    fn default_config() -> &'static str {
        r#"# FMEA Project Configuration

# Author recorded as responsible on new documents (default: $USER)
# author: ""

# SQLite database, relative to the project root
# database: .fmea/fmea.db

# Entity code style: sequential (STR-1, FUN-2) or ulid
# code_style: sequential

# Default export format (yaml, json, csv)
# default_format: yaml
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .fmea configuration directory
    pub fn fmea_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.fmea_dir().join("config.yaml")
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not an FMEA project (searched from {searched_from:?}). Run 'fmea init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("FMEA project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
