//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::identity::CodeStyle;
use crate::core::project::Project;

/// Database location used when nothing else is configured
pub const DEFAULT_DATABASE: &str = ".fmea/fmea.db";

/// FMEA configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default author recorded as document responsible
    pub author: Option<String>,

    /// SQLite database path, relative to the project root
    pub database: Option<PathBuf>,

    /// How new entity codes are generated
    pub code_style: Option<CodeStyle>,

    /// Default export format (yaml, json, csv)
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let project = Project::discover().ok();
        Self::load_for(project.as_ref())
    }

    /// Load with an already discovered project
    pub fn load_for(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/fmea/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.fmea/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_path()) {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        config.merge_env(|key| std::env::var(key).ok());

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "fmea")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn merge_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(author) = var("FMEA_AUTHOR") {
            self.author = Some(author);
        }
        if let Some(database) = var("FMEA_DATABASE") {
            self.database = Some(PathBuf::from(database));
        }
        if let Some(style) = var("FMEA_CODE_STYLE") {
            match style.parse() {
                Ok(style) => self.code_style = Some(style),
                Err(e) => debug!(error = %e, "ignoring FMEA_CODE_STYLE"),
            }
        }
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.author.is_some() {
            self.author = other.author;
        }
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.code_style.is_some() {
            self.code_style = other.code_style;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Get the author name, falling back to the login name
    pub fn author(&self) -> String {
        if let Some(ref author) = self.author {
            return author.clone();
        }
        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }

    /// Database path resolved against the project root
    pub fn database_path(&self, root: &Path) -> PathBuf {
        let database = self
            .database
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE));
        if database.is_absolute() {
            database
        } else {
            root.join(database)
        }
    }

    pub fn code_style(&self) -> CodeStyle {
        self.code_style.unwrap_or_default()
    }
}
