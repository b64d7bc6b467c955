//! Shared helper functions for CLI commands
//!
//! Every command that touches a document goes through [`Workspace`]: discover
//! the project, load the config, open the store. Mutating commands use
//! [`Workspace::edit`], which assembles the document, applies one engine
//! operation and submits the result.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{CodeGenerator, CodeStyle, SequentialCodes, UlidCodes};
use crate::core::{assemble_document, submit_document, Config, Document, Project, SqliteStore};

/// An opened project: config plus store
pub struct Workspace {
    pub project: Project,
    pub config: Config,
    pub store: SqliteStore,
}

impl Workspace {
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let project = match &global.project {
            Some(path) => Project::discover_from(path),
            None => Project::discover(),
        }
        .map_err(|e| miette::miette!("{}", e))?;
        let config = Config::load_for(Some(&project));
        let store = SqliteStore::open(&config.database_path(project.root()))?;
        Ok(Self {
            project,
            config,
            store,
        })
    }

    /// The document named by `--document`, or the only one stored
    pub fn document_code(&self, global: &GlobalOpts) -> Result<String> {
        if let Some(code) = &global.document {
            return Ok(code.clone());
        }
        let headers = self.store.list_headers()?;
        match headers.as_slice() {
            [only] => Ok(only.code.clone()),
            [] => Err(miette::miette!(
                help = "Create one with `fmea doc new <CODE> <NAME>` or `fmea import <FILE>`",
                "No documents in this project"
            )),
            _ => Err(miette::miette!(
                help = "Pass --document <CODE> or set FMEA_DOCUMENT",
                "Project holds {} documents",
                headers.len()
            )),
        }
    }

    /// Assemble the selected document
    pub fn load(&self, global: &GlobalOpts) -> Result<Document> {
        let code = self.document_code(global)?;
        Ok(assemble_document(&self.store, &code)?)
    }

    /// Code generator for new entities in `document`
    pub fn codes(&self, document: &Document) -> Box<dyn CodeGenerator> {
        match self.config.code_style() {
            CodeStyle::Sequential => Box::new(SequentialCodes::seeded(document.codes())),
            CodeStyle::Ulid => Box::new(UlidCodes),
        }
    }

    /// Assemble, apply `change`, submit
    ///
    /// Nothing is written when `change` fails or the result does not pass
    /// the submit checks.
    pub fn edit<T>(
        &mut self,
        global: &GlobalOpts,
        change: impl FnOnce(&mut Document, &mut dyn CodeGenerator) -> crate::core::Result<T>,
    ) -> Result<(Document, T)> {
        let mut document = self.load(global)?;
        let mut codes = self.codes(&document);
        let outcome = change(&mut document, codes.as_mut())?;
        let document = submit_document(&mut self.store, document)?;
        Ok((document, outcome))
    }
}

/// Print a success line unless `--quiet`
pub fn success(global: &GlobalOpts, message: impl std::fmt::Display) {
    if !global.quiet {
        println!("{} {}", style("✓").green(), message);
    }
}

/// Print `value` as YAML or JSON; false for the human formats
pub fn print_structured<T: Serialize + ?Sized>(format: OutputFormat, value: &T) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Auto | OutputFormat::Id => Ok(false),
    }
}

/// Render rows as a rounded table
pub fn table<I, R>(header: &[&str], rows: I) -> String
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = String>,
{
    let mut builder = Builder::default();
    builder.push_record(header.iter().map(|h| h.to_string()));
    for row in rows {
        builder.push_record(row);
    }
    builder.build().with(Style::rounded()).to_string()
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Indent a name by hierarchy level
pub fn indented(level: u32, name: &str) -> String {
    format!("{}{}", "  ".repeat(level.saturating_sub(1) as usize), name)
}
