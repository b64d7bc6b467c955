//! `fmea init` command - Initialize a new FMEA project

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::project::{Project, ProjectError};
use crate::core::{Config, SqliteStore};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Rewrite the default config even if .fmea/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            let config = Config::load_for(Some(&project));
            let database = config.database_path(project.root());
            SqliteStore::open(&database)?;

            println!(
                "{} Initialized FMEA project at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!("  {} {}", style("config").dim(), project.config_path().display());
            println!("  {} {}", style("database").dim(), database.display());
            println!();
            println!("Next steps:");
            println!(
                "  {} Create a document",
                style("fmea doc new DOC-1 \"Brake system\"").yellow()
            );
            println!(
                "  {} Add a structure below the root",
                style("fmea structure add \"Caliper\"").yellow()
            );
            println!("  {} Show the structure tree", style("fmea tree").yellow());
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} FMEA project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("fmea init --force").yellow());
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}
