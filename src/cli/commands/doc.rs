//! `fmea doc` command - Document management

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{print_structured, success, table, truncate_str, Workspace};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{CodeGenerator, CodeStyle, SequentialCodes, UlidCodes};
use crate::core::{submit_document, Document, Entity, EntityKind};
use crate::entities::{DocumentHeader, Stage, Structure};

#[derive(Subcommand, Debug)]
pub enum DocCommands {
    /// Create a document with its root structure
    #[command(disable_version_flag = true)]
    New(NewArgs),

    /// List documents in the project
    List,

    /// Show a document's header and counts
    Show(ShowArgs),

    /// Delete a document and all of its entities
    Rm(RmArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Unique document code
    pub code: String,

    /// Document name
    pub name: String,

    /// Name of the root structure (default: the document name)
    #[arg(long)]
    pub root: Option<String>,

    /// Document version
    #[arg(long, default_value = "1")]
    pub version: String,

    /// Lifecycle stage
    #[arg(long, default_value = "planning")]
    pub stage: Stage,

    #[arg(long)]
    pub company: Option<String>,

    #[arg(long)]
    pub customer: Option<String>,

    /// Responsible engineer (default: configured author)
    #[arg(long)]
    pub responsible: Option<String>,

    /// Planned start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<NaiveDate>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Document code (default: --document or the only document)
    pub code: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Document code
    pub code: String,
}

pub fn run(cmd: DocCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        DocCommands::New(args) => run_new(args, global),
        DocCommands::List => run_list(global),
        DocCommands::Show(args) => run_show(args, global),
        DocCommands::Rm(args) => run_rm(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;
    if ws.store.document_exists(&args.code)? {
        return Err(miette::miette!("Document {} already exists", args.code));
    }

    let root_code = match ws.config.code_style() {
        CodeStyle::Sequential => SequentialCodes::new().next_code(EntityKind::Structure),
        CodeStyle::Ulid => UlidCodes.next_code(EntityKind::Structure),
    };
    let root_name = args.root.unwrap_or_else(|| args.name.clone());

    let mut header = DocumentHeader::new(&args.code, &args.name, &root_code);
    header.version = args.version;
    header.stage = args.stage;
    header.planning.company = args.company;
    header.planning.customer = args.customer;
    header.planning.responsible = Some(args.responsible.unwrap_or_else(|| ws.config.author()));
    header.planning.start = args.start;
    header.planning.due = args.due;

    let document = Document::new(header, Structure::new(&root_code, root_name));
    let document = submit_document(&mut ws.store, document)?;
    success(
        global,
        format!(
            "Created document {} with root structure {}",
            style(document.code()).cyan(),
            style(&root_code).cyan()
        ),
    );
    Ok(())
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let headers = ws.store.list_headers()?;

    if print_structured(global.format, &headers)? {
        return Ok(());
    }
    if global.format == OutputFormat::Id {
        for header in &headers {
            println!("{}", header.code);
        }
        return Ok(());
    }

    if headers.is_empty() {
        println!("No documents found.");
        println!();
        println!("Create one with: {}", style("fmea doc new <CODE> <NAME>").yellow());
        return Ok(());
    }

    let rows = headers.iter().map(|h| {
        vec![
            h.code.clone(),
            truncate_str(&h.name, 40),
            h.version.clone(),
            h.stage.to_string(),
            h.generation.to_string(),
            h.updated.format("%Y-%m-%d %H:%M").to_string(),
        ]
    });
    println!(
        "{}",
        table(&["CODE", "NAME", "VERSION", "STAGE", "GEN", "UPDATED"], rows)
    );
    println!("{} document(s) found.", style(headers.len()).cyan());
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let global = GlobalOpts {
        document: args.code.or_else(|| global.document.clone()),
        ..global.clone()
    };
    let document = ws.load(&global)?;
    let header = &document.header;

    if print_structured(global.format, header)? {
        return Ok(());
    }
    if global.format == OutputFormat::Id {
        println!("{}", header.code);
        return Ok(());
    }

    println!("{} {}", style(&header.code).cyan().bold(), style(&header.name).bold());
    println!("{}", "-".repeat(60));
    println!("{:<14} {}", style("Version:").bold(), header.version);
    println!("{:<14} {}", style("Stage:").bold(), header.stage);
    println!("{:<14} {}", style("Root:").bold(), document.root()?.label());

    let planning = &header.planning;
    for (label, value) in [
        ("Company:", &planning.company),
        ("Customer:", &planning.customer),
        ("Responsible:", &planning.responsible),
    ] {
        if let Some(value) = value {
            println!("{:<14} {}", style(label).bold(), value);
        }
    }
    if let Some(start) = planning.start {
        println!("{:<14} {}", style("Start:").bold(), start);
    }
    if let Some(due) = planning.due {
        println!("{:<14} {}", style("Due:").bold(), due);
    }

    println!();
    println!(
        "{:<14} {} structures, {} functions, {} faults",
        style("Contents:").bold(),
        document.structures.len(),
        document.functions.len(),
        document.faults.len()
    );
    println!(
        "{:<14} {} core, {} extended",
        style("Team:").bold(),
        header.team.core.len(),
        header.team.extended.len()
    );
    println!(
        "{:<14} {} (generation {})",
        style("Updated:").bold(),
        header.updated.format("%Y-%m-%d %H:%M"),
        header.generation
    );
    Ok(())
}

fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;
    ws.store.delete_document(&args.code)?;
    success(global, format!("Deleted document {}", style(&args.code).cyan()));
    Ok(())
}
