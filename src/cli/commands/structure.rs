//! `fmea structure` command - Structure tree editing

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{indented, print_structured, success, table, truncate_str, Workspace};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::MoveDirection;
use crate::entities::{StructureDraft, StructurePatch};

#[derive(Subcommand, Debug)]
pub enum StructureCommands {
    /// Add a structure below a parent
    Add(AddArgs),

    /// Change a structure's names or category
    Edit(EditArgs),

    /// Move a structure among its siblings
    Move(MoveArgs),

    /// Delete a structure without children or functions
    Rm(RmArgs),

    /// List structures in tree order
    List,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Long name
    pub name: String,

    /// Parent structure code (default: the root)
    #[arg(long, short = 'p')]
    pub parent: Option<String>,

    #[arg(long, short = 's')]
    pub short_name: Option<String>,

    /// Category (system, subsystem, component, ...)
    #[arg(long, short = 'c')]
    pub category: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Structure code
    pub code: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 's')]
    pub short_name: Option<String>,

    #[arg(long, short = 'c')]
    pub category: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct MoveArgs {
    /// Structure code
    pub code: String,

    #[arg(value_enum)]
    pub direction: MoveDirection,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Structure code
    pub code: String,
}

pub fn run(cmd: StructureCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        StructureCommands::Add(args) => run_add(args, global),
        StructureCommands::Edit(args) => run_edit(args, global),
        StructureCommands::Move(args) => run_move(args, global),
        StructureCommands::Rm(args) => run_rm(args, global),
        StructureCommands::List => run_list(global),
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;
    let draft = StructureDraft {
        long_name: args.name,
        short_name: args.short_name.unwrap_or_default(),
        category: args.category.unwrap_or_default(),
    };
    let (document, code) = ws.edit(global, |doc, codes| {
        let parent = args
            .parent
            .unwrap_or_else(|| doc.header.root_structure_code.clone());
        doc.create_child_structure(&parent, draft, codes)
    })?;

    if global.format == OutputFormat::Id {
        println!("{}", code);
        return Ok(());
    }
    let structure = document.structure(&code)?;
    success(
        global,
        format!(
            "Added structure {} at level {}",
            style(&code).cyan(),
            structure.level
        ),
    );
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;
    let patch = StructurePatch {
        long_name: args.name,
        short_name: args.short_name,
        category: args.category,
    };
    ws.edit(global, |doc, _| doc.edit_structure(&args.code, patch))?;
    success(global, format!("Updated structure {}", style(&args.code).cyan()));
    Ok(())
}

fn run_move(args: MoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;
    let (_, moved) = ws.edit(global, |doc, _| doc.move_structure(&args.code, args.direction))?;
    if moved {
        success(global, format!("Moved structure {}", style(&args.code).cyan()));
    } else if !global.quiet {
        println!(
            "{} Structure {} is already at the edge",
            style("!").yellow(),
            style(&args.code).cyan()
        );
    }
    Ok(())
}

fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;
    ws.edit(global, |doc, _| doc.delete_structure(&args.code))?;
    success(global, format!("Deleted structure {}", style(&args.code).cyan()));
    Ok(())
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let document = ws.load(global)?;
    let mut structures = vec![document.root()?];
    structures.extend(document.flatten_structures()?);

    if print_structured(global.format, &structures)? {
        return Ok(());
    }
    if global.format == OutputFormat::Id {
        for structure in &structures {
            println!("{}", structure.code);
        }
        return Ok(());
    }

    let rows = structures.iter().map(|s| {
        vec![
            s.code.clone(),
            indented(s.level, &truncate_str(&s.long_name, 40)),
            s.category.clone(),
            s.level.to_string(),
            s.functions.len().to_string(),
        ]
    });
    println!(
        "{}",
        table(&["CODE", "NAME", "CATEGORY", "LEVEL", "FUNCTIONS"], rows)
    );
    Ok(())
}
