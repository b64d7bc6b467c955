//! `fmea function` command - Function net editing

use clap::Subcommand;
use console::style;
use miette::Result;
use std::collections::HashSet;

use crate::cli::helpers::{indented, print_structured, success, table, truncate_str, Workspace};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::MoveDirection;
use crate::entities::{Function, FunctionDraft, FunctionPatch};

#[derive(Subcommand, Debug)]
pub enum FunctionCommands {
    /// Attach a function to a structure
    Add(AddArgs),

    /// Change a function's names
    Edit(EditArgs),

    /// Move a function within its structure
    Move(MoveArgs),

    /// Delete a function without prerequisites or faults
    Rm(RmArgs),

    /// Make one function a prerequisite of another
    Link(LinkArgs),

    /// Remove a prerequisite link
    Unlink(LinkArgs),

    /// List functions
    List(ListArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Long name
    pub name: String,

    /// Owning structure code
    #[arg(long, short = 'S')]
    pub structure: String,

    /// Function this one becomes a prerequisite of
    #[arg(long, short = 'p')]
    pub parent: Option<String>,

    #[arg(long, short = 's')]
    pub short_name: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Function code
    pub code: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 's')]
    pub short_name: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct MoveArgs {
    /// Function code
    pub code: String,

    #[arg(value_enum)]
    pub direction: MoveDirection,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Function code
    pub code: String,
}

#[derive(clap::Args, Debug)]
pub struct LinkArgs {
    /// Dependent function
    pub function: String,

    /// Prerequisite function
    pub prerequisite: String,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only functions attached to this structure
    #[arg(long, short = 'S')]
    pub structure: Option<String>,
}

pub fn run(cmd: FunctionCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        FunctionCommands::Add(args) => run_add(args, global),
        FunctionCommands::Edit(args) => run_edit(args, global),
        FunctionCommands::Move(args) => run_move(args, global),
        FunctionCommands::Rm(args) => run_rm(args, global),
        FunctionCommands::Link(args) => run_link(args, global),
        FunctionCommands::Unlink(args) => run_unlink(args, global),
        FunctionCommands::List(args) => run_list(args, global),
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;
    let draft = FunctionDraft {
        long_name: args.name,
        short_name: args.short_name.unwrap_or_default(),
    };
    let (document, code) = ws.edit(global, |doc, codes| {
        doc.create_child_function(&args.structure, args.parent.as_deref(), draft, codes)
    })?;

    if global.format == OutputFormat::Id {
        println!("{}", code);
        return Ok(());
    }
    let function = document.function(&code)?;
    success(
        global,
        format!(
            "Added function {} to {} at level {}",
            style(&code).cyan(),
            style(&args.structure).cyan(),
            function.level
        ),
    );
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;
    let patch = FunctionPatch {
        long_name: args.name,
        short_name: args.short_name,
    };
    ws.edit(global, |doc, _| doc.edit_function(&args.code, patch))?;
    success(global, format!("Updated function {}", style(&args.code).cyan()));
    Ok(())
}

fn run_move(args: MoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;
    let (_, moved) = ws.edit(global, |doc, _| doc.move_function(&args.code, args.direction))?;
    if moved {
        success(global, format!("Moved function {}", style(&args.code).cyan()));
    } else if !global.quiet {
        println!(
            "{} Function {} is already at the edge",
            style("!").yellow(),
            style(&args.code).cyan()
        );
    }
    Ok(())
}

fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;
    ws.edit(global, |doc, _| doc.delete_function(&args.code))?;
    success(global, format!("Deleted function {}", style(&args.code).cyan()));
    Ok(())
}

fn run_link(args: LinkArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;
    let (_, linked) = ws.edit(global, |doc, _| {
        doc.link_prerequisite(&args.function, &args.prerequisite)
    })?;
    if linked {
        success(
            global,
            format!(
                "{} is now a prerequisite of {}",
                style(&args.prerequisite).cyan(),
                style(&args.function).cyan()
            ),
        );
    } else if !global.quiet {
        println!(
            "{} {} already lists {}",
            style("!").yellow(),
            style(&args.function).cyan(),
            style(&args.prerequisite).cyan()
        );
    }
    Ok(())
}

fn run_unlink(args: LinkArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;
    let (_, unlinked) = ws.edit(global, |doc, _| {
        doc.unlink_prerequisite(&args.function, &args.prerequisite)
    })?;
    if unlinked {
        success(
            global,
            format!(
                "Removed prerequisite {} from {}",
                style(&args.prerequisite).cyan(),
                style(&args.function).cyan()
            ),
        );
    } else if !global.quiet {
        println!(
            "{} {} does not list {}",
            style("!").yellow(),
            style(&args.function).cyan(),
            style(&args.prerequisite).cyan()
        );
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let document = ws.load(global)?;
    let functions: Vec<&Function> = match &args.structure {
        Some(structure) => document.functions_of(document.structure(structure)?)?,
        None => {
            // functions outside the prerequisite forest follow in code order
            let mut ordered = document.flatten_functions()?;
            let listed: HashSet<String> = ordered.iter().map(|f| f.code.clone()).collect();
            ordered.extend(document.functions.iter().filter(|f| !listed.contains(&f.code)));
            ordered
        }
    };

    if print_structured(global.format, &functions)? {
        return Ok(());
    }
    if global.format == OutputFormat::Id {
        for function in &functions {
            println!("{}", function.code);
        }
        return Ok(());
    }

    if functions.is_empty() {
        println!("No functions found.");
        return Ok(());
    }

    let rows = functions.iter().map(|f| {
        vec![
            f.code.clone(),
            indented(f.level, &truncate_str(&f.long_name, 40)),
            f.structure_code.clone(),
            f.level.to_string(),
            f.prerequisites.join(" "),
            f.fault_refs.len().to_string(),
        ]
    });
    println!(
        "{}",
        table(
            &["CODE", "NAME", "STRUCTURE", "LEVEL", "PREREQUISITES", "FAULTS"],
            rows
        )
    );
    println!("{} function(s) found.", style(functions.len()).cyan());
    Ok(())
}
