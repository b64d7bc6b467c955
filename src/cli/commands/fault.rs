//! `fmea fault` command - Fault net editing

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{indented, print_structured, success, table, truncate_str, Workspace};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Document, MoveDirection};
use crate::entities::{Fault, FaultDraft, FaultPatch};

#[derive(Subcommand, Debug)]
pub enum FaultCommands {
    /// Attach a fault to a function
    Add(AddArgs),

    /// Change a fault's names or risk priority factor
    Edit(EditArgs),

    /// Move a fault within its function
    Move(MoveArgs),

    /// Delete a fault without causes
    Rm(RmArgs),

    /// List faults
    List(ListArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Long name
    pub name: String,

    /// Owning function code
    #[arg(long, short = 'F')]
    pub function: String,

    /// Fault this one becomes a cause of
    #[arg(long, short = 'p')]
    pub parent: Option<String>,

    #[arg(long, short = 's')]
    pub short_name: Option<String>,

    /// Risk priority factor (positive)
    #[arg(long, short = 'r', default_value_t = 1)]
    pub rpf: u32,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Fault code
    pub code: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 's')]
    pub short_name: Option<String>,

    /// Risk priority factor (positive)
    #[arg(long, short = 'r')]
    pub rpf: Option<u32>,
}

#[derive(clap::Args, Debug)]
pub struct MoveArgs {
    /// Fault code
    pub code: String,

    #[arg(value_enum)]
    pub direction: MoveDirection,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Fault code
    pub code: String,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only faults attached to this function
    #[arg(long, short = 'F')]
    pub function: Option<String>,

    /// Order by risk priority factor, highest first
    #[arg(long)]
    pub ranked: bool,

    /// Limit output to N items
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

pub fn run(cmd: FaultCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        FaultCommands::Add(args) => run_add(args, global),
        FaultCommands::Edit(args) => run_edit(args, global),
        FaultCommands::Move(args) => run_move(args, global),
        FaultCommands::Rm(args) => run_rm(args, global),
        FaultCommands::List(args) => run_list(args, global),
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;
    let draft = FaultDraft {
        long_name: args.name,
        short_name: args.short_name.unwrap_or_default(),
        risk_priority_factor: args.rpf,
    };
    let (document, code) = ws.edit(global, |doc, codes| {
        doc.create_child_fault(&args.function, args.parent.as_deref(), draft, codes)
    })?;

    if global.format == OutputFormat::Id {
        println!("{}", code);
        return Ok(());
    }
    let fault = document.fault(&code)?;
    let tier = fault.tier().map(|t| t.to_string()).unwrap_or_default();
    success(
        global,
        format!(
            "Added fault {} ({}) to {}",
            style(&code).cyan(),
            tier,
            style(&args.function).cyan()
        ),
    );
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;
    let patch = FaultPatch {
        long_name: args.name,
        short_name: args.short_name,
        risk_priority_factor: args.rpf,
    };
    ws.edit(global, |doc, _| doc.edit_fault(&args.code, patch))?;
    success(global, format!("Updated fault {}", style(&args.code).cyan()));
    Ok(())
}

fn run_move(args: MoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;
    let (_, moved) = ws.edit(global, |doc, _| doc.move_fault(&args.code, args.direction))?;
    if moved {
        success(global, format!("Moved fault {}", style(&args.code).cyan()));
    } else if !global.quiet {
        println!(
            "{} Fault {} is already at the edge",
            style("!").yellow(),
            style(&args.code).cyan()
        );
    }
    Ok(())
}

fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;
    ws.edit(global, |doc, _| doc.delete_fault(&args.code))?;
    success(global, format!("Deleted fault {}", style(&args.code).cyan()));
    Ok(())
}

/// Faults grouped by function in function order
fn faults_in_order(document: &Document) -> Result<Vec<&Fault>> {
    let mut faults = Vec::with_capacity(document.faults.len());
    for function in document.functions.iter() {
        faults.extend(document.faults_of(function)?);
    }
    Ok(faults)
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let document = ws.load(global)?;

    let mut faults: Vec<&Fault> = match (&args.function, args.ranked) {
        (Some(function), _) => document.faults_of(document.function(function)?)?,
        (None, true) => document.ranked_faults(),
        (None, false) => faults_in_order(&document)?,
    };
    if args.ranked {
        faults.sort_by(|a, b| b.risk_priority_factor.cmp(&a.risk_priority_factor));
    }
    if let Some(limit) = args.limit {
        faults.truncate(limit);
    }

    if print_structured(global.format, &faults)? {
        return Ok(());
    }
    if global.format == OutputFormat::Id {
        for fault in &faults {
            println!("{}", fault.code);
        }
        return Ok(());
    }

    if faults.is_empty() {
        println!("No faults found.");
        return Ok(());
    }

    let rows = faults.iter().map(|f| {
        let rpf = f.risk_priority_factor.to_string();
        let rpf = if f.risk_priority_factor >= 100 {
            style(rpf).red().to_string()
        } else {
            rpf
        };
        vec![
            f.code.clone(),
            indented(f.level, &truncate_str(&f.long_name, 40)),
            f.tier().map(|t| t.to_string()).unwrap_or_else(|| "-".to_string()),
            f.function_code.clone(),
            rpf,
            f.causes.join(" "),
        ]
    });
    println!(
        "{}",
        table(&["CODE", "NAME", "TIER", "FUNCTION", "RPF", "CAUSES"], rows)
    );
    println!("{} fault(s) found.", style(faults.len()).cyan());
    Ok(())
}
