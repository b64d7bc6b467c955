//! `fmea team` command - Core and extended team roster

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{print_structured, success, table, Workspace};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{FmeaError, Membership, TeamMember};

#[derive(Subcommand, Debug)]
pub enum TeamCommands {
    /// Add an employee to the core or extended team
    Add(AddArgs),

    /// Remove an employee from whichever team lists them
    Rm(RmArgs),

    /// List both teams
    List,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Employee number
    pub employee_no: String,

    /// Full name
    pub name: String,

    /// Team to join
    #[arg(long, short = 't', value_enum, default_value = "core")]
    pub team: Membership,

    /// Role in the analysis (moderator, design engineer, ...)
    #[arg(long, short = 'r')]
    pub role: Option<String>,

    #[arg(long)]
    pub department: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Employee number
    pub employee_no: String,
}

pub fn run(cmd: TeamCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TeamCommands::Add(args) => run_add(args, global),
        TeamCommands::Rm(args) => run_rm(args, global),
        TeamCommands::List => run_list(global),
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;
    let member = TeamMember {
        employee_no: args.employee_no.clone(),
        name: args.name,
        role: args.role,
        department: args.department,
    };
    ws.edit(global, |doc, _| doc.header.team.add_member(args.team, member))?;
    success(
        global,
        format!(
            "Added {} to the {} team",
            style(&args.employee_no).cyan(),
            args.team
        ),
    );
    Ok(())
}

fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;
    ws.edit(global, |doc, _| {
        doc.header
            .team
            .remove_member(&args.employee_no)
            .map(|_| ())
            .ok_or_else(|| FmeaError::InvalidField {
                field: "employee_no",
                message: format!("{} is not on either team", args.employee_no),
            })
    })?;
    success(global, format!("Removed {}", style(&args.employee_no).cyan()));
    Ok(())
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let document = ws.load(global)?;
    let team = &document.header.team;

    if print_structured(global.format, team)? {
        return Ok(());
    }

    let members = [Membership::Core, Membership::Extended]
        .into_iter()
        .flat_map(|m| team.members(m).iter().map(move |member| (m, member)));

    if global.format == OutputFormat::Id {
        for (_, member) in members {
            println!("{}", member.employee_no);
        }
        return Ok(());
    }

    if team.core.is_empty() && team.extended.is_empty() {
        println!("No team members.");
        println!();
        println!("Add one with: {}", style("fmea team add <EMPLOYEE_NO> <NAME>").yellow());
        return Ok(());
    }

    let rows = members.map(|(membership, member)| {
        vec![
            membership.to_string(),
            member.employee_no.clone(),
            member.name.clone(),
            member.role.clone().unwrap_or_default(),
            member.department.clone().unwrap_or_default(),
        ]
    });
    println!(
        "{}",
        table(&["TEAM", "EMPLOYEE", "NAME", "ROLE", "DEPARTMENT"], rows)
    );
    Ok(())
}
