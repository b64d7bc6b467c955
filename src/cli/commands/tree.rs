//! `fmea tree` and `fmea graph` commands - read-only hierarchy views

use console::style;
use miette::Result;

use crate::cli::helpers::{print_structured, table, Workspace};
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct TreeArgs {
    /// Start from this structure (default: the root)
    #[arg(long, short = 'r')]
    pub root: Option<String>,

    /// Include functions under their structures
    #[arg(long = "functions", short = 'F')]
    pub include_functions: bool,

    /// Include faults under their functions (implies --functions)
    #[arg(long = "faults", short = 'E')]
    pub include_faults: bool,
}

#[derive(clap::Args, Debug)]
pub struct GraphArgs {
    /// Only show functions at this level
    #[arg(long, short = 'l')]
    pub level: Option<u32>,
}

pub fn run_tree(args: TreeArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let document = ws.load(global)?;
    let root = args
        .root
        .unwrap_or_else(|| document.header.root_structure_code.clone());
    let include_functions = args.include_functions || args.include_faults;
    let tree = document.generate_tree(&root, include_functions, args.include_faults)?;

    if print_structured(global.format, &tree)? {
        return Ok(());
    }
    print!("{}", tree.render());
    if !global.quiet {
        println!();
        println!("{} node(s)", style(tree.count()).cyan());
    }
    Ok(())
}

pub fn run_graph(args: GraphArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let document = ws.load(global)?;
    let mut nodes = document.function_graph()?;
    if let Some(level) = args.level {
        nodes.retain(|n| n.level == level);
    }

    if print_structured(global.format, &nodes)? {
        return Ok(());
    }
    if global.format == OutputFormat::Id {
        for node in &nodes {
            println!("{}", node.code);
        }
        return Ok(());
    }

    if nodes.is_empty() {
        println!("No functions found.");
        return Ok(());
    }

    let rows = nodes.iter().map(|n| {
        vec![
            n.level.to_string(),
            n.label.clone(),
            n.structure_code.clone(),
            if n.prerequisites.is_empty() {
                "-".to_string()
            } else {
                format!("→ {}", n.prerequisites.join(", "))
            },
        ]
    });
    println!(
        "{}",
        table(&["LEVEL", "FUNCTION", "STRUCTURE", "PREREQUISITES"], rows)
    );
    Ok(())
}
