//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs,
    doc::DocCommands,
    exchange::{ExportArgs, ImportArgs},
    fault::FaultCommands,
    function::FunctionCommands,
    init::InitArgs,
    structure::StructureCommands,
    team::TeamCommands,
    tree::{GraphArgs, TreeArgs},
    validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "fmea")]
#[command(author, version, about = "FMEA Designer")]
#[command(long_about = "Author structure, function and fault trees for failure mode and effects analysis.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Log engine events to stderr (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Project root (default: auto-detect by finding .fmea/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Document to operate on (default: the only document in the project)
    #[arg(long, short = 'd', global = true, env = "FMEA_DOCUMENT")]
    pub document: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new FMEA project
    Init(InitArgs),

    /// Document management
    #[command(subcommand)]
    Doc(DocCommands),

    /// Structure tree editing
    #[command(subcommand)]
    Structure(StructureCommands),

    /// Function net editing
    #[command(subcommand)]
    Function(FunctionCommands),

    /// Fault net editing
    #[command(subcommand)]
    Fault(FaultCommands),

    /// Core and extended team roster
    #[command(subcommand)]
    Team(TeamCommands),

    /// Show the structure tree
    Tree(TreeArgs),

    /// Show the function prerequisite graph
    Graph(GraphArgs),

    /// Check documents against the hierarchy rules
    Validate(ValidateArgs),

    /// Import a document from a YAML or JSON exchange file
    Import(ImportArgs),

    /// Export a document as YAML, JSON or a CSV worksheet
    Export(ExportArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables and trees
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// JSON format (for programming)
    Json,
    /// Just codes, one per line
    Id,
}
