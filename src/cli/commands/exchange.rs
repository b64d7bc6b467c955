//! `fmea import` / `fmea export` commands - exchange files and worksheets

use clap::ValueEnum;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::cli::helpers::{success, Workspace};
use crate::cli::GlobalOpts;
use crate::core::exchange::write_worksheet;
use crate::core::{submit_document, EntityStore, Exchange, ExchangeFormat};

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Exchange file (.yaml, .yml or .json)
    pub file: PathBuf,

    /// File format (default: from the extension)
    #[arg(long, value_enum)]
    pub input_format: Option<ExchangeFormat>,

    /// Replace a stored document with the same code
    #[arg(long)]
    pub replace: bool,

    /// Check the file without storing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Export file formats
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Yaml,
    Json,
    /// Flattened FMEA worksheet, one row per fault
    Csv,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Output format (default: configured default_format, else yaml)
    #[arg(long, short = 't', value_enum)]
    pub to: Option<ExportFormat>,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run_import(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;
    let content = fs::read_to_string(&args.file).into_diagnostic()?;
    let format = args
        .input_format
        .unwrap_or_else(|| ExchangeFormat::from_path(&args.file));

    let mut document = Exchange::parse(&content, format)?.into_document()?;
    let code = document.code().to_string();
    let counts = (
        document.structures.len(),
        document.functions.len(),
        document.faults.len(),
    );

    if args.dry_run {
        success(
            global,
            format!(
                "{} is a valid document ({} structures, {} functions, {} faults)",
                style(args.file.display()).cyan(),
                counts.0,
                counts.1,
                counts.2
            ),
        );
        return Ok(());
    }

    if ws.store.document_exists(&code)? {
        if !args.replace {
            return Err(miette::miette!(
                help = "Pass --replace to overwrite it",
                "Document {} already exists",
                code
            ));
        }
        // rows missing from the file are deleted by the same commit
        let stored = ws.store.load_header(&code)?;
        document.header.generation = stored.generation;
        document.header.created = stored.created;
    }
    submit_document(&mut ws.store, document)?;

    success(
        global,
        format!(
            "Imported document {} ({} structures, {} functions, {} faults)",
            style(&code).cyan(),
            counts.0,
            counts.1,
            counts.2
        ),
    );
    Ok(())
}

pub fn run_export(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let document = ws.load(global)?;
    let format = match args.to {
        Some(format) => format,
        None => match &ws.config.default_format {
            Some(name) => ExportFormat::from_str(name, true)
                .map_err(|e| miette::miette!("Invalid default_format in config: {}", e))?,
            None => ExportFormat::Yaml,
        },
    };

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(fs::File::create(path).into_diagnostic()?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    match format {
        ExportFormat::Yaml => {
            let text = Exchange::from_document(&document)?.render(ExchangeFormat::Yaml)?;
            out.write_all(text.as_bytes()).into_diagnostic()?;
        }
        ExportFormat::Json => {
            let text = Exchange::from_document(&document)?.render(ExchangeFormat::Json)?;
            writeln!(out, "{}", text).into_diagnostic()?;
        }
        ExportFormat::Csv => write_worksheet(&document, &mut out)?,
    }
    out.flush().into_diagnostic()?;

    if let Some(path) = &args.output {
        success(
            global,
            format!(
                "Exported {} to {}",
                style(document.code()).cyan(),
                style(path.display()).cyan()
            ),
        );
    }
    Ok(())
}
