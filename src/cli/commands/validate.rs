//! `fmea validate` command - Check stored documents against the hierarchy rules

use console::style;
use miette::Result;

use crate::cli::helpers::Workspace;
use crate::cli::GlobalOpts;
use crate::core::{assemble_document, submit_document, Document, ValidationErrors};

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Check every document in the project
    #[arg(long, short = 'a')]
    pub all: bool,

    /// Show summary only, don't show individual violations
    #[arg(long)]
    pub summary: bool,

    /// Recompute stale levels and store the document when that clears every
    /// violation
    #[arg(long)]
    pub fix: bool,
}

/// Validation statistics
#[derive(Default)]
struct ValidationStats {
    documents_checked: usize,
    documents_passed: usize,
    documents_failed: usize,
    documents_fixed: usize,
    total_violations: usize,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;
    let codes: Vec<String> = if args.all {
        ws.store.list_headers()?.into_iter().map(|h| h.code).collect()
    } else {
        vec![ws.document_code(global)?]
    };

    let mut stats = ValidationStats::default();
    for code in &codes {
        stats.documents_checked += 1;
        let document = assemble_document(&ws.store, code)?;
        let errors = document.validate();

        if errors.is_empty() {
            stats.documents_passed += 1;
            if !args.summary {
                println!("{} {}", style("✓").green(), code);
            }
            continue;
        }

        if args.fix && fixable(&document) {
            submit_document(&mut ws.store, document)?;
            stats.documents_fixed += 1;
            stats.documents_passed += 1;
            if !args.summary {
                println!("{} {} (levels recomputed)", style("✓").green(), code);
            }
            continue;
        }

        stats.documents_failed += 1;
        stats.total_violations += errors.len();
        if !args.summary {
            println!(
                "{} {} - {} violation(s)",
                style("✗").red(),
                code,
                errors.len()
            );
            print_violations(&errors);
        }
    }

    println!();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", style("Validation Summary").bold());
    println!("{}", style("─".repeat(60)).dim());
    println!("  Documents checked: {}", style(stats.documents_checked).cyan());
    println!("  Documents passed:  {}", style(stats.documents_passed).green());
    println!("  Documents failed:  {}", style(stats.documents_failed).red());
    println!("  Total violations:  {}", style(stats.total_violations).red());
    if stats.documents_fixed > 0 {
        println!("  Documents fixed:   {}", style(stats.documents_fixed).cyan());
    }
    println!();

    if stats.documents_failed > 0 {
        Err(miette::miette!(
            "Validation failed: {} document(s) have violations",
            stats.documents_failed
        ))
    } else {
        println!("{} All documents passed validation!", style("✓").green().bold());
        Ok(())
    }
}

/// True when recomputing levels alone makes `document` valid
fn fixable(document: &Document) -> bool {
    let mut candidate = document.clone();
    candidate.setup_levels().is_ok() && candidate.validate().is_empty()
}

fn print_violations(errors: &ValidationErrors) {
    for violation in errors.violations() {
        println!("    {}", style(&violation.message).yellow());
        if let Some(help) = &violation.help {
            println!("      {} {}", style("help:").dim(), help);
        }
    }
}
