use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use crate::commands::CommandReport;

#[derive(Debug, Parser)]
#[command(
    name = "tiptally",
    version,
    about = "Reconcile creator earnings-report exports into a master project catalog"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse raw export text files into per-window JSON and the combined stats bundle.
    Parse,
    /// Merge the candidate project batch into the master catalog.
    Merge,
    /// Re-match the latest stats bundle into every catalog entry and re-sort.
    Refresh,
    /// Summarize the catalog on disk.
    Status,
}

fn print_report(report: &CommandReport) {
    for line in &report.details {
        println!("{line}");
    }
    for line in &report.issues {
        println!("issue: {line}");
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let report = match cli.command {
        Command::Parse => commands::parse::run()?,
        Command::Merge => commands::merge::run()?,
        Command::Refresh => commands::refresh::run()?,
        Command::Status => commands::status::run()?,
    };

    print_report(&report);
    Ok(())
}
