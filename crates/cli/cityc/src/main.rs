//! City compiler CLI
//!
//! Compiles one or more C source files into a single JIT assembly and runs
//! its entry point.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod compile;
mod report;

#[derive(Parser)]
#[command(name = "cityc")]
#[command(about = "JIT compiler for a small subset of C", long_about = None)]
#[command(version)]
struct Cli {
    /// Source files, lowered in the order given
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Function to run as the entry point
    #[arg(long)]
    entry: Option<String>,

    /// Compile and link without running the entry point
    #[arg(long)]
    no_run: bool,

    /// Print the IR of every module before linking
    #[arg(long)]
    emit_ir: bool,

    /// Do not print syntax trees
    #[arg(long)]
    no_tree: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    compile::run(&compile::Options {
        files: cli.files,
        config: cli.config,
        entry: cli.entry,
        run: !cli.no_run,
        emit_ir: cli.emit_ir,
        print_tree: !cli.no_tree,
    })
    .map(|_| ())
}
