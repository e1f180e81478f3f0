//! Compile-and-run pipeline

use crate::report::render_parse_errors;
use anyhow::{Context, Result, bail};
use colored::Colorize;
use cy_driver::{CompileError, Compiler, CompilerConfig, ReturnValue, SourceUnit};
use cy_ir::printer::print_module;
use log::debug;
use std::path::PathBuf;

/// What the command line asked for
pub struct Options {
    pub files: Vec<PathBuf>,
    pub config: Option<PathBuf>,
    pub entry: Option<String>,
    pub run: bool,
    pub emit_ir: bool,
    pub print_tree: bool,
}

/// Compiles every file and runs the entry point unless `--no-run` was given
pub fn run(options: &Options) -> Result<Option<ReturnValue>> {
    let mut config = match &options.config {
        Some(path) => CompilerConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => CompilerConfig::default(),
    };
    if let Some(entry) = &options.entry {
        config.entry_function.clone_from(entry);
    }
    debug!("configuration: {config:?}");

    let mut compiler = Compiler::new(config);
    for path in &options.files {
        let unit = SourceUnit::from_path(path)?;

        println!(
            "{} module '{}' from {}:",
            "Compiling".green().bold(),
            unit.name,
            path.display()
        );
        println!("{}", unit.text);

        let parsed = compiler.parse(&unit);
        if let Some(root) = parsed.syntax.as_ref().filter(|_| options.print_tree) {
            print!("{}", cy_parser::dump_tree(root));
        }

        match compiler.insert_parsed(&unit, &parsed) {
            Ok(functions) => println!(
                "  {} lowered {} function(s)",
                "✓".green(),
                functions.len()
            ),
            Err(CompileError::Parse { unit: name, errors }) => {
                eprint!("{}", render_parse_errors(&unit, &errors));
                bail!("`{name}` has {} syntax error(s)", errors.len());
            }
            Err(err) => return Err(err.into()),
        }
    }

    if options.emit_ir {
        println!("; session functions");
        for function in compiler.functions().iter() {
            println!(";   {} {}", function.name(), function.signature());
        }
        for module in compiler.modules() {
            println!("{}", print_module(module));
        }
    }

    let assembly = compiler.compile().context("linking failed")?;
    println!(
        "{} {} symbol(s): {}",
        "Linked".green().bold(),
        assembly.symbols().len(),
        assembly.symbols().join(", ")
    );

    if !options.run {
        return Ok(None);
    }

    let entry = assembly.entry()?;
    println!("{} {}()", "Executing".cyan().bold(), entry.name());
    let value = entry.call()?;
    println!("{} {value}", "Result:".green().bold());
    Ok(Some(value))
}
