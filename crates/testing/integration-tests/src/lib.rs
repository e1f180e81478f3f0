//! Integration test utilities for the city compiler

pub mod project;

use cy_driver::{Assembly, CompileError, Compiler, CompilerConfig, ReturnValue, SourceUnit};

/// In-memory multi-unit program
///
/// Units are inserted into one compilation session in the order they were
/// added, so a unit may call functions of any unit added before it.
#[derive(Debug, Clone, Default)]
pub struct TestProgram {
    /// Session configuration
    pub config: CompilerConfig,
    /// Source units in insertion order
    pub units: Vec<SourceUnit>,
}

impl TestProgram {
    /// Creates an empty program with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-unit program named `main.c`
    #[must_use]
    pub fn single(source: &str) -> Self {
        Self::new().unit("main.c", source)
    }

    /// Adds a unit
    #[must_use]
    pub fn unit(mut self, name: &str, source: &str) -> Self {
        self.units.push(SourceUnit::new(name, source));
        self
    }

    /// Replaces the configuration
    #[must_use]
    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Lowers every unit without linking
    ///
    /// # Errors
    ///
    /// Returns the first unit error.
    pub fn lower(&self) -> Result<Compiler, CompileError> {
        let mut compiler = Compiler::new(self.config.clone());
        for unit in &self.units {
            compiler.insert_source(unit)?;
        }
        Ok(compiler)
    }

    /// Lowers and links every unit
    ///
    /// # Errors
    ///
    /// Returns the first unit error or the link error.
    pub fn compile(&self) -> Result<Assembly, CompileError> {
        self.lower()?.compile()
    }

    /// Compiles and calls the entry symbol
    ///
    /// # Errors
    ///
    /// Fails if compilation fails or the entry point is missing.
    pub fn run(&self) -> Result<ReturnValue, CompileError> {
        let assembly = self.compile()?;
        Ok(assembly.entry()?.call()?)
    }

    /// Compiles and calls a nullary function by name
    ///
    /// # Errors
    ///
    /// Fails if compilation fails or `name` is not an exported nullary function.
    pub fn call(&self, name: &str) -> Result<ReturnValue, CompileError> {
        let assembly = self.compile()?;
        Ok(assembly.get(name)?.call()?)
    }
}
