//! Compilation driver
//!
//! [`Compiler`] owns one compilation session: every source unit inserted into
//! it is parsed, lowered into its own IR module and handed to the JIT
//! session. [`Compiler::compile`] then links all modules into a single
//! [`Assembly`].

mod config;
mod error;

pub use config::CompilerConfig;
pub use cy_cranelift::{Assembly, EntryPoint, ReturnValue};
pub use error::CompileError;

use cy_cranelift::JitSession;
use cy_ir::{FunctionRef, Module};
use cy_lower::FunctionTable;
use cy_parser::ParseResult;
use log::{debug, info};
use std::path::Path;

/// One input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Module name, usually the file name
    pub name: String,
    /// Source text
    pub text: String,
}

impl SourceUnit {
    /// Creates a unit from in-memory text
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Reads a unit from disk, naming it after the file
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::Io`] if the file is unreadable or not UTF-8.
    pub fn from_path(path: &Path) -> Result<Self, CompileError> {
        let text = std::fs::read_to_string(path).map_err(|source| CompileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
        Ok(Self { name, text })
    }
}

/// A compilation session over any number of source units
#[derive(Debug, Default)]
pub struct Compiler {
    config: CompilerConfig,
    session: JitSession,
    functions: FunctionTable,
}

impl Compiler {
    /// Creates an empty session
    #[must_use]
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            config,
            session: JitSession::new(),
            functions: FunctionTable::new(),
        }
    }

    /// Session configuration
    #[must_use]
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Parses a unit without lowering it
    #[must_use]
    pub fn parse(&self, unit: &SourceUnit) -> ParseResult {
        cy_parser::parse_source(&unit.name, &unit.text)
    }

    /// Parses, lowers and inserts one unit
    ///
    /// # Errors
    ///
    /// See [`Compiler::insert_parsed`].
    pub fn insert_source(&mut self, unit: &SourceUnit) -> Result<Vec<FunctionRef>, CompileError> {
        let parsed = self.parse(unit);
        self.insert_parsed(unit, &parsed)
    }

    /// Lowers an already parsed unit into a new module and inserts it into the session
    ///
    /// Functions it defines become callable from every unit inserted later.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::Parse`] when the tree has error nodes and the
    /// configuration rejects them, or [`CompileError::Lower`] when lowering
    /// fails. A failed unit leaves neither a module nor function names behind.
    pub fn insert_parsed(
        &mut self,
        unit: &SourceUnit,
        parsed: &ParseResult,
    ) -> Result<Vec<FunctionRef>, CompileError> {
        let syntax_error = || CompileError::Parse {
            unit: unit.name.clone(),
            errors: parsed.errors.clone(),
        };
        if self.config.reject_syntax_errors && !parsed.is_clean() {
            return Err(syntax_error());
        }
        let root = parsed.syntax.as_ref().ok_or_else(syntax_error)?;

        // Registrations only reach the session table once the whole unit lowered
        let mut staged = self.functions.clone();
        let mut module = self.session.create_module(unit.name.clone());
        let options = self.config.lower_options();
        let lowered = cy_lower::lower_translation_unit(
            &unit.text,
            root,
            module.builder(),
            &mut staged,
            &options,
        )
        .map_err(|source| CompileError::Lower {
            unit: unit.name.clone(),
            source,
        })?;

        debug!("`{}`: {} function(s) lowered", unit.name, lowered.len());
        self.functions = staged;
        self.session.insert_module(module);
        Ok(lowered)
    }

    /// Reads and inserts a file
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::Io`] for unreadable files, otherwise see
    /// [`Compiler::insert_parsed`].
    pub fn insert_file(&mut self, path: &Path) -> Result<Vec<FunctionRef>, CompileError> {
        let unit = SourceUnit::from_path(path)?;
        self.insert_source(&unit)
    }

    /// Functions defined so far, across all units
    #[must_use]
    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// Modules inserted so far
    #[must_use]
    pub fn modules(&self) -> &[Module] {
        self.session.modules()
    }

    /// Compiles and links every inserted module
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::Jit`] when linking or code generation fails.
    pub fn compile(self) -> Result<Assembly, CompileError> {
        info!("compiling {} module(s)", self.session.modules().len());
        let options = self.config.link_options();
        Ok(self.session.compile_and_link(&options)?)
    }
}

/// Compiles `units` in order and links them into one assembly
///
/// # Errors
///
/// Returns the first error of any unit, or of the link step.
pub fn compile_sources(units: &[SourceUnit], config: CompilerConfig) -> Result<Assembly, CompileError> {
    let mut compiler = Compiler::new(config);
    for unit in units {
        compiler.insert_source(unit)?;
    }
    compiler.compile()
}
