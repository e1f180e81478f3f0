//! Compiler configuration

use crate::CompileError;
use cy_cranelift::{DEFAULT_ENTRY_SYMBOL, LinkOptions};
use cy_lower::{LowerOptions, RedefinitionPolicy, StatementPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Session-wide settings, loadable from a TOML file
///
/// ```toml
/// entry-function = "main"
/// entry-symbol = "__entry"
/// redefinition = "reject"        # or "last-wins"
/// unknown-statements = "reject"  # or "skip"
/// reject-syntax-errors = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompilerConfig {
    /// Function exported under the entry symbol; empty disables the entry
    pub entry_function: String,
    /// Symbol the assembly exposes as its entry point
    pub entry_symbol: String,
    /// Function redefinition handling
    pub redefinition: RedefinitionPolicy,
    /// Unrecognized statement handling
    pub unknown_statements: StatementPolicy,
    /// Abort a unit whose syntax tree contains error nodes
    pub reject_syntax_errors: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            entry_function: "main".to_string(),
            entry_symbol: DEFAULT_ENTRY_SYMBOL.to_string(),
            redefinition: RedefinitionPolicy::default(),
            unknown_statements: StatementPolicy::default(),
            reject_syntax_errors: true,
        }
    }
}

impl CompilerConfig {
    /// Loads a configuration file; missing keys keep their defaults
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::Io`] if the file cannot be read and
    /// [`CompileError::Config`] if it is not valid configuration TOML.
    pub fn from_file(path: &Path) -> Result<Self, CompileError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CompileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| CompileError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Policies handed to the lowering engine
    #[must_use]
    pub fn lower_options(&self) -> LowerOptions {
        LowerOptions {
            redefinition: self.redefinition,
            unknown_statements: self.unknown_statements,
        }
    }

    /// Entry contract handed to the backend
    #[must_use]
    pub fn link_options(&self) -> LinkOptions {
        LinkOptions {
            entry_function: Some(self.entry_function.clone()).filter(|name| !name.is_empty()),
            entry_symbol: self.entry_symbol.clone(),
        }
    }
}
