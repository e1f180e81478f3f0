//! Driver errors

use cy_cranelift::JitError;
use cy_lower::LowerError;
use cy_parser::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Anything that stops a compilation session
#[derive(Debug, Error)]
pub enum CompileError {
    /// A source or configuration file could not be read
    #[error("cannot read `{}`", path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is malformed
    #[error("invalid configuration in `{}`", path.display())]
    Config {
        /// Configuration file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },

    /// The syntax tree of a unit contains error nodes
    #[error("`{unit}` has {} syntax error(s)", errors.len())]
    Parse {
        /// Source unit name
        unit: String,
        /// Collected syntax errors
        errors: Vec<ParseError>,
    },

    /// Lowering a unit failed
    #[error("failed to lower `{unit}`")]
    Lower {
        /// Source unit name
        unit: String,
        /// Underlying error
        #[source]
        source: LowerError,
    },

    /// Compiling or linking the assembly failed
    #[error(transparent)]
    Jit(#[from] JitError),
}
