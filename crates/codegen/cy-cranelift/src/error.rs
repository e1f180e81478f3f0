//! Backend errors

use cy_ir::Signature;
use thiserror::Error;

/// Errors raised while linking or invoking JIT-compiled code
#[derive(Debug, Error)]
pub enum JitError {
    /// Cranelift module or host setup failure
    #[error("cranelift: {0}")]
    Module(#[from] cranelift_module::ModuleError),

    /// Generated code failed Cranelift verification
    #[error("verification of `{function}` failed: {message}")]
    Verification {
        /// Function being defined
        function: String,
        /// Verifier output
        message: String,
    },

    /// Two functions share one symbol name
    #[error("symbol `{name}` is defined more than once")]
    DuplicateSymbol {
        /// Symbol name
        name: String,
    },

    /// A call refers to a symbol no inserted module defines
    #[error("`{caller}` calls undefined symbol `{name}`")]
    UndefinedSymbol {
        /// Missing symbol
        name: String,
        /// Calling function
        caller: String,
    },

    /// A call site disagrees with the callee's definition
    #[error("call to `{name}` uses signature {found}, but it is defined as {expected}")]
    SignatureMismatch {
        /// Callee name
        name: String,
        /// Signature at the definition
        expected: Signature,
        /// Signature at the call site
        found: Signature,
    },

    /// An instruction uses a value that was never defined
    #[error("`{function}` uses undefined value %{value}")]
    UnknownValue {
        /// Function being defined
        function: String,
        /// Value number
        value: u32,
    },

    /// The requested symbol is not exported by the assembly
    #[error("entry point `{symbol}` not found in assembly")]
    MissingEntryPoint {
        /// Requested symbol
        symbol: String,
    },

    /// The symbol cannot be invoked without arguments
    #[error("`{symbol}` has signature {signature}; only nullary functions can be invoked")]
    UnsupportedSignature {
        /// Symbol name
        symbol: String,
        /// Its signature
        signature: Signature,
    },
}
