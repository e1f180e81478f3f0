//! IR construction errors

use crate::Type;
use thiserror::Error;

/// Errors raised by [`crate::ModuleBuilder`] when an instruction is ill-typed
/// or refers to values it cannot see
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    /// An instruction was emitted before any function was created
    #[error("no function is being built")]
    NoActiveFunction,

    /// A value from another function was used
    #[error("value %{value} does not belong to function `{function}`")]
    ForeignValue {
        /// Function being built
        function: String,
        /// Offending value number
        value: u32,
    },

    /// Binary operands of different types
    #[error("cannot apply `{op}` to `{lhs}` and `{rhs}`")]
    TypeMismatch {
        /// Operator mnemonic
        op: &'static str,
        /// Left operand type
        lhs: Type,
        /// Right operand type
        rhs: Type,
    },

    /// A `void` value used as an operand
    #[error("`{op}` operand has type `void`")]
    VoidOperand {
        /// Operator mnemonic
        op: &'static str,
    },

    /// Parameter declared with type `void`
    #[error("parameter {index} of `{function}` has type `void`")]
    VoidParameter {
        /// Function name
        function: String,
        /// Parameter position
        index: usize,
    },

    /// Wrong number of call arguments
    #[error("`{callee}` takes {expected} argument(s) but {found} were supplied")]
    ArityMismatch {
        /// Callee name
        callee: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        found: usize,
    },

    /// Call argument of the wrong type
    #[error("argument {index} of `{callee}` expects `{expected}`, found `{found}`")]
    ArgumentTypeMismatch {
        /// Callee name
        callee: String,
        /// Argument position
        index: usize,
        /// Declared type
        expected: Type,
        /// Supplied type
        found: Type,
    },

    /// Returned value does not match the declared return type
    #[error("`{function}` returns `{expected}`, found `{found}`")]
    ReturnTypeMismatch {
        /// Function name
        function: String,
        /// Declared return type
        expected: Type,
        /// Returned type (`void` for a bare return)
        found: Type,
    },
}
