//! Lowering errors

use cy_ir::IrError;
use cy_syntax::SyntaxNode;
use miette::Diagnostic;
use thiserror::Error;

/// An error that aborts lowering of the current translation unit
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum LowerError {
    /// Type spelling outside of `int`, `double`, `void`
    #[error("unknown type `{spelling}`")]
    #[diagnostic(code(lower::unknown_type), help("supported types are `int`, `double` and `void`"))]
    UnknownType {
        /// Type as written
        spelling: String,
    },

    /// Identifier read with no visible binding
    #[error("use of undeclared identifier `{name}`")]
    #[diagnostic(code(lower::undeclared_identifier))]
    UndeclaredIdentifier {
        /// Identifier
        name: String,
    },

    /// Call to a function that has not been defined yet
    #[error("call to undeclared function `{name}`")]
    #[diagnostic(
        code(lower::undeclared_function),
        help("functions must be defined before they are called")
    )]
    UndeclaredFunction {
        /// Callee name
        name: String,
    },

    /// Binary operator other than `+` and `-`
    #[error("unsupported operator `{operator}`")]
    #[diagnostic(code(lower::unrecognized_operator))]
    UnrecognizedOperator {
        /// Operator text
        operator: String,
    },

    /// Expression node kind with no lowering rule
    #[error("unsupported expression `{kind}`")]
    #[diagnostic(code(lower::unsupported_expression))]
    UnsupportedExpression {
        /// Grammar kind
        kind: String,
    },

    /// Statement node kind with no lowering rule
    #[error("unsupported statement `{kind}`")]
    #[diagnostic(code(lower::unsupported_statement))]
    UnsupportedStatement {
        /// Grammar kind
        kind: String,
    },

    /// Declarator shape other than a plain or initialized identifier
    #[error("unsupported declarator `{kind}`")]
    #[diagnostic(code(lower::unsupported_declarator))]
    UnsupportedDeclarator {
        /// Grammar kind
        kind: String,
    },

    /// Number literal that does not fit its type
    #[error("invalid number literal `{text}`")]
    #[diagnostic(code(lower::invalid_literal))]
    InvalidLiteral {
        /// Literal text
        text: String,
    },

    /// Function defined twice
    #[error("redefinition of function `{name}`")]
    #[diagnostic(code(lower::redefinition))]
    Redefinition {
        /// Function name
        name: String,
    },

    /// A required child of a node is absent
    #[error("`{parent}` is missing its `{field}`")]
    #[diagnostic(code(lower::missing_node))]
    MissingNode {
        /// Parent grammar kind
        parent: String,
        /// Missing field or role
        field: &'static str,
    },

    /// The IR builder rejected an instruction
    #[error(transparent)]
    #[diagnostic(code(lower::ir))]
    Ir(#[from] IrError),
}

impl LowerError {
    pub(crate) fn missing(parent: &SyntaxNode, field: &'static str) -> Self {
        Self::MissingNode {
            parent: parent.kind.to_string(),
            field,
        }
    }
}
