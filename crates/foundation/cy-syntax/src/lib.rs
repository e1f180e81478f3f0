//! Owned syntax trees for the supported C subset
//!
//! Tree-sitter trees borrow from their parser and expose node kinds as
//! strings. This crate converts them into an owned [`SyntaxNode`] tree whose
//! kinds form a closed enum, so every lowering rule is an exhaustive `match`.

use anyhow::Result;
use cy_span::Span;
use std::fmt;

/// Owned syntax tree node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    /// The kind of this node
    pub kind: SyntaxKind,
    /// Byte range in the owning source unit
    pub span: Span,
    /// Source text covered by this node
    pub text: String,
    /// Field name this node occupies in its parent, if any
    pub field: Option<&'static str>,
    /// Whether the grammar names this node (anonymous tokens are unnamed)
    pub named: bool,
    /// All child nodes, named and anonymous, in source order
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// Named children in source order
    pub fn named_children(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter(|child| child.named)
    }

    /// Number of named children
    #[must_use]
    pub fn named_child_count(&self) -> usize {
        self.named_children().count()
    }

    /// The `index`-th named child
    #[must_use]
    pub fn named_child(&self, index: usize) -> Option<&Self> {
        self.named_children().nth(index)
    }

    /// First child stored under `field`
    #[must_use]
    pub fn child_by_field(&self, field: &str) -> Option<&Self> {
        self.children_by_field(field).next()
    }

    /// Every child stored under `field`, in source order
    pub fn children_by_field<'node, 'name>(
        &'node self,
        field: &'name str,
    ) -> impl Iterator<Item = &'node Self> + use<'node, 'name> {
        self.children
            .iter()
            .filter(move |child| child.field.is_some_and(|name| name == field))
    }

    /// Returns true if this node or any descendant is an error node
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.kind == SyntaxKind::Error || self.children.iter().any(Self::has_error)
    }
}

/// Node kinds of the C grammar that the lowering engine distinguishes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    /// Root of a source unit
    TranslationUnit,
    /// `int f(...) { ... }`
    FunctionDefinition,
    /// `f(...)` inside a definition
    FunctionDeclarator,
    /// `(int a, double b)`
    ParameterList,
    /// `int a`
    ParameterDeclaration,
    /// Built-in type keyword such as `int` or `char`
    PrimitiveType,
    /// User type name
    TypeIdentifier,
    /// `{ ... }`
    CompoundStatement,
    /// `int x = 1;`
    Declaration,
    /// `x = 1` inside a declaration
    InitDeclarator,
    /// `return ...;`
    ReturnStatement,
    /// `expr;`
    ExpressionStatement,
    /// `a + b`
    BinaryExpression,
    /// `f(a, b)`
    CallExpression,
    /// `(a, b)` of a call
    ArgumentList,
    /// `(a)`
    ParenthesizedExpression,
    /// Numeric literal
    NumberLiteral,
    /// Identifier
    Identifier,
    /// Comment
    Comment,
    /// Parse error recovery node
    Error,
    /// Anonymous token such as `+`, `;` or `(`
    Token(String),
    /// Any other named node, keyed by its grammar name
    Other(String),
}

impl SyntaxKind {
    /// Classifies a tree-sitter node kind
    #[must_use]
    pub fn from_grammar(kind: &str, named: bool) -> Self {
        if !named {
            return Self::Token(kind.to_string());
        }
        match kind {
            "translation_unit" => Self::TranslationUnit,
            "function_definition" => Self::FunctionDefinition,
            "function_declarator" => Self::FunctionDeclarator,
            "parameter_list" => Self::ParameterList,
            "parameter_declaration" => Self::ParameterDeclaration,
            "primitive_type" => Self::PrimitiveType,
            "type_identifier" => Self::TypeIdentifier,
            "compound_statement" => Self::CompoundStatement,
            "declaration" => Self::Declaration,
            "init_declarator" => Self::InitDeclarator,
            "return_statement" => Self::ReturnStatement,
            "expression_statement" => Self::ExpressionStatement,
            "binary_expression" => Self::BinaryExpression,
            "call_expression" => Self::CallExpression,
            "argument_list" => Self::ArgumentList,
            "parenthesized_expression" => Self::ParenthesizedExpression,
            "number_literal" => Self::NumberLiteral,
            "identifier" => Self::Identifier,
            "comment" => Self::Comment,
            "ERROR" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }

    /// The grammar name of this kind
    #[must_use]
    pub fn grammar_name(&self) -> &str {
        match self {
            Self::TranslationUnit => "translation_unit",
            Self::FunctionDefinition => "function_definition",
            Self::FunctionDeclarator => "function_declarator",
            Self::ParameterList => "parameter_list",
            Self::ParameterDeclaration => "parameter_declaration",
            Self::PrimitiveType => "primitive_type",
            Self::TypeIdentifier => "type_identifier",
            Self::CompoundStatement => "compound_statement",
            Self::Declaration => "declaration",
            Self::InitDeclarator => "init_declarator",
            Self::ReturnStatement => "return_statement",
            Self::ExpressionStatement => "expression_statement",
            Self::BinaryExpression => "binary_expression",
            Self::CallExpression => "call_expression",
            Self::ArgumentList => "argument_list",
            Self::ParenthesizedExpression => "parenthesized_expression",
            Self::NumberLiteral => "number_literal",
            Self::Identifier => "identifier",
            Self::Comment => "comment",
            Self::Error => "ERROR",
            Self::Token(name) | Self::Other(name) => name,
        }
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.grammar_name())
    }
}

/// Trait for language-specific parsers
pub trait Language: Send + Sync + 'static {
    /// Name of the language
    fn name(&self) -> &'static str;

    /// File extensions this language handles
    fn extensions(&self) -> &[&'static str];

    /// tree-sitter language instance
    fn tree_sitter_language(&self) -> tree_sitter::Language;

    /// Parse source code to concrete syntax tree
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar cannot be loaded or parsing is cancelled
    fn parse(&self, source: &str) -> Result<tree_sitter::Tree>;

    /// Convert a tree-sitter node into an owned syntax node
    fn lower_node(&self, node: &tree_sitter::Node, source: &str) -> SyntaxNode;
}
