//! Parser front end for C source units
//!
//! Runs the tree-sitter C grammar, collects error and missing nodes as
//! [`ParseError`] diagnostics, and converts the tree into an owned
//! [`SyntaxNode`].

pub mod error;

pub use error::ParseError;

use lang_c::CLanguage;
use cy_syntax::{Language, SyntaxNode};
use log::debug;
use miette::{NamedSource, SourceSpan};

/// Result of parsing a source unit
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Converted syntax tree
    pub syntax: Option<SyntaxNode>,
    /// Parse errors with detailed diagnostics
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// Returns true when the tree was produced without error nodes
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.syntax.is_some() && self.errors.is_empty()
    }
}

/// Parse C source code using the language adapter
#[must_use]
pub fn parse_source(name: &str, source: &str) -> ParseResult {
    let language = CLanguage::new();

    match language.parse(source) {
        Ok(tree) => {
            let mut errors = Vec::new();

            if tree.root_node().has_error() {
                collect_errors(&tree.root_node(), name, source, &mut errors);
            }

            let syntax = language.lower_node(&tree.root_node(), source);
            debug!("parsed `{name}`: {} error(s)", errors.len());

            ParseResult {
                syntax: Some(syntax),
                errors,
            }
        }
        Err(err) => ParseResult {
            syntax: None,
            errors: vec![ParseError::ParseFailed {
                reason: format!("{err}"),
            }],
        },
    }
}

/// Renders the named-node kinds of a tree, one per line, tab-indented by depth
#[must_use]
pub fn dump_tree(root: &SyntaxNode) -> String {
    let mut out = String::new();
    dump_node(root, 0, &mut out);
    out
}

fn dump_node(node: &SyntaxNode, depth: usize, out: &mut String) {
    out.push_str(&"\t".repeat(depth));
    out.push_str(node.kind.grammar_name());
    out.push('\n');
    for child in node.named_children() {
        dump_node(child, depth + 1, out);
    }
}

fn named_source(name: &str, source: &str) -> NamedSource<String> {
    NamedSource::new(name, source.to_string())
}

/// Recursively collect error nodes from the tree
fn collect_errors(
    node: &tree_sitter::Node<'_>,
    name: &str,
    source: &str,
    errors: &mut Vec<ParseError>,
) {
    if node.is_error() {
        let start = node.start_byte();
        let end = node.end_byte();
        let span: SourceSpan = (start, end - start).into();

        let error = match node.parent() {
            Some(parent) => analyze_error_context(parent, node, name, source, span),
            None => ParseError::UnexpectedToken {
                token: first_line(source.get(start..end).unwrap_or_default()),
                span,
                src: named_source(name, source),
            },
        };
        errors.push(error);
    } else if node.is_missing() {
        let pos = node.start_byte();
        let expected = node.kind().to_string();

        let opening = match expected.as_str() {
            ")" => Some('('),
            "}" => Some('{'),
            "]" => Some('['),
            _ => None,
        };
        let opening_pos = opening.and_then(|opening_char| {
            node.parent()
                .and_then(|parent| find_opening_delimiter(&parent, source, opening_char))
                .map(|pos| (opening_char, pos))
        });

        let error = match opening_pos {
            Some((opening_char, opening_pos)) => ParseError::UnclosedDelimiter {
                delimiter: opening_char,
                opening: (opening_pos, 1).into(),
                expected_close: (pos, 0).into(),
                src: named_source(name, source),
            },
            None => ParseError::MissingToken {
                expected,
                span: (pos, 0).into(),
                src: named_source(name, source),
            },
        };
        errors.push(error);
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_errors(&child, name, source, errors);
    }
}

/// Analyze error context to provide more specific error messages
fn analyze_error_context(
    parent: tree_sitter::Node<'_>,
    error_node: &tree_sitter::Node<'_>,
    name: &str,
    source: &str,
    error_span: SourceSpan,
) -> ParseError {
    let src = named_source(name, source);
    let token = first_line(
        source
            .get(error_node.start_byte()..error_node.end_byte())
            .unwrap_or_default(),
    );

    let delimiter = match parent.kind() {
        "parameter_list" | "argument_list" | "parenthesized_expression" => Some('('),
        "compound_statement" => Some('{'),
        _ => None,
    };

    let unclosed = delimiter
        .filter(|&opening_char| !closes(&parent, source, opening_char))
        .and_then(|opening_char| {
            find_opening_delimiter(&parent, source, opening_char).map(|pos| (opening_char, pos))
        });
    if let Some((opening_char, opening_pos)) = unclosed {
        return ParseError::UnclosedDelimiter {
            delimiter: opening_char,
            opening: (opening_pos, 1).into(),
            expected_close: error_span,
            src,
        };
    }

    match parent.kind() {
        "function_definition" => ParseError::MalformedConstruct {
            construct: "function definition",
            form: "type name(params) { body }",
            span: error_span,
            src,
        },
        "declaration" => ParseError::MalformedConstruct {
            construct: "declaration",
            form: "type name = value;",
            span: error_span,
            src,
        },
        _ => ParseError::UnexpectedToken {
            token,
            span: error_span,
            src,
        },
    }
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or(text).to_string()
}

/// Find the position of an opening delimiter inside a node
fn find_opening_delimiter(
    node: &tree_sitter::Node<'_>,
    source: &str,
    opening_char: char,
) -> Option<usize> {
    let start = node.start_byte();
    let text = source.get(start..node.end_byte())?;
    text.find(opening_char).map(|idx| start + idx)
}

/// Whether the node's text ends with the delimiter matching `opening_char`
fn closes(node: &tree_sitter::Node<'_>, source: &str, opening_char: char) -> bool {
    let closing_char = match opening_char {
        '(' => ')',
        '{' => '}',
        _ => ']',
    };
    source
        .get(node.start_byte()..node.end_byte())
        .is_some_and(|text| text.trim_end().ends_with(closing_char))
}
