//! Syntax errors found in tree-sitter output
//!
//! Every variant except [`ParseError::ParseFailed`] points at the offending
//! bytes. The span fields are only read by the `Diagnostic` derive.

#![allow(unused_assignments, reason = "fields are read by the miette derive expansion")]

use codespan_reporting::diagnostic::{Diagnostic as CodespanDiagnostic, Label};
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

pub use codespan_reporting;

/// A syntax error in one source unit
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum ParseError {
    /// Text the grammar could not place
    #[error("unexpected `{token}`")]
    #[diagnostic(code(parser::unexpected_token))]
    UnexpectedToken {
        /// First line of the rejected text
        token: String,
        /// Rejected bytes
        #[label("not valid here")]
        span: SourceSpan,
        /// Unit text
        #[source_code]
        src: NamedSource<String>,
    },

    /// Token the parser inserted to recover
    #[error("missing `{expected}`")]
    #[diagnostic(code(parser::missing_token))]
    MissingToken {
        /// Inserted token
        expected: String,
        /// Insertion point
        #[label("insert `{expected}` here")]
        span: SourceSpan,
        /// Unit text
        #[source_code]
        src: NamedSource<String>,
    },

    /// `(` or `{` with no matching close
    #[error("unclosed `{delimiter}`")]
    #[diagnostic(code(parser::unclosed_delimiter))]
    UnclosedDelimiter {
        /// Opening delimiter
        delimiter: char,
        /// Where it opens
        #[label("opened here")]
        opening: SourceSpan,
        /// Where the close was expected
        #[label("expected close here")]
        expected_close: SourceSpan,
        /// Unit text
        #[source_code]
        src: NamedSource<String>,
    },

    /// Function definition or declaration whose shape is broken
    #[error("malformed {construct}")]
    #[diagnostic(code(parser::malformed), help("expected `{form}`"))]
    MalformedConstruct {
        /// What was being parsed
        construct: &'static str,
        /// Expected shape
        form: &'static str,
        /// Broken bytes
        #[label("in this {construct}")]
        span: SourceSpan,
        /// Unit text
        #[source_code]
        src: NamedSource<String>,
    },

    /// tree-sitter produced no tree at all
    #[error("failed to parse source: {reason}")]
    #[diagnostic(code(parser::parse_failed))]
    ParseFailed {
        /// Reason reported by the parser
        reason: String,
    },
}

impl ParseError {
    /// Converts into a codespan diagnostic for terminal rendering
    #[must_use]
    pub fn to_codespan_diagnostic(&self, file_id: usize) -> CodespanDiagnostic<usize> {
        let range = |span: &SourceSpan| span.offset()..span.offset() + span.len();
        let diagnostic = CodespanDiagnostic::error().with_message(self.to_string());

        match self {
            Self::UnexpectedToken { span, .. } => {
                diagnostic.with_labels(vec![Label::primary(file_id, range(span))])
            }
            Self::MissingToken { expected, span, .. } => diagnostic.with_labels(vec![
                Label::primary(file_id, range(span)).with_message(format!("insert `{expected}` here")),
            ]),
            Self::UnclosedDelimiter {
                opening,
                expected_close,
                ..
            } => diagnostic.with_labels(vec![
                Label::secondary(file_id, range(opening)).with_message("opened here"),
                Label::primary(file_id, range(expected_close)),
            ]),
            Self::MalformedConstruct { form, span, .. } => diagnostic
                .with_labels(vec![Label::primary(file_id, range(span))])
                .with_notes(vec![format!("expected `{form}`")]),
            Self::ParseFailed { .. } => diagnostic,
        }
    }
}
