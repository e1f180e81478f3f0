//! C language adapter
//!
//! Parses C source with tree-sitter-c and converts the result into the
//! owned [`SyntaxNode`] tree consumed by the lowering engine.

use anyhow::Result;
use cy_span::Span;
use cy_syntax::{Language, SyntaxKind, SyntaxNode};
use tree_sitter::{Node, Parser, Tree};

/// C language implementation
pub struct CLanguage;

impl CLanguage {
    /// Creates a new C language adapter
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn lower_with_field(
        &self,
        node: &Node<'_>,
        source: &str,
        field: Option<&'static str>,
    ) -> SyntaxNode {
        let kind = SyntaxKind::from_grammar(node.kind(), node.is_named());
        let span = Span::new(node.start_byte() as u32, node.end_byte() as u32);
        let text = source
            .get(node.start_byte()..node.end_byte())
            .unwrap_or_default()
            .to_string();

        let mut children = Vec::with_capacity(node.child_count());
        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                children.push(self.lower_with_field(&child, source, cursor.field_name()));
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }

        SyntaxNode {
            kind,
            span,
            text,
            field,
            named: node.is_named(),
            children,
        }
    }
}

impl Default for CLanguage {
    fn default() -> Self {
        Self::new()
    }
}

impl Language for CLanguage {
    fn name(&self) -> &'static str {
        "c"
    }

    fn extensions(&self) -> &[&'static str] {
        &["c", "h"]
    }

    fn tree_sitter_language(&self) -> tree_sitter::Language {
        tree_sitter_c::LANGUAGE.into()
    }

    fn parse(&self, source: &str) -> Result<Tree> {
        let mut parser = Parser::new();
        parser.set_language(&self.tree_sitter_language())?;

        parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("tree-sitter parse failed"))
    }

    fn lower_node(&self, node: &Node<'_>, source: &str) -> SyntaxNode {
        self.lower_with_field(node, source, None)
    }
}
