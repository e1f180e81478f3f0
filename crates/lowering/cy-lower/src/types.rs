//! Type spelling resolution

use crate::context::CompilationContext;
use crate::error::LowerError;
use cy_ir::Type;
use cy_syntax::{SyntaxKind, SyntaxNode};

/// Resolves a type specifier node into an IR type
///
/// Only the primitive spellings `int`, `double` and `void` are accepted.
///
/// # Errors
///
/// Returns [`LowerError::UnknownType`] for any other spelling, including
/// typedef names.
pub fn resolve_type(ctx: &CompilationContext<'_, '_>, node: &SyntaxNode) -> Result<Type, LowerError> {
    let builder = &ctx.builder;
    match (&node.kind, ctx.text(node)) {
        (SyntaxKind::PrimitiveType, "int") => Ok(builder.int_type()),
        (SyntaxKind::PrimitiveType, "double") => Ok(builder.double_type()),
        (SyntaxKind::PrimitiveType, "void") => Ok(builder.void_type()),
        (_, spelling) => Err(LowerError::UnknownType {
            spelling: spelling.to_string(),
        }),
    }
}
