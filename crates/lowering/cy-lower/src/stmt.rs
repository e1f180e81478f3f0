//! Statement lowering

use crate::StatementPolicy;
use crate::context::CompilationContext;
use crate::error::LowerError;
use crate::expr::lower_expr;
use crate::types::resolve_type;
use cy_syntax::{SyntaxKind, SyntaxNode};
use log::{debug, trace};

/// Lowers the statements of a compound statement in the current scope frame
///
/// Callers decide whether the block gets a frame of its own: a function
/// body shares its parameter frame, a nested block does not.
///
/// # Errors
///
/// Propagates the first statement that fails to lower.
pub fn lower_block(ctx: &mut CompilationContext<'_, '_>, block: &SyntaxNode) -> Result<(), LowerError> {
    block
        .named_children()
        .try_for_each(|statement| lower_stmt(ctx, statement))
}

/// Lowers a single statement
///
/// # Errors
///
/// Fails on declarations with an unsupported type or declarator, on any
/// expression error, and on unrecognized statement kinds unless the
/// statement policy is [`StatementPolicy::Skip`].
pub fn lower_stmt(ctx: &mut CompilationContext<'_, '_>, node: &SyntaxNode) -> Result<(), LowerError> {
    trace!("lowering statement `{}`", node.kind);
    match &node.kind {
        SyntaxKind::Declaration => lower_declaration(ctx, node),
        SyntaxKind::ReturnStatement => {
            let value = match operand(node) {
                Some(expr) => Some(lower_expr(ctx, expr)?),
                None => None,
            };
            Ok(ctx.builder.build_return(value)?)
        }
        SyntaxKind::ExpressionStatement => {
            if let Some(expr) = operand(node) {
                lower_expr(ctx, expr)?;
            }
            Ok(())
        }
        SyntaxKind::CompoundStatement => ctx.with_scope(|ctx| lower_block(ctx, node)),
        SyntaxKind::Comment => Ok(()),
        other => match ctx.options.unknown_statements {
            StatementPolicy::Reject => Err(LowerError::UnsupportedStatement {
                kind: other.to_string(),
            }),
            StatementPolicy::Skip => {
                debug!("skipping unsupported statement `{other}`");
                Ok(())
            }
        },
    }
}

/// `int a = 1, b;` binds `a`; `b` stays unbound
fn lower_declaration(ctx: &mut CompilationContext<'_, '_>, node: &SyntaxNode) -> Result<(), LowerError> {
    let ty = node
        .child_by_field("type")
        .ok_or_else(|| LowerError::missing(node, "type"))?;
    resolve_type(ctx, ty)?;

    for declarator in node.children_by_field("declarator") {
        match &declarator.kind {
            SyntaxKind::InitDeclarator => {
                let target = declarator
                    .child_by_field("declarator")
                    .ok_or_else(|| LowerError::missing(declarator, "declarator"))?;
                if target.kind != SyntaxKind::Identifier {
                    return Err(LowerError::UnsupportedDeclarator {
                        kind: target.kind.to_string(),
                    });
                }
                let init = declarator
                    .child_by_field("value")
                    .ok_or_else(|| LowerError::missing(declarator, "value"))?;

                let value = lower_expr(ctx, init)?;
                let name = ctx.text(target).to_string();
                ctx.scope.bind(name, value);
            }
            SyntaxKind::Identifier => {
                trace!("`{}` declared without initializer", ctx.text(declarator));
            }
            other => {
                return Err(LowerError::UnsupportedDeclarator {
                    kind: other.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// The expression operand of a `return` or expression statement, if any
fn operand(node: &SyntaxNode) -> Option<&SyntaxNode> {
    node.named_children()
        .find(|child| child.kind != SyntaxKind::Comment)
}
