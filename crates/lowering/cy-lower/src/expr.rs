//! Expression lowering

use crate::context::CompilationContext;
use crate::error::LowerError;
use cy_ir::Value;
use cy_syntax::{SyntaxKind, SyntaxNode};
use log::trace;

/// Lowers an expression node to the IR value it computes
///
/// Operands are evaluated left to right; a call resolves its callee before
/// any argument is lowered.
///
/// # Errors
///
/// Fails on unbound identifiers, unknown callees, operators other than
/// `+`/`-`, unrepresentable literals, unsupported node kinds, and whatever
/// the IR builder rejects (operand type mismatches, arity, void operands).
pub fn lower_expr(ctx: &mut CompilationContext<'_, '_>, node: &SyntaxNode) -> Result<Value, LowerError> {
    trace!("lowering expression `{}`", node.kind);
    match &node.kind {
        SyntaxKind::NumberLiteral => lower_number(ctx, node),
        SyntaxKind::Identifier => {
            let name = ctx.text(node);
            ctx.scope
                .lookup(name)
                .copied()
                .ok_or_else(|| LowerError::UndeclaredIdentifier {
                    name: name.to_string(),
                })
        }
        SyntaxKind::BinaryExpression => lower_binary(ctx, node),
        SyntaxKind::CallExpression => lower_call(ctx, node),
        SyntaxKind::ParenthesizedExpression => {
            let inner = node
                .named_children()
                .find(|child| child.kind != SyntaxKind::Comment)
                .ok_or_else(|| LowerError::missing(node, "expression"))?;
            lower_expr(ctx, inner)
        }
        other => Err(LowerError::UnsupportedExpression {
            kind: other.to_string(),
        }),
    }
}

fn lower_number(ctx: &mut CompilationContext<'_, '_>, node: &SyntaxNode) -> Result<Value, LowerError> {
    let text = ctx.text(node).to_string();
    let invalid = || LowerError::InvalidLiteral { text: text.clone() };

    let is_hex = text.starts_with("0x") || text.starts_with("0X");
    if !is_hex && text.contains(['.', 'e', 'E']) {
        let value: f64 = text.parse().map_err(|_| invalid())?;
        return Ok(ctx.builder.const_double(value)?);
    }

    // `0x2A` is hex, `052` is octal, anything else is decimal
    let (digits, radix) = if is_hex {
        (text.get(2..).unwrap_or_default(), 16)
    } else if text.len() > 1 && text.starts_with('0') {
        (text.get(1..).unwrap_or_default(), 8)
    } else {
        (text.as_str(), 10)
    };
    let value = i32::from_str_radix(digits, radix).map_err(|_| invalid())?;
    Ok(ctx.builder.const_int(value)?)
}

fn lower_binary(ctx: &mut CompilationContext<'_, '_>, node: &SyntaxNode) -> Result<Value, LowerError> {
    let left = node
        .child_by_field("left")
        .ok_or_else(|| LowerError::missing(node, "left"))?;
    let right = node
        .child_by_field("right")
        .ok_or_else(|| LowerError::missing(node, "right"))?;
    let operator = node
        .child_by_field("operator")
        .ok_or_else(|| LowerError::missing(node, "operator"))?;

    let lhs = lower_expr(ctx, left)?;
    let rhs = lower_expr(ctx, right)?;

    match ctx.text(operator).to_string().as_str() {
        "+" => Ok(ctx.builder.build_add(lhs, rhs)?),
        "-" => Ok(ctx.builder.build_sub(lhs, rhs)?),
        other => Err(LowerError::UnrecognizedOperator {
            operator: other.to_string(),
        }),
    }
}

fn lower_call(ctx: &mut CompilationContext<'_, '_>, node: &SyntaxNode) -> Result<Value, LowerError> {
    let callee = node
        .child_by_field("function")
        .ok_or_else(|| LowerError::missing(node, "function"))?;
    if callee.kind != SyntaxKind::Identifier {
        return Err(LowerError::UnsupportedExpression {
            kind: callee.kind.to_string(),
        });
    }

    let name = ctx.text(callee);
    let function = ctx
        .functions
        .get(name)
        .cloned()
        .ok_or_else(|| LowerError::UndeclaredFunction {
            name: name.to_string(),
        })?;

    let mut args = Vec::new();
    if let Some(list) = node.child_by_field("arguments") {
        for arg in list.named_children() {
            if arg.kind != SyntaxKind::Comment {
                args.push(lower_expr(ctx, arg)?);
            }
        }
    }

    Ok(ctx.builder.build_call(&function, &args)?)
}
