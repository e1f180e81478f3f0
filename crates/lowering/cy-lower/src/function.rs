//! Function definition lowering

use crate::context::CompilationContext;
use crate::error::LowerError;
use crate::stmt::lower_block;
use crate::types::resolve_type;
use cy_ir::{FunctionRef, Type};
use cy_syntax::{SyntaxKind, SyntaxNode};
use log::debug;

/// A resolved parameter; unnamed parameters take a slot but bind nothing
struct Param {
    name: Option<String>,
    ty: Type,
}

/// Lowers a `function_definition` into a new IR function
///
/// The function is registered in the symbol table before its body is
/// lowered, so it may call itself.
///
/// # Errors
///
/// Fails on unsupported return or parameter types, unsupported declarator
/// shapes, a redefinition rejected by the policy, and any error raised while
/// lowering the body.
pub fn lower_function(ctx: &mut CompilationContext<'_, '_>, node: &SyntaxNode) -> Result<FunctionRef, LowerError> {
    ctx.with_scope(|ctx| {
        let ret = node
            .child_by_field("type")
            .ok_or_else(|| LowerError::missing(node, "type"))
            .and_then(|ty| resolve_type(ctx, ty))?;

        let declarator = node
            .child_by_field("declarator")
            .ok_or_else(|| LowerError::missing(node, "declarator"))?;
        if declarator.kind != SyntaxKind::FunctionDeclarator {
            return Err(LowerError::UnsupportedDeclarator {
                kind: declarator.kind.to_string(),
            });
        }

        let name_node = declarator
            .child_by_field("declarator")
            .ok_or_else(|| LowerError::missing(declarator, "declarator"))?;
        if name_node.kind != SyntaxKind::Identifier {
            return Err(LowerError::UnsupportedDeclarator {
                kind: name_node.kind.to_string(),
            });
        }
        let name = ctx.text(name_node).to_string();

        let params = match declarator.child_by_field("parameters") {
            Some(list) => lower_params(ctx, list)?,
            None => Vec::new(),
        };

        ctx.functions
            .check_definition(&name, ctx.options.redefinition)?;

        let types: Vec<Type> = params.iter().map(|param| param.ty).collect();
        let function = ctx.builder.create_function(&name, ret, &types)?;
        ctx.functions.insert(function.clone());

        for (param, value) in params.into_iter().zip(function.params()) {
            if let Some(param_name) = param.name {
                ctx.scope.bind(param_name, *value);
            }
        }

        let body = node
            .child_by_field("body")
            .ok_or_else(|| LowerError::missing(node, "body"))?;
        lower_block(ctx, body)?;

        debug!("lowered function `{name}` {}", function.signature());
        Ok(function)
    })
}

fn lower_params(ctx: &CompilationContext<'_, '_>, list: &SyntaxNode) -> Result<Vec<Param>, LowerError> {
    let mut params = Vec::new();
    for decl in list.named_children() {
        match &decl.kind {
            SyntaxKind::ParameterDeclaration => {}
            SyntaxKind::Comment => continue,
            other => {
                return Err(LowerError::UnsupportedDeclarator {
                    kind: other.to_string(),
                });
            }
        }

        let ty = decl
            .child_by_field("type")
            .ok_or_else(|| LowerError::missing(decl, "type"))
            .and_then(|ty| resolve_type(ctx, ty))?;
        let name = match decl.child_by_field("declarator") {
            Some(ident) if ident.kind == SyntaxKind::Identifier => Some(ctx.text(ident).to_string()),
            Some(other) => {
                return Err(LowerError::UnsupportedDeclarator {
                    kind: other.kind.to_string(),
                });
            }
            None => None,
        };
        params.push(Param { name, ty });
    }

    // `f(void)` declares no parameters
    if let [Param { name: None, ty: Type::Void }] = params.as_slice() {
        params.clear();
    }
    Ok(params)
}
