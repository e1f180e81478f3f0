//! Translation-unit lowering

use crate::LowerOptions;
use crate::context::CompilationContext;
use crate::error::LowerError;
use crate::function::lower_function;
use crate::symbols::FunctionTable;
use cy_ir::{FunctionRef, ModuleBuilder};
use cy_syntax::{SyntaxKind, SyntaxNode};
use log::{debug, trace};

/// Lowers every top-level function definition of one source unit into `builder`'s module
///
/// Definitions are lowered in source order and registered in `functions`,
/// which the caller keeps across units so later units can call earlier
/// ones. Other top-level declarations are ignored. The first error aborts
/// the unit.
///
/// # Errors
///
/// Returns the first [`LowerError`] raised by any function definition.
pub fn lower_translation_unit(
    source: &str,
    root: &SyntaxNode,
    builder: ModuleBuilder<'_>,
    functions: &mut FunctionTable,
    options: &LowerOptions,
) -> Result<Vec<FunctionRef>, LowerError> {
    let module = builder.module_id();
    debug!("lowering translation unit into {module} ({} bytes)", source.len());

    let mut ctx = CompilationContext::new(source, builder, functions, options);
    let lowered = ctx.with_scope(|ctx| {
        let mut lowered = Vec::new();
        for item in root.named_children() {
            match item.kind {
                SyntaxKind::FunctionDefinition => lowered.push(lower_function(ctx, item)?),
                _ => trace!("ignoring top-level `{}`", item.kind),
            }
        }
        Ok::<_, LowerError>(lowered)
    })?;

    debug!("{module}: lowered {} function(s)", lowered.len());
    Ok(lowered)
}
