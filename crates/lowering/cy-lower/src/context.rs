//! State threaded through every lowering routine

use crate::LowerOptions;
use crate::scope::ScopeStack;
use crate::symbols::FunctionTable;
use cy_ir::{ModuleBuilder, Value};
use cy_syntax::SyntaxNode;

/// Everything a lowering routine may read or mutate
///
/// The context borrows the session's function table so that functions from
/// earlier source units stay callable, while the scope stack is private to
/// one translation unit.
pub struct CompilationContext<'a, 'module> {
    /// Source text the syntax tree was parsed from
    pub source: &'a str,
    /// Visible variable bindings
    pub scope: ScopeStack<Value>,
    /// Functions defined so far in this session
    pub functions: &'a mut FunctionTable,
    /// IR builder of the module being populated
    pub builder: ModuleBuilder<'module>,
    /// Lowering policies
    pub options: &'a LowerOptions,
}

impl<'a, 'module> CompilationContext<'a, 'module> {
    /// Creates a context with an empty scope stack
    pub fn new(
        source: &'a str,
        builder: ModuleBuilder<'module>,
        functions: &'a mut FunctionTable,
        options: &'a LowerOptions,
    ) -> Self {
        Self {
            source,
            scope: ScopeStack::new(),
            functions,
            builder,
            options,
        }
    }

    /// Source text covered by `node`
    pub fn text<'s>(&'s self, node: &'s SyntaxNode) -> &'s str {
        self.source.get(node.span.range()).unwrap_or(&node.text)
    }

    /// Runs `f` inside a fresh scope frame, popping it on every exit path
    pub fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.scope.push();
        let result = f(self);
        self.scope.pop();
        result
    }
}
