//! Cranelift JIT backend
//!
//! Collects IR modules into a [`JitSession`] and compiles them all at once
//! into an executable [`Assembly`].

mod assembly;
mod error;
mod link;

pub use assembly::{Assembly, EntryPoint, ReturnValue};
pub use error::JitError;

use cy_ir::{Module, ModuleId};
use log::debug;

/// Symbol under which the designated entry function is exported
pub const DEFAULT_ENTRY_SYMBOL: &str = "__entry";

/// Controls how inserted modules are linked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOptions {
    /// Source-level function aliased to the entry symbol, if any
    pub entry_function: Option<String>,
    /// Name of the exported entry trampoline
    pub entry_symbol: String,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            entry_function: Some("main".to_string()),
            entry_symbol: DEFAULT_ENTRY_SYMBOL.to_string(),
        }
    }
}

/// A JIT compilation session: a set of IR modules awaiting compile-and-link
#[derive(Debug, Default)]
pub struct JitSession {
    modules: Vec<Module>,
    next_module: u32,
}

impl JitSession {
    /// Creates an empty session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a named module with a session-unique identity
    pub fn create_module(&mut self, name: impl Into<String>) -> Module {
        let id = ModuleId(self.next_module);
        self.next_module += 1;
        let module = Module::new(id, name);
        debug!("created {id} `{}`", module.name());
        module
    }

    /// Hands a finished module to the session
    pub fn insert_module(&mut self, module: Module) {
        debug!(
            "inserted {} `{}` with {} function(s)",
            module.id(),
            module.name(),
            module.functions().len()
        );
        self.modules.push(module);
    }

    /// Modules inserted so far, in insertion order
    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Compiles and links every inserted module into one assembly
    ///
    /// # Errors
    ///
    /// Fails on duplicate or undefined symbols, signature drift between a
    /// call site and its callee, Cranelift verification errors, or host
    /// setup failures.
    pub fn compile_and_link(self, options: &LinkOptions) -> Result<Assembly, JitError> {
        debug!("linking {} module(s)", self.modules.len());
        link::link(&self.modules, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cy_ir::Type;

    fn constant_module(session: &mut JitSession, name: &str, value: i32) -> Module {
        let mut module = session.create_module(format!("{name}.c"));
        let mut builder = module.builder();
        builder.create_function(name, Type::Int, &[]).unwrap();
        let constant = builder.const_int(value).unwrap();
        builder.build_return(Some(constant)).unwrap();
        module
    }

    #[test]
    fn module_ids_are_unique() {
        let mut session = JitSession::new();
        let first = session.create_module("a.c");
        let second = session.create_module("b.c");
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn entry_symbol_aliases_main() {
        let mut session = JitSession::new();
        let module = constant_module(&mut session, "main", 42);
        session.insert_module(module);

        let assembly = session.compile_and_link(&LinkOptions::default()).unwrap();
        let entry = assembly.entry().unwrap();
        assert_eq!(entry.call().unwrap(), ReturnValue::Int(42));
        assert_eq!(assembly.symbols(), vec!["__entry", "main"]);
    }

    #[test]
    fn missing_entry_function_leaves_no_entry_symbol() {
        let mut session = JitSession::new();
        let module = constant_module(&mut session, "helper", 1);
        session.insert_module(module);

        let assembly = session.compile_and_link(&LinkOptions::default()).unwrap();
        assert!(matches!(
            assembly.entry(),
            Err(JitError::MissingEntryPoint { .. })
        ));
        assert_eq!(
            assembly.get("helper").and_then(|entry| entry.call()).unwrap(),
            ReturnValue::Int(1)
        );
    }

    #[test]
    fn duplicate_symbols_across_modules_fail_to_link() {
        let mut session = JitSession::new();
        let first = constant_module(&mut session, "twice", 1);
        let second = constant_module(&mut session, "twice", 2);
        session.insert_module(first);
        session.insert_module(second);

        assert!(matches!(
            session.compile_and_link(&LinkOptions::default()),
            Err(JitError::DuplicateSymbol { .. })
        ));
    }

    #[test]
    fn cross_module_calls_resolve_by_name() {
        let mut session = JitSession::new();
        let mut callee_module = session.create_module("g.c");
        let callee = {
            let mut builder = callee_module.builder();
            let callee = builder.create_function("g", Type::Int, &[Type::Int]).unwrap();
            let ten = builder.const_int(10).unwrap();
            let sum = builder.build_add(callee.params()[0], ten).unwrap();
            builder.build_return(Some(sum)).unwrap();
            callee
        };

        let mut caller_module = session.create_module("main.c");
        {
            let mut builder = caller_module.builder();
            builder.create_function("main", Type::Int, &[]).unwrap();
            let five = builder.const_int(5).unwrap();
            let result = builder.build_call(&callee, &[five]).unwrap();
            builder.build_return(Some(result)).unwrap();
        }

        session.insert_module(callee_module);
        session.insert_module(caller_module);
        let assembly = session.compile_and_link(&LinkOptions::default()).unwrap();
        assert_eq!(assembly.entry().unwrap().call().unwrap(), ReturnValue::Int(15));
    }

    #[test]
    fn unterminated_functions_return_zero() {
        let mut session = JitSession::new();
        let mut module = session.create_module("main.c");
        module
            .builder()
            .create_function("main", Type::Double, &[])
            .unwrap();
        session.insert_module(module);

        let assembly = session.compile_and_link(&LinkOptions::default()).unwrap();
        assert_eq!(assembly.entry().unwrap().call().unwrap(), ReturnValue::Double(0.0));
    }
}
