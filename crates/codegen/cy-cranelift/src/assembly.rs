//! Linked, executable output of a JIT session

use crate::JitError;
use cranelift_jit::JITModule;
use cy_ir::{Signature, Type};
use rustc_hash::FxHashMap;
use std::fmt;

pub(crate) struct CompiledSymbol {
    pub(crate) code: *const u8,
    pub(crate) signature: Signature,
}

/// Result of invoking an entry point
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReturnValue {
    /// `int` result
    Int(i32),
    /// `double` result
    Double(f64),
    /// No result
    Void,
}

impl fmt::Display for ReturnValue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(formatter, "{value}"),
            Self::Double(value) => write!(formatter, "{value}"),
            Self::Void => write!(formatter, "void"),
        }
    }
}

/// Executable code for every linked symbol
///
/// The JIT module owning the machine code lives exactly as long as the
/// assembly, so entry points borrowed from it cannot outlive their code.
pub struct Assembly {
    _module: JITModule,
    symbols: FxHashMap<String, CompiledSymbol>,
    entry_symbol: String,
}

impl Assembly {
    pub(crate) fn new(
        module: JITModule,
        symbols: FxHashMap<String, CompiledSymbol>,
        entry_symbol: String,
    ) -> Self {
        Self {
            _module: module,
            symbols,
            entry_symbol,
        }
    }

    /// Looks up a symbol
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<EntryPoint<'_>> {
        self.symbols
            .get_key_value(name)
            .map(|(name, symbol)| EntryPoint {
                name,
                code: symbol.code,
                signature: &symbol.signature,
            })
    }

    /// Looks up a symbol, failing if it is absent
    ///
    /// # Errors
    ///
    /// Returns [`JitError::MissingEntryPoint`] if no such symbol was linked.
    pub fn get(&self, name: &str) -> Result<EntryPoint<'_>, JitError> {
        self.lookup(name).ok_or_else(|| JitError::MissingEntryPoint {
            symbol: name.to_string(),
        })
    }

    /// The designated entry symbol
    ///
    /// # Errors
    ///
    /// Returns [`JitError::MissingEntryPoint`] if no entry trampoline was linked.
    pub fn entry(&self) -> Result<EntryPoint<'_>, JitError> {
        self.get(&self.entry_symbol)
    }

    /// Name of the designated entry symbol
    #[must_use]
    pub fn entry_symbol(&self) -> &str {
        &self.entry_symbol
    }

    /// Every exported symbol, sorted by name
    #[must_use]
    pub fn symbols(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.symbols.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Assembly {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Assembly")
            .field("symbols", &self.symbols())
            .field("entry_symbol", &self.entry_symbol)
            .finish_non_exhaustive()
    }
}

/// A callable symbol borrowed from an [`Assembly`]
#[derive(Clone, Copy)]
pub struct EntryPoint<'asm> {
    name: &'asm str,
    code: *const u8,
    signature: &'asm Signature,
}

impl EntryPoint<'_> {
    /// Symbol name
    #[must_use]
    pub fn name(&self) -> &str {
        self.name
    }

    /// Signature the symbol was compiled with
    #[must_use]
    pub fn signature(&self) -> &Signature {
        self.signature
    }

    /// Invokes a nullary function
    ///
    /// # Errors
    ///
    /// Returns [`JitError::UnsupportedSignature`] if the function takes parameters.
    #[allow(unsafe_code, reason = "calls JIT-compiled machine code")]
    pub fn call(&self) -> Result<ReturnValue, JitError> {
        if !self.signature.params.is_empty() {
            return Err(JitError::UnsupportedSignature {
                symbol: self.name.to_string(),
                signature: self.signature.clone(),
            });
        }

        // SAFETY: `code` was finalized by the JIT module owned by the assembly
        // this entry point borrows from, and was compiled with the platform C
        // calling convention for exactly the nullary signature matched below.
        let value = match self.signature.ret {
            Type::Int => {
                let func: extern "C" fn() -> i32 = unsafe { std::mem::transmute(self.code) };
                ReturnValue::Int(func())
            }
            Type::Double => {
                let func: extern "C" fn() -> f64 = unsafe { std::mem::transmute(self.code) };
                ReturnValue::Double(func())
            }
            Type::Void => {
                let func: extern "C" fn() = unsafe { std::mem::transmute(self.code) };
                func();
                ReturnValue::Void
            }
        };
        Ok(value)
    }
}

impl fmt::Debug for EntryPoint<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("EntryPoint")
            .field("name", &self.name)
            .field("signature", self.signature)
            .finish()
    }
}
