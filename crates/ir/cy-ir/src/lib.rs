//! Typed intermediate representation handed to the JIT backend
//!
//! A [`Module`] owns its functions, and every function owns its value table
//! and a flat instruction list. Handles ([`Value`], [`FunctionRef`]) are
//! indices tagged with the function they belong to, so a value leaking into
//! another function is rejected by the [`ModuleBuilder`] instead of producing
//! a dangling reference.

pub mod builder;
mod error;
pub mod printer;

pub use builder::ModuleBuilder;
pub use error::IrError;

use derive_more::Display;
use la_arena::{Arena, Idx};

/// Identifies a module within one JIT session
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("module#{_0}")]
pub struct ModuleId(pub u32);

/// Primitive IR types
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
pub enum Type {
    /// 32-bit signed integer
    #[display("int")]
    Int,
    /// 64-bit IEEE float
    #[display("double")]
    Double,
    /// No value
    #[display("void")]
    Void,
}

/// Function signature
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Parameter types in order
    pub params: Vec<Type>,
    /// Return type
    pub ret: Type,
}

impl std::fmt::Display for Signature {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params: Vec<String> = self.params.iter().map(Type::to_string).collect();
        write!(formatter, "({}) -> {}", params.join(", "), self.ret)
    }
}

/// Identifies one function definition across all modules of a session
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FuncKey {
    /// Owning module
    pub module: ModuleId,
    /// Position within the module
    pub index: u32,
}

/// Handle to a value produced inside one function
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Value {
    func: FuncKey,
    index: Idx<ValueData>,
}

impl Value {
    /// The function this value belongs to
    #[must_use]
    pub fn func(self) -> FuncKey {
        self.func
    }

    /// Raw value number within its function
    #[must_use]
    pub fn number(self) -> u32 {
        u32::from(self.index.into_raw())
    }
}

/// Type and origin of a value
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueData {
    /// Value type
    pub ty: Type,
    /// Where the value comes from
    pub def: ValueDef,
}

/// Origin of a value
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueDef {
    /// The n-th function parameter
    Param(usize),
    /// Result of the n-th instruction
    Inst(usize),
}

/// IR instruction
#[derive(Clone, Debug, PartialEq)]
pub enum Inst {
    /// Integer constant
    IConst {
        /// Result value
        dest: Value,
        /// Constant
        value: i32,
    },
    /// Floating-point constant
    FConst {
        /// Result value
        dest: Value,
        /// Constant
        value: f64,
    },
    /// `lhs + rhs`
    Add {
        /// Result value
        dest: Value,
        /// Left operand
        lhs: Value,
        /// Right operand
        rhs: Value,
    },
    /// `lhs - rhs`
    Sub {
        /// Result value
        dest: Value,
        /// Left operand
        lhs: Value,
        /// Right operand
        rhs: Value,
    },
    /// Direct call, resolved by symbol name at link time
    Call {
        /// Result value (of type `void` for void callees)
        dest: Value,
        /// Callee symbol
        callee: String,
        /// Callee signature as seen by the caller
        signature: Signature,
        /// Arguments in evaluation order
        args: Vec<Value>,
    },
    /// Return from the function
    Return(Option<Value>),
}

/// Function definition
#[derive(Clone, Debug)]
pub struct Function {
    /// Symbol name
    pub name: String,
    /// Signature
    pub signature: Signature,
    /// Identity within the session
    pub key: FuncKey,
    /// Parameter values, in order
    pub params: Vec<Value>,
    /// Value table
    pub values: Arena<ValueData>,
    /// Instructions in emission order
    pub insts: Vec<Inst>,
}

impl Function {
    /// Type and origin of a value owned by this function
    #[must_use]
    pub fn value(&self, value: Value) -> Option<&ValueData> {
        (value.func == self.key).then(|| &self.values[value.index])
    }

    /// Whether a return instruction has been emitted
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.insts.iter().any(|inst| matches!(inst, Inst::Return(_)))
    }

    /// Instructions up to and including the first return
    pub fn reachable_insts(&self) -> impl Iterator<Item = &Inst> {
        let end = self
            .insts
            .iter()
            .position(|inst| matches!(inst, Inst::Return(_)))
            .map_or(self.insts.len(), |pos| pos + 1);
        self.insts[..end].iter()
    }
}

/// A handle to a declared function, usable from any module of the session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionRef {
    key: FuncKey,
    name: String,
    signature: Signature,
    params: Vec<Value>,
}

impl FunctionRef {
    /// Symbol name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signature
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Parameter value handles, valid inside this function's body only
    #[must_use]
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Definition identity
    #[must_use]
    pub fn key(&self) -> FuncKey {
        self.key
    }
}

/// A named IR module: the lowered form of one source unit
#[derive(Clone, Debug)]
pub struct Module {
    id: ModuleId,
    name: String,
    functions: Vec<Function>,
}

impl Module {
    /// Creates an empty module
    #[must_use]
    pub fn new(id: ModuleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            functions: Vec::new(),
        }
    }

    /// Module identity
    #[must_use]
    pub fn id(&self) -> ModuleId {
        self.id
    }

    /// Module name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Functions in definition order
    #[must_use]
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Looks up a function by symbol name
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|function| function.name == name)
    }

    /// Creates a builder that appends to this module
    pub fn builder(&mut self) -> ModuleBuilder<'_> {
        ModuleBuilder::new(self)
    }
}
