//! Instruction builder bound to one module

use crate::{
    FuncKey, Function, FunctionRef, Inst, IrError, Module, ModuleId, Signature, Type, Value,
    ValueData, ValueDef,
};
use la_arena::Arena;
use log::trace;

/// Builds functions into a [`Module`]
///
/// Instructions are appended to the function most recently created with
/// [`ModuleBuilder::create_function`]. Every emitting method validates operand
/// types and ownership; nothing is coerced.
pub struct ModuleBuilder<'module> {
    module: &'module mut Module,
    current: Option<usize>,
}

#[derive(Copy, Clone)]
enum ArithOp {
    Add,
    Sub,
}

impl ArithOp {
    fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
        }
    }
}

impl<'module> ModuleBuilder<'module> {
    pub(crate) fn new(module: &'module mut Module) -> Self {
        Self {
            module,
            current: None,
        }
    }

    /// Identity of the module being built
    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        self.module.id
    }

    /// The `int` type
    #[must_use]
    pub fn int_type(&self) -> Type {
        Type::Int
    }

    /// The `double` type
    #[must_use]
    pub fn double_type(&self) -> Type {
        Type::Double
    }

    /// The `void` type
    #[must_use]
    pub fn void_type(&self) -> Type {
        Type::Void
    }

    /// Declares a function and makes it the insertion target
    ///
    /// A function with the same name already in this module is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`IrError::VoidParameter`] if a parameter has type `void`.
    pub fn create_function(
        &mut self,
        name: &str,
        ret: Type,
        params: &[Type],
    ) -> Result<FunctionRef, IrError> {
        if let Some(index) = params.iter().position(|ty| *ty == Type::Void) {
            return Err(IrError::VoidParameter {
                function: name.to_string(),
                index,
            });
        }

        let slot = self
            .module
            .functions
            .iter()
            .position(|function| function.name == name)
            .unwrap_or(self.module.functions.len());
        let key = FuncKey {
            module: self.module.id,
            index: slot as u32,
        };

        let mut values = Arena::new();
        let param_values: Vec<Value> = params
            .iter()
            .enumerate()
            .map(|(position, ty)| Value {
                func: key,
                index: values.alloc(ValueData {
                    ty: *ty,
                    def: ValueDef::Param(position),
                }),
            })
            .collect();

        let signature = Signature {
            params: params.to_vec(),
            ret,
        };
        let function = Function {
            name: name.to_string(),
            signature: signature.clone(),
            key,
            params: param_values.clone(),
            values,
            insts: Vec::new(),
        };

        if slot == self.module.functions.len() {
            self.module.functions.push(function);
        } else {
            self.module.functions[slot] = function;
        }
        self.current = Some(slot);
        trace!("{}: created `{name}` {signature}", self.module.name);

        Ok(FunctionRef {
            key,
            name: name.to_string(),
            signature,
            params: param_values,
        })
    }

    /// The function currently receiving instructions
    #[must_use]
    pub fn current_function(&self) -> Option<&Function> {
        self.current.map(|slot| &self.module.functions[slot])
    }

    fn current_mut(&mut self) -> Result<&mut Function, IrError> {
        let slot = self.current.ok_or(IrError::NoActiveFunction)?;
        Ok(&mut self.module.functions[slot])
    }

    /// Type of a value owned by the current function
    ///
    /// # Errors
    ///
    /// Fails if no function is active or the value belongs elsewhere.
    pub fn value_type(&self, value: Value) -> Result<Type, IrError> {
        let function = self.current_function().ok_or(IrError::NoActiveFunction)?;
        owned_type(function, value)
    }

    /// Creates an `int` constant
    ///
    /// # Errors
    ///
    /// Fails if no function is active.
    pub fn const_int(&mut self, value: i32) -> Result<Value, IrError> {
        let function = self.current_mut()?;
        Ok(emit(function, Type::Int, |dest| Inst::IConst { dest, value }))
    }

    /// Creates a `double` constant
    ///
    /// # Errors
    ///
    /// Fails if no function is active.
    pub fn const_double(&mut self, value: f64) -> Result<Value, IrError> {
        let function = self.current_mut()?;
        Ok(emit(function, Type::Double, |dest| Inst::FConst { dest, value }))
    }

    /// Emits `lhs + rhs`
    ///
    /// # Errors
    ///
    /// Fails on foreign, `void` or mismatched operands.
    pub fn build_add(&mut self, lhs: Value, rhs: Value) -> Result<Value, IrError> {
        self.build_arith(ArithOp::Add, lhs, rhs)
    }

    /// Emits `lhs - rhs`
    ///
    /// # Errors
    ///
    /// Fails on foreign, `void` or mismatched operands.
    pub fn build_sub(&mut self, lhs: Value, rhs: Value) -> Result<Value, IrError> {
        self.build_arith(ArithOp::Sub, lhs, rhs)
    }

    fn build_arith(&mut self, op: ArithOp, lhs: Value, rhs: Value) -> Result<Value, IrError> {
        let function = self.current_mut()?;
        let lhs_ty = owned_type(function, lhs)?;
        let rhs_ty = owned_type(function, rhs)?;

        if lhs_ty == Type::Void || rhs_ty == Type::Void {
            return Err(IrError::VoidOperand { op: op.mnemonic() });
        }
        if lhs_ty != rhs_ty {
            return Err(IrError::TypeMismatch {
                op: op.mnemonic(),
                lhs: lhs_ty,
                rhs: rhs_ty,
            });
        }

        Ok(emit(function, lhs_ty, |dest| match op {
            ArithOp::Add => Inst::Add { dest, lhs, rhs },
            ArithOp::Sub => Inst::Sub { dest, lhs, rhs },
        }))
    }

    /// Emits a direct call; the result has the callee's return type
    ///
    /// # Errors
    ///
    /// Fails on arity or argument type mismatch, or foreign arguments.
    pub fn build_call(&mut self, callee: &FunctionRef, args: &[Value]) -> Result<Value, IrError> {
        let function = self.current_mut()?;
        let signature = callee.signature();

        if args.len() != signature.params.len() {
            return Err(IrError::ArityMismatch {
                callee: callee.name().to_string(),
                expected: signature.params.len(),
                found: args.len(),
            });
        }
        for (index, (arg, expected)) in args.iter().zip(&signature.params).enumerate() {
            let found = owned_type(function, *arg)?;
            if found != *expected {
                return Err(IrError::ArgumentTypeMismatch {
                    callee: callee.name().to_string(),
                    index,
                    expected: *expected,
                    found,
                });
            }
        }

        Ok(emit(function, signature.ret, |dest| Inst::Call {
            dest,
            callee: callee.name().to_string(),
            signature: signature.clone(),
            args: args.to_vec(),
        }))
    }

    /// Emits a return, with or without a value
    ///
    /// # Errors
    ///
    /// Fails if the returned type differs from the declared return type.
    pub fn build_return(&mut self, value: Option<Value>) -> Result<(), IrError> {
        let function = self.current_mut()?;
        let expected = function.signature.ret;
        let found = match value {
            Some(value) => owned_type(function, value)?,
            None => Type::Void,
        };

        let valid = match value {
            Some(_) => found == expected && expected != Type::Void,
            None => expected == Type::Void,
        };
        if !valid {
            return Err(IrError::ReturnTypeMismatch {
                function: function.name.clone(),
                expected,
                found,
            });
        }

        trace!("{}: return {found}", function.name);
        function.insts.push(Inst::Return(value));
        Ok(())
    }
}

fn owned_type(function: &Function, value: Value) -> Result<Type, IrError> {
    function
        .value(value)
        .map(|data| data.ty)
        .ok_or_else(|| IrError::ForeignValue {
            function: function.name.clone(),
            value: value.number(),
        })
}

fn emit(function: &mut Function, ty: Type, make: impl FnOnce(Value) -> Inst) -> Value {
    let dest = Value {
        func: function.key,
        index: function.values.alloc(ValueData {
            ty,
            def: ValueDef::Inst(function.insts.len()),
        }),
    };
    function.insts.push(make(dest));
    dest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(id: u32) -> Module {
        Module::new(ModuleId(id), format!("m{id}.c"))
    }

    #[test]
    fn arithmetic_keeps_operand_type() {
        let mut module = module(0);
        let mut builder = module.builder();
        builder.create_function("f", Type::Double, &[]).unwrap();

        let lhs = builder.const_double(1.5).unwrap();
        let rhs = builder.const_double(2.0).unwrap();
        let sum = builder.build_add(lhs, rhs).unwrap();
        assert_eq!(builder.value_type(sum), Ok(Type::Double));
        builder.build_return(Some(sum)).unwrap();

        let function = module.function("f").unwrap();
        assert_eq!(function.insts.len(), 4);
        assert!(function.is_terminated());
    }

    #[test]
    fn mismatched_operands_are_rejected() {
        let mut module = module(0);
        let mut builder = module.builder();
        builder.create_function("f", Type::Int, &[]).unwrap();

        let int = builder.const_int(1).unwrap();
        let double = builder.const_double(1.0).unwrap();
        assert_eq!(
            builder.build_sub(int, double),
            Err(IrError::TypeMismatch {
                op: "sub",
                lhs: Type::Int,
                rhs: Type::Double,
            })
        );
    }

    #[test]
    fn values_cannot_cross_functions() {
        let mut module = module(0);
        let mut builder = module.builder();
        let first = builder.create_function("first", Type::Int, &[Type::Int]).unwrap();
        builder.create_function("second", Type::Int, &[]).unwrap();

        let result = builder.build_return(Some(first.params()[0]));
        assert!(matches!(result, Err(IrError::ForeignValue { .. })));
    }

    #[test]
    fn emitting_without_function_fails() {
        let mut module = module(0);
        let mut builder = module.builder();
        assert_eq!(builder.const_int(3), Err(IrError::NoActiveFunction));
    }

    #[test]
    fn calls_check_arity_and_argument_types() {
        let mut module = module(0);
        let mut builder = module.builder();
        let callee = builder
            .create_function("g", Type::Int, &[Type::Int, Type::Double])
            .unwrap();
        builder.create_function("f", Type::Int, &[]).unwrap();

        let one = builder.const_int(1).unwrap();
        assert!(matches!(
            builder.build_call(&callee, &[one]),
            Err(IrError::ArityMismatch { expected: 2, found: 1, .. })
        ));
        assert!(matches!(
            builder.build_call(&callee, &[one, one]),
            Err(IrError::ArgumentTypeMismatch { index: 1, .. })
        ));

        let half = builder.const_double(0.5).unwrap();
        let result = builder.build_call(&callee, &[one, half]).unwrap();
        assert_eq!(builder.value_type(result), Ok(Type::Int));
    }

    #[test]
    fn return_must_match_signature() {
        let mut module = module(0);
        let mut builder = module.builder();
        builder.create_function("f", Type::Int, &[]).unwrap();
        assert!(matches!(
            builder.build_return(None),
            Err(IrError::ReturnTypeMismatch { found: Type::Void, .. })
        ));

        builder.create_function("g", Type::Void, &[]).unwrap();
        let one = builder.const_int(1).unwrap();
        assert!(builder.build_return(Some(one)).is_err());
        assert!(builder.build_return(None).is_ok());
    }

    #[test]
    fn void_parameters_are_rejected() {
        let mut module = module(0);
        let mut builder = module.builder();
        assert!(matches!(
            builder.create_function("f", Type::Int, &[Type::Int, Type::Void]),
            Err(IrError::VoidParameter { index: 1, .. })
        ));
    }

    #[test]
    fn redefinition_in_same_module_replaces_body() {
        let mut module = module(0);
        let mut builder = module.builder();
        builder.create_function("f", Type::Int, &[]).unwrap();
        let one = builder.const_int(1).unwrap();
        builder.build_return(Some(one)).unwrap();

        let second = builder.create_function("f", Type::Int, &[]).unwrap();
        assert_eq!(second.key().index, 0);

        assert_eq!(module.functions().len(), 1);
        assert!(module.functions()[0].insts.is_empty());
    }

    #[test]
    fn reachable_insts_stop_after_return() {
        let mut module = module(0);
        let mut builder = module.builder();
        builder.create_function("f", Type::Int, &[]).unwrap();
        let one = builder.const_int(1).unwrap();
        builder.build_return(Some(one)).unwrap();
        let two = builder.const_int(2).unwrap();
        builder.build_return(Some(two)).unwrap();

        let function = module.function("f").unwrap();
        assert_eq!(function.reachable_insts().count(), 2);
    }
}
