//! Translation of IR functions into Cranelift and final linking

use crate::assembly::{Assembly, CompiledSymbol};
use crate::{JitError, LinkOptions};
use cranelift::codegen::Context;
use cranelift::codegen::ir::FuncRef;
use cranelift::prelude::{
    types, AbiParam, FunctionBuilder, FunctionBuilderContext, InstBuilder, Value as ClifValue,
};
use cranelift_jit::{JITBuilder, JITModule};
use cranelift_module::{default_libcall_names, FuncId, Linkage, Module as _};
use cy_ir::{Function, Inst, Module, Signature, Type, Value};
use log::{debug, trace, warn};
use rustc_hash::FxHashMap;

/// A declared symbol: its Cranelift id and IR signature
struct Declared {
    id: FuncId,
    signature: Signature,
}

/// Links a set of modules into an assembly
pub(crate) fn link(modules: &[Module], options: &LinkOptions) -> Result<Assembly, JitError> {
    let builder = JITBuilder::new(default_libcall_names())?;
    let mut linker = Linker {
        module: JITModule::new(builder),
        ctx: Context::new(),
        builder_context: FunctionBuilderContext::new(),
        declared: FxHashMap::default(),
    };

    // Declare everything first so calls may point forward or across modules
    for function in modules.iter().flat_map(Module::functions) {
        linker.declare(&function.name, &function.signature)?;
    }
    for function in modules.iter().flat_map(Module::functions) {
        linker.define(function)?;
    }

    let entry = linker.define_entry(options)?;

    linker.module.finalize_definitions()?;

    let mut symbols = FxHashMap::default();
    for (name, declared) in &linker.declared {
        let code = linker.module.get_finalized_function(declared.id);
        symbols.insert(
            name.clone(),
            CompiledSymbol {
                code,
                signature: declared.signature.clone(),
            },
        );
    }
    debug!(
        "linked {} symbol(s); entry symbol {}",
        symbols.len(),
        if entry { "defined" } else { "absent" }
    );

    Ok(Assembly::new(
        linker.module,
        symbols,
        options.entry_symbol.clone(),
    ))
}

struct Linker {
    module: JITModule,
    ctx: Context,
    builder_context: FunctionBuilderContext,
    declared: FxHashMap<String, Declared>,
}

impl Linker {
    fn clif_signature(&self, signature: &Signature) -> cranelift::prelude::Signature {
        let mut sig = self.module.make_signature();
        for param in &signature.params {
            if let Some(ty) = clif_type(*param) {
                sig.params.push(AbiParam::new(ty));
            }
        }
        if let Some(ty) = clif_type(signature.ret) {
            sig.returns.push(AbiParam::new(ty));
        }
        sig
    }

    fn declare(&mut self, name: &str, signature: &Signature) -> Result<FuncId, JitError> {
        if self.declared.contains_key(name) {
            return Err(JitError::DuplicateSymbol {
                name: name.to_string(),
            });
        }

        let sig = self.clif_signature(signature);
        let id = self.module.declare_function(name, Linkage::Export, &sig)?;
        trace!("declared `{name}` {signature}");
        self.declared.insert(
            name.to_string(),
            Declared {
                id,
                signature: signature.clone(),
            },
        );
        Ok(id)
    }

    fn define(&mut self, function: &Function) -> Result<(), JitError> {
        let id = self
            .declared
            .get(&function.name)
            .map(|declared| declared.id)
            .ok_or_else(|| JitError::UndefinedSymbol {
                name: function.name.clone(),
                caller: function.name.clone(),
            })?;

        self.ctx.func.clear();
        self.ctx.func.signature = self.clif_signature(&function.signature);

        {
            let mut builder = FunctionBuilder::new(&mut self.ctx.func, &mut self.builder_context);
            let entry = builder.create_block();
            builder.append_block_params_for_function_params(entry);
            builder.switch_to_block(entry);
            builder.seal_block(entry);

            let mut values: FxHashMap<Value, ClifValue> = function
                .params
                .iter()
                .copied()
                .zip(builder.block_params(entry).iter().copied())
                .collect();
            let mut func_refs: FxHashMap<&str, FuncRef> = FxHashMap::default();

            for inst in function.reachable_insts() {
                translate_inst(
                    inst,
                    function,
                    &mut builder,
                    &mut values,
                    &mut func_refs,
                    &mut self.module,
                    &self.declared,
                )?;
            }

            if !function.is_terminated() {
                // Falling off the end returns the zero value of the return type
                match function.signature.ret {
                    Type::Int => {
                        let zero = builder.ins().iconst(types::I32, 0);
                        builder.ins().return_(&[zero]);
                    }
                    Type::Double => {
                        let zero = builder.ins().f64const(0.0);
                        builder.ins().return_(&[zero]);
                    }
                    Type::Void => {
                        builder.ins().return_(&[]);
                    }
                }
            }

            builder.finalize();
        }

        self.finish_definition(id, &function.name)
    }

    /// Emits the entry trampoline; returns whether one was defined
    fn define_entry(&mut self, options: &LinkOptions) -> Result<bool, JitError> {
        let Some(target_name) = options.entry_function.as_deref() else {
            return Ok(false);
        };
        if target_name == options.entry_symbol {
            return Ok(self.declared.contains_key(target_name));
        }
        let Some(target) = self.declared.get(target_name) else {
            return Ok(false);
        };
        if !target.signature.params.is_empty() {
            warn!(
                "`{target_name}` takes parameters and cannot back `{}`",
                options.entry_symbol
            );
            return Ok(false);
        }

        let target_id = target.id;
        let signature = target.signature.clone();
        let entry_id = self.declare(&options.entry_symbol, &signature)?;

        self.ctx.func.clear();
        self.ctx.func.signature = self.clif_signature(&signature);
        {
            let mut builder = FunctionBuilder::new(&mut self.ctx.func, &mut self.builder_context);
            let block = builder.create_block();
            builder.switch_to_block(block);
            builder.seal_block(block);

            let callee = self.module.declare_func_in_func(target_id, builder.func);
            let call = builder.ins().call(callee, &[]);
            let results = builder.inst_results(call).to_vec();
            builder.ins().return_(&results);
            builder.finalize();
        }

        self.finish_definition(entry_id, &options.entry_symbol)?;
        Ok(true)
    }

    fn finish_definition(&mut self, id: FuncId, name: &str) -> Result<(), JitError> {
        if let Err(errors) = cranelift_codegen::verify_function(&self.ctx.func, self.module.isa())
        {
            return Err(JitError::Verification {
                function: name.to_string(),
                message: errors.to_string(),
            });
        }

        self.module.define_function(id, &mut self.ctx)?;
        self.module.clear_context(&mut self.ctx);
        trace!("defined `{name}`");
        Ok(())
    }
}

fn clif_type(ty: Type) -> Option<types::Type> {
    match ty {
        Type::Int => Some(types::I32),
        Type::Double => Some(types::F64),
        Type::Void => None,
    }
}

fn lookup(
    values: &FxHashMap<Value, ClifValue>,
    function: &Function,
    value: Value,
) -> Result<ClifValue, JitError> {
    values
        .get(&value)
        .copied()
        .ok_or_else(|| JitError::UnknownValue {
            function: function.name.clone(),
            value: value.number(),
        })
}

fn value_type(function: &Function, value: Value) -> Result<Type, JitError> {
    function
        .value(value)
        .map(|data| data.ty)
        .ok_or_else(|| JitError::UnknownValue {
            function: function.name.clone(),
            value: value.number(),
        })
}

#[allow(clippy::too_many_arguments, reason = "split borrows of the linker state")]
fn translate_inst<'func>(
    inst: &'func Inst,
    function: &Function,
    builder: &mut FunctionBuilder<'_>,
    values: &mut FxHashMap<Value, ClifValue>,
    func_refs: &mut FxHashMap<&'func str, FuncRef>,
    module: &mut JITModule,
    declared: &FxHashMap<String, Declared>,
) -> Result<(), JitError> {
    match inst {
        Inst::IConst { dest, value } => {
            let result = builder.ins().iconst(types::I32, i64::from(*value));
            values.insert(*dest, result);
        }
        Inst::FConst { dest, value } => {
            let result = builder.ins().f64const(*value);
            values.insert(*dest, result);
        }
        Inst::Add { dest, lhs, rhs } | Inst::Sub { dest, lhs, rhs } => {
            let lhs_val = lookup(values, function, *lhs)?;
            let rhs_val = lookup(values, function, *rhs)?;
            let is_add = matches!(inst, Inst::Add { .. });
            let result = match (value_type(function, *dest)?, is_add) {
                (Type::Double, true) => builder.ins().fadd(lhs_val, rhs_val),
                (Type::Double, false) => builder.ins().fsub(lhs_val, rhs_val),
                (_, true) => builder.ins().iadd(lhs_val, rhs_val),
                (_, false) => builder.ins().isub(lhs_val, rhs_val),
            };
            values.insert(*dest, result);
        }
        Inst::Call {
            dest,
            callee,
            signature,
            args,
        } => {
            let target = declared
                .get(callee)
                .ok_or_else(|| JitError::UndefinedSymbol {
                    name: callee.clone(),
                    caller: function.name.clone(),
                })?;
            if target.signature != *signature {
                return Err(JitError::SignatureMismatch {
                    name: callee.clone(),
                    expected: target.signature.clone(),
                    found: signature.clone(),
                });
            }

            let func_ref = *func_refs
                .entry(callee.as_str())
                .or_insert_with(|| module.declare_func_in_func(target.id, builder.func));
            let arg_values = args
                .iter()
                .map(|arg| lookup(values, function, *arg))
                .collect::<Result<Vec<_>, _>>()?;

            let call = builder.ins().call(func_ref, &arg_values);
            if let Some(&result) = builder.inst_results(call).first() {
                values.insert(*dest, result);
            }
        }
        Inst::Return(value) => match value {
            Some(value) => {
                let result = lookup(values, function, *value)?;
                builder.ins().return_(&[result]);
            }
            None => {
                builder.ins().return_(&[]);
            }
        },
    }
    Ok(())
}
