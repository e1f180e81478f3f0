//! Textual rendering of IR modules

use crate::{Function, Inst, Module, Type, Value};
use std::fmt::{self, Write};

/// Renders a module as text
#[must_use]
pub fn print_module(module: &Module) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_module(&mut out, module);
    out
}

/// Writes a module to any formatter sink
///
/// # Errors
///
/// Propagates errors from the underlying writer.
pub fn write_module(out: &mut impl Write, module: &Module) -> fmt::Result {
    writeln!(out, "; module {}", module.name())?;
    for function in module.functions() {
        writeln!(out)?;
        write_function(out, function)?;
    }
    Ok(())
}

fn write_function(out: &mut impl Write, function: &Function) -> fmt::Result {
    let params: Vec<String> = function
        .params
        .iter()
        .zip(&function.signature.params)
        .map(|(value, ty)| format!("{ty} {}", name(*value)))
        .collect();
    writeln!(
        out,
        "define {} @{}({}) {{",
        function.signature.ret,
        function.name,
        params.join(", ")
    )?;

    for inst in &function.insts {
        match inst {
            Inst::IConst { dest, value } => writeln!(out, "  {} = iconst {value}", name(*dest))?,
            Inst::FConst { dest, value } => writeln!(out, "  {} = fconst {value:?}", name(*dest))?,
            Inst::Add { dest, lhs, rhs } => writeln!(
                out,
                "  {} = add {}, {}",
                name(*dest),
                name(*lhs),
                name(*rhs)
            )?,
            Inst::Sub { dest, lhs, rhs } => writeln!(
                out,
                "  {} = sub {}, {}",
                name(*dest),
                name(*lhs),
                name(*rhs)
            )?,
            Inst::Call {
                dest,
                callee,
                signature,
                args,
            } => {
                let args: Vec<String> = args.iter().map(|arg| name(*arg)).collect();
                if signature.ret == Type::Void {
                    writeln!(out, "  call void @{callee}({})", args.join(", "))?;
                } else {
                    writeln!(
                        out,
                        "  {} = call {} @{callee}({})",
                        name(*dest),
                        signature.ret,
                        args.join(", ")
                    )?;
                }
            }
            Inst::Return(Some(value)) => writeln!(out, "  ret {}", name(*value))?,
            Inst::Return(None) => writeln!(out, "  ret void")?,
        }
    }
    writeln!(out, "}}")
}

fn name(value: Value) -> String {
    format!("%{}", value.number())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModuleId;
    use expect_test::expect;

    #[test]
    fn prints_functions_in_order() {
        let mut module = Module::new(ModuleId(0), "demo.c");
        let mut builder = module.builder();

        let helper = builder
            .create_function("helper", Type::Int, &[Type::Int])
            .unwrap();
        let param = helper.params()[0];
        let one = builder.const_int(1).unwrap();
        let sum = builder.build_add(param, one).unwrap();
        builder.build_return(Some(sum)).unwrap();

        builder.create_function("main", Type::Int, &[]).unwrap();
        let two = builder.const_int(2).unwrap();
        let call = builder.build_call(&helper, &[two]).unwrap();
        let scale = builder.const_int(3).unwrap();
        let diff = builder.build_sub(call, scale).unwrap();
        builder.build_return(Some(diff)).unwrap();

        builder.create_function("log", Type::Void, &[Type::Double]).unwrap();
        builder.build_return(None).unwrap();

        expect![[r#"
            ; module demo.c

            define int @helper(int %0) {
              %1 = iconst 1
              %2 = add %0, %1
              ret %2
            }

            define int @main() {
              %0 = iconst 2
              %1 = call int @helper(%0)
              %2 = iconst 3
              %3 = sub %1, %2
              ret %3
            }

            define void @log(double %0) {
              ret void
            }
        "#]]
        .assert_eq(&print_module(&module));
    }
}
