//! End-to-end tests: source text to JIT-compiled result

use cy_cranelift::JitError;
use cy_driver::{CompileError, CompilerConfig, ReturnValue};
use cy_lower::{LowerError, RedefinitionPolicy, StatementPolicy};
use integration_tests::TestProgram;

fn run(source: &str) -> ReturnValue {
    TestProgram::single(source).run().unwrap()
}

fn lower_error(program: &TestProgram) -> LowerError {
    match program.compile() {
        Err(CompileError::Lower { source, .. }) => source,
        Err(other) => panic!("expected a lowering error, got {other}"),
        Ok(_) => panic!("expected a lowering error, program compiled"),
    }
}

#[test]
fn literal_return() {
    assert_eq!(run("int main() { return 42; }"), ReturnValue::Int(42));
}

#[test]
fn entry_alias_and_direct_lookup_agree() {
    let program = TestProgram::single("int f() { return 42; } int main() { return f(); }");
    assert_eq!(program.call("f").unwrap(), ReturnValue::Int(42));
    assert_eq!(program.run().unwrap(), ReturnValue::Int(42));
}

#[test]
fn arithmetic() {
    assert_eq!(run("int main() { return 2 + 3 - 1; }"), ReturnValue::Int(4));
}

#[test]
fn subtraction_is_left_to_right() {
    assert_eq!(run("int main() { return 10 - 2 - 3; }"), ReturnValue::Int(5));
    assert_eq!(run("int main() { return 10 - (2 - 3); }"), ReturnValue::Int(11));
}

#[test]
fn double_arithmetic() {
    assert_eq!(
        run("double main() { double a = 1.5; return a + 2.25 - 0.5; }"),
        ReturnValue::Double(3.25)
    );
}

#[test]
fn declaration_binding() {
    assert_eq!(run("int main() { int x = 7; return x; }"), ReturnValue::Int(7));
    assert_eq!(
        run("int main() { int a = 1, b = a + 2; return a + b; }"),
        ReturnValue::Int(4)
    );
}

#[test]
fn nested_scope_restores_parameter() {
    let program = TestProgram::single(
        "int f(int x) { { int x = 5; } return x; }\nint main() { return f(3); }",
    );
    assert_eq!(program.run().unwrap(), ReturnValue::Int(3));
}

#[test]
fn inner_binding_is_visible_inside_its_block() {
    let program = TestProgram::single(
        "int f(int x) { { int x = 5; return x; } }\nint main() { return f(3); }",
    );
    assert_eq!(program.run().unwrap(), ReturnValue::Int(5));
}

#[test]
fn parameters_are_passed_in_order() {
    let program = TestProgram::single(
        "int sub(int a, int b) { return a - b; }\nint main() { return sub(10, 4); }",
    );
    assert_eq!(program.run().unwrap(), ReturnValue::Int(6));
}

#[test]
fn cross_function_call_in_one_unit() {
    let program = TestProgram::single("int g() { return 1; } int f() { return g() + 1; }");
    assert_eq!(program.call("f").unwrap(), ReturnValue::Int(2));
}

#[test]
fn cross_function_call_across_units() {
    let program = TestProgram::new()
        .unit("g.c", "int g() { return 1; }")
        .unit("f.c", "int f() { return g() + 1; }\nint main() { return f(); }");
    assert_eq!(program.run().unwrap(), ReturnValue::Int(2));
}

#[test]
fn void_calls_run_for_side_effects_only() {
    let program =
        TestProgram::single("void tick() { return; }\nint main() { tick(); return 9; }");
    assert_eq!(program.run().unwrap(), ReturnValue::Int(9));
    assert_eq!(program.call("tick").unwrap(), ReturnValue::Void);
}

#[test]
fn falling_off_the_end_returns_zero() {
    assert_eq!(run("int main() { int x = 3; }"), ReturnValue::Int(0));
}

#[test]
fn statements_after_return_are_ignored() {
    assert_eq!(run("int main() { return 1; return 2; }"), ReturnValue::Int(1));
}

#[test]
fn unknown_type_produces_no_assembly() {
    let program = TestProgram::single("char f() { return 0; }");
    assert_eq!(
        lower_error(&program),
        LowerError::UnknownType {
            spelling: "char".into()
        }
    );
}

#[test]
fn undeclared_identifier() {
    let program = TestProgram::single("int f() { return y; }");
    assert_eq!(
        lower_error(&program),
        LowerError::UndeclaredIdentifier { name: "y".into() }
    );
}

#[test]
fn callee_defined_in_a_later_unit_is_undeclared() {
    let program = TestProgram::new()
        .unit("f.c", "int main() { return g(); }")
        .unit("g.c", "int g() { return 1; }");
    assert_eq!(
        lower_error(&program),
        LowerError::UndeclaredFunction { name: "g".into() }
    );
}

#[test]
fn missing_entry_point_is_reported_after_linking() {
    let program = TestProgram::single("int f() { return 1; }");
    let assembly = program.compile().unwrap();
    assert!(matches!(
        assembly.entry(),
        Err(JitError::MissingEntryPoint { .. })
    ));

    let with_params = TestProgram::single("int main(int argc) { return argc; }");
    assert!(matches!(
        with_params.run(),
        Err(CompileError::Jit(JitError::MissingEntryPoint { .. }))
    ));
}

#[test]
fn entry_function_is_configurable() {
    let config = CompilerConfig {
        entry_function: "start".into(),
        ..CompilerConfig::default()
    };
    let program = TestProgram::single("int main() { return 1; } int start() { return 2; }")
        .with_config(config);
    assert_eq!(program.run().unwrap(), ReturnValue::Int(2));
}

#[test]
fn redefinition_is_rejected_by_default() {
    let program = TestProgram::new()
        .unit("a.c", "int f() { return 1; }")
        .unit("b.c", "int f() { return 2; }");
    assert_eq!(
        lower_error(&program),
        LowerError::Redefinition { name: "f".into() }
    );
}

#[test]
fn last_wins_redefinition() {
    let config = CompilerConfig {
        redefinition: RedefinitionPolicy::LastWins,
        ..CompilerConfig::default()
    };

    let same_unit = TestProgram::single("int main() { return 1; } int main() { return 2; }")
        .with_config(config.clone());
    assert_eq!(same_unit.run().unwrap(), ReturnValue::Int(2));

    let across_units = TestProgram::new()
        .unit("a.c", "int main() { return 1; }")
        .unit("b.c", "int main() { return 2; }")
        .with_config(config);
    assert!(matches!(
        across_units.compile(),
        Err(CompileError::Jit(JitError::DuplicateSymbol { .. }))
    ));
}

#[test]
fn unsupported_statements_can_be_skipped() {
    let source = "int main() { if (1) { return 5; } return 6; }";
    assert_eq!(
        lower_error(&TestProgram::single(source)),
        LowerError::UnsupportedStatement {
            kind: "if_statement".into()
        }
    );

    let config = CompilerConfig {
        unknown_statements: StatementPolicy::Skip,
        ..CompilerConfig::default()
    };
    let program = TestProgram::single(source).with_config(config);
    assert_eq!(program.run().unwrap(), ReturnValue::Int(6));
}

#[test]
fn syntax_errors_stop_compilation() {
    let program = TestProgram::single("int main() { return 1 + ; }");
    assert!(matches!(
        program.compile(),
        Err(CompileError::Parse { .. })
    ));
}

#[test]
fn mismatched_operand_types_are_rejected() {
    let program = TestProgram::single("int main() { return 1 + 2.0; }");
    assert!(matches!(lower_error(&program), LowerError::Ir(_)));
}

#[test]
fn each_unit_becomes_one_module() {
    let program = TestProgram::new()
        .unit("g.c", "int g(int a) { return a + 1; }")
        .unit("main.c", "int main() { return g(41); }");
    let compiler = program.lower().unwrap();

    let printed: Vec<String> = compiler
        .modules()
        .iter()
        .map(cy_ir::printer::print_module)
        .collect();
    expect_test::expect![[r#"
        ; module g.c

        define int @g(int %0) {
          %1 = iconst 1
          %2 = add %0, %1
          ret %2
        }
        ---
        ; module main.c

        define int @main() {
          %0 = iconst 41
          %1 = call int @g(%0)
          ret %1
        }
    "#]]
    .assert_eq(&printed.join("---\n"));
}
