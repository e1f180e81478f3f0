//! Lowering of C syntax trees into IR modules
//!
//! One call to [`lower_translation_unit`] turns the syntax tree of one source
//! unit into IR functions inside a single module. Function names live in a
//! [`FunctionTable`] owned by the caller and shared by every unit of a
//! compilation session, which is what makes calls across files resolvable.
//!
//! Supported subset: functions over `int`, `double` and `void`, local
//! declarations, `return`, expression statements, nested blocks, number
//! literals, identifiers, calls, parentheses and binary `+`/`-`.

mod context;
mod error;
mod expr;
mod function;
mod scope;
mod stmt;
mod symbols;
mod types;
mod unit;

pub use context::CompilationContext;
pub use error::LowerError;
pub use expr::lower_expr;
pub use function::lower_function;
pub use scope::ScopeStack;
pub use stmt::{lower_block, lower_stmt};
pub use symbols::FunctionTable;
pub use types::resolve_type;
pub use unit::lower_translation_unit;

use serde::{Deserialize, Serialize};

/// What happens when a function name is defined a second time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RedefinitionPolicy {
    /// Fail with [`LowerError::Redefinition`]
    #[default]
    Reject,
    /// The later definition replaces the earlier one in the symbol table
    LastWins,
}

/// What happens to statement kinds the lowering does not understand
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatementPolicy {
    /// Fail with [`LowerError::UnsupportedStatement`]
    #[default]
    Reject,
    /// Drop the statement
    Skip,
}

/// Policies applied while lowering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LowerOptions {
    /// Function redefinition handling
    pub redefinition: RedefinitionPolicy,
    /// Unrecognized statement handling
    pub unknown_statements: StatementPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cy_ir::{IrError, Module, ModuleId, Type, printer::print_module};
    use cy_parser::parse_source;
    use expect_test::{Expect, expect};

    fn lower_with(source: &str, options: &LowerOptions) -> Result<Module, LowerError> {
        let mut table = FunctionTable::new();
        lower_into(source, &mut table, options)
    }

    fn lower_into(
        source: &str,
        table: &mut FunctionTable,
        options: &LowerOptions,
    ) -> Result<Module, LowerError> {
        let parsed = parse_source("test.c", source);
        assert!(parsed.is_clean(), "syntax errors: {:?}", parsed.errors);

        let root = parsed.syntax.as_ref().unwrap();
        let mut module = Module::new(ModuleId(0), "test.c");
        lower_translation_unit(source, root, module.builder(), table, options)?;
        Ok(module)
    }

    fn lower(source: &str) -> Result<Module, LowerError> {
        lower_with(source, &LowerOptions::default())
    }

    fn check(source: &str, expected: Expect) {
        let module = lower(source).unwrap();
        expected.assert_eq(&print_module(&module));
    }

    #[test]
    fn literal_return() {
        check(
            "int f() { return 42; }",
            expect![[r#"
                ; module test.c

                define int @f() {
                  %0 = iconst 42
                  ret %0
                }
            "#]],
        );
    }

    #[test]
    fn arithmetic_is_left_associative() {
        check(
            "int f() { return 10 - 2 - 3; }",
            expect![[r#"
                ; module test.c

                define int @f() {
                  %0 = iconst 10
                  %1 = iconst 2
                  %2 = sub %0, %1
                  %3 = iconst 3
                  %4 = sub %2, %3
                  ret %4
                }
            "#]],
        );
    }

    #[test]
    fn declarations_bind_in_order() {
        check(
            "int f() { int a = 1, b = a + 2; int c; return b; }",
            expect![[r#"
                ; module test.c

                define int @f() {
                  %0 = iconst 1
                  %1 = iconst 2
                  %2 = add %0, %1
                  ret %2
                }
            "#]],
        );
    }

    #[test]
    fn nested_block_shadowing_is_undone_on_exit() {
        check(
            "int f(int x) { { int x = 5; } return x; }",
            expect![[r#"
                ; module test.c

                define int @f(int %0) {
                  %1 = iconst 5
                  ret %0
                }
            "#]],
        );
    }

    #[test]
    fn calls_resolve_earlier_functions_and_parentheses() {
        check(
            "double g(double d) { return d; }\nint h(void) { return 1; }\ndouble f() { h(); return (g(2.5)); }",
            expect![[r#"
                ; module test.c

                define double @g(double %0) {
                  ret %0
                }

                define int @h() {
                  %0 = iconst 1
                  ret %0
                }

                define double @f() {
                  %0 = call int @h()
                  %1 = fconst 2.5
                  %2 = call double @g(%1)
                  ret %2
                }
            "#]],
        );
    }

    #[test]
    fn recursion_sees_its_own_definition() {
        let module = lower("int f(int n) { return f(n - 1); }").unwrap();
        assert_eq!(module.functions().len(), 1);
    }

    #[test]
    fn top_level_declarations_and_comments_are_ignored() {
        let module = lower("int global;\n// note\nint f() { /* c */ return 0; }").unwrap();
        let names: Vec<_> = module.functions().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["f"]);
    }

    #[test]
    fn unknown_type_fails() {
        let err = lower("char f() { return 0; }").unwrap_err();
        assert_eq!(
            err,
            LowerError::UnknownType {
                spelling: "char".into()
            }
        );

        let err = lower("int f() { long x = 1; return x; }").unwrap_err();
        assert!(matches!(err, LowerError::UnknownType { .. }), "{err}");
    }

    #[test]
    fn undeclared_identifier_fails() {
        let err = lower("int f() { return y; }").unwrap_err();
        assert_eq!(err, LowerError::UndeclaredIdentifier { name: "y".into() });
    }

    #[test]
    fn uninitialized_declaration_stays_unbound() {
        let err = lower("int f() { int x; return x; }").unwrap_err();
        assert_eq!(err, LowerError::UndeclaredIdentifier { name: "x".into() });
    }

    #[test]
    fn callee_must_be_defined_first() {
        let err = lower("int f() { return g(); } int g() { return 1; }").unwrap_err();
        assert_eq!(err, LowerError::UndeclaredFunction { name: "g".into() });
    }

    #[test]
    fn only_plus_and_minus_are_lowered() {
        let err = lower("int f() { return 2 * 3; }").unwrap_err();
        assert_eq!(
            err,
            LowerError::UnrecognizedOperator {
                operator: "*".into()
            }
        );
    }

    #[test]
    fn unsupported_expression_kinds_fail() {
        let err = lower("int f() { return -1; }").unwrap_err();
        assert_eq!(
            err,
            LowerError::UnsupportedExpression {
                kind: "unary_expression".into()
            }
        );
    }

    #[test]
    fn literal_out_of_range_fails() {
        let err = lower("int f() { return 4294967296; }").unwrap_err();
        assert_eq!(
            err,
            LowerError::InvalidLiteral {
                text: "4294967296".into()
            }
        );
    }

    #[test]
    fn hex_literals_are_integers() {
        let module = lower("int f() { return 0x2A; }").unwrap();
        let f = module.function("f").unwrap();
        assert!(matches!(f.insts[0], cy_ir::Inst::IConst { value: 42, .. }));
    }

    #[test]
    fn leading_zero_literals_are_octal() {
        let module = lower("int f() { return 010; } int g() { return 0; }").unwrap();
        let f = module.function("f").unwrap();
        assert!(matches!(f.insts[0], cy_ir::Inst::IConst { value: 8, .. }));
        let g = module.function("g").unwrap();
        assert!(matches!(g.insts[0], cy_ir::Inst::IConst { value: 0, .. }));

        let err = lower("int f() { return 08; }").unwrap_err();
        assert_eq!(err, LowerError::InvalidLiteral { text: "08".into() });
    }

    #[test]
    fn mixed_operands_are_rejected_by_the_builder() {
        let err = lower("double f() { return 1 + 2.0; }").unwrap_err();
        assert_eq!(
            err,
            LowerError::Ir(IrError::TypeMismatch {
                op: "add",
                lhs: Type::Int,
                rhs: Type::Double,
            })
        );
    }

    #[test]
    fn unknown_statements_follow_the_policy() {
        let source = "int f() { while (1) {} return 3; }";
        let err = lower(source).unwrap_err();
        assert_eq!(
            err,
            LowerError::UnsupportedStatement {
                kind: "while_statement".into()
            }
        );

        let options = LowerOptions {
            unknown_statements: StatementPolicy::Skip,
            ..LowerOptions::default()
        };
        let module = lower_with(source, &options).unwrap();
        assert_eq!(module.function("f").unwrap().insts.len(), 2);
    }

    #[test]
    fn redefinition_follows_the_policy() {
        let source = "int f() { return 1; } int f() { return 2; }";
        let err = lower(source).unwrap_err();
        assert_eq!(err, LowerError::Redefinition { name: "f".into() });

        let options = LowerOptions {
            redefinition: RedefinitionPolicy::LastWins,
            ..LowerOptions::default()
        };
        let module = lower_with(source, &options).unwrap();
        assert_eq!(module.functions().len(), 1);
        assert!(matches!(
            module.function("f").unwrap().insts[0],
            cy_ir::Inst::IConst { value: 2, .. }
        ));
    }

    #[test]
    fn table_spans_units() {
        let mut table = FunctionTable::new();
        let options = LowerOptions::default();
        lower_into("int g() { return 1; }", &mut table, &options).unwrap();
        let module = lower_into("int f() { return g() + 1; }", &mut table, &options).unwrap();

        assert_eq!(table.len(), 2);
        let f = module.function("f").unwrap();
        assert!(
            f.insts
                .iter()
                .any(|inst| matches!(inst, cy_ir::Inst::Call { callee, .. } if callee == "g"))
        );
    }

    #[test]
    fn pointer_declarators_are_rejected() {
        let err = lower("int f() { int *p = 0; return 0; }").unwrap_err();
        assert_eq!(
            err,
            LowerError::UnsupportedDeclarator {
                kind: "pointer_declarator".into()
            }
        );
    }
}
