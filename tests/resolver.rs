mod common;

use indoc::indoc;
use pretty_assertions::assert_eq;

use rox::interpreter::Interpreter;
use rox::parser::Parser;
use rox::resolver::Resolver;
use rox::scanner::Scanner;

use common::{run_ok, runtime_error, static_errors};

/// Resolve `source` and hand back the interpreter holding the recorded depths.
fn resolved(source: &str) -> Interpreter {
    let (tokens, errors) = Scanner::new(source).scan_all();
    assert!(errors.is_empty(), "unexpected lexical errors: {:?}", errors);

    let statements = Parser::new(&tokens).parse().expect("program parses");

    let mut interpreter = Interpreter::with_output(Box::new(std::io::sink()));
    Resolver::new(&mut interpreter)
        .resolve(&statements)
        .expect("program resolves");

    interpreter
}

#[test]
fn reading_a_local_in_its_own_initializer() {
    assert_eq!(
        static_errors("{ var x = x; }"),
        vec!["[line 1] Error at 'x': Can't read local variable in its own initializer."]
    );
}

#[test]
fn global_self_reference_fails_at_runtime_instead() {
    let (output, error) = runtime_error("print 1; var x = x;");

    assert_eq!(output, "1\n");
    assert_eq!(error, "Undefined variable 'x'.\n[line 1]");
}

#[test]
fn duplicate_local_declaration() {
    assert_eq!(
        static_errors("{ var a = 1;\n  var a = 2; }"),
        vec!["[line 2] Error at 'a': Already a variable with this name in this scope."]
    );

    assert_eq!(
        static_errors("fun f(a, a) {}"),
        vec!["[line 1] Error at 'a': Already a variable with this name in this scope."]
    );
}

#[test]
fn globals_may_be_redeclared() {
    assert_eq!(run_ok("var a = 1; var a = 2; print a;"), "2\n");
}

#[test]
fn return_outside_a_function() {
    assert_eq!(
        static_errors("return 1;"),
        vec!["[line 1] Error at 'return': Can't return from top-level code."]
    );
}

#[test]
fn initializer_may_not_return_a_value() {
    assert_eq!(
        static_errors("class A { init() { return 1; } }"),
        vec!["[line 1] Error at 'return': Can't return a value from an initializer."]
    );

    // A bare return is fine.
    assert_eq!(run_ok("class A { init() { return; } } print A();"), "A instance\n");
}

#[test]
fn this_and_super_outside_their_classes() {
    assert_eq!(
        static_errors("print this;"),
        vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]
    );

    assert_eq!(
        static_errors("fun f() { return this; }"),
        vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]
    );

    assert_eq!(
        static_errors("super.m();"),
        vec!["[line 1] Error at 'super': Can't use 'super' outside of a class."]
    );

    assert_eq!(
        static_errors("class A { m() { super.m(); } }"),
        vec!["[line 1] Error at 'super': Can't use 'super' in a class with no superclass."]
    );
}

#[test]
fn class_inheriting_from_itself() {
    assert_eq!(
        static_errors("class A < A {}"),
        vec!["[line 1] Error at 'A': A class can't inherit from itself."]
    );
}

#[test]
fn every_static_error_is_collected() {
    let source = indoc! {"
        return 1;
        print this;
        {
          var a;
          var a;
        }
        fun f() {
          { var b = b; }
          return 2;
        }
    "};

    assert_eq!(
        static_errors(source),
        vec![
            "[line 1] Error at 'return': Can't return from top-level code.",
            "[line 2] Error at 'this': Can't use 'this' outside of a class.",
            "[line 5] Error at 'a': Already a variable with this name in this scope.",
            "[line 8] Error at 'b': Can't read local variable in its own initializer.",
        ]
    );
}

#[test]
fn a_failed_initializer_still_defines_the_variable() {
    assert_eq!(
        static_errors("{ var a = this; print a; }"),
        vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]
    );
}

#[test]
fn a_redeclared_function_still_has_its_body_checked() {
    let source = indoc! {"
        {
          fun f() {}
          fun f() { return this; }
        }
    "};

    assert_eq!(
        static_errors(source),
        vec![
            "[line 3] Error at 'f': Already a variable with this name in this scope.",
            "[line 3] Error at 'this': Can't use 'this' outside of a class.",
        ]
    );
}

#[test]
fn errors_in_sibling_expressions_are_all_reported() {
    assert_eq!(
        static_errors("print this + super.x;"),
        vec![
            "[line 1] Error at 'this': Can't use 'this' outside of a class.",
            "[line 1] Error at 'super': Can't use 'super' outside of a class.",
        ]
    );
}

#[test]
fn nothing_runs_when_resolution_fails() {
    let (output, _) = common::run("print 1;\nreturn;");

    assert_eq!(output, "");
}

#[test]
fn depths_count_enclosing_blocks() {
    let interpreter = resolved("{ var a = 1; { print a; } }");

    assert_eq!(interpreter.local_depth(0), Some(1));
}

#[test]
fn globals_get_no_depth() {
    let interpreter = resolved("var a = 1; { print a; a = 2; }");

    // id 1 belongs to the `a` the parser turned into an assignment target
    assert_eq!(interpreter.local_depth(0), None);
    assert_eq!(interpreter.local_depth(2), None);
}

#[test]
fn function_parameters_and_body_share_a_scope() {
    let interpreter = resolved("fun f(x) { var y = x; return y; }");

    // `x` in the initializer and `y` in the return
    assert_eq!(interpreter.local_depth(0), Some(0));
    assert_eq!(interpreter.local_depth(1), Some(0));
}

#[test]
fn this_resolves_one_scope_above_the_method_body() {
    let interpreter = resolved("class A { m() { return this; } }");

    assert_eq!(interpreter.local_depth(0), Some(1));
}

#[test]
fn super_resolves_above_the_this_scope() {
    let interpreter = resolved("class A {} class B < A { m() { super.m(); } }");

    // id 0 is the superclass reference `A`, a global
    assert_eq!(interpreter.local_depth(0), None);
    assert_eq!(interpreter.local_depth(1), Some(2));
}

#[test]
fn closures_bind_to_the_scope_seen_at_declaration() {
    let source = indoc! {r#"
        var a = "global";
        {
          fun showA() {
            print a;
          }

          showA();
          var a = "block";
          showA();
          print a;
        }
    "#};

    assert_eq!(run_ok(source), "global\nglobal\nblock\n");
}
