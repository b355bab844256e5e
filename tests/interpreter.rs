mod common;

use indoc::indoc;
use pretty_assertions::assert_eq;

use rox::runner::{RunError, EXIT_RUNTIME_ERROR, EXIT_STATIC_ERROR};

use common::{run, run_ok, runtime_error, session, static_errors};

// ───────────────────────────── expressions ─────────────────────────────

#[test]
fn arithmetic_and_number_formatting() {
    let source = indoc! {"
        print 1 + 2 * 3;
        print 12.0;
        print 25 / 2;
        print -(3 - 10);
        print 0.1 + 0.2 == 0.3;
    "};

    assert_eq!(run_ok(source), "7\n12\n12.5\n7\nfalse\n");
}

#[test]
fn division_by_zero_follows_floating_point() {
    assert_eq!(
        run_ok("print 1 / 0; print -1 / 0; print 0 / 0;"),
        "Infinity\n-Infinity\nNaN\n"
    );
}

#[test]
fn nan_equals_itself() {
    let source = indoc! {"
        var n = 0 / 0;
        print n == n;
        print n != n;
        print 0 == -0;
    "};

    assert_eq!(run_ok(source), "true\nfalse\nfalse\n");
}

#[test]
fn large_and_tiny_numbers_print_in_scientific_form() {
    let source = indoc! {"
        print 100000000000000000000000.0;
        print 12345678;
        print 9999999;
        print 0.0001;
        print 0.001;
        print -15000000.5;
    "};

    assert_eq!(
        run_ok(source),
        "1.0E23\n1.2345678E7\n9999999\n1.0E-4\n0.001\n-1.50000005E7\n"
    );
}

#[test]
fn string_concatenation() {
    assert_eq!(run_ok(r#"print "a" + "b";"#), "ab\n");
}

#[test]
fn equality_never_coerces() {
    let source = indoc! {r#"
        print 1 == "1";
        print nil == false;
        print nil == nil;
        print "a" != "a";
    "#};

    assert_eq!(run_ok(source), "false\nfalse\ntrue\nfalse\n");
}

#[test]
fn only_nil_and_false_are_falsey() {
    let source = indoc! {r#"
        print !0;
        print !"";
        print !nil;
        if (0) print "zero is truthy";
    "#};

    assert_eq!(run_ok(source), "false\nfalse\ntrue\nzero is truthy\n");
}

#[test]
fn logical_operators_short_circuit_and_yield_operands() {
    let source = indoc! {r#"
        var touched = false;
        fun touch() { touched = true; return "rhs"; }

        print nil or "default";
        print "left" or touch();
        print nil and touch();
        print 1 and 2;
        print touched;
    "#};

    assert_eq!(run_ok(source), "default\nleft\nnil\n2\nfalse\n");
}

#[test]
fn mixed_addition_is_a_runtime_error() {
    let (_, error) = runtime_error(r#"print 1 + "a";"#);

    assert_eq!(error, "Operands must be two numbers or two strings.\n[line 1]");
}

#[test]
fn operand_type_errors() {
    assert_eq!(
        runtime_error("print -\"x\";").1,
        "Operand must be a number.\n[line 1]"
    );
    assert_eq!(
        runtime_error("print 1 < \"2\";").1,
        "Operands must be numbers.\n[line 1]"
    );
}

// ───────────────────────────── statements ─────────────────────────────

#[test]
fn blocks_shadow_and_restore() {
    let source = indoc! {"
        var a = 1;
        {
          var a = 2;
          print a;
        }
        print a;
    "};

    assert_eq!(run_ok(source), "2\n1\n");
}

#[test]
fn uninitialised_variables_are_nil() {
    assert_eq!(run_ok("var a; print a;"), "nil\n");
}

#[test]
fn assigning_an_undefined_global() {
    assert_eq!(
        runtime_error("b = 1;").1,
        "Undefined variable 'b'.\n[line 1]"
    );
}

#[test]
fn for_loop_counts() {
    assert_eq!(
        run_ok("for (var i = 0; i < 3; i = i + 1) print i;"),
        "0\n1\n2\n"
    );
}

#[test]
fn while_loop_and_if_else() {
    let source = indoc! {r#"
        var n = 0;
        while (n < 4) {
          if (n == 2) print "two"; else print n;
          n = n + 1;
        }
    "#};

    assert_eq!(run_ok(source), "0\n1\ntwo\n3\n");
}

#[test]
fn runtime_error_halts_the_rest_of_the_program() {
    let source = indoc! {r#"
        print "before";
        print nil.field;
        print "after";
    "#};

    let (output, error) = runtime_error(source);

    assert_eq!(output, "before\n");
    assert_eq!(error, "Only instances have properties.\n[line 2]");
}

// ───────────────────────────── functions ─────────────────────────────

#[test]
fn recursion() {
    let source = indoc! {"
        fun fib(n) {
          if (n < 2) return n;
          return fib(n - 1) + fib(n - 2);
        }
        print fib(15);
    "};

    assert_eq!(run_ok(source), "610\n");
}

#[test]
fn return_unwinds_out_of_loops() {
    let source = indoc! {"
        fun find(limit) {
          for (var i = 0; ; i = i + 1) {
            {
              if (i > limit) return i;
            }
          }
        }
        print find(3);
        print find(0);
    "};

    assert_eq!(run_ok(source), "4\n1\n");
}

#[test]
fn functions_without_return_yield_nil() {
    assert_eq!(run_ok("fun f() {} print f();"), "nil\n");
}

#[test]
fn closures_keep_their_own_counter() {
    let source = indoc! {"
        fun makeCounter() {
          var i = 0;
          fun count() {
            i = i + 1;
            return i;
          }
          return count;
        }

        var counter = makeCounter();
        print counter();
        print counter();

        var other = makeCounter();
        print other();
    "};

    assert_eq!(run_ok(source), "1\n2\n1\n");
}

#[test]
fn closures_share_captured_variables() {
    let source = indoc! {"
        var get;
        var set;
        {
          var shared = 1;
          fun g() { return shared; }
          fun s(v) { shared = v; }
          get = g;
          set = s;
        }
        set(42);
        print get();
    "};

    assert_eq!(run_ok(source), "42\n");
}

#[test]
fn arity_is_checked() {
    let source = indoc! {"
        fun add(a, b) { return a + b; }
        print add(1);
    "};

    assert_eq!(
        runtime_error(source).1,
        "Expected 2 arguments but got 1.\n[line 2]"
    );
}

#[test]
fn calling_a_non_callable() {
    assert_eq!(
        runtime_error(r#""not a function"();"#).1,
        "Can only call functions and classes.\n[line 1]"
    );
}

#[test]
fn native_clock() {
    let source = indoc! {"
        print clock;
        var t = clock();
        print t > 0;
        print clock() >= t;
    "};

    assert_eq!(run_ok(source), "<native fn>\ntrue\ntrue\n");
}

#[test]
fn display_of_callables_and_objects() {
    let source = indoc! {"
        fun f() {}
        class Bagel { eat() {} }
        print f;
        print Bagel;
        print Bagel();
        print Bagel().eat;
    "};

    assert_eq!(
        run_ok(source),
        "<fn f>\nBagel\nBagel instance\n<fn eat>\n"
    );
}

// ───────────────────────────── classes ─────────────────────────────

#[test]
fn fields_and_methods() {
    let source = indoc! {r#"
        class Point {
          init(x, y) {
            this.x = x;
            this.y = y;
          }

          sum() { return this.x + this.y; }
        }

        var p = Point(1, 2);
        print p.sum();
        p.x = 10;
        print p.sum();
    "#};

    assert_eq!(run_ok(source), "3\n12\n");
}

#[test]
fn bound_methods_remember_their_instance() {
    let source = indoc! {r#"
        class Person {
          init(name) { this.name = name; }
          greet() { print "hi " + this.name; }
        }

        var greet = Person("ada").greet;
        greet();
    "#};

    assert_eq!(run_ok(source), "hi ada\n");
}

#[test]
fn fields_shadow_methods() {
    let source = indoc! {r#"
        class A { m() { return "method"; } }
        var a = A();
        print a.m();
        a.m = "field";
        print a.m;
    "#};

    assert_eq!(run_ok(source), "method\nfield\n");
}

#[test]
fn initializer_returns_the_instance() {
    let source = indoc! {r#"
        class Foo {
          init() {
            this.ready = true;
            return;
          }
        }

        var foo = Foo();
        print foo.init() == foo;
        print foo.ready;
    "#};

    assert_eq!(run_ok(source), "true\ntrue\n");
}

#[test]
fn class_arity_comes_from_init() {
    assert_eq!(
        runtime_error("class A { init(a) {} } A();").1,
        "Expected 1 arguments but got 0.\n[line 1]"
    );
    assert_eq!(
        runtime_error("class B {} B(1);").1,
        "Expected 0 arguments but got 1.\n[line 1]"
    );
}

#[test]
fn undefined_property() {
    assert_eq!(
        runtime_error("class A {} print A().missing;").1,
        "Undefined property 'missing'.\n[line 1]"
    );
}

#[test]
fn only_instances_have_fields() {
    assert_eq!(
        runtime_error("var s = \"str\"; s.x = 1;").1,
        "Only instances have fields.\n[line 1]"
    );
}

#[test]
fn inherited_methods_and_super_calls() {
    let source = indoc! {r#"
        class Doughnut {
          cook() { print "Fry until golden brown."; }
        }

        class BostonCream < Doughnut {
          cook() {
            super.cook();
            this.filled = true;
            print "Pipe full of custard.";
          }
        }

        var d = BostonCream();
        d.cook();
        print d.filled;
    "#};

    assert_eq!(
        run_ok(source),
        "Fry until golden brown.\nPipe full of custard.\ntrue\n"
    );
}

#[test]
fn super_is_bound_to_the_declaring_class() {
    let source = indoc! {r#"
        class A {
          method() { print "A method"; }
        }

        class B < A {
          method() { print "B method"; }
          test() { super.method(); }
        }

        class C < B {}

        C().test();
    "#};

    assert_eq!(run_ok(source), "A method\n");
}

#[test]
fn superclass_must_be_a_class() {
    let source = indoc! {r#"
        var NotAClass = "nope";
        class Sub < NotAClass {}
    "#};

    assert_eq!(
        runtime_error(source).1,
        "Superclass must be a class.\n[line 2]"
    );
}

#[test]
fn missing_super_method() {
    let source = indoc! {"
        class A {}
        class B < A { m() { super.nothing(); } }
        B().m();
    "};

    assert_eq!(
        runtime_error(source).1,
        "Undefined property 'nothing'.\n[line 2]"
    );
}

// ───────────────────────────── sessions ─────────────────────────────

#[test]
fn lexical_and_syntax_errors_are_reported_together() {
    assert_eq!(
        static_errors("var a = @;"),
        vec![
            "[line 1] Error: Unexpected character: @",
            "[line 1] Error at ';': Expect expression.",
        ]
    );
}

#[test]
fn exit_codes() {
    let (_, static_result) = run("print ;");
    let (_, runtime_result) = run("print -nil;");

    assert_eq!(static_result.map_err(|e| e.exit_code()), Err(EXIT_STATIC_ERROR));
    assert_eq!(runtime_result.map_err(|e| e.exit_code()), Err(EXIT_RUNTIME_ERROR));
}

#[test]
fn session_state_survives_between_runs() {
    let (mut lox, buffer) = session();

    lox.run("var a = 1; fun inc() { a = a + 1; }").expect("first line");
    lox.run("inc(); class K { get() { return a; } }").expect("second line");
    lox.run("{ var k = K(); print k.get(); }").expect("third line");

    assert_eq!(buffer.contents(), "2\n");
}

#[test]
fn session_error_flags() {
    let (mut lox, buffer) = session();

    assert!(matches!(lox.run("print ;"), Err(RunError::Static(_))));
    assert!(lox.had_error());

    lox.reset_error();
    assert!(!lox.had_error());

    assert!(matches!(lox.run("print -\"x\";"), Err(RunError::Runtime(_))));
    assert!(lox.had_runtime_error());

    lox.reset_error();
    lox.run("print \"still going\";").expect("later line runs");

    // The runtime flag is sticky for the life of the session.
    assert!(lox.had_runtime_error());
    assert_eq!(buffer.contents(), "still going\n");
}
