//! End-to-end tests through the `Session` entry point: scan, parse, resolve,
//! interpret.  Program output is observed through the session's buffered
//! sink; top-level expression statement values come back from `execute`.

use larch::error::{ErrorKind, LarchError};
use larch::run::Session;
use larch::value::Value;

/// Run `source` in a fresh session; return the execution result and whatever
/// the program printed.
fn run(source: &str) -> (larch::ExecutionResult, Vec<String>) {
    let mut session = Session::with_buffered_output();
    let result = session.execute(source);
    let output = session.take_output();

    (result, output)
}

fn values(source: &str) -> Vec<Value> {
    let (result, _) = run(source);
    result.expect("program should run cleanly")
}

fn printed(source: &str) -> Vec<String> {
    let (result, output) = run(source);
    result.expect("program should run cleanly");
    output
}

fn error(source: &str) -> LarchError {
    let (result, _) = run(source);
    result.map(|_| ()).expect_err("program should fail")
}

// ───────────────────────── expressions ─────────────────────────

#[test]
fn arithmetic_is_left_associative() {
    assert_eq!(values("1 - 2 - 3;"), vec![Value::Number(-4.0)]);
    assert_eq!(values("8 / 2 / 2;"), vec![Value::Number(2.0)]);
}

#[test]
fn grouping_overrides_precedence() {
    assert_eq!(values("1 + 2 * 3;"), vec![Value::Number(7.0)]);
    assert_eq!(values("(1 + 2) * 3;"), vec![Value::Number(9.0)]);
}

#[test]
fn plus_concatenates_strings() {
    assert_eq!(
        values("\"foo\" + \"bar\";"),
        vec![Value::Str("foobar".to_string())]
    );
}

#[test]
fn mixed_plus_operands_are_a_type_error() {
    let err = error("1 + \"a\";");

    assert_eq!(err.kind(), ErrorKind::RuntimeType);
    assert!(err.to_string().contains("two numbers or two strings"));
}

#[test]
fn unary_minus_requires_a_number() {
    let err = error("-\"a\";");

    assert_eq!(err.kind(), ErrorKind::RuntimeType);
}

#[test]
fn truthiness_only_false_and_nil_are_falsey() {
    assert_eq!(
        values("!nil; !false; !0; !\"\"; !true;"),
        vec![
            Value::Bool(true),
            Value::Bool(true),
            Value::Bool(false),
            Value::Bool(false),
            Value::Bool(false),
        ]
    );
}

#[test]
fn equality_follows_the_value_rule() {
    assert_eq!(values("1 == 1;"), vec![Value::Bool(true)]);
    assert_eq!(values("\"a\" == \"a\";"), vec![Value::Bool(true)]);
    assert_eq!(values("nil == nil;"), vec![Value::Bool(true)]);
    assert_eq!(values("1 == \"1\";"), vec![Value::Bool(false)]);
    assert_eq!(values("nil == false;"), vec![Value::Bool(false)]);
    assert_eq!(values("1 != 2;"), vec![Value::Bool(true)]);
}

#[test]
fn comparisons_require_numbers() {
    assert_eq!(values("2 > 1; 1 <= 1;"), vec![Value::Bool(true), Value::Bool(true)]);

    let err = error("\"a\" < \"b\";");
    assert_eq!(err.kind(), ErrorKind::RuntimeType);
}

#[test]
fn division_by_zero_follows_ieee754() {
    match values("1 / 0;").as_slice() {
        [Value::Number(n)] => assert!(n.is_infinite()),
        other => panic!("expected a number, got {:?}", other),
    }
}

#[test]
fn logical_operators_yield_booleanized_results() {
    assert_eq!(values("1 or 2;"), vec![Value::Bool(true)]);
    assert_eq!(values("nil or 2;"), vec![Value::Bool(true)]);
    assert_eq!(values("false or nil;"), vec![Value::Bool(false)]);
    assert_eq!(values("1 and 2;"), vec![Value::Bool(true)]);
    assert_eq!(values("1 and nil;"), vec![Value::Bool(false)]);
}

// ───────────────────────── variables & scopes ─────────────────────────

#[test]
fn globals_define_and_assign() {
    assert_eq!(values("var a = 1; a + 1;"), vec![Value::Number(2.0)]);
    assert_eq!(values("var a = 1; a = 2; a;"), vec![Value::Number(2.0), Value::Number(2.0)]);
}

#[test]
fn uninitialized_variables_are_nil() {
    assert_eq!(values("var a; a;"), vec![Value::Nil]);
}

#[test]
fn reading_an_undefined_variable_is_a_name_error() {
    let err = error("ghost;");

    assert_eq!(err.kind(), ErrorKind::RuntimeName);
    assert!(err.to_string().contains("Undefined variable 'ghost'"));
}

#[test]
fn assigning_an_undefined_variable_is_a_name_error() {
    let err = error("ghost = 1;");

    assert_eq!(err.kind(), ErrorKind::RuntimeName);
}

#[test]
fn inner_declarations_shadow_without_leaking() {
    assert_eq!(
        printed("{ var a = 1; { var a = 2; } println(a); }"),
        vec!["1"]
    );
}

#[test]
fn inner_scopes_can_assign_outer_locals() {
    assert_eq!(
        printed("{ var a = 1; { a = 2; } println(a); }"),
        vec!["2"]
    );
}

#[test]
fn self_reference_in_initializer_fails_before_execution() {
    let (result, output) = run("println(\"reached\"); { var a = a; }");
    let err = result.map(|_| ()).expect_err("should fail to resolve");

    assert_eq!(err.kind(), ErrorKind::Resolution);
    assert!(err.to_string().contains("its own initializer"));

    // Resolution runs before the interpreter: nothing printed.
    assert!(output.is_empty());
}

#[test]
fn redeclaring_in_the_same_local_scope_is_rejected() {
    let err = error("{ var a = 1; var a = 2; }");

    assert_eq!(err.kind(), ErrorKind::Resolution);
}

// ───────────────────────── control flow ─────────────────────────

#[test]
fn if_executes_exactly_one_branch() {
    assert_eq!(
        printed("if (1 > 0) println(\"then\"); else println(\"else\");"),
        vec!["then"]
    );
    assert_eq!(
        printed("if (nil) println(\"then\"); else println(\"else\");"),
        vec!["else"]
    );
}

#[test]
fn while_loops_until_falsey() {
    assert_eq!(
        printed("var i = 0; while (i < 3) { println(i); i = i + 1; }"),
        vec!["0", "1", "2"]
    );
}

#[test]
fn for_loop_matches_handwritten_while() {
    let desugared = printed("for (var i = 0; i < 3; i = i + 1) println(i);");
    let handwritten = printed("{ var i = 0; while (i < 3) { println(i); i = i + 1; } }");

    assert_eq!(desugared, vec!["0", "1", "2"]);
    assert_eq!(desugared, handwritten);
}

#[test]
fn short_circuit_skips_the_deciding_operands_effects() {
    let prelude = "var calls = 0;\n\
                   fun sideEffect() { calls = calls + 1; return true; }\n";

    let none = format!("{prelude} false and sideEffect(); true or sideEffect(); calls;");
    assert_eq!(values(&none).last(), Some(&Value::Number(0.0)));

    let once = format!("{prelude} true and sideEffect(); calls;");
    assert_eq!(values(&once).last(), Some(&Value::Number(1.0)));
}

// ───────────────────────── functions & closures ─────────────────────────

#[test]
fn functions_return_values() {
    assert_eq!(
        values("fun add(a, b) { return a + b; } add(1, 2);"),
        vec![Value::Number(3.0)]
    );
}

#[test]
fn return_without_value_and_fall_through_yield_nil() {
    assert_eq!(values("fun f() { return; } f();"), vec![Value::Nil]);
    assert_eq!(values("fun g() {} g();"), vec![Value::Nil]);
}

#[test]
fn recursion_works() {
    assert_eq!(
        values("fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } fib(10);"),
        vec![Value::Number(55.0)]
    );
}

#[test]
fn return_unwinds_out_of_nested_blocks_and_loops() {
    assert_eq!(
        values(
            "fun first() {\n\
             \x20 var i = 0;\n\
             \x20 while (true) {\n\
             \x20   { if (i > 2) return i; }\n\
             \x20   i = i + 1;\n\
             \x20 }\n\
             }\n\
             first();"
        ),
        vec![Value::Number(3.0)]
    );
}

#[test]
fn closures_capture_their_defining_frame() {
    assert_eq!(
        values(
            "fun makeCounter() {\n\
             \x20 var count = 0;\n\
             \x20 fun increment() { count = count + 1; return count; }\n\
             \x20 return increment;\n\
             }\n\
             var c = makeCounter();\n\
             c(); c(); c();"
        ),
        vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]
    );
}

#[test]
fn separate_closures_get_separate_frames() {
    assert_eq!(
        values(
            "fun makeCounter() {\n\
             \x20 var count = 0;\n\
             \x20 fun increment() { count = count + 1; return count; }\n\
             \x20 return increment;\n\
             }\n\
             var a = makeCounter();\n\
             var b = makeCounter();\n\
             a(); a(); b();"
        ),
        vec![Value::Number(1.0), Value::Number(2.0), Value::Number(1.0)]
    );
}

#[test]
fn arity_mismatch_names_expected_and_actual() {
    let err = error("fun f() {}\nf(1);");

    assert_eq!(err.kind(), ErrorKind::RuntimeArity);
    assert!(err.to_string().contains("Expected 0 arguments but got 1"));
    assert_eq!(err.line(), 2);
}

#[test]
fn calling_a_non_callable_value_fails() {
    let err = error("\"not a function\"();");

    assert_eq!(err.kind(), ErrorKind::RuntimeCall);
}

#[test]
fn unbounded_recursion_is_reported_not_crashed() {
    let err = error("fun boom() { boom(); } boom();");

    assert_eq!(err.kind(), ErrorKind::RuntimeStack);
}

#[test]
fn deep_recursion_within_the_bound_succeeds() {
    assert_eq!(
        values("fun down(n) { if (n > 0) return down(n - 1); return 0; } down(40);"),
        vec![Value::Number(0.0)]
    );
}

#[test]
fn pathological_nesting_is_rejected_not_crashed() {
    let source = format!("{}1{};", "(".repeat(100_000), ")".repeat(100_000));

    let (result, _) = run(&source);
    let err = result.map(|_| ()).expect_err("should be rejected");

    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn return_at_top_level_is_rejected_statically() {
    let err = error("return 1;");

    assert_eq!(err.kind(), ErrorKind::Resolution);
}

// ───────────────────────── natives ─────────────────────────

#[test]
fn println_prints_and_returns_nil() {
    let (result, output) = run("println(\"hi\");");

    assert_eq!(result.expect("run"), vec![Value::Nil]);
    assert_eq!(output, vec!["hi"]);
}

#[test]
fn number_display_drops_integral_fractions() {
    assert_eq!(printed("println(3); println(3.5);"), vec!["3", "3.5"]);
}

#[test]
fn clock_returns_a_positive_timestamp() {
    match values("clock();").as_slice() {
        [Value::Number(n)] => assert!(*n > 0.0),
        other => panic!("expected a number, got {:?}", other),
    }
}

// ───────────────────────── sessions ─────────────────────────

#[test]
fn session_state_persists_across_executions() {
    let mut session = Session::with_buffered_output();

    session.execute("var a = 1;").expect("first line");
    assert_eq!(session.execute("a + 1;").expect("second line"), vec![Value::Number(2.0)]);
}

#[test]
fn closures_survive_across_executions() {
    let mut session = Session::with_buffered_output();

    session
        .execute(
            "fun makeCounter() {\n\
             \x20 var count = 0;\n\
             \x20 fun increment() { count = count + 1; return count; }\n\
             \x20 return increment;\n\
             }\n\
             var c = makeCounter();",
        )
        .expect("definition line");

    assert_eq!(session.execute("c();").expect("call"), vec![Value::Number(1.0)]);
    assert_eq!(session.execute("c();").expect("call"), vec![Value::Number(2.0)]);
}

#[test]
fn a_failing_line_leaves_the_session_usable() {
    let mut session = Session::with_buffered_output();

    session.execute("var a = 1;").expect("define");
    assert!(session.execute("a + nil;").is_err());
    assert_eq!(session.execute("a;").expect("read"), vec![Value::Number(1.0)]);
}
