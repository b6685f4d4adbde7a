//! End-to-end language tests: source text through the parser and
//! evaluator, observed through typed `do_string` results.

use script_bindings::{ErrorKind, Value, Vm};

#[test]
fn test_arithmetic_and_precedence() {
    let mut vm = Vm::new();
    assert_eq!(vm.do_string::<i64>("return 1 + 2 * 3").unwrap(), 7);
    assert_eq!(vm.do_string::<i64>("return (1 + 2) * 3").unwrap(), 9);
    assert_eq!(vm.do_string::<i64>("return 10 - 2 - 3").unwrap(), 5);
    assert_eq!(vm.do_string::<f64>("return 7 / 2").unwrap(), 3.5);
    assert_eq!(vm.do_string::<i64>("return 7 % 3").unwrap(), 1);
    assert_eq!(vm.do_string::<i64>("return -(2 + 3)").unwrap(), -5);
}

#[test]
fn test_globals_persist_across_chunks() {
    let mut vm = Vm::new();
    vm.do_string::<()>("counter = 10").unwrap();
    vm.do_string::<()>("counter = counter + 5").unwrap();
    assert_eq!(vm.do_string::<i64>("return counter").unwrap(), 15);
}

#[test]
fn test_locals_shadow_and_expire() {
    let mut vm = Vm::new();
    let result = vm
        .do_string::<i64>(
            "x = 1\n\
             if true then\n\
               local x = 100\n\
               x = x + 1\n\
             end\n\
             return x",
        )
        .unwrap();
    assert_eq!(result, 1);
}

#[test]
fn test_if_elseif_else() {
    let mut vm = Vm::new();
    let pick = "if n == 1 then r = 'one'\n\
                elseif n == 2 then r = 'two'\n\
                else r = 'many'\n\
                end\n\
                return r";
    vm.do_string::<()>("n = 1").unwrap();
    assert_eq!(vm.do_string::<String>(pick).unwrap(), "one");
    vm.do_string::<()>("n = 2").unwrap();
    assert_eq!(vm.do_string::<String>(pick).unwrap(), "two");
    vm.do_string::<()>("n = 9").unwrap();
    assert_eq!(vm.do_string::<String>(pick).unwrap(), "many");
}

#[test]
fn test_while_loop() {
    let mut vm = Vm::new();
    let result = vm
        .do_string::<i64>(
            "sum = 0\n\
             i = 1\n\
             while i <= 10 do\n\
               sum = sum + i\n\
               i = i + 1\n\
             end\n\
             return sum",
        )
        .unwrap();
    assert_eq!(result, 55);
}

#[test]
fn test_return_exits_loop() {
    let mut vm = Vm::new();
    let result = vm
        .do_string::<i64>(
            "i = 0\n\
             while true do\n\
               i = i + 1\n\
               if i == 3 then return i end\n\
             end",
        )
        .unwrap();
    assert_eq!(result, 3);
}

#[test]
fn test_string_concat_and_compare() {
    let mut vm = Vm::new();
    assert_eq!(
        vm.do_string::<String>("return 'foo'..'bar'..1").unwrap(),
        "foobar1"
    );
    assert_eq!(
        vm.do_string::<bool>("return 'abc' < 'abd'").unwrap(),
        true
    );
    assert_eq!(vm.do_string::<bool>("return 'a' == 'a'").unwrap(), true);
}

#[test]
fn test_logical_operators_yield_operands() {
    let mut vm = Vm::new();
    assert_eq!(vm.do_string::<i64>("return false or 5").unwrap(), 5);
    assert_eq!(vm.do_string::<i64>("return 1 and 2").unwrap(), 2);
    assert_eq!(
        vm.do_string::<bool>("return not nil").unwrap(),
        true
    );
    // Short circuit: the right side must not run.
    vm.register_function("boom", || -> Result<i64, script_bindings::ScriptError> {
        panic!("must not be called")
    });
    assert_eq!(
        vm.do_string::<bool>("return false and boom()").unwrap(),
        false
    );
}

#[test]
fn test_comments_ignored() {
    let mut vm = Vm::new();
    let result = vm
        .do_string::<i64>("-- leading comment\nx = 2 -- trailing\nreturn x")
        .unwrap();
    assert_eq!(result, 2);
}

#[test]
fn test_chunk_without_return_yields_nil() {
    let mut vm = Vm::new();
    assert_eq!(vm.do_string::<Value>("x = 1").unwrap(), Value::Nil);
}

#[test]
fn test_unknown_global_reads_nil() {
    let mut vm = Vm::new();
    assert_eq!(
        vm.do_string::<bool>("return missing == nil").unwrap(),
        true
    );
}

#[test]
fn test_syntax_error_reports_line() {
    let mut vm = Vm::new();
    let err = vm.do_string::<()>("x = 1\ny = = 2").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert!(err.message.contains("line 2"), "message: {}", err.message);
}

#[test]
fn test_unsupported_keyword_rejected() {
    let mut vm = Vm::new();
    let err = vm
        .do_string::<()>("for i = 1, 10 do end")
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
}

#[test]
fn test_calling_a_non_function_fails() {
    let mut vm = Vm::new();
    let err = vm.do_string::<()>("x = 5\nx()").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Runtime);
}

#[test]
fn test_division_truncates_nothing() {
    let mut vm = Vm::new();
    // Division is always float, matching the reference semantics.
    assert_eq!(vm.do_string::<f64>("return 4 / 2").unwrap(), 2.0);
    let err = vm.do_string::<i64>("return 4 / 2").unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeMismatch);
}

#[test]
fn test_native_function_round_trip() {
    let mut vm = Vm::new();
    vm.register_function("add", |a: i64, b: i64| a + b);
    vm.register_function("greet", |name: String| format!("hello, {name}"));
    assert_eq!(
        vm.do_string::<i64>("return add(add(1, 2), 3)").unwrap(),
        6
    );
    assert_eq!(
        vm.do_string::<String>("return greet('vm')").unwrap(),
        "hello, vm"
    );
}
