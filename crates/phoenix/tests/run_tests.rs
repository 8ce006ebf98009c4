use phoenix::{CollectStringPrint, Runner};
use pretty_assertions::assert_eq;

/// Helper: run a program and return everything it printed.
fn run(code: &str) -> String {
    let runner = Runner::new(code, "test.phx");
    let mut print = CollectStringPrint::new();
    runner
        .run_no_limits(&mut print)
        .unwrap_or_else(|err| panic!("program should run without errors, got:\n{err}"));
    print.into_output()
}

#[test]
fn factorial_with_a_left_argument_list() {
    let code = "function long (int) factorial:\n    long result = 1l\n    for int i = 2; i <= n; i += 1:\n        result *= i\n    return result\nprint (5) factorial";
    assert_eq!(run(code), "120\n");
}

#[test]
fn otherwise_runs_on_a_non_executing_loop() {
    let code = "while false:\n    print \"x\"\notherwise:\n    print \"y\"";
    assert_eq!(run(code), "y\n");
}

#[test]
fn otherwise_is_skipped_when_the_body_ran() {
    let code = "int i = 0\nwhile i < 2:\n    i += 1\notherwise:\n    print \"never\"\nprint i";
    assert_eq!(run(code), "2\n");
}

#[test]
fn string_repetition() {
    assert_eq!(run("print 3 * \"ab\""), "ababab\n");
    assert_eq!(run("print \"ab\" * 2"), "abab\n");
}

#[test]
fn try_catch_recovers_and_continues() {
    let code = "try:\n    int z = 1 / 0\ncatch:\n    print \"caught\"\nprint \"after\"";
    assert_eq!(run(code), "caught\nafter\n");
}

#[test]
fn try_body_completing_normally_skips_catch() {
    let code = "try:\n    print \"ok\"\ncatch:\n    print \"caught\"";
    assert_eq!(run(code), "ok\n");
}

#[test]
fn print_with_no_argument_emits_a_blank_line() {
    assert_eq!(run("print"), "\n");
    assert_eq!(run("print 1\nprint\nprint 2"), "1\n\n2\n");
}

#[test]
fn arithmetic_and_precedence() {
    assert_eq!(run("print 1 + 2 * 3"), "7\n");
    assert_eq!(run("print (1 + 2) * 3"), "9\n");
    assert_eq!(run("print 2 ^ 3 ^ 2"), "512\n");
    assert_eq!(run("print 10 % 3"), "1\n");
    assert_eq!(run("print -3 + 5"), "2\n");
}

#[test]
fn double_output_always_shows_a_decimal_point() {
    assert_eq!(run("print 6.0 / 2"), "3.0\n");
    assert_eq!(run("print 3d"), "3.0\n");
    assert_eq!(run("print 1.5 + 1.5"), "3.0\n");
}

#[test]
fn numeric_promotion_across_kinds() {
    assert_eq!(run("print 1 + 2l"), "3\n");
    assert_eq!(run("print 1 + 0.5"), "1.5\n");
    assert_eq!(run("print 2l * 3"), "6\n");
    assert_eq!(run("print 1 == 1.0"), "true\n");
}

#[test]
fn string_concatenation_stringifies_numbers() {
    assert_eq!(run("print 1 + \"x\""), "1x\n");
    assert_eq!(run("print 2l + \"x\""), "2x\n");
    assert_eq!(run("print \"n=\" + 42"), "n=42\n");
}

#[test]
fn if_else_chain_takes_the_first_true_arm() {
    let code = "int x = 7\nif x < 5:\n    print \"small\"\nelse if x < 10:\n    print \"medium\"\nelse:\n    print \"large\"";
    assert_eq!(run(code), "medium\n");
}

#[test]
fn else_body_runs_when_all_predicates_are_false() {
    let code = "if false:\n    print \"a\"\nelse if false:\n    print \"b\"\nelse:\n    print \"c\"";
    assert_eq!(run(code), "c\n");
}

#[test]
fn while_loop_counts() {
    let code = "int i = 0\nwhile i < 3:\n    print i\n    i += 1";
    assert_eq!(run(code), "0\n1\n2\n");
}

#[test]
fn until_loop_checks_at_the_start() {
    let code = "int i = 0\nuntil i == 3:\n    i += 1\nprint i";
    assert_eq!(run(code), "3\n");
}

#[test]
fn do_while_runs_the_body_at_least_once() {
    let code = "int i = 10\ndo:\n    print i\nwhile i < 3";
    assert_eq!(run(code), "10\n");
}

#[test]
fn do_until_loops_until_true() {
    let code = "int i = 0\ndo:\n    i += 1\nuntil i == 4\nprint i";
    assert_eq!(run(code), "4\n");
}

#[test]
fn break_and_continue_bind_to_the_innermost_loop() {
    let code = "int total = 0\nfor int i = 0; i < 10; i += 1:\n    if i == 3:\n        continue\n    if i == 5:\n        break\n    total += i\nprint total";
    // 0 + 1 + 2 + 4; 3 is skipped and 5 breaks out
    assert_eq!(run(code), "7\n");
}

#[test]
fn break_in_a_nested_loop_leaves_only_that_loop() {
    let code = "int count = 0\nfor int i = 0; i < 3; i += 1:\n    for int j = 0; j < 10; j += 1:\n        if j == 1:\n            break\n        count += 1\nprint count";
    assert_eq!(run(code), "3\n");
}

#[test]
fn for_loop_scope_ends_with_the_loop() {
    let code = "for int i = 0; i < 2; i += 1:\n    print i\nint i = 9\nprint i";
    assert_eq!(run(code), "0\n1\n9\n");
}

#[test]
fn for_otherwise_runs_when_the_body_never_does() {
    let code = "for int i = 0; i < 0; i += 1:\n    print \"body\"\notherwise:\n    print \"empty\"";
    assert_eq!(run(code), "empty\n");
}

#[test]
fn two_sided_argument_lists() {
    let code = "function int (int a) plus (int b):\n    return a + b\nprint (3) plus (4)";
    assert_eq!(run(code), "7\n");
}

#[test]
fn right_side_only_argument_list() {
    let code = "function int square (int x):\n    return x * x\nprint square (6)";
    assert_eq!(run(code), "36\n");
}

#[test]
fn multi_parameter_side_takes_a_tuple() {
    let code = "function int (int a, int b) sum:\n    return a + b\nprint (3, 4) sum";
    assert_eq!(run(code), "7\n");
}

#[test]
fn bare_function_name_invokes_with_no_arguments() {
    let code = "function int () five:\n    return 5\nprint five + 1";
    assert_eq!(run(code), "6\n");
}

#[test]
fn at_sign_suppresses_the_implicit_call() {
    let code = "function int () five:\n    return 5\nprint @five";
    assert_eq!(run(code), "function int () five\n");
}

#[test]
fn void_function_call_prints_void() {
    let code = "function noop:\n    return\nprint noop";
    assert_eq!(run(code), "void\n");
}

#[test]
fn recursive_functions() {
    let code = "function long (int n) fib:\n    if n < 2:\n        return 0l + n\n    return (n - 1) fib + (n - 2) fib\nprint (10) fib";
    assert_eq!(run(code), "55\n");
}

#[test]
fn global_writes_from_functions_are_visible() {
    let code = "int g = 1\nfunction bump:\n    g = 2\n    return\nbump\nprint g";
    assert_eq!(run(code), "2\n");
}

#[test]
fn parameters_are_copies_of_the_arguments() {
    let code = "int x = 1\nfunction int (int x) twice:\n    x += x\n    return x\nprint (x) twice\nprint x";
    assert_eq!(run(code), "2\n1\n");
}

#[test]
fn tuples_print_space_separated() {
    assert_eq!(run("print (1, 2, 3)"), "1 2 3\n");
    assert_eq!(run("print (1, \"a\", true)"), "1 a true\n");
}

#[test]
fn arrays_construct_index_and_compare() {
    let code = "[int] xs = [1, 2, 3]\nprint xs\nprint xs(1)\nprint xs == [1, 2, 3]\nprint xs != [1, 2]";
    assert_eq!(run(code), "[1, 2, 3]\n2\ntrue\ntrue\n");
}

#[test]
fn nested_arrays_carry_nested_type_names() {
    let code = "[[int]] grid = [[1, 2], [3, 4]]\nprint grid(1)";
    assert_eq!(run(code), "[3, 4]\n");
}

#[test]
fn tuple_indexing_via_call() {
    let code = "tuple t = (10, \"x\")\nprint t(0)\nprint (1) t";
    assert_eq!(run(code), "10\nx\n");
}

#[test]
fn comments_are_stripped_outside_strings() {
    let code = "print 1 // a comment\n// a whole comment line\nprint \"a // b\"";
    assert_eq!(run(code), "1\na // b\n");
}

#[test]
fn string_escapes() {
    assert_eq!(run("print \"a\\tb\""), "a\tb\n");
    assert_eq!(run("print 'it\\'s'"), "it's\n");
    assert_eq!(run("print \"line\\n\""), "line\n\n");
}

#[test]
fn assignment_chains_right_to_left() {
    let code = "int a = 0\nint b = 0\na = b = 5\nprint a\nprint b";
    assert_eq!(run(code), "5\n5\n");
}

#[test]
fn booleans_and_logic() {
    assert_eq!(run("print true and false"), "false\n");
    assert_eq!(run("print true or false"), "true\n");
    assert_eq!(run("print not false"), "true\n");
    assert_eq!(run("print 1 < 2 and 2 < 3"), "true\n");
}

#[test]
fn type_values_print_their_name() {
    assert_eq!(run("print int"), "int\n");
    assert_eq!(run("print int == int"), "true\n");
}

#[test]
fn empty_lines_and_blank_programs_are_fine() {
    assert_eq!(run(""), "");
    assert_eq!(run("\n\n\n"), "");
    assert_eq!(run("\nprint 1\n\n"), "1\n");
}

#[test]
fn rerunning_a_runner_replays_the_compiled_lines() {
    let runner = Runner::new("int x = 2\nprint x * x", "test.phx");
    for _ in 0..3 {
        let mut print = CollectStringPrint::new();
        runner.run_no_limits(&mut print).expect("each run should succeed");
        assert_eq!(print.output(), "4\n");
    }
}
