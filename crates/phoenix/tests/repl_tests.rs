use phoenix::{CollectStringPrint, ErrorKind, ReplSession};
use pretty_assertions::assert_eq;

/// Helper: execute a snippet and return its printed output.
fn execute(session: &mut ReplSession, code: &str) -> String {
    let mut print = CollectStringPrint::new();
    session
        .execute(code, &mut print)
        .unwrap_or_else(|err| panic!("snippet should succeed, got:\n{err}"));
    print.into_output()
}

#[test]
fn globals_persist_across_snippets() {
    let mut session = ReplSession::new("<stdin>");
    assert_eq!(execute(&mut session, "int x = 1"), "");
    assert_eq!(execute(&mut session, "x += 41"), "");
    assert_eq!(execute(&mut session, "print x"), "42\n");
}

#[test]
fn functions_stay_callable_from_later_snippets() {
    let mut session = ReplSession::new("<stdin>");
    execute(&mut session, "function int (int a) double:\n    return a + a");
    assert_eq!(execute(&mut session, "print (21) double"), "42\n");
    // the defining snippet's source stays alive through the function value
    assert_eq!(execute(&mut session, "print (3) double + (4) double"), "14\n");
}

#[test]
fn errors_leave_the_session_usable() {
    let mut session = ReplSession::new("<stdin>");
    execute(&mut session, "int x = 7");
    let mut print = CollectStringPrint::new();
    let err = session.execute("print nope", &mut print).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(execute(&mut session, "print x"), "7\n");
    assert_eq!(session.executed(), 3);
}

#[test]
fn redeclaration_across_snippets_is_rejected() {
    let mut session = ReplSession::new("<stdin>");
    execute(&mut session, "int x = 1");
    let mut print = CollectStringPrint::new();
    let err = session.execute("int x = 2", &mut print).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.message(), "'x' is already declared");
}

#[test]
fn compound_snippets_run_whole_blocks() {
    let mut session = ReplSession::new("<stdin>");
    execute(&mut session, "int total = 0");
    let output = execute(&mut session, "for int i = 1; i <= 3; i += 1:\n    total += i\nprint total");
    assert_eq!(output, "6\n");
}

#[test]
fn top_level_break_is_rejected_per_snippet() {
    let mut session = ReplSession::new("<stdin>");
    let mut print = CollectStringPrint::new();
    let err = session.execute("break", &mut print).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.message(), "'break' outside of a loop");
}
