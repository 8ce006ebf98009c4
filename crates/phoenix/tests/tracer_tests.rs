use phoenix::{CollectStringPrint, NoLimitTracker, RecordingTracer, Runner, TraceEvent};
use pretty_assertions::assert_eq;

fn run_traced(code: &str) -> RecordingTracer {
    let runner = Runner::new(code, "test.phx");
    let mut print = CollectStringPrint::new();
    let mut tracer = RecordingTracer::new();
    runner
        .run(&mut print, NoLimitTracker, &mut tracer)
        .unwrap_or_else(|err| panic!("program should succeed, got:\n{err}"));
    tracer
}

#[test]
fn loop_bodies_classify_once_and_execute_many_times() {
    let code = "int i = 0\nwhile i < 4:\n    i += 1";
    let tracer = run_traced(code);
    // line 3 is the loop body: four executions, one classification
    assert_eq!(tracer.line_count(3), 4);
    assert_eq!(tracer.setup_count(3), 1);
    // the loop header itself also classifies exactly once
    assert_eq!(tracer.setup_count(2), 1);
    assert_eq!(tracer.line_count(2), 1);
}

#[test]
fn function_bodies_classify_once_across_calls() {
    let code = "function int (int a) inc:\n    return a + 1\nprint (1) inc\nprint (2) inc\nprint (3) inc";
    let tracer = run_traced(code);
    assert_eq!(tracer.setup_count(2), 1);
    assert_eq!(tracer.line_count(2), 3);
}

#[test]
fn call_and_return_events_balance() {
    let code = "function noop:\n    return\nnoop\nnoop";
    let tracer = run_traced(code);
    let calls = tracer
        .events()
        .iter()
        .filter(|e| matches!(e, TraceEvent::Call { name, .. } if name == "noop"))
        .count();
    let returns = tracer
        .events()
        .iter()
        .filter(|e| matches!(e, TraceEvent::Return { .. }))
        .count();
    assert_eq!(calls, 2);
    assert_eq!(returns, 2);
}

#[test]
fn caught_errors_are_traced() {
    let code = "try:\n    print 1 / 0\ncatch:\n    print \"caught\"";
    let tracer = run_traced(code);
    assert!(
        tracer
            .events()
            .iter()
            .any(|e| matches!(e, TraceEvent::Caught { .. })),
        "expected a Caught event, got: {:?}",
        tracer.events()
    );
}

#[test]
fn rerunning_performs_no_further_setup() {
    let runner = Runner::new("int x = 1\nprint x", "test.phx");
    let mut print = CollectStringPrint::new();
    let mut first = RecordingTracer::new();
    runner.run(&mut print, NoLimitTracker, &mut first).unwrap();
    assert_eq!(first.setup_count(1), 1);
    assert_eq!(first.setup_count(2), 1);

    let mut second = RecordingTracer::new();
    runner.run(&mut print, NoLimitTracker, &mut second).unwrap();
    assert_eq!(second.setup_count(1), 0);
    assert_eq!(second.setup_count(2), 0);
    assert_eq!(second.line_count(1), 1);
    assert_eq!(second.line_count(2), 1);
}
