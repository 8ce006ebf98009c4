//! Interpreter execution tracing infrastructure.
//!
//! Provides a trait-based tracing system with zero-cost abstraction. When
//! using [`NoopTracer`], all trace methods compile away entirely via
//! monomorphization, identical to how
//! [`NoLimitTracker`](crate::resource::NoLimitTracker) eliminates resource
//! checking overhead.
//!
//! | Tracer | Purpose |
//! |--------|---------|
//! | [`NoopTracer`] | Zero-cost no-op (production default) |
//! | [`StderrTracer`] | Human-readable execution log to stderr |
//! | [`RecordingTracer`] | Full event recording for tests and post-mortem |
//!
//! The interpreter is parameterized over `Tr: ExecTracer`, so callers choose
//! the tracer when starting a run.

use crate::error::ErrorKind;

/// Trace event emitted during interpretation.
///
/// Used by [`RecordingTracer`] to capture a full execution trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// A statement line is about to execute. 1-based line number.
    Line { line: usize },
    /// A line was classified and its payload compiled (first visit only).
    Setup { line: usize },
    /// A function call pushed a Phoenix frame.
    Call { name: String, depth: usize },
    /// A function call returned or unwound.
    Return { depth: usize },
    /// A runtime error was intercepted by a `try` block.
    Caught { kind: ErrorKind },
}

/// Trait for interpreter execution tracing.
///
/// All methods have default no-op implementations, so [`NoopTracer`]
/// requires zero lines of code and compiles to zero instructions.
/// Implementations only override the hooks they care about.
pub trait ExecTracer: std::fmt::Debug {
    /// Called before each statement executes.
    ///
    /// This is the hottest hook; implementations should be lightweight.
    ///
    /// # Arguments
    /// * `line` - 1-based source line number
    #[inline(always)]
    fn on_line(&mut self, _line: usize) {}

    /// Called when a line is classified and compiled for the first time.
    ///
    /// Subsequent executions of the same line replay the cached payload and
    /// never fire this hook again, which is how tests assert the one-shot
    /// setup invariant.
    #[inline(always)]
    fn on_setup(&mut self, _line: usize) {}

    /// Called when a function call pushes a Phoenix frame.
    #[inline(always)]
    fn on_call(&mut self, _name: &str, _depth: usize) {}

    /// Called when a function call returns or unwinds.
    #[inline(always)]
    fn on_return(&mut self, _depth: usize) {}

    /// Called when a `try` block catches a runtime error.
    #[inline(always)]
    fn on_caught(&mut self, _kind: ErrorKind) {}
}

/// Zero-cost no-op tracer (production default).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl ExecTracer for NoopTracer {}

/// Tracer that logs every event to stderr in a human-readable form.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrTracer;

impl ExecTracer for StderrTracer {
    fn on_line(&mut self, line: usize) {
        eprintln!("line {line}");
    }

    fn on_setup(&mut self, line: usize) {
        eprintln!("setup {line}");
    }

    fn on_call(&mut self, name: &str, depth: usize) {
        eprintln!("call {name} depth={depth}");
    }

    fn on_return(&mut self, depth: usize) {
        eprintln!("return depth={depth}");
    }

    fn on_caught(&mut self, kind: ErrorKind) {
        eprintln!("caught {kind}");
    }
}

/// Tracer that records every event for later inspection.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    events: Vec<TraceEvent>,
}

impl RecordingTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events in execution order.
    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Consumes the tracer and returns the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }

    /// Number of recorded `Setup` events for the given 1-based line.
    #[must_use]
    pub fn setup_count(&self, line: usize) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, TraceEvent::Setup { line: l } if *l == line))
            .count()
    }

    /// Number of recorded `Line` events for the given 1-based line.
    #[must_use]
    pub fn line_count(&self, line: usize) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, TraceEvent::Line { line: l } if *l == line))
            .count()
    }
}

impl ExecTracer for RecordingTracer {
    fn on_line(&mut self, line: usize) {
        self.events.push(TraceEvent::Line { line });
    }

    fn on_setup(&mut self, line: usize) {
        self.events.push(TraceEvent::Setup { line });
    }

    fn on_call(&mut self, name: &str, depth: usize) {
        self.events.push(TraceEvent::Call {
            name: name.to_owned(),
            depth,
        });
    }

    fn on_return(&mut self, depth: usize) {
        self.events.push(TraceEvent::Return { depth });
    }

    fn on_caught(&mut self, kind: ErrorKind) {
        self.events.push(TraceEvent::Caught { kind });
    }
}
