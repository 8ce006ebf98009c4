//! Error taxonomy and diagnostic formatting.
//!
//! Every runtime failure is a [`RuntimeError`]: a category, a message, the
//! source line it was raised on, and the function-call trace accumulated
//! while unwinding. Executors thread these through ordinary `Result` returns;
//! nothing is ever thrown past a `try` block silently. The run boundary wraps
//! the final error in the public [`Exception`], whose `Display` output is the
//! exact text printed to standard error.

use std::fmt;

use strum::{Display, EnumString, IntoStaticStr};

/// Result type alias for operations that can produce a runtime error.
pub(crate) type RunResult<T> = Result<T, RuntimeError>;

/// Error categories emitted to standard error.
///
/// The strum `Display` strings are the exact category prefixes of diagnostic
/// output (`Syntax error: ...`), so formatting and taxonomy live in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum ErrorKind {
    /// Malformed construct detected at classification or expression build time.
    #[strum(serialize = "Syntax error")]
    Syntax,
    /// Block indentation violation.
    #[strum(serialize = "Indent error")]
    Indent,
    /// Function call arity or type mismatch.
    #[strum(serialize = "Parameters error")]
    Parameters,
    /// Operator not defined for the given operand kind(s).
    #[strum(serialize = "Unsupported operator")]
    UnsupportedOperator,
    /// Default category for runtime errors (division by zero, limits, ...).
    #[strum(serialize = "Error")]
    Error,
}

/// Source position an error was raised at, captured once at the statement
/// that failed and never overwritten while unwinding.
#[derive(Debug, Clone)]
pub(crate) struct Location {
    /// 1-based line number.
    pub line: usize,
    /// Comment-stripped, trimmed text of the offending line.
    pub text: String,
}

/// One function-call record appended while an error unwinds through a call.
#[derive(Debug, Clone)]
pub(crate) struct TraceFrame {
    /// Name of the function whose call propagated the error.
    pub callee: String,
    /// Path of the source file containing the call site.
    pub path: String,
    /// 1-based line number of the call site.
    pub line: usize,
}

/// A Phoenix runtime error carried through every executor's `Result`.
#[derive(Debug, Clone)]
pub(crate) struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    location: Option<Box<Location>>,
    trace: Vec<TraceFrame>,
}

impl RuntimeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: None,
            trace: Vec::new(),
        }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, message)
    }

    pub fn indent(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Indent, message)
    }

    pub fn parameters(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parameters, message)
    }

    /// An unsupported-operator error with an empty message.
    ///
    /// Value kind methods raise these blank; the expression evaluator fills
    /// in the operator symbol and operand type names before propagating.
    pub fn unsupported() -> Self {
        Self::new(ErrorKind::UnsupportedOperator, String::new())
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Error, message)
    }

    /// Attaches a source position if none has been recorded yet.
    ///
    /// Inner errors (operator dispatch, name lookup) are raised without
    /// position; the statement executor that knows the current line anchors
    /// them. An already-anchored error keeps its original position, so a
    /// fault inside a function body is never re-attributed to the call site.
    #[must_use]
    pub fn with_location(mut self, line: usize, text: &str) -> Self {
        if self.location.is_none() {
            self.location = Some(Box::new(Location {
                line,
                text: text.to_owned(),
            }));
        }
        self
    }

    /// Appends a function-call trace record during unwinding.
    pub fn push_trace(&mut self, callee: &str, path: &str, line: usize) {
        self.trace.push(TraceFrame {
            callee: callee.to_owned(),
            path: path.to_owned(),
            line,
        });
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_deref()
    }

    pub fn trace(&self) -> &[TraceFrame] {
        &self.trace
    }
}

/// Public error type returned by [`Runner`](crate::Runner) and
/// [`ReplSession`](crate::ReplSession).
///
/// `Display` produces the exact standard-error format:
///
/// ```text
/// Error: Division by zero
///     int z = 1 / 0
///     ... in divide (script.phx:12)
/// ```
#[derive(Debug, Clone)]
pub struct Exception {
    error: RuntimeError,
}

impl Exception {
    pub(crate) fn new(error: RuntimeError) -> Self {
        Self { error }
    }

    /// The error category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.error.kind
    }

    /// The error message without the category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.error.message
    }

    /// 1-based line number the error was raised on, if known.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        self.error.location().map(|loc| loc.line)
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error.kind, self.error.message)?;
        if let Some(location) = self.error.location() {
            write!(f, "\n    {}", location.text)?;
        }
        for frame in self.error.trace() {
            write!(f, "\n    ... in {} ({}:{})", frame.callee, frame.path, frame.line)?;
        }
        Ok(())
    }
}

impl std::error::Error for Exception {}
