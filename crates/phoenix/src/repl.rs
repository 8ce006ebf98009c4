//! Persistent interactive session support.
//!
//! [`ReplSession`] keeps one global frame alive across `execute()` calls so
//! interactive snippets share variables and functions. Each snippet gets its
//! own source model; function values keep their defining model alive through
//! reference counting, so a function declared in one snippet remains
//! callable from every later one.

use std::{cell::RefCell, rc::Rc};

use crate::{
    error::Exception,
    interpret::{Flow, Interp},
    io::PrintWriter,
    resource::{LimitedTracker, ResourceTracker},
    scope::{Frame, ScopeTable},
    source::SourceModel,
    tracer::{ExecTracer, NoopTracer},
};

/// A persistent interactive session.
#[derive(Debug)]
pub struct ReplSession {
    path: String,
    globals: Rc<RefCell<Frame>>,
    /// Number of snippets executed, including failed ones.
    executed: usize,
}

impl ReplSession {
    /// Creates a session; `path` labels diagnostics (conventionally
    /// `"<stdin>"`).
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_owned(),
            globals: Rc::new(RefCell::new(Frame::default())),
            executed: 0,
        }
    }

    /// Number of snippets executed so far.
    #[must_use]
    pub fn executed(&self) -> usize {
        self.executed
    }

    /// Executes one snippet against the session's global frame, with the
    /// default resource limits.
    ///
    /// # Errors
    /// Returns the uncaught Phoenix error; the session stays usable and
    /// keeps every binding made before the error.
    pub fn execute(&mut self, code: &str, print: &mut impl PrintWriter) -> Result<(), Exception> {
        self.execute_with(code, print, LimitedTracker::default(), &mut NoopTracer)
    }

    /// Executes one snippet with explicit resource tracking and tracing.
    ///
    /// # Errors
    /// Returns the uncaught Phoenix error.
    pub fn execute_with(
        &mut self,
        code: &str,
        print: &mut impl PrintWriter,
        tracker: impl ResourceTracker,
        tracer: &mut impl ExecTracer,
    ) -> Result<(), Exception> {
        self.executed += 1;
        let source = Rc::new(SourceModel::new(code, &self.path));
        let mut tracker = tracker;
        let mut scopes = ScopeTable::with_globals(Rc::clone(&self.globals));
        let mut ctx = Interp::new(Rc::clone(&source), print, &mut tracker, tracer);
        let end = source.len() - 1;
        let escaped = |message: &str, line: usize| {
            Err(Exception::new(
                crate::error::RuntimeError::syntax(message).with_location(line + 1, &source.line(line).content),
            ))
        };
        match ctx.run_range(&mut scopes, 0, end).map_err(Exception::new)? {
            Flow::Normal => Ok(()),
            Flow::Break { line } => escaped("'break' outside of a loop", line),
            Flow::Continue { line } => escaped("'continue' outside of a loop", line),
            Flow::Return { line, .. } => escaped("'return' outside of a function", line),
        }
    }
}
