//! Public interface for running Phoenix source files.

use std::rc::Rc;

use crate::{
    error::{Exception, RuntimeError},
    interpret::{Flow, Interp},
    io::PrintWriter,
    resource::{NoLimitTracker, ResourceTracker},
    scope::ScopeTable,
    source::SourceModel,
    tracer::{ExecTracer, NoopTracer},
};

/// Primary interface for interpreting one Phoenix source file.
///
/// Loading indexes the source into lines; everything else (tokenizing,
/// classification, payload compilation) happens lazily on each line's first
/// execution and is cached, so running the same `Runner` twice replays the
/// caches without re-parsing.
///
/// # Example
/// ```
/// use phoenix::{CollectStringPrint, Runner};
///
/// let runner = Runner::new("print 1 + 2", "example.phx");
/// let mut print = CollectStringPrint::new();
/// runner.run_no_limits(&mut print).unwrap();
/// assert_eq!(print.output(), "3\n");
/// ```
#[derive(Debug)]
pub struct Runner {
    source: Rc<SourceModel>,
}

impl Runner {
    /// Loads a source string, stripping comments and indexing lines.
    #[must_use]
    pub fn new(code: &str, path: &str) -> Self {
        Self {
            source: Rc::new(SourceModel::new(code, path)),
        }
    }

    /// The path the source was loaded from, as shown in diagnostics.
    #[must_use]
    pub fn path(&self) -> &str {
        self.source.path()
    }

    /// Interprets the file once.
    ///
    /// Each run starts from a fresh global frame; the per-line compiled
    /// payloads persist across runs.
    ///
    /// # Errors
    /// Returns the uncaught Phoenix error; its `Display` output is the
    /// standard-error diagnostic text.
    pub fn run(
        &self,
        print: &mut impl PrintWriter,
        tracker: impl ResourceTracker,
        tracer: &mut impl ExecTracer,
    ) -> Result<(), Exception> {
        let mut tracker = tracker;
        let mut scopes = ScopeTable::new();
        let mut ctx = Interp::new(Rc::clone(&self.source), print, &mut tracker, tracer);
        let end = self.source.len() - 1;
        let flow = ctx.run_range(&mut scopes, 0, end).map_err(Exception::new)?;
        self.finish(flow)
    }

    /// Interprets the file once with no resource limits and no tracing.
    ///
    /// # Errors
    /// Returns the uncaught Phoenix error.
    pub fn run_no_limits(&self, print: &mut impl PrintWriter) -> Result<(), Exception> {
        self.run(print, NoLimitTracker, &mut NoopTracer)
    }

    /// Maps an end condition that escaped the whole file: only loops consume
    /// `break`/`continue` and only functions consume `return`.
    fn finish(&self, flow: Flow) -> Result<(), Exception> {
        let escaped = |message: &str, line: usize| {
            Err(Exception::new(
                RuntimeError::syntax(message).with_location(line + 1, &self.source.line(line).content),
            ))
        };
        match flow {
            Flow::Normal => Ok(()),
            Flow::Break { line } => escaped("'break' outside of a loop", line),
            Flow::Continue { line } => escaped("'continue' outside of a loop", line),
            Flow::Return { line, .. } => escaped("'return' outside of a function", line),
        }
    }
}
