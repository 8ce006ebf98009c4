//! A tree-walking interpreter for the Phoenix programming language.
//!
//! Phoenix is a small imperative language with indentation-delimited
//! blocks, statically named but dynamically typed variables, and functions
//! that take argument lists on both sides of their name:
//!
//! ```text
//! function long (int n) factorial:
//!     long result = 1l
//!     for int i = 2; i <= n; i += 1:
//!         result *= i
//!     return result
//!
//! print (5) factorial
//! ```
//!
//! The interpreter's core invariant is the setup/execute split: every source
//! line is tokenized and classified exactly once, on its first execution,
//! and the compiled per-line payload replays on every later execution (loop
//! iterations, function calls) without re-parsing.
//!
//! Embedders drive the interpreter through [`Runner`] (one source file) or
//! [`ReplSession`] (persistent interactive state), plugging in a
//! [`PrintWriter`] for output, a [`ResourceTracker`] for limits, and an
//! [`ExecTracer`] for observability.

mod error;
mod expressions;
mod function;
mod interpret;
mod io;
mod repl;
mod resource;
mod run;
mod scope;
mod source;
mod statement;
mod token;
mod tracer;
mod value;

pub use crate::{
    error::{ErrorKind, Exception},
    io::{CollectStringPrint, NoPrint, PrintWriter, StdPrint},
    repl::ReplSession,
    resource::{
        DEFAULT_MAX_RECURSION_DEPTH, LimitedTracker, NoLimitTracker, ResourceError, ResourceLimits, ResourceTracker,
    },
    run::Runner,
    tracer::{ExecTracer, NoopTracer, RecordingTracer, StderrTracer, TraceEvent},
};
