//! Output handling for the `print` statement.
//!
//! All interpreter output flows through the [`PrintWriter`] trait so hosts
//! and tests can capture or suppress it. The default [`StdPrint`] buffers
//! into a thread-local and flushes on drop, keeping interleaving with
//! stderr diagnostics stable when output is redirected.

use std::{
    borrow::Cow,
    cell::RefCell,
    io::{self, Write as _},
};

/// Trait for handling output from the `print` statement.
///
/// Implement this trait to capture or redirect output from interpreted code.
/// The default implementation [`StdPrint`] writes to stdout.
pub trait PrintWriter {
    /// Called once with the formatted text of a printed value.
    ///
    /// This method writes only the value's text; the trailing newline is
    /// emitted separately via [`Self::stdout_push`].
    fn stdout_write(&mut self, output: Cow<'_, str>) -> io::Result<()>;

    /// Adds a single character to stdout.
    ///
    /// Called to terminate each `print` with a newline.
    fn stdout_push(&mut self, end: char) -> io::Result<()>;
}

/// Default `PrintWriter` that writes to stdout.
#[derive(Debug)]
pub struct StdPrint;

thread_local! {
    /// Thread-local stdout buffer for `StdPrint`.
    ///
    /// Buffering keeps stderr diagnostics (which are unbuffered) ahead of
    /// pending stdout lines when both streams go to the same terminal.
    static STDOUT_BUFFER: RefCell<String> = const { RefCell::new(String::new()) };
}

impl PrintWriter for StdPrint {
    fn stdout_write(&mut self, output: Cow<'_, str>) -> io::Result<()> {
        STDOUT_BUFFER.with(|buffer| buffer.borrow_mut().push_str(&output));
        Ok(())
    }

    fn stdout_push(&mut self, end: char) -> io::Result<()> {
        STDOUT_BUFFER.with(|buffer| buffer.borrow_mut().push(end));
        Ok(())
    }
}

impl Drop for StdPrint {
    fn drop(&mut self) {
        STDOUT_BUFFER.with(|buffer| {
            let mut buffer = buffer.borrow_mut();
            if buffer.is_empty() {
                return;
            }
            let _ = io::stdout().write_all(buffer.as_bytes());
            let _ = io::stdout().flush();
            buffer.clear();
        });
    }
}

/// A `PrintWriter` that collects all output into a string.
///
/// Useful for testing or capturing print output programmatically.
#[derive(Debug, Default)]
pub struct CollectStringPrint(String);

impl CollectStringPrint {
    /// Creates a new empty `CollectStringPrint`.
    #[must_use]
    pub fn new() -> Self {
        Self(String::new())
    }

    /// Returns the collected output as a string slice.
    #[must_use]
    pub fn output(&self) -> &str {
        self.0.as_str()
    }

    /// Consumes the writer and returns the collected output.
    #[must_use]
    pub fn into_output(self) -> String {
        self.0
    }
}

impl PrintWriter for CollectStringPrint {
    fn stdout_write(&mut self, output: Cow<'_, str>) -> io::Result<()> {
        self.0.push_str(&output);
        Ok(())
    }

    fn stdout_push(&mut self, end: char) -> io::Result<()> {
        self.0.push(end);
        Ok(())
    }
}

/// `PrintWriter` that ignores all output.
///
/// Useful for suppressing print output during testing or benchmarking.
#[derive(Debug, Default)]
pub struct NoPrint;

impl PrintWriter for NoPrint {
    fn stdout_write(&mut self, _output: Cow<'_, str>) -> io::Result<()> {
        Ok(())
    }

    fn stdout_push(&mut self, _end: char) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_string_print_accumulates() {
        let mut print = CollectStringPrint::new();
        print.stdout_write(Cow::Borrowed("120")).unwrap();
        print.stdout_push('\n').unwrap();
        print.stdout_write(Cow::Borrowed("void")).unwrap();
        print.stdout_push('\n').unwrap();
        assert_eq!(print.output(), "120\nvoid\n");
    }
}
