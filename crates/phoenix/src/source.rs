//! Line-indexed source model.
//!
//! A loaded program is a list of [`SourceLine`]s. Each line owns its original
//! text, its leading indent string, its comment-stripped content, and a cache
//! that advances from *undefined* to *classified* on first execution: the
//! statement kind, the compiled payload, the continuation index, and any
//! setup error captured from the first classification attempt.
//!
//! Indentation is the only block delimiter. Indent strings compare by prefix
//! inclusion: `A` is greater than `B` iff `A` starts with `B` and `A != B`.

use std::{cell::RefCell, rc::Rc};

use crate::{
    error::{RunResult, RuntimeError},
    statement::{Payload, Statement},
    token::{TokenList, tokenize},
};

/// True if indent string `a` is strictly greater than `b` by prefix
/// inclusion.
pub(crate) fn indent_gt(a: &str, b: &str) -> bool {
    a.starts_with(b) && a != b
}

/// A program loaded into indexed lines, with one empty sentinel line
/// appended at the end.
#[derive(Debug)]
pub(crate) struct SourceModel {
    path: String,
    lines: Vec<SourceLine>,
}

impl SourceModel {
    pub fn new(code: &str, path: &str) -> Self {
        let mut lines: Vec<SourceLine> = code.lines().map(SourceLine::new).collect();
        lines.push(SourceLine::new(""));
        Self {
            path: path.to_owned(),
            lines,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Total number of lines, including the sentinel.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, index: usize) -> &SourceLine {
        &self.lines[index]
    }

    /// Index of the last line inside the block opened by the header at
    /// `header`.
    ///
    /// The block body is the maximal contiguous range after the header whose
    /// every non-empty line has indent strictly greater than the header's.
    /// Depends only on the indentation column sequence, never on content.
    pub fn block_end(&self, header: usize) -> usize {
        let header_indent = &self.lines[header].indent;
        let mut last = header;
        for (offset, line) in self.lines[header + 1..].iter().enumerate() {
            if !line.is_empty() && !indent_gt(&line.indent, header_indent) {
                break;
            }
            last = header + 1 + offset;
        }
        last
    }
}

/// One cached source line.
#[derive(Debug)]
pub(crate) struct SourceLine {
    /// Original text, used for diagnostics.
    pub text: String,
    /// Leading whitespace, any mix of spaces and tabs.
    pub indent: String,
    /// Comment-stripped, trimmed content.
    pub content: String,
    state: RefCell<LineState>,
}

/// Per-line cache filled in on first execution.
#[derive(Debug, Default)]
struct LineState {
    tokens: Option<Rc<TokenList>>,
    statement: Statement,
    payload: Option<Rc<Payload>>,
    /// Line index on which execution resumes after this statement finishes
    /// normally.
    continuation: Option<usize>,
    /// Error captured from the first classification attempt, re-raised on
    /// every execution so a faulty line fails deterministically.
    setup_error: Option<RuntimeError>,
}

impl SourceLine {
    fn new(text: &str) -> Self {
        let indent: String = text.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
        let content = strip_comment(text).trim().to_owned();
        Self {
            text: text.to_owned(),
            indent,
            content,
            state: RefCell::new(LineState::default()),
        }
    }

    /// True if nothing remains after comment stripping and trimming.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// The lazily computed token list, tokenizing at most once per line.
    pub fn tokens(&self) -> RunResult<Rc<TokenList>> {
        let mut state = self.state.borrow_mut();
        if let Some(tokens) = &state.tokens {
            return Ok(Rc::clone(tokens));
        }
        let tokens = Rc::new(tokenize(&self.content)?);
        state.tokens = Some(Rc::clone(&tokens));
        Ok(tokens)
    }

    pub fn statement(&self) -> Statement {
        self.state.borrow().statement
    }

    pub fn payload(&self) -> Option<Rc<Payload>> {
        self.state.borrow().payload.clone()
    }

    pub fn continuation(&self) -> Option<usize> {
        self.state.borrow().continuation
    }

    pub fn setup_error(&self) -> Option<RuntimeError> {
        self.state.borrow().setup_error.clone()
    }

    /// Stores the result of a successful classification.
    pub fn store_setup(&self, statement: Statement, payload: Option<Rc<Payload>>, continuation: usize) {
        let mut state = self.state.borrow_mut();
        state.statement = statement;
        state.payload = payload;
        state.continuation = Some(continuation);
    }

    /// Stores a failed classification for deterministic replay.
    pub fn store_setup_error(&self, error: RuntimeError) {
        self.state.borrow_mut().setup_error = Some(error);
    }
}

/// Removes a `//` comment, ignoring delimiters inside string literals.
fn strip_comment(text: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut previous_slash = false;
    for (index, c) in text.char_indices() {
        if escaped {
            escaped = false;
            previous_slash = false;
            continue;
        }
        match quote {
            Some(q) => match c {
                '\\' => escaped = true,
                _ if c == q => quote = None,
                _ => {}
            },
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    previous_slash = false;
                }
                '/' if previous_slash => return &text[..index - 1],
                '/' => previous_slash = true,
                _ => previous_slash = false,
            },
        }
    }
    text
}
