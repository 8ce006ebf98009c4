//! Scope table: nested frames plus one shared global frame.
//!
//! Lookup walks the local frames top-down and falls through to the global
//! frame. Declarations target the top frame, or the global frame when no
//! local frame is active (top-level code) and for function declarations.
//! Entering a function call *detaches* a fresh table that shares the global
//! frame with the declaration site but starts with an empty local stack.

use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;

use crate::{
    error::{RunResult, RuntimeError},
    token::{is_keyword, is_valid_identifier},
    value::Value,
};

/// One lexical scope's name-to-value mapping.
///
/// Insertion order is preserved, keeping diagnostics and REPL listings
/// deterministic.
pub(crate) type Frame = IndexMap<String, Value, ahash::RandomState>;

/// The full stack of frames plus the global frame owned by one
/// interpretation.
#[derive(Debug)]
pub(crate) struct ScopeTable {
    globals: Rc<RefCell<Frame>>,
    frames: Vec<Frame>,
}

impl ScopeTable {
    /// A table with a fresh, empty global frame.
    pub fn new() -> Self {
        Self::with_globals(Rc::new(RefCell::new(Frame::default())))
    }

    /// A table over an existing global frame (REPL sessions keep one alive
    /// across snippets).
    pub fn with_globals(globals: Rc<RefCell<Frame>>) -> Self {
        Self {
            globals,
            frames: Vec::new(),
        }
    }

    /// A second table sharing this table's global frame with an empty local
    /// stack. Used when entering a function call.
    pub fn detach_global(&self) -> Self {
        Self::with_globals(Rc::clone(&self.globals))
    }

    /// The shared global frame handle, captured by function values at
    /// declaration time.
    pub fn globals(&self) -> Rc<RefCell<Frame>> {
        Rc::clone(&self.globals)
    }

    pub fn push_frame(&mut self) {
        self.frames.push(Frame::default());
    }

    /// # Panics
    /// Panics when no local frame is active; push and pop must balance.
    pub fn pop_frame(&mut self) {
        self.frames.pop().expect("scope frame stack underflow");
    }

    /// True if `name` is bound in any visible frame.
    pub fn has(&self, name: &str) -> bool {
        self.frames.iter().rev().any(|frame| frame.contains_key(name)) || self.globals.borrow().contains_key(name)
    }

    /// Looks up `name`, walking local frames top-down then the global frame.
    pub fn get(&self, name: &str) -> Option<Value> {
        for frame in self.frames.iter().rev() {
            if let Some(value) = frame.get(name) {
                return Some(value.clone());
            }
        }
        self.globals.borrow().get(name).cloned()
    }

    /// Validates that `name` can be declared here: identifier shape, no
    /// keyword collision, and not already bound in any visible frame.
    pub fn check_declarable(&self, name: &str) -> RunResult<()> {
        if !is_valid_identifier(name) {
            return Err(RuntimeError::syntax(format!("Invalid name '{name}'")));
        }
        if is_keyword(name) {
            return Err(RuntimeError::syntax(format!("'{name}' is a reserved word")));
        }
        if self.has(name) {
            return Err(RuntimeError::syntax(format!("'{name}' is already declared")));
        }
        Ok(())
    }

    /// Inserts into the top frame, or the global frame at top level.
    ///
    /// The caller guarantees the name was validated with
    /// [`Self::check_declarable`].
    pub fn declare(&mut self, name: &str, value: Value) {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.insert(name.to_owned(), value);
            }
            None => {
                self.globals.borrow_mut().insert(name.to_owned(), value);
            }
        }
    }

    /// Inserts into the global frame regardless of the local stack. Used for
    /// function declarations.
    pub fn declare_global(&mut self, name: &str, value: Value) {
        self.globals.borrow_mut().insert(name.to_owned(), value);
    }

    /// Binds a function parameter into the top frame without visibility
    /// checks; parameters may shadow globals.
    ///
    /// # Panics
    /// Panics when no local frame is active.
    pub fn bind_parameter(&mut self, name: &str, value: Value) {
        self.frames
            .last_mut()
            .expect("parameter binding requires an argument frame")
            .insert(name.to_owned(), value);
    }

    /// Replaces the binding of an existing name, searching top-down then the
    /// global frame. Returns false when the name is not bound anywhere.
    pub fn rebind(&mut self, name: &str, value: Value) -> bool {
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.get_mut(name) {
                *slot = value;
                return true;
            }
        }
        if let Some(slot) = self.globals.borrow_mut().get_mut(name) {
            *slot = value;
            return true;
        }
        false
    }
}
