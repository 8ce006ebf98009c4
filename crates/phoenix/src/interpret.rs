//! Block executors and the top-level driver.
//!
//! Every executor follows one contract: interpret a line range and return a
//! [`Flow`] saying why it stopped. `Normal` resumes the enclosing driver at
//! the statement's continuation index; `Break` and `Continue` are consumed
//! by the innermost loop; `Return` is consumed by the function executor.
//! Anything that escapes to where it has no consumer is a syntax error.
//!
//! The driver walks its assigned range, rejects indentation increases that
//! no header justified, classifies lines on first visit, and dispatches on
//! the cached classification.

use std::{borrow::Cow, rc::Rc};

use crate::{
    error::{RunResult, RuntimeError},
    expressions::ExprTree,
    function::BoundFunction,
    io::PrintWriter,
    resource::ResourceTracker,
    scope::ScopeTable,
    source::{SourceModel, indent_gt},
    statement::{self, BlockRange, ForExec, ForInit, IfChain, LoopExec, Payload, Statement, TryExec},
    tracer::ExecTracer,
    value::{Value, ValueData},
};

/// Why an executor stopped: the end condition plus the line it arose on.
#[derive(Debug)]
pub(crate) enum Flow {
    Normal,
    Break { line: usize },
    Continue { line: usize },
    Return { line: usize, value: Option<Value> },
}

/// The interpreter context threaded through every executor.
///
/// Carries the current source model (function calls swap it for the callee's
/// and restore it), the current statement line for call-site tracing, and
/// the pluggable output, resource, and tracing hooks.
#[derive(Debug)]
pub(crate) struct Interp<'a, T: ResourceTracker, P: PrintWriter, Tr: ExecTracer> {
    pub source: Rc<SourceModel>,
    /// 0-based line index of the statement currently executing.
    pub line: usize,
    pub print: &'a mut P,
    pub tracker: &'a mut T,
    pub tracer: &'a mut Tr,
    /// Number of Phoenix calls on the host stack.
    pub call_depth: usize,
}

impl<'a, T: ResourceTracker, P: PrintWriter, Tr: ExecTracer> Interp<'a, T, P, Tr> {
    pub fn new(source: Rc<SourceModel>, print: &'a mut P, tracker: &'a mut T, tracer: &'a mut Tr) -> Self {
        Self {
            source,
            line: 0,
            print,
            tracker,
            tracer,
            call_depth: 0,
        }
    }

    /// The top-level driver: walks `start..=end` of the current source,
    /// dispatching each line by its cached classification.
    pub fn run_range(&mut self, scopes: &mut ScopeTable, start: usize, end: usize) -> RunResult<Flow> {
        let source = Rc::clone(&self.source);
        let mut previous: Option<usize> = None;
        let mut index = start;
        while index <= end && index < source.len() {
            let line = source.line(index);
            if line.is_empty() {
                index += 1;
                continue;
            }
            if let Some(prev) = previous {
                if indent_gt(&line.indent, &source.line(prev).indent) {
                    return Err(RuntimeError::indent("Unexpected indented block")
                        .with_location(index + 1, &line.content));
                }
            }
            previous = Some(index);
            statement::ensure_setup(&source, index, &mut *self.tracer)?;
            self.tracer.on_line(index + 1);
            self.tracker
                .on_step()
                .map_err(|e| RuntimeError::from(e).with_location(index + 1, &line.content))?;
            self.line = index;
            let statement = line.statement();
            let payload = line.payload();
            let continuation = line.continuation().unwrap_or(index + 1);
            let outcome = self
                .exec_statement(scopes, index, statement, payload.as_deref())
                .map_err(|e| e.with_location(index + 1, &line.content))?;
            match outcome {
                None => index = continuation,
                Some(flow) => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    /// Executes one classified line. `None` means fall through to the
    /// continuation index; `Some` surfaces an end condition to the parent.
    fn exec_statement(
        &mut self,
        scopes: &mut ScopeTable,
        index: usize,
        statement: Statement,
        payload: Option<&Payload>,
    ) -> RunResult<Option<Flow>> {
        match statement {
            Statement::Empty | Statement::Undefined => return Ok(None),
            Statement::Break => return Ok(Some(Flow::Break { line: index })),
            Statement::Continue => return Ok(Some(Flow::Continue { line: index })),
            _ => {}
        }
        let payload = payload.expect("a classified statement always carries its payload");
        match payload {
            Payload::Print(expr) => {
                if let Some(expr) = expr {
                    let value = self.eval(scopes, expr)?;
                    self.print
                        .stdout_write(Cow::Owned(value.to_string()))
                        .map_err(io_error)?;
                }
                self.print.stdout_push('\n').map_err(io_error)?;
                Ok(None)
            }
            Payload::Expr(expr) => {
                self.eval(scopes, expr)?;
                Ok(None)
            }
            Payload::Init { type_name, name, expr } => {
                self.exec_init(scopes, type_name, name, expr)?;
                Ok(None)
            }
            Payload::Return(expr) => {
                let value = match expr {
                    Some(expr) => Some(self.eval(scopes, expr)?.deref_clone()),
                    None => None,
                };
                Ok(Some(Flow::Return { line: index, value }))
            }
            Payload::Function { name, def } => {
                scopes.check_declarable(name)?;
                let function = BoundFunction {
                    def: Rc::clone(def),
                    globals: scopes.globals(),
                };
                scopes.declare_global(name, Value::variable(ValueData::Function(Rc::new(function))));
                Ok(None)
            }
            Payload::If(chain) => Ok(flow_outcome(self.exec_if(scopes, chain)?)),
            Payload::Loop(exec) => Ok(flow_outcome(self.exec_loop(scopes, exec)?)),
            Payload::For(exec) => Ok(flow_outcome(self.exec_for(scopes, exec)?)),
            Payload::Try(exec) => Ok(flow_outcome(self.exec_try(scopes, exec)?)),
        }
    }

    /// Declares a new variable, checking the declared type against the
    /// evaluated value's type name.
    fn exec_init(&mut self, scopes: &mut ScopeTable, type_name: &str, name: &str, expr: &ExprTree) -> RunResult<()> {
        scopes.check_declarable(name)?;
        let value = self.eval(scopes, expr)?.deref_clone();
        let got = value.type_name();
        if got != type_name {
            return Err(RuntimeError::syntax(format!(
                "Variable {name} expected type {type_name} but got {got}"
            )));
        }
        scopes.declare(name, value.into_variable());
        Ok(())
    }

    /// If-chain: the first true predicate's body runs; all predicates must
    /// be bools. The sub-executor's end condition propagates verbatim.
    fn exec_if(&mut self, scopes: &mut ScopeTable, chain: &IfChain) -> RunResult<Flow> {
        for (predicate, body) in &chain.arms {
            if self.eval_condition(scopes, predicate)? {
                return self.run_range(scopes, body.start, body.end);
            }
        }
        if let Some(body) = &chain.else_body {
            return self.run_range(scopes, body.start, body.end);
        }
        Ok(Flow::Normal)
    }

    fn exec_loop(&mut self, scopes: &mut ScopeTable, exec: &LoopExec) -> RunResult<Flow> {
        self.run_loop(
            scopes,
            &exec.predicate,
            exec.check_at_start,
            exec.end_value,
            exec.body,
            exec.otherwise.as_ref(),
            None,
        )
    }

    /// For: a fresh scope around init, the loop contract with the condition
    /// as predicate, and the step as the end-of-iteration hook. The scope
    /// pops on every exit path.
    fn exec_for(&mut self, scopes: &mut ScopeTable, exec: &ForExec) -> RunResult<Flow> {
        scopes.push_frame();
        let result = self.run_for(scopes, exec);
        scopes.pop_frame();
        result
    }

    fn run_for(&mut self, scopes: &mut ScopeTable, exec: &ForExec) -> RunResult<Flow> {
        match &exec.init {
            ForInit::Decl { type_name, name, expr } => self.exec_init(scopes, type_name, name, expr)?,
            ForInit::Expr(expr) => {
                self.eval(scopes, expr)?;
            }
        }
        self.run_loop(
            scopes,
            &exec.cond,
            true,
            false,
            exec.body,
            exec.otherwise.as_ref(),
            Some(&exec.step),
        )
    }

    /// The shared loop contract.
    ///
    /// Within one iteration the body's `Break` becomes the loop's `Normal`,
    /// `Continue` is swallowed after the end-of-iteration hook runs, and
    /// `Return` propagates. The `otherwise` body runs only when a
    /// begin-checked loop never executed its body.
    #[expect(clippy::too_many_arguments, reason = "the loop contract is one seam with two callers")]
    fn run_loop(
        &mut self,
        scopes: &mut ScopeTable,
        predicate: &ExprTree,
        check_at_start: bool,
        end_value: bool,
        body: BlockRange,
        otherwise: Option<&BlockRange>,
        hook: Option<&ExprTree>,
    ) -> RunResult<Flow> {
        let mut ran_body = false;
        loop {
            if check_at_start && self.eval_condition(scopes, predicate)? == end_value {
                break;
            }
            ran_body = true;
            match self.run_range(scopes, body.start, body.end)? {
                Flow::Normal | Flow::Continue { .. } => {}
                Flow::Break { .. } => return Ok(Flow::Normal),
                ret @ Flow::Return { .. } => return Ok(ret),
            }
            if let Some(step) = hook {
                self.eval(scopes, step)?;
            }
            if !check_at_start && self.eval_condition(scopes, predicate)? == end_value {
                return Ok(Flow::Normal);
            }
        }
        if !ran_body {
            if let Some(body) = otherwise {
                return self.run_range(scopes, body.start, body.end);
            }
        }
        Ok(Flow::Normal)
    }

    /// Try/catch: any runtime error escaping the try body routes to the
    /// catch body. The end condition is whichever body completed.
    fn exec_try(&mut self, scopes: &mut ScopeTable, exec: &TryExec) -> RunResult<Flow> {
        match self.run_range(scopes, exec.body.start, exec.body.end) {
            Ok(flow) => Ok(flow),
            Err(err) => {
                self.tracer.on_caught(err.kind);
                // the captured error is consumed here; the core defines no
                // user-visible binding for it
                self.run_range(scopes, exec.catch.start, exec.catch.end)
            }
        }
    }

    fn eval_condition(&mut self, scopes: &mut ScopeTable, predicate: &ExprTree) -> RunResult<bool> {
        let value = self.eval(scopes, predicate)?.deref_clone();
        match &value.data {
            ValueData::Bool(b) => Ok(*b),
            _ => Err(RuntimeError::syntax(format!(
                "Expected a bool condition but got {}",
                value.type_name()
            ))),
        }
    }
}

fn flow_outcome(flow: Flow) -> Option<Flow> {
    match flow {
        Flow::Normal => None,
        other => Some(other),
    }
}

fn io_error(err: std::io::Error) -> RuntimeError {
    RuntimeError::runtime(format!("stdout: {err}"))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::rc::Rc;

    use super::Interp;
    use crate::{io::NoPrint, resource::NoLimitTracker, source::SourceModel, tracer::NoopTracer};

    /// Runs a closure with a throwaway interpreter context over an empty
    /// source model, for expression-level unit tests.
    pub(crate) fn with_interp<R>(f: impl FnOnce(&mut Interp<'_, NoLimitTracker, NoPrint, NoopTracer>) -> R) -> R {
        let source = Rc::new(SourceModel::new("", "test.phx"));
        let mut print = NoPrint;
        let mut tracker = NoLimitTracker;
        let mut tracer = NoopTracer;
        let mut ctx = Interp::new(source, &mut print, &mut tracker, &mut tracer);
        f(&mut ctx)
    }
}
