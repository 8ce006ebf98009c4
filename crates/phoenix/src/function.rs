//! Function definitions, call validation, and the function executor.
//!
//! A Phoenix function carries argument lists on both sides of its name:
//!
//! ```text
//! function long (int n) factorial:
//! function int (int a) plus (int b):
//! ```
//!
//! Declarations compile once into a [`FunctionDef`]; executing the
//! declaration line binds it to the declaration site's global frame as a
//! [`BoundFunction`]. Calling validates each passed side against the
//! declared list (arity plus exact type-name equality), detaches a fresh
//! scope table over those globals, binds parameters as reference wrappers,
//! and interprets the body lines through the shared driver.

use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    error::{RunResult, RuntimeError},
    interpret::{Flow, Interp},
    io::PrintWriter,
    resource::ResourceTracker,
    scope::{Frame, ScopeTable},
    source::SourceModel,
    tracer::ExecTracer,
    value::{Value, ValueData},
};

/// One declared parameter.
#[derive(Debug, Clone)]
pub(crate) struct Param {
    pub type_name: String,
    /// Name as written in the declaration, absent for type-only entries.
    pub declared_name: Option<String>,
    /// Name the argument binds to in the call frame. Unnamed parameters
    /// receive the implicit names `n`, `n2`, `n3`, ... in declaration order.
    pub bind_name: String,
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.declared_name {
            Some(name) => write!(f, "{} {name}", self.type_name),
            None => write!(f, "{}", self.type_name),
        }
    }
}

/// A compiled function declaration: signature plus body line range.
///
/// `Debug` is implemented by hand; the definition holds the source model
/// whose lines can hold this definition right back.
pub(crate) struct FunctionDef {
    pub name: String,
    /// Declared return type name; `"void"` when no return type was written.
    pub return_type: String,
    /// Left argument list; `None` when the side was not declared at all,
    /// `Some(vec![])` for an explicitly empty `()`.
    pub left: Option<Vec<Param>>,
    pub right: Option<Vec<Param>>,
    /// Inclusive body line range; `body_start > body_end` for an empty body.
    pub body_start: usize,
    pub body_end: usize,
    pub source: Rc<SourceModel>,
    /// 0-based line index of the declaration header.
    pub header_line: usize,
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDef")
            .field("signature", &self.signature())
            .field("body", &(self.body_start..=self.body_end))
            .finish_non_exhaustive()
    }
}

impl FunctionDef {
    /// The declaration signature, used when a function value is printed.
    pub fn signature(&self) -> String {
        let mut text = format!("function {}", self.return_type);
        if let Some(params) = &self.left {
            text.push_str(&format!(" ({})", join_params(params)));
        }
        text.push_str(&format!(" {}", self.name));
        if let Some(params) = &self.right {
            text.push_str(&format!(" ({})", join_params(params)));
        }
        text
    }
}

fn join_params(params: &[Param]) -> String {
    params.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// A function definition bound to its declaration site's global frame.
pub(crate) struct BoundFunction {
    pub def: Rc<FunctionDef>,
    pub globals: Rc<RefCell<Frame>>,
}

impl fmt::Debug for BoundFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the globals frame can reach this function again; print the
        // signature only
        write!(f, "BoundFunction({})", self.def.signature())
    }
}

/// Validates one passed side against its declared parameter list and
/// returns the values to bind, in declaration order.
fn validate_side(
    params: Option<&[Param]>,
    passed: Option<&Value>,
    function_name: &str,
    side: &str,
) -> RunResult<Vec<Value>> {
    let declared: &[Param] = params.unwrap_or(&[]);
    let count = declared.len();
    let Some(passed) = passed else {
        if count == 0 {
            return Ok(Vec::new());
        }
        return Err(RuntimeError::parameters(format!(
            "Function {function_name} expects {count} {side} arguments but got none"
        )));
    };
    let passed = passed.deref_clone();
    match (&passed.data, count) {
        (ValueData::Tuple(items), 0) if items.is_empty() => Ok(Vec::new()),
        (_, 0) => Err(RuntimeError::parameters(format!(
            "Function {function_name} expects no {side} arguments"
        ))),
        (ValueData::Tuple(_), 1) => Err(RuntimeError::parameters(format!(
            "Function {function_name} expects a single {side} argument, not a tuple"
        ))),
        (_, 1) => {
            check_param_type(&declared[0], &passed, function_name)?;
            Ok(vec![passed])
        }
        (ValueData::Tuple(items), _) => {
            if items.len() != count {
                return Err(RuntimeError::parameters(format!(
                    "Function {function_name} expects {count} {side} arguments but got {}",
                    items.len()
                )));
            }
            for (param, value) in declared.iter().zip(items) {
                check_param_type(param, value, function_name)?;
            }
            Ok(items.clone())
        }
        (_, _) => Err(RuntimeError::parameters(format!(
            "Function {function_name} expects {count} {side} arguments but got one"
        ))),
    }
}

/// Exact type-name equality is the sole matching rule.
fn check_param_type(param: &Param, value: &Value, function_name: &str) -> RunResult<()> {
    let got = value.type_name();
    if got == param.type_name {
        Ok(())
    } else {
        Err(RuntimeError::parameters(format!(
            "Function {function_name} expected {} for parameter {} but got {got}",
            param.type_name, param.bind_name
        )))
    }
}

impl<T: ResourceTracker, P: PrintWriter, Tr: ExecTracer> Interp<'_, T, P, Tr> {
    /// Calls a function value with the evaluated left and right argument
    /// lists (`None` for an absent side).
    pub(crate) fn call_function(
        &mut self,
        function: &Rc<BoundFunction>,
        left: Option<Value>,
        right: Option<Value>,
    ) -> RunResult<Value> {
        let def = &function.def;
        let left_values = validate_side(def.left.as_deref(), left.as_ref(), &def.name, "left")?;
        let right_values = validate_side(def.right.as_deref(), right.as_ref(), &def.name, "right")?;
        self.tracker
            .check_recursion_depth(self.call_depth)
            .map_err(RuntimeError::from)?;

        let mut scopes = ScopeTable::with_globals(Rc::clone(&function.globals));
        scopes.push_frame();
        let declared = def.left.iter().flatten().chain(def.right.iter().flatten());
        for (param, value) in declared.zip(left_values.into_iter().chain(right_values)) {
            scopes.bind_parameter(&param.bind_name, value.into_parameter());
        }

        let call_line = self.line;
        let call_source = Rc::clone(&self.source);
        let saved_source = std::mem::replace(&mut self.source, Rc::clone(&def.source));
        self.call_depth += 1;
        self.tracer.on_call(&def.name, self.call_depth);
        let result = self.run_range(&mut scopes, def.body_start, def.body_end);
        self.call_depth -= 1;
        self.tracer.on_return(self.call_depth);
        self.source = saved_source;
        self.line = call_line;

        let flow = match result {
            Ok(flow) => flow,
            Err(mut err) => {
                err.push_trace(&def.name, call_source.path(), call_line + 1);
                return Err(err);
            }
        };
        finish_call(def, flow).map_err(|mut err| {
            err.push_trace(&def.name, call_source.path(), call_line + 1);
            err
        })
    }
}

/// Applies the body-end policy once the body finished interpreting.
fn finish_call(def: &Rc<FunctionDef>, flow: Flow) -> RunResult<Value> {
    let located = |err: RuntimeError, line: usize| {
        err.with_location(line + 1, &def.source.line(line).content)
    };
    match flow {
        Flow::Normal => {
            if def.return_type == "void" {
                Ok(Value::literal(ValueData::Void))
            } else {
                Err(located(
                    RuntimeError::syntax(format!(
                        "Function expected to return {} but did not return a value",
                        def.return_type
                    )),
                    def.header_line,
                ))
            }
        }
        Flow::Break { line } => Err(located(RuntimeError::syntax("'break' outside of a loop"), line)),
        Flow::Continue { line } => {
            Err(located(RuntimeError::syntax("'continue' outside of a loop"), line))
        }
        Flow::Return { value: None, line } => {
            if def.return_type == "void" {
                Ok(Value::literal(ValueData::Void))
            } else {
                Err(located(
                    RuntimeError::syntax(format!(
                        "Function expected to return {} but did not return a value",
                        def.return_type
                    )),
                    line,
                ))
            }
        }
        Flow::Return {
            value: Some(value),
            line,
        } => {
            let value = value.deref_clone();
            if def.return_type == "void" {
                return Err(located(
                    RuntimeError::syntax("Void function cannot return a value"),
                    line,
                ));
            }
            let got = value.type_name();
            if got != def.return_type {
                return Err(located(
                    RuntimeError::syntax(format!(
                        "Function expected to return {} but returned {got}",
                        def.return_type
                    )),
                    line,
                ));
            }
            Ok(Value::literal(value.data))
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn param(type_name: &str, name: &str) -> Param {
        Param {
            type_name: type_name.to_owned(),
            declared_name: Some(name.to_owned()),
            bind_name: name.to_owned(),
        }
    }

    fn unnamed(type_name: &str, bind: &str) -> Param {
        Param {
            type_name: type_name.to_owned(),
            declared_name: None,
            bind_name: bind.to_owned(),
        }
    }

    fn int(v: i32) -> Value {
        Value::literal(ValueData::Int(v))
    }

    #[test]
    fn signature_formats_like_the_declaration() {
        let def = FunctionDef {
            name: "plus".to_owned(),
            return_type: "int".to_owned(),
            left: Some(vec![param("int", "a")]),
            right: Some(vec![param("int", "b")]),
            body_start: 1,
            body_end: 0,
            source: Rc::new(SourceModel::new("", "test.phx")),
            header_line: 0,
        };
        assert_eq!(def.signature(), "function int (int a) plus (int b)");

        let def = FunctionDef {
            name: "factorial".to_owned(),
            return_type: "long".to_owned(),
            left: Some(vec![unnamed("int", "n")]),
            right: None,
            body_start: 1,
            body_end: 0,
            source: Rc::new(SourceModel::new("", "test.phx")),
            header_line: 0,
        };
        assert_eq!(def.signature(), "function long (int) factorial");
    }

    #[test]
    fn zero_parameter_side_accepts_absent_or_empty() {
        assert!(validate_side(None, None, "f", "left").unwrap().is_empty());
        let empty = Value::literal(ValueData::Tuple(Vec::new()));
        assert!(validate_side(Some(&[]), Some(&empty), "f", "left").unwrap().is_empty());
        assert!(validate_side(None, Some(&int(1)), "f", "left").is_err());
    }

    #[test]
    fn single_parameter_side_rejects_tuples() {
        let params = [param("int", "a")];
        assert!(validate_side(Some(&params), Some(&int(1)), "f", "left").is_ok());
        let tuple = Value::literal(ValueData::Tuple(vec![int(1)]));
        assert!(validate_side(Some(&params), Some(&tuple), "f", "left").is_err());
        assert!(validate_side(Some(&params), None, "f", "left").is_err());
    }

    #[test]
    fn multi_parameter_side_requires_matching_tuple() {
        let params = [param("int", "a"), param("str", "b")];
        let ok = Value::literal(ValueData::Tuple(vec![
            int(1),
            Value::literal(ValueData::Str("x".to_owned())),
        ]));
        assert_eq!(validate_side(Some(&params), Some(&ok), "f", "left").unwrap().len(), 2);

        let short = Value::literal(ValueData::Tuple(vec![int(1)]));
        assert!(validate_side(Some(&params), Some(&short), "f", "left").is_err());
        assert!(validate_side(Some(&params), Some(&int(1)), "f", "left").is_err());

        let wrong_type = Value::literal(ValueData::Tuple(vec![int(1), int(2)]));
        let err = validate_side(Some(&params), Some(&wrong_type), "f", "left").unwrap_err();
        assert!(err.message.contains("expected str"), "got {}", err.message);
    }

    #[test]
    fn type_matching_is_by_exact_name() {
        let params = [param("long", "a")];
        let err = validate_side(Some(&params), Some(&int(1)), "f", "left").unwrap_err();
        assert!(err.message.contains("expected long"), "got {}", err.message);
    }
}
