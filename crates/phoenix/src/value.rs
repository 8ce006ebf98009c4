//! Runtime values and polymorphic operator dispatch.
//!
//! [`Value`] is the single tagged variant for every Phoenix runtime value.
//! Operators dispatch on the runtime kinds of their operands through plain
//! `match` tables; anything not covered falls through to a blank
//! unsupported-operator error that the expression evaluator decorates with
//! the operator symbol and operand type names.
//!
//! Numeric kinds form a promotion lattice (`int` + `double` -> `double`,
//! `int` + `long` -> `long`, `long` + `double` -> `double`); every numeric
//! operator promotes both operands first and computes in the promoted kind.

use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    error::{RunResult, RuntimeError},
    expressions::{BinaryOp, UnaryOp},
    function::BoundFunction,
};

/// A Phoenix runtime value: a kind tag plus the literal flag.
///
/// The literal flag marks values produced by a literal token or computed by
/// an operator. Only non-literal values (those read out of a scope frame)
/// are acceptable assignment targets.
#[derive(Debug, Clone)]
pub(crate) struct Value {
    pub data: ValueData,
    pub literal: bool,
}

/// The kind-tagged payload of a [`Value`].
#[derive(Debug, Clone)]
pub(crate) enum ValueData {
    Int(i32),
    Long(i64),
    Double(f64),
    Bool(bool),
    Str(String),
    /// A type value; the payload is the type name it carries.
    Type(String),
    /// Ordered, possibly heterogeneous sequence. Only constructible from
    /// parenthesized comma-separated expressions.
    Tuple(Vec<Value>),
    /// Homogeneous sequence; `elem_type` is the type name of every element.
    Array { elem_type: String, items: Vec<Value> },
    Function(Rc<BoundFunction>),
    /// Transparent wrapper used for function parameters. Every operator
    /// delegates to the referent; plain assignment is rejected.
    Reference(Rc<RefCell<Value>>),
    /// Result of calling a function with no declared return type.
    Void,
}

impl Value {
    /// A value produced by a literal token or an operator.
    pub fn literal(data: ValueData) -> Self {
        Self { data, literal: true }
    }

    /// A value suitable for storing in a scope frame.
    pub fn variable(data: ValueData) -> Self {
        Self { data, literal: false }
    }

    /// Clears the literal flag, making the value an acceptable frame binding.
    #[must_use]
    pub fn into_variable(mut self) -> Self {
        self.literal = false;
        self
    }

    /// Wraps a fresh copy of this value in a [`ValueData::Reference`].
    ///
    /// Used when binding function parameters: the callee sees through the
    /// wrapper in every operator, but plain assignment to the parameter is
    /// rejected and the caller's binding is never aliased.
    #[must_use]
    pub fn into_parameter(self) -> Self {
        let referent = self.deref_clone().into_variable();
        Self::variable(ValueData::Reference(Rc::new(RefCell::new(referent))))
    }

    /// The type name used for function-argument matching and diagnostics.
    pub fn type_name(&self) -> String {
        match &self.data {
            ValueData::Int(_) => "int".to_owned(),
            ValueData::Long(_) => "long".to_owned(),
            ValueData::Double(_) => "double".to_owned(),
            ValueData::Bool(_) => "bool".to_owned(),
            ValueData::Str(_) => "str".to_owned(),
            ValueData::Type(_) => "type".to_owned(),
            ValueData::Tuple(_) => "tuple".to_owned(),
            ValueData::Array { elem_type, .. } => format!("[{elem_type}]"),
            ValueData::Function(_) => "function".to_owned(),
            ValueData::Reference(cell) => cell.borrow().type_name(),
            ValueData::Void => "void".to_owned(),
        }
    }

    /// Follows reference wrappers and returns an owned copy of the referent.
    #[must_use]
    pub fn deref_clone(&self) -> Self {
        match &self.data {
            ValueData::Reference(cell) => cell.borrow().deref_clone(),
            _ => self.clone(),
        }
    }

    /// True if this value is a reference wrapper.
    pub fn is_reference(&self) -> bool {
        matches!(self.data, ValueData::Reference(_))
    }

    /// Applies a binary operator, dispatching on both operand kinds.
    ///
    /// References are transparent: either side delegates to its referent.
    /// Unsupported combinations raise a blank unsupported-operator error for
    /// the evaluator to decorate.
    pub fn binary_op(&self, op: BinaryOp, right: &Self) -> RunResult<Self> {
        if let ValueData::Reference(cell) = &self.data {
            return cell.borrow().binary_op(op, right);
        }
        if let ValueData::Reference(cell) = &right.data {
            let referent = cell.borrow();
            return self.binary_op(op, &referent);
        }
        match op {
            BinaryOp::Add => self.add(right),
            BinaryOp::Sub => self.numeric_op(right, i32::wrapping_sub, i64::wrapping_sub, |a, b| a - b),
            BinaryOp::Mul => self.mul(right),
            BinaryOp::Div => self.div(right),
            BinaryOp::Rem => self.rem(right),
            BinaryOp::Pow => self.pow(right),
            BinaryOp::Eq => Ok(Self::literal(ValueData::Bool(self.equals(right)?))),
            BinaryOp::NotEq => Ok(Self::literal(ValueData::Bool(!self.equals(right)?))),
            BinaryOp::Lt => self.ordering_op(right, |a, b| a < b, |a, b| a < b),
            BinaryOp::LtE => self.ordering_op(right, |a, b| a <= b, |a, b| a <= b),
            BinaryOp::Gt => self.ordering_op(right, |a, b| a > b, |a, b| a > b),
            BinaryOp::GtE => self.ordering_op(right, |a, b| a >= b, |a, b| a >= b),
            BinaryOp::And => self.logic(right, |a, b| a && b),
            BinaryOp::Or => self.logic(right, |a, b| a || b),
        }
    }

    /// Applies a prefix unary operator.
    pub fn unary_op(&self, op: UnaryOp) -> RunResult<Self> {
        if let ValueData::Reference(cell) = &self.data {
            return cell.borrow().unary_op(op);
        }
        match (op, &self.data) {
            (UnaryOp::Neg, ValueData::Int(v)) => Ok(Self::literal(ValueData::Int(v.wrapping_neg()))),
            (UnaryOp::Neg, ValueData::Long(v)) => Ok(Self::literal(ValueData::Long(v.wrapping_neg()))),
            (UnaryOp::Neg, ValueData::Double(v)) => Ok(Self::literal(ValueData::Double(-v))),
            (UnaryOp::Not, ValueData::Bool(v)) => Ok(Self::literal(ValueData::Bool(!v))),
            _ => Err(RuntimeError::unsupported()),
        }
    }

    /// Merges an assigned value into this binding.
    ///
    /// Assignment is defined only between identical type names; for arrays
    /// that rule covers the required identical element-type strings. The
    /// incoming value is dereferenced so parameters assign their referent's
    /// copy, never an alias.
    pub fn assign_from(&self, incoming: &Self) -> RunResult<Self> {
        let incoming = incoming.deref_clone();
        if matches!(incoming.data, ValueData::Void) {
            return Err(RuntimeError::unsupported());
        }
        if self.type_name() == incoming.type_name() {
            Ok(incoming.into_variable())
        } else {
            Err(RuntimeError::unsupported())
        }
    }

    /// Indexes a tuple or array by calling it with an integer.
    pub fn index(&self, index: &Self) -> RunResult<Self> {
        let items = match &self.data {
            ValueData::Tuple(items) | ValueData::Array { items, .. } => items,
            ValueData::Reference(cell) => return cell.borrow().index(index),
            _ => return Err(RuntimeError::syntax(format!("Value of type {} is not callable", self.type_name()))),
        };
        let raw = match index.deref_clone().data {
            ValueData::Int(v) => i64::from(v),
            ValueData::Long(v) => v,
            _ => {
                return Err(RuntimeError::syntax(format!(
                    "Expected an integer index but got {}",
                    index.type_name()
                )));
            }
        };
        let position = usize::try_from(raw).ok().and_then(|i| items.get(i));
        match position {
            Some(item) => Ok(Self::literal(item.deref_clone().data)),
            None => Err(RuntimeError::runtime(format!(
                "Index {raw} out of range for {} of length {}",
                if matches!(self.data, ValueData::Tuple(_)) { "tuple" } else { "array" },
                items.len()
            ))),
        }
    }

    fn add(&self, right: &Self) -> RunResult<Self> {
        // String concatenation before numeric promotion: int + str and
        // long + str stringify the left operand, str + anything printable
        // stringifies the right.
        match (&self.data, &right.data) {
            (ValueData::Str(l), r) if !matches!(r, ValueData::Void) => {
                Ok(Self::literal(ValueData::Str(format!("{l}{right}"))))
            }
            (ValueData::Int(_) | ValueData::Long(_), ValueData::Str(r)) => {
                Ok(Self::literal(ValueData::Str(format!("{self}{r}"))))
            }
            _ => self.numeric_op(right, i32::wrapping_add, i64::wrapping_add, |a, b| a + b),
        }
    }

    fn mul(&self, right: &Self) -> RunResult<Self> {
        match (&self.data, &right.data) {
            (ValueData::Int(count), ValueData::Str(s)) | (ValueData::Str(s), ValueData::Int(count)) => {
                repeat_str(s, i64::from(*count))
            }
            _ => self.numeric_op(right, i32::wrapping_mul, i64::wrapping_mul, |a, b| a * b),
        }
    }

    fn div(&self, right: &Self) -> RunResult<Self> {
        match self.numeric_pair(right) {
            Some(NumericPair::Int(_, 0)) | Some(NumericPair::Long(_, 0)) => {
                Err(RuntimeError::runtime("Division by zero"))
            }
            Some(NumericPair::Int(a, b)) => Ok(Self::literal(ValueData::Int(a.wrapping_div(b)))),
            Some(NumericPair::Long(a, b)) => Ok(Self::literal(ValueData::Long(a.wrapping_div(b)))),
            Some(NumericPair::Double(a, b)) => Ok(Self::literal(ValueData::Double(a / b))),
            None => Err(RuntimeError::unsupported()),
        }
    }

    fn rem(&self, right: &Self) -> RunResult<Self> {
        match self.numeric_pair(right) {
            Some(NumericPair::Int(_, 0)) | Some(NumericPair::Long(_, 0)) => {
                Err(RuntimeError::runtime("Modulo by zero"))
            }
            Some(NumericPair::Int(a, b)) => Ok(Self::literal(ValueData::Int(a.wrapping_rem(b)))),
            Some(NumericPair::Long(a, b)) => Ok(Self::literal(ValueData::Long(a.wrapping_rem(b)))),
            Some(NumericPair::Double(a, b)) => Ok(Self::literal(ValueData::Double(a % b))),
            None => Err(RuntimeError::unsupported()),
        }
    }

    fn pow(&self, right: &Self) -> RunResult<Self> {
        match self.numeric_pair(right) {
            Some(NumericPair::Int(a, b)) => {
                if b < 0 {
                    return Err(RuntimeError::runtime("Negative exponent"));
                }
                Ok(Self::literal(ValueData::Int(a.wrapping_pow(b.unsigned_abs()))))
            }
            Some(NumericPair::Long(a, b)) => {
                if b < 0 {
                    return Err(RuntimeError::runtime("Negative exponent"));
                }
                let exp = u32::try_from(b).unwrap_or(u32::MAX);
                Ok(Self::literal(ValueData::Long(a.wrapping_pow(exp))))
            }
            Some(NumericPair::Double(a, b)) => Ok(Self::literal(ValueData::Double(a.powf(b)))),
            None => Err(RuntimeError::unsupported()),
        }
    }

    fn logic(&self, right: &Self, op: fn(bool, bool) -> bool) -> RunResult<Self> {
        match (&self.data, &right.data) {
            (ValueData::Bool(a), ValueData::Bool(b)) => Ok(Self::literal(ValueData::Bool(op(*a, *b)))),
            _ => Err(RuntimeError::unsupported()),
        }
    }

    fn ordering_op(
        &self,
        right: &Self,
        int_op: fn(i64, i64) -> bool,
        double_op: fn(f64, f64) -> bool,
    ) -> RunResult<Self> {
        let result = match self.numeric_pair(right) {
            Some(NumericPair::Int(a, b)) => int_op(i64::from(a), i64::from(b)),
            Some(NumericPair::Long(a, b)) => int_op(a, b),
            Some(NumericPair::Double(a, b)) => double_op(a, b),
            None => return Err(RuntimeError::unsupported()),
        };
        Ok(Self::literal(ValueData::Bool(result)))
    }

    /// Equality across numeric kinds compares by numeric value; equality
    /// across disjoint kinds is unsupported rather than `false`.
    fn equals(&self, right: &Self) -> RunResult<bool> {
        if let Some(pair) = self.numeric_pair(right) {
            return Ok(match pair {
                NumericPair::Int(a, b) => a == b,
                NumericPair::Long(a, b) => a == b,
                NumericPair::Double(a, b) => a == b,
            });
        }
        match (&self.data, &right.data) {
            (ValueData::Str(a), ValueData::Str(b)) => Ok(a == b),
            (ValueData::Bool(a), ValueData::Bool(b)) => Ok(a == b),
            (ValueData::Type(a), ValueData::Type(b)) => Ok(a == b),
            (
                ValueData::Array {
                    elem_type: lt,
                    items: ls,
                },
                ValueData::Array {
                    elem_type: rt,
                    items: rs,
                },
            ) => {
                if lt != rt {
                    return Err(RuntimeError::unsupported());
                }
                if ls.len() != rs.len() {
                    return Ok(false);
                }
                for (l, r) in ls.iter().zip(rs) {
                    if !l.equals(r)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            _ => Err(RuntimeError::unsupported()),
        }
    }

    fn numeric_op(
        &self,
        right: &Self,
        int_op: fn(i32, i32) -> i32,
        long_op: fn(i64, i64) -> i64,
        double_op: fn(f64, f64) -> f64,
    ) -> RunResult<Self> {
        match self.numeric_pair(right) {
            Some(NumericPair::Int(a, b)) => Ok(Self::literal(ValueData::Int(int_op(a, b)))),
            Some(NumericPair::Long(a, b)) => Ok(Self::literal(ValueData::Long(long_op(a, b)))),
            Some(NumericPair::Double(a, b)) => Ok(Self::literal(ValueData::Double(double_op(a, b)))),
            None => Err(RuntimeError::unsupported()),
        }
    }

    /// Promotes both operands along the numeric lattice, or `None` when
    /// either operand is not numeric.
    fn numeric_pair(&self, right: &Self) -> Option<NumericPair> {
        use ValueData::{Double, Int, Long};
        Some(match (&self.data, &right.data) {
            (Int(a), Int(b)) => NumericPair::Int(*a, *b),
            (Int(a), Long(b)) => NumericPair::Long(i64::from(*a), *b),
            (Long(a), Int(b)) => NumericPair::Long(*a, i64::from(*b)),
            (Long(a), Long(b)) => NumericPair::Long(*a, *b),
            (Int(a), Double(b)) => NumericPair::Double(f64::from(*a), *b),
            (Double(a), Int(b)) => NumericPair::Double(*a, f64::from(*b)),
            (Long(a), Double(b)) => NumericPair::Double(*a as f64, *b),
            (Double(a), Long(b)) => NumericPair::Double(*a, *b as f64),
            (Double(a), Double(b)) => NumericPair::Double(*a, *b),
            _ => return None,
        })
    }
}

/// Operands after promotion to their common numeric kind.
enum NumericPair {
    Int(i32, i32),
    Long(i64, i64),
    Double(f64, f64),
}

fn repeat_str(s: &str, count: i64) -> RunResult<Value> {
    let Ok(count) = usize::try_from(count) else {
        return Err(RuntimeError::runtime("Cannot repeat a string a negative number of times"));
    };
    Ok(Value::literal(ValueData::Str(s.repeat(count))))
}

/// Formats a double so the text always shows a decimal point or exponent,
/// distinguishing `3.0` from the integer `3`.
pub(crate) fn format_double(v: f64) -> String {
    let text = v.to_string();
    if text.contains('.') || text.contains('e') || text.contains("inf") || text.contains("NaN") {
        text
    } else {
        format!("{text}.0")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            ValueData::Int(v) => write!(f, "{v}"),
            ValueData::Long(v) => write!(f, "{v}"),
            ValueData::Double(v) => write!(f, "{}", format_double(*v)),
            ValueData::Bool(v) => write!(f, "{v}"),
            ValueData::Str(v) => write!(f, "{v}"),
            ValueData::Type(name) => write!(f, "{name}"),
            ValueData::Tuple(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            ValueData::Array { items, .. } => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            ValueData::Function(function) => write!(f, "{}", function.def.signature()),
            ValueData::Reference(cell) => write!(f, "{}", cell.borrow()),
            ValueData::Void => write!(f, "void"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::ErrorKind;

    fn int(v: i32) -> Value {
        Value::literal(ValueData::Int(v))
    }

    fn long(v: i64) -> Value {
        Value::literal(ValueData::Long(v))
    }

    fn double(v: f64) -> Value {
        Value::literal(ValueData::Double(v))
    }

    fn string(v: &str) -> Value {
        Value::literal(ValueData::Str(v.to_owned()))
    }

    fn boolean(v: bool) -> Value {
        Value::literal(ValueData::Bool(v))
    }

    #[test]
    fn promotion_lattice() {
        let v = int(1).binary_op(BinaryOp::Add, &double(2.5)).unwrap();
        assert!(matches!(v.data, ValueData::Double(x) if x == 3.5));

        let v = int(1).binary_op(BinaryOp::Add, &long(2)).unwrap();
        assert!(matches!(v.data, ValueData::Long(3)));

        let v = long(2).binary_op(BinaryOp::Mul, &double(0.5)).unwrap();
        assert!(matches!(v.data, ValueData::Double(x) if x == 1.0));
    }

    #[test]
    fn string_concatenation_and_repetition() {
        assert_eq!(int(3).binary_op(BinaryOp::Add, &string("x")).unwrap().to_string(), "3x");
        assert_eq!(string("n=").binary_op(BinaryOp::Add, &long(7)).unwrap().to_string(), "n=7");
        assert_eq!(int(3).binary_op(BinaryOp::Mul, &string("ab")).unwrap().to_string(), "ababab");
        assert_eq!(string("ab").binary_op(BinaryOp::Mul, &int(0)).unwrap().to_string(), "");
        let err = int(-1).binary_op(BinaryOp::Mul, &string("ab")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Error);
    }

    #[test]
    fn equality_across_numeric_kinds() {
        let v = int(2).binary_op(BinaryOp::Eq, &double(2.0)).unwrap();
        assert!(matches!(v.data, ValueData::Bool(true)));
        let v = long(2).binary_op(BinaryOp::NotEq, &int(3)).unwrap();
        assert!(matches!(v.data, ValueData::Bool(true)));
    }

    #[test]
    fn equality_across_disjoint_kinds_is_unsupported() {
        let err = int(1).binary_op(BinaryOp::Eq, &string("1")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedOperator);
        let err = boolean(true).binary_op(BinaryOp::Eq, &int(1)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedOperator);
    }

    #[test]
    fn commutative_operators_are_symmetric() {
        for (a, b) in [(int(3), long(4)), (int(2), double(0.5))] {
            let ab = a.binary_op(BinaryOp::Add, &b).unwrap();
            let ba = b.binary_op(BinaryOp::Add, &a).unwrap();
            assert!(ab.equals(&ba).unwrap());
            let ab = a.binary_op(BinaryOp::Mul, &b).unwrap();
            let ba = b.binary_op(BinaryOp::Mul, &a).unwrap();
            assert!(ab.equals(&ba).unwrap());
        }
    }

    #[test]
    fn boolean_supports_only_equality_and_logic() {
        let v = boolean(true).binary_op(BinaryOp::And, &boolean(false)).unwrap();
        assert!(matches!(v.data, ValueData::Bool(false)));
        let v = boolean(true).binary_op(BinaryOp::Or, &boolean(false)).unwrap();
        assert!(matches!(v.data, ValueData::Bool(true)));
        assert!(boolean(true).binary_op(BinaryOp::Lt, &boolean(false)).is_err());
        assert!(boolean(true).binary_op(BinaryOp::Add, &boolean(false)).is_err());
    }

    #[test]
    fn division_by_zero() {
        let err = int(1).binary_op(BinaryOp::Div, &int(0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Error);
        assert_eq!(err.message, "Division by zero");
        // double division follows IEEE-754
        let v = double(1.0).binary_op(BinaryOp::Div, &int(0)).unwrap();
        assert!(matches!(v.data, ValueData::Double(x) if x.is_infinite()));
    }

    #[test]
    fn exponentiation_in_the_promoted_kind() {
        let v = int(2).binary_op(BinaryOp::Pow, &int(10)).unwrap();
        assert!(matches!(v.data, ValueData::Int(1024)));
        let v = long(2).binary_op(BinaryOp::Pow, &int(40)).unwrap();
        assert!(matches!(v.data, ValueData::Long(1_099_511_627_776)));
        let v = int(2).binary_op(BinaryOp::Pow, &double(-1.0)).unwrap();
        assert!(matches!(v.data, ValueData::Double(x) if x == 0.5));
        assert!(int(2).binary_op(BinaryOp::Pow, &int(-1)).is_err());
    }

    #[test]
    fn references_are_transparent_to_operators() {
        let param = int(5).into_parameter();
        let v = param.binary_op(BinaryOp::Add, &int(1)).unwrap();
        assert!(matches!(v.data, ValueData::Int(6)));
        let v = int(1).binary_op(BinaryOp::LtE, &param).unwrap();
        assert!(matches!(v.data, ValueData::Bool(true)));
        assert_eq!(param.type_name(), "int");
        assert_eq!(param.to_string(), "5");
    }

    #[test]
    fn assignment_requires_identical_type_names() {
        let binding = Value::variable(ValueData::Int(1));
        assert!(binding.assign_from(&int(5)).is_ok());
        assert!(binding.assign_from(&long(5)).is_err());
        assert!(binding.assign_from(&string("x")).is_err());
    }

    #[test]
    fn array_assignment_and_equality_require_identical_types() {
        let ints = Value::variable(ValueData::Array {
            elem_type: "int".to_owned(),
            items: vec![int(1), int(2)],
        });
        let more_ints = Value::literal(ValueData::Array {
            elem_type: "int".to_owned(),
            items: vec![int(1), int(2)],
        });
        let longs = Value::literal(ValueData::Array {
            elem_type: "long".to_owned(),
            items: vec![long(1)],
        });
        assert!(ints.assign_from(&more_ints).is_ok());
        assert!(ints.assign_from(&longs).is_err());
        assert!(ints.equals(&more_ints).unwrap());
        assert!(ints.equals(&longs).is_err());
        assert!(ints.binary_op(BinaryOp::Lt, &more_ints).is_err());
    }

    #[test]
    fn indexing_tuples_and_arrays() {
        let tuple = Value::literal(ValueData::Tuple(vec![int(10), string("x")]));
        assert_eq!(tuple.index(&int(1)).unwrap().to_string(), "x");
        assert!(tuple.index(&int(2)).is_err());
        assert!(tuple.index(&int(-1)).is_err());
        assert!(tuple.index(&string("a")).is_err());
    }

    #[test]
    fn display_formats() {
        assert_eq!(double(3.0).to_string(), "3.0");
        assert_eq!(double(3.5).to_string(), "3.5");
        assert_eq!(Value::literal(ValueData::Void).to_string(), "void");
        let tuple = Value::literal(ValueData::Tuple(vec![int(1), int(2)]));
        assert_eq!(tuple.to_string(), "1 2");
        let array = Value::literal(ValueData::Array {
            elem_type: "int".to_owned(),
            items: vec![int(1), int(2)],
        });
        assert_eq!(array.to_string(), "[1, 2]");
    }

    #[test]
    fn void_rejects_operators() {
        let void = Value::literal(ValueData::Void);
        assert!(void.binary_op(BinaryOp::Add, &int(1)).is_err());
        assert!(void.binary_op(BinaryOp::Eq, &void).is_err());
        assert!(void.unary_op(UnaryOp::Not).is_err());
    }
}
