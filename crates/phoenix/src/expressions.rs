//! Expression trees: three-phase construction and post-order evaluation.
//!
//! Construction runs over one line's token range:
//!
//! 1. **Linearize** - every token becomes one work item: parenthesized and
//!    bracketed sub-ranges parse recursively, `-` is reclassified as prefix
//!    negate when it has no left operand, keywords `and`/`or`/`not` become
//!    operators, everything else becomes a literal or a resolution node.
//! 2. **Call and reference recognition** - `@` marks a name as a function
//!    reference, and a node adjacent to a parenthesized neighbor becomes a
//!    call with that neighbor as its left or right argument list.
//! 3. **Precedence reduction** - repeatedly bind the highest-precedence
//!    operator (leftmost on ties; assignment, `^`, and prefix operators bind
//!    rightmost). Commas are never selected: they partition the item list,
//!    and whatever survives reduction collapses into a tuple or array.
//!
//! Evaluation is post-order: operands first, left before right, then the
//! operator dispatches on the operands' runtime kinds. Names resolve lazily
//! on every evaluation; a resolved function not captured by `@` or by a call
//! node invokes with no arguments.

use std::rc::Rc;

use crate::{
    error::{ErrorKind, RunResult, RuntimeError},
    interpret::Interp,
    io::PrintWriter,
    resource::ResourceTracker,
    scope::ScopeTable,
    token::{Token, TokenKind, is_keyword, is_type_name, is_valid_identifier},
    tracer::ExecTracer,
    value::{Value, ValueData},
};

/// Binary operators, dispatched on both operand kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Pow => "^",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtE => "<=",
            Self::Gt => ">",
            Self::GtE => ">=",
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Prefix unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "not",
        }
    }
}

/// Assignment operators (level 0, right-to-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AssignOp {
    Set,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Set => "=",
            Self::Add => "+=",
            Self::Sub => "-=",
            Self::Mul => "*=",
            Self::Div => "/=",
            Self::Rem => "%=",
            Self::Pow => "^=",
        }
    }

    /// The underlying binary operator of a compound assignment.
    pub fn binary(self) -> Option<BinaryOp> {
        match self {
            Self::Set => None,
            Self::Add => Some(BinaryOp::Add),
            Self::Sub => Some(BinaryOp::Sub),
            Self::Mul => Some(BinaryOp::Mul),
            Self::Div => Some(BinaryOp::Div),
            Self::Rem => Some(BinaryOp::Rem),
            Self::Pow => Some(BinaryOp::Pow),
        }
    }
}

/// One node of a compiled expression tree.
#[derive(Debug)]
pub(crate) enum Node {
    /// A literal token's value, literal flag set.
    Literal(Value),
    /// A name looked up in the current scope at every evaluation.
    ///
    /// `suppress_call` is set by a preceding `@`, keeping a resolved function
    /// value from being implicitly invoked.
    Resolve { name: String, suppress_call: bool },
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Assign {
        op: AssignOp,
        target: Box<Node>,
        value: Box<Node>,
    },
    /// A juxtaposition call: the callee with parenthesized argument lists on
    /// either or both sides.
    Call {
        callee: Box<Node>,
        left: Option<Box<Node>>,
        right: Option<Box<Node>>,
    },
    /// Parenthesized or top-level comma list.
    TupleLit(Vec<Node>),
    /// Bracket-surrounded expression; yields an array when the elements
    /// share one type name, a tuple otherwise.
    ArrayLit(Vec<Node>),
    /// Empty parentheses; valid only as a call argument list.
    Empty,
}

/// A compiled expression, built once per line and evaluated many times.
#[derive(Debug)]
pub(crate) struct ExprTree {
    root: Node,
}

impl ExprTree {
    /// Builds a tree from a token range.
    pub fn build(tokens: &[Token]) -> RunResult<Self> {
        Ok(Self {
            root: build_range(tokens, Grouping::TopLevel)?,
        })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grouping {
    TopLevel,
    Parenthesized,
    Bracketed,
}

/// One work item during construction.
#[derive(Debug)]
enum Item {
    Operand { node: Node, parenthesized: bool },
    Op(OpItem),
    Comma,
    At,
}

#[derive(Debug, Clone, Copy)]
enum OpItem {
    Assign(AssignOp),
    Binary(BinaryOp),
    Unary(UnaryOp),
}

impl OpItem {
    fn symbol(self) -> &'static str {
        match self {
            Self::Assign(op) => op.symbol(),
            Self::Binary(op) => op.symbol(),
            Self::Unary(op) => op.symbol(),
        }
    }

    fn precedence(self) -> u8 {
        match self {
            Self::Assign(_) => 0,
            Self::Binary(BinaryOp::Or) => 1,
            Self::Binary(BinaryOp::And) => 2,
            Self::Binary(BinaryOp::Eq | BinaryOp::NotEq) => 3,
            Self::Binary(BinaryOp::Lt | BinaryOp::LtE | BinaryOp::Gt | BinaryOp::GtE) => 4,
            Self::Binary(BinaryOp::Add | BinaryOp::Sub) => 5,
            Self::Binary(BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem) => 6,
            Self::Binary(BinaryOp::Pow) => 7,
            Self::Unary(_) => 8,
        }
    }
}

/// Assignment, `^`, and the prefix operators bind right-to-left.
fn right_associative(precedence: u8) -> bool {
    matches!(precedence, 0 | 7 | 8)
}

fn build_range(tokens: &[Token], grouping: Grouping) -> RunResult<Node> {
    let items = linearize(tokens)?;
    let items = recognize_references(items)?;
    let items = recognize_calls(items);
    reduce(items, grouping)
}

/// Phase A: one work item per token, with balanced sub-ranges parsed
/// recursively.
fn linearize(tokens: &[Token]) -> RunResult<Vec<Item>> {
    let mut items = Vec::new();
    let mut index = 0;
    while index < tokens.len() {
        let token = &tokens[index];
        match token.kind {
            TokenKind::Str => items.push(Item::Operand {
                node: Node::Literal(Value::literal(ValueData::Str(token.text.clone()))),
                parenthesized: false,
            }),
            TokenKind::Word => items.push(word_item(&token.text)?),
            TokenKind::Delimiter => match token.text.as_str() {
                "(" => {
                    let close = find_matching(tokens, index)?;
                    items.push(Item::Operand {
                        node: build_range(&tokens[index + 1..close], Grouping::Parenthesized)?,
                        parenthesized: true,
                    });
                    index = close;
                }
                "[" => {
                    let close = find_matching(tokens, index)?;
                    items.push(Item::Operand {
                        node: build_range(&tokens[index + 1..close], Grouping::Bracketed)?,
                        parenthesized: false,
                    });
                    index = close;
                }
                ")" | "]" => return Err(RuntimeError::syntax("Mismatched brackets")),
                "," => items.push(Item::Comma),
                "@" => items.push(Item::At),
                "-" => {
                    // no left operand means prefix negate, not subtraction
                    let prefix = matches!(items.last(), None | Some(Item::Op(_) | Item::Comma | Item::At));
                    items.push(Item::Op(if prefix {
                        OpItem::Unary(UnaryOp::Neg)
                    } else {
                        OpItem::Binary(BinaryOp::Sub)
                    }));
                }
                symbol => items.push(Item::Op(operator_from_symbol(symbol)?)),
            },
        }
        index += 1;
    }
    Ok(items)
}

fn operator_from_symbol(symbol: &str) -> RunResult<OpItem> {
    Ok(match symbol {
        "=" => OpItem::Assign(AssignOp::Set),
        "+=" => OpItem::Assign(AssignOp::Add),
        "-=" => OpItem::Assign(AssignOp::Sub),
        "*=" => OpItem::Assign(AssignOp::Mul),
        "/=" => OpItem::Assign(AssignOp::Div),
        "%=" => OpItem::Assign(AssignOp::Rem),
        "^=" => OpItem::Assign(AssignOp::Pow),
        "+" => OpItem::Binary(BinaryOp::Add),
        "*" => OpItem::Binary(BinaryOp::Mul),
        "/" => OpItem::Binary(BinaryOp::Div),
        "%" => OpItem::Binary(BinaryOp::Rem),
        "^" => OpItem::Binary(BinaryOp::Pow),
        "==" => OpItem::Binary(BinaryOp::Eq),
        "!=" => OpItem::Binary(BinaryOp::NotEq),
        "<" => OpItem::Binary(BinaryOp::Lt),
        "<=" => OpItem::Binary(BinaryOp::LtE),
        ">" => OpItem::Binary(BinaryOp::Gt),
        ">=" => OpItem::Binary(BinaryOp::GtE),
        other => return Err(RuntimeError::syntax(format!("Unexpected '{other}'"))),
    })
}

fn word_item(text: &str) -> RunResult<Item> {
    let first = text.chars().next().unwrap_or(' ');
    if first.is_ascii_digit() || (first == '.' && text.len() > 1) {
        return Ok(Item::Operand {
            node: Node::Literal(parse_number(text)?),
            parenthesized: false,
        });
    }
    match text {
        "true" => {
            return Ok(Item::Operand {
                node: Node::Literal(Value::literal(ValueData::Bool(true))),
                parenthesized: false,
            });
        }
        "false" => {
            return Ok(Item::Operand {
                node: Node::Literal(Value::literal(ValueData::Bool(false))),
                parenthesized: false,
            });
        }
        "and" => return Ok(Item::Op(OpItem::Binary(BinaryOp::And))),
        "or" => return Ok(Item::Op(OpItem::Binary(BinaryOp::Or))),
        "not" => return Ok(Item::Op(OpItem::Unary(UnaryOp::Not))),
        _ => {}
    }
    if is_type_name(text) {
        return Ok(Item::Operand {
            node: Node::Literal(Value::literal(ValueData::Type(text.to_owned()))),
            parenthesized: false,
        });
    }
    if is_keyword(text) {
        return Err(RuntimeError::syntax(format!("Unexpected keyword '{text}'")));
    }
    if is_valid_identifier(text) {
        return Ok(Item::Operand {
            node: Node::Resolve {
                name: text.to_owned(),
                suppress_call: false,
            },
            parenthesized: false,
        });
    }
    Err(RuntimeError::syntax(format!("Invalid symbol '{text}'")))
}

/// Parses an integer, long, or double literal.
fn parse_number(text: &str) -> RunResult<Value> {
    let invalid = || RuntimeError::syntax(format!("Invalid numeric literal '{text}'"));
    if text.chars().all(|c| c.is_ascii_digit()) {
        let value = text.parse::<i32>().map_err(|_| RuntimeError::syntax(format!("Integer literal '{text}' out of range")))?;
        return Ok(Value::literal(ValueData::Int(value)));
    }
    if let Some(digits) = text.strip_suffix(['l', 'L']) {
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            let value = digits
                .parse::<i64>()
                .map_err(|_| RuntimeError::syntax(format!("Long literal '{text}' out of range")))?;
            return Ok(Value::literal(ValueData::Long(value)));
        }
        return Err(invalid());
    }
    let digits = text.strip_suffix(['d', 'D']).unwrap_or(text);
    let shape_ok = !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().filter(|c| *c == '.').count() <= 1
        && digits.chars().any(|c| c.is_ascii_digit());
    if !shape_ok {
        return Err(invalid());
    }
    let value = digits.parse::<f64>().map_err(|_| invalid())?;
    Ok(Value::literal(ValueData::Double(value)))
}

/// Index of the delimiter closing the bracket opened at `open`.
fn find_matching(tokens: &[Token], open: usize) -> RunResult<usize> {
    let mut stack: Vec<&str> = Vec::new();
    for (offset, token) in tokens[open..].iter().enumerate() {
        if token.kind != TokenKind::Delimiter {
            continue;
        }
        match token.text.as_str() {
            "(" => stack.push(")"),
            "[" => stack.push("]"),
            ")" | "]" => {
                if stack.pop() != Some(token.text.as_str()) {
                    return Err(RuntimeError::syntax("Mismatched brackets"));
                }
                if stack.is_empty() {
                    return Ok(open + offset);
                }
            }
            _ => {}
        }
    }
    Err(RuntimeError::syntax("Mismatched brackets"))
}

/// Phase B, step 1: a unary `@` marks the following name as a function
/// reference, suppressing implicit invocation.
fn recognize_references(mut items: Vec<Item>) -> RunResult<Vec<Item>> {
    let mut index = 0;
    while index < items.len() {
        if !matches!(items[index], Item::At) {
            index += 1;
            continue;
        }
        let valid = matches!(
            items.get(index + 1),
            Some(Item::Operand {
                node: Node::Resolve { .. },
                ..
            })
        );
        if !valid {
            return Err(RuntimeError::syntax("'@' must be followed by a function name"));
        }
        items.remove(index);
        if let Item::Operand {
            node: Node::Resolve { suppress_call, .. },
            ..
        } = &mut items[index]
        {
            *suppress_call = true;
        }
    }
    Ok(items)
}

/// Phase B, step 2: a node adjacent to a parenthesized neighbor becomes a
/// call consuming that neighbor as its argument list. A parenthesized left
/// neighbor binds as the left list, a parenthesized right neighbor as the
/// right list; both produce a binary call.
fn recognize_calls(mut items: Vec<Item>) -> Vec<Item> {
    loop {
        let mut candidate = None;
        for index in 0..items.len() {
            if !matches!(items[index], Item::Operand { .. }) {
                continue;
            }
            let left = index > 0 && matches!(items[index - 1], Item::Operand { parenthesized: true, .. });
            let right = matches!(items.get(index + 1), Some(Item::Operand { parenthesized: true, .. }));
            if left || right {
                candidate = Some((index, left, right));
                break;
            }
        }
        let Some((index, left, right)) = candidate else {
            return items;
        };
        let right_arg = right.then(|| match items.remove(index + 1) {
            Item::Operand { node, .. } => Box::new(node),
            _ => unreachable!("checked above"),
        });
        let Item::Operand { node: callee, .. } = items.remove(index) else {
            unreachable!("checked above");
        };
        let (left_arg, index) = if left {
            match items.remove(index - 1) {
                Item::Operand { node, .. } => (Some(Box::new(node)), index - 1),
                _ => unreachable!("checked above"),
            }
        } else {
            (None, index)
        };
        items.insert(
            index,
            Item::Operand {
                node: Node::Call {
                    callee: Box::new(callee),
                    left: left_arg,
                    right: right_arg,
                },
                parenthesized: false,
            },
        );
    }
}

/// Phase C: precedence reduction and the comma collapse.
fn reduce(mut items: Vec<Item>, grouping: Grouping) -> RunResult<Node> {
    loop {
        let mut best: Option<(u8, usize)> = None;
        for (index, item) in items.iter().enumerate() {
            if let Item::Op(op) = item {
                let precedence = op.precedence();
                let better = match best {
                    None => true,
                    Some((bp, _)) => precedence > bp || (precedence == bp && right_associative(precedence)),
                };
                if better {
                    best = Some((precedence, index));
                }
            }
        }
        let Some((_, index)) = best else { break };
        let Item::Op(op) = &items[index] else {
            unreachable!("selected above");
        };
        let op = *op;
        let missing = || RuntimeError::syntax(format!("Missing operand for '{}'", op.symbol()));
        match op {
            OpItem::Unary(unary) => {
                if !matches!(items.get(index + 1), Some(Item::Operand { .. })) {
                    return Err(missing());
                }
                let Item::Operand { node: operand, .. } = items.remove(index + 1) else {
                    unreachable!("checked above");
                };
                items[index] = Item::Operand {
                    node: Node::Unary {
                        op: unary,
                        operand: Box::new(operand),
                    },
                    parenthesized: false,
                };
            }
            OpItem::Binary(_) | OpItem::Assign(_) => {
                if index == 0
                    || !matches!(items[index - 1], Item::Operand { .. })
                    || !matches!(items.get(index + 1), Some(Item::Operand { .. }))
                {
                    return Err(missing());
                }
                let Item::Operand { node: right, .. } = items.remove(index + 1) else {
                    unreachable!("checked above");
                };
                let Item::Operand { node: left, .. } = items.remove(index - 1) else {
                    unreachable!("checked above");
                };
                let node = match op {
                    OpItem::Binary(binary) => Node::Binary {
                        op: binary,
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                    OpItem::Assign(assign) => Node::Assign {
                        op: assign,
                        target: Box::new(left),
                        value: Box::new(right),
                    },
                    OpItem::Unary(_) => unreachable!("handled above"),
                };
                items[index - 1] = Item::Operand {
                    node,
                    parenthesized: false,
                };
            }
        }
    }

    // Whatever survives must alternate operand / comma; collapse it.
    let mut elements = Vec::new();
    let mut expect_operand = true;
    for item in items {
        match item {
            Item::Operand { node, .. } if expect_operand => {
                elements.push(node);
                expect_operand = false;
            }
            Item::Comma if !expect_operand => expect_operand = true,
            Item::Comma => return Err(RuntimeError::syntax("Expected an expression before ','")),
            Item::Operand { .. } => return Err(RuntimeError::syntax("Expected an operator between expressions")),
            Item::Op(_) | Item::At => return Err(RuntimeError::syntax("Malformed expression")),
        }
    }
    if expect_operand && !elements.is_empty() {
        return Err(RuntimeError::syntax("Expected an expression after ','"));
    }
    Ok(match (elements.len(), grouping) {
        (0, Grouping::Parenthesized) => Node::Empty,
        (0, Grouping::Bracketed) => Node::ArrayLit(Vec::new()),
        (0, Grouping::TopLevel) => return Err(RuntimeError::syntax("Empty expression")),
        (1, Grouping::Bracketed) => Node::ArrayLit(elements),
        (1, _) => elements.into_iter().next().unwrap_or(Node::Empty),
        (_, Grouping::Bracketed) => Node::ArrayLit(elements),
        (_, _) => Node::TupleLit(elements),
    })
}

fn unknown_variable(name: &str) -> RuntimeError {
    RuntimeError::syntax(format!("Unknown variable '{name}'"))
}

/// Decorates a blank unsupported-operator error with the operator symbol and
/// operand type names.
fn fill_binary(err: RuntimeError, symbol: &str, left: &Value, right: &Value) -> RuntimeError {
    if err.kind == ErrorKind::UnsupportedOperator && err.message.is_empty() {
        RuntimeError::new(
            ErrorKind::UnsupportedOperator,
            format!(
                "Operator {symbol} is not supported between {} and {}",
                left.type_name(),
                right.type_name()
            ),
        )
    } else {
        err
    }
}

fn fill_unary(err: RuntimeError, op: UnaryOp, operand: &Value) -> RuntimeError {
    if err.kind == ErrorKind::UnsupportedOperator && err.message.is_empty() {
        RuntimeError::new(
            ErrorKind::UnsupportedOperator,
            format!("Operator {} is not supported on {}", op.symbol(), operand.type_name()),
        )
    } else {
        err
    }
}

impl<T: ResourceTracker, P: PrintWriter, Tr: ExecTracer> Interp<'_, T, P, Tr> {
    /// Evaluates a compiled expression in the given scope.
    pub(crate) fn eval(&mut self, scopes: &mut ScopeTable, tree: &ExprTree) -> RunResult<Value> {
        self.eval_node(scopes, tree.root())
    }

    fn eval_node(&mut self, scopes: &mut ScopeTable, node: &Node) -> RunResult<Value> {
        match node {
            Node::Literal(value) => Ok(value.clone()),
            Node::Resolve { name, suppress_call } => {
                let value = scopes.get(name).ok_or_else(|| unknown_variable(name))?;
                if !suppress_call {
                    if let ValueData::Function(function) = &value.data {
                        let function = Rc::clone(function);
                        return self.call_function(&function, None, None);
                    }
                }
                Ok(value)
            }
            Node::Unary { op, operand } => {
                let value = self.eval_node(scopes, operand)?;
                value.unary_op(*op).map_err(|e| fill_unary(e, *op, &value))
            }
            Node::Binary { op, left, right } => {
                let left_value = self.eval_node(scopes, left)?;
                let right_value = self.eval_node(scopes, right)?;
                left_value
                    .binary_op(*op, &right_value)
                    .map_err(|e| fill_binary(e, op.symbol(), &left_value, &right_value))
            }
            Node::Assign { op, target, value } => self.eval_assign(scopes, *op, target, value),
            Node::Call { callee, left, right } => {
                self.eval_call(scopes, callee, left.as_deref(), right.as_deref())
            }
            Node::TupleLit(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_node(scopes, element)?.deref_clone());
                }
                Ok(Value::literal(ValueData::Tuple(values)))
            }
            Node::ArrayLit(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_node(scopes, element)?.deref_clone());
                }
                Ok(collect_bracketed(values))
            }
            Node::Empty => Err(RuntimeError::syntax(
                "Empty parentheses are only allowed as an argument list",
            )),
        }
    }

    fn eval_call(
        &mut self,
        scopes: &mut ScopeTable,
        callee: &Node,
        left: Option<&Node>,
        right: Option<&Node>,
    ) -> RunResult<Value> {
        // The callee resolves without the implicit no-argument invocation;
        // this call node supplies the arguments itself.
        let callee_value = match callee {
            Node::Resolve { name, .. } => scopes.get(name).ok_or_else(|| unknown_variable(name))?,
            other => self.eval_node(scopes, other)?,
        };
        let callee_value = callee_value.deref_clone();
        match &callee_value.data {
            ValueData::Function(function) => {
                let function = Rc::clone(function);
                let left_value = match left {
                    Some(node) => Some(self.eval_argument(scopes, node)?),
                    None => None,
                };
                let right_value = match right {
                    Some(node) => Some(self.eval_argument(scopes, node)?),
                    None => None,
                };
                self.call_function(&function, left_value, right_value)
            }
            ValueData::Tuple(_) | ValueData::Array { .. } => {
                let index_node = match (left, right) {
                    (Some(node), None) | (None, Some(node)) => node,
                    _ => return Err(RuntimeError::syntax("Expected a single index")),
                };
                let index = self.eval_node(scopes, index_node)?;
                callee_value.index(&index)
            }
            _ => Err(RuntimeError::syntax(format!(
                "Value of type {} is not callable",
                callee_value.type_name()
            ))),
        }
    }

    /// Evaluates one side of a call's argument lists; empty parentheses pass
    /// an empty tuple.
    fn eval_argument(&mut self, scopes: &mut ScopeTable, node: &Node) -> RunResult<Value> {
        if matches!(node, Node::Empty) {
            Ok(Value::literal(ValueData::Tuple(Vec::new())))
        } else {
            self.eval_node(scopes, node)
        }
    }

    fn eval_assign(
        &mut self,
        scopes: &mut ScopeTable,
        op: AssignOp,
        target: &Node,
        value: &Node,
    ) -> RunResult<Value> {
        let Node::Resolve { name, .. } = target else {
            let target_value = self.eval_node(scopes, target)?;
            return Err(if target_value.literal {
                RuntimeError::syntax("Cannot assign to a literal value")
            } else {
                RuntimeError::syntax("Invalid assignment target")
            });
        };
        let current = scopes.get(name).ok_or_else(|| unknown_variable(name))?;
        let rhs = self.eval_node(scopes, value)?;
        match op.binary() {
            None => {
                if current.is_reference() {
                    return Err(RuntimeError::syntax("Cannot assign to a reference"));
                }
                let merged = current
                    .assign_from(&rhs)
                    .map_err(|e| fill_binary(e, op.symbol(), &current, &rhs))?;
                scopes.rebind(name, merged.clone());
                Ok(merged)
            }
            Some(binary) => {
                if let ValueData::Reference(cell) = &current.data {
                    let merged = {
                        let referent = cell.borrow();
                        let computed = referent
                            .binary_op(binary, &rhs)
                            .map_err(|e| fill_binary(e, op.symbol(), &current, &rhs))?;
                        referent
                            .assign_from(&computed)
                            .map_err(|e| fill_binary(e, op.symbol(), &current, &rhs))?
                    };
                    *cell.borrow_mut() = merged.clone();
                    Ok(merged)
                } else {
                    let computed = current
                        .binary_op(binary, &rhs)
                        .map_err(|e| fill_binary(e, op.symbol(), &current, &rhs))?;
                    let merged = current
                        .assign_from(&computed)
                        .map_err(|e| fill_binary(e, op.symbol(), &current, &rhs))?;
                    scopes.rebind(name, merged.clone());
                    Ok(merged)
                }
            }
        }
    }
}

/// A bracket-surrounded reduction yields an array when all elements share a
/// type name, a tuple otherwise.
fn collect_bracketed(values: Vec<Value>) -> Value {
    if values.is_empty() {
        return Value::literal(ValueData::Array {
            elem_type: "void".to_owned(),
            items: values,
        });
    }
    let elem_type = values[0].type_name();
    if values.iter().all(|value| value.type_name() == elem_type) {
        Value::literal(ValueData::Array {
            elem_type,
            items: values,
        })
    } else {
        Value::literal(ValueData::Tuple(values))
    }
}
