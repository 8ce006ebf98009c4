//! Statement classification and per-line compiled payloads.
//!
//! On the first visit to a non-empty line, the classifier inspects its token
//! list and stores exactly one [`Statement`] kind plus a compiled
//! [`Payload`] on the line. Compound statements resolve their block extents,
//! attached chains (`else`, `otherwise`, `catch`, the `do` loop's trailing
//! predicate), and the continuation index here, once; every later execution
//! replays the payload without touching the tokens again.
//!
//! Classification errors are stored on the line and re-raised verbatim on
//! every execution, so a faulty line fails deterministically and a skipped
//! faulty line is never an error.

use std::rc::Rc;

use crate::{
    error::{RunResult, RuntimeError},
    expressions::ExprTree,
    function::{FunctionDef, Param},
    source::SourceModel,
    token::{Token, TokenKind, is_keyword, is_type_name, is_valid_identifier},
    tracer::ExecTracer,
};

/// The classification of one source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Statement {
    /// Not yet classified.
    #[default]
    Undefined,
    Empty,
    Try,
    If,
    DoWhile,
    DoUntil,
    While,
    Until,
    For,
    Break,
    Continue,
    Return,
    Function,
    Initialization,
    Print,
    /// Any other line: a bare expression statement.
    Parse,
}

/// An inclusive range of body lines; `start > end` means an empty body.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockRange {
    pub start: usize,
    pub end: usize,
}

/// The compiled payload of one classified line.
#[derive(Debug)]
pub(crate) enum Payload {
    If(IfChain),
    Loop(LoopExec),
    For(ForExec),
    Try(TryExec),
    Function { name: String, def: Rc<FunctionDef> },
    Init {
        type_name: String,
        name: String,
        expr: ExprTree,
    },
    Return(Option<ExprTree>),
    Print(Option<ExprTree>),
    Expr(ExprTree),
}

/// An `if` header with its `else if` arms and optional `else` body.
#[derive(Debug)]
pub(crate) struct IfChain {
    pub arms: Vec<(ExprTree, BlockRange)>,
    pub else_body: Option<BlockRange>,
}

/// A `while`/`until`/`do`-loop executor.
#[derive(Debug)]
pub(crate) struct LoopExec {
    /// Predicate checked before each iteration when true, after when false.
    pub check_at_start: bool,
    /// The predicate value that ends the loop: `false` for `while`, `true`
    /// for `until`.
    pub end_value: bool,
    pub predicate: ExprTree,
    pub body: BlockRange,
    /// Runs only when a begin-checked loop never executed its body.
    pub otherwise: Option<BlockRange>,
}

/// A `for` header: init / condition / step plus the loop body.
#[derive(Debug)]
pub(crate) struct ForExec {
    pub init: ForInit,
    pub cond: ExprTree,
    pub step: ExprTree,
    pub body: BlockRange,
    pub otherwise: Option<BlockRange>,
}

/// The initialization clause of a `for` header.
#[derive(Debug)]
pub(crate) enum ForInit {
    Decl {
        type_name: String,
        name: String,
        expr: ExprTree,
    },
    Expr(ExprTree),
}

/// A `try` body with its paired `catch` body.
#[derive(Debug)]
pub(crate) struct TryExec {
    pub body: BlockRange,
    pub catch: BlockRange,
}

/// Classifies the line on first visit, caching the result; replays a stored
/// setup error on every visit after a failed classification.
pub(crate) fn ensure_setup(source: &Rc<SourceModel>, index: usize, tracer: &mut impl ExecTracer) -> RunResult<()> {
    let line = source.line(index);
    if let Some(err) = line.setup_error() {
        return Err(err);
    }
    if line.statement() != Statement::Undefined {
        return Ok(());
    }
    tracer.on_setup(index + 1);
    match classify(source, index) {
        Ok((statement, payload, continuation)) => {
            line.store_setup(statement, payload, continuation);
            Ok(())
        }
        Err(err) => {
            let err = err.with_location(index + 1, &line.content);
            line.store_setup_error(err.clone());
            Err(err)
        }
    }
}

/// Classifies one line and builds its payload and continuation index.
fn classify(source: &Rc<SourceModel>, index: usize) -> RunResult<(Statement, Option<Rc<Payload>>, usize)> {
    let line = source.line(index);
    if line.is_empty() {
        return Ok((Statement::Empty, None, index + 1));
    }
    let tokens = line.tokens()?;
    if tokens[0].kind == TokenKind::Word {
        match tokens[0].text.as_str() {
            "try" => return classify_try(source, index, &tokens),
            "if" => return classify_if(source, index, &tokens),
            "do" => return classify_do(source, index, &tokens),
            "while" => return classify_loop(source, index, &tokens, false),
            "until" => return classify_loop(source, index, &tokens, true),
            "for" => return classify_for(source, index, &tokens),
            "break" => return classify_bare(&tokens, Statement::Break, index),
            "continue" => return classify_bare(&tokens, Statement::Continue, index),
            "return" => {
                let expr = optional_expression(&tokens[1..])?;
                return Ok((Statement::Return, Some(Rc::new(Payload::Return(expr))), index + 1));
            }
            "function" => return classify_function(source, index, &tokens),
            "print" => {
                let expr = optional_expression(&tokens[1..])?;
                return Ok((Statement::Print, Some(Rc::new(Payload::Print(expr))), index + 1));
            }
            // orphan block keywords outside their parent compound
            orphan @ ("else" | "otherwise" | "catch" | "case" | "default") => {
                return Err(RuntimeError::syntax(format!("Unexpected '{orphan}'")));
            }
            _ => {}
        }
    }
    if let Some((type_name, name, expr_start)) = match_initialization(&tokens) {
        let expr_tokens = &tokens[expr_start..];
        if expr_tokens.is_empty() {
            return Err(RuntimeError::syntax("Expected an expression after '='"));
        }
        let payload = Payload::Init {
            type_name,
            name,
            expr: ExprTree::build(expr_tokens)?,
        };
        return Ok((Statement::Initialization, Some(Rc::new(payload)), index + 1));
    }
    let payload = Payload::Expr(ExprTree::build(&tokens)?);
    Ok((Statement::Parse, Some(Rc::new(payload)), index + 1))
}

fn classify_bare(tokens: &[Token], statement: Statement, index: usize) -> RunResult<(Statement, Option<Rc<Payload>>, usize)> {
    if tokens.len() > 1 {
        return Err(RuntimeError::syntax(format!(
            "Unexpected tokens after '{}'",
            tokens[0].text
        )));
    }
    Ok((statement, None, index + 1))
}

fn optional_expression(tokens: &[Token]) -> RunResult<Option<ExprTree>> {
    if tokens.is_empty() {
        Ok(None)
    } else {
        Ok(Some(ExprTree::build(tokens)?))
    }
}

/// The block body opened by the header at `header`.
fn block(source: &SourceModel, header: usize) -> BlockRange {
    BlockRange {
        start: header + 1,
        end: source.block_end(header),
    }
}

/// Strips the mandatory trailing `:` from a compound header.
fn strip_colon<'a>(tokens: &'a [Token], what: &str) -> RunResult<&'a [Token]> {
    match tokens.split_last() {
        Some((last, rest)) if last.is_delimiter(":") => Ok(rest),
        _ => Err(RuntimeError::syntax(format!("Expected ':' at the end of '{what}'"))),
    }
}

/// The condition token range of a `<keyword> <expr> :` header.
fn condition_tokens<'a>(tokens: &'a [Token], keyword: &str) -> RunResult<&'a [Token]> {
    let rest = &strip_colon(tokens, keyword)?[1..];
    if rest.is_empty() {
        return Err(RuntimeError::syntax(format!("Expected a condition after '{keyword}'")));
    }
    Ok(rest)
}

/// The first non-empty line at or after `index` when it sits at exactly the
/// chain indent; `None` otherwise. Used to attach `else` / `otherwise` /
/// `catch` / the `do` predicate to their header.
fn chain_candidate(source: &SourceModel, index: usize, indent: &str) -> Option<usize> {
    let mut i = index;
    while i < source.len() {
        let line = source.line(i);
        if !line.is_empty() {
            return (line.indent == indent).then_some(i);
        }
        i += 1;
    }
    None
}

fn classify_if(source: &Rc<SourceModel>, index: usize, tokens: &[Token]) -> RunResult<(Statement, Option<Rc<Payload>>, usize)> {
    let indent = &source.line(index).indent;
    let mut arms = vec![(ExprTree::build(condition_tokens(tokens, "if")?)?, block(source, index))];
    let mut else_body = None;
    let mut continuation = source.block_end(index) + 1;
    while let Some(next) = chain_candidate(source, continuation, indent) {
        let next_tokens = source.line(next).tokens()?;
        if !next_tokens[0].is_word("else") {
            break;
        }
        if next_tokens.len() == 2 && next_tokens[1].is_delimiter(":") {
            else_body = Some(block(source, next));
            continuation = source.block_end(next) + 1;
            break;
        }
        if next_tokens.get(1).is_some_and(|t| t.is_word("if")) {
            let rest = strip_colon(&next_tokens, "else if")?;
            if rest.len() <= 2 {
                return Err(RuntimeError::syntax("Expected a condition after 'else if'"));
            }
            arms.push((ExprTree::build(&rest[2..])?, block(source, next)));
            continuation = source.block_end(next) + 1;
            continue;
        }
        return Err(RuntimeError::syntax("Expected ':' after 'else'"));
    }
    let payload = Payload::If(IfChain { arms, else_body });
    Ok((Statement::If, Some(Rc::new(payload)), continuation))
}

fn classify_loop(
    source: &Rc<SourceModel>,
    index: usize,
    tokens: &[Token],
    until: bool,
) -> RunResult<(Statement, Option<Rc<Payload>>, usize)> {
    let keyword = if until { "until" } else { "while" };
    let predicate = ExprTree::build(condition_tokens(tokens, keyword)?)?;
    let body = block(source, index);
    let (otherwise, continuation) = attach_otherwise(source, index)?;
    let payload = Payload::Loop(LoopExec {
        check_at_start: true,
        end_value: until,
        predicate,
        body,
        otherwise,
    });
    let statement = if until { Statement::Until } else { Statement::While };
    Ok((statement, Some(Rc::new(payload)), continuation))
}

fn classify_do(source: &Rc<SourceModel>, index: usize, tokens: &[Token]) -> RunResult<(Statement, Option<Rc<Payload>>, usize)> {
    if !(tokens.len() == 2 && tokens[1].is_delimiter(":")) {
        return Err(RuntimeError::syntax("Expected ':' after 'do'"));
    }
    let body = block(source, index);
    let indent = &source.line(index).indent;
    let Some(next) = chain_candidate(source, body.end + 1, indent) else {
        return Err(RuntimeError::syntax("Expected 'while' or 'until' after 'do' block"));
    };
    let next_tokens = source.line(next).tokens()?;
    let (statement, end_value) = match next_tokens[0].text.as_str() {
        "while" if next_tokens[0].kind == TokenKind::Word => (Statement::DoWhile, false),
        "until" if next_tokens[0].kind == TokenKind::Word => (Statement::DoUntil, true),
        _ => return Err(RuntimeError::syntax("Expected 'while' or 'until' after 'do' block")),
    };
    // the trailing predicate line carries no colon and is consumed here;
    // the continuation index skips it so it is never classified on its own
    let predicate_tokens = &next_tokens[1..];
    if predicate_tokens.is_empty() {
        return Err(RuntimeError::syntax(format!(
            "Expected a condition after '{}'",
            next_tokens[0].text
        )));
    }
    let payload = Payload::Loop(LoopExec {
        check_at_start: false,
        end_value,
        predicate: ExprTree::build(predicate_tokens)?,
        body,
        otherwise: None,
    });
    Ok((statement, Some(Rc::new(payload)), next + 1))
}

fn classify_for(source: &Rc<SourceModel>, index: usize, tokens: &[Token]) -> RunResult<(Statement, Option<Rc<Payload>>, usize)> {
    let rest = &strip_colon(tokens, "for")?[1..];
    let mut segments = rest.split(|t| t.is_delimiter(";"));
    let (Some(init), Some(cond), Some(step), None) =
        (segments.next(), segments.next(), segments.next(), segments.next())
    else {
        return Err(RuntimeError::syntax("Expected 'for <init> ; <condition> ; <step> :'"));
    };
    if cond.is_empty() {
        return Err(RuntimeError::syntax("Expected a condition in 'for'"));
    }
    if step.is_empty() {
        return Err(RuntimeError::syntax("Expected a step expression in 'for'"));
    }
    let init = parse_for_init(init)?;
    let body = block(source, index);
    let (otherwise, continuation) = attach_otherwise(source, index)?;
    let payload = Payload::For(ForExec {
        init,
        cond: ExprTree::build(cond)?,
        step: ExprTree::build(step)?,
        body,
        otherwise,
    });
    Ok((Statement::For, Some(Rc::new(payload)), continuation))
}

fn parse_for_init(tokens: &[Token]) -> RunResult<ForInit> {
    if tokens.is_empty() {
        return Err(RuntimeError::syntax("Expected an initialization in 'for'"));
    }
    if let Some((type_name, name, expr_start)) = match_initialization(tokens) {
        let expr_tokens = &tokens[expr_start..];
        if expr_tokens.is_empty() {
            return Err(RuntimeError::syntax("Expected an expression after '='"));
        }
        return Ok(ForInit::Decl {
            type_name,
            name,
            expr: ExprTree::build(expr_tokens)?,
        });
    }
    Ok(ForInit::Expr(ExprTree::build(tokens)?))
}

fn classify_try(source: &Rc<SourceModel>, index: usize, tokens: &[Token]) -> RunResult<(Statement, Option<Rc<Payload>>, usize)> {
    if !(tokens.len() == 2 && tokens[1].is_delimiter(":")) {
        return Err(RuntimeError::syntax("Expected ':' after 'try'"));
    }
    let body = block(source, index);
    let indent = &source.line(index).indent;
    let catch_header = chain_candidate(source, body.end + 1, indent)
        .filter(|next| {
            source
                .line(*next)
                .tokens()
                .is_ok_and(|t| t.len() == 2 && t[0].is_word("catch") && t[1].is_delimiter(":"))
        })
        .ok_or_else(|| RuntimeError::syntax("Expected 'catch' after 'try' block"))?;
    let catch = block(source, catch_header);
    let continuation = source.block_end(catch_header) + 1;
    let payload = Payload::Try(TryExec { body, catch });
    Ok((Statement::Try, Some(Rc::new(payload)), continuation))
}

/// Attaches an optional `otherwise :` block after a loop body.
fn attach_otherwise(source: &Rc<SourceModel>, header: usize) -> RunResult<(Option<BlockRange>, usize)> {
    let body_end = source.block_end(header);
    let indent = &source.line(header).indent;
    let mut continuation = body_end + 1;
    let mut otherwise = None;
    if let Some(next) = chain_candidate(source, continuation, indent) {
        let tokens = source.line(next).tokens()?;
        if tokens[0].is_word("otherwise") {
            if !(tokens.len() == 2 && tokens[1].is_delimiter(":")) {
                return Err(RuntimeError::syntax("Expected ':' after 'otherwise'"));
            }
            otherwise = Some(block(source, next));
            continuation = source.block_end(next) + 1;
        }
    }
    Ok((otherwise, continuation))
}

fn classify_function(
    source: &Rc<SourceModel>,
    index: usize,
    tokens: &[Token],
) -> RunResult<(Statement, Option<Rc<Payload>>, usize)> {
    let rest = strip_colon(tokens, "function")?;
    let mut i = 1;
    let return_type = if type_starts_at(rest, i) {
        parse_type(rest, &mut i)?
    } else {
        "void".to_owned()
    };
    let mut unnamed = 0;
    let left = if rest.get(i).is_some_and(|t| t.is_delimiter("(")) {
        Some(parse_params(rest, &mut i, &mut unnamed)?)
    } else {
        None
    };
    let name = match rest.get(i) {
        Some(t) if t.kind == TokenKind::Word && is_valid_identifier(&t.text) && !is_keyword(&t.text) => t.text.clone(),
        _ => return Err(RuntimeError::syntax("Expected a function name")),
    };
    i += 1;
    let right = if rest.get(i).is_some_and(|t| t.is_delimiter("(")) {
        Some(parse_params(rest, &mut i, &mut unnamed)?)
    } else {
        None
    };
    if i != rest.len() {
        return Err(RuntimeError::syntax("Unexpected tokens after function declaration"));
    }
    let mut seen: Vec<&str> = Vec::new();
    for param in left.iter().flatten().chain(right.iter().flatten()) {
        if seen.contains(&param.bind_name.as_str()) {
            return Err(RuntimeError::syntax(format!("Duplicate parameter '{}'", param.bind_name)));
        }
        seen.push(&param.bind_name);
    }
    let body = block(source, index);
    let def = Rc::new(FunctionDef {
        name: name.clone(),
        return_type,
        left,
        right,
        body_start: body.start,
        body_end: body.end,
        source: Rc::clone(source),
        header_line: index,
    });
    let continuation = body.end + 1;
    Ok((
        Statement::Function,
        Some(Rc::new(Payload::Function { name, def })),
        continuation,
    ))
}

/// True if the token at `i` can start a type: a primitive type name or `[`.
fn type_starts_at(tokens: &[Token], i: usize) -> bool {
    match tokens.get(i) {
        Some(t) if t.kind == TokenKind::Word => is_type_name(&t.text),
        Some(t) => t.is_delimiter("["),
        None => false,
    }
}

/// Parses a type: a primitive type name or `[` *inner-type* `]`, nestable.
fn parse_type(tokens: &[Token], i: &mut usize) -> RunResult<String> {
    match tokens.get(*i) {
        Some(t) if t.kind == TokenKind::Word && is_type_name(&t.text) => {
            *i += 1;
            Ok(t.text.clone())
        }
        Some(t) if t.is_delimiter("[") => {
            *i += 1;
            let inner = parse_type(tokens, i)?;
            match tokens.get(*i) {
                Some(t) if t.is_delimiter("]") => {
                    *i += 1;
                    Ok(format!("[{inner}]"))
                }
                _ => Err(RuntimeError::syntax("Expected ']' in array type")),
            }
        }
        _ => Err(RuntimeError::syntax("Expected a type")),
    }
}

/// Parses a parenthesized parameter list: `(` [*type* [*name*] {`,` ...}] `)`.
fn parse_params(tokens: &[Token], i: &mut usize, unnamed: &mut usize) -> RunResult<Vec<Param>> {
    *i += 1; // consume '('
    let mut params = Vec::new();
    if tokens.get(*i).is_some_and(|t| t.is_delimiter(")")) {
        *i += 1;
        return Ok(params);
    }
    loop {
        let type_name = parse_type(tokens, i)?;
        let declared_name = match tokens.get(*i) {
            Some(t) if t.kind == TokenKind::Word && is_valid_identifier(&t.text) && !is_keyword(&t.text) => {
                *i += 1;
                Some(t.text.clone())
            }
            _ => None,
        };
        let bind_name = declared_name.clone().unwrap_or_else(|| {
            *unnamed += 1;
            if *unnamed == 1 {
                "n".to_owned()
            } else {
                format!("n{unnamed}")
            }
        });
        params.push(Param {
            type_name,
            declared_name,
            bind_name,
        });
        match tokens.get(*i) {
            Some(t) if t.is_delimiter(",") => *i += 1,
            Some(t) if t.is_delimiter(")") => {
                *i += 1;
                return Ok(params);
            }
            _ => return Err(RuntimeError::syntax("Expected ',' or ')' in parameter list")),
        }
    }
}

/// Matches `<type> <name> =` and returns the type name, variable name, and
/// the index of the first expression token.
fn match_initialization(tokens: &[Token]) -> Option<(String, String, usize)> {
    let mut i = 0;
    if !type_starts_at(tokens, 0) {
        return None;
    }
    let type_name = parse_type(tokens, &mut i).ok()?;
    let name = tokens.get(i)?;
    if name.kind != TokenKind::Word || !is_valid_identifier(&name.text) || is_keyword(&name.text) {
        return None;
    }
    if !tokens.get(i + 1)?.is_delimiter("=") {
        return None;
    }
    Some((type_name, name.text.clone(), i + 2))
}
