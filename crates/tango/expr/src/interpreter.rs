//! Interpreter: evaluates parsed snippets against a read-only scope
//!
//! Values are plain JSON. `undefined` and missing members read as `null`;
//! only an empty snippet, or a code block that finishes without returning a
//! value, produces no value at all. Every expression node and statement
//! costs one step, and a run stops with
//! [`ExprError::StepBudgetExceeded`] once the budget is spent. Nesting
//! is capped separately, at twice [`Parser::MAX_DEPTH`], so a syntax tree
//! built by hand cannot exhaust the stack either.

use crate::errors::{ExprError, ExprResult};
use crate::parser::{BinaryOp, Expr, Parser, Stmt, UnaryOp};
use serde_json::Value;
use std::collections::HashMap;

/// Variables visible to a snippet
pub type Scope = serde_json::Map<String, Value>;

/// Bounded interpreter for expression and code snippets
#[derive(Clone, Debug)]
pub struct Interpreter {
    max_steps: usize,
}

impl Interpreter {
    /// Step budget used by [`Interpreter::new`]
    pub const DEFAULT_MAX_STEPS: usize = 10_000;

    pub fn new() -> Self {
        Self {
            max_steps: Self::DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_max_steps(max_steps: usize) -> Self {
        Self { max_steps }
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Evaluate a single expression
    ///
    /// Returns `None` for blank input.
    pub fn eval_expression(&self, source: &str, scope: &Scope) -> ExprResult<Option<Value>> {
        if source.trim().is_empty() {
            return Ok(None);
        }
        let expr = Parser::parse_expression(source)?;
        let mut run = Run::new(scope, self.max_steps);
        run.eval(&expr).map(Some)
    }

    /// Run a code block and return the value of its `return` statement
    pub fn run_code(&self, source: &str, scope: &Scope) -> ExprResult<Option<Value>> {
        let program = Parser::parse_program(source)?;
        let mut run = Run::new(scope, self.max_steps);
        match run.exec_block(&program.statements)? {
            Flow::Return(value) => Ok(value),
            Flow::Next => Ok(None),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

enum Flow {
    Next,
    Return(Option<Value>),
}

/// State of one evaluation
struct Run<'a> {
    scope: &'a Scope,
    locals: HashMap<String, Value>,
    steps: usize,
    max_steps: usize,
    depth: usize,
}

const MAX_RUN_DEPTH: usize = Parser::MAX_DEPTH * 2;

impl<'a> Run<'a> {
    fn new(scope: &'a Scope, max_steps: usize) -> Self {
        Self {
            scope,
            locals: HashMap::new(),
            steps: 0,
            max_steps,
            depth: 0,
        }
    }

    fn tick(&mut self) -> ExprResult<()> {
        self.steps += 1;
        if self.steps > self.max_steps {
            tracing::warn!(max_steps = self.max_steps, "Snippet exceeded its step budget");
            return Err(ExprError::StepBudgetExceeded(self.max_steps));
        }
        Ok(())
    }

    fn descend(&mut self) -> ExprResult<()> {
        if self.depth >= MAX_RUN_DEPTH {
            return Err(ExprError::NestingTooDeep(MAX_RUN_DEPTH));
        }
        self.depth += 1;
        Ok(())
    }

    // ── Statements ───────────────────────────────────────────────────

    fn exec_block(&mut self, statements: &[Stmt]) -> ExprResult<Flow> {
        self.descend()?;
        let flow = self.exec_statements(statements);
        self.depth -= 1;
        flow
    }

    fn exec_statements(&mut self, statements: &[Stmt]) -> ExprResult<Flow> {
        for stmt in statements {
            if let Flow::Return(value) = self.exec(stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Next)
    }

    fn exec(&mut self, stmt: &Stmt) -> ExprResult<Flow> {
        self.tick()?;
        match stmt {
            Stmt::Let(name, expr) => {
                let value = self.eval(expr)?;
                self.locals.insert(name.clone(), value);
            }
            Stmt::Assign(name, expr) => {
                if !self.locals.contains_key(name) && !self.scope.contains_key(name) {
                    return Err(ExprError::UnknownIdentifier(name.clone()));
                }
                // Scope entries are read-only; assignment shadows them
                let value = self.eval(expr)?;
                self.locals.insert(name.clone(), value);
            }
            Stmt::Expr(expr) => {
                self.eval(expr)?;
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let branch = if truthy(&self.eval(condition)?) {
                    then_branch
                } else {
                    else_branch
                };
                return self.exec_block(branch);
            }
            Stmt::While { condition, body } => loop {
                self.tick()?;
                if !truthy(&self.eval(condition)?) {
                    break;
                }
                if let Flow::Return(value) = self.exec_block(body)? {
                    return Ok(Flow::Return(value));
                }
            },
            Stmt::Return(expr) => {
                let value = match expr {
                    Some(expr) => Some(self.eval(expr)?),
                    None => None,
                };
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Next)
    }

    // ── Expressions ──────────────────────────────────────────────────

    fn eval(&mut self, expr: &Expr) -> ExprResult<Value> {
        self.tick()?;
        self.descend()?;
        let value = self.eval_node(expr);
        self.depth -= 1;
        value
    }

    fn eval_node(&mut self, expr: &Expr) -> ExprResult<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Undefined => Ok(Value::Null),
            Expr::Ident(name) => self
                .locals
                .get(name)
                .or_else(|| self.scope.get(name))
                .cloned()
                .ok_or_else(|| ExprError::UnknownIdentifier(name.clone())),
            Expr::Member(target, name) => {
                let target = self.eval(target)?;
                member(&target, name)
            }
            Expr::Index(target, index) => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                match &index {
                    Value::String(key) => member(&target, key),
                    Value::Number(_) => index_at(&target, &index),
                    other => Err(ExprError::TypeError(format!(
                        "cannot index with {}",
                        type_name(other)
                    ))),
                }
            }
            Expr::Call(name, args) => {
                let args = args
                    .iter()
                    .map(|a| self.eval(a))
                    .collect::<ExprResult<Vec<_>>>()?;
                call_builtin(name, &args)
            }
            Expr::Unary(op, operand) => {
                let value = self.eval(operand)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!truthy(&value))),
                    UnaryOp::Neg => as_f64(&value)
                        .map(|n| number(-n))
                        .ok_or_else(|| type_error("-", &value)),
                }
            }
            Expr::Binary(BinaryOp::And, left, right) => {
                let left = self.eval(left)?;
                if truthy(&left) {
                    self.eval(right)
                } else {
                    Ok(left)
                }
            }
            Expr::Binary(BinaryOp::Or, left, right) => {
                let left = self.eval(left)?;
                if truthy(&left) {
                    Ok(left)
                } else {
                    self.eval(right)
                }
            }
            Expr::Binary(op, left, right) => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                binary(*op, &left, &right)
            }
            Expr::Conditional(condition, then_expr, else_expr) => {
                if truthy(&self.eval(condition)?) {
                    self.eval(then_expr)
                } else {
                    self.eval(else_expr)
                }
            }
            Expr::Array(items) => items
                .iter()
                .map(|item| self.eval(item))
                .collect::<ExprResult<Vec<_>>>()
                .map(Value::Array),
            Expr::Object(entries) => {
                let mut object = serde_json::Map::new();
                for (key, expr) in entries {
                    let value = self.eval(expr)?;
                    object.insert(key.clone(), value);
                }
                Ok(Value::Object(object))
            }
        }
    }
}

// ── Value semantics ──────────────────────────────────────────────────

/// JavaScript-style truthiness
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_error(op: &str, value: &Value) -> ExprError {
    ExprError::TypeError(format!("'{}' is not defined for {}", op, type_name(value)))
}

fn as_f64(value: &Value) -> Option<f64> {
    value.as_f64()
}

/// Build a JSON number, keeping integral results as integers
fn number(f: f64) -> Value {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        Value::from(f as i64)
    } else {
        serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn member(target: &Value, name: &str) -> ExprResult<Value> {
    match target {
        Value::Object(map) => Ok(map.get(name).cloned().unwrap_or(Value::Null)),
        Value::Array(items) if name == "length" => Ok(Value::from(items.len())),
        Value::String(s) if name == "length" => Ok(Value::from(s.chars().count())),
        Value::Null => Err(ExprError::TypeError(format!(
            "cannot read property '{}' of null",
            name
        ))),
        _ => Ok(Value::Null),
    }
}

fn index_at(target: &Value, index: &Value) -> ExprResult<Value> {
    let Some(i) = index.as_u64() else {
        return Ok(Value::Null);
    };
    let i = i as usize;
    match target {
        Value::Array(items) => Ok(items.get(i).cloned().unwrap_or(Value::Null)),
        Value::String(s) => Ok(s
            .chars()
            .nth(i)
            .map(|c| Value::String(c.to_string()))
            .unwrap_or(Value::Null)),
        Value::Null => Err(ExprError::TypeError(format!(
            "cannot read index {} of null",
            i
        ))),
        _ => Ok(Value::Null),
    }
}

fn loose_eq(left: &Value, right: &Value) -> bool {
    match (as_f64(left), as_f64(right)) {
        (Some(a), Some(b)) => a == b,
        _ => left == right,
    }
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> ExprResult<Value> {
    match op {
        BinaryOp::Eq => return Ok(Value::Bool(loose_eq(left, right))),
        BinaryOp::NotEq => return Ok(Value::Bool(!loose_eq(left, right))),
        BinaryOp::Add => {
            if left.is_string() || right.is_string() {
                return Ok(Value::String(display(left) + &display(right)));
            }
        }
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            if let (Value::String(a), Value::String(b)) = (left, right) {
                return Ok(Value::Bool(compare(op, a.cmp(b))));
            }
        }
        _ => {}
    }

    let (Some(a), Some(b)) = (as_f64(left), as_f64(right)) else {
        let culprit = if as_f64(left).is_none() { left } else { right };
        return Err(type_error(op_symbol(op), culprit));
    };

    match op {
        BinaryOp::Add => Ok(number(a + b)),
        BinaryOp::Sub => Ok(number(a - b)),
        BinaryOp::Mul => Ok(number(a * b)),
        BinaryOp::Div | BinaryOp::Rem if b == 0.0 => Err(ExprError::DivisionByZero),
        BinaryOp::Div => Ok(number(a / b)),
        BinaryOp::Rem => Ok(number(a % b)),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            let ordering = a.partial_cmp(&b).ok_or_else(|| {
                ExprError::TypeError("cannot compare NaN".into())
            })?;
            Ok(Value::Bool(compare(op, ordering)))
        }
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::And | BinaryOp::Or => {
            unreachable!("handled before numeric evaluation")
        }
    }
}

fn compare(op: BinaryOp, ordering: std::cmp::Ordering) -> bool {
    use std::cmp::Ordering::{Equal, Greater, Less};
    match op {
        BinaryOp::Lt => ordering == Less,
        BinaryOp::LtEq => ordering != Greater,
        BinaryOp::Gt => ordering == Greater,
        BinaryOp::GtEq => ordering != Less,
        _ => ordering == Equal,
    }
}

fn op_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Rem => "%",
        BinaryOp::Eq => "==",
        BinaryOp::NotEq => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::LtEq => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::GtEq => ">=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
    }
}

// ── Builtins ─────────────────────────────────────────────────────────

fn expect_arity(name: &str, args: &[Value], expected: usize) -> ExprResult<()> {
    if args.len() != expected {
        return Err(ExprError::Arity {
            name: name.to_string(),
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

fn string_arg<'v>(name: &str, value: &'v Value) -> ExprResult<&'v str> {
    value.as_str().ok_or_else(|| type_error(name, value))
}

fn number_arg(name: &str, value: &Value) -> ExprResult<f64> {
    as_f64(value).ok_or_else(|| type_error(name, value))
}

fn call_builtin(name: &str, args: &[Value]) -> ExprResult<Value> {
    match name {
        "len" => {
            expect_arity(name, args, 1)?;
            match &args[0] {
                Value::String(s) => Ok(Value::from(s.chars().count())),
                Value::Array(items) => Ok(Value::from(items.len())),
                Value::Object(map) => Ok(Value::from(map.len())),
                other => Err(type_error(name, other)),
            }
        }
        "upper" | "lower" | "trim" => {
            expect_arity(name, args, 1)?;
            let s = string_arg(name, &args[0])?;
            let out = match name {
                "upper" => s.to_uppercase(),
                "lower" => s.to_lowercase(),
                _ => s.trim().to_string(),
            };
            Ok(Value::String(out))
        }
        "includes" => {
            expect_arity(name, args, 2)?;
            let found = match (&args[0], &args[1]) {
                (Value::Array(items), needle) => items.iter().any(|i| loose_eq(i, needle)),
                (Value::String(s), Value::String(needle)) => s.contains(needle.as_str()),
                (Value::Object(map), Value::String(key)) => map.contains_key(key),
                (other, _) => return Err(type_error(name, other)),
            };
            Ok(Value::Bool(found))
        }
        "keys" => {
            expect_arity(name, args, 1)?;
            match &args[0] {
                Value::Object(map) => Ok(Value::Array(
                    map.keys().map(|k| Value::String(k.clone())).collect(),
                )),
                other => Err(type_error(name, other)),
            }
        }
        "join" => {
            expect_arity(name, args, 2)?;
            let Value::Array(items) = &args[0] else {
                return Err(type_error(name, &args[0]));
            };
            let sep = string_arg(name, &args[1])?;
            let parts: Vec<String> = items.iter().map(display).collect();
            Ok(Value::String(parts.join(sep)))
        }
        "abs" | "round" | "floor" | "ceil" => {
            expect_arity(name, args, 1)?;
            let n = number_arg(name, &args[0])?;
            let out = match name {
                "abs" => n.abs(),
                "round" => n.round(),
                "floor" => n.floor(),
                _ => n.ceil(),
            };
            Ok(number(out))
        }
        "min" | "max" => {
            if args.is_empty() {
                return Err(ExprError::Arity {
                    name: name.to_string(),
                    expected: 1,
                    found: 0,
                });
            }
            let mut best = number_arg(name, &args[0])?;
            for arg in &args[1..] {
                let n = number_arg(name, arg)?;
                best = if name == "min" { best.min(n) } else { best.max(n) };
            }
            Ok(number(best))
        }
        "str" => {
            expect_arity(name, args, 1)?;
            Ok(Value::String(display(&args[0])))
        }
        "num" => {
            expect_arity(name, args, 1)?;
            match &args[0] {
                Value::Number(_) => Ok(args[0].clone()),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(number)
                    .map_err(|_| ExprError::TypeError(format!("'{}' is not a number", s))),
                Value::Bool(b) => Ok(Value::from(u8::from(*b))),
                other => Err(type_error(name, other)),
            }
        }
        _ => Err(ExprError::UnknownFunction(name.to_string())),
    }
}
