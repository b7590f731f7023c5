//! Tree-walking evaluator.
//!
//! Consumes the AST arena, the resolver's side table, and the environment
//! chain; produces side effects (via the output sink) and a value per
//! top-level expression statement.  Execution stops at the first runtime
//! error, which is returned as a structured diagnostic.
//!
//! Early return is modelled as a tagged outcome, not an error: statement
//! execution yields [`Control::Complete`] or [`Control::Return`], and block
//! and function execution check the outcome after every statement.  Runtime
//! errors travel separately through `Result`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Ast, Expr, ExprId, LiteralValue, Stmt};
use crate::callable::{natives, Callable, LarchFunction};
use crate::environment::{EnvRef, Environment};
use crate::error::{LarchError, Result};
use crate::token::{Token, TokenKind};
use crate::value::Value;

/// Bound on user-level call nesting.  Exceeding it surfaces as a
/// `StackOverflow` diagnostic instead of exhausting the host stack.  Each
/// interpreted call costs several host frames, so the bound is sized to
/// leave the guard ample headroom even on a 2 MiB test-thread stack.
pub const MAX_CALL_DEPTH: usize = 64;

/// Outcome of executing one statement.
#[derive(Debug)]
pub enum Control {
    /// The statement ran to completion; continue with the next one.
    Complete,

    /// A `return` was executed; unwind to the enclosing function call,
    /// carrying its value.
    Return(Value),
}

/// Where `println` output goes.  The buffer variant exists so embedders and
/// tests can observe output without capturing stdout.
#[derive(Debug)]
enum Sink {
    Stdout,
    Buffer(Vec<String>),
}

pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    /// Resolver side table: expression handle → scope distance.  An absent
    /// entry means the name resolves dynamically through the global frame.
    locals: HashMap<ExprId, usize>,
    call_depth: usize,
    sink: Sink,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Create an interpreter with `clock` and `println` installed in a fresh
    /// global frame, printing to stdout.
    pub fn new() -> Self {
        Self::with_sink(Sink::Stdout)
    }

    /// Like [`Interpreter::new`], but `println` output is collected into an
    /// internal buffer retrievable with [`Interpreter::take_output`].
    pub fn with_buffered_output() -> Self {
        Self::with_sink(Sink::Buffer(Vec::new()))
    }

    fn with_sink(sink: Sink) -> Self {
        info!("Initializing interpreter");

        let globals: EnvRef = Rc::new(RefCell::new(Environment::new()));

        for native in natives() {
            let name = native.name();
            globals.borrow_mut().define(name, Value::Native(native.clone()));

            debug!("Defined native function '{}'", name);
        }

        Self {
            environment: globals.clone(),
            globals,
            locals: HashMap::new(),
            call_depth: 0,
            sink,
        }
    }

    /// Record a resolved local: the expression at `id` binds `distance`
    /// scopes above the frame current when it executes.  Called by the
    /// resolver; globals get no entry.
    pub fn note_local(&mut self, id: ExprId, distance: usize) {
        self.locals.insert(id, distance);
    }

    /// Write one line of program output to the configured sink.
    pub(crate) fn write_line(&mut self, text: String) {
        match &mut self.sink {
            Sink::Stdout => println!("{}", text),
            Sink::Buffer(lines) => lines.push(text),
        }
    }

    /// Drain buffered output lines.  Empty when printing to stdout.
    pub fn take_output(&mut self) -> Vec<String> {
        match &mut self.sink {
            Sink::Stdout => Vec::new(),
            Sink::Buffer(lines) => std::mem::take(lines),
        }
    }

    // ───────────────────────── statement execution ──────────────────────────

    /// Evaluate a statement list in order, collecting the value of each
    /// top-level expression statement.  Stops at the first runtime error.
    pub fn interpret(&mut self, ast: &Ast, statements: &[Stmt]) -> Result<Vec<Value>> {
        debug!("Interpreting {} statement(s)", statements.len());

        let mut values: Vec<Value> = Vec::new();

        for stmt in statements {
            if let Stmt::Expression(id) = stmt {
                values.push(self.evaluate(ast, *id)?);
                continue;
            }

            if let Control::Return(_) = self.execute(ast, stmt)? {
                // The resolver rejects `return` outside a function, so a
                // top-level Return only occurs when callers skip resolution.
                break;
            }
        }

        info!("Interpretation completed");

        Ok(values)
    }

    /// Execute a single statement against the current environment chain.
    pub fn execute(&mut self, ast: &Ast, stmt: &Stmt) -> Result<Control> {
        match stmt {
            Stmt::Expression(id) => {
                self.evaluate(ast, *id)?;

                Ok(Control::Complete)
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(id) => self.evaluate(ast, *id)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}' = {}", name.lexeme, value);

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(Control::Complete)
            }

            Stmt::Block(statements) => {
                let frame = Environment::with_enclosing(self.environment.clone());

                self.execute_block(ast, statements, frame)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(ast, *condition)?.is_truthy() {
                    self.execute(ast, then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(ast, else_branch)
                } else {
                    Ok(Control::Complete)
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(ast, *condition)?.is_truthy() {
                    if let Control::Return(value) = self.execute(ast, body)? {
                        return Ok(Control::Return(value));
                    }
                }

                Ok(Control::Complete)
            }

            Stmt::Function(declaration) => {
                // The closure captures the frame current at the definition
                // site; it shares ownership for as long as the value lives.
                let function = LarchFunction {
                    declaration: declaration.clone(),
                    closure: self.environment.clone(),
                };

                debug!(
                    "Defining function '{}' with {} parameter(s)",
                    declaration.name.lexeme,
                    declaration.params.len()
                );

                self.environment.borrow_mut().define(
                    &declaration.name.lexeme,
                    Value::Function(Rc::new(function)),
                );

                Ok(Control::Complete)
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(id) => self.evaluate(ast, *id)?,
                    None => Value::Nil,
                };

                Ok(Control::Return(value))
            }
        }
    }

    /// Execute `statements` with `frame` as the current environment, then
    /// restore the previous frame on every exit path (completion, early
    /// return, or error).
    pub(crate) fn execute_block(
        &mut self,
        ast: &Ast,
        statements: &[Stmt],
        frame: Environment,
    ) -> Result<Control> {
        let previous: EnvRef =
            std::mem::replace(&mut self.environment, Rc::new(RefCell::new(frame)));

        let mut outcome: Result<Control> = Ok(Control::Complete);

        for stmt in statements {
            match self.execute(ast, stmt) {
                Ok(Control::Complete) => continue,
                other => {
                    outcome = other;
                    break;
                }
            }
        }

        self.environment = previous;

        outcome
    }

    // ───────────────────────── expression evaluation ─────────────────────────

    /// Evaluate the expression at `id` to a value.
    pub fn evaluate(&mut self, ast: &Ast, id: ExprId) -> Result<Value> {
        match ast.expr(id) {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::Str(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(ast, *inner),

            Expr::Unary { operator, right } => {
                let right = self.evaluate(ast, *right);
                self.evaluate_unary(operator.clone(), right?)
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let operator = operator.clone();
                let left = self.evaluate(ast, *left)?;
                let right = self.evaluate(ast, *right)?;

                self.evaluate_binary(left, &operator, right)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let or = operator.kind == TokenKind::OR;
                let (left, right) = (*left, *right);
                let left = self.evaluate(ast, left)?;

                // Short-circuit: the right operand is evaluated only when
                // the left one does not decide the result.
                if or && left.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                if !or && !left.is_truthy() {
                    return Ok(Value::Bool(false));
                }

                Ok(Value::Bool(self.evaluate(ast, right)?.is_truthy()))
            }

            Expr::Variable(name) => self.look_up_variable(name, id),

            Expr::Assign { name, value } => {
                let name = name.clone();
                let value = self.evaluate(ast, *value)?;

                match self.locals.get(&id) {
                    Some(&distance) => Environment::assign_at(
                        &self.environment,
                        distance,
                        &name.lexeme,
                        value.clone(),
                        name.line,
                    )?,
                    None => self.globals.borrow_mut().assign(
                        &name.lexeme,
                        value.clone(),
                        name.line,
                    )?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let paren = paren.clone();
                let (callee, arguments) = (*callee, arguments.clone());

                let callee: Value = self.evaluate(ast, callee)?;

                let mut values: Vec<Value> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(ast, argument)?);
                }

                self.invoke(ast, callee, values, &paren)
            }
        }
    }

    fn evaluate_unary(&mut self, operator: Token, right: Value) -> Result<Value> {
        match operator.kind {
            TokenKind::MINUS => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(LarchError::type_error(
                    operator.line,
                    "Operand must be a number",
                )),
            },

            TokenKind::BANG => Ok(Value::Bool(!right.is_truthy())),

            _ => Err(LarchError::type_error(operator.line, "Invalid unary operator")),
        }
    }

    fn evaluate_binary(&mut self, left: Value, operator: &Token, right: Value) -> Result<Value> {
        let line = operator.line;

        match operator.kind {
            TokenKind::PLUS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
                _ => Err(LarchError::type_error(
                    line,
                    "Operands must be two numbers or two strings",
                )),
            },

            TokenKind::MINUS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
                _ => Err(LarchError::type_error(line, "Operands must be numbers")),
            },

            TokenKind::STAR => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
                _ => Err(LarchError::type_error(line, "Operands must be numbers")),
            },

            // Division by zero follows IEEE-754 (yields an infinity or NaN).
            TokenKind::SLASH => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
                _ => Err(LarchError::type_error(line, "Operands must be numbers")),
            },

            TokenKind::GREATER => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a > b)),
                _ => Err(LarchError::type_error(line, "Operands must be numbers")),
            },

            TokenKind::GREATER_EQUAL => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a >= b)),
                _ => Err(LarchError::type_error(line, "Operands must be numbers")),
            },

            TokenKind::LESS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a < b)),
                _ => Err(LarchError::type_error(line, "Operands must be numbers")),
            },

            TokenKind::LESS_EQUAL => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a <= b)),
                _ => Err(LarchError::type_error(line, "Operands must be numbers")),
            },

            TokenKind::EQUAL_EQUAL => Ok(Value::Bool(left == right)),

            TokenKind::BANG_EQUAL => Ok(Value::Bool(left != right)),

            _ => Err(LarchError::type_error(line, "Invalid binary operator")),
        }
    }

    /// Side table first; a recorded distance targets exactly that ancestor
    /// frame, otherwise fall back to the global frame.
    fn look_up_variable(&self, name: &Token, id: ExprId) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => {
                Environment::get_at(&self.environment, distance, &name.lexeme, name.line)
            }
            None => self.globals.borrow().get(&name.lexeme, name.line),
        }
    }

    fn invoke(
        &mut self,
        ast: &Ast,
        callee: Value,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value> {
        let Some(callable) = callee.as_callable() else {
            return Err(LarchError::not_callable(paren.line));
        };

        if arguments.len() != callable.arity() {
            return Err(LarchError::arity(
                paren.line,
                callable.arity(),
                arguments.len(),
            ));
        }

        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(LarchError::stack_overflow(paren.line));
        }

        self.call_depth += 1;
        let result = callable.call(self, ast, arguments);
        self.call_depth -= 1;

        result
    }
}
