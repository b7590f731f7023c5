//! Static resolver pass.
//!
//! One depth-first walk over the AST that does three things:
//! 1. Builds lexical scopes (a stack of `HashMap<String, bool>` tracking
//!    declared-but-not-yet-usable vs ready names).
//! 2. Reports static errors: reading a local in its own initializer,
//!    redeclaring a name in the same local scope, `return` outside a
//!    function.
//! 3. Records, for every variable occurrence that resolves to a local, how
//!    many scopes away its binding lives, by writing the interpreter's side
//!    table (keyed by expression handle).  Names found in no local scope get
//!    no entry and resolve through the global frame at run time.
//!
//! The walk mutates only the side table; the AST itself is untouched and
//! nothing is evaluated.

use crate::ast::{Ast, Expr, ExprId, Stmt};
use crate::error::{LarchError, Result};
use crate::interpreter::Interpreter;
use crate::token::Token;
use log::{debug, info};
use std::collections::HashMap;

/// Are we inside a user function?  Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
}

/// Resolver: tracks scopes, enforces static rules, and records binding
/// distances by calling back into the interpreter.
pub struct Resolver<'i> {
    interpreter: &'i mut Interpreter,
    scopes: Vec<HashMap<String, bool>>, // false=declared, true=defined
    current_function: FunctionType,
}

impl<'i> Resolver<'i> {
    /// Create a new resolver bound to the given interpreter.
    pub fn new(interpreter: &'i mut Interpreter) -> Self {
        info!("Resolver instantiated");

        Resolver {
            interpreter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
        }
    }

    /// Walk all top-level statements.
    pub fn resolve(&mut self, ast: &Ast, statements: &[Stmt]) -> Result<()> {
        info!("Beginning resolve pass over {} statement(s)", statements.len());

        for stmt in statements {
            self.resolve_stmt(ast, stmt)?;
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, ast: &Ast, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Expression(expr) => {
                self.resolve_expr(ast, *expr)?;
            }

            Stmt::Var { name, initializer } => {
                // declare → resolve initializer → define; the gap is what
                // catches `var a = a;`.
                self.declare(name)?;
                if let Some(expr) = initializer {
                    self.resolve_expr(ast, *expr)?;
                }
                self.define(name);
            }

            Stmt::Block(statements) => {
                self.begin_scope();
                for s in statements {
                    self.resolve_stmt(ast, s)?;
                }
                self.end_scope();
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(ast, *condition)?;
                self.resolve_stmt(ast, then_branch)?;
                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(ast, eb)?;
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(ast, *condition)?;
                self.resolve_stmt(ast, body)?;
            }

            Stmt::Function(declaration) => {
                // The function's own name is declared and defined in the
                // enclosing scope *before* the body is resolved, so the body
                // can recurse into it.
                self.declare(&declaration.name)?;
                self.define(&declaration.name);

                self.resolve_function(ast, &declaration.params, &declaration.body)?;
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    return Err(LarchError::resolve(
                        keyword.line,
                        "'return' used outside of function",
                    ));
                }
                if let Some(expr) = value {
                    self.resolve_expr(ast, *expr)?;
                }
            }
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, ast: &Ast, id: ExprId) -> Result<()> {
        match ast.expr(id) {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => {
                self.resolve_expr(ast, *inner)?;
            }

            Expr::Unary { right, .. } => {
                self.resolve_expr(ast, *right)?;
            }

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(ast, *left)?;
                self.resolve_expr(ast, *right)?;
            }

            Expr::Variable(name) => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(name.lexeme.as_str()) == Some(&false) {
                        return Err(LarchError::resolve(
                            name.line,
                            "Cannot read local variable in its own initializer",
                        ));
                    }
                }

                self.resolve_local(id, name);
            }

            Expr::Assign { name, value } => {
                // RHS first, then bind the target occurrence.
                self.resolve_expr(ast, *value)?;
                self.resolve_local(id, name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(ast, *callee)?;
                for arg in arguments {
                    self.resolve_expr(ast, *arg)?;
                }
            }
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Enter a fresh scope for a function's parameters + body.  Each
    /// parameter is declared and defined exactly once.
    fn resolve_function(&mut self, ast: &Ast, params: &[Token], body: &[Stmt]) -> Result<()> {
        let enclosing = self.current_function;
        self.current_function = FunctionType::Function;

        self.begin_scope();
        for param in params {
            self.declare(param)?;
            self.define(param);
        }
        for stmt in body {
            self.resolve_stmt(ast, stmt)?;
        }
        self.end_scope();

        self.current_function = enclosing;

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Insert `name` into the innermost scope as not-yet-usable.  Top-level
    /// declarations live in the global frame and are not tracked here.
    fn declare(&mut self, name: &Token) -> Result<()> {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(name.lexeme.as_str()) {
                return Err(LarchError::resolve(
                    name.line,
                    "Variable already declared in this scope",
                ));
            }
            scope.insert(name.lexeme.clone(), false);
        }

        Ok(())
    }

    /// Flip `name` to usable once its initializer (if any) has resolved.
    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding-distance helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Record this variable occurrence as a local at the distance of the
    /// innermost scope containing it, or leave it to resolve dynamically as
    /// a global when no scope contains it.
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (distance, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name.lexeme.as_str()) {
                debug!("Resolved '{}' at distance {}", name.lexeme, distance);

                self.interpreter.note_local(id, distance);
                return;
            }
        }

        debug!("Resolved '{}' as global", name.lexeme);
    }
}
