//! AST model: the two closed variant sets (expressions and statements) plus
//! the arena that gives every expression node a stable integer identity.
//!
//! Identity matters because the resolver's side table is keyed per
//! *occurrence*: two syntactically identical `x` reads in different places
//! must be distinct entries.  Rather than relying on pointer identity, every
//! expression is allocated into a single [`Ast`] arena and addressed by its
//! [`ExprId`] handle; the handle is the side-table key.
//!
//! Nodes are immutable once parsed.  Statements own their children directly;
//! function declarations are wrapped in `Rc` so a function value (closure)
//! can share its body with the declaration site.

use std::rc::Rc;

use crate::token::Token;

/// Stable handle of an expression node inside an [`Ast`] arena.
///
/// Handles are allocated monotonically and never invalidated, so they stay
/// valid across successive parses into the same arena (one interactive
/// session keeps a single growing arena).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(u32);

/// A **literal constant** that appears directly in the source code.
///
/// These variants are the terminal leaves of the expression tree; the parser
/// copies the value out of the token at parse time.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal, stored as IEEE-754 `f64`.
    /// Integral lexemes such as `"3"` are still parsed as `3.0`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    /// The boolean constant `true`.
    True,

    /// The boolean constant `false`.
    False,

    /// The `nil` literal.
    Nil,
}

/// Expression node.  Child expressions are arena handles, not boxes.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Parenthesised sub-expression: `"(" expression ")"`.
    Grouping(ExprId),

    /// Prefix unary operator expression, `!ready` or `-42`.
    Unary {
        /// The operator token (`!` or `-`).
        operator: Token,
        right: ExprId,
    },

    /// Infix binary operator expression, `a + b`, `x <= y`.
    Binary {
        left: ExprId,
        /// Operator token such as `+`, `*`, `==`, …
        operator: Token,
        right: ExprId,
    },

    /// Short-circuiting logical operators `and` / `or`.
    Logical {
        left: ExprId,
        operator: Token,
        right: ExprId,
    },

    /// Variable access; resolves through the side table or the global frame.
    Variable(Token),

    /// Assignment expression: `identifier "=" expression`.
    Assign { name: Token, value: ExprId },

    /// Call expression, `clock()` or `add(1, 2)`.
    Call {
        /// Expression that must evaluate to a callable.
        callee: ExprId,
        /// The closing `)` token, retained for error reporting.
        paren: Token,
        /// Argument list (may be empty), evaluated left-to-right.
        arguments: Vec<ExprId>,
    },
}

/// Statement node.  A program is a sequence of these returned by the parser.
/// `for` loops never appear here; the parser desugars them into
/// `Block`/`While` at parse time.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// Stand-alone expression terminated by a semicolon.
    Expression(ExprId),

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: Token,
        initializer: Option<ExprId>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt>),

    /// `if` / `else` conditional.
    If {
        condition: ExprId,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// `while` loop.
    While { condition: ExprId, body: Box<Stmt> },

    /// Function declaration; becomes a first-class callable value whose
    /// closure shares this declaration.
    Function(Rc<FunctionDecl>),

    /// `return` statement inside a function body.
    Return {
        /// The `return` keyword token (for error locations).
        keyword: Token,

        /// Optional expression to return.  Absent means `nil`.
        value: Option<ExprId>,
    },
}

/// A parsed `fun` declaration: name, ordered parameters, body.
#[derive(Debug)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

/// Arena of expression nodes.  All expressions of a session live here; the
/// arena only grows, so [`ExprId`]s held by closures from earlier parses
/// remain valid.
#[derive(Debug, Default)]
pub struct Ast {
    exprs: Vec<Expr>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an expression node, returning its stable handle.
    pub fn alloc(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(self.exprs.len() as u32);
        self.exprs.push(expr);
        id
    }

    /// Look up a node by handle.
    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.0 as usize]
    }

    /// Number of allocated expression nodes.
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}
