/*!
Recursive-descent parser for Larch.

Grammar (EBNF, lowest to highest precedence; every binary level is
left-associative, assignment is right-associative):

```text
program        → declaration* EOF ;
declaration    → funDecl | varDecl | statement ;
funDecl        → "fun" IDENT "(" parameters? ")" block ;
varDecl        → "var" IDENT ( "=" expression )? ";" ;
statement      → exprStmt | ifStmt | whileStmt | forStmt
               | block | returnStmt ;
exprStmt       → expression ";" ;
ifStmt         → "if" "(" expression ")" statement ( "else" statement )? ;
whileStmt      → "while" "(" expression ")" statement ;
forStmt        → "for" "(" ( varDecl | exprStmt | ";" )
               expression? ";" expression? ")" statement ;
block          → "{" declaration* "}" ;
parameters     → IDENT ( "," IDENT )* ;
expression     → assignment ;
assignment     → IDENT "=" assignment | logic_or ;
logic_or       → logic_and ( "or" logic_and )* ;
logic_and      → equality  ( "and" equality )* ;
equality       → comparison ( ( "!=" | "==" ) comparison )* ;
comparison     → term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
term           → factor ( ( "-" | "+" ) factor )* ;
factor         → unary ( ( "/" | "*" ) unary )* ;
unary          → ( "!" | "-" ) unary | call ;
call           → primary ( "(" arguments? ")" )* ;
arguments      → expression ( "," expression )* ;
primary        → NUMBER | STRING | "true" | "false" | "nil"
               | IDENT | "(" expression ")" ;
```

`for` has no AST node of its own: it desugars here into an optional
initializer, a `while` whose condition defaults to literal `true`, and a body
followed by the increment, wrapped in blocks so the runtime behavior is
identical to the hand-written equivalent.

The parser aborts the whole parse at the first structural violation; there is
no statement-level synchronization.  Expressions are allocated into the
session's [`Ast`] arena as they are built.

Parsing is recursive, so combined statement/expression nesting is bounded by
[`MAX_NESTING_DEPTH`]; source that nests deeper is rejected with a syntax
error rather than overrunning the host stack.  The bound also caps the depth
of the produced tree, which keeps the evaluator's own recursion bounded.
*/

use crate::ast::{Ast, Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::error::{LarchError, Result};
use crate::token::{Token, TokenKind};

use log::{debug, info};
use std::rc::Rc;

/// Maximum combined nesting depth of statements and expressions.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Top-level parser over an immutable slice of tokens, allocating expression
/// nodes into the arena it borrows.
pub struct Parser<'t, 'a> {
    tokens: &'t [Token],
    current: usize,
    depth: usize,
    ast: &'a mut Ast,
}

impl<'t, 'a> Parser<'t, 'a> {
    /// Construct a new parser.
    pub fn new(tokens: &'t [Token], ast: &'a mut Ast) -> Self {
        info!("Parser created with {} tokens", tokens.len());

        Self {
            tokens,
            current: 0,
            depth: 0,
            ast,
        }
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse an entire program and return its statement list, consuming the
    /// token sequence up to EOF.  Fails on the first structural violation.
    pub fn parse(&mut self) -> Result<Vec<Stmt>> {
        info!("Beginning parse phase");

        let mut statements: Vec<Stmt> = Vec::new();

        while !self.is_at_end() {
            statements.push(self.declaration()?);
        }

        Ok(statements)
    }

    // ──────────────────────── declaration rules ───────────────────

    fn declaration(&mut self) -> Result<Stmt> {
        debug!("Entering declaration");

        self.descend()?;

        let stmt: Result<Stmt> = if self.matches(TokenKind::FUN) {
            self.function_declaration()
        } else if self.matches(TokenKind::VAR) {
            self.var_declaration()
        } else {
            self.statement()
        };
        let stmt = stmt?;

        self.ascend();

        Ok(stmt)
    }

    fn function_declaration(&mut self) -> Result<Stmt> {
        let name: Token = self.consume(TokenKind::IDENTIFIER, "Expected function name")?;

        self.consume(TokenKind::LEFT_PAREN, "Expected '(' after function name")?;

        let mut params: Vec<Token> = Vec::new();

        if !self.check(TokenKind::RIGHT_PAREN) {
            loop {
                params.push(self.consume(TokenKind::IDENTIFIER, "Expected parameter name")?);

                if !self.matches(TokenKind::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenKind::RIGHT_PAREN, "Expected ')' after parameters")?;
        self.consume(TokenKind::LEFT_BRACE, "Expected '{' before function body")?;

        let body = self.block()?;

        Ok(Stmt::Function(Rc::new(FunctionDecl { name, params, body })))
    }

    fn var_declaration(&mut self) -> Result<Stmt> {
        let name: Token = self.consume(TokenKind::IDENTIFIER, "Expected variable name")?;

        let initializer: Option<ExprId> = if self.matches(TokenKind::EQUAL) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            TokenKind::SEMICOLON,
            "Expected ';' after variable declaration",
        )?;

        Ok(Stmt::Var { name, initializer })
    }

    // ───────────────────────── statement rules ────────────────────

    fn statement(&mut self) -> Result<Stmt> {
        self.descend()?;

        let stmt: Result<Stmt> = if self.matches(TokenKind::FOR) {
            self.for_statement()
        } else if self.matches(TokenKind::IF) {
            self.if_statement()
        } else if self.matches(TokenKind::WHILE) {
            self.while_statement()
        } else if self.matches(TokenKind::RETURN) {
            self.return_statement()
        } else if self.matches(TokenKind::LEFT_BRACE) {
            Ok(Stmt::Block(self.block()?))
        } else {
            self.expression_statement()
        };
        let stmt = stmt?;

        self.ascend();

        Ok(stmt)
    }

    /// Parse a `for` statement and desugar it into initializer + `while` +
    /// increment.  An omitted condition becomes literal `true`.
    fn for_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenKind::LEFT_PAREN, "Expected '(' after 'for'")?;

        let initializer: Option<Stmt> = if self.matches(TokenKind::SEMICOLON) {
            None
        } else if self.matches(TokenKind::VAR) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition: Option<ExprId> = if !self.check(TokenKind::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::SEMICOLON, "Expected ';' after loop condition")?;

        let increment: Option<ExprId> = if !self.check(TokenKind::RIGHT_PAREN) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::RIGHT_PAREN, "Expected ')' after for clauses")?;

        let mut body: Stmt = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }

        let condition: ExprId = match condition {
            Some(c) => c,
            None => self.ast.alloc(Expr::Literal(LiteralValue::True)),
        };

        body = Stmt::While {
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenKind::LEFT_PAREN, "Expected '(' after 'if'")?;
        let condition: ExprId = self.expression()?;
        self.consume(TokenKind::RIGHT_PAREN, "Expected ')' after condition")?;

        let then_branch: Box<Stmt> = Box::new(self.statement()?);
        let else_branch: Option<Box<Stmt>> = if self.matches(TokenKind::ELSE) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenKind::LEFT_PAREN, "Expected '(' after 'while'")?;
        let condition: ExprId = self.expression()?;
        self.consume(TokenKind::RIGHT_PAREN, "Expected ')' after condition")?;
        let body: Box<Stmt> = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    fn return_statement(&mut self) -> Result<Stmt> {
        let keyword: Token = self.previous().clone();
        let value: Option<ExprId> = if !self.check(TokenKind::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenKind::SEMICOLON, "Expected ';' after return value")?;

        Ok(Stmt::Return { keyword, value })
    }

    fn block(&mut self) -> Result<Vec<Stmt>> {
        let mut statements: Vec<Stmt> = Vec::new();

        while !self.check(TokenKind::RIGHT_BRACE) && !self.is_at_end() {
            statements.push(self.declaration()?);
        }

        self.consume(TokenKind::RIGHT_BRACE, "Expected '}' after block")?;

        Ok(statements)
    }

    fn expression_statement(&mut self) -> Result<Stmt> {
        let expr: ExprId = self.expression()?;
        self.consume(TokenKind::SEMICOLON, "Expected ';' after expression")?;

        Ok(Stmt::Expression(expr))
    }

    // ─────────────────────── expression rules ─────────────────────

    fn expression(&mut self) -> Result<ExprId> {
        self.descend()?;

        let expr = self.assignment()?;

        self.ascend();

        Ok(expr)
    }

    fn assignment(&mut self) -> Result<ExprId> {
        let expr: ExprId = self.logical_or()?;

        if self.matches(TokenKind::EQUAL) {
            let equals: Token = self.previous().clone();
            let value: ExprId = self.expression()?;

            // The left-hand side must already have parsed as a bare variable
            // reference; anything else cannot be assigned to.
            if let Expr::Variable(name) = self.ast.expr(expr) {
                let name = name.clone();

                return Ok(self.ast.alloc(Expr::Assign { name, value }));
            }

            return Err(LarchError::parse(equals.line, "Invalid assignment target"));
        }

        Ok(expr)
    }

    fn logical_or(&mut self) -> Result<ExprId> {
        let mut expr: ExprId = self.logical_and()?;

        while self.matches(TokenKind::OR) {
            let operator: Token = self.previous().clone();
            let right: ExprId = self.logical_and()?;

            expr = self.ast.alloc(Expr::Logical {
                left: expr,
                operator,
                right,
            });
        }

        Ok(expr)
    }

    fn logical_and(&mut self) -> Result<ExprId> {
        let mut expr: ExprId = self.equality()?;

        while self.matches(TokenKind::AND) {
            let operator: Token = self.previous().clone();
            let right: ExprId = self.equality()?;

            expr = self.ast.alloc(Expr::Logical {
                left: expr,
                operator,
                right,
            });
        }

        Ok(expr)
    }

    fn equality(&mut self) -> Result<ExprId> {
        let mut expr: ExprId = self.comparison()?;

        while self.matches(TokenKind::BANG_EQUAL) || self.matches(TokenKind::EQUAL_EQUAL) {
            let operator: Token = self.previous().clone();
            let right: ExprId = self.comparison()?;

            expr = self.ast.alloc(Expr::Binary {
                left: expr,
                operator,
                right,
            });
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> Result<ExprId> {
        let mut expr: ExprId = self.term()?;

        while self.matches(TokenKind::GREATER)
            || self.matches(TokenKind::GREATER_EQUAL)
            || self.matches(TokenKind::LESS)
            || self.matches(TokenKind::LESS_EQUAL)
        {
            let operator: Token = self.previous().clone();
            let right: ExprId = self.term()?;

            expr = self.ast.alloc(Expr::Binary {
                left: expr,
                operator,
                right,
            });
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<ExprId> {
        let mut expr: ExprId = self.factor()?;

        while self.matches(TokenKind::MINUS) || self.matches(TokenKind::PLUS) {
            let operator: Token = self.previous().clone();
            let right: ExprId = self.factor()?;

            expr = self.ast.alloc(Expr::Binary {
                left: expr,
                operator,
                right,
            });
        }

        Ok(expr)
    }

    fn factor(&mut self) -> Result<ExprId> {
        let mut expr: ExprId = self.unary()?;

        while self.matches(TokenKind::STAR) || self.matches(TokenKind::SLASH) {
            let operator: Token = self.previous().clone();
            let right: ExprId = self.unary()?;

            expr = self.ast.alloc(Expr::Binary {
                left: expr,
                operator,
                right,
            });
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<ExprId> {
        if self.matches(TokenKind::BANG) || self.matches(TokenKind::MINUS) {
            // Self-recursive without passing through `expression`, so the
            // nesting bound is enforced here as well.
            self.descend()?;

            let operator: Token = self.previous().clone();
            let right: ExprId = self.unary()?;

            self.ascend();

            return Ok(self.ast.alloc(Expr::Unary { operator, right }));
        }

        self.call()
    }

    fn call(&mut self) -> Result<ExprId> {
        let mut expr: ExprId = self.primary()?;

        while self.matches(TokenKind::LEFT_PAREN) {
            expr = self.finish_call(expr)?;
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: ExprId) -> Result<ExprId> {
        let mut arguments: Vec<ExprId> = Vec::new();

        if !self.check(TokenKind::RIGHT_PAREN) {
            loop {
                arguments.push(self.expression()?);

                if !self.matches(TokenKind::COMMA) {
                    break;
                }
            }
        }

        let paren: Token = self
            .consume(TokenKind::RIGHT_PAREN, "Expected ')' after arguments")?;

        Ok(self.ast.alloc(Expr::Call {
            callee,
            paren,
            arguments,
        }))
    }

    fn primary(&mut self) -> Result<ExprId> {
        if self.matches(TokenKind::FALSE) {
            return Ok(self.ast.alloc(Expr::Literal(LiteralValue::False)));
        }
        if self.matches(TokenKind::TRUE) {
            return Ok(self.ast.alloc(Expr::Literal(LiteralValue::True)));
        }
        if self.matches(TokenKind::NIL) {
            return Ok(self.ast.alloc(Expr::Literal(LiteralValue::Nil)));
        }

        if let TokenKind::NUMBER(n) = self.peek().kind {
            self.advance();

            return Ok(self.ast.alloc(Expr::Literal(LiteralValue::Number(n))));
        }

        if let TokenKind::STRING(ref s) = self.peek().kind {
            let s = s.clone();
            self.advance();

            return Ok(self.ast.alloc(Expr::Literal(LiteralValue::Str(s))));
        }

        if self.matches(TokenKind::IDENTIFIER) {
            let name = self.previous().clone();

            return Ok(self.ast.alloc(Expr::Variable(name)));
        }

        if self.matches(TokenKind::LEFT_PAREN) {
            let expr: ExprId = self.expression()?;

            self.consume(TokenKind::RIGHT_PAREN, "Expected ')' after expression")?;

            return Ok(self.ast.alloc(Expr::Grouping(expr)));
        }

        Err(LarchError::parse(self.peek().line, "Expected expression"))
    }

    // ────────────────────── utility helpers ───────────────────────

    /// Enter one level of statement/expression nesting, failing once the
    /// combined depth exceeds [`MAX_NESTING_DEPTH`].  The first error aborts
    /// the whole parse, so the counter only needs unwinding on success.
    #[inline(always)]
    fn descend(&mut self) -> Result<()> {
        self.depth += 1;

        if self.depth > MAX_NESTING_DEPTH {
            return Err(LarchError::parse(self.peek().line, "Nesting too deep"));
        }

        Ok(())
    }

    /// Leave one level of nesting.
    #[inline(always)]
    fn ascend(&mut self) {
        self.depth -= 1;
    }

    #[inline(always)]
    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();

            return true;
        }

        false
    }

    #[inline(always)]
    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token> {
        if self.check(kind) {
            return Ok(self.advance().clone());
        }

        Err(LarchError::parse(self.peek().line, message))
    }

    #[inline(always)]
    fn check(&self, kind: TokenKind) -> bool {
        if self.is_at_end() {
            return false;
        }

        self.peek().kind == kind
    }

    #[inline(always)]
    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::EOF)
    }

    #[inline(always)]
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    #[inline(always)]
    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }
}
