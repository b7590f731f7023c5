//! The single entry point the driver calls: [`Session::execute`] runs the
//! scanner, parser, resolver, and interpreter in sequence over a source text
//! and returns either the values produced by its top-level expression
//! statements or the first structured diagnostic.
//!
//! A `Session` is one interactive session: the AST arena, the resolver side
//! table, and the global frame persist across `execute` calls, so variables
//! and functions defined on one prompt line remain visible on the next.
//! Drivers that want fresh state per run simply construct a new session.

use log::info;

use crate::ast::{Ast, Stmt};
use crate::error::Result;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner;
use crate::token::Token;
use crate::value::Value;

/// Outcome of executing one source text: the values of its top-level
/// expression statements, or the diagnostic that stopped it.
pub type ExecutionResult = Result<Vec<Value>>;

/// A persistent interpreter session.
///
/// The arena only grows, so expression handles captured by closures during
/// earlier calls stay valid for the lifetime of the session.
pub struct Session {
    ast: Ast,
    interpreter: Interpreter,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A session printing program output to stdout.
    pub fn new() -> Self {
        Session {
            ast: Ast::new(),
            interpreter: Interpreter::new(),
        }
    }

    /// A session that buffers `println` output for inspection via
    /// [`Session::take_output`].
    pub fn with_buffered_output() -> Self {
        Session {
            ast: Ast::new(),
            interpreter: Interpreter::with_buffered_output(),
        }
    }

    /// Run the full pipeline over `source`.
    ///
    /// Each stage is total up to its first error; the first diagnostic aborts
    /// the run and is returned unchanged.  A resolution error is reported
    /// before any statement of this run executes.
    pub fn execute(&mut self, source: &str) -> ExecutionResult {
        info!("Executing {} byte(s) of source", source.len());

        let tokens: Vec<Token> = scanner::scan(source)?;

        let statements: Vec<Stmt> = Parser::new(&tokens, &mut self.ast).parse()?;

        Resolver::new(&mut self.interpreter).resolve(&self.ast, &statements)?;

        self.interpreter.interpret(&self.ast, &statements)
    }

    /// Drain buffered program output (empty for stdout sessions).
    pub fn take_output(&mut self) -> Vec<String> {
        self.interpreter.take_output()
    }
}
