//! Centralised error hierarchy for the **Larch** interpreter.
//!
//! All pipeline stages (scanner, parser, resolver, runtime) convert their
//! failure modes into one of the variants defined here.  Every stage is total
//! up to its first error: on failure it returns the structured diagnostic to
//! its caller instead of continuing, and the caller (normally the driver)
//! decides whether to halt or move on.  Nothing in the library aborts the
//! process.
//!
//! The module does not print diagnostics itself.

use thiserror::Error;

use log::info;

/// Coarse classification of a [`LarchError`], for drivers that branch on the
/// failing stage (exit codes, test assertions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Scanner-stage failure.
    Lexical,
    /// Parser-stage failure.
    Syntax,
    /// Static-resolution failure.
    Resolution,
    /// Wrong operand type for an operator.
    RuntimeType,
    /// Undefined variable read or assignment.
    RuntimeName,
    /// Argument count does not match the callable's arity.
    RuntimeArity,
    /// Call target is not a callable value.
    RuntimeCall,
    /// Call depth exceeded the interpreter's bound.
    RuntimeStack,
}

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LarchError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex { message: String, line: usize },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error: {message}")]
    Parse { message: String, line: usize },

    /// Static-analysis failure (self-reference in an initializer,
    /// redeclaration, `return` outside a function).
    #[error("[line {line}] Error: {message}")]
    Resolve { message: String, line: usize },

    /// Runtime type error (wrong operand type for an operator).
    #[error("[line {line}] Runtime error: {message}")]
    Type { message: String, line: usize },

    /// Runtime name error (undefined variable).
    #[error("[line {line}] Runtime error: {message}")]
    Name { message: String, line: usize },

    /// Runtime arity error (argument count mismatch at a call site).
    #[error("[line {line}] Runtime error: {message}")]
    Arity { message: String, line: usize },

    /// Runtime call error (invoking a non-callable value).
    #[error("[line {line}] Runtime error: {message}")]
    NotCallable { message: String, line: usize },

    /// Resource exhaustion: user-level recursion exceeded the call-depth
    /// bound.  Surfaced as a diagnostic instead of overflowing the host stack.
    #[error("[line {line}] Runtime error: {message}")]
    StackOverflow { message: String, line: usize },
}

impl LarchError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LarchError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", line, message);

        LarchError::Parse { message, line }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", line, message);

        LarchError::Resolve { message, line }
    }

    /// Runtime operand-type error.
    pub fn type_error<S: Into<String>>(line: usize, msg: S) -> Self {
        LarchError::Type {
            message: msg.into(),
            line,
        }
    }

    /// Runtime undefined-variable error.
    pub fn name<S: Into<String>>(line: usize, msg: S) -> Self {
        LarchError::Name {
            message: msg.into(),
            line,
        }
    }

    /// Runtime arity-mismatch error naming expected vs actual counts.
    pub fn arity(line: usize, expected: usize, actual: usize) -> Self {
        LarchError::Arity {
            message: format!("Expected {} arguments but got {}", expected, actual),
            line,
        }
    }

    /// Runtime error for calling a value that is not callable.
    pub fn not_callable(line: usize) -> Self {
        LarchError::NotCallable {
            message: "Can only call functions".to_string(),
            line,
        }
    }

    /// Runtime error for exceeding the interpreter call-depth bound.
    pub fn stack_overflow(line: usize) -> Self {
        LarchError::StackOverflow {
            message: "Call stack limit exceeded".to_string(),
            line,
        }
    }

    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LarchError::Lex { .. } => ErrorKind::Lexical,
            LarchError::Parse { .. } => ErrorKind::Syntax,
            LarchError::Resolve { .. } => ErrorKind::Resolution,
            LarchError::Type { .. } => ErrorKind::RuntimeType,
            LarchError::Name { .. } => ErrorKind::RuntimeName,
            LarchError::Arity { .. } => ErrorKind::RuntimeArity,
            LarchError::NotCallable { .. } => ErrorKind::RuntimeCall,
            LarchError::StackOverflow { .. } => ErrorKind::RuntimeStack,
        }
    }

    /// 1-based source line the diagnostic points at.
    pub fn line(&self) -> usize {
        match self {
            LarchError::Lex { line, .. }
            | LarchError::Parse { line, .. }
            | LarchError::Resolve { line, .. }
            | LarchError::Type { line, .. }
            | LarchError::Name { line, .. }
            | LarchError::Arity { line, .. }
            | LarchError::NotCallable { line, .. }
            | LarchError::StackOverflow { line, .. } => *line,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, LarchError>;
