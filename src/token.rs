use serde::Serialize;
use std::fmt;
use std::mem;

/// The different kinds of tokens recognized by the Larch scanner.
///
/// Variants without data represent punctuators, operators, and keywords.
/// `STRING(String)` and `NUMBER(f64)` carry their literal values.
/// `IDENTIFIER` is used for user-defined names.
/// `EOF` marks the end of input.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Serialize)]
pub enum TokenKind {
    /// '('
    LEFT_PAREN,

    /// ')'
    RIGHT_PAREN,

    /// '{'
    LEFT_BRACE,

    /// '}'
    RIGHT_BRACE,

    /// ','
    COMMA,

    /// '.'
    DOT,

    /// '-'
    MINUS,

    /// '+'
    PLUS,

    /// ';'
    SEMICOLON,

    /// '/'
    SLASH,

    /// '*'
    STAR,

    /// '!'
    BANG,

    /// '!='
    BANG_EQUAL,

    /// '='
    EQUAL,

    /// '=='
    EQUAL_EQUAL,

    /// '>'
    GREATER,

    /// '>='
    GREATER_EQUAL,

    /// '<'
    LESS,

    /// '<='
    LESS_EQUAL,

    /// A user-defined identifier
    IDENTIFIER,

    /// A string literal (contents without quotes)
    STRING(String),

    /// A numeric literal
    #[serde(rename = "NUMBER")]
    NUMBER(f64),

    /// 'and'
    AND,

    /// 'else'
    ELSE,

    /// 'false'
    FALSE,

    /// 'for'
    FOR,

    /// 'fun'
    FUN,

    /// 'if'
    IF,

    /// 'nil'
    NIL,

    /// 'or'
    OR,

    /// 'return'
    RETURN,

    /// 'true'
    TRUE,

    /// 'var'
    VAR,

    /// 'while'
    WHILE,

    /// End-of-file marker
    EOF,
}

impl PartialEq for TokenKind {
    /// Two TokenKinds are equal if they share the same variant
    /// (ignoring any inner data). Uses `mem::discriminant` to compare.
    fn eq(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }
}

impl TokenKind {
    /// Variant name without payloads, used by `Display` and the tokenize
    /// driver output.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::LEFT_PAREN => "LEFT_PAREN",
            TokenKind::RIGHT_PAREN => "RIGHT_PAREN",
            TokenKind::LEFT_BRACE => "LEFT_BRACE",
            TokenKind::RIGHT_BRACE => "RIGHT_BRACE",
            TokenKind::COMMA => "COMMA",
            TokenKind::DOT => "DOT",
            TokenKind::MINUS => "MINUS",
            TokenKind::PLUS => "PLUS",
            TokenKind::SEMICOLON => "SEMICOLON",
            TokenKind::SLASH => "SLASH",
            TokenKind::STAR => "STAR",
            TokenKind::BANG => "BANG",
            TokenKind::BANG_EQUAL => "BANG_EQUAL",
            TokenKind::EQUAL => "EQUAL",
            TokenKind::EQUAL_EQUAL => "EQUAL_EQUAL",
            TokenKind::GREATER => "GREATER",
            TokenKind::GREATER_EQUAL => "GREATER_EQUAL",
            TokenKind::LESS => "LESS",
            TokenKind::LESS_EQUAL => "LESS_EQUAL",
            TokenKind::IDENTIFIER => "IDENTIFIER",
            TokenKind::STRING(_) => "STRING",
            TokenKind::NUMBER(_) => "NUMBER",
            TokenKind::AND => "AND",
            TokenKind::ELSE => "ELSE",
            TokenKind::FALSE => "FALSE",
            TokenKind::FOR => "FOR",
            TokenKind::FUN => "FUN",
            TokenKind::IF => "IF",
            TokenKind::NIL => "NIL",
            TokenKind::OR => "OR",
            TokenKind::RETURN => "RETURN",
            TokenKind::TRUE => "TRUE",
            TokenKind::VAR => "VAR",
            TokenKind::WHILE => "WHILE",
            TokenKind::EOF => "EOF",
        }
    }
}

/// A scanned token: its kind (with any literal payload), the exact lexeme
/// from the source, and the 1-based line where it was found.
///
/// Tokens are immutable once produced.  The lexeme owns its text so the AST
/// (and closures captured from it) can outlive the source buffer of any
/// single `execute` call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Token {
    /// The category of this token.
    pub kind: TokenKind,

    /// The exact substring from the source that produced this token.
    /// Empty for the synthetic EOF token.
    pub lexeme: String,

    /// 1-based line number in the source.
    pub line: usize,
}

impl Token {
    /// Create a new token with the given kind, lexeme, and line.
    pub fn new(kind: TokenKind, lexeme: &str, line: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.to_owned(),
            line,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::STRING(s) => write!(f, "STRING {} {}", self.lexeme, s),

            TokenKind::NUMBER(n) => {
                // 3 -> "3.0", 3.14 -> "3.14"
                if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    let mut buf: itoa::Buffer = itoa::Buffer::new();

                    write!(f, "NUMBER {} {}.0", self.lexeme, buf.format(*n as i64))
                } else {
                    write!(f, "NUMBER {} {}", self.lexeme, n)
                }
            }

            kind => write!(f, "{} {} null", kind.name(), self.lexeme),
        }
    }
}
