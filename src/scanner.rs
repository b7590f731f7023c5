//! Module `scanner` implements a one-pass, streaming lexer for Larch.
//!
//! It transforms source text into a sequence of [`Token`]s, skipping
//! whitespace and `//` comments, and emitting exactly one `EOF` token at the
//! end.  Designed as a `FusedIterator`, it can be chained safely with other
//! iterator adapters; callers that need the whole stream collect it into a
//! `Result<Vec<Token>>`, which aborts at the first lexical error.
//!
//! Recognition rules:
//!
//! - Two-character operators (`!=`, `==`, `<=`, `>=`) win over their
//!   one-character prefixes by a single byte of lookahead (maximal munch).
//! - String literals are delimited by `"` and may span lines; hitting
//!   end-of-input inside one is a fatal lexical error.
//! - Numeric literals are digit sequences with an optional fraction; the dot
//!   is consumed only when the byte after it is itself a digit, so `123.` is
//!   NUMBER then DOT.
//! - Identifiers start with a letter or `_` and continue with letters or `_`;
//!   they are checked against a compile-time perfect-hash keyword table.
//! - Any other byte is a fatal lexical error naming the offending character.
//!
//! Comment skipping fast-forwards to the next newline with `memchr`.

use crate::error::{LarchError, Result};
use crate::token::{Token, TokenKind};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile-time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static [u8], TokenKind> = phf_map! {
    b"and"    => TokenKind::AND,
    b"else"   => TokenKind::ELSE,
    b"false"  => TokenKind::FALSE,
    b"for"    => TokenKind::FOR,
    b"fun"    => TokenKind::FUN,
    b"if"     => TokenKind::IF,
    b"nil"    => TokenKind::NIL,
    b"or"     => TokenKind::OR,
    b"return" => TokenKind::RETURN,
    b"true"   => TokenKind::TRUE,
    b"var"    => TokenKind::VAR,
    b"while"  => TokenKind::WHILE,
};

/// A single-pass **scanner / lexer** that converts source text into a
/// sequence of [`Token`]s.  Each emitted token carries the exact lexeme
/// substring it was scanned from.
pub struct Scanner<'a> {
    src: &'a str,               // entire source text
    bytes: &'a [u8],            // byte view used by the cursor helpers
    start: usize,               // index of the *first* byte of the current lexeme
    curr: usize,                // index *one past* the last byte examined
    line: usize,                // 1-based line counter (\n increments)
    pending: Option<TokenKind>, // recognised token kind waiting to be emitted
}

impl<'a> Scanner<'a> {
    /// Create a new lexer over `src`.
    #[inline]
    pub fn new(src: &'a str) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            bytes: src.as_bytes(),
            start: 0,
            curr: 0,
            line: 1,
            pending: None,
        }
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Are we at (or past) the end of input?
    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.len()
    }

    /// Advance one byte and return it.  Higher-level code always guards with
    /// [`Self::is_at_end`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.bytes[self.curr];
        self.curr += 1;
        b
    }

    /// Peek at the current byte without consuming it.  Returns `0` past EOF
    /// to avoid branching at call-site.
    #[inline(always)]
    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.bytes[self.curr]
        }
    }

    /// Peek one byte beyond [`Self::peek`].  Safe at EOF.
    #[inline(always)]
    fn peek_next(&self) -> u8 {
        if self.curr + 1 >= self.len() {
            0
        } else {
            self.bytes[self.curr + 1]
        }
    }

    /// Conditionally consume a byte **iff** it matches `expected`.
    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Scan a *single* token starting at `self.curr`.  If the lexeme produces
    /// an actual token the kind is stored in `self.pending`.  Whitespace and
    /// comments are skipped by returning `Ok(())` with `pending = None`.
    fn scan_token(&mut self) -> Result<()> {
        let b = self.advance();

        match b {
            // ── single-character punctuators ──────────────────────────────
            b'(' => self.pending = Some(TokenKind::LEFT_PAREN),
            b')' => self.pending = Some(TokenKind::RIGHT_PAREN),
            b'{' => self.pending = Some(TokenKind::LEFT_BRACE),
            b'}' => self.pending = Some(TokenKind::RIGHT_BRACE),
            b',' => self.pending = Some(TokenKind::COMMA),
            b'.' => self.pending = Some(TokenKind::DOT),
            b'-' => self.pending = Some(TokenKind::MINUS),
            b'+' => self.pending = Some(TokenKind::PLUS),
            b';' => self.pending = Some(TokenKind::SEMICOLON),
            b'*' => self.pending = Some(TokenKind::STAR),

            // ── two-character operators (!=, ==, <=, >=) ─────────────────
            b'!' => {
                let tk = if self.match_byte(b'=') {
                    TokenKind::BANG_EQUAL
                } else {
                    TokenKind::BANG
                };

                self.pending = Some(tk);
            }

            b'=' => {
                let tk = if self.match_byte(b'=') {
                    TokenKind::EQUAL_EQUAL
                } else {
                    TokenKind::EQUAL
                };

                self.pending = Some(tk);
            }

            b'<' => {
                let tk = if self.match_byte(b'=') {
                    TokenKind::LESS_EQUAL
                } else {
                    TokenKind::LESS
                };

                self.pending = Some(tk);
            }

            b'>' => {
                let tk = if self.match_byte(b'=') {
                    TokenKind::GREATER_EQUAL
                } else {
                    TokenKind::GREATER
                };

                self.pending = Some(tk);
            }

            // ── whitespace / newline ─────────────────────────────────────
            b' ' | b'\r' | b'\t' => {
                return Ok(());
            }

            b'\n' => {
                self.line += 1;

                return Ok(());
            }

            // ── comments (// … until newline) ────────────────────────────
            b'/' => {
                if self.match_byte(b'/') {
                    // Fast-forward to the next newline; skip to EOF if the
                    // comment is on the last line.
                    if let Some(pos) = memchr(b'\n', &self.bytes[self.curr..]) {
                        self.curr += pos;
                    } else {
                        self.curr = self.len();
                    }

                    return Ok(());
                }

                self.pending = Some(TokenKind::SLASH);
            }

            // ── string literal " … " ─────────────────────────────────────
            b'"' => {
                return self.scan_string();
            }

            // ── number literal (digit-leading) ───────────────────────────
            b'0'..=b'9' => {
                self.scan_number();
            }

            // ── identifiers / keywords (alpha or underscore-leading) ─────
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                self.scan_identifier();
            }

            // ── unexpected character ─────────────────────────────────────
            _ => {
                // `start` sits on a char boundary (all accepted lexemes are
                // ASCII), so decode the whole character for the message
                // instead of rendering a lone byte of a multi-byte sequence.
                let c: char = self.src[self.start..].chars().next().unwrap_or(b as char);

                return Err(LarchError::lex(
                    self.line,
                    format!("Unexpected character: {}", c),
                ));
            }
        }

        Ok(())
    }

    /// Scan a double-quoted string literal.
    ///
    /// * `self.start` still points to the opening `"`.
    /// * On success, `self.curr` points **past** the closing `"`.
    ///
    /// Strings may span lines; each embedded newline bumps the line counter.
    fn scan_string(&mut self) -> Result<()> {
        while !self.is_at_end() && self.peek() != b'"' {
            if self.advance() == b'\n' {
                self.line += 1;
            }
        }

        if self.is_at_end() {
            return Err(LarchError::lex(self.line, "Unterminated string."));
        }

        self.advance(); // consume closing quote

        // Literal value excludes the surrounding quotes; the lexeme keeps them.
        let literal: &str = &self.src[self.start + 1..self.curr - 1];

        self.pending = Some(TokenKind::STRING(literal.to_owned()));

        Ok(())
    }

    /// Scan a numeric literal (`123`, `3.14`).  The fraction is only consumed
    /// when a digit follows the dot, so `123.` leaves the dot for the parser.
    fn scan_number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance(); // consume "."

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let lexeme: &str = &self.src[self.start..self.curr];
        let n: f64 = lexeme.parse::<f64>().unwrap_or(0.0); // digits only, cannot fail

        self.pending = Some(TokenKind::NUMBER(n));
    }

    /// Scan an identifier and decide if it is a **keyword** or a generic
    /// `IDENTIFIER` token.  Continuation bytes are letters and `_` only.
    fn scan_identifier(&mut self) {
        while {
            let c: u8 = self.peek();
            c.is_ascii_alphabetic() || c == b'_'
        } {
            self.advance();
        }

        let lexeme: &[u8] = &self.bytes[self.start..self.curr];

        let tk: TokenKind = KEYWORDS.get(lexeme).cloned().unwrap_or(TokenKind::IDENTIFIER);

        self.pending = Some(tk);
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        // Loop until we either emit a token, hit EOF, or see an error.
        while self.curr <= self.len() {
            // 1. EOF guard: emit exactly one EOF then terminate.
            if self.curr == self.len() {
                self.curr += 1; // ensure fused semantics
                return Some(Ok(Token::new(TokenKind::EOF, "", self.line)));
            }

            // 2. Reset per-token state.
            self.start = self.curr;
            self.pending = None;

            // 3. Attempt to scan a token.
            if let Err(e) = self.scan_token() {
                return Some(Err(e));
            }

            // 4. If a real token was recognised, build and return it.
            if let Some(tk) = self.pending.take() {
                let lexeme: &str = &self.src[self.start..self.curr];
                debug!("Scanned token ({:?}) on line {}", tk, self.line);

                return Some(Ok(Token::new(tk, lexeme, self.line)));
            }
            // Otherwise it was whitespace / comment: continue the loop.
        }

        None // already yielded EOF
    }
}

impl<'a> FusedIterator for Scanner<'a> {}

/// Scan an entire source text, aborting at the first lexical error.
pub fn scan(source: &str) -> Result<Vec<Token>> {
    Scanner::new(source).collect()
}
