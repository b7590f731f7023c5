#[cfg(test)]
mod scanner_tests {
    use larch::error::ErrorKind;
    use larch::scanner::{scan, Scanner};
    use larch::token::{Token, TokenKind};

    fn assert_token_sequence(source: &str, expected: &[(TokenKind, &str)]) {
        let tokens: Vec<Token> = scan(source).expect("source should scan cleanly");

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_kind, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.kind, *expected_kind);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenKind::LEFT_PAREN, "("),
                (TokenKind::LEFT_BRACE, "{"),
                (TokenKind::STAR, "*"),
                (TokenKind::DOT, "."),
                (TokenKind::COMMA, ","),
                (TokenKind::PLUS, "+"),
                (TokenKind::STAR, "*"),
                (TokenKind::RIGHT_BRACE, "}"),
                (TokenKind::RIGHT_PAREN, ")"),
                (TokenKind::EOF, ""),
            ],
        );
    }

    #[test]
    fn two_character_operators_use_maximal_munch() {
        assert_token_sequence(
            "! != = == < <= > >= ==!",
            &[
                (TokenKind::BANG, "!"),
                (TokenKind::BANG_EQUAL, "!="),
                (TokenKind::EQUAL, "="),
                (TokenKind::EQUAL_EQUAL, "=="),
                (TokenKind::LESS, "<"),
                (TokenKind::LESS_EQUAL, "<="),
                (TokenKind::GREATER, ">"),
                (TokenKind::GREATER_EQUAL, ">="),
                (TokenKind::EQUAL_EQUAL, "=="),
                (TokenKind::BANG, "!"),
                (TokenKind::EOF, ""),
            ],
        );
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_token_sequence(
            "var x = true; while fun nil orchid",
            &[
                (TokenKind::VAR, "var"),
                (TokenKind::IDENTIFIER, "x"),
                (TokenKind::EQUAL, "="),
                (TokenKind::TRUE, "true"),
                (TokenKind::SEMICOLON, ";"),
                (TokenKind::WHILE, "while"),
                (TokenKind::FUN, "fun"),
                (TokenKind::NIL, "nil"),
                (TokenKind::IDENTIFIER, "orchid"),
                (TokenKind::EOF, ""),
            ],
        );
    }

    #[test]
    fn print_is_not_reserved() {
        // The language has no print statement; `print` scans as an ordinary
        // identifier.
        assert_token_sequence(
            "print",
            &[(TokenKind::IDENTIFIER, "print"), (TokenKind::EOF, "")],
        );
    }

    #[test]
    fn identifier_continuation_is_alphabetic() {
        // Identifier bodies are letters and underscores; a digit ends the
        // identifier and starts a number token.
        assert_token_sequence(
            "abc123 a_b",
            &[
                (TokenKind::IDENTIFIER, "abc"),
                (TokenKind::NUMBER(123.0), "123"),
                (TokenKind::IDENTIFIER, "a_b"),
                (TokenKind::EOF, ""),
            ],
        );
    }

    #[test]
    fn number_literals() {
        let tokens = scan("12 3.14 123.").expect("scan");

        match &tokens[0].kind {
            TokenKind::NUMBER(n) => assert_eq!(*n, 12.0),
            other => panic!("expected NUMBER, got {:?}", other),
        }
        match &tokens[1].kind {
            TokenKind::NUMBER(n) => assert_eq!(*n, 3.14),
            other => panic!("expected NUMBER, got {:?}", other),
        }

        // Trailing dot is not part of the number.
        assert_eq!(tokens[2].lexeme, "123");
        assert_eq!(tokens[3].kind, TokenKind::DOT);
    }

    #[test]
    fn string_literal_lexeme_keeps_quotes_literal_does_not() {
        let tokens = scan("\"hello\"").expect("scan");

        assert_eq!(tokens[0].lexeme, "\"hello\"");
        match &tokens[0].kind {
            TokenKind::STRING(s) => assert_eq!(s, "hello"),
            other => panic!("expected STRING, got {:?}", other),
        }
    }

    #[test]
    fn strings_may_span_lines_and_count_them() {
        let tokens = scan("\"a\nb\"\nx").expect("scan");

        match &tokens[0].kind {
            TokenKind::STRING(s) => assert_eq!(s, "a\nb"),
            other => panic!("expected STRING, got {:?}", other),
        }
        assert_eq!(tokens[0].line, 2); // reported at the closing quote
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn comments_and_whitespace_are_skipped() {
        assert_token_sequence(
            "1 // the rest is ignored ;;;\n+ 2 // trailing",
            &[
                (TokenKind::NUMBER(1.0), "1"),
                (TokenKind::PLUS, "+"),
                (TokenKind::NUMBER(2.0), "2"),
                (TokenKind::EOF, ""),
            ],
        );
    }

    #[test]
    fn line_numbers_track_newlines() {
        let tokens = scan("a\nb\n\nc").expect("scan");

        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[2].line, 4);
        assert_eq!(tokens[3].kind, TokenKind::EOF);
        assert_eq!(tokens[3].line, 4);
    }

    #[test]
    fn lexemes_match_consumed_source() {
        let source = "fun add(a, b) { return a + b; } // sum\nadd(1.5, 2);";

        let tokens = scan(source).expect("scan");

        for token in &tokens {
            if token.kind == TokenKind::EOF {
                continue;
            }

            assert!(
                source.contains(&token.lexeme),
                "lexeme '{}' not found in source",
                token.lexeme
            );
            assert!(!token.lexeme.is_empty());
        }
    }

    #[test]
    fn unexpected_character_is_a_lexical_error() {
        let err = scan("var x = 1;\n@").expect_err("should fail");

        assert_eq!(err.kind(), ErrorKind::Lexical);
        assert_eq!(err.line(), 2);
        assert!(err.to_string().contains("Unexpected character: @"));
    }

    #[test]
    fn unexpected_multibyte_character_is_reported_whole() {
        let err = scan("var é = 1;").expect_err("should fail");

        assert_eq!(err.kind(), ErrorKind::Lexical);
        assert!(err.to_string().contains("Unexpected character: é"));
    }

    #[test]
    fn unterminated_string_is_a_lexical_error() {
        let err = scan("\"abc").expect_err("should fail");

        assert_eq!(err.kind(), ErrorKind::Lexical);
        assert!(err.to_string().contains("Unterminated string"));
    }

    #[test]
    fn scanner_iterator_is_fused() {
        let mut scanner = Scanner::new("");

        match scanner.next() {
            Some(Ok(token)) => assert_eq!(token.kind, TokenKind::EOF),
            other => panic!("expected EOF token, got {:?}", other),
        }
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }
}
