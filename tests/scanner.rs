#[cfg(test)]
mod scanner_tests {
    use pretty_assertions::assert_eq;

    use rox::error::LoxError;
    use rox::scanner::*;
    use rox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme.as_str(), *expected_lexeme);
        }
    }

    fn assert_token_matches(
        result: &Result<Token, LoxError>,
        expected_type: TokenType,
        expected_lexeme: &str,
    ) {
        match result {
            Ok(token) => {
                assert_eq!(
                    token.token_type, expected_type,
                    "Expected token type {:?}, got {:?}",
                    expected_type, token.token_type
                );
                assert_eq!(
                    token.lexeme, expected_lexeme,
                    "Expected lexeme '{}', got '{}'",
                    expected_lexeme, token.lexeme
                );
            }
            Err(e) => panic!("Expected token but got error: {}", e),
        }
    }

    fn numbers(source: &str) -> Vec<f64> {
        Scanner::new(source)
            .filter_map(Result::ok)
            .filter_map(|t| match t.token_type {
                TokenType::NUMBER(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_two_char_operators() {
        assert_token_sequence(
            "!= ! == = <= < >= > / -;",
            &[
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::BANG, "!"),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::EQUAL, "="),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::LESS, "<"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::GREATER, ">"),
                (TokenType::SLASH, "/"),
                (TokenType::MINUS, "-"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_and_identifiers() {
        assert_token_sequence(
            "and class orchid _under fun funny nil this super x1 break breaks",
            &[
                (TokenType::AND, "and"),
                (TokenType::CLASS, "class"),
                (TokenType::IDENTIFIER, "orchid"),
                (TokenType::IDENTIFIER, "_under"),
                (TokenType::FUN, "fun"),
                (TokenType::IDENTIFIER, "funny"),
                (TokenType::NIL, "nil"),
                (TokenType::THIS, "this"),
                (TokenType::SUPER, "super"),
                (TokenType::IDENTIFIER, "x1"),
                (TokenType::BREAK, "break"),
                (TokenType::IDENTIFIER, "breaks"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_numbers() {
        assert_eq!(numbers("123 45.67 0.5"), vec![123.0, 45.67, 0.5]);

        // A trailing dot is not part of the number.
        assert_token_sequence(
            "8.",
            &[
                (TokenType::NUMBER(8.0), "8"),
                (TokenType::DOT, "."),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_05_strings() {
        let tokens: Vec<Token> = Scanner::new("\"hello\" \"multi\nline\"")
            .filter_map(Result::ok)
            .collect();

        assert_eq!(tokens.len(), 3);
        assert_eq!(
            tokens[0].token_type,
            TokenType::STRING("hello".to_string())
        );

        match &tokens[1].token_type {
            TokenType::STRING(s) => assert_eq!(s, "multi\nline"),
            other => panic!("Expected STRING, got {:?}", other),
        }

        assert_eq!(tokens[1].lexeme, "\"multi\nline\"");
        assert_eq!(tokens[2].line, 2);
    }

    #[test]
    fn test_scanner_06_unterminated_string() {
        let results: Vec<_> = Scanner::new("print \"abc").collect();

        assert_eq!(results.len(), 3);
        assert_token_matches(&results[0], TokenType::PRINT, "print");
        assert_token_matches(&results[2], TokenType::EOF, "");

        match &results[1] {
            Err(e) => assert_eq!(e.to_string(), "line 1: Error: Unterminated string."),
            Ok(t) => panic!("Expected error, got {:?}", t),
        }
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#";
        let results: Vec<_> = Scanner::new(source).collect();

        // COMMA, DOT, error for '$', LEFT_PAREN, error for '#', EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let error_count = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(error_count, 2, "Expected 2 error messages");

        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(
                err.to_string().contains("Unexpected character"),
                "Error message should contain 'Unexpected character', got: {}",
                err
            );
        }
    }

    #[test]
    fn test_unexpected_multibyte_char() {
        let (tokens, errors) = Scanner::new("a é b").scan_tokens();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "line 1: Error: Unexpected character: é"
        );

        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["a", "b", ""]);
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_token_sequence(
            "// line comment\n1 /* block */ 2 /* outer /* inner */ still outer */ 3",
            &[
                (TokenType::NUMBER(1.0), "1"),
                (TokenType::NUMBER(2.0), "2"),
                (TokenType::NUMBER(3.0), "3"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        let (tokens, errors) = Scanner::new("1 /* never\nclosed").scan_tokens();

        assert_eq!(tokens.len(), 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line(), 2);
        assert_eq!(
            errors[0].to_string(),
            "line 2: Error: Unterminated block comment."
        );
    }

    #[test]
    fn test_line_numbers() {
        let source = "var a;\n// comment\n/* one\ntwo */\nprint a;";
        let lines: Vec<(String, usize)> = Scanner::new(source)
            .filter_map(Result::ok)
            .map(|t| (t.lexeme, t.line))
            .collect();

        assert_eq!(
            lines,
            vec![
                ("var".to_string(), 1),
                ("a".to_string(), 1),
                (";".to_string(), 1),
                ("print".to_string(), 5),
                ("a".to_string(), 5),
                (";".to_string(), 5),
                ("".to_string(), 5),
            ]
        );
    }

    #[test]
    fn test_token_display() {
        let rendered: Vec<String> = Scanner::new("foo 42 3.5 \"hi\" ;")
            .filter_map(Result::ok)
            .map(|t| t.to_string())
            .collect();

        assert_eq!(
            rendered,
            vec![
                "IDENTIFIER foo null",
                "NUMBER 42 42.0",
                "NUMBER 3.5 3.5",
                "STRING \"hi\" hi",
                "SEMICOLON ; null",
                "EOF  null",
            ]
        );
    }

    #[test]
    fn test_iterator_is_fused() {
        let mut scanner = Scanner::new("");

        assert!(matches!(scanner.next(), Some(Ok(_))));
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }
}
