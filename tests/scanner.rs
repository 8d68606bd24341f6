#[cfg(test)]
mod scanner_tests {
    use lox_rs as lox;

    use lox::scanner::*;
    use lox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let (tokens, errors) = scan(source.as_bytes());

        assert!(errors.is_empty(), "unexpected scan errors: {:?}", errors);
        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_symbols() {
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
    fn test_maximal_munch_operators() {
        assert_token_sequence(
            "<=>=!===",
            &[
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_ternary_punctuators() {
        assert_token_sequence(
            "a ? b : c",
            &[
                (TokenType::IDENTIFIER, "a"),
                (TokenType::QUESTION, "?"),
                (TokenType::IDENTIFIER, "b"),
                (TokenType::COLON, ":"),
                (TokenType::IDENTIFIER, "c"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_line_comment_retained() {
        let (tokens, errors) = scan(b"// hello\n1 + 2");

        assert!(errors.is_empty());
        assert_eq!(tokens.len(), 5); // COMMENT NUMBER PLUS NUMBER EOF

        match &tokens[0].token_type {
            TokenType::COMMENT(body) => assert_eq!(body, "hello"),
            other => panic!("expected COMMENT, got {:?}", other),
        }
        assert_eq!(tokens[0].lexeme, "// hello");
        assert_eq!(tokens[0].line, 1);

        assert_eq!(tokens[1].token_type, TokenType::NUMBER(0.0));
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[2].token_type, TokenType::PLUS);
    }

    #[test]
    fn test_nested_block_comment() {
        let (tokens, errors) = scan(b"/* outer /* inner */ still */ 7");

        assert!(errors.is_empty(), "nested comment should scan: {:?}", errors);
        assert_eq!(tokens.len(), 3); // COMMENT NUMBER EOF

        match &tokens[0].token_type {
            TokenType::COMMENT(body) => assert_eq!(body, "outer /* inner */ still"),
            other => panic!("expected COMMENT, got {:?}", other),
        }

        match tokens[1].token_type {
            TokenType::NUMBER(n) => assert_eq!(n, 7.0),
            ref other => panic!("expected NUMBER, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_block_comment() {
        let (tokens, errors) = scan(b"/* never closed");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("Unterminated block comment."));

        // The stream still terminates with EOF.
        assert_eq!(tokens.last().unwrap().token_type, TokenType::EOF);
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, errors) = scan(b"\"abc");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("Unterminated string."));
        assert_eq!(tokens.last().unwrap().token_type, TokenType::EOF);
    }

    #[test]
    fn test_multiline_string_tracks_lines() {
        let (tokens, errors) = scan(b"\"one\ntwo\"\nok");

        assert!(errors.is_empty());

        match &tokens[0].token_type {
            TokenType::STRING(s) => assert_eq!(s, "one\ntwo"),
            other => panic!("expected STRING, got {:?}", other),
        }

        // Identifier after the string sits on line 3.
        assert_eq!(tokens[1].token_type, TokenType::IDENTIFIER);
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn test_keywords_vs_identifiers() {
        assert_token_sequence(
            "class classy break breaker",
            &[
                (TokenType::CLASS, "class"),
                (TokenType::IDENTIFIER, "classy"),
                (TokenType::BREAK, "break"),
                (TokenType::IDENTIFIER, "breaker"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_number_literals() {
        let (tokens, errors) = scan(b"3.14 10 5.");

        assert!(errors.is_empty());

        match tokens[0].token_type {
            TokenType::NUMBER(n) => assert_eq!(n, 3.14),
            ref other => panic!("expected NUMBER, got {:?}", other),
        }
        match tokens[1].token_type {
            TokenType::NUMBER(n) => assert_eq!(n, 10.0),
            ref other => panic!("expected NUMBER, got {:?}", other),
        }

        // "5." is a number followed by a dot, not a fraction.
        match tokens[2].token_type {
            TokenType::NUMBER(n) => assert_eq!(n, 5.0),
            ref other => panic!("expected NUMBER, got {:?}", other),
        }
        assert_eq!(tokens[3].token_type, TokenType::DOT);
    }

    #[test]
    fn test_unexpected_character_recovers() {
        let (tokens, errors) = scan(b",$.");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("Unexpected character"));

        // Scanning continues past the bad byte.
        assert_eq!(tokens[0].token_type, TokenType::COMMA);
        assert_eq!(tokens[1].token_type, TokenType::DOT);
        assert_eq!(tokens[2].token_type, TokenType::EOF);
    }
}
