#[cfg(test)]
mod parser_tests {
    use lox_rs as lox;

    use lox::ast_printer::AstPrinter;
    use lox::error::LoxError;
    use lox::parser::Parser;
    use lox::scanner;
    use lox::stmt::Stmt;

    fn parse(source: &str) -> (Vec<Stmt>, Vec<LoxError>) {
        let (tokens, errors) = scanner::scan(source.as_bytes());
        assert!(errors.is_empty(), "scan errors: {:?}", errors);

        Parser::new(tokens).parse()
    }

    /// Parse a single statement and render it, asserting a clean parse.
    fn print_first(source: &str) -> String {
        let (statements, errors) = parse(source);
        assert!(errors.is_empty(), "parse errors: {:?}", errors);
        assert!(!statements.is_empty());

        AstPrinter.print_stmt(&statements[0])
    }

    #[test]
    fn test_prefix_rendering() {
        let (statements, errors) = parse("1 + 2;");
        assert!(errors.is_empty());

        let Stmt::Expression(expr) = &statements[0] else {
            panic!("expected an expression statement");
        };

        assert_eq!(AstPrinter.print_expr(expr), "(+ 1 2)");
    }

    #[test]
    fn test_binary_precedence() {
        assert_eq!(print_first("1 + 2 * 3;"), "(; (+ 1 (* 2 3)))");
    }

    #[test]
    fn test_comma_binds_looser_than_assignment() {
        assert_eq!(print_first("a = 1, b = 2;"), "(; (, (= a 1) (= b 2)))");
    }

    #[test]
    fn test_grouping_overrides_precedence() {
        assert_eq!(print_first("(1 + 2) * 3;"), "(; (* (group (+ 1 2)) 3))");
    }

    #[test]
    fn test_ternary_is_right_associative() {
        assert_eq!(
            print_first("a ? 1 : b ? 2 : 3;"),
            "(; (?: a 1 (?: b 2 3)))"
        );
    }

    #[test]
    fn test_comma_is_left_associative() {
        assert_eq!(print_first("1, 2, 3;"), "(; (, (, 1 2) 3))");
    }

    #[test]
    fn test_call_arguments_are_not_comma_expressions() {
        assert_eq!(print_first("f(1, 2);"), "(; (call f 1 2))");
    }

    #[test]
    fn test_for_desugars_to_while() {
        assert_eq!(
            print_first("for (var i = 0; i < 3; i = i + 1) print i;"),
            "(block (var i 0) (while (< i 3) (block (print i) (; (= i (+ i 1))))))"
        );
    }

    #[test]
    fn test_for_without_clauses() {
        assert_eq!(print_first("for (;;) print 1;"), "(while true (print 1))");
    }

    #[test]
    fn test_anonymous_function_expression() {
        assert_eq!(
            print_first("var f = fun (a) { print a; };"),
            "(var f (fun (a) (print a)))"
        );
    }

    #[test]
    fn test_class_with_superclass_and_class_method() {
        assert_eq!(
            print_first("class B < A { class make() { return 1; } test() { return 2; } }"),
            "(class B < A (class make () (return 1)) (test () (return 2)))"
        );
    }

    #[test]
    fn test_comments_carry_no_syntax() {
        let (statements, errors) = parse("// note\nprint 1;");

        assert!(errors.is_empty());
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_invalid_assignment_target() {
        let (statements, errors) = parse("1 = 2;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("Invalid assignment target."));

        // The statement itself still parses.
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_missing_left_operand_error_production() {
        let (statements, errors) = parse("* 5;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("Missing left-hand operand."));

        // The right operand survives as a placeholder.
        assert_eq!(AstPrinter.print_stmt(&statements[0]), "(; 5)");
    }

    #[test]
    fn test_synchronize_recovers_at_statement_boundary() {
        let (statements, errors) = parse("var = 1; print 2;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("Expect variable name."));

        // The statement after the bad one parses normally.
        assert_eq!(statements.len(), 1);
        assert_eq!(AstPrinter.print_stmt(&statements[0]), "(print 2)");
    }

    #[test]
    fn test_multiple_errors_reported() {
        let (_, errors) = parse("var = 1; fun = 2; print 3;");

        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_too_many_parameters() {
        let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
        let source = format!("fun f({}) {{ return nil; }}", params.join(", "));

        let (_, errors) = parse(&source);

        assert_eq!(errors.len(), 1);
        assert!(errors[0]
            .to_string()
            .contains("Can't have more than 255 parameters."));
    }

    #[test]
    fn test_node_id_threading_for_repl() {
        let (tokens, _) = scanner::scan(b"a; b;");
        let mut parser = Parser::with_starting_id(tokens, 10);
        let (_, errors) = parser.parse();

        assert!(errors.is_empty());
        // Two variable nodes consumed ids 10 and 11.
        assert_eq!(parser.next_id(), 12);
    }
}
