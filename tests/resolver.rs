#[cfg(test)]
mod resolver_tests {
    use lox_rs as lox;

    use lox::interpreter::Interpreter;
    use lox::parser::Parser;
    use lox::resolver::Resolver;
    use lox::scanner;

    /// Scan, parse, and resolve; returns the resolver's rendered errors.
    fn resolve(source: &str) -> Vec<String> {
        let (tokens, errors) = scanner::scan(source.as_bytes());
        assert!(errors.is_empty(), "scan errors: {:?}", errors);

        let mut parser = Parser::new(tokens);
        let (statements, errors) = parser.parse();
        assert!(errors.is_empty(), "parse errors: {:?}", errors);

        let mut interpreter = Interpreter::new();

        Resolver::new(&mut interpreter)
            .resolve(&statements)
            .iter()
            .map(|e| e.to_string())
            .collect()
    }

    fn assert_single_error(source: &str, needle: &str) {
        let errors = resolve(source);

        assert_eq!(errors.len(), 1, "expected one error, got: {:?}", errors);
        assert!(
            errors[0].contains(needle),
            "expected '{}' in '{}'",
            needle,
            errors[0]
        );
    }

    #[test]
    fn test_break_outside_loop() {
        assert_single_error("break;", "Can't use 'break' outside of a loop.");
    }

    #[test]
    fn test_break_does_not_cross_function_boundary() {
        assert_single_error(
            "while (true) { fun f() { break; } f(); }",
            "Can't use 'break' outside of a loop.",
        );
    }

    #[test]
    fn test_break_inside_loop_is_fine() {
        assert!(resolve("while (true) { break; }").is_empty());
    }

    #[test]
    fn test_unused_local_variable() {
        assert_single_error("{ var a = 1; }", "Unused local variable 'a'.");
    }

    #[test]
    fn test_read_local_is_not_flagged() {
        assert!(resolve("{ var a = 1; print a; }").is_empty());
    }

    #[test]
    fn test_duplicate_declaration_in_scope() {
        assert_single_error(
            "{ var a = 1; var a = 2; print a; }",
            "Already a variable with this name in this scope.",
        );
    }

    #[test]
    fn test_shadowing_across_scopes_is_fine() {
        assert!(resolve("{ var a = 1; { var a = 2; print a; } print a; }").is_empty());
    }

    #[test]
    fn test_read_in_own_initializer() {
        assert_single_error(
            "var a = 1; { var a = a; print a; }",
            "Can't read local variable in its own initializer.",
        );
    }

    #[test]
    fn test_return_at_top_level() {
        assert_single_error("return 1;", "Can't return from top-level code.");
    }

    #[test]
    fn test_return_value_from_initializer() {
        assert_single_error(
            "class Foo { init() { return 1; } }",
            "Can't return a value from an initializer.",
        );
    }

    #[test]
    fn test_bare_return_from_initializer_is_fine() {
        assert!(resolve("class Foo { init() { return; } }").is_empty());
    }

    #[test]
    fn test_this_outside_class() {
        assert_single_error("print this;", "Can't use 'this' outside of a class.");
    }

    #[test]
    fn test_this_inside_class_method() {
        // Class-level methods have no receiver.
        assert_single_error(
            "class Foo { class bar() { return this; } }",
            "Can't use 'this' outside of a class.",
        );
    }

    #[test]
    fn test_super_without_superclass() {
        assert_single_error(
            "class Foo { bar() { return super.bar; } }",
            "Can't use 'super' in a class with no superclass.",
        );
    }

    #[test]
    fn test_super_outside_class() {
        assert_single_error("print super.x;", "Can't use 'super' outside of a class.");
    }

    #[test]
    fn test_class_inheriting_from_itself() {
        assert_single_error("class Foo < Foo {}", "A class can't inherit from itself.");
    }
}
