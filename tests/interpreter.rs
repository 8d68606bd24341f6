#[cfg(test)]
mod interpreter_tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use lox_rs as lox;

    use lox::error::RuntimeError;
    use lox::interpreter::Interpreter;
    use lox::parser::Parser;
    use lox::resolver::Resolver;
    use lox::scanner;
    use lox::stmt::Stmt;

    fn front_end(source: &str, interpreter: &mut Interpreter) -> Vec<Stmt> {
        let (tokens, errors) = scanner::scan(source.as_bytes());
        assert!(errors.is_empty(), "scan errors: {:?}", errors);

        let mut parser = Parser::new(tokens);
        let (statements, errors) = parser.parse();
        assert!(errors.is_empty(), "parse errors: {:?}", errors);

        let errors = Resolver::new(interpreter).resolve(&statements);
        assert!(errors.is_empty(), "resolve errors: {:?}", errors);

        statements
    }

    /// Run a program to completion and return everything it printed.
    fn run(source: &str) -> String {
        let sink: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
        let mut interpreter = Interpreter::with_output(sink.clone());

        let statements = front_end(source, &mut interpreter);
        interpreter.interpret(&statements).expect("runtime error");

        let bytes = sink.borrow().clone();
        String::from_utf8(bytes).expect("print output is UTF-8")
    }

    /// Run a program expected to fault and return the runtime error.
    fn run_err(source: &str) -> RuntimeError {
        let sink: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
        let mut interpreter = Interpreter::with_output(sink);

        let statements = front_end(source, &mut interpreter);

        interpreter
            .interpret(&statements)
            .expect_err("expected a runtime error")
    }

    // ── expressions ─────────────────────────────────────────────────

    #[test]
    fn test_arithmetic_and_number_formatting() {
        assert_eq!(run("print 1 + 2 * 3;"), "7\n");
        assert_eq!(run("print 10 / 4;"), "2.5\n");
        assert_eq!(run("print -(3 - 5);"), "2\n");
    }

    #[test]
    fn test_string_concatenation_widens() {
        assert_eq!(run("print \"n = \" + 4;"), "n = 4\n");
        assert_eq!(run("print 4 + \"!\";"), "4!\n");
        assert_eq!(run("print \"a\" + \"b\";"), "ab\n");
    }

    #[test]
    fn test_plus_on_mismatched_operands() {
        let e = run_err("print true + 1;");
        assert_eq!(e.message, "Operands must be two numbers or two strings.");
    }

    #[test]
    fn test_division_by_zero_faults() {
        let e = run_err("print 1 / 0;");
        assert_eq!(e.message, "Division by zero.");

        // Zero as the dividend is fine.
        assert_eq!(run("print 0 / 1;"), "0\n");
    }

    #[test]
    fn test_comparison_and_equality() {
        assert_eq!(run("print 1 < 2;"), "true\n");
        assert_eq!(run("print \"a\" == \"a\";"), "true\n");
        assert_eq!(run("print 1 == \"1\";"), "false\n");
        assert_eq!(run("print nil == nil;"), "true\n");
    }

    #[test]
    fn test_logical_operators_yield_operands() {
        assert_eq!(run("print \"hi\" or 2;"), "hi\n");
        assert_eq!(run("print nil or \"fallback\";"), "fallback\n");
        assert_eq!(run("print nil and 2;"), "nil\n");
    }

    #[test]
    fn test_ternary_evaluates_one_branch() {
        assert_eq!(run("print 1 < 2 ? \"yes\" : \"no\";"), "yes\n");
        // The untaken branch would fault if evaluated.
        assert_eq!(run("print true ? 1 : 1 / 0;"), "1\n");
    }

    #[test]
    fn test_comma_yields_right_operand() {
        assert_eq!(run("print 1, 2;"), "2\n");
    }

    #[test]
    fn test_comma_evaluates_left_for_effect() {
        let source = r#"
            var log = "";
            fun note() { log = log + "x"; return 1; }
            print (note(), 2);
            print log;
        "#;

        assert_eq!(run(source), "2\nx\n");
    }

    // ── variables and scope ─────────────────────────────────────────

    #[test]
    fn test_uninitialized_is_distinct_from_undefined() {
        let e = run_err("var a; print a;");
        assert_eq!(e.message, "Uninitialized variable 'a'.");

        let e = run_err("print nosuch;");
        assert_eq!(e.message, "Undefined variable 'nosuch'.");
    }

    #[test]
    fn test_assignment_heals_uninitialized() {
        assert_eq!(run("var a; a = 3; print a;"), "3\n");
    }

    #[test]
    fn test_assign_to_undefined_faults() {
        let e = run_err("nosuch = 1;");
        assert_eq!(e.message, "Undefined variable 'nosuch'.");
    }

    #[test]
    fn test_block_shadowing() {
        assert_eq!(
            run("var a = \"outer\"; { var a = \"inner\"; print a; } print a;"),
            "inner\nouter\n"
        );
    }

    #[test]
    fn test_nested_shadowing_unwinds() {
        let source = r#"
            var a = 1;
            {
              var a = 2;
              {
                var a = 3;
                print a;
              }
              print a;
            }
            print a;
        "#;

        assert_eq!(run(source), "3\n2\n1\n");
    }

    #[test]
    fn test_fresh_interpreters_agree() {
        let source = r#"
            fun twice(x) { return x + x; }
            print twice(21);
            print twice("ha");
        "#;

        let first = run(source);
        let second = run(source);

        assert_eq!(first, "42\nhaha\n");
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolution_is_static() {
        // showA keeps pointing at the global even after the block declares
        // its own a.
        let source = r#"
            var a = "global";
            {
              fun showA() { print a; }
              showA();
              var a = "block";
              showA();
              print a;
            }
        "#;

        assert_eq!(run(source), "global\nglobal\nblock\n");
    }

    // ── control flow ────────────────────────────────────────────────

    #[test]
    fn test_while_and_break() {
        assert_eq!(
            run("var i = 0; while (true) { i = i + 1; if (i >= 3) break; } print i;"),
            "3\n"
        );
    }

    #[test]
    fn test_break_exits_innermost_loop_only() {
        let source = r#"
            var total = 0;
            for (var i = 0; i < 3; i = i + 1) {
              var j = 0;
              while (true) {
                j = j + 1;
                if (j == 2) break;
              }
              total = total + j;
            }
            print total;
        "#;

        assert_eq!(run(source), "6\n");
    }

    #[test]
    fn test_for_loop_desugaring_runs() {
        assert_eq!(
            run("for (var i = 1; i <= 3; i = i + 1) print i;"),
            "1\n2\n3\n"
        );
    }

    // ── functions and closures ──────────────────────────────────────

    #[test]
    fn test_function_return_value() {
        assert_eq!(
            run("fun add(a, b) { return a + b; } print add(1, 2);"),
            "3\n"
        );
    }

    #[test]
    fn test_function_without_return_yields_nil() {
        assert_eq!(run("fun noop() {} print noop();"), "nil\n");
    }

    #[test]
    fn test_arity_mismatch() {
        let e = run_err("fun f(a, b) { return a + b; } f(1);");
        assert_eq!(e.message, "Expected 2 arguments but got 1.");
    }

    #[test]
    fn test_calling_a_non_callable() {
        let e = run_err("print \"hi\"();");
        assert_eq!(e.message, "Can only call functions and classes.");
    }

    #[test]
    fn test_closure_counter() {
        let source = r#"
            fun makeCounter() {
              var i = 0;
              fun count() {
                i = i + 1;
                print i;
              }
              return count;
            }
            var counter = makeCounter();
            counter();
            counter();
        "#;

        assert_eq!(run(source), "1\n2\n");
    }

    #[test]
    fn test_closures_share_their_frame() {
        let source = r#"
            var globalOne;
            var globalTwo;
            {
              var a = "one";
              fun one() { print a; }
              globalOne = one;
              a = "two";
              fun two() { print a; }
              globalTwo = two;
            }
            globalOne();
            globalTwo();
        "#;

        assert_eq!(run(source), "two\ntwo\n");
    }

    #[test]
    fn test_anonymous_function_argument() {
        let source = r#"
            fun thrice(fn) {
              for (var i = 1; i <= 3; i = i + 1) {
                fn(i);
              }
            }
            thrice(fun (a) { print a; });
        "#;

        assert_eq!(run(source), "1\n2\n3\n");
    }

    #[test]
    fn test_recursion() {
        assert_eq!(
            run("fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } print fib(10);"),
            "55\n"
        );
    }

    // ── classes ─────────────────────────────────────────────────────

    #[test]
    fn test_fields_and_methods() {
        let source = r#"
            class Bacon {
              eat() {
                print "Crunch " + this.flavor + "!";
              }
            }
            var bacon = Bacon();
            bacon.flavor = "maple";
            bacon.eat();
        "#;

        assert_eq!(run(source), "Crunch maple!\n");
    }

    #[test]
    fn test_fields_shadow_methods() {
        let source = r#"
            class Box {
              label() { return "method"; }
            }
            var box = Box();
            box.label = "field";
            print box.label;
        "#;

        assert_eq!(run(source), "field\n");
    }

    #[test]
    fn test_undefined_property() {
        let e = run_err("class Foo {} print Foo().bar;");
        assert_eq!(e.message, "Undefined property 'bar'.");
    }

    #[test]
    fn test_only_instances_have_fields() {
        let e = run_err("var x = 1; x.field = 2;");
        assert_eq!(e.message, "Only instances have fields.");
    }

    #[test]
    fn test_init_returns_this() {
        let source = r#"
            class Foo {
              init() { this.bar = "baz"; }
            }
            var foo = Foo();
            print foo.bar;
            print foo.init().bar;
        "#;

        assert_eq!(run(source), "baz\nbaz\n");
    }

    #[test]
    fn test_bound_method_keeps_receiver() {
        let source = r#"
            class Person {
              init(name) { this.name = name; }
              greet() { print "hi, " + this.name; }
            }
            var method = Person("Ada").greet;
            method();
        "#;

        assert_eq!(run(source), "hi, Ada\n");
    }

    #[test]
    fn test_inherited_method_lookup() {
        let source = r#"
            class Doughnut {
              cook() { print "Fry until golden."; }
            }
            class BostonCream < Doughnut {}
            BostonCream().cook();
        "#;

        assert_eq!(run(source), "Fry until golden.\n");
    }

    #[test]
    fn test_super_skips_to_superclass_of_defining_class() {
        let source = r#"
            class A {
              method() { print "A method"; }
            }
            class B < A {
              method() { print "B method"; }
              test() { super.method(); }
            }
            class C < B {}
            C().test();
        "#;

        assert_eq!(run(source), "A method\n");
    }

    #[test]
    fn test_superclass_must_be_a_class() {
        let e = run_err("var NotAClass = \"so not\"; class Sub < NotAClass {}");
        assert_eq!(e.message, "Superclass must be a class.");
    }

    #[test]
    fn test_class_level_methods() {
        let source = r#"
            class Math {
              class square(n) { return n * n; }
            }
            print Math.square(3);
        "#;

        assert_eq!(run(source), "9\n");
    }

    #[test]
    fn test_class_level_methods_are_inherited() {
        let source = r#"
            class Base {
              class origin() { return "Base"; }
            }
            class Derived < Base {}
            print Derived.origin();
        "#;

        assert_eq!(run(source), "Base\n");
    }

    #[test]
    fn test_value_display_forms() {
        let source = r#"
            class Thing {}
            fun named() {}
            print Thing;
            print Thing();
            print named;
        "#;

        assert_eq!(run(source), "Thing\nThing instance\n<fn named>\n");
    }
}
