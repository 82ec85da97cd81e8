#[cfg(test)]
mod resolver_tests {
    use pretty_assertions::assert_eq;

    use rox::interpreter::Interpreter;
    use rox::parser::Parser;
    use rox::resolver::Resolver;
    use rox::scanner::Scanner;

    /// Resolve `source`, returning the rendered static errors (empty on success).
    fn resolve_errors(source: &str) -> Vec<String> {
        let (tokens, scan_errors) = Scanner::new(source).scan_tokens();
        assert!(scan_errors.is_empty(), "scan errors: {:?}", scan_errors);

        let statements = Parser::new(&tokens)
            .parse()
            .unwrap_or_else(|e| panic!("parse failed: {:?}", e));

        let mut interpreter = Interpreter::with_output(Vec::new());

        match Resolver::new(&mut interpreter).resolve(&statements) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn test_valid_program_has_no_errors() {
        let source = r#"
            var a = a;
            fun f(n) { if (n > 0) return f(n - 1); return; }
            class A { init() { this.x = 1; return; } get() { return this.x; } }
            class B < A { get() { return super.get(); } }
            { var b = 1; { var b = "shadow"; print b; } }
        "#;

        assert_eq!(resolve_errors(source), Vec::<String>::new());

        // Globals may be redeclared freely.
        assert_eq!(resolve_errors("var a = 1; var a = 2; print a;"), Vec::<String>::new());
    }

    #[test]
    fn test_top_level_return() {
        assert_eq!(
            resolve_errors("return 1;"),
            vec!["line 1: Error at 'return': Can't return from top-level code"]
        );
    }

    #[test]
    fn test_redeclaration_in_local_scope() {
        assert_eq!(
            resolve_errors("{ var a = 1; var a = 2; }"),
            vec!["line 1: Error at 'a': Already a variable with this name in this scope"]
        );
        assert_eq!(
            resolve_errors("fun f(a, a) {}"),
            vec!["line 1: Error at 'a': Already a variable with this name in this scope"]
        );
    }

    #[test]
    fn test_own_initializer() {
        assert_eq!(
            resolve_errors("{ var a = a; }"),
            vec!["line 1: Error at 'a': Can't read local variable in its own initializer"]
        );
    }

    #[test]
    fn test_this_outside_class() {
        assert_eq!(
            resolve_errors("print this;"),
            vec!["line 1: Error at 'this': Can't use 'this' outside of a class"]
        );
        assert_eq!(
            resolve_errors("fun f() { return this; }"),
            vec!["line 1: Error at 'this': Can't use 'this' outside of a class"]
        );
    }

    #[test]
    fn test_super_misuse() {
        assert_eq!(
            resolve_errors("super.x();"),
            vec!["line 1: Error at 'super': Can't use 'super' outside of a class"]
        );
        assert_eq!(
            resolve_errors("class A { m() { super.m(); } }"),
            vec!["line 1: Error at 'super': Can't use 'super' in a class with no superclass"]
        );
    }

    #[test]
    fn test_self_inheritance() {
        assert_eq!(
            resolve_errors("class A < A {}"),
            vec!["line 1: Error at 'A': A class can't inherit from itself"]
        );
    }

    #[test]
    fn test_value_return_from_initializer() {
        assert_eq!(
            resolve_errors("class A { init() { return 1; } }"),
            vec!["line 1: Error at 'return': Can't return a value from an initializer"]
        );
        assert_eq!(resolve_errors("class A { init() { return; } }"), Vec::<String>::new());
    }

    #[test]
    fn test_break_outside_loop() {
        assert_eq!(
            resolve_errors("break;"),
            vec!["line 1: Error at 'break': Can't use 'break' outside of a loop"]
        );
        assert_eq!(
            resolve_errors("while (true) { fun f() { break; } }"),
            vec!["line 1: Error at 'break': Can't use 'break' outside of a loop"]
        );
        assert_eq!(
            resolve_errors("while (true) { var g = fun () { break; }; }"),
            vec!["line 1: Error at 'break': Can't use 'break' outside of a loop"]
        );
        assert_eq!(
            resolve_errors("while (true) { if (true) { break; } }\nfor (;;) break;"),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_anonymous_function_scopes() {
        assert_eq!(
            resolve_errors("var f = fun (a, a) { return a; };"),
            vec!["line 1: Error at 'a': Already a variable with this name in this scope"]
        );
        // The body runs later, so it may refer to the variable being defined.
        assert_eq!(
            resolve_errors("{ var a = fun () { return a; }; }"),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_collects_all_errors() {
        assert_eq!(
            resolve_errors("return 1;\nprint this;\n{ var x; var x; }"),
            vec![
                "line 1: Error at 'return': Can't return from top-level code",
                "line 2: Error at 'this': Can't use 'this' outside of a class",
                "line 3: Error at 'x': Already a variable with this name in this scope",
            ]
        );
    }
}
