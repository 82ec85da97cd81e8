#[cfg(test)]
mod parser_tests {
    use pretty_assertions::assert_eq;

    use rox::ast_printer::AstPrinter;
    use rox::parser::Parser;
    use rox::scanner::Scanner;

    /// Parse `source`, rendering each statement or each diagnostic.
    fn parse(source: &str) -> Result<Vec<String>, Vec<String>> {
        let (tokens, scan_errors) = Scanner::new(source).scan_tokens();
        assert!(scan_errors.is_empty(), "scan errors: {:?}", scan_errors);

        let printer = AstPrinter;

        Parser::new(&tokens)
            .parse()
            .map(|stmts| stmts.iter().map(|s| printer.print_stmt(s)).collect())
            .map_err(|errs| errs.iter().map(|e| e.to_string()).collect())
    }

    fn parse_one(source: &str) -> String {
        let mut stmts = parse(source).unwrap_or_else(|e| panic!("parse failed: {:?}", e));
        assert_eq!(stmts.len(), 1);
        stmts.remove(0)
    }

    #[test]
    fn test_precedence_and_associativity() {
        assert_eq!(
            parse_one("1 + 2 * 3 - -4;"),
            "(; (- (+ 1.0 (* 2.0 3.0)) (- 4.0)))"
        );
        assert_eq!(
            parse_one("(1 + 2) * 3 >= 4 == true;"),
            "(; (== (>= (* (group (+ 1.0 2.0)) 3.0) 4.0) true))"
        );
        assert_eq!(parse_one("!!nil;"), "(; (! (! nil)))");
    }

    #[test]
    fn test_logical_operators() {
        assert_eq!(parse_one("a or b and c;"), "(; (or a (and b c)))");
    }

    #[test]
    fn test_assignment_is_right_associative() {
        assert_eq!(parse_one("a = b = 1;"), "(; (= a (= b 1.0)))");
        assert_eq!(parse_one("obj.field = 2;"), "(; (= (. obj field) 2.0))");
    }

    #[test]
    fn test_calls_and_property_access() {
        assert_eq!(
            parse_one("f(1)(2, \"s\").x;"),
            "(; (. (call (call f 1.0) 2.0 s) x))"
        );
        assert_eq!(parse_one("f();"), "(; (call f))");
    }

    #[test]
    fn test_for_desugars_to_while() {
        assert_eq!(
            parse_one("for (var i = 0; i < 3; i = i + 1) print i;"),
            "(block (var i 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"
        );
        assert_eq!(parse_one("for (;;) print 1;"), "(while true (print 1.0))");
    }

    #[test]
    fn test_dangling_else_binds_to_nearest_if() {
        assert_eq!(
            parse_one("if (a) if (b) print 1; else print 2;"),
            "(if a (if b (print 1.0) (print 2.0)))"
        );
    }

    #[test]
    fn test_declarations() {
        assert_eq!(
            parse(
                "var a; var b = \"x\"; fun add(x, y) { return x + y; } \
                 class B < A { init(x) { this.x = x; } go() { super.go(); return; } }"
            )
            .unwrap(),
            vec![
                "(var a)",
                "(var b x)",
                "(fun add (x y) (return (+ x y)))",
                "(class B < A (fun init (x) (; (= (. this x) x))) \
                 (fun go () (; (call (super go))) (return)))",
            ]
        );
    }

    #[test]
    fn test_break_statement() {
        assert_eq!(parse_one("while (true) break;"), "(while true (break))");
        assert_eq!(
            parse("while (true) break").unwrap_err(),
            vec!["line 1: Error at end: Expected ';' after 'break'"]
        );
    }

    #[test]
    fn test_anonymous_functions() {
        assert_eq!(
            parse_one("var f = fun (a) { return a; };"),
            "(var f (fun (a) (return a)))"
        );
        assert_eq!(parse_one("fun () {};"), "(; (fun () ))");
        assert_eq!(
            parse_one("apply(fun (x) { print x; }, 1);"),
            "(; (call apply (fun (x) (print x)) 1.0))"
        );
        assert_eq!(
            parse("fun;").unwrap_err(),
            vec!["line 1: Error at ';': Expected '(' after 'fun'"]
        );
    }

    #[test]
    fn test_reports_every_error_in_one_pass() {
        let errors = parse("var = 1;\nprint 2;\nvar x = ;\n").unwrap_err();

        assert_eq!(
            errors,
            vec![
                "line 1: Error at '=': Expected variable name",
                "line 3: Error at ';': Expected expression",
            ]
        );
    }

    #[test]
    fn test_error_at_end() {
        assert_eq!(
            parse("print 1").unwrap_err(),
            vec!["line 1: Error at end: Expected ';' after value"]
        );
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert_eq!(
            parse("1 = 2;\na + b = c;").unwrap_err(),
            vec![
                "line 1: Error at '=': Invalid assignment target",
                "line 2: Error at '=': Invalid assignment target",
            ]
        );
    }

    #[test]
    fn test_super_requires_method_name() {
        assert_eq!(
            parse("super;").unwrap_err(),
            vec!["line 1: Error at ';': Expected '.' after 'super'"]
        );
    }

    #[test]
    fn test_argument_limit() {
        let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
        let source = format!("f({});", args.join(", "));

        let errors = parse(&source).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(
            errors[0].ends_with("Can't have more than 255 arguments"),
            "got: {}",
            errors[0]
        );
    }
}
