mod common;

#[cfg(test)]
mod session_tests {
    use pretty_assertions::assert_eq;

    use rox::lox::{RunStatus, EXIT_RUNTIME_ERROR, EXIT_STATIC_ERROR};

    use crate::common::{run, Session};

    #[test]
    fn test_exit_codes() {
        assert_eq!(RunStatus::default().exit_code(), 0);

        let static_error = RunStatus {
            had_error: true,
            had_runtime_error: false,
        };
        assert_eq!(static_error.exit_code(), EXIT_STATIC_ERROR);

        let runtime_error = RunStatus {
            had_error: false,
            had_runtime_error: true,
        };
        assert_eq!(runtime_error.exit_code(), EXIT_RUNTIME_ERROR);

        let both = RunStatus {
            had_error: true,
            had_runtime_error: true,
        };
        assert_eq!(both.exit_code(), 65);
    }

    #[test]
    fn test_parse_errors_prevent_evaluation() {
        let (out, err, status) = run("print 1;\nvar = 2;\nprint 3;\nprint ;");

        assert_eq!(out, "");
        assert_eq!(
            err,
            "line 2: Error at '=': Expected variable name\n\
             line 4: Error at ';': Expected expression\n"
        );
        assert!(status.had_error);
        assert!(!status.had_runtime_error);
        assert_eq!(status.exit_code(), 65);
    }

    #[test]
    fn test_scan_errors_prevent_evaluation() {
        let (out, err, status) = run("print 1; @");

        assert_eq!(out, "");
        assert_eq!(err, "line 1: Error: Unexpected character: @\n");
        assert_eq!(status.exit_code(), 65);
    }

    #[test]
    fn test_scan_and_parse_errors_reported_together() {
        let (_, err, status) = run("var a = \"open;\nprint ;");

        // The unterminated string swallows the rest of the input, so the
        // parser then trips over the missing initializer at the end.
        assert_eq!(
            err,
            "line 2: Error: Unterminated string.\n\
             line 2: Error at end: Expected expression\n"
        );
        assert!(status.had_error);
    }

    #[test]
    fn test_resolve_errors_prevent_evaluation() {
        let (out, err, status) = run("print \"before\";\nreturn 1;");

        assert_eq!(out, "");
        assert_eq!(err, "line 2: Error at 'return': Can't return from top-level code\n");
        assert_eq!(status.exit_code(), 65);
    }

    #[test]
    fn test_globals_persist_between_runs() {
        let mut session = Session::new();

        assert_eq!(session.run("var a = 1;"), RunStatus::default());
        session.run("fun inc() { a = a + 1; return a; }");
        session.run("print inc();");

        assert_eq!(session.out.contents(), "2\n");
    }

    #[test]
    fn test_session_recovers_after_errors() {
        let mut session = Session::new();

        session.run("var a = \"kept\";");

        let status = session.run("print undefinedThing;");
        assert!(status.had_runtime_error);

        let status = session.run("print ;");
        assert!(status.had_error);

        let status = session.run("print a;");
        assert_eq!(status, RunStatus::default());

        assert_eq!(session.out.contents(), "kept\n");
        assert_eq!(
            session.err.contents(),
            "line 1: Undefined variable 'undefinedThing'.\n\
             line 1: Error at ';': Expected expression\n"
        );
    }

    #[test]
    fn test_closures_survive_between_runs() {
        let mut session = Session::new();

        session.run("fun mk() { var x = 10; fun g() { return x; } return g; }");
        session.run("var g = mk();");
        session.run("print g();");
        session.run("class A { hi() { return \"hi\"; } } var inst = A();");
        session.run("print inst.hi();");

        assert_eq!(session.out.contents(), "10\nhi\n");
        assert_eq!(session.err.contents(), "");
    }

    #[test]
    fn test_output_is_deterministic() {
        let source = r#"
            class Node { init(v, next) { this.v = v; this.next = next; } }
            var list = nil;
            for (var i = 0; i < 5; i = i + 1) list = Node(i, list);
            while (list != nil) { print list.v; list = list.next; }
        "#;

        let first = run(source);
        let second = run(source);

        assert_eq!(first.0, "4\n3\n2\n1\n0\n");
        assert_eq!(first, second);
    }
}
