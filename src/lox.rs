//! The run‑source contract: one [`Lox`] session per process, fed one source
//! unit at a time.
//!
//! ```rust
//! use rox::lox::Lox;
//!
//! let mut lox = Lox::with_output(Vec::new(), Vec::new());
//! let status = lox.run("var greeting = \"hi\";");
//! assert!(!status.had_error);
//!
//! // The global environment survives between runs.
//! let status = lox.run("print greeting;");
//! assert_eq!(status.exit_code(), 0);
//! ```

use std::fmt::Display;
use std::io::{self, Write};

use log::{info, warn};

use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;

/// Exit status for a script with scan, parse or resolve errors.
pub const EXIT_STATIC_ERROR: i32 = 65;

/// Exit status for a script that failed at runtime.
pub const EXIT_RUNTIME_ERROR: i32 = 70;

/// Outcome of one [`Lox::run`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStatus {
    /// A scan, parse or resolve error was reported; nothing was executed.
    pub had_error: bool,

    /// Execution stopped on a runtime error.
    pub had_runtime_error: bool,
}

impl RunStatus {
    /// Process exit code a script runner should use for this outcome.
    pub fn exit_code(&self) -> i32 {
        if self.had_error {
            EXIT_STATIC_ERROR
        } else if self.had_runtime_error {
            EXIT_RUNTIME_ERROR
        } else {
            0
        }
    }
}

/// Session state: the interpreter (global environment and resolution table)
/// and the diagnostic sink.
pub struct Lox {
    interpreter: Interpreter,
    err: Box<dyn Write>,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    /// Program output to stdout, diagnostics to stderr.
    pub fn new() -> Self {
        Self::with_output(io::stdout(), io::stderr())
    }

    pub fn with_output<O, E>(out: O, err: E) -> Self
    where
        O: Write + 'static,
        E: Write + 'static,
    {
        Self {
            interpreter: Interpreter::with_output(out),
            err: Box::new(err),
        }
    }

    /// Scan, parse, resolve and execute `source` against the session's
    /// global environment.
    pub fn run(&mut self, source: &str) -> RunStatus {
        let mut status: RunStatus = RunStatus::default();

        let (tokens, scan_errors) = Scanner::new(source).scan_tokens();

        // Parse even after scan errors so every diagnostic surfaces at once.
        let parsed = Parser::new(&tokens).parse();

        if !scan_errors.is_empty() {
            status.had_error = true;
            self.report_all(&scan_errors);
        }

        let statements = match parsed {
            Ok(statements) => statements,
            Err(parse_errors) => {
                status.had_error = true;
                self.report_all(&parse_errors);
                return status;
            }
        };

        if status.had_error {
            return status;
        }

        if let Err(resolve_errors) = Resolver::new(&mut self.interpreter).resolve(&statements) {
            status.had_error = true;
            self.report_all(&resolve_errors);
            return status;
        }

        if let Err(e) = self.interpreter.interpret(&statements) {
            status.had_runtime_error = true;
            self.report(&e);
        }

        info!("Run finished: {:?}", status);
        status
    }

    fn report_all(&mut self, errors: &[LoxError]) {
        for e in errors {
            self.report(e);
        }
    }

    fn report(&mut self, e: &dyn Display) {
        if let Err(io_err) = writeln!(self.err, "{}", e).and_then(|_| self.err.flush()) {
            warn!("Could not write diagnostic '{}': {}", e, io_err);
        }
    }
}
