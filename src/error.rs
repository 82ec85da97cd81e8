//! Centralised error hierarchy for the **Lox interpreter**.
//!
//! Static phases (scanner, parser, resolver) convert their failure modes into
//! one of the [`LoxError`] variants. Evaluation failures are a separate type,
//! [`RuntimeError`], so a runtime fault can never be mistaken for a static
//! diagnostic or for the `return` unwinding signal used by the interpreter.
//!
//! The module **does not** print diagnostics itself; the session in
//! [`crate::lox`] decides where they go.

use thiserror::Error;

use log::debug;

/// Canonical error type for the static phases of the pipeline.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("line {line}: Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    #[error("line {line}: Error{location}: {message}")]
    Parse {
        message: String,
        /// ` at 'lexeme'` or ` at end`.
        location: String,
        line: usize,
    },

    /// Static‑analysis failure found by the resolver.
    #[error("line {line}: Error{location}: {message}")]
    Resolve {
        message: String,
        location: String,
        line: usize,
    },
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**. `lexeme` is `None` at EOF.
    pub fn parse<S: Into<String>>(line: usize, lexeme: Option<&str>, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Parse error: line={}, msg={}", line, message);

        LoxError::Parse {
            message,
            location: location(lexeme),
            line,
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(line: usize, lexeme: &str, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Resolve error: line={}, msg={}", line, message);

        LoxError::Resolve {
            message,
            location: location(Some(lexeme)),
            line,
        }
    }

    /// Source line the diagnostic points at.
    pub fn line(&self) -> usize {
        match self {
            LoxError::Lex { line, .. }
            | LoxError::Parse { line, .. }
            | LoxError::Resolve { line, .. } => *line,
        }
    }
}

fn location(lexeme: Option<&str>) -> String {
    match lexeme {
        Some(lexeme) => format!(" at '{}'", lexeme),
        None => " at end".to_string(),
    }
}

/// A fault raised while evaluating a resolved program.
///
/// Raising one aborts the current top‑level statement sequence.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("line {line}: {message}")]
pub struct RuntimeError {
    pub message: String,
    pub line: usize,
}

impl RuntimeError {
    pub fn new<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Runtime error: line={}, msg={}", line, message);

        RuntimeError { message, line }
    }
}

/// Crate‑wide `Result` alias for the static phases.
pub type Result<T> = std::result::Result<T, LoxError>;
