//! A tree-walking interpreter for the Lox scripting language.
//!
//! Source text flows through [`scanner`] → [`parser`] → [`resolver`] →
//! [`interpreter`]; [`lox::Lox`] ties the stages together behind a single
//! `run(source)` call and keeps the global environment alive between calls.

pub mod ast;
pub mod ast_printer;
pub mod callable;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod lox;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod token;
pub mod value;
