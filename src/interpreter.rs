//! Tree‑walking evaluator.
//!
//! Statements run against a current environment that starts as the global
//! one and persists across [`Interpreter::interpret`] calls, which is what lets
//! an interactive session build on earlier lines.
//!
//! Statement execution yields a [`Flow`]: normal completion, a `break`
//! travelling to the innermost loop, or a `return` carrying its value up to
//! the nearest call boundary. Runtime faults
//! travel separately as [`RuntimeError`], so the two can never be confused.

use std::collections::HashMap;
use std::io::{self, Write};
use std::mem;
use std::rc::Rc;

use log::{debug, info, trace};

use crate::ast::{Expr, ExprId, LiteralValue, Stmt};
use crate::callable::{self, LoxClass, LoxFunction, LoxInstance};
use crate::environment::{EnvRef, Environment};
use crate::error::RuntimeError;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// How a statement finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    /// A `break` is unwinding towards the innermost loop.
    Break,
    /// A `return` is unwinding towards the enclosing call.
    Return(Value),
}

/// Nested Lox calls allowed before a call fails with "Stack overflow.".
pub const MAX_CALL_DEPTH: usize = 1024;

/// Grow the host stack when less than this remains before a Lox call.
const RED_ZONE: usize = 128 * 1024;

/// Size of each additional host stack segment.
const STACK_PER_GROWTH: usize = 2 * 1024 * 1024;

/// Convenient alias for interpreter results.
pub type IResult<T> = Result<T, RuntimeError>;

pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    /// Resolver side table: scope distance for every local reference.
    /// Absent ids are globals.
    locals: HashMap<ExprId, usize>,
    /// Lox calls currently on the stack.
    call_depth: usize,
    out: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Interpreter printing to stdout.
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }

    /// Interpreter streaming `print` output to `out`. Defines the native
    /// functions in the global scope.
    pub fn with_output<W: Write + 'static>(out: W) -> Self {
        info!("Initializing Interpreter");

        let globals: EnvRef = Environment::new().into_ref();

        let clock = callable::clock();
        debug!("Defining native function '{}'", clock.name);
        globals
            .borrow_mut()
            .define(clock.name, Value::NativeFunction(Rc::new(clock)));

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            call_depth: 0,
            out: Box::new(out),
        }
    }

    /// Record the resolver's verdict for one reference.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// Run a program. Stops at the first runtime error; the global state built
    /// so far is kept.
    pub fn interpret(&mut self, statements: &[Stmt]) -> IResult<()> {
        info!("Interpreting {} statement(s)", statements.len());

        for stmt in statements {
            self.execute(stmt)?;
        }

        info!("Interpretation completed successfully");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────────

    pub fn execute(&mut self, stmt: &Stmt) -> IResult<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }

            Stmt::Print { keyword, value } => {
                let value: Value = self.evaluate(value)?;

                writeln!(self.out, "{}", value)
                    .and_then(|_| self.out.flush())
                    .map_err(|e| {
                        RuntimeError::new(keyword.line, format!("Failed to write output: {}", e))
                    })?;

                debug!("Printed value: {}", value);
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}' = {}", name.lexeme, value);
                self.environment.borrow_mut().define(&name.lexeme, value);
            }

            Stmt::Block(statements) => {
                let env: EnvRef =
                    Environment::with_enclosing(Rc::clone(&self.environment)).into_ref();

                return self.execute_block(statements, env);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute(then_branch);
                } else if let Some(else_stmt) = else_branch {
                    return self.execute(else_stmt);
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        Flow::Normal => {}
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                    }
                }
            }

            Stmt::Function(decl) => {
                debug!("Defining function '{}'", decl.name.lexeme);

                let function = LoxFunction::new(Rc::clone(decl), Rc::clone(&self.environment), false);
                self.environment
                    .borrow_mut()
                    .define(&decl.name.lexeme, Value::Function(Rc::new(function)));
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                debug!("Defining class '{}'", name.lexeme);

                let superclass: Option<Rc<LoxClass>> = match superclass {
                    Some(expr) => match self.evaluate(expr)? {
                        Value::Class(class) => Some(class),
                        _ => {
                            let line: usize = match expr {
                                Expr::Variable { name: super_name, .. } => super_name.line,
                                _ => name.line,
                            };

                            return Err(RuntimeError::new(line, "Superclass must be a class."));
                        }
                    },
                    None => None,
                };

                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Value::Nil);

                // Methods of a subclass close over a scope binding `super`.
                let method_env: EnvRef = match &superclass {
                    Some(superclass) => {
                        let mut env = Environment::with_enclosing(Rc::clone(&self.environment));
                        env.define("super", Value::Class(Rc::clone(superclass)));
                        env.into_ref()
                    }
                    None => Rc::clone(&self.environment),
                };

                let methods: HashMap<String, Rc<LoxFunction>> = methods
                    .iter()
                    .map(|decl| {
                        let is_initializer: bool = decl.name.lexeme == "init";
                        let function =
                            LoxFunction::new(Rc::clone(decl), Rc::clone(&method_env), is_initializer);

                        (decl.name.lexeme.clone(), Rc::new(function))
                    })
                    .collect();

                let class = LoxClass::new(name.lexeme.clone(), superclass, methods);

                self.environment
                    .borrow_mut()
                    .assign(name, Value::Class(Rc::new(class)))?;
            }

            Stmt::Break { .. } => return Ok(Flow::Break),

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                trace!("Returning value: {}", value);
                return Ok(Flow::Return(value));
            }
        }

        Ok(Flow::Normal)
    }

    /// Execute `statements` inside `env`, restoring the previous environment
    /// afterwards whether they complete, return or fail.
    pub fn execute_block(&mut self, statements: &[Stmt], env: EnvRef) -> IResult<Flow> {
        let previous: EnvRef = mem::replace(&mut self.environment, env);

        let result: IResult<Flow> = self.execute_all(statements);

        self.environment = previous;
        result
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> IResult<Flow> {
        for stmt in statements {
            match self.execute(stmt)? {
                Flow::Normal => {}
                unwinding => return Ok(unwinding),
            }
        }

        Ok(Flow::Normal)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────────

    pub fn evaluate(&mut self, expr: &Expr) -> IResult<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::from(s.as_str()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left_val: Value = self.evaluate(left)?;

                let short_circuit: bool = match operator.token_type {
                    TokenType::OR => left_val.is_truthy(),
                    _ => !left_val.is_truthy(),
                };

                if short_circuit {
                    Ok(left_val)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value: Value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        Environment::assign_at(&self.environment, distance, &name.lexeme, value.clone())
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee_val: Value = self.evaluate(callee)?;

                let mut args: Vec<Value> = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    args.push(self.evaluate(arg)?);
                }

                self.call_value(callee_val, paren, args)
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => LoxInstance::get(&instance, name),
                _ => Err(RuntimeError::new(name.line, "Only instances have properties.")),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(RuntimeError::new(name.line, "Only instances have fields."));
                };

                let value: Value = self.evaluate(value)?;
                instance.borrow_mut().set(name, value.clone());

                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),

            Expr::Function(decl) => {
                let function =
                    LoxFunction::new(Rc::clone(decl), Rc::clone(&self.environment), false);

                Ok(Value::Function(Rc::new(function)))
            }
        }
    }

    fn evaluate_unary(&mut self, op: &Token, right: &Expr) -> IResult<Value> {
        let right_val: Value = self.evaluate(right)?;

        match op.token_type {
            TokenType::MINUS => match right_val {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::new(op.line, "Operand must be a number.")),
            },
            TokenType::BANG => Ok(Value::Bool(!right_val.is_truthy())),
            _ => Err(RuntimeError::new(
                op.line,
                format!("Invalid unary operator '{}'.", op.lexeme),
            )),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, op: &Token, right: &Expr) -> IResult<Value> {
        let left_val: Value = self.evaluate(left)?;
        let right_val: Value = self.evaluate(right)?;

        trace!("Binary '{}': {} , {}", op.lexeme, left_val, right_val);

        match op.token_type {
            TokenType::EQUAL_EQUAL => return Ok(Value::Bool(left_val == right_val)),
            TokenType::BANG_EQUAL => return Ok(Value::Bool(left_val != right_val)),
            TokenType::PLUS => {
                return match (left_val, right_val) {
                    (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                    (Value::String(a), Value::String(b)) => {
                        let mut joined: String = String::with_capacity(a.len() + b.len());
                        joined.push_str(&a);
                        joined.push_str(&b);

                        Ok(Value::from(joined.as_str()))
                    }
                    _ => Err(RuntimeError::new(
                        op.line,
                        "Operands must be two numbers or two strings.",
                    )),
                };
            }
            _ => {}
        }

        let (Value::Number(a), Value::Number(b)) = (left_val, right_val) else {
            return Err(RuntimeError::new(op.line, "Operands must be numbers."));
        };

        match op.token_type {
            TokenType::MINUS => Ok(Value::Number(a - b)),
            TokenType::STAR => Ok(Value::Number(a * b)),
            // IEEE semantics: x/0 is ±inf or NaN, never an error.
            TokenType::SLASH => Ok(Value::Number(a / b)),
            TokenType::GREATER => Ok(Value::Bool(a > b)),
            TokenType::GREATER_EQUAL => Ok(Value::Bool(a >= b)),
            TokenType::LESS => Ok(Value::Bool(a < b)),
            TokenType::LESS_EQUAL => Ok(Value::Bool(a <= b)),
            _ => Err(RuntimeError::new(
                op.line,
                format!("Invalid binary operator '{}'.", op.lexeme),
            )),
        }
    }

    fn evaluate_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> IResult<Value> {
        let distance: usize = self.locals.get(&id).copied().ok_or_else(|| {
            RuntimeError::new(keyword.line, "Can't use 'super' outside of a class.")
        })?;

        let Some(Value::Class(superclass)) = Environment::get_at(&self.environment, distance, "super")
        else {
            return Err(RuntimeError::new(keyword.line, "Undefined variable 'super'."));
        };

        // `this` lives in the scope just inside the one holding `super`.
        let Some(Value::Instance(object)) =
            Environment::get_at(&self.environment, distance.saturating_sub(1), "this")
        else {
            return Err(RuntimeError::new(keyword.line, "Undefined variable 'this'."));
        };

        match superclass.find_method(&method.lexeme) {
            Some(found) => Ok(Value::Function(Rc::new(found.bind(object)))),
            None => Err(RuntimeError::new(
                method.line,
                format!("Undefined property '{}'.", method.lexeme),
            )),
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> IResult<Value> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, &name.lexeme)
                .ok_or_else(|| {
                    RuntimeError::new(name.line, format!("Undefined variable '{}'.", name.lexeme))
                }),
            None => self.globals.borrow().get(name),
        }
    }

    /// Run one Lox-level call, bounded by [`MAX_CALL_DEPTH`]. The host stack
    /// is grown on demand so the bound, not the thread's stack size, decides
    /// when deep recursion fails.
    fn nested_call<F>(&mut self, paren: &Token, call: F) -> IResult<Value>
    where
        F: FnOnce(&mut Self) -> IResult<Value>,
    {
        if self.call_depth >= MAX_CALL_DEPTH {
            debug!("Call depth limit {} reached at line {}", MAX_CALL_DEPTH, paren.line);
            return Err(RuntimeError::new(paren.line, "Stack overflow."));
        }

        self.call_depth += 1;
        let result: IResult<Value> =
            stacker::maybe_grow(RED_ZONE, STACK_PER_GROWTH, || call(&mut *self));
        self.call_depth -= 1;

        result
    }

    /// Invoke a callable value with already evaluated arguments.
    fn call_value(&mut self, callee: Value, paren: &Token, args: Vec<Value>) -> IResult<Value> {
        match callee {
            Value::NativeFunction(native) => {
                check_arity(native.arity, &args, paren)?;

                debug!("Calling native function '{}'", native.name);
                (native.func)(&args).map_err(|msg| RuntimeError::new(paren.line, msg))
            }

            Value::Function(function) => {
                check_arity(function.arity(), &args, paren)?;
                self.nested_call(paren, |interp| function.call(interp, args))
            }

            Value::Class(class) => {
                check_arity(class.arity(), &args, paren)?;
                self.nested_call(paren, |interp| LoxClass::instantiate(&class, interp, args))
            }

            _ => Err(RuntimeError::new(
                paren.line,
                "Can only call functions and classes.",
            )),
        }
    }
}

fn check_arity(arity: usize, args: &[Value], paren: &Token) -> IResult<()> {
    if args.len() == arity {
        return Ok(());
    }

    Err(RuntimeError::new(
        paren.line,
        format!("Expected {} arguments but got {}.", arity, args.len()),
    ))
}
