use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::callable::{LoxClass, LoxFunction, LoxInstance, NativeFunction};

/// A Lox runtime value.
///
/// Strings are immutable and shared; functions, classes and instances are
/// reference types compared by identity.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    NativeFunction(Rc<NativeFunction>),
    Function(Rc<LoxFunction>),
    Class(Rc<LoxClass>),
    Instance(Rc<RefCell<LoxInstance>>),
}

impl Value {
    /// `nil` and `false` are falsy; everything else (including `0` and `""`)
    /// is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Rc::from(s))
    }
}

impl PartialEq for Value {
    /// Values of different kinds are never equal. Primitives compare by
    /// value, reference types by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::NativeFunction(a), Value::NativeFunction(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Number(n) => write!(f, "{}", format_number(*n)),

            Value::String(s) => write!(f, "{}", s),

            Value::NativeFunction(_) => write!(f, "<native fn>"),

            Value::Function(func) => match func.name() {
                Some(name) => write!(f, "<fn {}>", name),
                None => write!(f, "<fn>"),
            },

            Value::Class(class) => write!(f, "<class {}>", class.name),

            Value::Instance(instance) => {
                write!(f, "<instance {}>", instance.borrow().class.name)
            }
        }
    }
}

/// Significant digits kept when a number is printed.
const PRINT_PRECISION: i32 = 10;

/// Shortest rendering with at most [`PRINT_PRECISION`] significant digits, in
/// the style of C's `%.10g`: `3`, `2.5`, `0.3333333333`, `1e+15`, `nan`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }

    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    // Integral values that fit in the precision print as plain integers.
    if n.fract() == 0.0 && n.abs() < 1e10 {
        if n == 0.0 && n.is_sign_negative() {
            return "-0".to_string();
        }

        let mut buf: itoa::Buffer = itoa::Buffer::new();
        return buf.format(n as i64).to_string();
    }

    // Round to the precision first; the exponent of the rounded value picks
    // between fixed and scientific notation.
    let scientific: String = format!("{:.*e}", (PRINT_PRECISION - 1) as usize, n);

    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return n.to_string();
    };

    let Ok(exponent) = exponent.parse::<i32>() else {
        return n.to_string();
    };

    if (-4..PRINT_PRECISION).contains(&exponent) {
        let decimals: usize = (PRINT_PRECISION - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, n)).to_string()
    } else {
        let sign: char = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    }
}

/// Drop trailing zeros after the decimal point, and the point itself.
fn trim_fraction(digits: &str) -> &str {
    if !digits.contains('.') {
        return digits;
    }

    digits.trim_end_matches('0').trim_end_matches('.')
}
