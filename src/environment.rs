use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use log::trace;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to an environment. Closures, bound methods and nested
/// scopes all hold one; the scope lives while any of them does.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One lexical scope at runtime: name → value, plus the enclosing scope
/// (`None` for globals).
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap into a shareable handle.
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Bind `name` in this scope, replacing any earlier binding.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Dynamic lookup by name through the whole chain. Used for globals.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// Walk exactly `distance` enclosing links from `env`.
    ///
    /// The resolver guarantees the chain is at least that deep. A shorter
    /// chain means the resolver and interpreter disagree about scopes: debug
    /// builds panic, release builds stop at the outermost scope.
    pub fn ancestor(env: &EnvRef, distance: usize) -> EnvRef {
        let mut current: EnvRef = Rc::clone(env);

        for hop in 0..distance {
            let next: Option<EnvRef> = current.borrow().enclosing.clone();

            match next {
                Some(next) => current = next,
                None => {
                    debug_assert!(
                        false,
                        "scope chain has {} links, resolver asked for {}",
                        hop, distance
                    );
                    break;
                }
            }
        }

        current
    }

    /// Read a resolved local `distance` scopes out.
    pub fn get_at(env: &EnvRef, distance: usize, name: &str) -> Option<Value> {
        trace!("get_at distance={} name={}", distance, name);

        Self::ancestor(env, distance)
            .borrow()
            .values
            .get(name)
            .cloned()
    }

    /// Write a resolved local `distance` scopes out.
    pub fn assign_at(env: &EnvRef, distance: usize, name: &str, value: Value) {
        trace!("assign_at distance={} name={}", distance, name);

        Self::ancestor(env, distance)
            .borrow_mut()
            .define(name, value);
    }
}

fn undefined(name: &Token) -> RuntimeError {
    RuntimeError::new(
        name.line,
        format!("Undefined variable '{}'.", name.lexeme),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    fn ident(name: &str) -> Token {
        Token::new(TokenType::IDENTIFIER, name, 1)
    }

    #[test]
    fn lookup_walks_enclosing_scopes() {
        let globals = Environment::new().into_ref();
        globals.borrow_mut().define("a", Value::Number(1.0));

        let inner = Environment::with_enclosing(Rc::clone(&globals)).into_ref();

        assert_eq!(inner.borrow().get(&ident("a")), Ok(Value::Number(1.0)));
        assert!(inner.borrow().get(&ident("b")).is_err());
    }

    #[test]
    fn assign_at_targets_exact_ancestor() {
        let outer = Environment::new().into_ref();
        outer.borrow_mut().define("x", Value::Number(1.0));

        let inner = Environment::with_enclosing(Rc::clone(&outer)).into_ref();
        inner.borrow_mut().define("x", Value::Number(2.0));

        Environment::assign_at(&inner, 1, "x", Value::Number(3.0));

        assert_eq!(Environment::get_at(&inner, 0, "x"), Some(Value::Number(2.0)));
        assert_eq!(Environment::get_at(&inner, 1, "x"), Some(Value::Number(3.0)));
    }

    #[test]
    fn ancestor_walks_exact_distance() {
        let outer = Environment::new().into_ref();
        let middle = Environment::with_enclosing(Rc::clone(&outer)).into_ref();
        let inner = Environment::with_enclosing(Rc::clone(&middle)).into_ref();

        assert!(Rc::ptr_eq(&Environment::ancestor(&inner, 0), &inner));
        assert!(Rc::ptr_eq(&Environment::ancestor(&inner, 2), &outer));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "scope chain has 1 links, resolver asked for 3")]
    fn ancestor_past_outermost_scope_panics_in_debug() {
        let outer = Environment::new().into_ref();
        let inner = Environment::with_enclosing(outer).into_ref();

        Environment::ancestor(&inner, 3);
    }
}
