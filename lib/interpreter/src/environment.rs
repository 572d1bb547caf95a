use std::{cell::RefCell, collections::HashMap, rc::Rc};

use scanner::Token;

use crate::{value::Value, RuntimeError};

/// One scope of variables. Scopes form a chain through `enclosing` that ends at the globals.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn global() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn enclosed(enclosing: Rc<RefCell<Environment>>) -> Rc<RefCell<Self>> {
        log::trace!("Opening new scope");
        Rc::new(RefCell::new(Self { values: HashMap::new(), enclosing: Some(enclosing) }))
    }

    /// Binds `name` in this scope, replacing any previous binding of the same name.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        match self.values.get(name.lexeme()) {
            Some(value) => Ok(value.clone()),
            None => match &self.enclosing {
                Some(enclosing) => enclosing.borrow().get(name),
                None => Err(RuntimeError::UndefinedVariable { name: name.clone() }),
            },
        }
    }

    /// Overwrites the innermost existing binding of `name`. Never creates one.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.get_mut(name.lexeme()) {
            *slot = value;
            return Ok(());
        }

        match &self.enclosing {
            Some(enclosing) => enclosing.borrow_mut().assign(name, value),
            None => Err(RuntimeError::UndefinedVariable { name: name.clone() }),
        }
    }
}
