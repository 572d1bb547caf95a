use std::{
    cell::RefCell,
    fmt::{Debug, Display},
    io::Write,
    rc::Rc,
};

use parser::FunctionDecl;

use crate::{environment::Environment, value::Value, Flow, Interpreter, RuntimeError};

/// Anything that can appear on the left of a call expression.
#[derive(Debug, Clone)]
pub enum Callable {
    Function(Rc<LoxFunction>),
    Native(NativeFunction),
}

impl Callable {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Function(function) => function.arity(),
            Callable::Native(native) => native.arity,
        }
    }

    /// Invokes the callable, `arguments` must already match the arity.
    pub fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<W>,
        arguments: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        debug_assert_eq!(arguments.len(), self.arity());
        match self {
            Callable::Function(function) => function.call(interpreter, arguments),
            Callable::Native(native) => Ok((native.fun)(&arguments)),
        }
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Callable::Function(a), Callable::Function(b)) => Rc::ptr_eq(a, b),
            (Callable::Native(a), Callable::Native(b)) => a.name == b.name,
            _ => false,
        }
    }
}

impl Display for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callable::Function(function) => write!(f, "{}", function),
            Callable::Native(native) => write!(f, "{}", native),
        }
    }
}

/// A user-defined function together with the scope it was declared in.
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: Rc<RefCell<Environment>>,
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: Rc<RefCell<Environment>>) -> Self {
        Self { declaration, closure }
    }

    pub fn name(&self) -> &str {
        self.declaration.name.lexeme()
    }

    pub fn arity(&self) -> usize {
        self.declaration.arity()
    }

    fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<W>,
        arguments: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        log::debug!("Calling {} with {} argument(s)", self, arguments.len());

        // Parented at the closure, not at the caller's scope.
        let environment = Environment::enclosed(self.closure.clone());
        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment.borrow_mut().define(param.lexeme(), argument);
        }

        match interpreter.execute_block(&self.declaration.body, environment)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }
}

impl Display for LoxFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}

impl Debug for LoxFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Intentionally ignoring the closure here, it usually contains this very function.
        f.debug_struct("LoxFunction")
            .field("name", &self.name())
            .field("arity", &self.arity())
            .finish()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub fun: fn(&[Value]) -> Value,
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn>")
    }
}
