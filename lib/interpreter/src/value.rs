use std::fmt::{self, Display, Formatter};

use parser::LiteralValue;

use crate::function::Callable;

#[derive(Debug, Clone, derive_more::From, derive_more::Display)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
    #[display(fmt = "nil")]
    Nil,
    Callable(Callable),
}

impl Value {
    /// Only `nil` and `false` are falsey.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Nil => "nil",
            Value::Callable(_) => "function",
        }
    }
}

/// Values of different kinds are never equal, numbers compare with plain IEEE semantics.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Callable(a), Value::Callable(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<&LiteralValue> for Value {
    fn from(literal: &LiteralValue) -> Self {
        match literal {
            LiteralValue::Number(n) => Value::Number(*n),
            LiteralValue::Str(s) => Value::Str(s.clone()),
            LiteralValue::Boolean(b) => Value::Bool(*b),
            LiteralValue::Nil => Value::Nil,
        }
    }
}

/// Wrapper for printing a value together with its type, used in log output.
pub struct Typed<'a>(pub &'a Value);

impl Display for Typed<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.0.type_name())
    }
}
