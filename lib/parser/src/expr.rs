use std::fmt::{self, Display, Formatter};

use itertools::Itertools;
use scanner::Token;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Assign { name: Token, value: Box<Expr> },
    Binary { left: Box<Expr>, operator: Token, right: Box<Expr> },
    Logical { left: Box<Expr>, operator: Token, right: Box<Expr> },
    Grouping(Box<Expr>),
    Literal(LiteralValue),
    Unary { operator: Token, right: Box<Expr> },
    Variable(Token),
    Call { callee: Box<Expr>, closing_paren: Token, arguments: Vec<Expr> },
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Assign { name, value } => write!(f, "(assign {} {})", name, value),
            Expr::Binary { left, operator, right } | Expr::Logical { left, operator, right } => {
                write!(f, "({} {} {})", operator, left, right)
            }
            Expr::Grouping(expression) => write!(f, "(group {})", expression),
            Expr::Literal(value) => write!(f, "{}", value),
            Expr::Unary { operator, right } => write!(f, "({} {})", operator, right),
            Expr::Variable(name) => write!(f, "{}", name),
            Expr::Call { callee, arguments, .. } => {
                if arguments.is_empty() {
                    write!(f, "(call {})", callee)
                } else {
                    write!(f, "(call {} {})", callee, arguments.iter().join(" "))
                }
            }
        }
    }
}

/// The values that can be written down directly in source code.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    Str(String),
    Boolean(bool),
    Nil,
}

impl Display for LiteralValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Number(n) => write!(f, "{}", n),
            LiteralValue::Str(s) => write!(f, "\"{}\"", s),
            LiteralValue::Boolean(b) => write!(f, "{}", b),
            LiteralValue::Nil => write!(f, "nil"),
        }
    }
}
