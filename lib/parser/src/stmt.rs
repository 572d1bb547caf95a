use std::{
    fmt::{self, Display, Formatter},
    rc::Rc,
};

use itertools::Itertools;
use scanner::Token;

use crate::{Expr, LiteralValue};

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(Expr),
    Print { keyword: Token, expr: Expr },
    Var { name: Token, initializer: Option<Expr> },
    Block(Vec<Stmt>),
    If { condition: Expr, then_branch: Box<Stmt>, else_branch: Option<Box<Stmt>> },
    While { condition: Expr, body: Box<Stmt> },
    For(ForLoop),
    /// Shared, since every function value created from this declaration points back to it.
    Function(Rc<FunctionDecl>),
    Return { keyword: Token, value: Option<Expr> },
}

#[derive(Debug, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

impl FunctionDecl {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

const LOWERED_SHAPE: &str = "ForLoop::new builds `{ init; while (cond) { body; incr; } }`";

/// A `for` loop, kept only as the `Block`/`While` tree it lowers to. The
/// clause accessors hand out the pieces of that tree, nothing is stored twice.
#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    lowered: Box<Stmt>,
    has_initializer: bool,
    has_condition: bool,
    has_increment: bool,
}

impl ForLoop {
    /// `for (init; cond; incr) body` becomes `{ init; while (cond) { body; incr; } }`,
    /// with a missing condition replaced by `true`. Without an initializer
    /// there is no outer block.
    pub fn new(
        initializer: Option<Stmt>,
        condition: Option<Expr>,
        increment: Option<Expr>,
        body: Stmt,
    ) -> Self {
        let has_initializer = initializer.is_some();
        let has_condition = condition.is_some();
        let has_increment = increment.is_some();

        let body = match increment {
            Some(increment) => Stmt::Block(vec![body, Stmt::Expression(increment)]),
            None => body,
        };

        let condition = condition.unwrap_or(Expr::Literal(LiteralValue::Boolean(true)));
        let while_stmt = Stmt::While { condition, body: Box::new(body) };

        let lowered = match initializer {
            Some(initializer) => Stmt::Block(vec![initializer, while_stmt]),
            None => while_stmt,
        };

        Self { lowered: Box::new(lowered), has_initializer, has_condition, has_increment }
    }

    /// The tree the interpreter runs.
    pub fn lowered(&self) -> &Stmt {
        &self.lowered
    }

    fn while_stmt(&self) -> (&Expr, &Stmt) {
        let while_stmt = match (self.has_initializer, self.lowered()) {
            (true, Stmt::Block(stmts)) => &stmts[1],
            (false, stmt) => stmt,
            _ => unreachable!("{}", LOWERED_SHAPE),
        };
        match while_stmt {
            Stmt::While { condition, body } => (condition, body),
            _ => unreachable!("{}", LOWERED_SHAPE),
        }
    }

    pub fn initializer(&self) -> Option<&Stmt> {
        match (self.has_initializer, self.lowered()) {
            (true, Stmt::Block(stmts)) => stmts.first(),
            _ => None,
        }
    }

    pub fn condition(&self) -> Option<&Expr> {
        self.has_condition.then(|| self.while_stmt().0)
    }

    pub fn increment(&self) -> Option<&Expr> {
        match (self.has_increment, self.while_stmt().1) {
            (true, Stmt::Block(stmts)) => match &stmts[1] {
                Stmt::Expression(increment) => Some(increment),
                _ => unreachable!("{}", LOWERED_SHAPE),
            },
            _ => None,
        }
    }

    pub fn body(&self) -> &Stmt {
        match (self.has_increment, self.while_stmt().1) {
            (true, Stmt::Block(stmts)) => &stmts[0],
            (false, body) => body,
            _ => unreachable!("{}", LOWERED_SHAPE),
        }
    }
}

/// The parse root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

fn optional<T: Display>(f: &mut Formatter<'_>, value: Option<&T>) -> fmt::Result {
    match value {
        Some(value) => write!(f, " {}", value),
        None => write!(f, " _"),
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Expression(expr) => write!(f, "(expr {})", expr),
            Stmt::Print { expr, .. } => write!(f, "(print {})", expr),
            Stmt::Var { name, initializer: Some(init) } => write!(f, "(var {} {})", name, init),
            Stmt::Var { name, initializer: None } => write!(f, "(var {})", name),
            Stmt::Block(stmts) if stmts.is_empty() => write!(f, "(block)"),
            Stmt::Block(stmts) => write!(f, "(block {})", stmts.iter().join(" ")),
            Stmt::If { condition, then_branch, else_branch } => {
                write!(f, "(if {} {}", condition, then_branch)?;
                if let Some(else_branch) = else_branch {
                    write!(f, " {}", else_branch)?;
                }
                write!(f, ")")
            }
            Stmt::While { condition, body } => write!(f, "(while {} {})", condition, body),
            Stmt::For(for_loop) => {
                write!(f, "(for")?;
                optional(f, for_loop.initializer())?;
                optional(f, for_loop.condition())?;
                optional(f, for_loop.increment())?;
                write!(f, " {})", for_loop.body())
            }
            Stmt::Function(decl) => write!(f, "{}", decl),
            Stmt::Return { value: Some(value), .. } => write!(f, "(return {})", value),
            Stmt::Return { value: None, .. } => write!(f, "(return)"),
        }
    }
}

impl Display for FunctionDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "(fun {} ({})", self.name, self.params.iter().join(" "))?;
        for stmt in &self.body {
            write!(f, " {}", stmt)?;
        }
        write!(f, ")")
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.statements.iter().join("\n"))
    }
}
