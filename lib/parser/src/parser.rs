mod expr;
mod stmt;
use std::rc::Rc;

pub use expr::{Expr, LiteralValue};
pub use stmt::{ForLoop, FunctionDecl, Program, Stmt};

use errors::{Location, RloxError, RloxErrors};
use scanner::{Token, TokenData};

use TokenData::*;

/// Upper bound for both call arguments and function parameters.
pub const MAX_ARGUMENTS: usize = 255;

/// How deeply statements and expressions may nest inside each other.
pub const MAX_NESTING: usize = 1024;

#[derive(Debug)]
pub struct ParserError {
    error: ParserErrorType,
    token: Token,
}

impl From<ParserError> for RloxError {
    fn from(error: ParserError) -> Self {
        let location = if error.token.is_eof() {
            Location::AtEnd
        } else {
            Location::At(error.token.lexeme().to_string())
        };
        RloxError::new(error.token.line(), location, error.error.to_string())
    }
}

impl ParserError {
    fn new(error: ParserErrorType, token: Token) -> Self {
        Self { token, error }
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserErrorType {
    #[error("Expect expression.")]
    ExpectedExpression,
    #[error("Expect ';' after value.")]
    ExpectedSemicolonAfterValue,
    #[error("Expect ';' after expression.")]
    ExpectedSemicolonAfterExpression,
    #[error("Expect variable name.")]
    ExpectedVariableName,
    #[error("Expect ';' after variable declaration.")]
    ExpectedSemicolonAfterVarDeclaration,
    #[error("Expect '(' after 'if'.")]
    ExpectedLeftParenAfterIf,
    #[error("Expect ')' after if condition.")]
    ExpectedRightParenAfterIfCondition,
    #[error("Expect '(' after 'while'.")]
    ExpectedLeftParenAfterWhile,
    #[error("Expect ')' after condition.")]
    ExpectedRightParenAfterCondition,
    #[error("Expect '(' after 'for'.")]
    ExpectedLeftParenAfterFor,
    #[error("Expect ';' after loop condition.")]
    ExpectedSemicolonAfterLoopCondition,
    #[error("Expect ')' after for clauses.")]
    ExpectedRightParenAfterForClauses,
    #[error("Expect '}}' after block.")]
    ExpectedRightBrace,
    #[error("Expect ')' after expression.")]
    ExpectedRightParenAfterExpression,
    #[error("Expect ')' after arguments.")]
    ExpectedRightParenAfterArguments,
    #[error("Invalid assignment target.")]
    InvalidAssignmentTarget,
    #[error("Can't have more than 255 arguments.")]
    TooManyArguments,
    #[error("Can't have more than 255 parameters.")]
    TooManyParameters,
    #[error("Expect function name.")]
    ExpectedFunctionName,
    #[error("Expect '(' after function name.")]
    ExpectedLeftParenAfterFunctionName,
    #[error("Expect parameter name.")]
    ExpectedParameterName,
    #[error("Expect ')' after parameters.")]
    ExpectedRightParenAfterParameters,
    #[error("Expect '{{' before function body.")]
    ExpectedLeftBraceBeforeBody,
    #[error("Expect ';' after return value.")]
    ExpectedSemicolonAfterReturnValue,
    #[error("Can't return from top-level code.")]
    TopLevelReturn,
    #[error("Too much nesting.")]
    TooMuchNesting,
}

type Result<T> = std::result::Result<T, ParserError>;

#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: RloxErrors,
    function_depth: usize,
    nesting: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().map_or(false, Token::is_eof) {
            let line = tokens.last().map(Token::line).unwrap_or_default();
            tokens.push(Token::new(Eof, "", line));
        }
        Self { tokens, current: 0, errors: RloxErrors::default(), function_depth: 0, nesting: 0 }
    }

    pub fn parse(self) -> std::result::Result<Program, RloxErrors> {
        let (program, errors) = self.parse_partial();
        if errors.is_empty() {
            Ok(program)
        } else {
            Err(errors)
        }
    }

    /// Parses as much as possible. Every failing declaration is skipped and
    /// recorded, so the returned program only holds the ones that parsed.
    pub fn parse_partial(mut self) -> (Program, RloxErrors) {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => {
                    log::trace!("Parsed declaration: {}", stmt);
                    statements.push(stmt)
                }
                Err(e) => self.recover(e),
            }
        }

        (Program { statements }, self.errors)
    }

    fn declaration(&mut self) -> Result<Stmt> {
        if self.consume(Fun).is_some() {
            return self.function();
        }

        if self.consume(Var).is_some() {
            return self.var_declaration();
        }

        self.statement()
    }

    fn function(&mut self) -> Result<Stmt> {
        let name = self.consume_or_error(Identifier, ParserErrorType::ExpectedFunctionName)?;
        self.consume_or_error(LeftParen, ParserErrorType::ExpectedLeftParenAfterFunctionName)?;

        let mut params = Vec::new();
        if !self.check(&RightParen) {
            loop {
                if params.len() >= MAX_ARGUMENTS {
                    self.report(ParserError::new(
                        ParserErrorType::TooManyParameters,
                        self.peek().clone(),
                    ));
                }
                params.push(
                    self.consume_or_error(Identifier, ParserErrorType::ExpectedParameterName)?,
                );
                if self.consume(Comma).is_none() {
                    break;
                }
            }
        }
        self.consume_or_error(RightParen, ParserErrorType::ExpectedRightParenAfterParameters)?;
        self.consume_or_error(LeftBrace, ParserErrorType::ExpectedLeftBraceBeforeBody)?;

        self.function_depth += 1;
        let body = self.nested(Self::block);
        self.function_depth -= 1;

        log::debug!("Parsed function {} with {} parameter(s)", name, params.len());
        Ok(Stmt::Function(Rc::new(FunctionDecl { name, params, body: body? })))
    }

    fn var_declaration(&mut self) -> Result<Stmt> {
        let name = self.consume_or_error(Identifier, ParserErrorType::ExpectedVariableName)?;

        let initializer = match self.consume(Equal) {
            Some(_) => Some(self.expression()?),
            None => None,
        };

        self.consume_or_error(Semicolon, ParserErrorType::ExpectedSemicolonAfterVarDeclaration)?;

        Ok(Stmt::Var { name, initializer })
    }

    fn statement(&mut self) -> Result<Stmt> {
        self.nested(Self::parse_statement)
    }

    fn parse_statement(&mut self) -> Result<Stmt> {
        if self.consume(For).is_some() {
            return self.for_statement();
        }

        if self.consume(If).is_some() {
            return self.if_statement();
        }

        if let Some(keyword) = self.consume(Print) {
            return self.print_statement(keyword);
        }

        if let Some(keyword) = self.consume(Return) {
            return self.return_statement(keyword);
        }

        if self.consume(While).is_some() {
            return self.while_statement();
        }

        if self.consume(LeftBrace).is_some() {
            return Ok(Stmt::Block(self.block()?));
        }

        self.expression_statement()
    }

    fn for_statement(&mut self) -> Result<Stmt> {
        self.consume_or_error(LeftParen, ParserErrorType::ExpectedLeftParenAfterFor)?;

        let initializer = if self.consume(Semicolon).is_some() {
            None
        } else if self.consume(Var).is_some() {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if self.check(&Semicolon) { None } else { Some(self.expression()?) };
        self.consume_or_error(Semicolon, ParserErrorType::ExpectedSemicolonAfterLoopCondition)?;

        let increment = if self.check(&RightParen) { None } else { Some(self.expression()?) };
        self.consume_or_error(RightParen, ParserErrorType::ExpectedRightParenAfterForClauses)?;

        let body = self.statement()?;

        Ok(Stmt::For(ForLoop::new(initializer, condition, increment, body)))
    }

    fn while_statement(&mut self) -> Result<Stmt> {
        self.consume_or_error(LeftParen, ParserErrorType::ExpectedLeftParenAfterWhile)?;
        let condition = self.expression()?;
        self.consume_or_error(RightParen, ParserErrorType::ExpectedRightParenAfterCondition)?;

        let body = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    fn if_statement(&mut self) -> Result<Stmt> {
        self.consume_or_error(LeftParen, ParserErrorType::ExpectedLeftParenAfterIf)?;
        let condition = self.expression()?;
        self.consume_or_error(RightParen, ParserErrorType::ExpectedRightParenAfterIfCondition)?;

        let then_branch = Box::new(self.statement()?);

        // Binds to the nearest `if`, since the inner statement() call consumes it first.
        let else_branch = match self.consume(Else) {
            Some(_) => Some(Box::new(self.statement()?)),
            None => None,
        };

        Ok(Stmt::If { condition, then_branch, else_branch })
    }

    /// Parses the declarations up to and including the closing `}`. Errors
    /// inside the block are recovered from here so the rest of the block is still checked.
    fn block(&mut self) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();

        while !self.check(&RightBrace) && !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => stmts.push(stmt),
                // Every enclosing block is just as deep, only the top level can recover.
                Err(e) if e.error == ParserErrorType::TooMuchNesting => return Err(e),
                Err(e) => self.recover(e),
            }
        }

        self.consume_or_error(RightBrace, ParserErrorType::ExpectedRightBrace)?;
        Ok(stmts)
    }

    fn print_statement(&mut self, keyword: Token) -> Result<Stmt> {
        let expr = self.expression()?;

        self.consume_or_error(Semicolon, ParserErrorType::ExpectedSemicolonAfterValue)?;

        Ok(Stmt::Print { keyword, expr })
    }

    fn return_statement(&mut self, keyword: Token) -> Result<Stmt> {
        let value = if self.check(&Semicolon) { None } else { Some(self.expression()?) };

        self.consume_or_error(Semicolon, ParserErrorType::ExpectedSemicolonAfterReturnValue)?;

        if self.function_depth == 0 {
            self.report(ParserError::new(ParserErrorType::TopLevelReturn, keyword.clone()));
        }

        Ok(Stmt::Return { keyword, value })
    }

    fn expression_statement(&mut self) -> Result<Stmt> {
        let value = self.expression()?;

        self.consume_or_error(Semicolon, ParserErrorType::ExpectedSemicolonAfterExpression)?;

        Ok(Stmt::Expression(value))
    }

    fn expression(&mut self) -> Result<Expr> {
        self.nested(Self::assignment)
    }

    fn assignment(&mut self) -> Result<Expr> {
        let expr = self.or()?;

        if let Some(equal) = self.consume(Equal) {
            let value = Box::new(self.nested(Self::assignment)?);

            if let Expr::Variable(name) = expr {
                return Ok(Expr::Assign { name, value });
            }

            return Err(ParserError::new(ParserErrorType::InvalidAssignmentTarget, equal));
        }

        Ok(expr)
    }

    fn or(&mut self) -> Result<Expr> {
        let mut expr = self.and()?;

        while let Some(operator) = self.consume(Or) {
            let right = Box::new(self.and()?);
            expr = Expr::Logical { left: Box::new(expr), operator, right };
        }

        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr> {
        let mut expr = self.equality()?;

        while let Some(operator) = self.consume(And) {
            let right = Box::new(self.equality()?);
            expr = Expr::Logical { left: Box::new(expr), operator, right };
        }

        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr> {
        let mut expr = self.comparison()?;

        while let BangEqual | EqualEqual = self.peek().data {
            let operator = self.advance();
            let right = Box::new(self.comparison()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr> {
        let mut expr = self.term()?;

        while let Greater | GreaterEqual | Less | LessEqual = self.peek().data {
            let operator = self.advance();
            let right = Box::new(self.term()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr> {
        let mut expr = self.factor()?;

        while let Plus | Minus = self.peek().data {
            let operator = self.advance();
            let right = Box::new(self.factor()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr> {
        let mut expr = self.unary()?;

        while let Star | Slash = self.peek().data {
            let operator = self.advance();
            let right = Box::new(self.unary()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        if let Minus | Bang = self.peek().data {
            let operator = self.advance();
            let right = Box::new(self.nested(Self::unary)?);
            return Ok(Expr::Unary { operator, right });
        }
        self.call()
    }

    fn call(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;

        while self.consume(LeftParen).is_some() {
            expr = self.finish_call(expr)?;
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr> {
        let mut arguments = Vec::new();

        if !self.check(&RightParen) {
            loop {
                if arguments.len() >= MAX_ARGUMENTS {
                    self.report(ParserError::new(
                        ParserErrorType::TooManyArguments,
                        self.peek().clone(),
                    ));
                }
                arguments.push(self.expression()?);

                if self.consume(Comma).is_none() {
                    break;
                }
            }
        }

        let closing_paren =
            self.consume_or_error(RightParen, ParserErrorType::ExpectedRightParenAfterArguments)?;

        Ok(Expr::Call { callee: Box::new(callee), closing_paren, arguments })
    }

    fn primary(&mut self) -> Result<Expr> {
        let literal = match &self.peek().data {
            False => LiteralValue::Boolean(false),
            True => LiteralValue::Boolean(true),
            Nil => LiteralValue::Nil,
            Str(s) => LiteralValue::Str(s.clone()),
            Number(n) => LiteralValue::Number(*n),
            LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume_or_error(
                    RightParen,
                    ParserErrorType::ExpectedRightParenAfterExpression,
                )?;
                return Ok(Expr::Grouping(Box::new(expr)));
            }
            Identifier => return Ok(Expr::Variable(self.advance())),
            _ => {
                return Err(ParserError::new(
                    ParserErrorType::ExpectedExpression,
                    self.peek().clone(),
                ))
            }
        };
        self.advance();
        Ok(Expr::Literal(literal))
    }

    /// Runs one level of recursive descent, failing once `MAX_NESTING` levels are open.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.nesting >= MAX_NESTING {
            return Err(ParserError::new(ParserErrorType::TooMuchNesting, self.peek().clone()));
        }

        self.nesting += 1;
        let result = stack::ensure_sufficient_stack(|| parse(self));
        self.nesting -= 1;
        result
    }

    fn report(&mut self, error: ParserError) {
        self.errors.push(error.into());
    }

    fn recover(&mut self, error: ParserError) {
        log::debug!("Hit error: {:?}, syncing...", error);
        self.report(error);
        self.synchronize();
    }

    /// Skips tokens until the start of what is probably the next statement.
    fn synchronize(&mut self) {
        while !self.is_at_end() {
            if self.advance().data == Semicolon {
                return;
            }

            match self.peek().data {
                Class | Fun | Var | For | If | While | Print | Return => return,
                _ => log::trace!("Syncing... {:?}", self.peek()),
            }
        }
    }
}

// Helpers
impl Parser {
    fn peek(&self) -> &Token {
        // `new` guarantees a trailing Eof and `advance` never moves past it.
        &self.tokens[self.current]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn check(&self, data: &TokenData) -> bool {
        debug_assert!(!matches!(data, Number(_) | Str(_)));
        self.peek().data == *data
    }

    fn consume(&mut self, data: TokenData) -> Option<Token> {
        self.check(&data).then(|| self.advance())
    }

    fn consume_or_error(&mut self, data: TokenData, error_type: ParserErrorType) -> Result<Token> {
        match self.consume(data) {
            Some(token) => Ok(token),
            None => Err(ParserError::new(error_type, self.peek().clone())),
        }
    }

    fn is_at_end(&self) -> bool {
        self.peek().is_eof()
    }
}
