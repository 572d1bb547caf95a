use std::fmt::Display;

use cursor::Line;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub data: TokenData,
    pub lexeme: String,
    pub line: Line,
}

impl Token {
    pub fn new(data: TokenData, lexeme: impl Into<String>, line: Line) -> Token {
        Self { data, lexeme: lexeme.into(), line }
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn line(&self) -> Line {
        self.line
    }

    pub fn is_eof(&self) -> bool {
        self.data == TokenData::Eof
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lexeme())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenData {
    // Single-character tokens.
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // One or two character tokens.
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals.
    Identifier,
    Str(String),
    Number(f64),

    // Keywords.
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,
    Eof,
}

/// The reserved words. An identifier whose lexeme parses as a `Keyword` is a keyword token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
    And,
    Class,
    Else,
    False,
    For,
    Fun,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,
}

impl From<Keyword> for TokenData {
    fn from(keyword: Keyword) -> Self {
        match keyword {
            Keyword::And => TokenData::And,
            Keyword::Class => TokenData::Class,
            Keyword::Else => TokenData::Else,
            Keyword::False => TokenData::False,
            Keyword::For => TokenData::For,
            Keyword::Fun => TokenData::Fun,
            Keyword::If => TokenData::If,
            Keyword::Nil => TokenData::Nil,
            Keyword::Or => TokenData::Or,
            Keyword::Print => TokenData::Print,
            Keyword::Return => TokenData::Return,
            Keyword::Super => TokenData::Super,
            Keyword::This => TokenData::This,
            Keyword::True => TokenData::True,
            Keyword::Var => TokenData::Var,
            Keyword::While => TokenData::While,
        }
    }
}
