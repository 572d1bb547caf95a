use cursor::Cursor;
use errors::{Location, RloxError, RloxErrors};

pub mod token;
pub use token::{Keyword, Token, TokenData};
use TokenData::*;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error("Unexpected character.")]
    UnexpectedCharacter(char),
    #[error("Unterminated string.")]
    UnterminatedString,
}

pub struct Scanner<'a> {
    start: Cursor<'a>,
    current: Cursor<'a>,
    tokens: Vec<Token>,
    errors: RloxErrors,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        let cursor = Cursor::new(source);
        Self {
            start: cursor.clone(),
            current: cursor,
            tokens: Vec::new(),
            errors: RloxErrors::default(),
        }
    }

    /// Scans the whole source. Scanning never stops at an error, so the
    /// token stream (always ending in `Eof`) is usable even if errors are returned.
    pub fn scan_tokens(mut self) -> (Vec<Token>, RloxErrors) {
        while let Some(c) = self.current.next() {
            if let Err(e) = self.scan_token(c) {
                log::trace!("Scan error on line {}: {:?}", self.current.line(), e);
                self.errors.push(RloxError::new(
                    self.current.line(),
                    Location::Unspecified,
                    e.to_string(),
                ));
            }
            self.start = self.current.clone();
        }

        self.tokens.push(Token::new(Eof, "", self.current.line()));
        (self.tokens, self.errors)
    }

    fn scan_token(&mut self, c: char) -> Result<(), ScanError> {
        match c {
            '(' => self.add_token(LeftParen),
            ')' => self.add_token(RightParen),
            '{' => self.add_token(LeftBrace),
            '}' => self.add_token(RightBrace),
            ',' => self.add_token(Comma),
            '.' => self.add_token(Dot),
            '-' => self.add_token(Minus),
            '+' => self.add_token(Plus),
            ';' => self.add_token(Semicolon),
            '*' => self.add_token(Star),

            '!' => {
                let data = if self.current.advance_if('=') { BangEqual } else { Bang };
                self.add_token(data)
            }
            '=' => {
                let data = if self.current.advance_if('=') { EqualEqual } else { Equal };
                self.add_token(data)
            }
            '<' => {
                let data = if self.current.advance_if('=') { LessEqual } else { Less };
                self.add_token(data)
            }
            '>' => {
                let data = if self.current.advance_if('=') { GreaterEqual } else { Greater };
                self.add_token(data)
            }

            '/' => {
                if self.current.advance_if('/') {
                    // Comment, the newline itself is left for the main loop
                    self.current.advance_while(|c| c != '\n');
                } else {
                    self.add_token(Slash)
                }
            }

            ' ' | '\r' | '\t' | '\n' => (),

            '"' => return self.string(),

            d if d.is_ascii_digit() => self.number(),

            c if is_alpha(c) => self.identifier(),

            c => return Err(ScanError::UnexpectedCharacter(c)),
        }
        Ok(())
    }

    fn lexeme(&self) -> &'a str {
        self.current.slice_from(&self.start)
    }

    fn add_token(&mut self, data: TokenData) {
        // Attribute multi-line tokens (strings) to the line they end on.
        let token = Token::new(data, self.lexeme(), self.current.line());
        log::trace!("Scanned token: {:?}", token);
        self.tokens.push(token);
    }

    fn string(&mut self) -> Result<(), ScanError> {
        self.current.advance_while(|c| c != '"');

        if !self.current.advance_if('"') {
            return Err(ScanError::UnterminatedString);
        }

        let lexeme = self.lexeme();
        let value = lexeme[1..lexeme.len() - 1].to_string();
        self.add_token(Str(value));
        Ok(())
    }

    fn number(&mut self) {
        self.current.advance_while(|c| c.is_ascii_digit());

        if self.current.peek() == Some('.')
            && self.current.peek_next().map_or(false, |c| c.is_ascii_digit())
        {
            self.current.next(); // '.'
            self.current.advance_while(|c| c.is_ascii_digit());
        }

        match self.lexeme().parse() {
            Ok(n) => self.add_token(Number(n)),
            Err(_) => unreachable!("Digits with an optional fraction always parse as f64"),
        }
    }

    fn identifier(&mut self) {
        self.current.advance_while(is_alphanumeric);

        let data = match self.lexeme().parse::<Keyword>() {
            Ok(keyword) => keyword.into(),
            Err(_) => Identifier,
        };
        self.add_token(data)
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_alphanumeric(c: char) -> bool {
    is_alpha(c) || c.is_ascii_digit()
}

pub fn scan(source: &str) -> (Vec<Token>, RloxErrors) {
    Scanner::new(source).scan_tokens()
}
