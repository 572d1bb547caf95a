use std::fmt::Formatter;

/// 1-based source line, used for every diagnostic the pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub struct Line(pub usize);

impl Default for Line {
    fn default() -> Self {
        Line(1)
    }
}

/// A position inside a source string that knows which line it is on.
///
/// Cloning a cursor is cheap, which is how the scanner remembers where the
/// current lexeme started.
#[derive(Clone)]
pub struct Cursor<'a> {
    source: &'a str,
    offset: usize,
    line: Line,
}

impl<'a> std::fmt::Debug for Cursor<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // The source is usually too verbose, only print it on {:#?}
        if f.alternate() {
            f.debug_struct("Cursor")
                .field("line", &self.line)
                .field("offset", &self.offset)
                .field("source", &self.source)
                .finish()
        } else {
            f.debug_struct("Cursor").field("line", &self.line).field("offset", &self.offset).finish()
        }
    }
}

impl<'a> PartialEq for Cursor<'a> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.source, other.source) && self.offset == other.offset
    }
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, offset: 0, line: Line::default() }
    }

    pub fn line(&self) -> Line {
        self.line
    }

    fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn peek_next(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    /// Consumes the next char only if it is `expected`.
    pub fn advance_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.next();
            true
        } else {
            false
        }
    }

    /// Consumes chars as long as `predicate` holds, stopping before the first one that doesn't.
    pub fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.next();
        }
    }

    /// The source text between `start` and this cursor.
    pub fn slice_from(&self, start: &Cursor<'a>) -> &'a str {
        assert!(std::ptr::eq(self.source, start.source));
        assert!(start.offset <= self.offset);
        &self.source[start.offset..self.offset]
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line.0 += 1;
        }
        Some(c)
    }
}
