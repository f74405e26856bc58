use std::fmt::Display;

/// A location somewhere in the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Byte offset into the source
    pub offset: usize,
    /// 1-based line number
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

impl Position {
    pub const fn new(offset: usize, line: usize, column: usize) -> Self {
        Position {
            offset,
            line,
            column,
        }
    }

    /// The position right after `ch`
    pub fn shift(self, ch: char) -> Self {
        if ch == '\n' {
            Position::new(self.offset + ch.len_utf8(), self.line + 1, 1)
        } else {
            Position::new(self.offset + ch.len_utf8(), self.line, self.column + 1)
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new(0, 1, 1)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A subsection of the source code
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Starting position (inclusive)
    pub start: Position,
    /// Ending position (exclusive)
    pub end: Position,
}

impl Span {
    pub const fn new(start: Position, end: Position) -> Span {
        Span { start, end }
    }

    /// Convert the given span to the "(at 1:1)" format
    pub fn at_str(&self) -> String {
        format!("(at {})", self.start)
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.start)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithSpan<T> {
    pub value: T,
    pub span: Span,
}

impl<T> WithSpan<T> {
    pub const fn new(value: T, span: Span) -> WithSpan<T> {
        WithSpan { value, span }
    }
}

impl<T> WithSpan<T>
where
    T: Display,
{
    /// Convert the given WithSpan to the "value (at 1:1)" format
    /// See Span::at_str() for detail
    pub fn at_str(&self) -> String {
        format!("{} {}", self.value, self.span.at_str())
    }
}
