use std::iter::{FusedIterator, Peekable};
use std::str::Chars;

use crate::span::{Position, Span, WithSpan};
use crate::token::Token;

/// Turns source text into tokens, one at a time.
///
/// Scanning never fails: characters the language does not know become
/// [`Token::Illegal`] and are left for the parser to report. Once the input
/// is exhausted every call to [`Lexer::next_token`] returns [`Token::Eof`].
pub struct Lexer<'a> {
    input_iter: Peekable<Chars<'a>>,
    current_position: Position,
    exhausted: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        Lexer {
            input_iter: input.chars().peekable(),
            current_position: Position::default(),
            exhausted: false,
        }
    }

    /// Consume the next character from the list.
    fn read_char(&mut self) -> Option<char> {
        let next = self.input_iter.next();
        if let Some(c) = next {
            self.current_position = self.current_position.shift(c);
        }
        next
    }

    /// Get the next character from the list without consuming it.
    fn peek_char(&mut self) -> Option<&char> {
        self.input_iter.peek()
    }

    /// Consume the next character only if it is `expected`.
    fn next_is(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(&expected) {
            self.read_char();
            true
        } else {
            false
        }
    }

    /// Consume whitespace until a non-whitespace character is found.
    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.peek_char() {
            if c.is_whitespace() {
                self.read_char();
            } else {
                break;
            }
        }
    }

    /// Read a string literal up to the closing quote (or the end of input).
    /// There are no escape sequences.
    fn read_string(&mut self) -> Token {
        let mut value = String::new();

        while let Some(ch) = self.read_char() {
            if ch == '"' {
                break;
            }
            value.push(ch);
        }

        Token::String(value)
    }

    /// Read the rest of the line after `//`.
    fn read_comment(&mut self) -> Token {
        let mut text = String::new();

        while let Some(&ch) = self.peek_char() {
            if ch == '\n' {
                break;
            }
            text.push(ch);
            self.read_char();
        }

        Token::Comment(text)
    }

    /// Read the current and following characters as a number token.
    fn read_number(&mut self, first: char) -> Token {
        let mut seen_dot = false;
        let mut literal = String::new();
        literal.push(first);

        while let Some(&ch) = self.peek_char() {
            if is_digit(ch) {
                literal.push(ch);
                self.read_char();
            }
            // Only one decimal point per literal
            else if ch == '.' && !seen_dot {
                seen_dot = true;
                literal.push(ch);
                self.read_char();
            } else {
                break;
            }
        }

        if seen_dot {
            Token::Float(literal)
        } else {
            Token::Integer(literal)
        }
    }

    /// Read the current and following characters as an identifier or a keyword (if it exists).
    fn read_identifier_or_keyword(&mut self, first: char) -> Token {
        let mut identifier = String::new();
        identifier.push(first);

        while let Some(&ch) = self.peek_char() {
            if is_identifier_char(ch) {
                identifier.push(ch);
                self.read_char();
            } else {
                break;
            }
        }

        Token::lookup_keyword(&identifier).unwrap_or(Token::Identifier(identifier))
    }

    /// Read a new token from the characters list.
    pub fn next_token(&mut self) -> WithSpan<Token> {
        self.skip_whitespace();

        let initial_position = self.current_position;

        let token = match self.read_char() {
            Some(c) => match c {
                '=' if self.next_is('=') => Token::EqualEqual,
                '=' => Token::Assign,
                '+' if self.next_is('=') => Token::PlusEqual,
                '+' => Token::Plus,
                '-' if self.next_is('=') => Token::MinusEqual,
                '-' => Token::Minus,
                '*' if self.next_is('=') => Token::StarEqual,
                '*' => Token::Star,
                '!' if self.next_is('=') => Token::BangEqual,
                '!' => Token::Bang,
                '/' if self.next_is('/') => self.read_comment(),
                '/' if self.next_is('=') => Token::SlashEqual,
                '/' => Token::Slash,
                '<' => Token::LessThan,
                '>' => Token::GreaterThan,

                ',' => Token::Comma,
                ';' => Token::Semicolon,
                ':' => Token::Colon,

                '(' => Token::LeftParen,
                ')' => Token::RightParen,
                '{' => Token::LeftBrace,
                '}' => Token::RightBrace,
                '[' => Token::LeftBracket,
                ']' => Token::RightBracket,

                '"' => self.read_string(),

                c if is_digit(c) => self.read_number(c),
                c if is_identifier_char(c) => self.read_identifier_or_keyword(c),

                c => Token::Illegal(c),
            },
            None => Token::Eof,
        };

        let span = Span::new(initial_position, self.current_position);

        WithSpan::new(token, span)
    }
}

/// Yields every token up to, but not including, [`Token::Eof`].
impl<'a> Iterator for Lexer<'a> {
    type Item = WithSpan<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let token = self.next_token();
        if token.value == Token::Eof {
            self.exhausted = true;
            None
        } else {
            Some(token)
        }
    }
}

impl<'a> FusedIterator for Lexer<'a> {}

/// Whether or not the given character is a digit
fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Whether or not the given character is valid in an identifier
fn is_identifier_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}
