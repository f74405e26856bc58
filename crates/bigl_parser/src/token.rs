use std::fmt;

#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Token {
    // Operators
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Bang,

    EqualEqual,
    BangEqual,
    LessThan,
    GreaterThan,

    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,

    // Delimiters
    Comma,
    Semicolon,
    Colon,

    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,

    // Identifiers & Literals
    // Numbers keep their source text; the parser turns them into values.
    Identifier(String),
    Integer(String),
    Float(String),
    String(String),

    // Keywords
    Fn,
    Let,
    True,
    False,
    If,
    Else,
    Return,
    For,
    In,
    While,
    Break,

    // Special
    /// A `//` line comment, without the slashes
    Comment(String),
    Illegal(char),
    Eof,
}

impl Token {
    /// Get the Token for the given keyword, if valid.
    pub fn lookup_keyword(s: &str) -> Option<Token> {
        use Token::*;

        match s {
            "fn" => Some(Fn),
            "let" => Some(Let),
            "true" => Some(True),
            "false" => Some(False),
            "if" => Some(If),
            "else" => Some(Else),
            "return" => Some(Return),
            "for" => Some(For),
            "in" => Some(In),
            "while" => Some(While),
            "break" => Some(Break),
            _ => None,
        }
    }

    /// Binding power of the token when it appears in infix position.
    pub fn precedence(&self) -> Precedence {
        use Token::*;

        match self {
            EqualEqual | BangEqual => Precedence::Equals,
            LessThan | GreaterThan => Precedence::LessGreater,
            Plus | Minus => Precedence::Sum,
            Star | Slash => Precedence::Product,
            LeftParen => Precedence::Call,
            LeftBracket => Precedence::Index,
            _ => Precedence::Lowest,
        }
    }
}

/// Operator precedences, from loosest to tightest binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    /// `==` and `!=`
    Equals,
    /// `<` and `>`
    LessGreater,
    /// `+` and `-`
    Sum,
    /// `*` and `/`
    Product,
    /// `-x` and `!x`
    Prefix,
    /// `f(x)`
    Call,
    /// `xs[i]`
    Index,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Token::*;

        match self {
            Assign => write!(f, "="),
            Plus => write!(f, "+"),
            Minus => write!(f, "-"),
            Star => write!(f, "*"),
            Slash => write!(f, "/"),
            Bang => write!(f, "!"),

            EqualEqual => write!(f, "=="),
            BangEqual => write!(f, "!="),
            LessThan => write!(f, "<"),
            GreaterThan => write!(f, ">"),

            PlusEqual => write!(f, "+="),
            MinusEqual => write!(f, "-="),
            StarEqual => write!(f, "*="),
            SlashEqual => write!(f, "/="),

            Comma => write!(f, ","),
            Semicolon => write!(f, ";"),
            Colon => write!(f, ":"),

            LeftParen => write!(f, "("),
            RightParen => write!(f, ")"),
            LeftBrace => write!(f, "{{"),
            RightBrace => write!(f, "}}"),
            LeftBracket => write!(f, "["),
            RightBracket => write!(f, "]"),

            Identifier(name) => write!(f, "{}", name),
            Integer(literal) | Float(literal) => write!(f, "{}", literal),
            String(value) => write!(f, "\"{}\"", value),

            Fn => write!(f, "fn"),
            Let => write!(f, "let"),
            True => write!(f, "true"),
            False => write!(f, "false"),
            If => write!(f, "if"),
            Else => write!(f, "else"),
            Return => write!(f, "return"),
            For => write!(f, "for"),
            In => write!(f, "in"),
            While => write!(f, "while"),
            Break => write!(f, "break"),

            Comment(text) => write!(f, "//{}", text),
            Illegal(ch) => write!(f, "{}", ch),
            Eof => write!(f, "EOF"),
        }
    }
}
