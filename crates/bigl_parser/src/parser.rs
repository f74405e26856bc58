use std::rc::Rc;

use log::{debug, trace};
use thiserror::Error;

use crate::ast::{
    ArrayLiteral, AssignOperator, BlockStatement, CallExpression, Expression, ForExpression,
    FunctionLiteral, HashLiteral, IfExpression, IndexExpression, InfixExpression,
    PrefixExpression, Program, Statement, WhileExpression,
};
use crate::lexer::Lexer;
use crate::span::{Span, WithSpan};
use crate::token::{Precedence, Token};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected next token to be {expected}, got {got} instead {}", .span.at_str())]
    Expected {
        expected: String,
        got: Token,
        span: Span,
    },
    #[error("no prefix parse function for {token} found {}", .span.at_str())]
    NoPrefixParseFn { token: Token, span: Span },
    #[error("illegal character '{character}' {}", .span.at_str())]
    Illegal { character: char, span: Span },
    #[error("could not parse {literal} as integer {}", .span.at_str())]
    InvalidInteger { literal: String, span: Span },
    #[error("could not parse {literal} as float {}", .span.at_str())]
    InvalidFloat { literal: String, span: Span },
    #[error("invalid assignment target {target} {}", .span.at_str())]
    InvalidAssignmentTarget { target: String, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Expected { span, .. }
            | ParseError::NoPrefixParseFn { span, .. }
            | ParseError::Illegal { span, .. }
            | ParseError::InvalidInteger { span, .. }
            | ParseError::InvalidFloat { span, .. }
            | ParseError::InvalidAssignmentTarget { span, .. } => *span,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

type PrefixParseFn<'a> = fn(&mut Parser<'a>) -> ParseResult<Expression>;
type InfixParseFn<'a> = fn(&mut Parser<'a>, Expression) -> ParseResult<Expression>;

/// A Pratt parser over the token stream of a [`Lexer`].
///
/// Errors do not stop parsing: the failing statement is recorded and skipped,
/// and [`Parser::parse_program`] reports every error it collected.
pub struct Parser<'a> {
    lexer: Lexer<'a>,

    current: WithSpan<Token>,
    peek: WithSpan<Token>,

    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Parser<'a> {
        let mut parser = Parser {
            lexer,
            current: WithSpan::new(Token::Eof, Span::default()),
            peek: WithSpan::new(Token::Eof, Span::default()),
            errors: Vec::new(),
        };

        // Fill both current and peek
        parser.next_token();
        parser.next_token();

        parser
    }

    pub fn parse_program(&mut self) -> Result<Program, Vec<ParseError>> {
        let mut program = Program::new();

        while !self.current_token_is(&Token::Eof) {
            match self.parse_statement() {
                Ok(statement) => {
                    trace!("parsed statement {}", statement);
                    program.statements.push(statement);
                }
                Err(error) => {
                    self.record(error);
                    self.synchronize(false);
                }
            }
            self.next_token();
        }

        if self.errors.is_empty() {
            Ok(program)
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }

    fn record(&mut self, error: ParseError) {
        debug!("parse error: {}", error);
        self.errors.push(error);
    }

    /// Skip the rest of a failed statement. Stops on its `;`, at the end of
    /// input, or (inside a block) just before the closing `}`.
    fn synchronize(&mut self, in_block: bool) {
        loop {
            match (&self.current.value, &self.peek.value) {
                (Token::Semicolon, _) | (Token::Eof, _) | (_, Token::Eof) => return,
                (Token::RightBrace, _) | (_, Token::RightBrace) if in_block => return,
                _ => self.next_token(),
            }
        }
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current.value {
            Token::Let => self.parse_let_statement(),
            Token::Return => self.parse_return_statement(),
            Token::Break => self.parse_break_statement(),
            Token::Identifier(_) => self.parse_assign_or_expression_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> ParseResult<Statement> {
        let name = self.expect_peek_identifier()?;

        self.expect_peek(Token::Assign)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Ok(Statement::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> ParseResult<Statement> {
        if self.peek_token_is(&Token::Semicolon)
            || self.peek_token_is(&Token::RightBrace)
            || self.peek_token_is(&Token::Eof)
        {
            self.skip_semicolon();
            return Ok(Statement::Return { value: None });
        }

        // Consume the `return` token
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Ok(Statement::Return { value: Some(value) })
    }

    fn parse_break_statement(&mut self) -> ParseResult<Statement> {
        self.skip_semicolon();
        Ok(Statement::Break)
    }

    /// An identifier-led statement: `x = 1`, `xs[0] += 2`, or an expression.
    fn parse_assign_or_expression_statement(&mut self) -> ParseResult<Statement> {
        let span = self.current.span;
        let target = self.parse_expression(Precedence::Lowest)?;

        let operator = match AssignOperator::from_token(&self.peek.value) {
            Some(operator) => operator,
            None => {
                self.skip_semicolon();
                return Ok(Statement::Expression { expression: target });
            }
        };

        if !matches!(target, Expression::Identifier(_) | Expression::Index(_)) {
            return Err(ParseError::InvalidAssignmentTarget {
                target: target.to_string(),
                span,
            });
        }

        // Move onto the operator, then past it
        self.next_token();
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Ok(Statement::Assign {
            target,
            operator,
            value,
        })
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Ok(Statement::Expression { expression })
    }

    fn parse_expression(&mut self, precedence: Precedence) -> ParseResult<Expression> {
        let prefix = match Self::prefix_parse_fn(&self.current.value) {
            Some(prefix) => prefix,
            None => return Err(self.no_prefix_parse_fn_error()),
        };

        let mut left = prefix(self)?;

        while !self.peek_token_is(&Token::Semicolon) && precedence < self.peek.value.precedence() {
            let infix = match Self::infix_parse_fn(&self.peek.value) {
                Some(infix) => infix,
                None => return Ok(left),
            };

            self.next_token();
            left = infix(self, left)?;
        }

        Ok(left)
    }

    fn prefix_parse_fn(token: &Token) -> Option<PrefixParseFn<'a>> {
        let prefix: PrefixParseFn<'a> = match token {
            Token::Identifier(_) => Self::parse_identifier,
            Token::Integer(_) => Self::parse_integer_literal,
            Token::Float(_) => Self::parse_float_literal,
            Token::String(_) => Self::parse_string_literal,
            Token::True | Token::False => Self::parse_boolean,
            Token::Bang | Token::Minus => Self::parse_prefix_expression,
            Token::LeftParen => Self::parse_grouped_expression,
            Token::If => Self::parse_if_expression,
            Token::For => Self::parse_for_expression,
            Token::While => Self::parse_while_expression,
            Token::Fn => Self::parse_function_literal,
            Token::LeftBracket => Self::parse_array_literal,
            Token::LeftBrace => Self::parse_hash_literal,
            _ => return None,
        };

        Some(prefix)
    }

    fn infix_parse_fn(token: &Token) -> Option<InfixParseFn<'a>> {
        let infix: InfixParseFn<'a> = match token {
            Token::Plus
            | Token::Minus
            | Token::Star
            | Token::Slash
            | Token::EqualEqual
            | Token::BangEqual
            | Token::LessThan
            | Token::GreaterThan => Self::parse_infix_expression,
            Token::LeftParen => Self::parse_call_expression,
            Token::LeftBracket => Self::parse_index_expression,
            _ => return None,
        };

        Some(infix)
    }

    fn no_prefix_parse_fn_error(&self) -> ParseError {
        match self.current.value {
            Token::Illegal(character) => ParseError::Illegal {
                character,
                span: self.current.span,
            },
            _ => ParseError::NoPrefixParseFn {
                token: self.current.value.clone(),
                span: self.current.span,
            },
        }
    }

    fn parse_identifier(&mut self) -> ParseResult<Expression> {
        match &self.current.value {
            Token::Identifier(name) => Ok(Expression::Identifier(name.clone())),
            other => Err(self.expected_current("identifier", other.clone())),
        }
    }

    fn parse_integer_literal(&mut self) -> ParseResult<Expression> {
        match &self.current.value {
            Token::Integer(literal) => literal.parse::<i64>().map(Expression::Integer).map_err(
                |_| ParseError::InvalidInteger {
                    literal: literal.clone(),
                    span: self.current.span,
                },
            ),
            other => Err(self.expected_current("integer", other.clone())),
        }
    }

    fn parse_float_literal(&mut self) -> ParseResult<Expression> {
        match &self.current.value {
            Token::Float(literal) => literal.parse::<f64>().map(Expression::Float).map_err(|_| {
                ParseError::InvalidFloat {
                    literal: literal.clone(),
                    span: self.current.span,
                }
            }),
            other => Err(self.expected_current("float", other.clone())),
        }
    }

    fn parse_string_literal(&mut self) -> ParseResult<Expression> {
        match &self.current.value {
            Token::String(value) => Ok(Expression::String(value.clone())),
            other => Err(self.expected_current("string", other.clone())),
        }
    }

    fn parse_boolean(&mut self) -> ParseResult<Expression> {
        Ok(Expression::Boolean(self.current_token_is(&Token::True)))
    }

    fn parse_prefix_expression(&mut self) -> ParseResult<Expression> {
        let operator = self.current.value.clone();

        self.next_token();

        let right = self.parse_expression(Precedence::Prefix)?;

        Ok(Expression::Prefix(Box::new(PrefixExpression {
            operator,
            right,
        })))
    }

    fn parse_infix_expression(&mut self, left: Expression) -> ParseResult<Expression> {
        let operator = self.current.value.clone();
        let precedence = operator.precedence();

        self.next_token();

        let right = self.parse_expression(precedence)?;

        Ok(Expression::Infix(Box::new(InfixExpression {
            left,
            operator,
            right,
        })))
    }

    fn parse_grouped_expression(&mut self) -> ParseResult<Expression> {
        self.next_token();

        let expression = self.parse_expression(Precedence::Lowest)?;

        self.expect_peek(Token::RightParen)?;

        Ok(expression)
    }

    /// Parse `(condition)` including both parentheses.
    fn parse_condition(&mut self) -> ParseResult<Expression> {
        self.expect_peek(Token::LeftParen)?;
        self.next_token();

        let condition = self.parse_expression(Precedence::Lowest)?;

        self.expect_peek(Token::RightParen)?;

        Ok(condition)
    }

    fn parse_if_expression(&mut self) -> ParseResult<Expression> {
        let condition = self.parse_condition()?;

        self.expect_peek(Token::LeftBrace)?;
        let consequence = self.parse_block_statement();

        let alternative = if self.peek_token_is(&Token::Else) {
            self.next_token();
            self.expect_peek(Token::LeftBrace)?;
            Some(self.parse_block_statement())
        } else {
            None
        };

        Ok(Expression::If(Box::new(IfExpression {
            condition,
            consequence,
            alternative,
        })))
    }

    fn parse_for_expression(&mut self) -> ParseResult<Expression> {
        self.expect_peek(Token::LeftParen)?;
        let variable = self.expect_peek_identifier()?;
        self.expect_peek(Token::In)?;
        self.next_token();

        let iterable = self.parse_expression(Precedence::Lowest)?;

        self.expect_peek(Token::RightParen)?;
        self.expect_peek(Token::LeftBrace)?;
        let body = self.parse_block_statement();

        Ok(Expression::For(Box::new(ForExpression {
            variable,
            iterable,
            body,
        })))
    }

    fn parse_while_expression(&mut self) -> ParseResult<Expression> {
        let condition = self.parse_condition()?;

        self.expect_peek(Token::LeftBrace)?;
        let body = self.parse_block_statement();

        Ok(Expression::While(Box::new(WhileExpression { condition, body })))
    }

    /// Parse statements up to the closing `}` (or the end of input).
    /// Errors inside the block are recorded and skipped, so this never fails.
    fn parse_block_statement(&mut self) -> BlockStatement {
        let mut block = BlockStatement::new();

        // Consume the `{` token
        self.next_token();

        while !self.current_token_is(&Token::RightBrace) && !self.current_token_is(&Token::Eof) {
            match self.parse_statement() {
                Ok(statement) => block.statements.push(statement),
                Err(error) => {
                    self.record(error);
                    self.synchronize(true);

                    if self.current_token_is(&Token::RightBrace) {
                        break;
                    }
                }
            }
            self.next_token();
        }

        block
    }

    fn parse_function_literal(&mut self) -> ParseResult<Expression> {
        self.expect_peek(Token::LeftParen)?;

        let parameters = self.parse_list(Token::RightParen, Self::parse_parameter)?;

        self.expect_peek(Token::LeftBrace)?;
        let body = Rc::new(self.parse_block_statement());

        Ok(Expression::Function(Box::new(FunctionLiteral {
            parameters,
            body,
        })))
    }

    fn parse_parameter(&mut self) -> ParseResult<String> {
        match &self.current.value {
            Token::Identifier(name) => Ok(name.clone()),
            other => Err(self.expected_current("identifier", other.clone())),
        }
    }

    fn parse_call_expression(&mut self, function: Expression) -> ParseResult<Expression> {
        let arguments = self.parse_list(Token::RightParen, |parser| {
            parser.parse_expression(Precedence::Lowest)
        })?;

        Ok(Expression::Call(Box::new(CallExpression {
            function,
            arguments,
        })))
    }

    fn parse_array_literal(&mut self) -> ParseResult<Expression> {
        let elements = self.parse_list(Token::RightBracket, |parser| {
            parser.parse_expression(Precedence::Lowest)
        })?;

        Ok(Expression::Array(Box::new(ArrayLiteral { elements })))
    }

    fn parse_hash_literal(&mut self) -> ParseResult<Expression> {
        let pairs = self.parse_list(Token::RightBrace, Self::parse_hash_pair)?;

        Ok(Expression::Hash(Box::new(HashLiteral { pairs })))
    }

    fn parse_hash_pair(&mut self) -> ParseResult<(Expression, Expression)> {
        let key = self.parse_expression(Precedence::Lowest)?;

        self.expect_peek(Token::Colon)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;

        Ok((key, value))
    }

    fn parse_index_expression(&mut self, left: Expression) -> ParseResult<Expression> {
        self.next_token();

        let index = self.parse_expression(Precedence::Lowest)?;

        self.expect_peek(Token::RightBracket)?;

        Ok(Expression::Index(Box::new(IndexExpression { left, index })))
    }

    /// Parse a comma separated list of items up to the `end` token.
    /// The current token is the one opening the list.
    fn parse_list<T>(
        &mut self,
        end: Token,
        mut parse_item: impl FnMut(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<Vec<T>> {
        let mut items = Vec::new();

        if self.peek_token_is(&end) {
            self.next_token();
            return Ok(items);
        }

        self.next_token();
        items.push(parse_item(self)?);

        while self.peek_token_is(&Token::Comma) {
            self.next_token();
            self.next_token();
            items.push(parse_item(self)?);
        }

        self.expect_peek(end)?;

        Ok(items)
    }

    fn next_token(&mut self) {
        let mut next = self.lexer.next_token();
        while let Token::Comment(_) = next.value {
            next = self.lexer.next_token();
        }

        self.current = std::mem::replace(&mut self.peek, next);
    }

    fn skip_semicolon(&mut self) {
        if self.peek_token_is(&Token::Semicolon) {
            self.next_token();
        }
    }

    fn current_token_is(&self, token: &Token) -> bool {
        &self.current.value == token
    }

    fn peek_token_is(&self, token: &Token) -> bool {
        &self.peek.value == token
    }

    fn expect_peek(&mut self, token: Token) -> ParseResult<()> {
        if self.peek_token_is(&token) {
            self.next_token();
            Ok(())
        } else {
            Err(ParseError::Expected {
                expected: token.to_string(),
                got: self.peek.value.clone(),
                span: self.peek.span,
            })
        }
    }

    fn expect_peek_identifier(&mut self) -> ParseResult<String> {
        let name = match &self.peek.value {
            Token::Identifier(name) => name.clone(),
            other => {
                return Err(ParseError::Expected {
                    expected: String::from("identifier"),
                    got: other.clone(),
                    span: self.peek.span,
                })
            }
        };

        self.next_token();
        Ok(name)
    }

    fn expected_current(&self, expected: &str, got: Token) -> ParseError {
        ParseError::Expected {
            expected: expected.to_owned(),
            got,
            span: self.current.span,
        }
    }
}
