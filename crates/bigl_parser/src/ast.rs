use crate::token::Token;
use std::{fmt::Display, rc::Rc};

#[derive(Debug, Default, PartialEq, Clone)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new() -> Program {
        Program {
            statements: Vec::new(),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", join(&self.statements, "; "))
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Let {
        /// The name/identifier of the variable
        name: String,
        /// The value being bound
        value: Expression,
    },
    Assign {
        /// Either an identifier or an index expression
        target: Expression,
        operator: AssignOperator,
        value: Expression,
    },
    Return {
        /// `None` for a bare `return;`
        value: Option<Expression>,
    },
    Break,
    Expression {
        /// The expression for this statement
        expression: Expression,
    },
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Statement::*;

        match self {
            Let { name, value } => write!(
                f,
                "{tok} {ident} = {val}",
                tok = Token::Let,
                ident = name,
                val = value
            ),
            Assign {
                target,
                operator,
                value,
            } => write!(f, "{} {} {}", target, operator, value),
            Return { value: Some(value) } => write!(f, "{} {}", Token::Return, value),
            Return { value: None } => write!(f, "{}", Token::Return),
            Break => write!(f, "{}", Token::Break),
            Expression { expression } => write!(f, "{}", expression),
        }
    }
}

/// The operator of an assignment statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOperator {
    /// `=`
    Assign,
    /// `+=`
    Add,
    /// `-=`
    Subtract,
    /// `*=`
    Multiply,
    /// `/=`
    Divide,
}

impl AssignOperator {
    pub fn from_token(token: &Token) -> Option<AssignOperator> {
        match token {
            Token::Assign => Some(AssignOperator::Assign),
            Token::PlusEqual => Some(AssignOperator::Add),
            Token::MinusEqual => Some(AssignOperator::Subtract),
            Token::StarEqual => Some(AssignOperator::Multiply),
            Token::SlashEqual => Some(AssignOperator::Divide),
            _ => None,
        }
    }

    /// The infix operator a compound assignment applies, `None` for plain `=`.
    pub fn infix_token(&self) -> Option<Token> {
        match self {
            AssignOperator::Assign => None,
            AssignOperator::Add => Some(Token::Plus),
            AssignOperator::Subtract => Some(Token::Minus),
            AssignOperator::Multiply => Some(Token::Star),
            AssignOperator::Divide => Some(Token::Slash),
        }
    }
}

impl Display for AssignOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            AssignOperator::Assign => Token::Assign,
            AssignOperator::Add => Token::PlusEqual,
            AssignOperator::Subtract => Token::MinusEqual,
            AssignOperator::Multiply => Token::StarEqual,
            AssignOperator::Divide => Token::SlashEqual,
        };
        write!(f, "{}", token)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    // Literal
    Identifier(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Array(Box<ArrayLiteral>),
    Hash(Box<HashLiteral>),

    // Complex
    Prefix(Box<PrefixExpression>),
    Infix(Box<InfixExpression>),
    Index(Box<IndexExpression>),
    If(Box<IfExpression>),
    For(Box<ForExpression>),
    While(Box<WhileExpression>),
    Function(Box<FunctionLiteral>),
    Call(Box<CallExpression>),
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Expression::*;

        match self {
            Identifier(name) => write!(f, "{}", name),
            Integer(value) => write!(f, "{}", value),
            // Debug formatting keeps the `.0` on integral floats
            Float(value) => write!(f, "{:?}", value),
            Boolean(value) => write!(f, "{}", value),
            String(value) => write!(f, "\"{}\"", value),
            Array(array) => write!(f, "{}", array),
            Hash(hash) => write!(f, "{}", hash),

            Prefix(prefix) => write!(f, "{}", prefix),
            Infix(infix) => write!(f, "{}", infix),
            Index(index) => write!(f, "{}", index),
            If(if_exp) => write!(f, "{}", if_exp),
            For(for_exp) => write!(f, "{}", for_exp),
            While(while_exp) => write!(f, "{}", while_exp),
            Function(func) => write!(f, "{}", func),
            Call(call) => write!(f, "{}", call),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct PrefixExpression {
    pub operator: Token,
    pub right: Expression,
}

impl Display for PrefixExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({op}{r})", op = self.operator, r = self.right)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct InfixExpression {
    pub left: Expression,
    pub operator: Token,
    pub right: Expression,
}

impl Display for InfixExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({l} {op} {r})",
            l = self.left,
            op = self.operator,
            r = self.right
        )
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct IndexExpression {
    pub left: Expression,
    pub index: Expression,
}

impl Display for IndexExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}[{}])", self.left, self.index)
    }
}

/// A `{ ... }` sequence of statements. Blocks do not introduce a scope.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

impl BlockStatement {
    pub fn new() -> BlockStatement {
        BlockStatement {
            statements: Vec::new(),
        }
    }
}

impl Display for BlockStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.statements.is_empty() {
            write!(f, "{{ }}")
        } else {
            write!(f, "{{ {} }}", join(&self.statements, "; "))
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct IfExpression {
    pub condition: Expression,
    pub consequence: BlockStatement,
    pub alternative: Option<BlockStatement>,
}

impl Display for IfExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "if ({}) {}", self.condition, self.consequence)?;

        if let Some(alt) = &self.alternative {
            write!(f, " else {}", alt)?;
        }

        Ok(())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct ForExpression {
    /// Name bound to each element in turn
    pub variable: String,
    pub iterable: Expression,
    pub body: BlockStatement,
}

impl Display for ForExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "for ({} in {}) {}",
            self.variable, self.iterable, self.body
        )
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct WhileExpression {
    pub condition: Expression,
    pub body: BlockStatement,
}

impl Display for WhileExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "while ({}) {}", self.condition, self.body)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionLiteral {
    pub parameters: Vec<String>,
    /// Shared with every function value created from this literal
    pub body: Rc<BlockStatement>,
}

impl Display for FunctionLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({}) {}",
            Token::Fn,
            self.parameters.join(", "),
            self.body
        )
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct CallExpression {
    /// Identifier or FunctionLiteral
    pub function: Expression,
    pub arguments: Vec<Expression>,
}

impl Display for CallExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.function, join(&self.arguments, ", "))
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct ArrayLiteral {
    pub elements: Vec<Expression>,
}

impl Display for ArrayLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", join(&self.elements, ", "))
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct HashLiteral {
    /// Key/value pairs in source order
    pub pairs: Vec<(Expression, Expression)>,
}

impl Display for HashLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pairs = self
            .pairs
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect::<Vec<String>>()
            .join(", ");

        write!(f, "{{{}}}", pairs)
    }
}

fn join<T: Display>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<String>>()
        .join(separator)
}
