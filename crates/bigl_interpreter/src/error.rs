use std::rc::Rc;

use bigl_parser::token::Token;
use thiserror::Error;

use crate::object::Object;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// When attempting a prefix operation on an invalid type (e.g. `-true`)
    #[error("unknown operator: {operator}{right}")]
    UnknownPrefixOperator {
        operator: Token,
        right: &'static str,
    },
    /// When attempting an infix operation the operand type does not support (e.g. `true + false`)
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        operator: Token,
        left: &'static str,
        right: &'static str,
    },
    /// When the operands of an infix operation have incompatible types (e.g. `1 + "a"`)
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        operator: Token,
        left: &'static str,
        right: &'static str,
    },
    #[error("division by zero")]
    DivisionByZero,
    /// When a `while` condition is not a boolean (e.g. `while (1) {}`)
    #[error("expected a boolean condition, got {0}")]
    ExpectedBooleanCondition(&'static str),
    /// When a `for` loop is given something other than an array or a range
    #[error("{0} is not iterable")]
    NotIterable(&'static str),
    /// When referencing an identifier that does not exist/has not been defined
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),
    /// When an object that is not a function is used with function call syntax
    #[error("not a function: {0}")]
    NotAFunction(&'static str),
    /// When a call's argument length does not match the expected function parameter length
    #[error("wrong number of arguments: want={expected}, got={got}")]
    BadArity { expected: usize, got: usize },
    /// When a call to builtin function passes an argument of an invalid/unsupported type
    #[error("argument to `{builtin}` not supported, got {typename}")]
    InvalidArgumentType {
        builtin: &'static str,
        typename: &'static str,
    },
    /// When `toInt`/`toFloat` are given a string that is not a number
    #[error("could not convert \"{0}\" to a number")]
    InvalidNumber(String),
    /// When attempting to index an object that does not support it (e.g. `1[0]`)
    #[error("index operator not supported: {0}")]
    IndexNotSupported(&'static str),
    /// When indexing an array with a non-integer (e.g. `[1, 2][true]`)
    #[error("array index must be an integer, got {0}")]
    InvalidIndexType(&'static str),
    /// When a hash is indexed with a value that cannot be a key (e.g. `h[[1]]`)
    #[error("unusable as hash key: {0}")]
    UnhashableKey(&'static str),
    /// When assigning to an element outside of the array
    #[error("index {index} out of bounds for array of length {length}")]
    IndexOutOfBounds { index: i64, length: usize },
    /// When a compound assignment targets a hash slot that does not exist yet
    #[error("key not found: {0}")]
    KeyNotFound(String),
    #[error("cannot assign to {0}")]
    InvalidAssignmentTarget(String),
    #[error("{0} is a builtin function")]
    BuiltinShadowed(String),
    /// When user function calls nest deeper than the evaluator allows
    #[error("maximum call depth of {0} exceeded")]
    RecursionLimit(usize),
    #[error("break outside of loop")]
    BreakOutsideLoop,
    #[error("could not include {path}: {reason}")]
    IncludeFailed { path: String, reason: String },
    #[error("i/o error: {0}")]
    Io(String),
}

impl From<std::io::Error> for RuntimeError {
    fn from(error: std::io::Error) -> Self {
        RuntimeError::Io(error.to_string())
    }
}

/// Everything that interrupts normal evaluation and travels up to whoever handles it.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Error(RuntimeError),
    /// Caught by the enclosing function call, or by the program
    Return(Rc<Object>),
    /// Caught by the enclosing loop
    Break,
    /// Stops the whole program with the given code
    Exit(i64),
}

impl From<RuntimeError> for Signal {
    fn from(error: RuntimeError) -> Self {
        Signal::Error(error)
    }
}

pub type EvalResult<T = Rc<Object>> = Result<T, Signal>;
