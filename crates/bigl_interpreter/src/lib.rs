mod builtin;
pub mod config;
mod environment;
pub mod error;
mod evaluator;
pub mod object;

use bigl_parser::{
    ast::Program,
    lexer::Lexer,
    parser::{ParseError, Parser},
};
use log::trace;

pub use builtin::Builtin;
pub use config::Config;
pub use environment::{Environment, MODULE_NAME_KEY};
pub use error::{EvalResult, RuntimeError, Signal};
pub use evaluator::Evaluator;

/// Lex and parse a whole source unit.
pub fn parse(source: &str) -> Result<Program, Vec<ParseError>> {
    trace!("parsing {} bytes", source.len());
    Parser::new(Lexer::new(source)).parse_program()
}
