mod error;
pub(crate) mod grammar;
mod lexer;
mod parser;

pub use error::{DefinitionError, ParseError};
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::parse_with;

use crate::types::{Expr, Limits};

/// Parse a token sequence into an expression tree with the default
/// [`Limits`].
///
/// # Errors
///
/// Returns [`ParseError`] if the tokens do not form exactly one complete
/// expression.
pub fn parse(tokens: &[Token<'_>]) -> Result<Expr, ParseError> {
    parse_with(tokens, &Limits::default())
}

/// Tokenize and parse `source` in one step.
///
/// # Errors
///
/// Same as [`parse`].
pub fn parse_str(source: &str) -> Result<Expr, ParseError> {
    parse(&tokenize(source))
}
