use thiserror::Error;

use crate::types::RegistryError;

/// Errors produced when turning formula source text into an expression tree.
///
/// Offsets are byte offsets into the source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected character '{character}' at offset {offset}")]
    UnexpectedCharacter { character: char, offset: usize },

    #[error("syntax error at offset {offset}: expected {expected}, found {}", describe(.found))]
    Syntax {
        offset: usize,
        expected: &'static str,
        found: Option<String>,
    },

    #[error("expression too complex at offset {offset}: exceeds limit of {limit}")]
    ExpressionTooComplex { limit: usize, offset: usize },
}

impl ParseError {
    /// Byte offset of the error in the source text.
    #[must_use]
    pub fn offset(&self) -> usize {
        match self {
            ParseError::UnexpectedCharacter { offset, .. }
            | ParseError::Syntax { offset, .. }
            | ParseError::ExpressionTooComplex { offset, .. } => *offset,
        }
    }
}

/// Errors produced while loading a definition file. Lines are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("line {line}: invalid expression: {source}")]
    Expression { line: usize, source: ParseError },

    #[error("line {line}: duplicate {what} '{id}'")]
    Duplicate {
        line: usize,
        what: &'static str,
        id: String,
    },

    #[error("line {line}: checklist items cannot be marked system")]
    SystemItem { line: usize },

    #[error("line {line}: item refers to unknown formula '{id}'")]
    UnknownFormula { line: usize, id: String },

    #[error("line {line}: {source}")]
    Registry { line: usize, source: RegistryError },
}

impl DefinitionError {
    /// The line the error was found on.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            DefinitionError::Syntax { line, .. }
            | DefinitionError::Expression { line, .. }
            | DefinitionError::Duplicate { line, .. }
            | DefinitionError::SystemItem { line }
            | DefinitionError::UnknownFormula { line, .. }
            | DefinitionError::Registry { line, .. } => *line,
        }
    }
}

fn describe(found: &Option<String>) -> String {
    match found {
        Some(text) => format!("'{text}'"),
        None => "end of input".to_owned(),
    }
}
