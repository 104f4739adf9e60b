use thiserror::Error;

use crate::parse::{DefinitionError, ParseError};
use crate::types::{EvalError, RegistryError};

/// Unified error type covering parsing, evaluation, the registry,
/// definition files and I/O.
///
/// Returned by convenience loaders like
/// [`Definitions::from_file()`](crate::Definitions::from_file) and usable as
/// a catch-all with `?` across the crate's operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
