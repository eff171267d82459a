use thiserror::Error;

use crate::parse::ParseError;
use crate::types::{BuildError, RegistryError};

/// Unified error type covering parsing, expression building, registry
/// access, and I/O.
///
/// Returned by the convenience loaders such as
/// [`RuleEngine::load_from_markup()`](crate::RuleEngine::load_from_markup)
/// and [`RuleEngine::load_from_file()`](crate::RuleEngine::load_from_file).
#[derive(Debug, Error)]
pub enum RuleError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
