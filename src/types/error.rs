use thiserror::Error;

use super::value::ValueKind;

/// Errors raised while building an expression from a rule or markup subtree.
///
/// All of these surface synchronously at build time; a successfully built
/// expression never fails at evaluation time.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("unknown member '{member}' on subject type '{subject}'")]
    UnknownMember { subject: String, member: String },

    #[error("unknown operator '{operator}' for {kind} member '{member}'")]
    UnknownOperator {
        member: String,
        kind: ValueKind,
        operator: String,
    },

    #[error("cannot convert '{value}' to {kind}")]
    ValueConversion { value: String, kind: ValueKind },

    #[error("tag '{tag}' is missing required attribute '{attribute}'")]
    MissingAttribute { tag: String, attribute: String },

    #[error("tag '{tag}' requires {expected} operand(s), found {found}")]
    MissingOperand {
        tag: String,
        expected: usize,
        found: usize,
    },

    #[error("unrecognized tag '{tag}'")]
    UnknownTag { tag: String },
}

/// Errors raised by the named expression registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("an expression named '{key}' is already loaded")]
    DuplicateKey { key: String },

    #[error("no expression named '{key}' is loaded")]
    NotFound { key: String },
}
