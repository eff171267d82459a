mod error;
mod grammar;

pub use error::ParseError;

use crate::types::ParseNode;

/// Parse markup text into a [`ParseNode`] tree.
///
/// The dialect is a small XML subset: one root element, double-quoted
/// attribute values with the five standard entities, self-closing tags,
/// comments (kept as comment nodes), an optional leading declaration, and
/// text content ignored.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not well-formed.
pub fn parse(input: &str) -> Result<ParseNode, ParseError> {
    use winnow::Parser;
    grammar::document
        .parse(input)
        .map_err(|e| ParseError::new(e.to_string()))
}
