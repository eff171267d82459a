//! Grammar readers: structural recursion over [`ParseNode`] trees.
//!
//! One reader covers all four boolean engine variants (the leaf builder is
//! the only part that differs between them); a second covers the numeric
//! formula grammar.

use crate::bind;
use crate::types::{
    BinaryFn, BuildError, MathLeaf, MathNode, ParseNode, Pred, Rule, Schema, UnaryFn,
};

/// What to do with a grammar tag the reader does not recognize.
///
/// `Permissive` resolves the subtree to the variant's identity element
/// (constant `false` for predicates, `0` for formulas); `Strict` fails the
/// build. Permissive keeps loaders lenient but can mask tag typos, so it
/// is a per-engine choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadPolicy {
    #[default]
    Permissive,
    Strict,
}

/// Pull a required attribute off a node.
pub(crate) fn required_attr<'a>(node: &'a ParseNode, name: &str) -> Result<&'a str, BuildError> {
    node.attribute(name)
        .ok_or_else(|| BuildError::MissingAttribute {
            tag: node.tag().to_owned(),
            attribute: name.to_owned(),
        })
}

/// Build a [`Rule`] from a `ruleitem` node's attributes. The `uses`
/// attribute is optional and empty when absent.
pub(crate) fn rule_from_node(node: &ParseNode) -> Result<Rule, BuildError> {
    let member = required_attr(node, "membername")?;
    let target = required_attr(node, "targetvalue")?;
    let operator = required_attr(node, "operator")?;
    Ok(Rule::with_uses(
        member,
        target,
        operator,
        node.attribute("uses").unwrap_or(""),
    ))
}

/// The first two element children of a connective node, in document order.
/// Extra children are ignored; fewer than two is a structural error.
fn two_operands<'a>(node: &'a ParseNode) -> Result<(&'a ParseNode, &'a ParseNode), BuildError> {
    let mut elements = node.elements();
    let found = node.elements().count();
    match (elements.next(), elements.next()) {
        (Some(left), Some(right)) => Ok((left, right)),
        _ => Err(BuildError::MissingOperand {
            tag: node.tag().to_owned(),
            expected: 2,
            found,
        }),
    }
}

fn one_operand(node: &ParseNode) -> Result<&ParseNode, BuildError> {
    node.elements().next().ok_or_else(|| BuildError::MissingOperand {
        tag: node.tag().to_owned(),
        expected: 1,
        found: 0,
    })
}

/// Read a boolean predicate subtree. `leaf` builds the variant-specific
/// leaf predicate from a `ruleitem` node.
pub(crate) fn read_predicate<L, F>(
    node: &ParseNode,
    policy: ReadPolicy,
    leaf: &F,
) -> Result<Pred<L>, BuildError>
where
    F: Fn(&ParseNode) -> Result<Pred<L>, BuildError>,
{
    match node.tag() {
        "and" => {
            let (l, r) = two_operands(node)?;
            Ok(read_predicate(l, policy, leaf)?.and(read_predicate(r, policy, leaf)?))
        }
        "or" => {
            let (l, r) = two_operands(node)?;
            Ok(read_predicate(l, policy, leaf)?.or(read_predicate(r, policy, leaf)?))
        }
        "xor" => {
            let (l, r) = two_operands(node)?;
            Ok(read_predicate(l, policy, leaf)?.xor(read_predicate(r, policy, leaf)?))
        }
        "ruleitem" => leaf(node),
        other => match policy {
            ReadPolicy::Permissive => Ok(Pred::falsehood()),
            ReadPolicy::Strict => Err(BuildError::UnknownTag {
                tag: other.to_owned(),
            }),
        },
    }
}

/// Read a numeric formula subtree against a subject schema.
pub(crate) fn read_formula<T>(
    node: &ParseNode,
    policy: ReadPolicy,
    schema: &Schema<T>,
) -> Result<MathNode<T>, BuildError> {
    let tag = node.tag();
    if let Some(f) = BinaryFn::from_tag(tag) {
        let (l, r) = two_operands(node)?;
        return Ok(MathNode::binary(
            f,
            read_formula(l, policy, schema)?,
            read_formula(r, policy, schema)?,
        ));
    }
    if let Some(f) = UnaryFn::from_tag(tag) {
        let operand = one_operand(node)?;
        return Ok(MathNode::unary(f, read_formula(operand, policy, schema)?));
    }
    match tag {
        "value" => {
            let item = required_attr(node, "item")?;
            bind::bind_math(schema, &MathLeaf::new(item))
        }
        other => match policy {
            ReadPolicy::Permissive => Ok(MathNode::Const(0.0)),
            ReadPolicy::Strict => Err(BuildError::UnknownTag {
                tag: other.to_owned(),
            }),
        },
    }
}
