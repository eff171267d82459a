//! Engine variants. Each engine owns its subject schema(s), a
//! [`ReadPolicy`](crate::ReadPolicy), and a name-keyed registry of loaded
//! expressions.
//!
//! Loads take `&mut self`; lookups and compiled handles take `&self`, so the
//! borrow checker enforces the load-at-startup, evaluate-after discipline.
//! Compiled handles are cheap to clone and carry no registry back-reference.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::types::{BuildError, ParseNode, RegistryError};

mod identity;
mod identity_tuple;
mod math;
mod rule;
mod tuple;

pub use identity::{CompiledIdentityRule, IdentityPredicate, IdentityRuleEngine};
pub use identity_tuple::{
    CompiledIdentityTupleRule, IdentityTuplePredicate, IdentityTupleRuleEngine,
};
pub use math::{CompiledFormula, Formula, MathEngine};
pub use rule::{CompiledRule, RuleEngine, RulePredicate};
pub use tuple::{CompiledTupleRule, TuplePredicate, TupleRuleEngine};

fn insert<V>(map: &mut HashMap<String, V>, key: &str, value: V) -> Result<(), RegistryError> {
    match map.entry(key.to_owned()) {
        Entry::Occupied(_) => Err(RegistryError::DuplicateKey {
            key: key.to_owned(),
        }),
        Entry::Vacant(slot) => {
            slot.insert(value);
            Ok(())
        }
    }
}

fn lookup<'a, V>(map: &'a HashMap<String, V>, key: &str) -> Result<&'a V, RegistryError> {
    map.get(key).ok_or_else(|| RegistryError::NotFound {
        key: key.to_owned(),
    })
}

/// The expression tree under a named rule node is its first element child.
fn expression_root(node: &ParseNode) -> Result<&ParseNode, BuildError> {
    node.elements()
        .next()
        .ok_or_else(|| BuildError::MissingOperand {
            tag: node.tag().to_owned(),
            expected: 1,
            found: 0,
        })
}
