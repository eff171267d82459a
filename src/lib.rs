//! A small rule and formula engine: declarative markup compiled into
//! reusable boolean predicates and numeric formulas over typed subject
//! records, optionally combined with authenticated-identity claims.

mod bind;
mod error;
mod read;
mod types;

pub mod engine;
pub mod parse;

pub use engine::{
    CompiledFormula, CompiledIdentityRule, CompiledIdentityTupleRule, CompiledRule,
    CompiledTupleRule, Formula, IdentityPredicate, IdentityRuleEngine, IdentityTuplePredicate,
    IdentityTupleRuleEngine, MathEngine, RuleEngine, RulePredicate, TuplePredicate,
    TupleRuleEngine,
};
pub use error::RuleError;
pub use read::ReadPolicy;
pub use types::{
    BuildError, Claim, ClaimSource, CompareOp, Identity, MathLeaf, ParseNode, Principal,
    RegistryError, Rule, Schema, SchemaBuilder, Value, ValueKind,
};
