//! Dual-subject boolean rules: `(subject, subject2) -> bool`.
//!
//! Each leaf names the subject it reads through the rule's `uses` attribute.
//! A `uses` equal to the first schema's type name binds against the first
//! subject; anything else binds against the second.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::bind::{self, MemberTest};
use crate::error::RuleError;
use crate::read::{self, ReadPolicy};
use crate::types::{BuildError, ParseNode, Pred, RegistryError, Rule, Schema};

/// Leaf test for the dual-subject variant.
pub(crate) enum TupleTest<T, U> {
    First(MemberTest<T>),
    Second(MemberTest<U>),
}

impl<T, U> TupleTest<T, U> {
    fn eval(&self, first: &T, second: &U) -> bool {
        match self {
            TupleTest::First(test) => test.eval(first),
            TupleTest::Second(test) => test.eval(second),
        }
    }
}

impl<T, U> Clone for TupleTest<T, U> {
    fn clone(&self) -> Self {
        match self {
            TupleTest::First(test) => TupleTest::First(test.clone()),
            TupleTest::Second(test) => TupleTest::Second(test.clone()),
        }
    }
}

impl<T, U> fmt::Debug for TupleTest<T, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TupleTest::First(test) => f.debug_tuple("First").field(test).finish(),
            TupleTest::Second(test) => f.debug_tuple("Second").field(test).finish(),
        }
    }
}

impl<T, U> fmt::Display for TupleTest<T, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TupleTest::First(test) => test.fmt(f),
            TupleTest::Second(test) => test.fmt(f),
        }
    }
}

/// A boolean predicate over two subject records.
pub struct TuplePredicate<T, U> {
    pred: Pred<TupleTest<T, U>>,
}

impl<T, U> TuplePredicate<T, U> {
    #[must_use]
    pub fn truth() -> Self {
        Self {
            pred: Pred::truth(),
        }
    }

    #[must_use]
    pub fn falsehood() -> Self {
        Self {
            pred: Pred::falsehood(),
        }
    }

    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self {
            pred: self.pred.and(other.pred),
        }
    }

    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self {
            pred: self.pred.or(other.pred),
        }
    }

    #[must_use]
    pub fn xor(self, other: Self) -> Self {
        Self {
            pred: self.pred.xor(other.pred),
        }
    }

    #[must_use]
    pub fn matches(&self, first: &T, second: &U) -> bool {
        self.pred.eval_with(&|test| test.eval(first, second))
    }

    fn from_pred(pred: Pred<TupleTest<T, U>>) -> Self {
        Self { pred }
    }
}

impl<T, U> Clone for TuplePredicate<T, U> {
    fn clone(&self) -> Self {
        Self {
            pred: self.pred.clone(),
        }
    }
}

impl<T, U> fmt::Debug for TuplePredicate<T, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TuplePredicate").field(&self.pred).finish()
    }
}

impl<T, U> fmt::Display for TuplePredicate<T, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.pred.fmt(f)
    }
}

/// A shared, immutable handle to a loaded dual-subject predicate.
pub struct CompiledTupleRule<T, U> {
    pred: Arc<Pred<TupleTest<T, U>>>,
}

impl<T, U> CompiledTupleRule<T, U> {
    #[must_use]
    pub fn matches(&self, first: &T, second: &U) -> bool {
        self.pred.eval_with(&|test| test.eval(first, second))
    }
}

impl<T, U> Clone for CompiledTupleRule<T, U> {
    fn clone(&self) -> Self {
        Self {
            pred: Arc::clone(&self.pred),
        }
    }
}

/// Rule engine over an ordered pair of subject types.
pub struct TupleRuleEngine<T, U> {
    first: Schema<T>,
    second: Schema<U>,
    policy: ReadPolicy,
    rules: HashMap<String, TuplePredicate<T, U>>,
}

impl<T, U> TupleRuleEngine<T, U> {
    #[must_use]
    pub fn new(first: Schema<T>, second: Schema<U>) -> Self {
        Self::with_policy(first, second, ReadPolicy::default())
    }

    #[must_use]
    pub fn with_policy(first: Schema<T>, second: Schema<U>, policy: ReadPolicy) -> Self {
        Self {
            first,
            second,
            policy,
            rules: HashMap::new(),
        }
    }

    #[must_use]
    pub fn first_schema(&self) -> &Schema<T> {
        &self.first
    }

    #[must_use]
    pub fn second_schema(&self) -> &Schema<U> {
        &self.second
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Build a single-leaf predicate; the rule's `uses` attribute picks the
    /// subject it binds against.
    pub fn expression(&self, rule: &Rule) -> Result<TuplePredicate<T, U>, BuildError> {
        Ok(TuplePredicate::from_pred(Pred::Leaf(self.leaf(rule)?)))
    }

    pub fn load(&mut self, key: &str, expr: TuplePredicate<T, U>) -> Result<(), RegistryError> {
        super::insert(&mut self.rules, key, expr)
    }

    /// Load every rule node matched by `path` whose `appliesto` attribute
    /// starts with the first type name or ends with the second.
    pub fn load_from_nodes(&mut self, root: &ParseNode, path: &str) -> Result<(), RuleError> {
        for node in root.select(path) {
            if node.is_comment() {
                continue;
            }
            let applies = read::required_attr(node, "appliesto")?;
            if !self.applies_to(applies) {
                continue;
            }
            let name = read::required_attr(node, "name")?;
            let expr = self.read_expression(node)?;
            self.load(name, expr)?;
        }
        Ok(())
    }

    pub fn load_from_markup(&mut self, text: &str, path: &str) -> Result<(), RuleError> {
        let root = crate::parse::parse(text)?;
        self.load_from_nodes(&root, path)
    }

    pub fn load_from_file(
        &mut self,
        file: impl AsRef<Path>,
        path: &str,
    ) -> Result<(), RuleError> {
        let text = std::fs::read_to_string(file)?;
        self.load_from_markup(&text, path)
    }

    pub fn get(&self, key: &str) -> Result<&TuplePredicate<T, U>, RegistryError> {
        super::lookup(&self.rules, key)
    }

    pub fn compile(&self, key: &str) -> Result<CompiledTupleRule<T, U>, RegistryError> {
        Ok(CompiledTupleRule {
            pred: Arc::new(self.get(key)?.pred.clone()),
        })
    }

    fn applies_to(&self, applies: &str) -> bool {
        applies.starts_with(self.first.type_name()) || applies.ends_with(self.second.type_name())
    }

    fn leaf(&self, rule: &Rule) -> Result<TupleTest<T, U>, BuildError> {
        if rule.uses() == self.first.type_name() {
            Ok(TupleTest::First(bind::bind(&self.first, rule)?))
        } else {
            Ok(TupleTest::Second(bind::bind(&self.second, rule)?))
        }
    }

    fn read_expression(&self, node: &ParseNode) -> Result<TuplePredicate<T, U>, BuildError> {
        let root = super::expression_root(node)?;
        let pred = read::read_predicate(root, self.policy, &|item| {
            let rule = read::rule_from_node(item)?;
            Ok(Pred::Leaf(self.leaf(&rule)?))
        })?;
        Ok(TuplePredicate::from_pred(pred))
    }
}
