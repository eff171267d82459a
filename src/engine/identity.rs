//! Identity-augmented rules: `(subject, principal) -> bool`.
//!
//! Identical to the single-subject engine except for the leaf resolver: the
//! sentinel member name `@User` turns a rule into a claim-presence test
//! against the principal, with the claim type taken from the rule's operator
//! and the claim value from its target value.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::bind::{self, ClaimTest, MemberTest};
use crate::error::RuleError;
use crate::read::{self, ReadPolicy};
use crate::types::{BuildError, ClaimSource, ParseNode, Pred, RegistryError, Rule, Schema};

const USER_SENTINEL: &str = "@User";

/// Leaf test for the identity variant: either a member test on the subject
/// or a claim test on the principal.
pub(crate) enum IdentityTest<T> {
    Member(MemberTest<T>),
    Claim(ClaimTest),
}

impl<T> IdentityTest<T> {
    fn eval<P: ClaimSource>(&self, subject: &T, principal: &P) -> bool {
        match self {
            IdentityTest::Member(test) => test.eval(subject),
            IdentityTest::Claim(test) => {
                principal.has_claim(&test.claim_type, &test.claim_value)
            }
        }
    }
}

impl<T> Clone for IdentityTest<T> {
    fn clone(&self) -> Self {
        match self {
            IdentityTest::Member(test) => IdentityTest::Member(test.clone()),
            IdentityTest::Claim(test) => IdentityTest::Claim(test.clone()),
        }
    }
}

impl<T> fmt::Debug for IdentityTest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityTest::Member(test) => f.debug_tuple("Member").field(test).finish(),
            IdentityTest::Claim(test) => f.debug_tuple("Claim").field(test).finish(),
        }
    }
}

impl<T> fmt::Display for IdentityTest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityTest::Member(test) => test.fmt(f),
            IdentityTest::Claim(test) => test.fmt(f),
        }
    }
}

/// A boolean predicate over a subject record and a claim-bearing principal.
pub struct IdentityPredicate<T> {
    pred: Pred<IdentityTest<T>>,
}

impl<T> IdentityPredicate<T> {
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
    pub fn matches<P: ClaimSource>(&self, subject: &T, principal: &P) -> bool {
        self.pred
            .eval_with(&|test| test.eval(subject, principal))
    }

    fn from_pred(pred: Pred<IdentityTest<T>>) -> Self {
        Self { pred }
    }
}

impl<T> Clone for IdentityPredicate<T> {
    fn clone(&self) -> Self {
        Self {
            pred: self.pred.clone(),
        }
    }
}

impl<T> fmt::Debug for IdentityPredicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IdentityPredicate").field(&self.pred).finish()
    }
}

impl<T> fmt::Display for IdentityPredicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.pred.fmt(f)
    }
}

/// A shared, immutable handle to a loaded identity predicate.
pub struct CompiledIdentityRule<T> {
    pred: Arc<Pred<IdentityTest<T>>>,
}

impl<T> CompiledIdentityRule<T> {
    #[must_use]
    pub fn matches<P: ClaimSource>(&self, subject: &T, principal: &P) -> bool {
        self.pred
            .eval_with(&|test| test.eval(subject, principal))
    }
}

impl<T> Clone for CompiledIdentityRule<T> {
    fn clone(&self) -> Self {
        Self {
            pred: Arc::clone(&self.pred),
        }
    }
}

/// Rule engine over one subject type plus an authenticated principal.
pub struct IdentityRuleEngine<T> {
    schema: Schema<T>,
    policy: ReadPolicy,
    rules: HashMap<String, IdentityPredicate<T>>,
}

impl<T> IdentityRuleEngine<T> {
    #[must_use]
    pub fn new(schema: Schema<T>) -> Self {
        Self::with_policy(schema, ReadPolicy::default())
    }

    #[must_use]
    pub fn with_policy(schema: Schema<T>, policy: ReadPolicy) -> Self {
        Self {
            schema,
            policy,
            rules: HashMap::new(),
        }
    }

    #[must_use]
    pub fn schema(&self) -> &Schema<T> {
        &self.schema
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn expression(&self, rule: &Rule) -> Result<IdentityPredicate<T>, BuildError> {
        Ok(IdentityPredicate::from_pred(Pred::Leaf(self.leaf(rule)?)))
    }

    pub fn load(&mut self, key: &str, expr: IdentityPredicate<T>) -> Result<(), RegistryError> {
        super::insert(&mut self.rules, key, expr)
    }

    pub fn load_from_nodes(&mut self, root: &ParseNode, path: &str) -> Result<(), RuleError> {
        for node in root.select(path) {
            if node.is_comment() {
                continue;
            }
            let applies = read::required_attr(node, "appliesto")?;
            if applies != self.schema.type_name() {
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

    pub fn get(&self, key: &str) -> Result<&IdentityPredicate<T>, RegistryError> {
        super::lookup(&self.rules, key)
    }

    pub fn compile(&self, key: &str) -> Result<CompiledIdentityRule<T>, RegistryError> {
        Ok(CompiledIdentityRule {
            pred: Arc::new(self.get(key)?.pred.clone()),
        })
    }

    fn leaf(&self, rule: &Rule) -> Result<IdentityTest<T>, BuildError> {
        if rule.member_name() == USER_SENTINEL {
            Ok(IdentityTest::Claim(ClaimTest {
                claim_type: rule.operator().to_owned(),
                claim_value: rule.target_value().to_owned(),
            }))
        } else {
            Ok(IdentityTest::Member(bind::bind(&self.schema, rule)?))
        }
    }

    fn read_expression(&self, node: &ParseNode) -> Result<IdentityPredicate<T>, BuildError> {
        let root = super::expression_root(node)?;
        let pred = read::read_predicate(root, self.policy, &|item| {
            let rule = read::rule_from_node(item)?;
            Ok(Pred::Leaf(self.leaf(&rule)?))
        })?;
        Ok(IdentityPredicate::from_pred(pred))
    }
}
