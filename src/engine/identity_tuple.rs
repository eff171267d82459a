//! Dual-subject, identity-augmented rules:
//! `(subject, subject2, principal) -> bool`.
//!
//! Combines the dual-subject `uses` routing with the `@User` claim leaf.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::bind::{self, ClaimTest, MemberTest};
use crate::error::RuleError;
use crate::read::{self, ReadPolicy};
use crate::types::{BuildError, ClaimSource, ParseNode, Pred, RegistryError, Rule, Schema};

const USER_SENTINEL: &str = "@User";

/// Leaf test for the dual-subject identity variant.
pub(crate) enum IdentityTupleTest<T, U> {
    First(MemberTest<T>),
    Second(MemberTest<U>),
    Claim(ClaimTest),
}

impl<T, U> IdentityTupleTest<T, U> {
    fn eval<P: ClaimSource>(&self, first: &T, second: &U, principal: &P) -> bool {
        match self {
            IdentityTupleTest::First(test) => test.eval(first),
            IdentityTupleTest::Second(test) => test.eval(second),
            IdentityTupleTest::Claim(test) => {
                principal.has_claim(&test.claim_type, &test.claim_value)
            }
        }
    }
}

impl<T, U> Clone for IdentityTupleTest<T, U> {
    fn clone(&self) -> Self {
        match self {
            IdentityTupleTest::First(test) => IdentityTupleTest::First(test.clone()),
            IdentityTupleTest::Second(test) => IdentityTupleTest::Second(test.clone()),
            IdentityTupleTest::Claim(test) => IdentityTupleTest::Claim(test.clone()),
        }
    }
}

impl<T, U> fmt::Debug for IdentityTupleTest<T, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityTupleTest::First(test) => f.debug_tuple("First").field(test).finish(),
            IdentityTupleTest::Second(test) => f.debug_tuple("Second").field(test).finish(),
            IdentityTupleTest::Claim(test) => f.debug_tuple("Claim").field(test).finish(),
        }
    }
}

impl<T, U> fmt::Display for IdentityTupleTest<T, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityTupleTest::First(test) => test.fmt(f),
            IdentityTupleTest::Second(test) => test.fmt(f),
            IdentityTupleTest::Claim(test) => test.fmt(f),
        }
    }
}

/// A boolean predicate over two subject records and a principal.
pub struct IdentityTuplePredicate<T, U> {
    pred: Pred<IdentityTupleTest<T, U>>,
}

impl<T, U> IdentityTuplePredicate<T, U> {
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
    pub fn matches<P: ClaimSource>(&self, first: &T, second: &U, principal: &P) -> bool {
        self.pred
            .eval_with(&|test| test.eval(first, second, principal))
    }

    fn from_pred(pred: Pred<IdentityTupleTest<T, U>>) -> Self {
        Self { pred }
    }
}

impl<T, U> Clone for IdentityTuplePredicate<T, U> {
    fn clone(&self) -> Self {
        Self {
            pred: self.pred.clone(),
        }
    }
}

impl<T, U> fmt::Debug for IdentityTuplePredicate<T, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IdentityTuplePredicate")
            .field(&self.pred)
            .finish()
    }
}

impl<T, U> fmt::Display for IdentityTuplePredicate<T, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.pred.fmt(f)
    }
}

/// A shared, immutable handle to a loaded dual-subject identity predicate.
pub struct CompiledIdentityTupleRule<T, U> {
    pred: Arc<Pred<IdentityTupleTest<T, U>>>,
}

impl<T, U> CompiledIdentityTupleRule<T, U> {
    #[must_use]
    pub fn matches<P: ClaimSource>(&self, first: &T, second: &U, principal: &P) -> bool {
        self.pred
            .eval_with(&|test| test.eval(first, second, principal))
    }
}

impl<T, U> Clone for CompiledIdentityTupleRule<T, U> {
    fn clone(&self) -> Self {
        Self {
            pred: Arc::clone(&self.pred),
        }
    }
}

/// Rule engine over an ordered pair of subject types plus a principal.
pub struct IdentityTupleRuleEngine<T, U> {
    first: Schema<T>,
    second: Schema<U>,
    policy: ReadPolicy,
    rules: HashMap<String, IdentityTuplePredicate<T, U>>,
}

impl<T, U> IdentityTupleRuleEngine<T, U> {
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

    pub fn expression(&self, rule: &Rule) -> Result<IdentityTuplePredicate<T, U>, BuildError> {
        Ok(IdentityTuplePredicate::from_pred(Pred::Leaf(
            self.leaf(rule)?,
        )))
    }

    pub fn load(
        &mut self,
        key: &str,
        expr: IdentityTuplePredicate<T, U>,
    ) -> Result<(), RegistryError> {
        super::insert(&mut self.rules, key, expr)
    }

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

    pub fn get(&self, key: &str) -> Result<&IdentityTuplePredicate<T, U>, RegistryError> {
        super::lookup(&self.rules, key)
    }

    pub fn compile(&self, key: &str) -> Result<CompiledIdentityTupleRule<T, U>, RegistryError> {
        Ok(CompiledIdentityTupleRule {
            pred: Arc::new(self.get(key)?.pred.clone()),
        })
    }

    fn applies_to(&self, applies: &str) -> bool {
        applies.starts_with(self.first.type_name()) || applies.ends_with(self.second.type_name())
    }

    fn leaf(&self, rule: &Rule) -> Result<IdentityTupleTest<T, U>, BuildError> {
        if rule.member_name() == USER_SENTINEL {
            Ok(IdentityTupleTest::Claim(ClaimTest {
                claim_type: rule.operator().to_owned(),
                claim_value: rule.target_value().to_owned(),
            }))
        } else if rule.uses() == self.first.type_name() {
            Ok(IdentityTupleTest::First(bind::bind(&self.first, rule)?))
        } else {
            Ok(IdentityTupleTest::Second(bind::bind(&self.second, rule)?))
        }
    }

    fn read_expression(
        &self,
        node: &ParseNode,
    ) -> Result<IdentityTuplePredicate<T, U>, BuildError> {
        let root = super::expression_root(node)?;
        let pred = read::read_predicate(root, self.policy, &|item| {
            let rule = read::rule_from_node(item)?;
            Ok(Pred::Leaf(self.leaf(&rule)?))
        })?;
        Ok(IdentityTuplePredicate::from_pred(pred))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Identity, Principal};

    const ROLE: &str = "http://schemas.example.org/claims/role";

    struct Car {
        make: String,
    }

    struct SalesPerson {
        state: String,
    }

    fn engine() -> IdentityTupleRuleEngine<Car, SalesPerson> {
        let cars = Schema::builder("CarDTO")
            .string("Make", |c: &Car| c.make.clone())
            .build();
        let people = Schema::builder("SalesPersonDTO")
            .string("State", |s: &SalesPerson| s.state.clone())
            .build();
        IdentityTupleRuleEngine::new(cars, people)
    }

    fn ford() -> Car {
        Car {
            make: "Ford".to_owned(),
        }
    }

    fn pa_rep() -> SalesPerson {
        SalesPerson {
            state: "PA".to_owned(),
        }
    }

    fn manager() -> Principal {
        Principal::new().identity(Identity::new().claim(ROLE, "manager"))
    }

    #[test]
    fn all_three_leaf_kinds_compose() {
        let engine = engine();
        let rule = engine
            .expression(&Rule::with_uses("Make", "Ford", "Equal", "CarDTO"))
            .unwrap()
            .and(
                engine
                    .expression(&Rule::with_uses("State", "PA", "Equal", "SalesPersonDTO"))
                    .unwrap(),
            )
            .and(
                engine
                    .expression(&Rule::new(USER_SENTINEL, "manager", ROLE))
                    .unwrap(),
            );
        assert!(rule.matches(&ford(), &pa_rep(), &manager()));
        assert!(!rule.matches(&ford(), &pa_rep(), &Principal::new()));
        assert!(!rule.matches(
            &ford(),
            &SalesPerson {
                state: "NJ".to_owned()
            },
            &manager()
        ));
    }

    #[test]
    fn claim_leaf_skips_uses_routing() {
        // A claim rule binds against the principal even when `uses` is set.
        let engine = engine();
        let rule = engine
            .expression(&Rule::with_uses(USER_SENTINEL, "manager", ROLE, "CarDTO"))
            .unwrap();
        assert!(rule.matches(&ford(), &pa_rep(), &manager()));
    }

    #[test]
    fn markup_round_trip() {
        let doc = ParseNode::element("rules").child(
            ParseNode::element("rule")
                .attr("name", "PaManagerFord")
                .attr("appliesto", "CarDTO,SalesPersonDTO")
                .child(
                    ParseNode::element("and")
                        .child(
                            ParseNode::element("ruleitem")
                                .attr("membername", "State")
                                .attr("targetvalue", "PA")
                                .attr("operator", "Equal")
                                .attr("uses", "SalesPersonDTO"),
                        )
                        .child(
                            ParseNode::element("ruleitem")
                                .attr("membername", USER_SENTINEL)
                                .attr("targetvalue", "manager")
                                .attr("operator", ROLE),
                        ),
                ),
        );
        let mut engine = engine();
        engine.load_from_nodes(&doc, "/rules/rule").unwrap();
        let compiled = engine.compile("PaManagerFord").unwrap();
        assert!(compiled.matches(&ford(), &pa_rep(), &manager()));
        assert!(!compiled.matches(&ford(), &pa_rep(), &Principal::new()));
    }
}
