//! Single-subject boolean rules: `(subject) -> bool`.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::bind::{self, MemberTest};
use crate::error::RuleError;
use crate::read::{self, ReadPolicy};
use crate::types::{BuildError, ParseNode, Pred, RegistryError, Rule, Schema};

/// A boolean predicate over one subject record. Composable via
/// [`and`](Self::and) / [`or`](Self::or) / [`xor`](Self::xor); evaluation
/// never fails and never mutates.
pub struct RulePredicate<T> {
    pred: Pred<MemberTest<T>>,
}

impl<T> RulePredicate<T> {
    /// The always-true predicate, the identity for `and`.
    #[must_use]
    pub fn truth() -> Self {
        Self {
            pred: Pred::truth(),
        }
    }

    /// The always-false predicate, the identity for `or`.
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
    pub fn matches(&self, subject: &T) -> bool {
        self.pred.eval_with(&|test| test.eval(subject))
    }

    fn from_pred(pred: Pred<MemberTest<T>>) -> Self {
        Self { pred }
    }
}

impl<T> Clone for RulePredicate<T> {
    fn clone(&self) -> Self {
        Self {
            pred: self.pred.clone(),
        }
    }
}

impl<T> fmt::Debug for RulePredicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RulePredicate").field(&self.pred).finish()
    }
}

impl<T> fmt::Display for RulePredicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.pred.fmt(f)
    }
}

/// A shared, immutable handle to a loaded predicate, detached from the
/// engine that built it.
pub struct CompiledRule<T> {
    pred: Arc<Pred<MemberTest<T>>>,
}

impl<T> CompiledRule<T> {
    #[must_use]
    pub fn matches(&self, subject: &T) -> bool {
        self.pred.eval_with(&|test| test.eval(subject))
    }
}

impl<T> Clone for CompiledRule<T> {
    fn clone(&self) -> Self {
        Self {
            pred: Arc::clone(&self.pred),
        }
    }
}

/// Rule engine over a single subject type.
pub struct RuleEngine<T> {
    schema: Schema<T>,
    policy: ReadPolicy,
    rules: HashMap<String, RulePredicate<T>>,
}

impl<T> RuleEngine<T> {
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

    /// Number of loaded expressions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Build a single-leaf predicate from a rule descriptor.
    pub fn expression(&self, rule: &Rule) -> Result<RulePredicate<T>, BuildError> {
        Ok(RulePredicate::from_pred(Pred::Leaf(bind::bind(
            &self.schema,
            rule,
        )?)))
    }

    /// Load a predicate under a key. Keys are single-assignment.
    pub fn load(&mut self, key: &str, expr: RulePredicate<T>) -> Result<(), RegistryError> {
        super::insert(&mut self.rules, key, expr)
    }

    /// Load every rule node matched by `path` whose `appliesto` attribute
    /// equals this engine's subject type name. Comment nodes are skipped.
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

    /// Parse markup text and load the matching rule nodes.
    pub fn load_from_markup(&mut self, text: &str, path: &str) -> Result<(), RuleError> {
        let root = crate::parse::parse(text)?;
        self.load_from_nodes(&root, path)
    }

    /// Read a markup file and load the matching rule nodes.
    pub fn load_from_file(
        &mut self,
        file: impl AsRef<Path>,
        path: &str,
    ) -> Result<(), RuleError> {
        let text = std::fs::read_to_string(file)?;
        self.load_from_markup(&text, path)
    }

    pub fn get(&self, key: &str) -> Result<&RulePredicate<T>, RegistryError> {
        super::lookup(&self.rules, key)
    }

    /// A shared handle to a loaded predicate; cloning and re-invoking it
    /// does not touch the engine.
    pub fn compile(&self, key: &str) -> Result<CompiledRule<T>, RegistryError> {
        Ok(CompiledRule {
            pred: Arc::new(self.get(key)?.pred.clone()),
        })
    }

    fn read_expression(&self, node: &ParseNode) -> Result<RulePredicate<T>, BuildError> {
        let root = super::expression_root(node)?;
        let pred = read::read_predicate(root, self.policy, &|item| {
            let rule = read::rule_from_node(item)?;
            Ok(Pred::Leaf(bind::bind(&self.schema, &rule)?))
        })?;
        Ok(RulePredicate::from_pred(pred))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Car {
        year: i64,
        make: String,
    }

    fn engine() -> RuleEngine<Car> {
        let schema = Schema::builder("CarDTO")
            .int("Year", |c: &Car| c.year)
            .string("Make", |c: &Car| c.make.clone())
            .build();
        RuleEngine::new(schema)
    }

    fn ford(year: i64) -> Car {
        Car {
            year,
            make: "Ford".to_owned(),
        }
    }

    #[test]
    fn expression_and_combinators() {
        let engine = engine();
        let is_ford = engine
            .expression(&Rule::new("Make", "Ford", "Equal"))
            .unwrap();
        let recent = engine
            .expression(&Rule::new("Year", "2010", "GreaterThanOrEqual"))
            .unwrap();
        let rule = is_ford.or(recent);
        assert!(rule.matches(&ford(2005)));
        assert!(rule.matches(&ford(2012)));
        assert!(!rule.matches(&Car {
            year: 2005,
            make: "Honda".to_owned()
        }));
    }

    #[test]
    fn truth_and_falsehood() {
        assert!(RulePredicate::<Car>::truth().matches(&ford(2000)));
        assert!(!RulePredicate::<Car>::falsehood().matches(&ford(2000)));
    }

    #[test]
    fn load_rejects_duplicate_keys() {
        let mut engine = engine();
        engine.load("r1", RulePredicate::truth()).unwrap();
        let err = engine.load("r1", RulePredicate::truth()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateKey { key } if key == "r1"));
    }

    #[test]
    fn get_unknown_key() {
        let engine = engine();
        let err = engine.get("missing").unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { key } if key == "missing"));
    }

    #[test]
    fn load_from_nodes_filters_on_appliesto() {
        let doc = ParseNode::element("rules")
            .child(
                ParseNode::element("rule")
                    .attr("name", "IsFord")
                    .attr("appliesto", "CarDTO")
                    .child(
                        ParseNode::element("ruleitem")
                            .attr("membername", "Make")
                            .attr("targetvalue", "Ford")
                            .attr("operator", "Equal"),
                    ),
            )
            .child(
                ParseNode::element("rule")
                    .attr("name", "OtherSubject")
                    .attr("appliesto", "SalesPersonDTO")
                    .child(
                        ParseNode::element("ruleitem")
                            .attr("membername", "State")
                            .attr("targetvalue", "PA")
                            .attr("operator", "Equal"),
                    ),
            );
        let mut engine = engine();
        engine.load_from_nodes(&doc, "/rules/rule").unwrap();
        assert_eq!(engine.len(), 1);
        assert!(engine.get("IsFord").unwrap().matches(&ford(1999)));
        assert!(engine.get("OtherSubject").is_err());
    }

    #[test]
    fn rule_node_without_expression_is_an_error() {
        let doc = ParseNode::element("rules").child(
            ParseNode::element("rule")
                .attr("name", "Empty")
                .attr("appliesto", "CarDTO"),
        );
        let mut engine = engine();
        let err = engine.load_from_nodes(&doc, "/rules/rule").unwrap_err();
        assert!(matches!(
            err,
            RuleError::Build(BuildError::MissingOperand { expected: 1, .. })
        ));
    }

    #[test]
    fn compiled_handle_is_detached() {
        let mut engine = engine();
        let is_ford = engine
            .expression(&Rule::new("Make", "Ford", "Equal"))
            .unwrap();
        engine.load("IsFord", is_ford).unwrap();
        let compiled = engine.compile("IsFord").unwrap();
        drop(engine);
        assert!(compiled.matches(&ford(2020)));
        assert!(compiled.clone().matches(&ford(2020)));
    }
}
