//! Numeric formulas: `(subject) -> f64`.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::bind;
use crate::error::RuleError;
use crate::read::{self, ReadPolicy};
use crate::types::{BuildError, MathLeaf, MathNode, ParseNode, RegistryError, Schema};

/// A numeric formula over one subject record. Evaluation is total: every
/// value error is rejected at build time, and float edge cases follow IEEE
/// semantics (divide by zero yields an infinity, domain errors yield NaN).
pub struct Formula<T> {
    node: MathNode<T>,
}

impl<T> Formula<T> {
    #[must_use]
    pub fn evaluate(&self, subject: &T) -> f64 {
        self.node.eval(subject)
    }

    fn from_node(node: MathNode<T>) -> Self {
        Self { node }
    }
}

impl<T> Clone for Formula<T> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
        }
    }
}

impl<T> fmt::Debug for Formula<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Formula").field(&self.node).finish()
    }
}

/// A shared, immutable handle to a loaded formula.
pub struct CompiledFormula<T> {
    node: Arc<MathNode<T>>,
}

impl<T> CompiledFormula<T> {
    #[must_use]
    pub fn evaluate(&self, subject: &T) -> f64 {
        self.node.eval(subject)
    }
}

impl<T> Clone for CompiledFormula<T> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
        }
    }
}

/// Formula engine over a single subject type.
pub struct MathEngine<T> {
    schema: Schema<T>,
    policy: ReadPolicy,
    formulas: HashMap<String, Formula<T>>,
}

impl<T> MathEngine<T> {
    #[must_use]
    pub fn new(schema: Schema<T>) -> Self {
        Self::with_policy(schema, ReadPolicy::default())
    }

    #[must_use]
    pub fn with_policy(schema: Schema<T>, policy: ReadPolicy) -> Self {
        Self {
            schema,
            policy,
            formulas: HashMap::new(),
        }
    }

    #[must_use]
    pub fn schema(&self) -> &Schema<T> {
        &self.schema
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }

    /// Build a single-leaf formula: a numeric member, a sentinel constant
    /// (`@Pi`, `@1`, `@LogBase`), or a `@@` literal.
    pub fn expression(&self, leaf: &MathLeaf) -> Result<Formula<T>, BuildError> {
        Ok(Formula::from_node(bind::bind_math(&self.schema, leaf)?))
    }

    pub fn load(&mut self, key: &str, formula: Formula<T>) -> Result<(), RegistryError> {
        super::insert(&mut self.formulas, key, formula)
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
            let formula = self.read_expression(node)?;
            self.load(name, formula)?;
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

    pub fn get(&self, key: &str) -> Result<&Formula<T>, RegistryError> {
        super::lookup(&self.formulas, key)
    }

    pub fn compile(&self, key: &str) -> Result<CompiledFormula<T>, RegistryError> {
        Ok(CompiledFormula {
            node: Arc::new(self.get(key)?.node.clone()),
        })
    }

    fn read_expression(&self, node: &ParseNode) -> Result<Formula<T>, BuildError> {
        let root = super::expression_root(node)?;
        Ok(Formula::from_node(read::read_formula(
            root,
            self.policy,
            &self.schema,
        )?))
    }
}
