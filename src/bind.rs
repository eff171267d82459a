//! Operator binding: resolving a rule leaf against a subject schema into a
//! typed, evaluatable test. Binding is a pure function of the schema and the
//! rule; every failure surfaces here, at build time.

use std::fmt;
use std::sync::Arc;

use crate::types::{
    BuildError, CompareOp, FieldDef, Getter, MathLeaf, MathNode, Rule, Schema, Value, ValueKind,
};

/// Whitelisted one-argument member methods, keyed by the member's kind.
///
/// These cover operator names that are not one of the fixed relational
/// kinds; the string family mirrors the usual prefix/suffix/substring tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MethodKind {
    Equals,
    StartsWith,
    EndsWith,
    Contains,
}

impl MethodKind {
    /// Resolve a method by name for a member of the given kind, returning
    /// the method and the kind its argument literal is parsed as.
    fn resolve(member_kind: ValueKind, name: &str) -> Option<(MethodKind, ValueKind)> {
        match name {
            "Equals" => Some((MethodKind::Equals, member_kind)),
            "StartsWith" | "EndsWith" | "Contains" if member_kind == ValueKind::String => {
                let kind = match name {
                    "StartsWith" => MethodKind::StartsWith,
                    "EndsWith" => MethodKind::EndsWith,
                    _ => MethodKind::Contains,
                };
                Some((kind, ValueKind::String))
            }
            _ => None,
        }
    }

    fn apply(self, receiver: &Value, arg: &Value) -> bool {
        match self {
            MethodKind::Equals => receiver.compare(CompareOp::Eq, arg).unwrap_or(false),
            MethodKind::StartsWith | MethodKind::EndsWith | MethodKind::Contains => {
                match (receiver, arg) {
                    (Value::String(r), Value::String(a)) => match self {
                        MethodKind::StartsWith => r.starts_with(a.as_str()),
                        MethodKind::EndsWith => r.ends_with(a.as_str()),
                        _ => r.contains(a.as_str()),
                    },
                    _ => false,
                }
            }
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodKind::Equals => write!(f, "Equals"),
            MethodKind::StartsWith => write!(f, "StartsWith"),
            MethodKind::EndsWith => write!(f, "EndsWith"),
            MethodKind::Contains => write!(f, "Contains"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum TestKind {
    Compare(CompareOp, Value),
    Method(MethodKind, Value),
}

/// A bound leaf test: member accessor plus the comparison or method call to
/// apply to it.
pub(crate) struct MemberTest<T> {
    member: String,
    get: Getter<T>,
    kind: TestKind,
}

impl<T> MemberTest<T> {
    pub(crate) fn eval(&self, subject: &T) -> bool {
        let value = (self.get)(subject);
        match &self.kind {
            TestKind::Compare(op, target) => value.compare(*op, target).unwrap_or(false),
            TestKind::Method(method, arg) => method.apply(&value, arg),
        }
    }
}

impl<T> Clone for MemberTest<T> {
    fn clone(&self) -> Self {
        Self {
            member: self.member.clone(),
            get: Arc::clone(&self.get),
            kind: self.kind.clone(),
        }
    }
}

impl<T> fmt::Debug for MemberTest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberTest")
            .field("member", &self.member)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for MemberTest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TestKind::Compare(op, target) => write!(f, "{} {op} {target}", self.member),
            TestKind::Method(method, arg) => write!(f, "{}.{method}({arg})", self.member),
        }
    }
}

/// A bound claim-presence test against the identity subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClaimTest {
    pub(crate) claim_type: String,
    pub(crate) claim_value: String,
}

impl fmt::Display for ClaimTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@User[{} = {:?}]", self.claim_type, self.claim_value)
    }
}

/// Bind a rule leaf against a subject schema.
///
/// Resolves the member, classifies the operator (relational kind first,
/// method table second), and parses the target literal into the type the
/// test needs.
pub(crate) fn bind<T>(schema: &Schema<T>, rule: &Rule) -> Result<MemberTest<T>, BuildError> {
    let field: &FieldDef<T> =
        schema
            .field(rule.member_name())
            .ok_or_else(|| BuildError::UnknownMember {
                subject: schema.type_name().to_owned(),
                member: rule.member_name().to_owned(),
            })?;

    let kind = if let Some(op) = CompareOp::from_name(rule.operator()) {
        let target = parse_literal(field.kind, rule.target_value())?;
        TestKind::Compare(op, target)
    } else if let Some((method, arg_kind)) = MethodKind::resolve(field.kind, rule.operator()) {
        let arg = parse_literal(arg_kind, rule.target_value())?;
        TestKind::Method(method, arg)
    } else {
        return Err(BuildError::UnknownOperator {
            member: rule.member_name().to_owned(),
            kind: field.kind,
            operator: rule.operator().to_owned(),
        });
    };

    Ok(MemberTest {
        member: rule.member_name().to_owned(),
        get: Arc::clone(&field.get),
        kind,
    })
}

/// Resolve a numeric formula leaf: sentinel tokens first, then a numeric
/// member access.
pub(crate) fn bind_math<T>(
    schema: &Schema<T>,
    leaf: &MathLeaf,
) -> Result<MathNode<T>, BuildError> {
    let item = leaf.item();
    if let Some(literal) = item.strip_prefix("@@") {
        let value = literal
            .parse::<f64>()
            .map_err(|_| BuildError::ValueConversion {
                value: literal.to_owned(),
                kind: ValueKind::Float,
            })?;
        return Ok(MathNode::Const(value));
    }
    match item {
        "@Pi" => Ok(MathNode::Const(std::f64::consts::PI)),
        "@1" => Ok(MathNode::Const(1.0)),
        "@LogBase" => Ok(MathNode::Const(std::f64::consts::E)),
        member => {
            let field = schema
                .field(member)
                .ok_or_else(|| BuildError::UnknownMember {
                    subject: schema.type_name().to_owned(),
                    member: member.to_owned(),
                })?;
            // Formulas are double-valued; a non-numeric member cannot
            // participate, and we reject it here rather than at evaluation.
            if !matches!(field.kind, ValueKind::Int | ValueKind::Float) {
                return Err(BuildError::ValueConversion {
                    value: member.to_owned(),
                    kind: ValueKind::Float,
                });
            }
            Ok(MathNode::Member {
                name: member.to_owned(),
                get: Arc::clone(&field.get),
            })
        }
    }
}

fn parse_literal(kind: ValueKind, literal: &str) -> Result<Value, BuildError> {
    kind.parse(literal).ok_or_else(|| BuildError::ValueConversion {
        value: literal.to_owned(),
        kind,
    })
}
