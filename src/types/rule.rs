use std::fmt;

/// A single rule leaf: member, operator, target literal, and (for
/// dual-subject rules) which subject the leaf applies to.
///
/// Immutable once constructed; the binder turns it into a typed test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    member_name: String,
    target_value: String,
    operator: String,
    uses: String,
}

impl Rule {
    /// A single-subject rule leaf.
    #[must_use]
    pub fn new(member_name: &str, target_value: &str, operator: &str) -> Self {
        Self {
            member_name: member_name.to_owned(),
            target_value: target_value.to_owned(),
            operator: operator.to_owned(),
            uses: String::new(),
        }
    }

    /// A dual-subject rule leaf; `uses` names the subject type the member
    /// belongs to.
    #[must_use]
    pub fn with_uses(member_name: &str, target_value: &str, operator: &str, uses: &str) -> Self {
        Self {
            member_name: member_name.to_owned(),
            target_value: target_value.to_owned(),
            operator: operator.to_owned(),
            uses: uses.to_owned(),
        }
    }

    #[must_use]
    pub fn member_name(&self) -> &str {
        &self.member_name
    }

    #[must_use]
    pub fn target_value(&self) -> &str {
        &self.target_value
    }

    #[must_use]
    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// Empty for single-subject rules.
    #[must_use]
    pub fn uses(&self) -> &str {
        &self.uses
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.uses.is_empty() {
            write!(f, "{} {} {:?}", self.member_name, self.operator, self.target_value)
        } else {
            write!(
                f,
                "{}.{} {} {:?}",
                self.uses, self.member_name, self.operator, self.target_value
            )
        }
    }
}

/// A numeric formula leaf: a member name, a sentinel constant token
/// (`@Pi`, `@1`, `@LogBase`), or a `@@`-prefixed literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathLeaf {
    item: String,
}

impl MathLeaf {
    #[must_use]
    pub fn new(item: &str) -> Self {
        Self {
            item: item.to_owned(),
        }
    }

    #[must_use]
    pub fn item(&self) -> &str {
        &self.item
    }
}
