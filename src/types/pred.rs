use std::fmt;

/// Logical connective joining two predicate subtrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConnectiveKind {
    And,
    Or,
    Xor,
}

impl fmt::Display for ConnectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectiveKind::And => write!(f, "AND"),
            ConnectiveKind::Or => write!(f, "OR"),
            ConnectiveKind::Xor => write!(f, "XOR"),
        }
    }
}

/// Predicate expression tree, generic over the leaf test type.
///
/// The leaf type carries the subject-arity shape (single subject, two
/// subjects, identity-augmented); the tree structure and the connective
/// algebra are shared by every engine variant. Trees are immutable:
/// composing two predicates consumes and re-boxes them, never mutates.
#[derive(Debug)]
pub(crate) enum Pred<L> {
    Const(bool),
    Leaf(L),
    Connective {
        kind: ConnectiveKind,
        left: Box<Pred<L>>,
        right: Box<Pred<L>>,
    },
}

impl<L> Pred<L> {
    pub(crate) fn truth() -> Self {
        Pred::Const(true)
    }

    pub(crate) fn falsehood() -> Self {
        Pred::Const(false)
    }

    pub(crate) fn join(kind: ConnectiveKind, left: Pred<L>, right: Pred<L>) -> Self {
        Pred::Connective {
            kind,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub(crate) fn and(self, other: Pred<L>) -> Self {
        Pred::join(ConnectiveKind::And, self, other)
    }

    pub(crate) fn or(self, other: Pred<L>) -> Self {
        Pred::join(ConnectiveKind::Or, self, other)
    }

    pub(crate) fn xor(self, other: Pred<L>) -> Self {
        Pred::join(ConnectiveKind::Xor, self, other)
    }

    /// Evaluate the tree, delegating leaf tests to `test`.
    ///
    /// Leaves are pure, so no short-circuit behavior is promised; `xor`
    /// always evaluates both sides.
    pub(crate) fn eval_with<F>(&self, test: &F) -> bool
    where
        F: Fn(&L) -> bool,
    {
        match self {
            Pred::Const(b) => *b,
            Pred::Leaf(leaf) => test(leaf),
            Pred::Connective { kind, left, right } => match kind {
                ConnectiveKind::And => left.eval_with(test) && right.eval_with(test),
                ConnectiveKind::Or => left.eval_with(test) || right.eval_with(test),
                ConnectiveKind::Xor => left.eval_with(test) != right.eval_with(test),
            },
        }
    }

    /// Number of nodes in the tree.
    pub(crate) fn size(&self) -> usize {
        match self {
            Pred::Const(_) | Pred::Leaf(_) => 1,
            Pred::Connective { left, right, .. } => 1 + left.size() + right.size(),
        }
    }
}

impl<L: Clone> Clone for Pred<L> {
    fn clone(&self) -> Self {
        match self {
            Pred::Const(b) => Pred::Const(*b),
            Pred::Leaf(leaf) => Pred::Leaf(leaf.clone()),
            Pred::Connective { kind, left, right } => Pred::Connective {
                kind: *kind,
                left: left.clone(),
                right: right.clone(),
            },
        }
    }
}

impl<L: fmt::Display> fmt::Display for Pred<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pred::Const(b) => write!(f, "{b}"),
            Pred::Leaf(leaf) => write!(f, "({leaf})"),
            Pred::Connective { kind, left, right } => write!(f, "({left} {kind} {right})"),
        }
    }
}
