use std::fmt;
use std::sync::Arc;

use super::schema::Getter;

/// One-operand mathematical functions available as formula tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryFn {
    Sqrt,
    Exp,
    Cos,
    Sin,
    Tan,
    Cosh,
    Sinh,
    Tanh,
    Acosh,
    Asinh,
    Atanh,
    Abs,
    Log,
    Log10,
    Round,
    Ceiling,
    Floor,
}

impl UnaryFn {
    /// Resolve a formula tag name.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<UnaryFn> {
        match tag {
            "sqrt" => Some(UnaryFn::Sqrt),
            "exp" => Some(UnaryFn::Exp),
            "cos" => Some(UnaryFn::Cos),
            "sin" => Some(UnaryFn::Sin),
            "tan" => Some(UnaryFn::Tan),
            "cosh" => Some(UnaryFn::Cosh),
            "sinh" => Some(UnaryFn::Sinh),
            "tanh" => Some(UnaryFn::Tanh),
            "acosh" => Some(UnaryFn::Acosh),
            "asinh" => Some(UnaryFn::Asinh),
            "atanh" => Some(UnaryFn::Atanh),
            "abs" => Some(UnaryFn::Abs),
            "log" => Some(UnaryFn::Log),
            "log10" => Some(UnaryFn::Log10),
            "round" => Some(UnaryFn::Round),
            "ceiling" => Some(UnaryFn::Ceiling),
            "floor" => Some(UnaryFn::Floor),
            _ => None,
        }
    }

    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            UnaryFn::Sqrt => x.sqrt(),
            UnaryFn::Exp => x.exp(),
            UnaryFn::Cos => x.cos(),
            UnaryFn::Sin => x.sin(),
            UnaryFn::Tan => x.tan(),
            UnaryFn::Cosh => x.cosh(),
            UnaryFn::Sinh => x.sinh(),
            UnaryFn::Tanh => x.tanh(),
            UnaryFn::Acosh => x.acosh(),
            UnaryFn::Asinh => x.asinh(),
            UnaryFn::Atanh => x.atanh(),
            UnaryFn::Abs => x.abs(),
            UnaryFn::Log => x.ln(),
            UnaryFn::Log10 => x.log10(),
            UnaryFn::Round => x.round(),
            UnaryFn::Ceiling => x.ceil(),
            UnaryFn::Floor => x.floor(),
        }
    }
}

/// Two-operand arithmetic operations available as formula tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryFn {
    Plus,
    Minus,
    Multiply,
    Divide,
    Power,
    Max,
    Min,
}

impl BinaryFn {
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<BinaryFn> {
        match tag {
            "plus" => Some(BinaryFn::Plus),
            "minus" => Some(BinaryFn::Minus),
            "multiply" => Some(BinaryFn::Multiply),
            "divide" => Some(BinaryFn::Divide),
            "power" => Some(BinaryFn::Power),
            "max" => Some(BinaryFn::Max),
            "min" => Some(BinaryFn::Min),
            _ => None,
        }
    }

    #[must_use]
    pub fn apply(self, x: f64, y: f64) -> f64 {
        match self {
            BinaryFn::Plus => x + y,
            BinaryFn::Minus => x - y,
            BinaryFn::Multiply => x * y,
            BinaryFn::Divide => x / y,
            BinaryFn::Power => x.powf(y),
            BinaryFn::Max => x.max(y),
            BinaryFn::Min => x.min(y),
        }
    }
}

/// Numeric formula expression tree over one subject.
pub(crate) enum MathNode<T> {
    Const(f64),
    Member { name: String, get: Getter<T> },
    Unary { f: UnaryFn, operand: Box<MathNode<T>> },
    Binary {
        f: BinaryFn,
        left: Box<MathNode<T>>,
        right: Box<MathNode<T>>,
    },
}

impl<T> MathNode<T> {
    pub(crate) fn unary(f: UnaryFn, operand: MathNode<T>) -> Self {
        MathNode::Unary {
            f,
            operand: Box::new(operand),
        }
    }

    pub(crate) fn binary(f: BinaryFn, left: MathNode<T>, right: MathNode<T>) -> Self {
        MathNode::Binary {
            f,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub(crate) fn eval(&self, subject: &T) -> f64 {
        match self {
            MathNode::Const(v) => *v,
            // as_f64 cannot fail here: the binder rejects non-numeric
            // members at build time.
            MathNode::Member { get, .. } => (get)(subject).as_f64().unwrap_or(0.0),
            MathNode::Unary { f, operand } => f.apply(operand.eval(subject)),
            MathNode::Binary { f, left, right } => {
                f.apply(left.eval(subject), right.eval(subject))
            }
        }
    }
}

impl<T> Clone for MathNode<T> {
    fn clone(&self) -> Self {
        match self {
            MathNode::Const(v) => MathNode::Const(*v),
            MathNode::Member { name, get } => MathNode::Member {
                name: name.clone(),
                get: Arc::clone(get),
            },
            MathNode::Unary { f, operand } => MathNode::Unary {
                f: *f,
                operand: operand.clone(),
            },
            MathNode::Binary { f, left, right } => MathNode::Binary {
                f: *f,
                left: left.clone(),
                right: right.clone(),
            },
        }
    }
}

// The accessor closure is not Debug; render members by name.
impl<T> fmt::Debug for MathNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MathNode::Const(v) => f.debug_tuple("Const").field(v).finish(),
            MathNode::Member { name, .. } => f.debug_tuple("Member").field(name).finish(),
            MathNode::Unary { f: func, operand } => f
                .debug_struct("Unary")
                .field("f", func)
                .field("operand", operand)
                .finish(),
            MathNode::Binary {
                f: func,
                left,
                right,
            } => f
                .debug_struct("Binary")
                .field("f", func)
                .field("left", left)
                .field("right", right)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn unary_from_tag_round_trip() {
        for tag in [
            "sqrt", "exp", "cos", "sin", "tan", "cosh", "sinh", "tanh", "acosh", "asinh",
            "atanh", "abs", "log", "log10", "round", "ceiling", "floor",
        ] {
            assert!(UnaryFn::from_tag(tag).is_some(), "{tag}");
        }
        assert_eq!(UnaryFn::from_tag("bessel"), None);
        assert_eq!(UnaryFn::from_tag("Sqrt"), None);
    }

    #[test]
    fn binary_from_tag() {
        for tag in ["plus", "minus", "multiply", "divide", "power", "max", "min"] {
            assert!(BinaryFn::from_tag(tag).is_some(), "{tag}");
        }
        assert_eq!(BinaryFn::from_tag("modulo"), None);
    }

    #[test]
    fn unary_apply() {
        assert_eq!(UnaryFn::Sqrt.apply(9.0), 3.0);
        assert_eq!(UnaryFn::Abs.apply(-2.5), 2.5);
        assert_eq!(UnaryFn::Floor.apply(1.9), 1.0);
        assert_eq!(UnaryFn::Ceiling.apply(1.1), 2.0);
        assert_eq!(UnaryFn::Round.apply(1.5), 2.0);
        assert!((UnaryFn::Cos.apply(PI) + 1.0).abs() < 1e-12);
        assert!((UnaryFn::Log.apply(std::f64::consts::E) - 1.0).abs() < 1e-12);
        assert_eq!(UnaryFn::Log10.apply(1000.0), 3.0);
    }

    #[test]
    fn inverse_hyperbolics() {
        let x = 2.0_f64;
        assert!((UnaryFn::Acosh.apply(x.cosh()) - x).abs() < 1e-12);
        assert!((UnaryFn::Asinh.apply(x.sinh()) - x).abs() < 1e-12);
        let y = 0.5_f64;
        assert!((UnaryFn::Atanh.apply(y.tanh()) - y).abs() < 1e-12);
    }

    #[test]
    fn binary_apply() {
        assert_eq!(BinaryFn::Plus.apply(2.0, 3.0), 5.0);
        assert_eq!(BinaryFn::Minus.apply(2.0, 3.0), -1.0);
        assert_eq!(BinaryFn::Multiply.apply(2.0, 3.0), 6.0);
        assert_eq!(BinaryFn::Divide.apply(3.0, 2.0), 1.5);
        assert_eq!(BinaryFn::Power.apply(2.0, 10.0), 1024.0);
        assert_eq!(BinaryFn::Max.apply(2.0, 3.0), 3.0);
        assert_eq!(BinaryFn::Min.apply(2.0, 3.0), 2.0);
    }

    #[test]
    fn node_eval_nested() {
        // sqrt(abs(-16)) + 1
        let node: MathNode<()> = MathNode::binary(
            BinaryFn::Plus,
            MathNode::unary(
                UnaryFn::Sqrt,
                MathNode::unary(UnaryFn::Abs, MathNode::Const(-16.0)),
            ),
            MathNode::Const(1.0),
        );
        assert_eq!(node.eval(&()), 5.0);
    }
}
