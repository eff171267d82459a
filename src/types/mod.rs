mod error;
mod math;
mod node;
mod pred;
mod principal;
mod rule;
mod schema;
mod value;

pub use error::{BuildError, RegistryError};
pub use math::{BinaryFn, UnaryFn};
pub use node::ParseNode;
pub use principal::{Claim, ClaimSource, Identity, Principal};
pub use rule::{MathLeaf, Rule};
pub use schema::{Schema, SchemaBuilder};
pub use value::{CompareOp, Value, ValueKind};

pub(crate) use math::MathNode;
pub(crate) use pred::Pred;
pub(crate) use schema::{FieldDef, Getter};
