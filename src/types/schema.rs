use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::value::{Value, ValueKind};

/// Shared accessor from a subject to one of its member values.
pub(crate) type Getter<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

/// A registered member: its declared kind plus an accessor closure.
pub(crate) struct FieldDef<T> {
    pub(crate) kind: ValueKind,
    pub(crate) get: Getter<T>,
}

impl<T> Clone for FieldDef<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            get: Arc::clone(&self.get),
        }
    }
}

/// Explicit member registry for a subject type, built once and consulted at
/// rule-load time.
///
/// A schema maps member names to typed accessors, so member resolution is a
/// table lookup and unknown members fail eagerly when the rule is built, not
/// when it is evaluated.
///
/// # Example
///
/// ```
/// use tinyrule::Schema;
///
/// struct Car {
///     year: i64,
///     make: String,
/// }
///
/// let schema = Schema::builder("CarDTO")
///     .int("Year", |c: &Car| c.year)
///     .string("Make", |c: &Car| c.make.clone())
///     .build();
/// assert_eq!(schema.type_name(), "CarDTO");
/// ```
pub struct Schema<T> {
    type_name: String,
    fields: HashMap<String, FieldDef<T>>,
}

impl<T> Schema<T> {
    /// Start building a schema for the subject type named `type_name`.
    ///
    /// The name is what rule markup matches against in `appliesto` and
    /// `uses` attributes.
    #[must_use]
    pub fn builder(type_name: &str) -> SchemaBuilder<T> {
        SchemaBuilder {
            type_name: type_name.to_owned(),
            fields: HashMap::new(),
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Number of registered members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn field(&self, name: &str) -> Option<&FieldDef<T>> {
        self.fields.get(name)
    }
}

impl<T> Clone for Schema<T> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name.clone(),
            fields: self.fields.clone(),
        }
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`Schema`]. Members are registered with kind-specific methods
/// so the accessor returns the native type and the kind is implied.
pub struct SchemaBuilder<T> {
    type_name: String,
    fields: HashMap<String, FieldDef<T>>,
}

impl<T> SchemaBuilder<T> {
    #[must_use]
    pub fn int(self, name: &str, get: impl Fn(&T) -> i64 + Send + Sync + 'static) -> Self {
        self.field(name, ValueKind::Int, move |t| Value::Int(get(t)))
    }

    #[must_use]
    pub fn float(self, name: &str, get: impl Fn(&T) -> f64 + Send + Sync + 'static) -> Self {
        self.field(name, ValueKind::Float, move |t| Value::Float(get(t)))
    }

    #[must_use]
    pub fn boolean(self, name: &str, get: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.field(name, ValueKind::Bool, move |t| Value::Bool(get(t)))
    }

    #[must_use]
    pub fn string(self, name: &str, get: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.field(name, ValueKind::String, move |t| Value::String(get(t)))
    }

    fn field(
        mut self,
        name: &str,
        kind: ValueKind,
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.fields.insert(
            name.to_owned(),
            FieldDef {
                kind,
                get: Arc::new(get),
            },
        );
        self
    }

    #[must_use]
    pub fn build(self) -> Schema<T> {
        Schema {
            type_name: self.type_name,
            fields: self.fields,
        }
    }
}
