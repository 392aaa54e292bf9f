//! Type tags and the type registry.
//!
//! Every parameter declares a [`TypeTag`]. At resolution time the tag is
//! looked up in a [`TypeRegistry`], which yields the validation predicate and
//! the description fragment embedded in error messages ("true or false",
//! "an instance of Integer").

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::value::{Value, ValueKind};

/// Declared expected shape of a parameter value.
///
/// # Examples
///
/// ```
/// use command_params_core::{TypeTag, ValueKind};
///
/// assert_eq!(TypeTag::default(), TypeTag::Nominal(ValueKind::String));
/// assert_eq!(TypeTag::from_name("boolean"), TypeTag::Boolean);
/// assert_eq!(TypeTag::from_name("integer"), TypeTag::Named("integer".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Exactly `true` or `false`.
    Boolean,
    /// Direct reference to a value type.
    Nominal(ValueKind),
    /// Textual identifier resolved through the [`TypeRegistry`].
    Named(String),
}

impl Default for TypeTag {
    fn default() -> Self {
        TypeTag::Nominal(ValueKind::String)
    }
}

impl TypeTag {
    /// Parses a textual tag. `string` and `boolean` map to their dedicated
    /// tags, everything else is left for registry lookup.
    pub fn from_name(name: &str) -> Self {
        match name {
            "string" => TypeTag::Nominal(ValueKind::String),
            "boolean" | "bool" => TypeTag::Boolean,
            other => TypeTag::Named(other.to_string()),
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, TypeTag::Boolean)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Boolean => f.write_str("boolean"),
            TypeTag::Nominal(kind) => write!(f, "{kind}"),
            TypeTag::Named(name) => f.write_str(name),
        }
    }
}

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Validation predicate plus description for one type.
#[derive(Clone)]
pub struct TypeDef {
    description: String,
    predicate: Predicate,
}

impl TypeDef {
    /// Creates a type from an arbitrary predicate.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_params_core::{TypeDef, Value};
    ///
    /// let port = TypeDef::new("a port number", |v| {
    ///     v.as_i64().is_some_and(|n| (1..=65535).contains(&n))
    /// });
    /// assert!(port.accepts(&Value::from(8080)));
    /// assert!(!port.accepts(&Value::from(0)));
    /// ```
    pub fn new(
        description: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// `true or false`.
    pub fn boolean() -> Self {
        Self::new("true or false", |v| matches!(v, Value::Bool(_)))
    }

    /// "is an instance of" check against a single [`ValueKind`].
    pub fn nominal(kind: ValueKind) -> Self {
        Self::new(format!("an instance of {kind}"), move |v| v.kind() == kind)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn accepts(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }
}

impl fmt::Debug for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDef")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Closed, registration-extensible table of textual type tags.
///
/// The default registry knows `string`, `boolean`, `integer`, `float`,
/// `numeric`, `symbol`, `array` and `map`.
///
/// # Examples
///
/// ```
/// use command_params_core::{TypeDef, TypeRegistry, TypeTag, Value};
///
/// let mut types = TypeRegistry::default();
/// types.register("even", TypeDef::new("an even integer", |v| {
///     v.as_i64().is_some_and(|n| n % 2 == 0)
/// }));
///
/// let def = types.lookup(&TypeTag::from_name("even")).unwrap();
/// assert!(def.accepts(&Value::from(4)));
/// assert_eq!(def.description(), "an even integer");
///
/// let integer = types.lookup(&TypeTag::from_name("integer")).unwrap();
/// assert_eq!(integer.description(), "an instance of Integer");
/// ```
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    named: HashMap<String, TypeDef>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let mut named = HashMap::new();
        named.insert("string".to_string(), TypeDef::nominal(ValueKind::String));
        named.insert("boolean".to_string(), TypeDef::boolean());
        named.insert("integer".to_string(), TypeDef::nominal(ValueKind::Integer));
        named.insert("float".to_string(), TypeDef::nominal(ValueKind::Float));
        named.insert(
            "numeric".to_string(),
            TypeDef::new("an instance of Numeric", |v| {
                matches!(v, Value::Integer(_) | Value::Float(_))
            }),
        );
        named.insert("symbol".to_string(), TypeDef::nominal(ValueKind::Symbol));
        named.insert("array".to_string(), TypeDef::nominal(ValueKind::Array));
        named.insert("map".to_string(), TypeDef::nominal(ValueKind::Map));
        Self { named }
    }
}

impl TypeRegistry {
    /// Registers (or replaces) a textual tag.
    pub fn register(&mut self, name: impl Into<String>, def: TypeDef) {
        self.named.insert(name.into(), def);
    }

    /// Returns `true` if `name` is a registered textual tag.
    pub fn contains(&self, name: &str) -> bool {
        self.named.contains_key(name)
    }

    /// Resolves a tag to its definition.
    ///
    /// Boolean and nominal tags always resolve; named tags resolve only if
    /// registered.
    pub fn lookup(&self, tag: &TypeTag) -> Option<TypeDef> {
        match tag {
            TypeTag::Boolean => Some(TypeDef::boolean()),
            TypeTag::Nominal(kind) => Some(TypeDef::nominal(*kind)),
            TypeTag::Named(name) => self.named.get(name).cloned(),
        }
    }

    /// Returns all registered textual tags, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.named.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
