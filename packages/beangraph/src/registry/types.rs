//! Types shared by the type registry and the instantiator.

use std::any::Any;
use std::fmt;

/// A live bean instance.
///
/// Instances are owned by whoever holds the box; nested beans are owned by
/// the collection they were assigned to.
pub type Instance = Box<dyn Any + Send + Sync>;

/// A resolved reference to a registered type name.
///
/// Only obtainable through `TypeRegistry::resolve`, so holding one means
/// the name was known when the document was built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef {
    name: String,
}

impl TypeRef {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The qualified type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The last segment of the qualified name.
    ///
    /// # Examples
    /// ```
    /// use beangraph::registry::TypeRegistry;
    ///
    /// let mut registry = TypeRegistry::new();
    /// registry
    ///     .register_reference(["org.example.dao.DeadlockLoserException"])
    ///     .unwrap();
    /// let type_ref = registry.resolve("org.example.dao.DeadlockLoserException").unwrap();
    /// assert_eq!(type_ref.simple_name(), "DeadlockLoserException");
    /// ```
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Declared type of a bean property, which selects the coercion rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// A string.
    Text,
    /// An array of strings.
    TextArray,
    /// An array of non-textual elements.
    Array(ElementKind),
    /// A boolean.
    Boolean,
    /// A reference to a type by name.
    TypeRef,
    /// Any other type. Carries the Rust type name for error messages.
    Other(&'static str),
}

/// Element type of a non-textual array property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Nested beans of the given Rust type.
    Bean(&'static str),
    /// Type references.
    TypeRef,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::TextArray => f.write_str("text array"),
            Self::Array(ElementKind::Bean(type_name)) => write!(f, "array of {type_name}"),
            Self::Array(ElementKind::TypeRef) => f.write_str("array of type references"),
            Self::Boolean => f.write_str("boolean"),
            Self::TypeRef => f.write_str("type reference"),
            Self::Other(type_name) => f.write_str(type_name),
        }
    }
}

/// A value coerced to a property's declared type, ready for its setter.
pub enum Value {
    Text(String),
    TextArray(Vec<String>),
    Array(Vec<Element>),
    Boolean(bool),
    TypeRef(TypeRef),
}

/// One element of a non-textual array value.
pub enum Element {
    Instance(Instance),
    TypeRef(TypeRef),
}

impl Value {
    /// Short description used in mismatch messages.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::TextArray(_) => "text array",
            Self::Array(_) => "array",
            Self::Boolean(_) => "boolean",
            Self::TypeRef(_) => "type reference",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::TextArray(items) => f.debug_tuple("TextArray").field(items).finish(),
            Self::Array(elements) => f
                .debug_struct("Array")
                .field("len", &elements.len())
                .finish(),
            Self::Boolean(value) => f.debug_tuple("Boolean").field(value).finish(),
            Self::TypeRef(type_ref) => f.debug_tuple("TypeRef").field(type_ref).finish(),
        }
    }
}
