//! Type registry mapping qualified type names to factories.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use super::bean_type::{BeanType, RegisteredType};
use super::types::TypeRef;
use crate::config::validate_type_name;
use crate::error::{BeanGraphError, ErrorKind, Result};

enum TypeEntry {
    /// A type beans can be instantiated as.
    Bean(RegisteredType),
    /// A name type-reference properties may point at, but not constructible.
    Reference,
}

/// Registry of types known to the builder.
///
/// The registry is filled at startup and only read during builds, so a
/// shared `&TypeRegistry` can serve concurrent builds.
pub struct TypeRegistry {
    types: HashMap<String, TypeEntry>,
}

impl TypeRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Register a constructible bean type.
    ///
    /// Registering a name twice replaces the earlier entry.
    ///
    /// # Errors
    /// Returns `UnknownType` if the name is not a dotted type name, since
    /// documents could never refer to it.
    pub fn register<T: Any + Send + Sync>(&mut self, bean_type: BeanType<T>) -> Result<()> {
        let (name, registered) = bean_type.into_registered();
        validate_type_name(&name)?;
        self.types.insert(name, TypeEntry::Bean(registered));
        Ok(())
    }

    /// Register names that may be referenced but not instantiated.
    ///
    /// Names already registered as bean types are left untouched.
    ///
    /// # Errors
    /// Returns `UnknownType` for the first invalid name. Nothing is
    /// registered in that case.
    pub fn register_reference(
        &mut self,
        names: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<()> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        for name in &names {
            validate_type_name(name)?;
        }

        for name in names {
            self.types.entry(name).or_insert(TypeEntry::Reference);
        }
        Ok(())
    }

    /// Resolve a type name for a type-reference property.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<TypeRef> {
        self.types
            .get_key_value(name)
            .map(|(name, _)| TypeRef::new(name.as_str()))
    }

    /// Look up a constructible bean type.
    ///
    /// # Errors
    /// Returns `UnknownType` if the name is not registered, or is only
    /// registered as a reference.
    pub fn bean_type(&self, name: &str) -> Result<&RegisteredType> {
        match self.types.get(name) {
            Some(TypeEntry::Bean(registered)) => Ok(registered),
            Some(TypeEntry::Reference) => Err(BeanGraphError::new(
                ErrorKind::UnknownType,
                format!("type '{name}' has no registered factory"),
            )),
            None => Err(BeanGraphError::unknown_type(name)),
        }
    }

    /// Check whether a name is known at all.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Check whether a name can be instantiated.
    #[must_use]
    pub fn is_constructible(&self, name: &str) -> bool {
        matches!(self.types.get(name), Some(TypeEntry::Bean(_)))
    }

    /// Return all registered names, sorted.
    #[must_use]
    pub fn registered_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.registered_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Dummy;

    #[test]
    fn test_registry_register_and_get() {
        let mut registry = TypeRegistry::new();
        registry.register(BeanType::<Dummy>::new("test.Dummy")).unwrap();

        assert!(registry.bean_type("test.Dummy").is_ok());
        assert!(registry.is_constructible("test.Dummy"));
        assert_eq!(
            registry.bean_type("test.Dummy").unwrap().rust_type(),
            std::any::type_name::<Dummy>()
        );
    }

    #[test]
    fn test_registry_unknown_type() {
        let registry = TypeRegistry::new();

        let err = registry.bean_type("test.Missing").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownType);
        assert!(err.to_string().contains("test.Missing"));
    }

    #[test]
    fn test_reference_is_resolvable_but_not_constructible() {
        let mut registry = TypeRegistry::new();
        registry.register_reference(["test.Marker"]).unwrap();

        assert!(registry.contains("test.Marker"));
        assert!(!registry.is_constructible("test.Marker"));
        assert_eq!(registry.resolve("test.Marker").unwrap().name(), "test.Marker");

        let err = registry.bean_type("test.Marker").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownType);
        assert!(err.to_string().contains("no registered factory"));
    }

    #[test]
    fn test_reference_does_not_shadow_bean_type() {
        let mut registry = TypeRegistry::new();
        registry.register(BeanType::<Dummy>::new("test.Dummy")).unwrap();
        registry.register_reference(["test.Dummy"]).unwrap();

        assert!(registry.is_constructible("test.Dummy"));
    }

    #[test]
    fn test_bean_types_are_resolvable() {
        let mut registry = TypeRegistry::new();
        registry.register(BeanType::<Dummy>::new("test.Dummy")).unwrap();

        assert!(registry.resolve("test.Dummy").is_some());
        assert!(registry.resolve("test.Other").is_none());
    }

    #[test]
    fn test_registered_types_sorted() {
        let mut registry = TypeRegistry::new();
        registry.register(BeanType::<Dummy>::new("b.Second")).unwrap();
        registry.register_reference(["a.First", "c.Third"]).unwrap();

        assert_eq!(registry.registered_types(), vec!["a.First", "b.Second", "c.Third"]);
    }

    #[test]
    fn test_register_rejects_rust_path() {
        let mut registry = TypeRegistry::new();

        let err = registry.register(BeanType::<Dummy>::new("app::Dummy")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownType);
        assert!(err.to_string().contains("app::Dummy"));
        assert!(!registry.contains("app::Dummy"));
    }

    #[test]
    fn test_register_reference_is_all_or_nothing() {
        let mut registry = TypeRegistry::new();

        let err = registry
            .register_reference(["test.Valid", "not a type"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownType);
        assert!(registry.registered_types().is_empty());
    }
}
