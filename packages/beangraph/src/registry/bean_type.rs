//! Typed description of a constructible bean type.
//!
//! A `BeanType<T>` pairs a factory for `T` with a table of named, typed
//! setters. Registering it erases `T`, leaving closures that operate on
//! `&mut dyn Any` and check the concrete type at call time.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use super::types::{Element, ElementKind, Instance, PropertyKind, TypeRef, Value};
use crate::error::BoxError;

/// Erased setter. Errors are returned as causes; the caller adds context.
type Setter = Box<dyn Fn(&mut dyn Any, Value) -> Result<(), BoxError> + Send + Sync>;

/// Erased factory.
type Factory = Box<dyn Fn() -> Result<Instance, BoxError> + Send + Sync>;

/// A writable property of a registered type.
pub struct PropertyDef {
    kind: PropertyKind,
    setter: Option<Setter>,
}

impl PropertyDef {
    /// The declared type of the property.
    #[must_use]
    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    /// Apply a coerced value to an instance.
    ///
    /// Fails if the property has no setter (an undeclared kind), the
    /// instance is not of the registered type, the value does not fit, or
    /// the setter itself rejects the value.
    pub fn apply(&self, target: &mut dyn Any, value: Value) -> Result<(), BoxError> {
        match &self.setter {
            Some(setter) => setter(target, value),
            None => Err(format!("no setter for values of type {}", self.kind).into()),
        }
    }
}

impl fmt::Debug for PropertyDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDef")
            .field("kind", &self.kind)
            .field("has_setter", &self.setter.is_some())
            .finish()
    }
}

/// Builder for a constructible bean type.
///
/// # Examples
/// ```
/// use beangraph::registry::{BeanType, TypeRegistry};
///
/// #[derive(Default)]
/// struct Pool {
///     name: Option<String>,
///     fair: bool,
/// }
///
/// let mut registry = TypeRegistry::new();
/// registry
///     .register(
///         BeanType::<Pool>::new("org.example.Pool")
///             .text("name", |pool, name| pool.name = Some(name))
///             .boolean("fair", |pool, fair| pool.fair = fair),
///     )
///     .unwrap();
/// assert!(registry.is_constructible("org.example.Pool"));
/// ```
pub struct BeanType<T> {
    name: String,
    factory: Factory,
    properties: HashMap<String, PropertyDef>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> BeanType<T>
where
    T: Default + Any + Send + Sync,
{
    /// Describe a type constructed through `Default`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_factory(name, || Ok(T::default()))
    }
}

impl<T> BeanType<T>
where
    T: Any + Send + Sync,
{
    /// Describe a type constructed by a fallible factory.
    #[must_use]
    pub fn with_factory<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Box::new(move || factory().map(|bean| Box::new(bean) as Instance)),
            properties: HashMap::new(),
            _marker: PhantomData,
        }
    }

    /// Declare a string property.
    #[must_use]
    pub fn text<F>(self, name: impl Into<String>, set: F) -> Self
    where
        F: Fn(&mut T, String) + Send + Sync + 'static,
    {
        self.try_text(name, infallible(set))
    }

    /// Declare a string property whose setter may reject the value.
    ///
    /// # Examples
    /// ```
    /// use beangraph::registry::{BeanType, TypeRegistry};
    ///
    /// #[derive(Default)]
    /// struct Pool {
    ///     url: String,
    /// }
    ///
    /// let mut registry = TypeRegistry::new();
    /// registry
    ///     .register(BeanType::<Pool>::new("org.example.Pool").try_text("url", |pool, url| {
    ///         if !url.starts_with("jdbc:") {
    ///             return Err(format!("'{url}' is not a JDBC url").into());
    ///         }
    ///         pool.url = url;
    ///         Ok(())
    ///     }))
    ///     .unwrap();
    /// ```
    #[must_use]
    pub fn try_text<F>(self, name: impl Into<String>, set: F) -> Self
    where
        F: Fn(&mut T, String) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.setter(name, PropertyKind::Text, move |bean, value| match value {
            Value::Text(text) => set(bean, text),
            other => Err(mismatch("text", &other)),
        })
    }

    /// Declare a string array property.
    #[must_use]
    pub fn text_array<F>(self, name: impl Into<String>, set: F) -> Self
    where
        F: Fn(&mut T, Vec<String>) + Send + Sync + 'static,
    {
        self.try_text_array(name, infallible(set))
    }

    /// Declare a string array property whose setter may reject the value.
    #[must_use]
    pub fn try_text_array<F>(self, name: impl Into<String>, set: F) -> Self
    where
        F: Fn(&mut T, Vec<String>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.setter(name, PropertyKind::TextArray, move |bean, value| match value {
            Value::TextArray(items) => set(bean, items),
            other => Err(mismatch("text array", &other)),
        })
    }

    /// Declare an array of nested beans of type `E`.
    #[must_use]
    pub fn bean_array<E, F>(self, name: impl Into<String>, set: F) -> Self
    where
        E: Any + Send + Sync,
        F: Fn(&mut T, Vec<E>) + Send + Sync + 'static,
    {
        self.try_bean_array(name, infallible(set))
    }

    /// Declare an array of nested beans whose setter may reject the value.
    #[must_use]
    pub fn try_bean_array<E, F>(self, name: impl Into<String>, set: F) -> Self
    where
        E: Any + Send + Sync,
        F: Fn(&mut T, Vec<E>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let kind = PropertyKind::Array(ElementKind::Bean(type_name::<E>()));
        self.setter(name, kind, move |bean, value| {
            let elements = match value {
                Value::Array(elements) => elements,
                other => return Err(mismatch("array", &other)),
            };
            let items = elements
                .into_iter()
                .enumerate()
                .map(|(index, element)| match element {
                    Element::Instance(instance) => instance
                        .downcast::<E>()
                        .map(|item| *item)
                        .map_err(|_| format!("entry {index} is not a {}", type_name::<E>())),
                    Element::TypeRef(type_ref) => Err(format!(
                        "entry {index} is type reference '{type_ref}', expected {}",
                        type_name::<E>()
                    )),
                })
                .collect::<Result<Vec<E>, String>>()?;
            set(bean, items)
        })
    }

    /// Declare an array of type references.
    #[must_use]
    pub fn type_ref_array<F>(self, name: impl Into<String>, set: F) -> Self
    where
        F: Fn(&mut T, Vec<TypeRef>) + Send + Sync + 'static,
    {
        self.try_type_ref_array(name, infallible(set))
    }

    /// Declare an array of type references whose setter may reject the value.
    #[must_use]
    pub fn try_type_ref_array<F>(self, name: impl Into<String>, set: F) -> Self
    where
        F: Fn(&mut T, Vec<TypeRef>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let kind = PropertyKind::Array(ElementKind::TypeRef);
        self.setter(name, kind, move |bean, value| {
            let elements = match value {
                Value::Array(elements) => elements,
                other => return Err(mismatch("array", &other)),
            };
            let items = elements
                .into_iter()
                .enumerate()
                .map(|(index, element)| match element {
                    Element::TypeRef(type_ref) => Ok(type_ref),
                    Element::Instance(_) => {
                        Err(format!("entry {index} is a bean, expected a type reference"))
                    }
                })
                .collect::<Result<Vec<_>, String>>()?;
            set(bean, items)
        })
    }

    /// Declare a boolean property.
    #[must_use]
    pub fn boolean<F>(self, name: impl Into<String>, set: F) -> Self
    where
        F: Fn(&mut T, bool) + Send + Sync + 'static,
    {
        self.try_boolean(name, infallible(set))
    }

    /// Declare a boolean property whose setter may reject the value.
    #[must_use]
    pub fn try_boolean<F>(self, name: impl Into<String>, set: F) -> Self
    where
        F: Fn(&mut T, bool) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.setter(name, PropertyKind::Boolean, move |bean, value| match value {
            Value::Boolean(flag) => set(bean, flag),
            other => Err(mismatch("boolean", &other)),
        })
    }

    /// Declare a type-reference property.
    #[must_use]
    pub fn type_ref<F>(self, name: impl Into<String>, set: F) -> Self
    where
        F: Fn(&mut T, TypeRef) + Send + Sync + 'static,
    {
        self.try_type_ref(name, infallible(set))
    }

    /// Declare a type-reference property whose setter may reject the value.
    #[must_use]
    pub fn try_type_ref<F>(self, name: impl Into<String>, set: F) -> Self
    where
        F: Fn(&mut T, TypeRef) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.setter(name, PropertyKind::TypeRef, move |bean, value| match value {
            Value::TypeRef(type_ref) => set(bean, type_ref),
            other => Err(mismatch("type reference", &other)),
        })
    }

    /// Declare a property of type `V`, for which no coercion rule exists.
    ///
    /// Documents may not assign it: doing so fails with
    /// `UnsupportedPropertyType`.
    #[must_use]
    pub fn declare<V: ?Sized>(mut self, name: impl Into<String>) -> Self {
        self.properties.insert(
            name.into(),
            PropertyDef {
                kind: PropertyKind::Other(type_name::<V>()),
                setter: None,
            },
        );
        self
    }

    fn setter<F>(mut self, name: impl Into<String>, kind: PropertyKind, set: F) -> Self
    where
        F: Fn(&mut T, Value) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let setter: Setter = Box::new(
            move |target: &mut dyn Any, value: Value| -> Result<(), BoxError> {
                let bean = target
                    .downcast_mut::<T>()
                    .ok_or_else(|| format!("instance is not a {}", type_name::<T>()))?;
                set(bean, value)
            },
        );
        self.properties.insert(
            name.into(),
            PropertyDef {
                kind,
                setter: Some(setter),
            },
        );
        self
    }

    pub(crate) fn into_registered(self) -> (String, RegisteredType) {
        let registered = RegisteredType {
            rust_type: type_name::<T>(),
            factory: self.factory,
            properties: self.properties,
        };
        (self.name, registered)
    }
}

/// Lift an infallible setter into the fallible form.
fn infallible<T: 'static, V: 'static>(
    set: impl Fn(&mut T, V) + Send + Sync + 'static,
) -> impl Fn(&mut T, V) -> Result<(), BoxError> + Send + Sync + 'static {
    move |bean: &mut T, value: V| {
        set(bean, value);
        Ok(())
    }
}

fn mismatch(expected: &str, actual: &Value) -> BoxError {
    format!("expected {expected} value, got {}", actual.describe()).into()
}

/// A type erased bean type held by the registry.
pub struct RegisteredType {
    rust_type: &'static str,
    factory: Factory,
    properties: HashMap<String, PropertyDef>,
}

impl RegisteredType {
    /// Construct a fresh, unpopulated instance.
    pub fn construct(&self) -> Result<Instance, BoxError> {
        (self.factory)()
    }

    /// Look up a writable property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    /// Names of all writable properties.
    #[must_use]
    pub fn property_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.properties.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The Rust type instances are created as.
    #[must_use]
    pub fn rust_type(&self) -> &'static str {
        self.rust_type
    }
}

impl fmt::Debug for RegisteredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredType")
            .field("rust_type", &self.rust_type)
            .field("properties", &self.property_names())
            .finish()
    }
}
