//! Instantiation of bean descriptors through the type registry.
//!
//! Coercion is driven by the declared kind of the target property. The
//! document's shape (scalar or list) only matters once the kind is known.

use std::any::Any;

use crate::config::{validate_type_name, BuildOptions, ARRAY_DELIMITER};
use crate::descriptor::{BeanDescriptor, ListEntry, PropertyDescriptor};
use crate::error::{BeanGraphError, ErrorKind, Result};
use crate::registry::{Element, ElementKind, Instance, PropertyKind, TypeRef, TypeRegistry, Value};

/// Creates live instances from bean descriptors.
///
/// # Examples
/// ```
/// use beangraph::config::BuildOptions;
/// use beangraph::descriptor::{BeanDescriptor, PropertyDescriptor};
/// use beangraph::instantiate::Instantiator;
/// use beangraph::registry::{BeanType, TypeRegistry};
///
/// #[derive(Default)]
/// struct Codes {
///     duplicate_key: Vec<String>,
/// }
///
/// let mut registry = TypeRegistry::new();
/// registry
///     .register(
///         BeanType::<Codes>::new("org.example.Codes")
///             .text_array("duplicateKeyCodes", |c, v| c.duplicate_key = v),
///     )
///     .unwrap();
///
/// let bean = BeanDescriptor::new("derby", "org.example.Codes")
///     .with_property(PropertyDescriptor::scalar("duplicateKeyCodes", "23505,40001"));
/// let instance = Instantiator::new(&registry, BuildOptions::default())
///     .instantiate(&bean)
///     .unwrap();
///
/// let codes = instance.downcast::<Codes>().unwrap();
/// assert_eq!(codes.duplicate_key, vec!["23505", "40001"]);
/// ```
pub struct Instantiator<'r> {
    registry: &'r TypeRegistry,
    options: BuildOptions,
}

impl<'r> Instantiator<'r> {
    #[must_use]
    pub fn new(registry: &'r TypeRegistry, options: BuildOptions) -> Self {
        Self { registry, options }
    }

    /// Instantiate a bean and apply all of its properties.
    ///
    /// Properties the type does not declare are ignored.
    ///
    /// # Arguments
    /// * `bean` - Descriptor of the bean to build
    ///
    /// # Returns
    /// The populated instance, owning any nested beans
    ///
    /// # Errors
    /// Fails on the first unresolvable type, failing factory, unsupported
    /// property type or failing setter, including inside nested beans.
    pub fn instantiate(&self, bean: &BeanDescriptor) -> Result<Instance> {
        self.instantiate_at(bean, 0)
    }

    /// Coerce a property descriptor to a declared property kind.
    ///
    /// # Arguments
    /// * `kind` - Declared kind of the target property
    /// * `property` - Property as written in the document
    ///
    /// # Returns
    /// The coerced value, or `None` when a textual property has no scalar,
    /// in which case the property is left unset
    ///
    /// # Errors
    /// See [`Instantiator::instantiate`].
    pub fn resolve_value(
        &self,
        kind: PropertyKind,
        property: &PropertyDescriptor,
    ) -> Result<Option<Value>> {
        self.resolve_at(kind, property, 0)
    }

    fn instantiate_at(&self, bean: &BeanDescriptor, depth: usize) -> Result<Instance> {
        if depth > self.options.max_depth {
            return Err(BeanGraphError::new(
                ErrorKind::NestingTooDeep,
                format!("nested beans exceed the maximum depth of {}", self.options.max_depth),
            )
            .in_bean(&bean.id));
        }

        self.populate(bean, depth).map_err(|err| err.in_bean(&bean.id))
    }

    fn populate(&self, bean: &BeanDescriptor, depth: usize) -> Result<Instance> {
        validate_type_name(&bean.type_name)?;
        let bean_type = self.registry.bean_type(&bean.type_name)?;

        let mut instance = bean_type.construct().map_err(|source| {
            BeanGraphError::with_source(
                ErrorKind::InstantiationFailure,
                format!("constructing '{}' failed: {source}", bean.type_name),
                source,
            )
        })?;

        for property in &bean.properties {
            let Some(def) = bean_type.property(&property.name) else {
                tracing::debug!(
                    bean = %bean.id,
                    property = %property.name,
                    "Ignoring property not declared by type"
                );
                continue;
            };

            let Some(value) = self.resolve_at(def.kind(), property, depth)? else {
                continue;
            };

            let target: &mut dyn Any = instance.as_mut();
            def.apply(target, value)
                .map_err(|source| BeanGraphError::setter_failed(&property.name, source))?;

            tracing::debug!(
                bean = %bean.id,
                property = %property.name,
                kind = %def.kind(),
                "Applied property"
            );
        }

        tracing::debug!(bean = %bean.id, class = %bean.type_name, depth, "Instantiated bean");
        Ok(instance)
    }

    fn resolve_at(
        &self,
        kind: PropertyKind,
        property: &PropertyDescriptor,
        depth: usize,
    ) -> Result<Option<Value>> {
        let name = property.name.as_str();

        let value = match kind {
            PropertyKind::Text => match &property.value {
                Some(text) => Value::Text(text.clone()),
                None => return Ok(None),
            },
            PropertyKind::TextArray => Value::TextArray(text_array(property)?),
            PropertyKind::Array(element_kind) => {
                let entries = property.list.as_deref().ok_or_else(|| {
                    BeanGraphError::assignment(name, format!("{kind} requires a <list>"))
                })?;
                let elements = entries
                    .iter()
                    .enumerate()
                    .map(|(index, entry)| {
                        self.resolve_element(element_kind, name, index, entry, depth)
                    })
                    .collect::<Result<Vec<_>>>()?;
                Value::Array(elements)
            }
            PropertyKind::Boolean => {
                Value::Boolean(property.value.as_deref().is_some_and(parse_bool))
            }
            PropertyKind::TypeRef => {
                let type_name = property.value.as_deref().ok_or_else(|| {
                    BeanGraphError::new(
                        ErrorKind::UnknownType,
                        format!("property '{name}' has no type name"),
                    )
                })?;
                Value::TypeRef(self.resolve_type(type_name)?)
            }
            PropertyKind::Other(type_name) => {
                return Err(BeanGraphError::unsupported_property(name, type_name));
            }
        };

        Ok(Some(value))
    }

    fn resolve_element(
        &self,
        element_kind: ElementKind,
        property: &str,
        index: usize,
        entry: &ListEntry,
        depth: usize,
    ) -> Result<Element> {
        match (entry, element_kind) {
            (ListEntry::Bean(bean), _) => {
                Ok(Element::Instance(self.instantiate_at(bean, depth + 1)?))
            }
            (ListEntry::Value(name), ElementKind::TypeRef) => {
                Ok(Element::TypeRef(self.resolve_type(name)?))
            }
            (ListEntry::Value(text), ElementKind::Bean(type_name)) => {
                Err(BeanGraphError::assignment(
                    property,
                    format!("entry {index} ('{text}') cannot be stored in an array of {type_name}"),
                ))
            }
        }
    }

    fn resolve_type(&self, name: &str) -> Result<TypeRef> {
        validate_type_name(name)?;
        self.registry
            .resolve(name)
            .ok_or_else(|| BeanGraphError::unknown_type(name))
    }
}

/// Textual array from a list container, or from the comma shorthand.
fn text_array(property: &PropertyDescriptor) -> Result<Vec<String>> {
    match (&property.list, &property.value) {
        (Some(entries), _) => entries
            .iter()
            .map(|entry| match entry {
                ListEntry::Value(text) => Ok(text.clone()),
                ListEntry::Bean(bean) => Err(BeanGraphError::assignment(
                    &property.name,
                    format!("list entry '{}' is a bean, expected text", bean.id),
                )),
            })
            .collect(),
        (None, Some(value)) => Ok(split_values(value)),
        (None, None) => Err(BeanGraphError::assignment(
            &property.name,
            "text array requires a value or a <list>",
        )),
    }
}

/// Split the comma shorthand of a textual array.
///
/// Values are not trimmed. Trailing empty elements are dropped, but a
/// value without any delimiter is always a single element.
///
/// # Examples
/// ```
/// use beangraph::instantiate::split_values;
///
/// assert_eq!(split_values("23505,40001"), vec!["23505", "40001"]);
/// assert_eq!(split_values("a,,b,,"), vec!["a", "", "b"]);
/// assert_eq!(split_values(""), vec![""]);
/// assert!(split_values(",,").is_empty());
/// ```
#[must_use]
pub fn split_values(value: &str) -> Vec<String> {
    if !value.contains(ARRAY_DELIMITER) {
        return vec![value.to_string()];
    }

    let mut items: Vec<String> = value.split(ARRAY_DELIMITER).map(str::to_string).collect();
    while items.last().is_some_and(String::is_empty) {
        items.pop();
    }
    items
}

/// Parse a boolean leniently: `true` in any case, everything else is false.
#[must_use]
pub fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}
