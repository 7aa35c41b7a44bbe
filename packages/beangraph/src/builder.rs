//! Registry builder: bytes in, populated beans out.
//!
//! Runs the whole pipeline (reader, descriptor mapping, instantiation)
//! and stops at the first failure. A partially built map is never
//! returned.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;

use crate::config::BuildOptions;
use crate::descriptor::{to_beans, BeanDescriptor};
use crate::error::{BeanGraphError, ErrorKind, Result};
use crate::instantiate::Instantiator;
use crate::reader::{decode, parse_document};
use crate::registry::{Instance, TypeRegistry};

/// Beans built from one document, keyed by id.
#[derive(Default)]
pub struct BeanMap {
    beans: HashMap<String, Instance>,
}

impl BeanMap {
    #[must_use]
    pub fn len(&self) -> usize {
        self.beans.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.beans.contains_key(id)
    }

    /// Bean ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.beans.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Borrow a bean as `T`. Returns `None` if absent or of another type.
    #[must_use]
    pub fn get<T: Any>(&self, id: &str) -> Option<&T> {
        self.beans.get(id).and_then(|bean| bean.downcast_ref::<T>())
    }

    /// Take a bean out of the map, untyped.
    pub fn remove(&mut self, id: &str) -> Option<Instance> {
        self.beans.remove(id)
    }

    /// Convert into a map of concrete beans.
    ///
    /// # Errors
    /// Returns `UnknownType` naming the first bean that is not a `T`.
    pub fn into_typed<T: Any>(self) -> Result<HashMap<String, T>> {
        self.beans
            .into_iter()
            .map(|(id, bean)| match bean.downcast::<T>() {
                Ok(bean) => Ok((id, *bean)),
                Err(_) => Err(BeanGraphError::new(
                    ErrorKind::UnknownType,
                    format!("bean '{id}' is not a {}", type_name::<T>()),
                )),
            })
            .collect()
    }

    #[must_use]
    pub fn into_inner(self) -> HashMap<String, Instance> {
        self.beans
    }

    fn insert(&mut self, id: String, bean: Instance) {
        if self.beans.insert(id.clone(), bean).is_some() {
            tracing::warn!(bean = %id, "Duplicate bean id, keeping the later definition");
        }
    }
}

impl fmt::Debug for BeanMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanMap").field("ids", &self.ids()).finish()
    }
}

/// Builds bean maps against a type registry.
///
/// Holds no state between builds; one builder can serve any number of
/// documents, from any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct BeanGraphBuilder<'r> {
    registry: &'r TypeRegistry,
    options: BuildOptions,
}

impl<'r> BeanGraphBuilder<'r> {
    #[must_use]
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            options: BuildOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Read the bean descriptors of a document without instantiating them.
    ///
    /// # Errors
    /// Returns `MalformedDocument` if the input is not a bean document.
    pub fn read_descriptors(&self, input: &[u8]) -> Result<Vec<BeanDescriptor>> {
        read_with_options(input, &self.options)
    }

    /// Build the bean map of a document.
    ///
    /// # Arguments
    /// * `input` - Raw document bytes (UTF-8, optionally with a BOM)
    ///
    /// # Returns
    /// Every top-level bean keyed by id
    ///
    /// # Errors
    /// Returns the first failure of any stage.
    pub fn build(&self, input: &[u8]) -> Result<BeanMap> {
        let descriptors = self.read_descriptors(input)?;
        self.build_descriptors(&descriptors)
    }

    /// Build the bean map of a document read fully from `reader`.
    ///
    /// # Errors
    /// Returns `MalformedDocument` if reading fails, otherwise as [`Self::build`].
    pub fn build_from_reader(&self, mut reader: impl Read) -> Result<BeanMap> {
        let mut input = Vec::new();
        reader.read_to_end(&mut input)?;
        self.build(&input)
    }

    /// Instantiate already mapped descriptors.
    ///
    /// # Errors
    /// Returns the first instantiation failure.
    pub fn build_descriptors(&self, descriptors: &[BeanDescriptor]) -> Result<BeanMap> {
        let instantiator = Instantiator::new(self.registry, self.options);
        let mut beans = BeanMap::default();

        for descriptor in descriptors {
            let bean = instantiator.instantiate(descriptor)?;
            beans.insert(descriptor.id.clone(), bean);
        }

        tracing::info!(beans = beans.len(), "Built bean registry");
        Ok(beans)
    }
}

/// Read bean descriptors from a document with default options.
///
/// # Arguments
/// * `input` - Raw document bytes (UTF-8, optionally with a BOM)
///
/// # Returns
/// Top-level bean descriptors in document order; no type is resolved
///
/// # Errors
/// Returns `MalformedDocument` if the input is not a bean document.
///
/// # Examples
/// ```
/// let xml = br#"<beans>
///   <bean id="H2" class="org.example.Codes"/>
///   <bean id="HSQL" class="org.example.Codes"/>
/// </beans>"#;
///
/// let beans = beangraph::read_descriptors(xml).unwrap();
/// assert_eq!(beans.len(), 2);
/// assert_eq!(beans[1].id, "HSQL");
/// ```
pub fn read_descriptors(input: &[u8]) -> Result<Vec<BeanDescriptor>> {
    read_with_options(input, &BuildOptions::default())
}

fn read_with_options(input: &[u8], options: &BuildOptions) -> Result<Vec<BeanDescriptor>> {
    let text = decode(input)?;
    let doc = parse_document(text, options)?;
    to_beans(&doc)
}

/// Build the bean map of a document with default options.
///
/// # Arguments
/// * `input` - Raw document bytes (UTF-8, optionally with a BOM)
/// * `registry` - Types the document's beans may be instantiated as
///
/// # Returns
/// Every top-level bean keyed by id, or an empty map for an empty document
///
/// # Errors
/// Returns the first failure of any stage. No partial map is returned.
pub fn build_registry(input: &[u8], registry: &TypeRegistry) -> Result<BeanMap> {
    BeanGraphBuilder::new(registry).build(input)
}
