//! Bean descriptor model and its mapping from XML.
//!
//! Descriptors are plain owned data: a bean document is mapped once, after
//! which the DOM (and the input text it borrows) can be dropped.
//!
//! A property keeps both its scalar and its list container. Which one is
//! used is decided later by the declared type of the target property, not
//! by what the document happened to contain.

use roxmltree::{Document, Node};
use serde::Serialize;

use crate::config::{
    BEANS_TAG, BEAN_TAG, CLASS_ATTR, ID_ATTR, LIST_TAG, NAME_ATTR, PROPERTY_TAG, VALUE_TAG,
};
use crate::error::{BeanGraphError, Result};
use crate::xml::{
    element_children, find_child, find_children, get_tag_name, has_tag, text_content,
};

/// Declarative description of one bean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BeanDescriptor {
    /// Bean identifier. Inner beans without an `id` get `<class>#<index>`.
    pub id: String,
    /// Qualified name of the type to instantiate.
    #[serde(rename = "class")]
    pub type_name: String,
    /// Property assignments in document order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyDescriptor>,
}

/// One named property assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyDescriptor {
    pub name: String,
    /// Scalar body: `value` attribute, `<value>` child or direct text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Entries of a `<list>` container, if one was present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<ListEntry>>,
}

/// Entry of a list container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListEntry {
    Value(String),
    Bean(BeanDescriptor),
}

impl BeanDescriptor {
    /// Create a descriptor without properties.
    #[must_use]
    pub fn new(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_name: type_name.into(),
            properties: Vec::new(),
        }
    }

    /// Add a property, builder style.
    #[must_use]
    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// Find a property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }
}

impl PropertyDescriptor {
    /// Property with a scalar body.
    #[must_use]
    pub fn scalar(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            list: None,
        }
    }

    /// Property with a list container.
    #[must_use]
    pub fn list(name: impl Into<String>, entries: Vec<ListEntry>) -> Self {
        Self {
            name: name.into(),
            value: None,
            list: Some(entries),
        }
    }

    /// Property with neither a scalar nor a list.
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            list: None,
        }
    }
}

/// Map a parsed document to bean descriptors.
///
/// The root element must be `<beans>`. A root without `<bean>` children
/// yields an empty list.
///
/// # Arguments
/// * `doc` - Parsed bean document
///
/// # Returns
/// Top-level bean descriptors in document order
///
/// # Errors
/// Returns `MalformedDocument` if the root is not `<beans>`, a top-level
/// bean lacks `id` or `class`, a nested bean lacks `class`, or a property
/// lacks `name`.
///
/// # Examples
/// ```
/// use beangraph::descriptor::to_beans;
///
/// let xml = r#"<beans><bean id="derby" class="org.example.Codes">
///   <property name="duplicateKeyCodes"><value>23505</value></property>
/// </bean></beans>"#;
/// let doc = roxmltree::Document::parse(xml).unwrap();
/// let beans = to_beans(&doc).unwrap();
///
/// assert_eq!(beans[0].id, "derby");
/// assert_eq!(beans[0].properties[0].value.as_deref(), Some("23505"));
/// ```
pub fn to_beans(doc: &Document<'_>) -> Result<Vec<BeanDescriptor>> {
    let root = doc.root_element();
    if !has_tag(root, BEANS_TAG) {
        return Err(BeanGraphError::malformed(format!(
            "expected root element <{BEANS_TAG}>, found <{}>",
            get_tag_name(root)
        )));
    }

    find_children(root, BEAN_TAG)
        .map(|node| map_bean(node, None))
        .collect()
}

/// Map a `<bean>` element.
///
/// `index` is the position inside the enclosing list for inner beans and
/// `None` for top-level beans, which must carry an `id`.
fn map_bean(node: Node<'_, '_>, index: Option<usize>) -> Result<BeanDescriptor> {
    let type_name = required_attribute(node, CLASS_ATTR)?;

    let id = match (node.attribute(ID_ATTR), index) {
        (Some(id), _) => id.to_string(),
        (None, Some(index)) => format!("{type_name}#{index}"),
        (None, None) => return Err(missing_attribute(node, ID_ATTR)),
    };

    let properties = find_children(node, PROPERTY_TAG)
        .map(map_property)
        .collect::<Result<Vec<_>>>()?;

    Ok(BeanDescriptor {
        id,
        type_name: type_name.to_string(),
        properties,
    })
}

/// Map a `<property>` element.
fn map_property(node: Node<'_, '_>) -> Result<PropertyDescriptor> {
    let name = required_attribute(node, NAME_ATTR)?;

    let value = match node.attribute(VALUE_TAG) {
        Some(value) => Some(value.to_string()),
        None => match find_child(node, VALUE_TAG) {
            Some(value) => Some(text_content(value)),
            None => Some(text_content(node)).filter(|text| !text.trim().is_empty()),
        },
    };

    let list = find_child(node, LIST_TAG).map(map_list).transpose()?;

    Ok(PropertyDescriptor {
        name: name.to_string(),
        value,
        list,
    })
}

/// Map the entries of a `<list>` container, keeping document order.
///
/// Children other than `<value>` and `<bean>` are ignored.
fn map_list(node: Node<'_, '_>) -> Result<Vec<ListEntry>> {
    let mut entries = Vec::new();

    for child in element_children(node) {
        match get_tag_name(child) {
            VALUE_TAG => entries.push(ListEntry::Value(text_content(child))),
            BEAN_TAG => {
                let bean = map_bean(child, Some(entries.len()))?;
                entries.push(ListEntry::Bean(bean));
            }
            other => {
                tracing::debug!(tag = other, "Ignoring unexpected element in <list>");
            }
        }
    }

    Ok(entries)
}

fn required_attribute<'a>(node: Node<'a, '_>, name: &str) -> Result<&'a str> {
    node.attribute(name)
        .ok_or_else(|| missing_attribute(node, name))
}

fn missing_attribute(node: Node<'_, '_>, name: &str) -> BeanGraphError {
    let pos = node.document().text_pos_at(node.range().start);
    BeanGraphError::malformed(format!(
        "<{}> at {pos} is missing required attribute '{name}'",
        get_tag_name(node)
    ))
}

/// Render descriptors as YAML, for tools that inspect structure only.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn to_yaml(beans: &[BeanDescriptor]) -> Result<String> {
    Ok(serde_yaml_ng::to_string(beans)?)
}
