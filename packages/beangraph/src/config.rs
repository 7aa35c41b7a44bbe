//! Document vocabulary, limits and build options.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{BeanGraphError, ErrorKind, Result};

/// Root element of a bean definition document.
pub const BEANS_TAG: &str = "beans";

/// Element describing one bean.
pub const BEAN_TAG: &str = "bean";

/// Element describing one property assignment.
pub const PROPERTY_TAG: &str = "property";

/// Wrapper element for list-valued properties.
pub const LIST_TAG: &str = "list";

/// Scalar value element (also used as an attribute name on `property`).
pub const VALUE_TAG: &str = "value";

/// Bean identifier attribute.
pub const ID_ATTR: &str = "id";

/// Bean type attribute.
pub const CLASS_ATTR: &str = "class";

/// Property name attribute.
pub const NAME_ATTR: &str = "name";

/// Delimiter for the comma shorthand on textual array properties.
pub const ARRAY_DELIMITER: char = ',';

/// Default maximum nesting depth of inner beans.
///
/// Top-level beans are at depth 0.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default maximum number of XML nodes accepted from one document.
pub const DEFAULT_NODES_LIMIT: u32 = 1_000_000;

/// Qualified type name: dot-separated identifiers, `$` allowed for inner types.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static TYPE_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(\.[A-Za-z_$][A-Za-z0-9_$]*)*$").expect("valid regex")
});

/// Check whether a string looks like a qualified type name.
///
/// # Examples
/// ```
/// use beangraph::config::is_valid_type_name;
///
/// assert!(is_valid_type_name("org.example.ErrorCodes"));
/// assert!(is_valid_type_name("org.example.Outer$Inner"));
/// assert!(!is_valid_type_name("org..example"));
/// assert!(!is_valid_type_name(""));
/// ```
#[must_use]
pub fn is_valid_type_name(name: &str) -> bool {
    TYPE_NAME_PATTERN.is_match(name)
}

/// Validate a qualified type name.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err` with kind `UnknownType` if the name cannot denote any type
pub fn validate_type_name(name: &str) -> Result<()> {
    if is_valid_type_name(name) {
        Ok(())
    } else {
        Err(BeanGraphError::new(
            ErrorKind::UnknownType,
            format!("'{name}' is not a valid type name"),
        ))
    }
}

/// Options controlling a single build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Maximum nesting depth of inner beans before failing with `NestingTooDeep`.
    pub max_depth: usize,
    /// Maximum number of XML nodes the reader accepts.
    pub nodes_limit: u32,
}

impl BuildOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_nodes_limit(mut self, nodes_limit: u32) -> Self {
        self.nodes_limit = nodes_limit;
        self
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            nodes_limit: DEFAULT_NODES_LIMIT,
        }
    }
}
