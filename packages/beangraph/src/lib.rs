//! Beangraph - Build object graphs from declarative XML bean documents.
//!
//! This crate reads a `<beans>` document, maps it to bean descriptors and
//! instantiates each bean through a registry of known types, coercing
//! property values to the types their setters declare.
//!
//! # Example
//!
//! ```
//! use beangraph::registry::{BeanType, TypeRegistry};
//!
//! #[derive(Default)]
//! struct Codes {
//!     duplicate_keys: Vec<String>,
//! }
//!
//! let mut registry = TypeRegistry::new();
//! registry
//!     .register(
//!         BeanType::<Codes>::new("org.example.Codes")
//!             .text_array("duplicateKeys", |codes, keys| codes.duplicate_keys = keys),
//!     )
//!     .unwrap();
//!
//! let xml = br#"<beans>
//!   <bean id="H2" class="org.example.Codes">
//!     <property name="duplicateKeys" value="23001,23505"/>
//!   </bean>
//! </beans>"#;
//!
//! let beans = beangraph::build_registry(xml, &registry).unwrap();
//! let h2 = beans.get::<Codes>("H2").unwrap();
//! assert_eq!(h2.duplicate_keys, vec!["23001", "23505"]);
//! ```
//!
//! # Architecture
//!
//! The builder is organized into several modules:
//!
//! - [`config`]: Document vocabulary, build options and name validation
//! - [`error`]: Error types and Result alias
//! - [`reader`]: Byte decoding and hardened XML parsing
//! - [`xml`]: XML utilities
//! - [`descriptor`]: Mapping documents to bean descriptors
//! - [`registry`]: Type registry standing in for reflection
//! - [`instantiate`]: Value coercion and bean instantiation
//! - [`builder`]: The end-to-end registry builder
//! - [`error_codes`]: SQL error-code beans and their bundled defaults

pub mod builder;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod error_codes;
pub mod instantiate;
pub mod reader;
pub mod registry;
pub mod xml;

// Re-export main functions
pub use builder::{build_registry, read_descriptors};

// Re-export commonly used items
pub use builder::{BeanGraphBuilder, BeanMap};
pub use config::BuildOptions;
pub use descriptor::{BeanDescriptor, ListEntry, PropertyDescriptor};
pub use error::{BeanGraphError, ErrorKind, Result};
pub use registry::{BeanType, Instance, TypeRef, TypeRegistry};
