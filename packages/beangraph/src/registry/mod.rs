//! Type registry system replacing runtime reflection.
//!
//! Bean types are registered up front with a factory and a table of typed
//! property setters. The instantiator looks types up by their qualified
//! name and applies coerced values through those setters.

mod bean_type;
mod core;
mod types;

pub use bean_type::{BeanType, PropertyDef, RegisteredType};
pub use core::TypeRegistry;
pub use types::{Element, ElementKind, Instance, PropertyKind, TypeRef, Value};
