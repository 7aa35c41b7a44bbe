//! Error types for the bean graph builder.
//!
//! Every failure surfaces as a single `BeanGraphError`. The `ErrorKind`
//! it carries tells diagnostics which pipeline stage gave up, but callers
//! are not expected to branch on it.

use std::fmt;

use thiserror::Error;

/// Boxed underlying cause attached to a `BeanGraphError`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which stage of the pipeline failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input is not well-formed or lacks a required structural field.
    MalformedDocument,
    /// A type name cannot be resolved or is not constructible.
    UnknownType,
    /// The factory of a resolved type failed.
    InstantiationFailure,
    /// A property's declared type has no coercion rule.
    UnsupportedPropertyType,
    /// Applying a coerced value through a setter failed.
    PropertyAssignmentFailure,
    /// Nested beans exceeded the configured depth.
    NestingTooDeep,
}

impl ErrorKind {
    /// Get the kind's name as used in log output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedDocument => "malformed document",
            Self::UnknownType => "unknown type",
            Self::InstantiationFailure => "instantiation failure",
            Self::UnsupportedPropertyType => "unsupported property type",
            Self::PropertyAssignmentFailure => "property assignment failure",
            Self::NestingTooDeep => "nesting too deep",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error returned by every public operation of this crate.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct BeanGraphError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl BeanGraphError {
    /// Create an error without an underlying cause.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create an error wrapping an underlying cause.
    #[must_use]
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedDocument, message)
    }

    pub fn unknown_type(type_name: &str) -> Self {
        Self::new(
            ErrorKind::UnknownType,
            format!("cannot resolve type '{type_name}'"),
        )
    }

    pub fn unsupported_property(property: &str, type_name: &str) -> Self {
        Self::new(
            ErrorKind::UnsupportedPropertyType,
            format!("property '{property}' has unsupported type {type_name}"),
        )
    }

    pub fn assignment(property: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::PropertyAssignmentFailure,
            format!("cannot assign property '{property}': {reason}"),
        )
    }

    /// A setter rejected its value. The setter's error is kept as `source`.
    pub fn setter_failed(property: &str, source: BoxError) -> Self {
        Self::with_source(
            ErrorKind::PropertyAssignmentFailure,
            format!("cannot assign property '{property}': {source}"),
            source,
        )
    }

    /// Prefix the message with the bean the failure occurred in.
    ///
    /// Nested failures accumulate a path, outermost bean first.
    #[must_use]
    pub fn in_bean(mut self, bean_id: &str) -> Self {
        self.message = format!("bean '{bean_id}': {}", self.message);
        self
    }

    /// The stage that failed.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The human-readable message, without the kind prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<roxmltree::Error> for BeanGraphError {
    fn from(err: roxmltree::Error) -> Self {
        Self::with_source(
            ErrorKind::MalformedDocument,
            format!("XML parsing failed: {err}"),
            err,
        )
    }
}

impl From<std::str::Utf8Error> for BeanGraphError {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::with_source(
            ErrorKind::MalformedDocument,
            format!("input is not valid UTF-8: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for BeanGraphError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(
            ErrorKind::MalformedDocument,
            format!("reading input failed: {err}"),
            err,
        )
    }
}

impl From<serde_yaml_ng::Error> for BeanGraphError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        Self::with_source(
            ErrorKind::MalformedDocument,
            format!("YAML serialization failed: {err}"),
            err,
        )
    }
}

/// Result type alias for bean graph operations.
pub type Result<T> = std::result::Result<T, BeanGraphError>;
