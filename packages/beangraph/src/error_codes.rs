//! SQL error-code holders and their bundled defaults.
//!
//! Each database gets one `SQLErrorCodes` bean listing the vendor codes
//! that map to a category of data-access failure. The bundled document
//! covers the common databases; applications can load their own
//! document with [`from_bytes`].

use std::collections::HashMap;

use crate::builder::BeanGraphBuilder;
use crate::error::Result;
use crate::registry::{BeanType, TypeRef, TypeRegistry};

/// Type name of [`SqlErrorCodes`] beans.
pub const SQL_ERROR_CODES_TYPE: &str = "org.springframework.jdbc.support.SQLErrorCodes";

/// Type name of [`CustomSqlErrorCodesTranslation`] beans.
pub const CUSTOM_TRANSLATION_TYPE: &str =
    "org.springframework.jdbc.support.CustomSQLErrorCodesTranslation";

/// Exception and translator types that documents may name.
pub const KNOWN_REFERENCE_TYPES: &[&str] = &[
    "org.springframework.dao.DataAccessException",
    "org.springframework.dao.CannotAcquireLockException",
    "org.springframework.dao.CannotSerializeTransactionException",
    "org.springframework.dao.DataAccessResourceFailureException",
    "org.springframework.dao.DataIntegrityViolationException",
    "org.springframework.dao.DeadlockLoserDataAccessException",
    "org.springframework.dao.DuplicateKeyException",
    "org.springframework.dao.PermissionDeniedDataAccessException",
    "org.springframework.dao.TransientDataAccessResourceException",
    "org.springframework.jdbc.BadSqlGrammarException",
    "org.springframework.jdbc.InvalidResultSetAccessException",
    "org.springframework.jdbc.support.SQLErrorCodeSQLExceptionTranslator",
    "org.springframework.jdbc.support.SQLExceptionSubclassTranslator",
    "org.springframework.jdbc.support.SQLStateSQLExceptionTranslator",
];

const DEFAULT_ERROR_CODES: &[u8] = include_bytes!("../resources/sql-error-codes.xml");

/// Error codes of one database product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlErrorCodes {
    pub database_product_names: Vec<String>,
    pub use_sql_state_for_translation: bool,
    pub bad_sql_grammar_codes: Vec<String>,
    pub invalid_result_set_access_codes: Vec<String>,
    pub duplicate_key_codes: Vec<String>,
    pub data_integrity_violation_codes: Vec<String>,
    pub permission_denied_codes: Vec<String>,
    pub data_access_resource_failure_codes: Vec<String>,
    pub transient_data_access_resource_codes: Vec<String>,
    pub cannot_acquire_lock_codes: Vec<String>,
    pub deadlock_loser_codes: Vec<String>,
    pub cannot_serialize_transaction_codes: Vec<String>,
    pub custom_translations: Vec<CustomSqlErrorCodesTranslation>,
    pub custom_sql_exception_translator_class: Option<TypeRef>,
}

impl SqlErrorCodes {
    /// Check whether this entry applies to a database product name.
    ///
    /// Names compare case-insensitively. A name ending in `*` matches any
    /// product name starting with the part before it.
    ///
    /// # Examples
    /// ```
    /// use beangraph::error_codes::SqlErrorCodes;
    ///
    /// let codes = SqlErrorCodes {
    ///     database_product_names: vec!["DB2*".to_string()],
    ///     ..Default::default()
    /// };
    /// assert!(codes.matches_product("DB2/LINUXX8664"));
    /// assert!(codes.matches_product("db2"));
    /// assert!(!codes.matches_product("Derby"));
    /// ```
    #[must_use]
    pub fn matches_product(&self, product_name: &str) -> bool {
        self.database_product_names
            .iter()
            .any(|pattern| match pattern.strip_suffix('*') {
                Some(prefix) => product_name
                    .get(..prefix.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(prefix)),
                None => pattern.eq_ignore_ascii_case(product_name),
            })
    }
}

/// Vendor codes translated to a caller-chosen exception type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomSqlErrorCodesTranslation {
    pub error_codes: Vec<String>,
    pub exception_class: Option<TypeRef>,
}

/// Create a type registry for error-code documents.
///
/// # Errors
/// Only fails if one of the built-in type names is invalid.
pub fn create_error_codes_registry() -> Result<TypeRegistry> {
    let mut registry = TypeRegistry::new();

    registry.register(
        BeanType::<SqlErrorCodes>::new(SQL_ERROR_CODES_TYPE)
            .text("databaseProductName", |c, name| {
                c.database_product_names = vec![name];
            })
            .text_array("databaseProductNames", |c, v| c.database_product_names = v)
            .boolean("useSqlStateForTranslation", |c, v| {
                c.use_sql_state_for_translation = v;
            })
            .text_array("badSqlGrammarCodes", |c, v| c.bad_sql_grammar_codes = v)
            .text_array("invalidResultSetAccessCodes", |c, v| {
                c.invalid_result_set_access_codes = v;
            })
            .text_array("duplicateKeyCodes", |c, v| c.duplicate_key_codes = v)
            .text_array("dataIntegrityViolationCodes", |c, v| {
                c.data_integrity_violation_codes = v;
            })
            .text_array("permissionDeniedCodes", |c, v| c.permission_denied_codes = v)
            .text_array("dataAccessResourceFailureCodes", |c, v| {
                c.data_access_resource_failure_codes = v;
            })
            .text_array("transientDataAccessResourceCodes", |c, v| {
                c.transient_data_access_resource_codes = v;
            })
            .text_array("cannotAcquireLockCodes", |c, v| c.cannot_acquire_lock_codes = v)
            .text_array("deadlockLoserCodes", |c, v| c.deadlock_loser_codes = v)
            .text_array("cannotSerializeTransactionCodes", |c, v| {
                c.cannot_serialize_transaction_codes = v;
            })
            .bean_array("customTranslations", |c, v: Vec<CustomSqlErrorCodesTranslation>| {
                c.custom_translations = v;
            })
            .type_ref("customSqlExceptionTranslatorClass", |c, v| {
                c.custom_sql_exception_translator_class = Some(v);
            }),
    )?;

    registry.register(
        BeanType::<CustomSqlErrorCodesTranslation>::new(CUSTOM_TRANSLATION_TYPE)
            .text_array("errorCodes", |t, v| t.error_codes = v)
            .type_ref("exceptionClass", |t, v| t.exception_class = Some(v)),
    )?;

    registry.register_reference(KNOWN_REFERENCE_TYPES.iter().copied())?;
    Ok(registry)
}

/// Build the error codes declared in a document, keyed by bean id.
///
/// # Errors
/// Returns the first build failure, or `UnknownType` if a top-level bean
/// is not an `SQLErrorCodes`.
pub fn from_bytes(input: &[u8]) -> Result<HashMap<String, SqlErrorCodes>> {
    let registry = create_error_codes_registry()?;
    BeanGraphBuilder::new(&registry)
        .build(input)?
        .into_typed::<SqlErrorCodes>()
}

/// Load the bundled error codes of the well-known databases.
///
/// # Errors
/// Only fails if the bundled document is broken.
pub fn default_error_codes() -> Result<HashMap<String, SqlErrorCodes>> {
    from_bytes(DEFAULT_ERROR_CODES)
}

/// Find the error codes for a database product.
///
/// An entry whose id equals the product name wins; otherwise the first
/// entry, by id, whose product names match.
#[must_use]
pub fn find_for_product<'a>(
    codes: &'a HashMap<String, SqlErrorCodes>,
    product_name: &str,
) -> Option<&'a SqlErrorCodes> {
    if let Some(exact) = codes.get(product_name) {
        return Some(exact);
    }

    let mut ids: Vec<&String> = codes.keys().collect();
    ids.sort_unstable();
    ids.into_iter()
        .filter_map(|id| codes.get(id))
        .find(|candidate| candidate.matches_product(product_name))
}
