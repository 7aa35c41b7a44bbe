//! End-to-end integration tests for the bean graph builder.
//!
//! Tests the complete pipeline from raw document bytes to populated
//! beans, using fixture documents and the bundled SQL error codes.

use std::fs;
use std::path::Path;

use beangraph::descriptor::to_yaml;
use beangraph::error_codes::{default_error_codes, find_for_product};
use beangraph::registry::{BeanType, TypeRef, TypeRegistry};
use beangraph::{build_registry, read_descriptors, BeanGraphBuilder, BuildOptions, ErrorKind};
use pretty_assertions::assert_eq;

#[derive(Debug, Default, Clone, PartialEq)]
struct DataSource {
    url: Option<String>,
    read_only: bool,
    tags: Vec<String>,
    driver: Option<TypeRef>,
    validation_query: Option<String>,
    replicas: Vec<DataSource>,
}

/// Load fixture file content.
fn load_fixture(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

/// Send builder logs to the test output when `RUST_LOG` is set.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry
        .register(
            BeanType::<DataSource>::new("org.example.jdbc.DataSource")
                .text("url", |ds, url| ds.url = Some(url))
                .try_text("validationQuery", |ds, query| {
                    if !query.trim_start().to_ascii_uppercase().starts_with("SELECT") {
                        return Err(format!("'{query}' is not a query").into());
                    }
                    ds.validation_query = Some(query);
                    Ok(())
                })
                .boolean("readOnly", |ds, flag| ds.read_only = flag)
                .text_array("tags", |ds, tags| ds.tags = tags)
                .type_ref("driver", |ds, driver| ds.driver = Some(driver))
                .bean_array("replicas", |ds, replicas: Vec<DataSource>| ds.replicas = replicas)
                .declare::<u32>("poolSize"),
        )
        .expect("DataSource type name is valid");
    registry
        .register_reference(["org.example.jdbc.H2Driver"])
        .expect("driver type name is valid");
    registry
}

// =============================================================================
// Fixture documents
// =============================================================================

#[test]
fn test_fixture_builds_every_bean() {
    init_tracing();
    let beans = build_registry(&load_fixture("datasources.xml"), &registry())
        .expect("Failed to build fixture");

    assert_eq!(beans.len(), 3);
    assert_eq!(beans.ids(), vec!["plain", "primary", "replicas"]);
}

#[test]
fn test_scalar_and_coerced_properties() {
    let beans = build_registry(&load_fixture("datasources.xml"), &registry()).unwrap();
    let primary = beans.get::<DataSource>("primary").expect("primary bean");

    assert_eq!(primary.url.as_deref(), Some("jdbc:h2:mem:primary"));
    assert!(primary.read_only, "'TRUE' should coerce to true");
    assert_eq!(primary.tags, vec!["orders", "billing"]);
    assert_eq!(
        primary.driver.as_ref().map(TypeRef::name),
        Some("org.example.jdbc.H2Driver")
    );
}

#[test]
fn test_list_order_and_nested_beans() {
    let beans = build_registry(&load_fixture("datasources.xml"), &registry()).unwrap();
    let replicas = beans.get::<DataSource>("replicas").expect("replicas bean");

    assert_eq!(replicas.url.as_deref(), Some("jdbc:h2:mem:replicas"));
    assert_eq!(replicas.tags, vec!["zeta", "alpha", "mid"]);

    let urls: Vec<_> = replicas
        .replicas
        .iter()
        .map(|replica| replica.url.as_deref())
        .collect();
    assert_eq!(urls, vec![Some("jdbc:h2:mem:replica-1"), Some("jdbc:h2:mem:replica-2")]);
    assert!(!replicas.replicas[1].read_only, "'yes' is not a true value");

    // Nested beans are owned by their parent, not registered by id
    assert!(!beans.contains("replica-2"));
}

#[test]
fn test_bean_without_properties_keeps_defaults() {
    let beans = build_registry(&load_fixture("datasources.xml"), &registry()).unwrap();
    assert_eq!(beans.get::<DataSource>("plain"), Some(&DataSource::default()));
}

#[test]
fn test_missing_class_is_malformed() {
    let err = build_registry(&load_fixture("missing_class.xml"), &registry()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedDocument);
    assert!(err.message().contains("'class'"));
}

#[test]
fn test_external_entity_is_not_fetched() {
    let beans = build_registry(&load_fixture("external_entity.xml"), &registry())
        .expect("External entities must not fail the build");
    let leaky = beans.get::<DataSource>("leaky").unwrap();

    assert_eq!(leaky.url.as_deref(), Some("beforeafter"));
}

#[test]
fn test_descriptors_render_as_yaml() {
    let descriptors = read_descriptors(&load_fixture("datasources.xml")).unwrap();
    let yaml = to_yaml(&descriptors).unwrap();

    assert!(yaml.contains("id: primary"));
    assert!(yaml.contains("class: org.example.jdbc.DataSource"));
}

// =============================================================================
// Inline documents
// =============================================================================

#[test]
fn test_round_trip_single_value() {
    let xml = br#"<beans>
        <bean id="a" class="org.example.jdbc.DataSource">
            <property name="url" value="hello"/>
        </bean>
    </beans>"#;

    let beans = build_registry(xml, &registry()).unwrap();
    assert_eq!(beans.get::<DataSource>("a").unwrap().url.as_deref(), Some("hello"));
}

#[test]
fn test_empty_beans_document() {
    let beans = build_registry(b"<beans></beans>", &registry()).unwrap();
    assert!(beans.is_empty());
}

#[test]
fn test_missing_id_is_malformed() {
    let xml = br#"<beans><bean class="org.example.jdbc.DataSource"/></beans>"#;
    let err = build_registry(xml, &registry()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedDocument);
}

#[test]
fn test_wrong_root_is_malformed() {
    let xml = br#"<objects><bean id="a" class="org.example.jdbc.DataSource"/></objects>"#;
    let err = build_registry(xml, &registry()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedDocument);
}

#[test]
fn test_unregistered_class() {
    let xml = br#"<beans><bean id="a" class="org.example.Missing"/></beans>"#;
    let err = build_registry(xml, &registry()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownType);
}

#[test]
fn test_unsupported_property_type() {
    let xml = br#"<beans>
        <bean id="a" class="org.example.jdbc.DataSource">
            <property name="poolSize" value="10"/>
        </bean>
    </beans>"#;

    let err = build_registry(xml, &registry()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedPropertyType);
    assert!(err.message().contains("poolSize"));
}

#[test]
fn test_rejecting_setter_fails_build() {
    let xml = br#"<beans>
        <bean id="ok" class="org.example.jdbc.DataSource">
            <property name="validationQuery" value="select 1"/>
        </bean>
        <bean id="bad" class="org.example.jdbc.DataSource">
            <property name="validationQuery" value="DROP TABLE orders"/>
        </bean>
    </beans>"#;

    let err = build_registry(xml, &registry()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PropertyAssignmentFailure);
    assert!(err.message().starts_with("bean 'bad': cannot assign property 'validationQuery'"));

    let cause = std::error::Error::source(&err).expect("setter error is kept as source");
    assert_eq!(cause.to_string(), "'DROP TABLE orders' is not a query");
}

#[test]
fn test_unknown_type_reference() {
    let xml = br#"<beans>
        <bean id="a" class="org.example.jdbc.DataSource">
            <property name="driver" value="org.example.jdbc.MissingDriver"/>
        </bean>
    </beans>"#;

    let err = build_registry(xml, &registry()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownType);
}

#[test]
fn test_duplicate_ids_keep_last() {
    let xml = br#"<beans>
        <bean id="a" class="org.example.jdbc.DataSource"><property name="url" value="first"/></bean>
        <bean id="a" class="org.example.jdbc.DataSource"><property name="url" value="second"/></bean>
    </beans>"#;

    let beans = build_registry(xml, &registry()).unwrap();
    assert_eq!(beans.len(), 1);
    assert_eq!(beans.get::<DataSource>("a").unwrap().url.as_deref(), Some("second"));
}

#[test]
fn test_nesting_limit() {
    let registry = registry();
    let builder =
        BeanGraphBuilder::new(&registry).with_options(BuildOptions::new().with_max_depth(0));

    let err = builder.build(&load_fixture("datasources.xml")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NestingTooDeep);
    assert!(err.message().starts_with("bean 'replicas'"));
}

#[test]
fn test_concurrent_builds_share_registry() {
    let registry = registry();
    let input = load_fixture("datasources.xml");

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| build_registry(&input, &registry).map(|beans| beans.len())))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 3);
        }
    });
}

// =============================================================================
// Bundled SQL error codes
// =============================================================================

#[test]
fn test_default_error_codes() {
    init_tracing();
    let codes = default_error_codes().expect("Bundled error codes must load");

    assert_eq!(codes.len(), 10);
    let derby = &codes["Derby"];
    assert!(derby.use_sql_state_for_translation);
    assert_eq!(derby.duplicate_key_codes, vec!["23505"]);
}

#[test]
fn test_default_descriptors_count() {
    let xml = include_bytes!("../resources/sql-error-codes.xml");
    let descriptors = read_descriptors(xml).unwrap();
    assert_eq!(descriptors.len(), 10);
}

#[test]
fn test_lookup_by_product_name() {
    let codes = default_error_codes().unwrap();

    let postgres = find_for_product(&codes, "PostgreSQL").unwrap();
    assert_eq!(postgres.deadlock_loser_codes, vec!["40P01"]);

    let hsql = find_for_product(&codes, "HSQL Database Engine").unwrap();
    assert_eq!(hsql.duplicate_key_codes, vec!["-104"]);
}
