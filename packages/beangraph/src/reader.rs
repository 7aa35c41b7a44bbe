//! Safe XML document reading.
//!
//! DTDs are accepted because real bean documents carry a
//! `<!DOCTYPE beans PUBLIC ...>` line, but nothing outside the input is
//! ever read: the external DTD subset is skipped by the parser and every
//! external general entity resolves to an empty resource. Parameter
//! entities (`%name;`) are not supported by `roxmltree`; documents using
//! them fail with `MalformedDocument`.

use roxmltree::{Document, ParsingOptions};

use crate::config::BuildOptions;
use crate::error::Result;

/// UTF-8 byte order mark.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode raw input bytes to text.
///
/// A leading UTF-8 byte order mark is dropped.
///
/// # Errors
/// Returns `MalformedDocument` if the input is not valid UTF-8.
pub fn decode(input: &[u8]) -> Result<&str> {
    let input = input.strip_prefix(UTF8_BOM).unwrap_or(input);
    Ok(std::str::from_utf8(input)?)
}

/// Entity resolver that never performs I/O.
///
/// Returning an empty resource (rather than `None`) keeps references to
/// the entity valid; they simply expand to nothing.
fn suppress_external_entity<'input>(
    public_id: Option<&str>,
    uri: &str,
) -> std::result::Result<Option<&'input str>, String> {
    tracing::warn!(
        public_id = public_id.unwrap_or_default(),
        uri,
        "Suppressed external entity, resolving to empty content"
    );
    Ok(Some(""))
}

/// Parse document text into a DOM tree.
///
/// # Errors
/// Returns `MalformedDocument` if the text is not well-formed XML or the
/// node limit from `options` is exceeded.
///
/// # Examples
/// ```
/// use beangraph::config::BuildOptions;
/// use beangraph::reader::parse_document;
///
/// let xml = r#"<!DOCTYPE beans [<!ENTITY secret SYSTEM "file:///etc/passwd">]>
/// <beans><bean id="a" class="A">&secret;</bean></beans>"#;
/// let doc = parse_document(xml, &BuildOptions::default()).unwrap();
/// let bean = doc.root_element().first_element_child().unwrap();
/// assert_eq!(bean.text(), None);
/// ```
pub fn parse_document<'input>(
    text: &'input str,
    options: &BuildOptions,
) -> Result<Document<'input>> {
    let parsing_options = ParsingOptions {
        allow_dtd: true,
        nodes_limit: options.nodes_limit,
        entity_resolver: Some(&suppress_external_entity),
    };

    Ok(Document::parse_with_options(text, parsing_options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::xml::text_content;

    #[test]
    fn test_decode_strips_bom() {
        let input = b"\xEF\xBB\xBF<beans/>";
        assert_eq!(decode(input).unwrap(), "<beans/>");
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let err = decode(b"<beans>\xFF</beans>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDocument);
    }

    #[test]
    fn test_parse_malformed_document() {
        let err = parse_document("<beans><bean></beans>", &BuildOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDocument);
    }

    #[test]
    fn test_parse_accepts_public_doctype() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE beans PUBLIC "-//SPRING//DTD BEAN 2.0//EN" "http://www.springframework.org/dtd/spring-beans-2.0.dtd">
<beans/>"#;
        let doc = parse_document(xml, &BuildOptions::default()).unwrap();
        assert_eq!(doc.root_element().tag_name().name(), "beans");
    }

    #[test]
    fn test_external_entity_expands_to_nothing() {
        let xml = r#"<!DOCTYPE beans [
  <!ENTITY passwd SYSTEM "file:///etc/passwd">
  <!ENTITY remote PUBLIC "-//EVIL//X" "http://example.invalid/payload.xml">
]>
<beans><value>before&passwd;&remote;after</value></beans>"#;
        let doc = parse_document(xml, &BuildOptions::default()).unwrap();
        let value = doc.root_element().first_element_child().unwrap();

        assert_eq!(text_content(value), "beforeafter");
    }

    #[test]
    fn test_external_parameter_entity_is_rejected() {
        // Parameter entities are not supported by the parser, so the document
        // fails instead of expanding them to nothing. No resource is read.
        let xml = r#"<!DOCTYPE beans [<!ENTITY % ext SYSTEM "http://example.invalid/ext.dtd"> %ext;]>
<beans/>"#;
        let err = parse_document(xml, &BuildOptions::default()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MalformedDocument);
        assert!(err.message().starts_with("XML parsing failed"));
    }

    #[test]
    fn test_internal_entity_still_expands() {
        let xml = r#"<!DOCTYPE beans [<!ENTITY code "23505">]><beans><value>&code;</value></beans>"#;
        let doc = parse_document(xml, &BuildOptions::default()).unwrap();
        let value = doc.root_element().first_element_child().unwrap();

        assert_eq!(text_content(value), "23505");
    }

    #[test]
    fn test_nodes_limit() {
        let xml = "<beans><bean/><bean/><bean/><bean/></beans>";
        let options = BuildOptions::default().with_nodes_limit(3);

        let err = parse_document(xml, &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDocument);
    }
}
