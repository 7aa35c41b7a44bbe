//! XML utility functions for navigating and extracting data from DOM trees.

use roxmltree::Node;

/// Get the tag name without namespace prefix.
///
/// Bean documents may declare a default namespace; matching always uses
/// the local name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use beangraph::xml::get_tag_name;
///
/// let xml = r#"<beans xmlns="http://example.com/beans"><bean/></beans>"#;
/// let doc = Document::parse(xml).unwrap();
/// let bean = doc.root_element().first_element_child().unwrap();
/// assert_eq!(get_tag_name(bean), "bean");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Check if a node is an element with a specific tag name.
pub fn has_tag(node: Node<'_, '_>, tag: &str) -> bool {
    node.is_element() && get_tag_name(node) == tag
}

/// Find the first child element with the given tag name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use beangraph::xml::find_child;
///
/// let xml = r#"<property><list/></property>"#;
/// let doc = Document::parse(xml).unwrap();
/// let root = doc.root_element();
///
/// assert!(find_child(root, "list").is_some());
/// assert!(find_child(root, "value").is_none());
/// ```
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| has_tag(*child, tag))
}

/// Find all child elements with the given tag name, in document order.
pub fn find_children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |child| has_tag(*child, tag))
}

/// Get all element children of a node.
///
/// Text nodes, comments and processing instructions are excluded.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

/// Concatenate the direct text children of a node, untrimmed.
///
/// CDATA sections and expanded entities arrive as text nodes, so
/// `<value>a &amp; <![CDATA[b]]></value>` yields `"a & b"`.
pub fn text_content(node: Node<'_, '_>) -> String {
    node.children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect()
}
