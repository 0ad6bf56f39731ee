//! XML utility functions for navigating IMBRO documents.

use roxmltree::{Document, Node, ParsingOptions};

use crate::error::Result;

/// Parse raw bytes into a document with the options used for all BRO XML.
///
/// A leading byte order mark is skipped and DTDs are accepted.
pub fn parse_document(content: &[u8]) -> Result<Document<'_>> {
    let text = std::str::from_utf8(content)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    Ok(Document::parse_with_options(text, options)?)
}

/// Strip a namespace URI from a Clark-notation tag (`{uri}local`).
///
/// Tags without a namespace are returned unchanged.
///
/// # Examples
/// ```
/// use bro::xml::local_name;
///
/// assert_eq!(local_name("{http://www.broservices.nl/xsd/cptcommon/1.1}parameters"), "parameters");
/// assert_eq!(local_name("finalDepth"), "finalDepth");
/// ```
pub fn local_name(tag: &str) -> &str {
    if tag.contains('{') {
        tag.rsplit('}').next().unwrap_or(tag)
    } else {
        tag
    }
}

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use bro::xml::get_tag_name;
///
/// let xml = r#"<cpt:finalDepth xmlns:cpt="http://www.broservices.nl/xsd/cptcommon/1.1">9.6</cpt:finalDepth>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(get_tag_name(doc.root_element()), "finalDepth");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Get all element children of a node.
///
/// Text, comments and processing instructions are skipped.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

/// Find the first child element with the given tag name.
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    element_children(node).find(|child| get_tag_name(*child) == tag)
}

/// Find all child elements with the given tag name.
pub fn find_children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    element_children(node).filter(move |child| get_tag_name(*child) == tag)
}

/// Find a descendant element matching a path of tag names.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use bro::xml::find_by_path;
///
/// let xml = r#"<CPT_C><finalDepth><value>9.6</value></finalDepth></CPT_C>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// let value = find_by_path(doc.root_element(), "finalDepth/value");
/// assert_eq!(value.and_then(|n| n.text()), Some("9.6"));
/// ```
pub fn find_by_path<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Option<Node<'a, 'input>> {
    let mut current = node;
    for part in path.split('/') {
        current = find_child(current, part)?;
    }
    Some(current)
}

/// Get the text content of a node, trimmed.
///
/// Returns an empty string if the node has no text.
pub fn get_text(node: Node<'_, '_>) -> String {
    node.text()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}
