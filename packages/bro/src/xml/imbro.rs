//! Structural parser for IMBRO XML documents.
//!
//! Turns an arbitrary BRO XML document into a [`ParsedValue`] tree that
//! mirrors the element hierarchy. Namespaces are dropped from every key and
//! `parameters` elements are flattened into `(name, flag)` pairs.
//!
//! # Example
//!
//! ```
//! use bro::xml::{ImbroFile, ParsedValue};
//!
//! let xml = r#"<root><a>1</a><parameters><ja>ja</ja><nee>nee</nee></parameters></root>"#;
//! let parsed = ImbroFile::new(xml).parse().unwrap();
//!
//! assert_eq!(parsed.get("a").and_then(ParsedValue::as_str), Some("1"));
//! assert_eq!(
//!     parsed.get("parameters").and_then(ParsedValue::as_parameters),
//!     Some(&[("ja".to_string(), true), ("nee".to_string(), false)][..])
//! );
//! ```

use std::fs;
use std::path::Path;

use indexmap::map::Entry;
use indexmap::IndexMap;
use roxmltree::Node;
use serde::Serialize;

use super::utils::{element_children, get_tag_name, local_name, parse_document};
use crate::error::Result;

/// Tag whose children are flattened into a parameter list.
pub const PARAMETERS_TAG: &str = "parameters";

/// The only text that marks a parameter as present.
const AFFIRMATIVE: &str = "ja";

/// Nested value produced by [`ImbroFile::parse`].
///
/// Serializes to plain JSON/YAML: scalars as strings or null, records as
/// objects, parameter lists as arrays of `[name, flag]` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParsedValue {
    /// Text of a leaf element, `None` when the element is empty.
    Scalar(Option<String>),

    /// Child elements keyed by local tag name, in first-occurrence order.
    Record(IndexMap<String, ParsedValue>),

    /// Flattened `parameters` element. Keeps document order and duplicates.
    ParameterList(Vec<(String, bool)>),

    /// Repeated sibling tags, only produced by [`ParseMode::Aggregate`].
    Sequence(Vec<ParsedValue>),
}

impl ParsedValue {
    /// Look up a key in a record.
    pub fn get(&self, key: &str) -> Option<&ParsedValue> {
        self.as_record()?.get(key)
    }

    /// Follow a slash-separated path of keys through nested records.
    ///
    /// Segments may carry a `{uri}` namespace, which is ignored the same way
    /// the parser ignores it.
    ///
    /// # Examples
    /// ```
    /// use bro::xml::ImbroFile;
    ///
    /// let parsed = ImbroFile::new("<r><a><b>x</b></a></r>").parse().unwrap();
    /// assert_eq!(parsed.pointer("a/b").and_then(|v| v.as_str()), Some("x"));
    /// assert_eq!(parsed.pointer("{urn:any}a/b").and_then(|v| v.as_str()), Some("x"));
    /// assert!(parsed.pointer("a/missing").is_none());
    /// ```
    pub fn pointer(&self, path: &str) -> Option<&ParsedValue> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |value, segment| value.get(local_name(segment)))
    }

    /// Text of a non-empty scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(text) => text.as_deref(),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&IndexMap<String, ParsedValue>> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_parameters(&self) -> Option<&[(String, bool)]> {
        match self {
            Self::ParameterList(parameters) => Some(parameters),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ParsedValue]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// True for a scalar without text.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(None))
    }
}

/// How repeated sibling tags outside `parameters` are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// A later sibling replaces an earlier one with the same tag.
    #[default]
    LastWriteWins,

    /// Repeated siblings are collected into a [`ParsedValue::Sequence`].
    Aggregate,
}

/// An IMBRO XML document held as raw bytes.
///
/// Construction never fails; the content is only read when parsed, and
/// every parse walks the document again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImbroFile {
    content: Vec<u8>,
}

impl ImbroFile {
    /// Wrap raw XML content.
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Read an IMBRO XML file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read(path.as_ref())?;
        Ok(Self::new(content))
    }

    /// The raw XML bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Parse with last-write-wins semantics for repeated tags.
    ///
    /// # Errors
    /// `XmlEncoding` for non UTF-8 content, `XmlParse` for malformed XML.
    pub fn parse(&self) -> Result<ParsedValue> {
        self.parse_with(ParseMode::LastWriteWins)
    }

    /// Parse using the given handling of repeated tags.
    pub fn parse_with(&self, mode: ParseMode) -> Result<ParsedValue> {
        let doc = parse_document(&self.content)?;
        Ok(parse_node(doc.root_element(), mode))
    }
}

/// Recursively convert an element into a [`ParsedValue`].
fn parse_node(node: Node<'_, '_>, mode: ParseMode) -> ParsedValue {
    let mut children = element_children(node).peekable();
    if children.peek().is_none() {
        return ParsedValue::Scalar(node.text().map(str::to_string));
    }

    let mut record = IndexMap::new();
    for child in children {
        let tag = get_tag_name(child);
        let value = if tag == PARAMETERS_TAG {
            ParsedValue::ParameterList(parse_parameters(child))
        } else {
            parse_node(child, mode)
        };
        insert(&mut record, tag, value, mode);
    }
    ParsedValue::Record(record)
}

/// Flatten the children of a `parameters` element.
fn parse_parameters(node: Node<'_, '_>) -> Vec<(String, bool)> {
    element_children(node)
        .map(|parameter| {
            (
                get_tag_name(parameter).to_string(),
                is_affirmative(parameter.text()),
            )
        })
        .collect()
}

/// Exact match on `ja`. Text is compared verbatim, so `"1"`, `"Ja"` and
/// `" ja "` are all false.
fn is_affirmative(text: Option<&str>) -> bool {
    text == Some(AFFIRMATIVE)
}

fn insert(
    record: &mut IndexMap<String, ParsedValue>,
    tag: &str,
    value: ParsedValue,
    mode: ParseMode,
) {
    match record.entry(tag.to_string()) {
        Entry::Vacant(entry) => {
            entry.insert(value);
        }
        Entry::Occupied(mut entry) => match mode {
            ParseMode::LastWriteWins => {
                tracing::debug!(tag, "Repeated tag, keeping last value");
                entry.insert(value);
            }
            ParseMode::Aggregate => match entry.get_mut() {
                ParsedValue::Sequence(items) => items.push(value),
                existing => {
                    let first = std::mem::replace(existing, ParsedValue::Sequence(Vec::new()));
                    *existing = ParsedValue::Sequence(vec![first, value]);
                }
            },
        },
    }
}
