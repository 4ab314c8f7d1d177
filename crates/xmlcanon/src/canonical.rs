//! Canonical document model and the normalization algorithm
//!
//! Normalization rewrites a [`GenericTree`] into a fixed shape: every
//! element's children are represented as an array of records, never as a
//! bare object, regardless of how many times the element occurred in the
//! source. A tag that occurred once yields a one-element array; a tag that
//! occurred N times yields an array of length N, in document order. The one
//! exception is an empty root, which maps to the empty-string sentinel
//! (`{"Root": ""}`) rather than an empty array; that root-only special case
//! is part of the observable contract.
//!
//! `normalize` is a total, pure function over the generic-tree domain: it
//! never fails and has no side effects, so it is safe to call concurrently.
//! Its recursion depth equals the tree's nesting depth, which the parser
//! already bounds via [`Config::max_depth`](crate::xml::Config).

use indexmap::IndexMap;

use crate::tree::{GenericNode, GenericTree, GenericValue, TEXT_KEY};

/// The normalized output: a single root tag mapped to either the
/// empty-string sentinel or a sequence of records.
#[derive(Clone, Debug, PartialEq)]
pub struct CanonicalDocument {
    root: String,
    body: CanonicalBody,
}

/// Body of a canonical document.
#[derive(Clone, Debug, PartialEq)]
pub enum CanonicalBody {
    /// The root element was empty; serializes as `""`
    Empty,
    /// One record per root occurrence
    Records(Vec<CanonicalRecord>),
}

/// Ordered mapping from tag name to canonical value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CanonicalRecord {
    entries: IndexMap<String, CanonicalValue>,
}

/// A canonical value: scalar text, or an array of records. Never a bare
/// record.
#[derive(Clone, Debug, PartialEq)]
pub enum CanonicalValue {
    Scalar(String),
    Records(Vec<CanonicalRecord>),
}

impl CanonicalDocument {
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn body(&self) -> &CanonicalBody {
        &self.body
    }

    /// Serialize to a compact JSON string.
    pub fn to_json(&self) -> String {
        let mut out = String::new();
        out.push('{');
        write_json_string(&self.root, &mut out);
        out.push(':');
        match &self.body {
            CanonicalBody::Empty => out.push_str("\"\""),
            CanonicalBody::Records(records) => write_records(records, &mut out),
        }
        out.push('}');
        out
    }
}

impl CanonicalRecord {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, tag: impl Into<String>, value: CanonicalValue) {
        self.entries.insert(tag.into(), value);
    }

    pub fn get(&self, tag: &str) -> Option<&CanonicalValue> {
        self.entries.get(tag)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, CanonicalValue> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a CanonicalRecord {
    type Item = (&'a String, &'a CanonicalValue);
    type IntoIter = indexmap::map::Iter<'a, String, CanonicalValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Normalize a generic value under the given root tag.
///
/// An empty value maps to the sentinel body. Otherwise the value is reduced
/// to a node sequence (Single → one node, Repeated → as-is, a non-empty
/// Scalar → one `{#text: s}` node) and each node becomes one record.
pub fn normalize(root_tag: &str, value: &GenericValue) -> CanonicalDocument {
    let body = if value.is_empty() {
        CanonicalBody::Empty
    } else {
        CanonicalBody::Records(to_records(value))
    };
    CanonicalDocument {
        root: root_tag.to_string(),
        body,
    }
}

/// Normalize a whole tree. Equivalent to `normalize(&tree.root, &tree.value)`.
pub fn normalize_tree(tree: &GenericTree) -> CanonicalDocument {
    normalize(&tree.root, &tree.value)
}

/// One record per occurrence, in document order. The caller has already
/// ruled out the empty case.
fn to_records(value: &GenericValue) -> Vec<CanonicalRecord> {
    match value {
        GenericValue::Scalar(text) => {
            let mut record = CanonicalRecord::new();
            record.insert(TEXT_KEY, CanonicalValue::Scalar(text.clone()));
            vec![record]
        }
        GenericValue::Single(node) => vec![normalize_node(node)],
        GenericValue::Repeated(nodes) => nodes.iter().map(normalize_node).collect(),
    }
}

/// Build one canonical record from one generic node.
///
/// Scalars copy through verbatim. A Single child wraps its normalized form
/// in a one-element array. A Repeated child normalizes each sibling
/// independently and concatenates the results flat, so the array length
/// equals the occurrence count rather than nesting one-element arrays.
fn normalize_node(node: &GenericNode) -> CanonicalRecord {
    let mut record = CanonicalRecord::new();
    for (tag, value) in node {
        let normalized = match value {
            GenericValue::Scalar(text) => CanonicalValue::Scalar(text.clone()),
            GenericValue::Single(child) => CanonicalValue::Records(vec![normalize_node(child)]),
            GenericValue::Repeated(children) => {
                CanonicalValue::Records(children.iter().map(normalize_node).collect())
            }
        };
        record.insert(tag.clone(), normalized);
    }
    record
}

fn write_records(records: &[CanonicalRecord], out: &mut String) {
    out.push('[');
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_record(record, out);
    }
    out.push(']');
}

fn write_record(record: &CanonicalRecord, out: &mut String) {
    out.push('{');
    for (i, (tag, value)) in record.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_json_string(tag, out);
        out.push(':');
        match value {
            CanonicalValue::Scalar(text) => write_json_string(text, out),
            CanonicalValue::Records(records) => write_records(records, out),
        }
    }
    out.push('}');
}

fn write_json_string(input: &str, out: &mut String) {
    out.push('"');
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                out.push_str(&format!("\\u{:04x}", u32::from(c)));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(feature = "serde")]
mod serde_impls {
    use serde::ser::{SerializeMap, SerializeSeq};
    use serde::{Serialize, Serializer};

    use super::{CanonicalBody, CanonicalDocument, CanonicalRecord, CanonicalValue};

    impl Serialize for CanonicalDocument {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(1))?;
            match &self.body {
                CanonicalBody::Empty => map.serialize_entry(&self.root, "")?,
                CanonicalBody::Records(records) => map.serialize_entry(&self.root, records)?,
            }
            map.end()
        }
    }

    impl Serialize for CanonicalRecord {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (tag, value) in self {
                map.serialize_entry(tag, value)?;
            }
            map.end()
        }
    }

    impl Serialize for CanonicalValue {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Self::Scalar(text) => serializer.serialize_str(text),
                Self::Records(records) => {
                    let mut seq = serializer.serialize_seq(Some(records.len()))?;
                    for record in records {
                        seq.serialize_element(record)?;
                    }
                    seq.end()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::Parser;

    fn canonicalize(input: &str) -> CanonicalDocument {
        let doc = Parser::new(input.as_bytes()).parse().unwrap();
        normalize_tree(&GenericTree::from_document(&doc))
    }

    #[test]
    fn test_empty_root_sentinel() {
        let doc = canonicalize("<Root></Root>");
        assert_eq!(doc.root(), "Root");
        assert_eq!(doc.body(), &CanonicalBody::Empty);
        assert_eq!(doc.to_json(), r#"{"Root":""}"#);
    }

    #[test]
    fn test_single_child_wrapped_in_array() {
        let doc = canonicalize("<Root><City>SF</City></Root>");
        assert_eq!(doc.to_json(), r#"{"Root":[{"City":"SF"}]}"#);
    }

    #[test]
    fn test_single_nested_child_wrapped_once_per_level() {
        let doc = canonicalize("<Root><A><B>x</B></A></Root>");
        assert_eq!(doc.to_json(), r#"{"Root":[{"A":[{"B":"x"}]}]}"#);
    }

    #[test]
    fn test_repeated_children_flat_array() {
        let doc = canonicalize("<Root><A><X>1</X></A><A><X>2</X></A><A><X>3</X></A></Root>");
        assert_eq!(
            doc.to_json(),
            r#"{"Root":[{"A":[{"X":"1"},{"X":"2"},{"X":"3"}]}]}"#
        );
    }

    #[test]
    fn test_text_root_promoted() {
        let doc = canonicalize("<Root>hello</Root>");
        assert_eq!(doc.to_json(), r##"{"Root":[{"#text":"hello"}]}"##);
    }

    #[test]
    fn test_normalize_is_pure() {
        let parsed = Parser::new(b"<Root><A>1</A><B><C>2</C></B></Root>")
            .parse()
            .unwrap();
        let tree = GenericTree::from_document(&parsed);
        assert_eq!(normalize_tree(&tree), normalize_tree(&tree));
    }

    #[test]
    fn test_json_string_escaping() {
        let doc = canonicalize("<Root><Note>line1&#10;\"quoted\"</Note></Root>");
        assert_eq!(doc.to_json(), r#"{"Root":[{"Note":"line1\n\"quoted\""}]}"#);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_matches_hand_rolled() {
        let doc = canonicalize("<Root><A><X>1</X></A><A><X>2</X></A></Root>");
        let via_serde = serde_json::to_string(&doc).unwrap();
        assert_eq!(via_serde, doc.to_json());

        let empty = canonicalize("<Root/>");
        assert_eq!(serde_json::to_string(&empty).unwrap(), empty.to_json());
    }
}
