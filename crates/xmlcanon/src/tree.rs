//! Generic tree: the loosely-typed view of a parsed document
//!
//! The parser's [`Document`](crate::xml::Document) keeps raw XML structure
//! (interleaved text and element nodes). The generic tree regroups that into
//! a tag-keyed mapping where each tag's value is explicitly one of three
//! shapes, decided solely by sibling count:
//!
//! - [`GenericValue::Scalar`] — the element carried only text (or nothing),
//! - [`GenericValue::Single`] — the tag occurred once and carried structure,
//! - [`GenericValue::Repeated`] — the tag occurred more than once.
//!
//! Attributes become ordinary `@name` entries and mixed text lands under
//! `#text`, following the conventions of the upstream generic-tree format.

use indexmap::IndexMap;

use crate::xml::{Document, Element};

/// Key used for the text portion of an element that also carries
/// attributes or child elements.
pub const TEXT_KEY: &str = "#text";

/// Prefix applied to attribute-derived entries.
pub const ATTR_PREFIX: &str = "@";

/// A generic tree with its root tag name.
#[derive(Clone, Debug, PartialEq)]
pub struct GenericTree {
    pub root: String,
    pub value: GenericValue,
}

impl GenericTree {
    /// Build the generic tree for a parsed document.
    pub fn from_document(doc: &Document) -> Self {
        Self {
            root: doc.root.name.clone(),
            value: GenericValue::from_element(&doc.root),
        }
    }
}

impl From<&Document> for GenericTree {
    fn from(doc: &Document) -> Self {
        Self::from_document(doc)
    }
}

/// The value a tag maps to inside a [`GenericNode`].
#[derive(Clone, Debug, PartialEq)]
pub enum GenericValue {
    /// Text content, possibly empty
    Scalar(String),
    /// Exactly one structured occurrence
    Single(GenericNode),
    /// More than one occurrence, in document order
    Repeated(Vec<GenericNode>),
}

impl GenericValue {
    /// Convert one element into its generic value. A leaf element (no
    /// attributes, no child elements) is a Scalar; anything else becomes a
    /// node wrapped in Single.
    pub fn from_element(element: &Element) -> Self {
        if element.is_leaf() {
            return Self::Scalar(element.text());
        }
        Self::Single(GenericNode::from_element(element))
    }

    /// True when the value carries nothing to normalize: an empty scalar,
    /// a single entry-less node, or an empty sequence.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Scalar(s) => s.is_empty(),
            Self::Single(node) => node.is_empty(),
            Self::Repeated(nodes) => nodes.is_empty(),
        }
    }
}

/// Ordered mapping from child tag name to [`GenericValue`]. Entry order is
/// the document order of each tag's first occurrence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenericNode {
    entries: IndexMap<String, GenericValue>,
}

impl GenericNode {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Build a node from an element's attributes, text and child elements.
    ///
    /// Sibling grouping happens here: children sharing a tag are collected
    /// in document order, then stored as Scalar/Single (count one) or
    /// Repeated (count above one). A text-only child inside a repeated
    /// group is promoted to a `{#text: value}` node, since a repeated
    /// group holds nodes only.
    pub fn from_element(element: &Element) -> Self {
        let mut node = Self::new();

        for (name, value) in &element.attributes {
            node.insert(format!("{ATTR_PREFIX}{name}"), GenericValue::Scalar(value.clone()));
        }

        let text = element.text();
        if !text.is_empty() {
            node.insert(TEXT_KEY, GenericValue::Scalar(text));
        }

        let mut groups: IndexMap<&str, Vec<&Element>> = IndexMap::new();
        for child in element.child_elements() {
            groups.entry(child.name.as_str()).or_default().push(child);
        }

        for (name, members) in groups {
            match members.as_slice() {
                [only] => node.insert(name, GenericValue::from_element(only)),
                many => {
                    let nodes = many.iter().map(|el| Self::promote(el)).collect();
                    node.insert(name, GenericValue::Repeated(nodes));
                }
            }
        }

        node
    }

    /// Node form of an element, promoting a leaf to `{#text: value}`
    /// (or an entry-less node when the leaf is empty).
    fn promote(element: &Element) -> Self {
        match GenericValue::from_element(element) {
            GenericValue::Single(node) => node,
            GenericValue::Scalar(text) => {
                let mut node = Self::new();
                if !text.is_empty() {
                    node.insert(TEXT_KEY, GenericValue::Scalar(text));
                }
                node
            }
            // from_element never yields Repeated for one element
            GenericValue::Repeated(_) => Self::new(),
        }
    }

    pub fn insert(&mut self, tag: impl Into<String>, value: GenericValue) {
        self.entries.insert(tag.into(), value);
    }

    pub fn get(&self, tag: &str) -> Option<&GenericValue> {
        self.entries.get(tag)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, GenericValue> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a GenericNode {
    type Item = (&'a String, &'a GenericValue);
    type IntoIter = indexmap::map::Iter<'a, String, GenericValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::Parser;

    fn tree(input: &str) -> GenericTree {
        let doc = Parser::new(input.as_bytes()).parse().unwrap();
        GenericTree::from_document(&doc)
    }

    #[test]
    fn test_empty_root_is_empty_scalar() {
        let t = tree("<Root></Root>");
        assert_eq!(t.root, "Root");
        assert_eq!(t.value, GenericValue::Scalar(String::new()));
        assert!(t.value.is_empty());
    }

    #[test]
    fn test_text_root_is_scalar() {
        let t = tree("<Root>hello</Root>");
        assert_eq!(t.value, GenericValue::Scalar("hello".to_string()));
        assert!(!t.value.is_empty());
    }

    #[test]
    fn test_single_child() {
        let t = tree("<Root><City>SF</City></Root>");
        let GenericValue::Single(node) = &t.value else {
            panic!("expected single node");
        };
        assert_eq!(node.get("City"), Some(&GenericValue::Scalar("SF".to_string())));
    }

    #[test]
    fn test_repeated_children_grouped_in_order() {
        let t = tree("<Root><A><X>1</X></A><B>b</B><A><X>2</X></A></Root>");
        let GenericValue::Single(node) = &t.value else {
            panic!("expected single node");
        };
        // first-occurrence order: A before B
        let tags: Vec<_> = node.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(tags, vec!["A", "B"]);

        let GenericValue::Repeated(members) = node.get("A").unwrap() else {
            panic!("expected repeated group");
        };
        assert_eq!(members.len(), 2);
        assert_eq!(
            members[0].get("X"),
            Some(&GenericValue::Scalar("1".to_string()))
        );
        assert_eq!(
            members[1].get("X"),
            Some(&GenericValue::Scalar("2".to_string()))
        );
    }

    #[test]
    fn test_repeated_text_children_promoted() {
        let t = tree("<Root><Tag>a</Tag><Tag>b</Tag></Root>");
        let GenericValue::Single(node) = &t.value else {
            panic!("expected single node");
        };
        let GenericValue::Repeated(members) = node.get("Tag").unwrap() else {
            panic!("expected repeated group");
        };
        assert_eq!(
            members[0].get(TEXT_KEY),
            Some(&GenericValue::Scalar("a".to_string()))
        );
        assert_eq!(
            members[1].get(TEXT_KEY),
            Some(&GenericValue::Scalar("b".to_string()))
        );
    }

    #[test]
    fn test_attributes_become_prefixed_entries() {
        let t = tree(r#"<Root id="7">txt</Root>"#);
        let GenericValue::Single(node) = &t.value else {
            panic!("expected single node");
        };
        assert_eq!(node.get("@id"), Some(&GenericValue::Scalar("7".to_string())));
        assert_eq!(
            node.get(TEXT_KEY),
            Some(&GenericValue::Scalar("txt".to_string()))
        );
    }
}
