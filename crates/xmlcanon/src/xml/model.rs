//! XML document model

use indexmap::IndexMap;

/// A parsed XML document
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub root: Element,
}

/// One XML element with its attributes and ordered content
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Content>,
}

impl Element {
    /// Concatenated text content of the element's direct text nodes.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            if let Content::Text(t) = child {
                out.push_str(t);
            }
        }
        out
    }

    /// Child elements in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Content::Element(el) => Some(el),
            Content::Text(_) => None,
        })
    }

    /// True when the element has no attributes and no child elements,
    /// i.e. it carries at most text.
    pub fn is_leaf(&self) -> bool {
        self.attributes.is_empty() && self.child_elements().next().is_none()
    }
}

/// Content node inside an element
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Element(Element),
    Text(String),
}
