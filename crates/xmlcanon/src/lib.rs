//! xmlcanon - Opinionated XML to canonical JSON converter
//!
//! Every element's children are represented as an array of records in the
//! output, never as a bare object, even when an element occurs exactly
//! once. This removes the singular-vs-repeatable ambiguity of schema-less
//! XML-to-JSON mappings.
//!
//! # Quick Start
//!
//! ```
//! # fn main() -> Result<(), xmlcanon::Error> {
//! let doc = xmlcanon::canonicalize_str("<Root><City>SF</City></Root>")?;
//! assert_eq!(doc.to_json(), r#"{"Root":[{"City":"SF"}]}"#);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod xml;
pub use xml::{Config, Document as XmlDocument, Parser as XmlParser};

pub mod tree;
pub use tree::{GenericNode, GenericTree, GenericValue};

pub mod canonical;
pub use canonical::{normalize, normalize_tree, CanonicalBody, CanonicalDocument, CanonicalRecord, CanonicalValue};

/// Parse XML text and normalize it into a canonical document.
pub fn canonicalize_str(s: &str) -> Result<CanonicalDocument> {
    canonicalize_str_with_config(s, Config::default())
}

/// Parse XML bytes and normalize them into a canonical document.
///
/// Bytes that are not valid UTF-8 fail with [`ErrorKind::InvalidUtf8`]
/// before parsing starts.
pub fn canonicalize_bytes(bytes: &[u8]) -> Result<CanonicalDocument> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| Error::new(ErrorKind::InvalidUtf8, Span::empty()))?;
    canonicalize_str(text)
}

/// Parse and normalize with a custom parser configuration.
pub fn canonicalize_str_with_config(s: &str, config: Config) -> Result<CanonicalDocument> {
    let mut parser = XmlParser::with_config(s.as_bytes(), config);
    let doc = parser.parse()?;
    Ok(normalize_tree(&GenericTree::from_document(&doc)))
}
