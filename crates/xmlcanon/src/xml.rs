//! XML parsing: byte cursor, document model, parser

mod cursor;
pub mod model;
pub mod parser;

pub use model::{Content, Document, Element};
pub use parser::{Config, Parser};
