//! Minimal XML support for the rate service wire format.
//!
//! - `element` - an owned element tree rendered to a compact XML string
//! - `reader` - parses an XML reply into a `serde_json::Value` tree

mod element;
mod reader;

pub use element::Element;
pub use reader::{one_or_many, parse_document};
