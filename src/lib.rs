//! Parse XML into an element tree and walk it in document order.
//!
//! ```
//! use soap_walk::{soap, Document, TreeWalker};
//! use std::str::FromStr;
//!
//! let doc = Document::from_str(soap::SAMPLE_ENVELOPE).unwrap();
//! assert_eq!(soap::client_state_ip(&doc).unwrap(), "172.21.40.99");
//!
//! let pairs = TreeWalker::new(&doc).collect(doc.root_nodes());
//! assert_eq!(pairs[0].0, "Envelope");
//! assert_eq!(pairs[7], ("key".to_string(), " 22 ".to_string()));
//! ```
mod document;
mod element;
mod error;
mod parser;
pub mod soap;
pub mod walker;

pub use crate::document::{Document, Node};
pub use crate::element::{Element, ElementData};
pub use crate::error::{Error, Result};
pub use crate::parser::ReadOptions;
pub use crate::walker::{walk, Collector, Descendants, Sink, TreeWalker, WriteSink};
