use crate::element::{Element, ElementData};
use crate::error::{Error, Result};
use crate::parser::{DocumentParser, ReadOptions};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

/// A node in the element tree.
///
/// Only [`Node::Element`] takes part in tree walks, the other variants are kept so that
/// an element's own text can be told apart from comments and processing instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    CData(String),
    PI(String),
    DocType(String),
}

impl Node {
    pub fn as_element(&self) -> Option<Element> {
        match self {
            Self::Element(elem) => Some(*elem),
            _ => None,
        }
    }

    /// Returns content if node is `Text` or `CData`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::CData(text) => Some(text),
            _ => None,
        }
    }
}

/// Represents a parsed XML document.
///
/// The document owns every element. [`Element`] is only an index into it,
/// so the tree cannot outlive or be freed by anything that walks it.
///
/// # Examples
/// ```
/// use soap_walk::Document;
/// use std::str::FromStr;
///
/// let doc = Document::from_str(r#"<?xml version="1.0" encoding="UTF-8"?>
/// <package>
///     <metadata>
///         <author>Lewis Carroll</author>
///     </metadata>
/// </package>
/// "#).unwrap();
/// let author = doc
///   .root_element()
///   .unwrap()
///   .find_path(&doc, &["metadata", "author"])
///   .unwrap();
/// assert_eq!(author.text(&doc), "Lewis Carroll");
/// ```
#[derive(Debug)]
pub struct Document {
    pub(crate) counter: usize, // == self.store.len()
    pub(crate) store: Vec<ElementData>,
    container: Element,

    pub(crate) version: String,
    pub(crate) encoding: Option<String>,
    pub(crate) standalone: bool,
}

impl Document {
    /// Create a blank new xml document.
    pub fn new() -> Document {
        let (container, container_data) = Element::container();
        Document {
            counter: 1, // because container is id 0
            store: vec![container_data],
            container,
            version: String::new(),
            encoding: None,
            standalone: false,
        }
    }

    /// Invisible element holding the top-level nodes of the document.
    pub fn container(&self) -> Element {
        self.container
    }

    pub fn is_empty(&self) -> bool {
        self.store.len() == 1
    }

    /// Number of elements in the document, not counting the container.
    pub fn element_count(&self) -> usize {
        self.store.len() - 1
    }

    /// Get first element of document.
    pub fn root_element(&self) -> Option<Element> {
        self.container.child_elements(self).next()
    }

    /// Get top-level nodes of document.
    pub fn root_nodes(&self) -> &[Node] {
        self.container.children(self)
    }

    /// `version` of the XML declaration, empty if there was none.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// `encoding` of the XML declaration as written.
    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    pub fn standalone(&self) -> bool {
        self.standalone
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

// Read
impl Document {
    /// Parses xml string with default [`ReadOptions`].
    ///
    /// # Errors
    ///
    /// Returns Errors from [`Document::parse_reader_with_opts()`].
    pub fn parse_str(str: &str) -> Result<Document> {
        Document::parse_reader(str.as_bytes())
    }

    pub fn parse_str_with_opts(str: &str, opts: ReadOptions) -> Result<Document> {
        Document::parse_reader_with_opts(str.as_bytes(), opts)
    }

    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
        Document::parse_file_with_opts(path, ReadOptions::default())
    }

    pub fn parse_file_with_opts<P: AsRef<Path>>(path: P, opts: ReadOptions) -> Result<Document> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Document::parse_reader_with_opts(reader, opts)
    }

    pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
        Document::parse_reader_with_opts(reader, ReadOptions::default())
    }

    /// Parses xml from reader.
    ///
    /// # Errors
    ///
    /// - [`Error::CannotDecode`]: Could not decode XML.
    /// - [`Error::MalformedXML`]: Could not read XML.
    /// - [`Error::Io`]: IO Error
    pub fn parse_reader_with_opts<R: Read>(reader: R, opts: ReadOptions) -> Result<Document> {
        DocumentParser::parse_reader(reader, opts)
    }
}

impl FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Document> {
        Document::parse_str(s)
    }
}
